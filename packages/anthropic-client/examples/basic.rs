//! Send a document to the Messages API and print the text reply.
//!
//! ```sh
//! ANTHROPIC_API_KEY=... cargo run -p anthropic-client --example basic -- bill.pdf
//! ```

use anthropic_client::{AnthropicClient, ContentBlock, Message, MessagesRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).ok_or("usage: basic <file.pdf>")?;
    let bytes = std::fs::read(&path)?;

    let client = AnthropicClient::from_env()?;

    let response = client
        .messages(
            MessagesRequest::new("claude-sonnet-4-20250514", 500).message(Message::user_blocks(
                vec![
                    ContentBlock::document("application/pdf", &bytes),
                    ContentBlock::text("Describe this document in two sentences."),
                ],
            )),
        )
        .await?;

    println!("{}", response.text());

    if let Some(usage) = response.usage {
        println!(
            "\ninput tokens: {}, output tokens: {}",
            usage.input_tokens, usage.output_tokens
        );
    }

    Ok(())
}
