//! Anthropic Messages API request and response types.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

// =============================================================================
// Messages Request
// =============================================================================

/// Messages API request.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Optional system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Server-side tools the model may call
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ServerTool>,
}

impl MessagesRequest {
    /// Create a new request with the given model and token limit.
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: None,
            messages: Vec::new(),
            temperature: None,
            tools: Vec::new(),
        }
    }

    /// Set the system prompt.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Offer a server-side tool.
    pub fn tool(mut self, tool: ServerTool) -> Self {
        self.tools.push(tool);
        self
    }
}

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A conversation turn made of content blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message from a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Create a user message from explicit blocks.
    pub fn user_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Request content block.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: Base64Source },
    Document { source: Base64Source },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Inline image (PNG, JPEG, GIF, WebP).
    pub fn image(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Image {
            source: Base64Source::encode(media_type, bytes),
        }
    }

    /// Inline document (PDF).
    pub fn document(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Document {
            source: Base64Source::encode(media_type, bytes),
        }
    }
}

/// Base64 payload source for image and document blocks.
#[derive(Clone, Serialize)]
pub struct Base64Source {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl Base64Source {
    /// Encode raw bytes.
    pub fn encode(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: STANDARD.encode(bytes),
        }
    }
}

impl std::fmt::Debug for Base64Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Base64Source")
            .field("media_type", &self.media_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Server-side tool definition (executed by the API, not the caller).
#[derive(Debug, Clone, Serialize)]
pub struct ServerTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
}

impl ServerTool {
    /// Live web search.
    pub fn web_search() -> Self {
        Self {
            tool_type: "web_search_20250305".to_string(),
            name: "web_search".to_string(),
            max_uses: None,
        }
    }

    /// Cap the number of tool invocations per request.
    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = Some(max_uses);
        self
    }
}

// =============================================================================
// Messages Response
// =============================================================================

/// Messages API response.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl MessagesResponse {
    /// Concatenate every text block in order.
    ///
    /// Tool-use and tool-result blocks are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::Other => None,
            })
            .collect()
    }

    /// Whether the response contains at least one text block.
    pub fn has_text(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ResponseBlock::Text { .. }))
    }
}

/// Response content block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },

    /// server_tool_use, web_search_tool_result, thinking, ...
    #[serde(other)]
    Other,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

// =============================================================================
// Utilities
// =============================================================================

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = MessagesRequest::new("claude-sonnet-4-20250514", 1000)
            .message(Message::user_blocks(vec![
                ContentBlock::document("application/pdf", b"%PDF-1.4"),
                ContentBlock::text("Analyze this bill"),
            ]))
            .tool(ServerTool::web_search());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["max_tokens"], 1000);
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "document");
        assert_eq!(
            json["messages"][0]["content"][0]["source"]["media_type"],
            "application/pdf"
        );
        assert_eq!(
            json["messages"][0]["content"][0]["source"]["data"],
            "JVBERi0xLjQ="
        );
        assert_eq!(json["messages"][0]["content"][1]["type"], "text");
        assert_eq!(json["tools"][0]["type"], "web_search_20250305");
        assert!(json["tools"][0].get("max_uses").is_none());
    }

    #[test]
    fn test_tools_omitted_when_empty() {
        let req = MessagesRequest::new("m", 10).message(Message::user("hi"));
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_response_text_skips_tool_blocks() {
        let raw = r#"{
            "id": "msg_01",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "Searching. "},
                {"type": "server_tool_use", "id": "srvtoolu_1", "name": "web_search", "input": {"query": "rates"}},
                {"type": "web_search_tool_result", "tool_use_id": "srvtoolu_1", "content": []},
                {"type": "text", "text": "{\"averageRate\": 0.16}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;

        let response: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.content.len(), 4);
        assert!(response.has_text());
        assert_eq!(response.text(), "Searching. {\"averageRate\": 0.16}");
    }

    #[test]
    fn test_base64_source_debug_hides_payload() {
        let source = Base64Source::encode("image/png", &[0u8; 64]);
        let debug = format!("{:?}", source);
        assert!(debug.contains("image/png"));
        assert!(!debug.contains(&source.data));
    }

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }
}
