//! Response normalization applied before every decode.
//!
//! Delegates are asked for bare JSON but often wrap it in a markdown fence or
//! a sentence of prose. `normalize` peels those layers off. It never fixes
//! the JSON itself, and text without any wrapping passes through trimmed.

const FENCE: &str = "```";

/// Strip code fences and surrounding prose from a delegate response.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)` for every input.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_delimited_json(trimmed) {
        return trimmed.to_string();
    }

    let body = fenced_body(trimmed).unwrap_or(trimmed).trim();
    if is_delimited_json(body) {
        return body.to_string();
    }

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => body[start..=end].to_string(),
        _ => body.to_string(),
    }
}

/// Starts and ends with matching object or array delimiters.
fn is_delimited_json(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}')) || (text.starts_with('[') && text.ends_with(']'))
}

/// Content of the first fenced block, without its info string.
///
/// An unterminated fence (truncated response) yields everything after it.
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];

    // Skip the info string ("json", "JSON", ...) up to the end of the line.
    let content = match after_open.find('\n') {
        Some(newline) if !after_open[..newline].contains(['{', '[']) => &after_open[newline + 1..],
        _ => after_open,
    };

    Some(match content.find(FENCE) {
        Some(close) => &content[..close],
        None => content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bare_json_untouched() {
        assert_eq!(normalize(r#"{"a": 1}"#), r#"{"a": 1}"#);
        assert_eq!(normalize("  \n{\"a\": 1}\n "), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strips_json_fence() {
        assert_eq!(normalize("```json\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
        assert_eq!(normalize("```JSON\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
        assert_eq!(normalize("```\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(normalize("```{\"a\": 1}```"), r#"{"a": 1}"#);
    }

    #[test]
    fn test_strips_prose_wrapper() {
        let raw = "Here is the analysis you asked for:\n\n```json\n{\"a\": 1}\n```\n\nLet me know if you need more.";
        assert_eq!(normalize(raw), r#"{"a": 1}"#);

        let raw = "Based on my research, {\"averageRate\": 0.16} is the figure.";
        assert_eq!(normalize(raw), r#"{"averageRate": 0.16}"#);
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(normalize("```json\n{\"a\": 1"), r#"{"a": 1"#);
    }

    #[test]
    fn test_prose_without_json_passes_through() {
        assert_eq!(
            normalize("  I could not find any benchmark data.  "),
            "I could not find any benchmark data."
        );
    }

    #[test]
    fn test_fence_inside_json_string_preserved() {
        let raw = r#"{"insights": "see ``` marker"}"#;
        assert_eq!(normalize(raw), raw);
    }

    proptest! {
        #[test]
        fn prop_idempotent(raw in ".{0,200}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_idempotent_on_wrapped_json(
            prefix in "[a-zA-Z .:]{0,40}",
            key in "[a-z]{1,10}",
            value in 0u32..100_000,
            fence in prop::bool::ANY,
            suffix in "[a-zA-Z .!]{0,40}",
        ) {
            let json = format!("{{\"{}\": {}}}", key, value);
            let raw = if fence {
                format!("{}\n```json\n{}\n```\n{}", prefix, json, suffix)
            } else {
                format!("{} {} {}", prefix, json, suffix)
            };

            let once = normalize(&raw);
            prop_assert_eq!(&once, &json);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
