//! `{key}` placeholder expansion over a context snapshot
//!
//! Syntax:
//! - `{key}` where `key` is `[A-Za-z0-9_.]+` is replaced by the value of
//!   `key` in the snapshot
//! - `{{` and `}}` produce literal braces
//! - any other brace is copied through unchanged
//! - `{key` running to the end of the template is malformed

use crate::context::ContextSnapshot;
use serde_json::Value;
use thiserror::Error;

/// Rendering for JSON null, matching what bootstrap writes for an absent
/// modality.
pub const NOT_PROVIDED: &str = "Not provided";

/// Errors raised while expanding an instruction template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unresolved placeholder '{{{key}}}' in instruction template")]
    UnresolvedPlaceholder { key: String },

    #[error("Unterminated placeholder starting at byte {position}")]
    MalformedTemplate { position: usize },
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' | '}' if chars.peek().map(|&(_, n)| n) == Some(c) => {
                // Escaped brace: keep one, skip the other
                segments.push(Segment::Literal(&template[literal_start..i + 1]));
                chars.next();
                literal_start = i + 2;
            }
            '{' => {
                let key_start = i + 1;
                let key_len = template[key_start..]
                    .chars()
                    .take_while(|&ch| is_key_char(ch))
                    .map(char::len_utf8)
                    .sum::<usize>();
                let key_end = key_start + key_len;

                match template[key_end..].chars().next() {
                    Some('}') if key_len > 0 => {
                        segments.push(Segment::Literal(&template[literal_start..i]));
                        segments.push(Segment::Placeholder(&template[key_start..key_end]));
                        literal_start = key_end + 1;
                        while chars.peek().is_some_and(|&(j, _)| j <= key_end) {
                            chars.next();
                        }
                    }
                    None if key_len > 0 => {
                        return Err(TemplateError::MalformedTemplate { position: i });
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    segments.push(Segment::Literal(&template[literal_start..]));
    Ok(segments)
}

/// Stringify a context value for insertion into an instruction.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => NOT_PROVIDED.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// List every placeholder key in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
    Ok(parse(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(key) => Some(key.to_string()),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Replace every `{key}` in `template` with its value from `snapshot`.
///
/// Pure: the same template and snapshot always give the same text. Fails on
/// the first placeholder whose key is absent.
pub fn expand(template: &str, snapshot: &ContextSnapshot) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    for segment in parse(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(key) => {
                let value = snapshot
                    .get(key)
                    .ok_or_else(|| TemplateError::UnresolvedPlaceholder {
                        key: key.to_string(),
                    })?;
                out.push_str(&render_value(value));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> ContextSnapshot {
        ContextSnapshot::from_pairs([
            ("subject_id", json!("pt-42")),
            ("audio_ref", Value::Null),
            ("scribe.terms", json!(["fever", "cough"])),
            ("count", json!(3)),
        ])
    }

    #[test]
    fn test_expand_replaces_placeholders() {
        let text = expand("Patient {subject_id}, audio: {audio_ref}", &snapshot()).unwrap();
        assert_eq!(text, "Patient pt-42, audio: Not provided");
    }

    #[test]
    fn test_expand_renders_lists_and_numbers() {
        let text = expand("{scribe.terms} ({count})", &snapshot()).unwrap();
        assert_eq!(text, "fever, cough (3)");
    }

    #[test]
    fn test_unresolved_placeholder() {
        let err = expand("Image: {image_ref}", &snapshot()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnresolvedPlaceholder {
                key: "image_ref".to_string()
            }
        );
    }

    #[test]
    fn test_escaped_and_non_placeholder_braces() {
        let text = expand(
            r#"Return JSON like {"a": 1} or {{subject_id}} for {subject_id}"#,
            &snapshot(),
        )
        .unwrap();
        assert_eq!(
            text,
            r#"Return JSON like {"a": 1} or {subject_id} for pt-42"#
        );
    }

    #[test]
    fn test_unterminated_placeholder() {
        let err = expand("Hello {subject_id", &snapshot()).unwrap_err();
        assert_eq!(err, TemplateError::MalformedTemplate { position: 6 });
    }

    #[test]
    fn test_placeholders_listed_in_order() {
        let keys = placeholders("{b} then {a} then {b}").unwrap();
        assert_eq!(keys, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_expand_is_pure() {
        let snapshot = snapshot();
        let first = expand("{subject_id}/{count}", &snapshot).unwrap();
        let second = expand("{subject_id}/{count}", &snapshot).unwrap();
        assert_eq!(first, second);
    }
}
