//! Output formatting for decoded messages.
//!
//! Two formats are supported: an indented proto-text-style tree and JSON.
//! When JSON rendering fails, the renderer falls back to text and reports
//! the fallback in [`Rendered::fallback_notice`]; output is never silently
//! mislabeled as JSON.

mod json;
mod text;

use thiserror::Error;

use crate::DecodedMessage;

/// Requested output format.
///
/// # Examples
/// ```
/// use binpb_core::OutputFormat;
///
/// let format: OutputFormat = "json".parse().unwrap();
/// assert_eq!(format, OutputFormat::Json);
/// assert_eq!(OutputFormat::default(), OutputFormat::Text);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
#[error("unknown output format '{0}', expected 'text' or 'json'")]
pub struct UnknownFormat(String);

impl std::str::FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// Rendered output plus an optional format-fallback notice.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub body: String,
    /// Set when the requested format could not be produced and the body is
    /// text instead.
    pub fallback_notice: Option<String>,
}

/// Render a decoded message in the requested format.
pub fn render(message: &DecodedMessage, format: OutputFormat) -> Rendered {
    match format {
        OutputFormat::Text => Rendered {
            body: text::render_text(message),
            fallback_notice: None,
        },
        OutputFormat::Json => match json::render_json(message) {
            Ok(body) => Rendered {
                body,
                fallback_notice: None,
            },
            Err(err) => Rendered {
                body: text::render_text(message),
                fallback_notice: Some(format!(
                    "json rendering unavailable ({err}); emitting text output instead"
                )),
            },
        },
    }
}

/// Lowercase hex dump of the first `max` bytes, with an ellipsis when the
/// input is longer.
///
/// # Examples
/// ```
/// use binpb_core::hex_preview;
///
/// assert_eq!(hex_preview(&[0xde, 0xad], 100), "dead");
/// assert_eq!(hex_preview(&[0xde, 0xad], 1), "de...");
/// ```
pub fn hex_preview(bytes: &[u8], max: usize) -> String {
    let shown = &bytes[..bytes.len().min(max)];
    let mut out = to_hex(shown);
    if bytes.len() > max {
        out.push_str("...");
    }
    out
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodedField, DecodedValue};

    #[test]
    fn text_render_has_no_fallback_notice() {
        let message = DecodedMessage {
            type_name: "Person".to_string(),
            fields: vec![DecodedField {
                name: "age".to_string(),
                value: DecodedValue::I32(5),
            }],
        };
        let rendered = render(&message, OutputFormat::Text);
        assert_eq!(rendered.body, "age: 5\n");
        assert!(rendered.fallback_notice.is_none());
    }

    #[test]
    fn json_render_produces_json() {
        let message = DecodedMessage {
            type_name: "Person".to_string(),
            fields: vec![DecodedField {
                name: "age".to_string(),
                value: DecodedValue::I32(5),
            }],
        };
        let rendered = render(&message, OutputFormat::Json);
        assert!(rendered.fallback_notice.is_none());
        let value: serde_json::Value = serde_json::from_str(&rendered.body).expect("valid json");
        assert_eq!(value["age"], 5);
    }

    #[test]
    fn unknown_format_is_an_error() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().contains("yaml"));
    }

    #[test]
    fn hex_preview_bounds_output() {
        let bytes: Vec<u8> = (0..=255).map(|n| n as u8).collect();
        let preview = hex_preview(&bytes, 4);
        assert_eq!(preview, "00010203...");
        assert_eq!(hex_preview(&[], 4), "");
    }
}
