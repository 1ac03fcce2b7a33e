use serde_json::Value;
use thiserror::Error;

/// Failure to decode a component file. The message is surfaced verbatim
/// as that file's single diagnostic; it never aborts the batch.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

/// Decode YAML component metadata into a JSON value.
///
/// Strips UTF-8 BOM characters that can appear at the start of a file or
/// mid-stream (e.g. after a comment line), which serde_yaml misinterprets
/// as a multi-document separator.
///
/// # Errors
///
/// Returns a [`DecodeError`] carrying the parser's message.
pub fn decode(content: &str) -> Result<Value, DecodeError> {
    let clean: std::borrow::Cow<'_, str> = if content.contains('\u{FEFF}') {
        content.replace('\u{FEFF}', "").into()
    } else {
        content.into()
    };
    serde_yaml::from_str(&clean).map_err(|e| DecodeError {
        message: e.to_string(),
    })
}
