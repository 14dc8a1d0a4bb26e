//! Conversion between raw image bytes and `data:` URLs.
//!
//! The wire format for both the upload and the edited result is a data URL of
//! the form `data:<mime>;base64,<payload>`. [`encode`] is total; [`decode`]
//! is the strict inverse and rejects anything else.

use crate::error::{Result, RetouchError};
use base64::Engine;

/// Encodes raw bytes as a `data:<mime>;base64,<payload>` URL.
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Splits a data URL back into its MIME type and base64 payload.
///
/// Fails with [`RetouchError::InvalidDataUrl`] unless the input matches
/// `data:<type>;base64,<payload>` with a non-empty type and payload.
pub fn decode(data_url: &str) -> Result<(String, String)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(RetouchError::InvalidDataUrl)?;
    let (mime_type, payload) = rest
        .split_once(";base64,")
        .ok_or(RetouchError::InvalidDataUrl)?;
    if mime_type.is_empty() || payload.is_empty() {
        return Err(RetouchError::InvalidDataUrl);
    }
    Ok((mime_type.to_owned(), payload.to_owned()))
}
