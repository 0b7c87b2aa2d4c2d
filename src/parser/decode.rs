use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::DynamicImage;
use regex::Regex;
use thiserror::Error;

static DATA_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/\w+;base64,").unwrap());

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty image reference")]
    Empty,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable image data: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode an inline `data:image/<type>;base64,<payload>` reference (or a bare
/// base64 payload) into a bitmap.
pub fn decode_data_uri(src: &str) -> Result<DynamicImage, DecodeError> {
    let payload = DATA_URI_RE.replace(src.trim(), "");
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    let bytes = STANDARD.decode(payload.as_bytes())?;
    Ok(image::load_from_memory(&bytes)?)
}
