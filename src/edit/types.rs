//! Core types for image editing.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// A request to edit an image with a natural-language instruction.
///
/// Built per submission from the wire representation of the upload; never
/// persisted.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// Base64-encoded image bytes.
    pub image_base64: String,
    /// MIME type of the encoded image.
    pub image_mime_type: String,
    /// The text prompt describing the desired edit.
    pub prompt: String,
}

impl EditRequest {
    /// Creates a new edit request.
    pub fn new(
        image_base64: impl Into<String>,
        image_mime_type: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            image_base64: image_base64.into(),
            image_mime_type: image_mime_type.into(),
            prompt: prompt.into(),
        }
    }
}

/// An edited image returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "edited image should be saved or processed"]
pub struct EditedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type claimed by the service.
    pub mime_type: String,
}

impl EditedImage {
    /// Creates a new edited image.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Parses an edited image back out of a data URL.
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        use base64::Engine;

        let (mime_type, payload) = crate::data_url::decode(data_url)?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| crate::error::RetouchError::Decode(e.to_string()))?;
        Ok(Self { data, mime_type })
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        crate::data_url::encode(&self.data, &self.mime_type)
    }
}
