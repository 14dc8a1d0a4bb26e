//! Gemini (Google) image editing provider.

use crate::edit::provider::EditProvider;
use crate::edit::types::{EditRequest, EditedImage};
use crate::error::{Result, RetouchError};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// MIME type assumed when the service omits one on returned image data.
const DEFAULT_MIME_TYPE: &str = "image/png";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    Flash,
    /// Gemini 3 Pro Image (highest quality).
    Pro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "nano-banana-pro-preview",
        }
    }
}

/// Builder for [`GeminiProvider`].
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the provider, resolving the API key from the environment when
    /// none was given. A missing key is not fatal here; every service call
    /// fails with an auth error until a key is supplied.
    pub fn build(self) -> GeminiProvider {
        let api_key = self.api_key.or_else(|| std::env::var(API_KEY_ENV).ok());
        if api_key.is_none() {
            warn!("{API_KEY_ENV} not set; edit requests will fail until a key is provided");
        }

        GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
        }
    }
}

/// Gemini image editing provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: GeminiModel,
}

impl GeminiProvider {
    /// Creates a new [`GeminiProviderBuilder`].
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns true if an API key was resolved at build time.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            RetouchError::Auth(format!("{API_KEY_ENV} not set and no API key provided"))
        })
    }

    async fn edit_impl(&self, request: &EditRequest) -> Result<EditedImage> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model.as_str(),
        );

        let body = GeminiRequest::from_edit_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.key()?)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        let response: GeminiResponse = response.json().await?;
        extract_edited_image(response)
    }
}

#[async_trait]
impl EditProvider for GeminiProvider {
    async fn edit(&self, request: &EditRequest) -> Result<EditedImage> {
        self.edit_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}",
            self.model.as_str(),
        );

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.key()?)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(RetouchError::Auth("Invalid API key".into())),
            s if !(200..300).contains(&s) => Err(RetouchError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

/// Maps a non-2xx response to an error, preserving the body text.
fn parse_error(status: u16, text: &str) -> RetouchError {
    if status == 401 || status == 403 {
        return RetouchError::Auth(text.to_owned());
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return RetouchError::ContentBlocked(text.to_owned());
    }
    RetouchError::Api {
        status,
        message: text.to_owned(),
    }
}

/// Pulls the edited image out of a successful response.
///
/// The first part carrying inline image data wins; response order is
/// authoritative.
fn extract_edited_image(response: GeminiResponse) -> Result<EditedImage> {
    // Blocked prompts come back as HTTP 200 with prompt_feedback set.
    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
            return Err(RetouchError::ContentBlocked(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(RetouchError::NoImageInResponse)?;

    if let Some(ref finish_reason) = candidate.finish_reason {
        match finish_reason.as_str() {
            "SAFETY" | "IMAGE_SAFETY" | "IMAGE_PROHIBITED_CONTENT" | "IMAGE_RECITATION"
            | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" => {
                return Err(RetouchError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {finish_reason}"
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let inline = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .find_map(|p| p.inline_data)
        .ok_or(RetouchError::NoImageInResponse)?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(&inline.data)
        .map_err(|e| RetouchError::Decode(e.to_string()))?;

    let mime_type = match inline.mime_type {
        Some(m) if !m.is_empty() => m,
        _ => DEFAULT_MIME_TYPE.to_owned(),
    };

    Ok(EditedImage::new(data, mime_type))
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: GeminiInlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_edit_request(req: &EditRequest) -> Self {
        // Input image first, then the instruction.
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: req.image_mime_type.clone(),
                    data: req.image_base64.clone(),
                },
            },
            GeminiRequestPart::Text {
                text: req.prompt.clone(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}
