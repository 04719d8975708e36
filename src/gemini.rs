// ABOUTME: Gemini REST client for the impact-slides application
// ABOUTME: Drafts slide text and per-slide illustrations through generateContent

use crate::errors::{Result, SlideError};
use crate::generator::{ImageGenerator, SlideDraft, TextGenerator};
use crate::models::{AspectRatio, ContentRequest};
use crate::prompt;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_ms: 60000,
        }
    }
}

/// Content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn user_text(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::Text { text }],
        }
    }
}

/// Variant order matters for untagged decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First inline payload of the first candidate, still base64 encoded.
    pub fn inline_data(&self) -> Option<&str> {
        self.first_parts().iter().find_map(|part| match part {
            Part::InlineData { inline_data } => Some(inline_data.data.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Blocking Gemini client implementing both generation seams.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(SlideError::ConfigError(
                "GEMINI_API_KEY (or API_KEY) is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(SlideError::FetchError)?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> Result<Url> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        Url::parse(&raw)
            .map_err(|e| SlideError::ConfigError(format!("Invalid API endpoint {}: {}", raw, e)))
    }

    fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        let payload = response.text()?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SlideError::QuotaExceeded(error_message(&payload)));
        }
        if !status.is_success() {
            return Err(SlideError::ApiError {
                status: status.as_u16(),
                message: error_message(&payload),
            });
        }

        Ok(serde_json::from_str(&payload)?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

/// Pull the human readable message out of a Gemini error body.
fn error_message(payload: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(payload)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| payload.trim().to_string())
}

/// Parse the model's JSON array into drafts; an empty reply means no slides.
pub fn parse_drafts(text: &str) -> Result<Vec<SlideDraft>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| {
        SlideError::ResponseFormat(format!("model output is not a slide array: {}", e))
    })
}

impl TextGenerator for GeminiClient {
    fn generate_text(&self, request: &ContentRequest) -> Result<Vec<SlideDraft>> {
        info!(
            "Requesting {} {} slide(s) from {}",
            request.effective_slide_count(),
            request.content_type,
            self.config.text_model
        );

        let body = GenerateContentRequest {
            contents: vec![Content::user_text(prompt::text_prompt(request))],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text {
                    text: prompt::SYSTEM_INSTRUCTION.to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompt::response_schema()),
                image_config: None,
            }),
        };

        let response = self.generate_content(&self.config.text_model, &body)?;
        parse_drafts(&response.text())
    }
}

impl ImageGenerator for GeminiClient {
    fn generate_image(&self, visual_prompt: &str, ratio: AspectRatio) -> Result<Option<String>> {
        let body = GenerateContentRequest {
            contents: vec![Content::user_text(prompt::image_prompt(visual_prompt))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: ratio.as_str().to_string(),
                }),
                ..GenerationConfig::default()
            }),
        };

        let response = self.generate_content(&self.config.image_model, &body)?;
        Ok(response.inline_data().map(str::to_string))
    }
}
