// ABOUTME: Configuration module for the impact-slides application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::canvas::FontOptions;
use crate::export::ExportOptions;
use crate::gemini::{GeminiConfig, DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::layout::OverflowPolicy;
use crate::resources::{ImageSource, DEFAULT_LOGO_URL};
use std::env;
use std::path::PathBuf;

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub request_timeout_ms: u64,
    pub logo: String,
    pub font_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout_ms: 60000,
            logo: DEFAULT_LOGO_URL.to_string(),
            font_dir: None,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        let api_base = env::var("GEMINI_API_BASE").unwrap_or(defaults.api_base);
        let text_model = env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model);
        let image_model = env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model);
        let request_timeout_ms = env::var("REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.request_timeout_ms);
        let logo = env::var("IMPACT_LOGO").unwrap_or(defaults.logo);
        let font_dir = env::var("IMPACT_FONT_DIR").ok().map(PathBuf::from);

        Self {
            api_key,
            api_base,
            text_model,
            image_model,
            request_timeout_ms,
            logo,
            font_dir,
        }
    }

    /// Get the Gemini client configuration
    pub fn get_client_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            base_url: self.api_base.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            timeout_ms: self.request_timeout_ms,
        }
    }

    /// Get an export configuration with defaults from this config
    pub fn get_export_config(
        &self,
        output_dir: PathBuf,
        overflow: Option<OverflowPolicy>,
        with_logo: bool,
    ) -> ExportOptions {
        ExportOptions {
            output_dir,
            overflow: overflow.unwrap_or_default(),
            fonts: FontOptions {
                font_dir: self.font_dir.clone(),
            },
            logo: (with_logo && !self.logo.is_empty()).then(|| ImageSource::new(&self.logo)),
        }
    }
}
