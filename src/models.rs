// ABOUTME: Domain types for the impact-slides application
// ABOUTME: Content requests, generated slides and the saved generation result

use crate::errors::{Result, SlideError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of highlighted announcement fields.
pub const MAX_ANNOUNCEMENT_FIELDS: usize = 5;

/// Largest number of slides a single request may ask for.
pub const MAX_SLIDE_COUNT: u8 = 3;

/// Label attached to every generated slide.
pub const SLIDE_FOOTER: &str = "Impact English Course";

/// Kind of content the user wants drafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Grammar,
    Vocabulary,
    Slang,
    Idioms,
    Announcement,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Grammar,
        ContentType::Vocabulary,
        ContentType::Slang,
        ContentType::Idioms,
        ContentType::Announcement,
    ];

    /// Human readable label, as shown on the results badge.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Grammar => "Grammar",
            ContentType::Vocabulary => "Vocabulary",
            ContentType::Slang => "Slang Words",
            ContentType::Idioms => "Idioms",
            ContentType::Announcement => "Announcement",
        }
    }

    pub fn is_announcement(&self) -> bool {
        matches!(self, ContentType::Announcement)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = SlideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "grammar" => Ok(ContentType::Grammar),
            "vocabulary" | "vocab" => Ok(ContentType::Vocabulary),
            "slang" | "slang words" => Ok(ContentType::Slang),
            "idioms" | "idiom" => Ok(ContentType::Idioms),
            "announcement" => Ok(ContentType::Announcement),
            other => Err(SlideError::ValidationError(format!(
                "Unknown content type: {}",
                other
            ))),
        }
    }
}

/// Output aspect ratio of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Portrait,
    #[serde(rename = "9:16")]
    Story,
}

impl AspectRatio {
    /// Tag understood by the image model, also used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "4:3",
            AspectRatio::Story => "9:16",
        }
    }

    /// Pixel size of the exported canvas.
    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Portrait => (1080, 1440),
            AspectRatio::Story => (1080, 1920),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = SlideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1:1" | "square" => Ok(AspectRatio::Square),
            "4:3" | "portrait" | "post" => Ok(AspectRatio::Portrait),
            "9:16" | "story" => Ok(AspectRatio::Story),
            other => Err(SlideError::ValidationError(format!(
                "Unsupported aspect ratio: {}",
                other
            ))),
        }
    }
}

/// Everything the user filled in before pressing generate.
///
/// The request outlives a single generation: it is edited between runs and
/// never reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub content_type: ContentType,
    pub topic: String,
    pub has_image: bool,
    pub slide_count: u8,
    pub aspect_ratio: AspectRatio,
    pub announcement_title: String,
    pub announcement_body1: String,
    pub announcement_fields: Vec<String>,
    pub announcement_body2: String,
}

impl Default for ContentRequest {
    fn default() -> Self {
        Self {
            content_type: ContentType::Grammar,
            topic: String::new(),
            has_image: false,
            slide_count: 1,
            aspect_ratio: AspectRatio::Square,
            announcement_title: String::new(),
            announcement_body1: String::new(),
            // The form starts with one empty highlight row
            announcement_fields: vec![String::new()],
            announcement_body2: String::new(),
        }
    }
}

impl ContentRequest {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            ..Self::default()
        }
    }

    /// Whether the submit action should be enabled.
    pub fn is_valid(&self) -> bool {
        if self.content_type.is_announcement() {
            !self.announcement_title.is_empty() && !self.announcement_body1.is_empty()
        } else {
            !self.topic.is_empty()
        }
    }

    /// Same check as [`is_valid`](Self::is_valid), reported as an error.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let message = if self.content_type.is_announcement() {
            "announcement title and main message are required"
        } else {
            "topic is required"
        };
        Err(SlideError::ValidationError(message.to_string()))
    }

    /// Slides actually requested from the model.
    pub fn effective_slide_count(&self) -> u8 {
        if self.content_type.is_announcement() {
            1
        } else {
            self.slide_count.clamp(1, MAX_SLIDE_COUNT)
        }
    }

    pub fn set_slide_count(&mut self, count: u8) {
        self.slide_count = count.clamp(1, MAX_SLIDE_COUNT);
    }

    /// Append an empty highlight field. Returns false once the limit is reached.
    pub fn add_announcement_field(&mut self) -> bool {
        if self.announcement_fields.len() >= MAX_ANNOUNCEMENT_FIELDS {
            return false;
        }
        self.announcement_fields.push(String::new());
        true
    }

    pub fn remove_announcement_field(&mut self, index: usize) {
        if index < self.announcement_fields.len() {
            self.announcement_fields.remove(index);
        }
    }

    pub fn update_announcement_field(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.announcement_fields.get_mut(index) {
            *field = value.into();
        }
    }

    /// Replace all highlight fields at once, keeping at most five.
    pub fn set_announcement_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.announcement_fields = fields
            .into_iter()
            .take(MAX_ANNOUNCEMENT_FIELDS)
            .map(Into::into)
            .collect();
    }

    /// Non-blank highlight fields, in form order.
    pub fn highlights(&self) -> Vec<String> {
        self.announcement_fields
            .iter()
            .filter(|f| !f.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// One generated slide.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideData {
    /// 1-based position, assigned when the text comes back.
    pub id: u32,
    pub title: String,
    pub main_text: String,
    #[serde(default)]
    pub content_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_text: Option<String>,
    /// Only drives image generation; never rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default = "default_footer")]
    pub footer: String,
}

fn default_footer() -> String {
    SLIDE_FOOTER.to_string()
}

impl SlideData {
    pub fn has_image(&self) -> bool {
        self.image_base64.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// The visual prompt, if it holds anything worth sending to the image model.
    pub fn image_prompt(&self) -> Option<&str> {
        self.visual_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn secondary(&self) -> Option<&str> {
        self.secondary_text.as_deref().filter(|s| !s.is_empty())
    }

    /// File name used when the slide is exported.
    pub fn export_file_name(&self) -> String {
        format!("impact-content-{}.png", self.id)
    }
}

/// A finished generation, saved next to the exported images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub slides: Vec<SlideData>,
    pub request: ContentRequest,
    pub generated_at: DateTime<Utc>,
}

impl GenerationResult {
    pub fn new(slides: Vec<SlideData>, request: ContentRequest) -> Self {
        Self {
            slides,
            request,
            generated_at: Utc::now(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn slide(&self, id: u32) -> Option<&SlideData> {
        self.slides.iter().find(|s| s.id == id)
    }
}
