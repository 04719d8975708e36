// ABOUTME: Generation orchestrator for the impact-slides application
// ABOUTME: Drafts slide text, then fans out one image request per slide

use crate::errors::{Result, SlideError};
use crate::models::{AspectRatio, ContentRequest, SlideData, SLIDE_FOOTER};
use crate::state::LoadingStage;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::thread;

/// One slide as returned by the text model, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDraft {
    pub title: String,
    pub main_text: String,
    #[serde(default)]
    pub content_list: Option<Vec<String>>,
    #[serde(default)]
    pub secondary_text: Option<String>,
    #[serde(default)]
    pub visual_prompt: Option<String>,
}

/// Produces the text of every slide for a request in a single call.
pub trait TextGenerator {
    fn generate_text(&self, request: &ContentRequest) -> Result<Vec<SlideDraft>>;
}

/// Produces a base64 illustration for one slide, or nothing.
pub trait ImageGenerator: Sync {
    fn generate_image(&self, visual_prompt: &str, ratio: AspectRatio) -> Result<Option<String>>;
}

/// Which error banner a failed generation should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    Service,
}

impl FailureKind {
    pub fn classify(error: &SlideError) -> Self {
        if error.is_quota() {
            FailureKind::Quota
        } else {
            FailureKind::Service
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::Quota => "Quota exceeded. Cooling down...",
            FailureKind::Service => "AI Service unavailable. Retrying...",
        }
    }
}

/// Turn model drafts into slides numbered from 1.
pub fn number_drafts(drafts: Vec<SlideDraft>) -> Vec<SlideData> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| SlideData {
            id: index as u32 + 1,
            title: draft.title,
            main_text: draft.main_text,
            content_list: draft.content_list.unwrap_or_default(),
            secondary_text: draft.secondary_text.filter(|s| !s.is_empty()),
            visual_prompt: draft.visual_prompt,
            image_base64: None,
            footer: SLIDE_FOOTER.to_string(),
        })
        .collect()
}

/// Run one full generation: text first, then images when requested.
///
/// Text failures abort the batch. Image failures only cost the affected slide
/// its background.
pub fn generate_slides<T, I, F>(
    text: &T,
    images: &I,
    request: &ContentRequest,
    mut on_stage: F,
) -> Result<Vec<SlideData>>
where
    T: TextGenerator + ?Sized,
    I: ImageGenerator + ?Sized,
    F: FnMut(LoadingStage),
{
    request.validate()?;

    on_stage(LoadingStage::DraftingText);
    let drafts = text.generate_text(request)?;
    let mut slides = number_drafts(drafts);
    info!("Drafted {} slide(s)", slides.len());

    if request.content_type.is_announcement() && slides.len() != 1 {
        warn!(
            "Announcement produced {} slides instead of one; keeping all",
            slides.len()
        );
    }

    if request.has_image {
        on_stage(LoadingStage::DesigningVisuals);
        attach_images(images, &mut slides, request.aspect_ratio);
    }

    Ok(slides)
}

/// Request every slide's illustration in parallel and store what came back.
pub fn attach_images<I>(images: &I, slides: &mut [SlideData], ratio: AspectRatio)
where
    I: ImageGenerator + ?Sized,
{
    let results: Vec<(usize, Option<String>)> = thread::scope(|scope| {
        let handles: Vec<_> = slides
            .iter()
            .enumerate()
            .filter_map(|(index, slide)| {
                let prompt = slide.image_prompt()?.to_string();
                let id = slide.id;
                Some(scope.spawn(move || {
                    let image = match images.generate_image(&prompt, ratio) {
                        Ok(Some(data)) if !data.is_empty() => Some(data),
                        Ok(_) => {
                            warn!("Image model returned no image for slide {}", id);
                            None
                        }
                        Err(e) => {
                            warn!("Image generation failed for slide {}: {}", id, e);
                            None
                        }
                    };
                    (index, image)
                }))
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .collect()
    });

    for (index, image) in results {
        if let Some(slide) = slides.get_mut(index) {
            slide.image_base64 = image;
        }
    }
}

/// Slides that asked for an illustration but ended up without one.
pub fn missing_images(request: &ContentRequest, slides: &[SlideData]) -> usize {
    if !request.has_image {
        return 0;
    }
    slides
        .iter()
        .filter(|s| s.image_prompt().is_some() && !s.has_image())
        .count()
}
