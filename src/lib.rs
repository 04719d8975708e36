// ABOUTME: Library module for the impact-slides program.
// ABOUTME: Contains slide generation, the retry state machine, HTML rendering and PNG export.

// Reexport modules
pub mod canvas;
pub mod config;
pub mod errors;
pub mod export;
pub mod gemini;
pub mod generator;
pub mod html;
pub mod layout;
pub mod models;
pub mod prompt;
pub mod resources;
pub mod retry;
pub mod serve;
pub mod session;
pub mod state;
pub mod utils;

// Reexport common types and functions
pub use config::Config;
pub use errors::{Result, SlideError};
pub use export::{export_all, export_slide, render_slide, ExportOptions};
pub use gemini::{GeminiClient, GeminiConfig};
pub use generator::{generate_slides, FailureKind, ImageGenerator, SlideDraft, TextGenerator};
pub use html::{generate_gallery, write_html_to_file, GalleryOptions};
pub use layout::{wrap_text, OverflowPolicy, TextMeasure};
pub use models::{AspectRatio, ContentRequest, ContentType, GenerationResult, SlideData};
pub use session::{CancelHandle, GenerationReport, RetryPolicy, Session};
pub use state::{Event, GenerationState, LoadingStage};
