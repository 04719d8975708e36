// ABOUTME: Generation state machine for the impact-slides application
// ABOUTME: A single reducer drives loading, error countdown and auto-retry

use crate::generator::FailureKind;
use std::fmt;

/// Seconds shown on the error banner before the automatic retry fires.
pub const RETRY_COUNTDOWN_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    DraftingText,
    DesigningVisuals,
}

impl LoadingStage {
    pub fn label(&self) -> &'static str {
        match self {
            LoadingStage::DraftingText => "Drafting content with Gemini...",
            LoadingStage::DesigningVisuals => "Designing unique visuals...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Generating {
        stage: LoadingStage,
    },
    Error {
        message: String,
        kind: FailureKind,
        countdown: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Submit,
    StageChanged(LoadingStage),
    Succeeded,
    Failed(FailureKind),
    Tick,
    Cancel,
}

impl GenerationState {
    /// The only way the generation state changes.
    pub fn apply(&self, event: Event) -> GenerationState {
        use GenerationState::*;

        match (self, event) {
            (_, Event::Cancel) => Idle,
            (Idle | Error { .. }, Event::Submit) => Generating {
                stage: LoadingStage::DraftingText,
            },
            (Generating { .. }, Event::StageChanged(stage)) => Generating { stage },
            (Generating { .. }, Event::Succeeded) => Idle,
            (Generating { .. }, Event::Failed(kind)) => Error {
                message: kind.message().to_string(),
                kind,
                countdown: RETRY_COUNTDOWN_SECS,
            },
            (
                Error {
                    message,
                    kind,
                    countdown,
                },
                Event::Tick,
            ) => {
                if *countdown > 1 {
                    Error {
                        message: message.clone(),
                        kind: *kind,
                        countdown: countdown - 1,
                    }
                } else {
                    Generating {
                        stage: LoadingStage::DraftingText,
                    }
                }
            }
            (state, _) => state.clone(),
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, GenerationState::Generating { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, GenerationState::Error { .. })
    }

    /// Seconds left before the automatic retry, zero outside the error state.
    pub fn countdown(&self) -> u32 {
        match self {
            GenerationState::Error { countdown, .. } => *countdown,
            _ => 0,
        }
    }

    /// Two-line error banner, or nothing when there is no error.
    pub fn banner(&self) -> Option<String> {
        match self {
            GenerationState::Error {
                message, countdown, ..
            } => Some(format!(
                "{}\nRetrying automatically in {} seconds...",
                message, countdown
            )),
            _ => None,
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationState::Idle => f.write_str("idle"),
            GenerationState::Generating { stage } => f.write_str(stage.label()),
            GenerationState::Error {
                message, countdown, ..
            } => write!(f, "{} ({}s)", message, countdown),
        }
    }
}
