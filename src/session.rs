// ABOUTME: Generation session for the impact-slides application
// ABOUTME: Owns the request, the slide list and the retry loop around the orchestrator

use crate::errors::{Result, SlideError};
use crate::generator::{self, FailureKind, ImageGenerator, TextGenerator};
use crate::models::{ContentRequest, SlideData};
use crate::retry::{CancellationToken, CountdownSlot};
use crate::state::{Event, GenerationState, RETRY_COUNTDOWN_SECS};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked with every new generation state.
pub type StateObserver = Arc<dyn Fn(&GenerationState) + Send + Sync>;

/// How the session waits between failed attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Length of one countdown step.
    pub tick: Duration,
    /// Give up after this many automatic retries; `None` retries until cancelled.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            max_retries: None,
        }
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub slides: Vec<SlideData>,
    /// Slides that asked for an illustration and did not get one.
    pub images_missing: usize,
}

#[derive(Default)]
struct StateCell {
    state: Mutex<GenerationState>,
    observer: Mutex<Option<StateObserver>>,
}

impl StateCell {
    fn dispatch(&self, event: Event) -> GenerationState {
        let next = {
            let mut state = self.state.lock();
            let next = state.apply(event);
            if next == *state {
                return next;
            }
            *state = next.clone();
            next
        };

        debug!("Generation state -> {}", next);
        // Release the lock first; the observer may cancel and dispatch again
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer(&next);
        }
        next
    }

    fn snapshot(&self) -> GenerationState {
        self.state.lock().clone()
    }
}

/// Cancels a running or pending generation from any thread.
#[derive(Clone)]
pub struct CancelHandle {
    cell: Arc<StateCell>,
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        info!("Cancelling generation");
        self.token.cancel();
        self.cell.dispatch(Event::Cancel);
    }
}

/// Ties the request, the provider and the state machine together.
pub struct Session<P> {
    request: ContentRequest,
    slides: Vec<SlideData>,
    provider: P,
    policy: RetryPolicy,
    cell: Arc<StateCell>,
    token: CancellationToken,
    countdowns: CountdownSlot,
}

impl<P> Session<P>
where
    P: TextGenerator + ImageGenerator,
{
    pub fn new(request: ContentRequest, provider: P) -> Self {
        Self {
            request,
            slides: Vec::new(),
            provider,
            policy: RetryPolicy::default(),
            cell: Arc::new(StateCell::default()),
            token: CancellationToken::new(),
            countdowns: CountdownSlot::new(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the state observer. It may call [`CancelHandle::cancel`].
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(&GenerationState) + Send + Sync + 'static,
    {
        *self.cell.observer.lock() = Some(Arc::new(observer));
    }

    pub fn request(&self) -> &ContentRequest {
        &self.request
    }

    /// Form edits between generations.
    pub fn request_mut(&mut self) -> &mut ContentRequest {
        &mut self.request
    }

    pub fn slides(&self) -> &[SlideData] {
        &self.slides
    }

    pub fn state(&self) -> GenerationState {
        self.cell.snapshot()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cell: Arc::clone(&self.cell),
            token: self.token.clone(),
        }
    }

    /// Generate slides, retrying automatically after each failure.
    ///
    /// An invalid request is rejected before anything changes.
    pub fn generate(&mut self) -> Result<&[SlideData]> {
        if !self.request.is_valid() {
            debug!("Submission blocked: request is incomplete");
            return Err(SlideError::ValidationError(
                "request is incomplete".to_string(),
            ));
        }

        self.token.reset();
        self.cell.dispatch(Event::Submit);
        let mut retries = 0u32;

        loop {
            self.slides.clear();

            let cell = Arc::clone(&self.cell);
            let outcome =
                generator::generate_slides(&self.provider, &self.provider, &self.request, |stage| {
                    cell.dispatch(Event::StageChanged(stage));
                });

            let error = match outcome {
                Ok(slides) => {
                    self.slides = slides;
                    self.cell.dispatch(Event::Succeeded);
                    return Ok(self.slides.as_slice());
                }
                Err(e) => e,
            };

            if self.token.is_cancelled() {
                return Err(SlideError::Cancelled);
            }

            let kind = FailureKind::classify(&error);
            warn!("Text generation failed ({:?}): {}", kind, error);
            self.cell.dispatch(Event::Failed(kind));

            if let Some(max) = self.policy.max_retries {
                if retries >= max {
                    warn!("Giving up after {} retries", retries);
                    self.cell.dispatch(Event::Cancel);
                    return Err(error);
                }
            }
            retries += 1;

            if !self.wait_for_retry() {
                return Err(SlideError::Cancelled);
            }
            info!("Retrying generation (attempt {})", retries + 1);
        }
    }

    /// Like [`generate`](Self::generate), also counting slides left without an image.
    pub fn generate_report(&mut self) -> Result<GenerationReport> {
        let slides = self.generate()?.to_vec();
        let images_missing = generator::missing_images(&self.request, &slides);
        Ok(GenerationReport {
            slides,
            images_missing,
        })
    }

    /// Run the countdown. True when the reducer moved back to generating.
    fn wait_for_retry(&self) -> bool {
        let countdown = self
            .countdowns
            .start(RETRY_COUNTDOWN_SECS, self.policy.tick, self.token.clone());

        let mut retry_now = false;
        for event in countdown.events() {
            let state = self.cell.dispatch(event);
            if state.is_generating() {
                retry_now = true;
                break;
            }
            if !state.is_error() {
                break;
            }
        }
        countdown.join();

        retry_now && !self.token.is_cancelled()
    }
}
