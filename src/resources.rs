// ABOUTME: Resource handling for the impact-slides application
// ABOUTME: Loads local or remote images such as the brand logo

use crate::canvas;
use crate::errors::{Result, SlideError};
use log::{debug, info};
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tiny_skia::Pixmap;

/// Brand logo drawn at the top of every slide.
pub const DEFAULT_LOGO_URL: &str =
    "https://v0-users-assets.s3.us-east-1.amazonaws.com/uploads/user-22920625/image.png";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_ATTEMPTS: u32 = 3;
const FETCH_FIRST_DELAY: Duration = Duration::from_millis(1000);

/// An image that can be either a local file or a URL.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub path: String,
    pub is_remote: bool,
}

impl ImageSource {
    /// `path` is treated as remote when it carries an http(s) scheme.
    pub fn new(path: &str) -> Self {
        let is_remote = path.starts_with("http://") || path.starts_with("https://");
        Self {
            path: path.to_string(),
            is_remote,
        }
    }

    /// Raw bytes of the image, fetched or read from disk.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        if self.is_remote {
            self.fetch_remote_bytes()
        } else {
            self.read_local_bytes()
        }
    }

    /// Decoded image ready to be drawn on a canvas.
    pub fn load_pixmap(&self) -> Result<Pixmap> {
        canvas::decode_pixmap(&self.bytes()?)
    }

    /// Download the image, retrying transient failures with a doubling delay.
    fn fetch_remote_bytes(&self) -> Result<Vec<u8>> {
        info!("Fetching remote image: {}", self.path);

        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(SlideError::FetchError)?;

        let mut delay = FETCH_FIRST_DELAY;
        let mut attempt = 1;
        loop {
            let error = match client.get(&self.path).send() {
                Ok(response) if response.status().is_success() => {
                    let body = response.bytes().map_err(SlideError::FetchError)?;
                    return Ok(body.to_vec());
                }
                Ok(response) => SlideError::ApiError {
                    status: response.status().as_u16(),
                    message: format!("could not download {}", self.path),
                },
                Err(e) => SlideError::FetchError(e),
            };

            if attempt >= FETCH_ATTEMPTS {
                return Err(error);
            }
            debug!(
                "Image fetch attempt {}/{} failed ({}), waiting {:?}",
                attempt, FETCH_ATTEMPTS, error, delay
            );
            std::thread::sleep(delay);
            delay *= 2;
            attempt += 1;
        }
    }

    fn read_local_bytes(&self) -> Result<Vec<u8>> {
        debug!("Reading local image: {}", self.path);
        let path = Path::new(&self.path);
        fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SlideError::PathNotFoundError(path.to_path_buf()),
            _ => SlideError::FileReadError(e),
        })
    }
}
