use crate::error::AppError;
use reqwest::blocking::Client;
use std::time::Duration;

mod repository;
mod webhook;

pub use repository::{ConflictPolicy, RepositoryClient, RepositoryTarget, UploadOutcome, report_path};
pub use webhook::{WebhookClient, WebhookOutcome};

const USER_AGENT: &str = concat!("dpr/", env!("CARGO_PKG_VERSION"));

/// Something that happened while delivering a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    MissingEndpoint,
    AttemptStarted { attempt: u32, max_attempts: u32 },
    Delivered { attempt: u32, body: String },
    HttpStatus { attempt: u32, status: u16, body: String },
    TransportError { attempt: u32, message: String },
    Exhausted { attempts: u32 },
    ExistingFile { path: String },
    Uploaded { path: String, status: u16 },
    UploadRejected { status: u16, body: String },
    UploadFailed { message: String },
}

pub trait DeliveryObserver: Send + Sync {
    fn observe(&self, event: &DeliveryEvent);
}

/// Forwards delivery events to the `log` facade.
pub struct LogObserver;

impl DeliveryObserver for LogObserver {
    fn observe(&self, event: &DeliveryEvent) {
        match event {
            DeliveryEvent::MissingEndpoint => log::error!("Missing WEBHOOK_URL configuration."),
            DeliveryEvent::AttemptStarted {
                attempt,
                max_attempts,
            } => log::info!("Attempt {attempt}/{max_attempts} sending DPR..."),
            DeliveryEvent::Delivered { body, .. } => {
                log::info!("DPR sent successfully!");
                log::info!("Response: {body}");
            }
            DeliveryEvent::HttpStatus { status, body, .. } => log::warn!("HTTP {status}: {body}"),
            DeliveryEvent::TransportError { message, .. } => {
                log::error!("Connection error: {message}")
            }
            DeliveryEvent::Exhausted { .. } => {
                log::error!("All attempts failed. Check webhook or server logs.")
            }
            DeliveryEvent::ExistingFile { path } => log::info!("Replacing existing {path}"),
            DeliveryEvent::Uploaded { path, .. } => log::info!("DPR uploaded successfully as {path}"),
            DeliveryEvent::UploadRejected { status, body } => {
                log::error!("Upload failed: {status} - {body}")
            }
            DeliveryEvent::UploadFailed { message } => log::error!("Upload failed: {message}"),
        }
    }
}

pub struct NoopObserver;

impl DeliveryObserver for NoopObserver {
    fn observe(&self, _event: &DeliveryEvent) {}
}

/// Fixed-delay retry budget for webhook delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Also wait after the last failed attempt before giving up.
    pub delay_after_final_attempt: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(3),
            delay_after_final_attempt: false,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pause to take after failed `attempt` (1-based), if any.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.attempts() && !self.delay_after_final_attempt {
            None
        } else {
            Some(self.delay)
        }
    }
}

fn http_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(AppError::from)
}
