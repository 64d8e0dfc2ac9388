use super::{DeliveryEvent, DeliveryObserver, LogObserver, http_client};
use crate::error::AppError;
use crate::model::Report;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// What to do when the report file for the day already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Single PUT without a `sha`; the content API decides.
    BlindWrite,
    /// Look up the current blob first and send its `sha` so the file is replaced.
    ReplaceExisting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub branch: Option<String>,
    pub reports_dir: String,
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { path: String, status: u16 },
    Rejected { status: u16, body: String },
    Failed { message: String },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

#[derive(Debug, Serialize)]
struct ContentRequest<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExistingContent {
    sha: String,
}

/// `{reports_dir}/dpr_{date}.json`
pub fn report_path(reports_dir: &str, report: &Report) -> String {
    let file_name = format!("dpr_{}.json", report.date);
    if reports_dir.is_empty() {
        file_name
    } else {
        format!("{reports_dir}/{file_name}")
    }
}

pub struct RepositoryClient {
    target: RepositoryTarget,
    client: Client,
    observer: Arc<dyn DeliveryObserver>,
}

impl RepositoryClient {
    pub fn new(target: RepositoryTarget, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            target,
            client: http_client(timeout)?,
            observer: Arc::new(LogObserver),
        })
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn target(&self) -> &RepositoryTarget {
        &self.target
    }

    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.target.api_base, self.target.owner, self.target.repo, path
        )
    }

    /// Commits the report as a JSON file in one request; never retries.
    pub fn upload(&self, report: &Report) -> UploadOutcome {
        let outcome = self.try_upload(report).unwrap_or_else(|err| UploadOutcome::Failed {
            message: err.to_string(),
        });

        let event = match &outcome {
            UploadOutcome::Uploaded { path, status } => DeliveryEvent::Uploaded {
                path: path.clone(),
                status: *status,
            },
            UploadOutcome::Rejected { status, body } => DeliveryEvent::UploadRejected {
                status: *status,
                body: body.clone(),
            },
            UploadOutcome::Failed { message } => DeliveryEvent::UploadFailed {
                message: message.clone(),
            },
        };
        self.observer.observe(&event);
        outcome
    }

    fn try_upload(&self, report: &Report) -> Result<UploadOutcome, AppError> {
        let path = report_path(&self.target.reports_dir, report);
        let url = self.contents_url(&path);
        let content = report.to_pretty_json()?;

        let sha = match self.target.conflict_policy {
            ConflictPolicy::BlindWrite => None,
            ConflictPolicy::ReplaceExisting => self.existing_sha(&url),
        };
        if sha.is_some() {
            self.observer
                .observe(&DeliveryEvent::ExistingFile { path: path.clone() });
        }

        let request = ContentRequest {
            message: format!("Add DPR for {}", report.date),
            content: STANDARD.encode(content.as_bytes()),
            branch: self.target.branch.as_deref(),
            sha,
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.target.token)
            .header(ACCEPT, GITHUB_JSON)
            .json(&request)
            .send()?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(UploadOutcome::Uploaded {
                path,
                status: status.as_u16(),
            });
        }

        Ok(UploadOutcome::Rejected {
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }

    /// Blob sha of the file at `url`, if it exists and is readable.
    fn existing_sha(&self, url: &str) -> Option<String> {
        let mut request = self
            .client
            .get(url)
            .bearer_auth(&self.target.token)
            .header(ACCEPT, GITHUB_JSON);
        if let Some(branch) = self.target.branch.as_deref() {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().ok()?;
        if response.status() != StatusCode::OK {
            return None;
        }
        response
            .json::<ExistingContent>()
            .ok()
            .map(|existing| existing.sha)
    }
}
