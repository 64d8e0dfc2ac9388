use crate::config::Config;
use crate::delivery::{
    DeliveryObserver, LogObserver, RepositoryClient, UploadOutcome, WebhookClient, WebhookOutcome,
};
use crate::error::AppError;
use crate::generator::ReportGenerator;
use crate::model::Report;
use std::sync::Arc;

const RULE: &str = "─────────────────────────────────────────────";

#[derive(Debug, Clone)]
pub struct Dispatch<O> {
    pub report: Report,
    pub outcome: O,
}

pub fn preview_report(fixed: bool) -> Result<Report, AppError> {
    let generator = if fixed {
        ReportGenerator::repository()
    } else {
        ReportGenerator::webhook()
    };
    generator.generate()
}

/// Webhook pipeline: generate, log, POST with retries.
///
/// Exhausting every attempt is not an error; a missing endpoint is, and it is
/// reported before anything is generated or logged.
pub fn send_report(config: &Config) -> Result<Dispatch<WebhookOutcome>, AppError> {
    send_report_with(config, &ReportGenerator::webhook(), Arc::new(LogObserver))
}

pub fn send_report_with(
    config: &Config,
    generator: &ReportGenerator,
    observer: Arc<dyn DeliveryObserver>,
) -> Result<Dispatch<WebhookOutcome>, AppError> {
    if config.webhook.endpoint().is_none() {
        return Err(missing_endpoint());
    }

    log::info!("Starting Auto-DPR Send Process...");
    log::info!("{RULE}");

    // Local offset lookup can fail once the HTTP client has spawned threads.
    let report = generator.generate()?;
    log_generated(&report)?;
    let client =
        WebhookClient::from_config(&config.webhook, config.timeout())?.with_observer(observer);

    let outcome = client.send(&report);

    log::info!("{RULE}");
    log::info!("Process Finished");

    if outcome == WebhookOutcome::MissingEndpoint {
        return Err(missing_endpoint());
    }
    Ok(Dispatch { report, outcome })
}

/// Repository pipeline: validate the target before anything else, then
/// generate and commit the report in a single request.
pub fn upload_report(config: &Config) -> Result<Dispatch<UploadOutcome>, AppError> {
    upload_report_with(config, &ReportGenerator::repository(), Arc::new(LogObserver))
}

pub fn upload_report_with(
    config: &Config,
    generator: &ReportGenerator,
    observer: Arc<dyn DeliveryObserver>,
) -> Result<Dispatch<UploadOutcome>, AppError> {
    let target = config.repository.target()?;

    log::info!("Generating DPR and uploading to GitHub...");
    let report = generator.generate()?;
    log_generated(&report)?;
    let client = RepositoryClient::new(target, config.timeout())?.with_observer(observer);

    let outcome = client.upload(&report);
    log::info!("Process Finished.");

    Ok(Dispatch { report, outcome })
}

fn missing_endpoint() -> AppError {
    AppError::configuration("webhook.url is not set (WEBHOOK_URL)")
}

fn log_generated(report: &Report) -> Result<(), AppError> {
    log::info!("Generated DPR:");
    log::info!("{}", report.to_pretty_json()?);
    Ok(())
}
