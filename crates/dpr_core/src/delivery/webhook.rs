use super::{DeliveryEvent, DeliveryObserver, LogObserver, RetryPolicy, http_client};
use crate::config::WebhookConfig;
use crate::error::AppError;
use crate::model::Report;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Terminal state of one delivery call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Delivered { attempts: u32 },
    Exhausted { attempts: u32 },
    MissingEndpoint,
}

impl WebhookOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

pub struct WebhookClient {
    endpoint: Option<String>,
    retry: RetryPolicy,
    client: Client,
    observer: Arc<dyn DeliveryObserver>,
}

impl WebhookClient {
    pub fn new(endpoint: Option<&str>, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            endpoint: endpoint
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            retry: RetryPolicy::default(),
            client: http_client(timeout)?,
            observer: Arc::new(LogObserver),
        })
    }

    pub fn from_config(config: &WebhookConfig, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self::new(config.endpoint(), timeout)?.with_retry(config.retry_policy()))
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// True only when the endpoint answered 200 within the retry budget.
    pub fn deliver(&self, report: &Report) -> bool {
        self.send(report).is_delivered()
    }

    pub fn send(&self, report: &Report) -> WebhookOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            self.observer.observe(&DeliveryEvent::MissingEndpoint);
            return WebhookOutcome::MissingEndpoint;
        };

        let max_attempts = self.retry.attempts();
        for attempt in 1..=max_attempts {
            self.observer.observe(&DeliveryEvent::AttemptStarted {
                attempt,
                max_attempts,
            });

            match self.client.post(endpoint).json(report).send() {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().unwrap_or_default();
                    if status == StatusCode::OK {
                        self.observer
                            .observe(&DeliveryEvent::Delivered { attempt, body });
                        return WebhookOutcome::Delivered { attempts: attempt };
                    }
                    self.observer.observe(&DeliveryEvent::HttpStatus {
                        attempt,
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => self.observer.observe(&DeliveryEvent::TransportError {
                    attempt,
                    message: err.to_string(),
                }),
            }

            if let Some(delay) = self.retry.delay_after(attempt) {
                thread::sleep(delay);
            }
        }

        self.observer.observe(&DeliveryEvent::Exhausted {
            attempts: max_attempts,
        });
        WebhookOutcome::Exhausted {
            attempts: max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WebhookClient, WebhookOutcome};
    use crate::delivery::{DeliveryEvent, DeliveryObserver, RetryPolicy};
    use crate::model::Report;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<DeliveryEvent>>,
    }

    impl DeliveryObserver for RecordingObserver {
        fn observe(&self, event: &DeliveryEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn report() -> Report {
        Report {
            date: "2025-12-20".to_string(),
            tasks_completed: vec!["a".to_string(), "b".to_string()],
            issues_faced: vec!["c".to_string()],
            next_plan: vec!["d".to_string(), "e".to_string()],
            sent_at: "2025-12-20 18:00:00".to_string(),
        }
    }

    fn unused_local_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/hook")
    }

    #[test]
    fn missing_endpoint_fails_without_attempts() {
        let observer = Arc::new(RecordingObserver::default());
        let client = WebhookClient::new(Some("   "), Duration::from_secs(1))
            .unwrap()
            .with_observer(observer.clone());

        let started = Instant::now();
        assert_eq!(client.send(&report()), WebhookOutcome::MissingEndpoint);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![DeliveryEvent::MissingEndpoint]
        );
    }

    #[test]
    fn transport_errors_consume_every_attempt() {
        let observer = Arc::new(RecordingObserver::default());
        let client = WebhookClient::new(Some(&unused_local_url()), Duration::from_secs(2))
            .unwrap()
            .with_retry(RetryPolicy {
                max_attempts: 2,
                delay: Duration::from_millis(10),
                delay_after_final_attempt: false,
            })
            .with_observer(observer.clone());

        assert!(!client.deliver(&report()));

        let events = observer.events.lock().unwrap();
        let errors = events
            .iter()
            .filter(|event| matches!(event, DeliveryEvent::TransportError { .. }))
            .count();
        assert_eq!(errors, 2);
        assert_eq!(
            events.last(),
            Some(&DeliveryEvent::Exhausted { attempts: 2 })
        );
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(WebhookOutcome::Delivered { attempts: 1 }).unwrap();
        assert_eq!(json["outcome"], "delivered");
        assert_eq!(json["attempts"], 1);
    }
}
