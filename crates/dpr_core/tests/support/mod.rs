//! Scripted HTTP endpoint on `tiny_http` that records every request it sees.
#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Instant;
use tiny_http::{Header, Request, Response, Server};

type Responder = Box<dyn Fn(usize) -> (u16, String) + Send>;

pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub received_at: Instant,
}

impl Recorded {
    /// Header lookup by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json request body")
    }
}

pub struct MockServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn requests(&self) -> MutexGuard<'_, Vec<Recorded>> {
        self.requests.lock().expect("requests lock")
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

/// Answers the n-th request with `responses[n]`, repeating the last entry.
pub fn scripted(responses: Vec<(u16, &'static str)>) -> MockServer {
    spawn(Some(Box::new(move |index| {
        let (status, body) = responses
            .get(index)
            .or(responses.last())
            .copied()
            .unwrap_or((200, "{}"));
        (status, body.to_string())
    })))
}

/// Answers every request with `status`.
pub fn fixed(status: u16) -> MockServer {
    scripted(vec![(status, "{}")])
}

/// Answers the n-th request with `statuses[n]` and a `{"received":n}` body.
pub fn counting(statuses: Vec<u16>) -> MockServer {
    spawn(Some(Box::new(move |index| {
        let status = statuses
            .get(index)
            .or(statuses.last())
            .copied()
            .unwrap_or(200);
        (status, format!("{{\"received\":{}}}", index + 1))
    })))
}

/// Accepts and records requests but never answers them.
pub fn silent() -> MockServer {
    spawn(None)
}

fn spawn(responder: Option<Responder>) -> MockServer {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    thread::spawn(move || {
        // Dropping a request makes tiny_http answer it, so unanswered ones are parked here.
        let mut parked: Vec<Request> = Vec::new();
        for mut request in server.incoming_requests() {
            let mut body = Vec::new();
            let _ = request.as_reader().read_to_end(&mut body);
            let index = {
                let mut requests = recorded.lock().expect("requests lock");
                requests.push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string().to_ascii_lowercase(), h.value.to_string()))
                        .collect(),
                    body,
                    received_at: Instant::now(),
                });
                requests.len() - 1
            };

            match &responder {
                Some(respond) => {
                    let (status, body) = respond(index);
                    let json = Header::from_bytes("Content-Type", "application/json")
                        .expect("content type header");
                    let _ = request.respond(
                        Response::from_string(body)
                            .with_status_code(status)
                            .with_header(json),
                    );
                }
                None => parked.push(request),
            }
        }
    });

    MockServer { base, requests }
}
