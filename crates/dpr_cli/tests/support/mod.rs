//! Shared fixtures: a scrubbed `dpr` command and a `tiny_http` endpoint.
#![allow(dead_code)]

use std::io::Read;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tiny_http::{Response, Server};

const CONFIG_ENV_VARS: [&str; 14] = [
    "WEBHOOK_URL",
    "DPR_MAX_ATTEMPTS",
    "DPR_RETRY_DELAY_MS",
    "DPR_TIMEOUT_SECS",
    "DPR_DELAY_AFTER_FINAL",
    "DPR_LOG_FILE",
    "GITHUB_TOKEN",
    "GITHUB_USERNAME",
    "GITHUB_REPO",
    "GITHUB_API_URL",
    "GITHUB_BRANCH",
    "DPR_REPORTS_DIR",
    "DPR_REPLACE_EXISTING",
    "DPR_LOG_LEVEL",
];

/// `dpr` with every config variable removed and the config file pointed
/// at a path inside `dir` that does not exist.
pub fn dpr(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dpr"));
    for name in CONFIG_ENV_VARS {
        command.env_remove(name);
    }
    command
        .current_dir(dir)
        .env("DPR_CONFIG_PATH", dir.join("missing-config.json"));
    command
}

pub struct MockServer {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// `METHOD url` of every request received so far.
    pub fn requests(&self) -> MutexGuard<'_, Vec<String>> {
        self.requests.lock().expect("requests lock")
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

/// Answers every request with `status` and `body`.
pub fn start(status: u16, body: &'static str) -> MockServer {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut payload = Vec::new();
            let _ = request.as_reader().read_to_end(&mut payload);
            recorded
                .lock()
                .expect("requests lock")
                .push(format!("{} {}", request.method(), request.url()));
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });

    MockServer { base, requests }
}
