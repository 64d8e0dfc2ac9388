use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub date: String,
    pub tasks_completed: Vec<String>,
    pub issues_faced: Vec<String>,
    pub next_plan: Vec<String>,
    pub sent_at: String,
}

impl Report {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
