//! Built-in word pools for the two pipelines.

const WEBHOOK_TASKS: [&str; 8] = [
    "Setup daily automation",
    "Test Google Sheets integration",
    "Integrate Slack notification",
    "Optimize webhook response time",
    "Add database persistence for DPR",
    "Improve error handling and logging",
    "Deploy n8n and Python app via Docker",
    "Refactor automation scripts",
];

const WEBHOOK_ISSUES: [&str; 6] = [
    "Slow webhook response",
    "Docker container restart delay",
    "n8n timeout issue",
    "Environment variable not loading",
    "Invalid payload format error",
    "Webhook test mode expired",
];

const WEBHOOK_NEXT_PLANS: [&str; 6] = [
    "Add Slack notifications",
    "Store DPR in PostgreSQL database",
    "Enable automatic retry system",
    "Add daily summary email",
    "Integrate with Google Sheets API",
    "Schedule DPR at 6 PM daily",
];

const REPOSITORY_TASKS: [&str; 5] = [
    "Setup daily automation",
    "Integrate Slack notification",
    "Optimize webhook response",
    "Add DPR storage in GitHub",
    "Improve error handling and retry system",
];

const REPOSITORY_ISSUES: [&str; 3] = [
    "API rate limit hit",
    "Network latency detected",
    "Minor formatting issue",
];

const REPOSITORY_NEXT_PLANS: [&str; 3] = [
    "Integrate DPR dashboard in GitHub Pages",
    "Schedule daily runs via cron",
    "Send DPR to Slack channel",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub tasks: Vec<String>,
    pub issues: Vec<String>,
    pub next_plans: Vec<String>,
}

impl Vocabulary {
    pub fn new<T, I, P>(tasks: T, issues: I, next_plans: P) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            issues: issues.into_iter().map(Into::into).collect(),
            next_plans: next_plans.into_iter().map(Into::into).collect(),
        }
    }

    pub fn webhook() -> Self {
        Self::new(WEBHOOK_TASKS, WEBHOOK_ISSUES, WEBHOOK_NEXT_PLANS)
    }

    pub fn repository() -> Self {
        Self::new(REPOSITORY_TASKS, REPOSITORY_ISSUES, REPOSITORY_NEXT_PLANS)
    }
}
