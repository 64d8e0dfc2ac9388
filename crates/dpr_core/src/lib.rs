pub mod config;
pub mod delivery;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod report_api;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::Report;

    #[test]
    fn report_has_required_fields() {
        let report = Report {
            date: "2025-12-20".to_string(),
            tasks_completed: vec!["Setup daily automation".to_string()],
            issues_faced: vec!["n8n timeout issue".to_string()],
            next_plan: vec!["Add daily summary email".to_string()],
            sent_at: "2025-12-20 18:00:00".to_string(),
        };

        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(
            keys,
            vec!["date", "issues_faced", "next_plan", "sent_at", "tasks_completed"]
        );
        assert_eq!(json["tasks_completed"][0], "Setup daily automation");
    }

    #[test]
    fn report_pretty_json_keeps_field_order() {
        let report = Report {
            date: "2025-12-20".to_string(),
            tasks_completed: vec![],
            issues_faced: vec![],
            next_plan: vec![],
            sent_at: "2025-12-20 18:00:00".to_string(),
        };

        let pretty = report.to_pretty_json().unwrap();
        let date_at = pretty.find("\"date\"").unwrap();
        let sent_at = pretty.find("\"sent_at\"").unwrap();
        assert!(date_at < sent_at);
        assert!(pretty.starts_with("{\n  \"date\""));
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::configuration("missing WEBHOOK_URL");
        assert_eq!(err.code(), "configuration_error");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "configuration_error - missing WEBHOOK_URL");
        assert!(!AppError::network("refused").is_fatal());
    }
}
