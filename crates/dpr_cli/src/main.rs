use clap::Parser;
use dpr_cli::cli::{Cli, Command, parse_config_override};
use dpr_core::config::{Config, ConfigKey, load_config_with_fallback};
use dpr_core::error::AppError;
use dpr_core::logging::{Console, LogDestination, init_logging};
use dpr_core::model::Report;
use dpr_core::report_api;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn report_rows(report: &Report) -> Vec<ReportRow> {
    vec![
        ReportRow {
            field: "date",
            value: report.date.clone(),
        },
        ReportRow {
            field: "tasks_completed",
            value: report.tasks_completed.join("\n"),
        },
        ReportRow {
            field: "issues_faced",
            value: report.issues_faced.join("\n"),
        },
        ReportRow {
            field: "next_plan",
            value: report.next_plan.join("\n"),
        },
        ReportRow {
            field: "sent_at",
            value: report.sent_at.clone(),
        },
    ]
}

fn print_report_plain(report: &Report) {
    let mut table = Table::new(report_rows(report));
    table.with(Style::psql());
    println!("{table}");
}

fn print_dispatch_json<O: Serialize>(report: &Report, outcome: &O) -> Result<(), AppError> {
    let json = serde_json::json!({
        "report": report,
        "outcome": outcome,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn parse_overrides(raw: &[String]) -> Result<Vec<(ConfigKey, String)>, AppError> {
    raw.iter()
        .map(|raw| {
            parse_config_override(raw)
                .map_err(|err| AppError::invalid_input(format!("{raw}: {err}")))
        })
        .collect()
}

/// Unreadable or malformed config files fall back to defaults; values that
/// parse but are invalid abort the run.
fn load_config(overrides: &[(ConfigKey, String)]) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        if err.is_fatal() {
            return Err(err);
        }
        eprintln!("WARNING: {err}; using defaults");
    }

    loaded.config.with_env()?.with_overrides(overrides)
}

/// Console logs move to stderr when stdout carries JSON.
fn console_for(json: bool) -> Console {
    if json { Console::Stderr } else { Console::Stdout }
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let overrides = parse_overrides(&cli.config_override)?;

    match cli.command {
        Command::Send => {
            let config = load_config(&overrides)?;
            init_logging(
                &config.log_level,
                LogDestination::file(config.webhook.log_file.clone(), console_for(cli.json)),
            )?;

            let dispatch = report_api::send_report(&config)?;
            if cli.json {
                print_dispatch_json(&dispatch.report, &dispatch.outcome)?;
            }
        }
        Command::Upload => {
            let config = load_config(&overrides)?;
            init_logging(
                &config.log_level,
                LogDestination::console(console_for(cli.json)),
            )?;

            let dispatch = report_api::upload_report(&config)?;
            if cli.json {
                print_dispatch_json(&dispatch.report, &dispatch.outcome)?;
            }
        }
        Command::Preview { fixed } => {
            let report = report_api::preview_report(fixed)?;
            if cli.json {
                println!("{}", report.to_pretty_json()?);
            } else {
                print_report_plain(&report);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
