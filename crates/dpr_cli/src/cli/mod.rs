use clap::{Parser, Subcommand};
use dpr_core::config::ConfigKey;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate daily progress reports and deliver them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a report and POST it to the configured webhook, retrying on failure
    ///
    /// Example: dpr send
    /// Example: dpr send --config-override webhook.max_attempts=5
    Send,
    /// Generate a report and commit it to the configured GitHub repository
    ///
    /// Example: dpr upload
    /// Example: dpr upload --config-override repository.branch=main
    Upload,
    /// Generate a report and print it without delivering it
    ///
    /// Example: dpr preview
    /// Example: dpr preview --fixed --json
    Preview {
        /// Use the repository vocabulary and fixed section sizes
        #[arg(long)]
        fixed: bool,
    },
}

/// Parse a raw `KEY=VALUE` override.
///
/// KEY is either a dotted config key (`webhook.max_attempts`) or the
/// matching environment variable name (`DPR_MAX_ATTEMPTS`).
pub fn parse_config_override(raw: &str) -> Result<(ConfigKey, String), String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let segments = key_raw
        .split('.')
        .map(canonicalize_flag_name)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| "override key cannot be empty".to_string())?;
    let canonical = segments.join(".");

    let key = ConfigKey::from_name(&canonical)
        .or_else(|| {
            ConfigKey::ALL
                .into_iter()
                .find(|key| key.env_var().eq_ignore_ascii_case(&canonical))
        })
        .ok_or_else(|| format!("unknown config field '{canonical}'"))?;

    Ok((key, value_raw.trim().to_string()))
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
