//! The `dates` and `config` commands

use crate::commands::{ConfigArgs, DatesArgs};
use crate::error::CliResult;
use chrono::NaiveDate;
use meadows_probe::{load_dotenv, resolve, DateToken, SuiteConfig};
use serde::Serialize;

/// One resolved token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRow {
    /// Token as typed
    pub token: String,
    /// Normalized token
    pub normalized: String,
    /// `YYYY-MM-DD`
    pub iso: String,
    /// `DD/MM/YYYY`
    pub ui: String,
}

/// Resolve every token against `today`
#[must_use]
pub fn resolve_tokens(tokens: &[String], today: NaiveDate) -> Vec<DateRow> {
    tokens
        .iter()
        .map(|raw| {
            let token = DateToken::parse(raw);
            let date = resolve(token, today);
            DateRow {
                token: raw.clone(),
                normalized: token.to_string(),
                iso: date.iso(),
                ui: date.ui(),
            }
        })
        .collect()
}

/// Render the `dates` output
pub fn render_dates(args: &DatesArgs, today: NaiveDate) -> CliResult<String> {
    let rows = resolve_tokens(&args.tokens, today);
    if args.json {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let width = rows.iter().map(|r| r.token.len()).max().unwrap_or(0).max(5);
    let mut out = format!("{:<width$}  {:<10}  {:<10}\n", "TOKEN", "ISO", "UI");
    for row in &rows {
        out.push_str(&format!("{:<width$}  {:<10}  {:<10}\n", row.token, row.iso, row.ui));
    }
    Ok(out)
}

/// Resolve the profile and render it as JSON
pub fn render_config(args: &ConfigArgs) -> CliResult<String> {
    load_dotenv(&args.profile.dotenv)?;
    let config = SuiteConfig::load(&args.profile.config, args.profile.env.as_deref())?;
    Ok(serde_json::to_string_pretty(&config)?)
}
