//! Date tokens: symbolic dates resolved at run time.
//!
//! The booking widget pre-fills check-in with today and check-out with
//! tomorrow, and the data sheets describe stays relative to the run date
//! (`today`, `tomorrow`, `plus_3`). A token resolves against a reference day
//! and renders in two forms:
//!
//! - ISO: `YYYY-MM-DD`
//! - UI: `DD/MM/YYYY` (what the date inputs display)
//!
//! Parsing is permissive: an unknown or empty token is `today`, and a
//! `plus_` suffix that does not start with digits means zero days.

use chrono::{Datelike, Days, Local, NaiveDate};
use std::fmt;

/// Symbolic date relative to the reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateToken {
    /// The reference day itself
    #[default]
    Today,
    /// One day after the reference day
    Tomorrow,
    /// N days after the reference day
    PlusDays(u32),
}

impl DateToken {
    /// Parse a token. Never fails; see module docs for the fallback rules.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let token = raw.trim().to_lowercase();
        if token == "tomorrow" {
            return Self::Tomorrow;
        }
        if let Some(suffix) = token.strip_prefix("plus_") {
            return Self::PlusDays(leading_digits(suffix));
        }
        Self::Today
    }

    /// Number of days this token moves away from the reference day
    #[must_use]
    pub const fn offset_days(&self) -> u32 {
        match self {
            Self::Today => 0,
            Self::Tomorrow => 1,
            Self::PlusDays(n) => *n,
        }
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::Tomorrow => write!(f, "tomorrow"),
            Self::PlusDays(n) => write!(f, "plus_{n}"),
        }
    }
}

impl From<&str> for DateToken {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Leading ASCII digits of `s` as a day count, 0 when there are none.
fn leading_digits(s: &str) -> u32 {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
}

/// A token resolved to a concrete calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedDate {
    date: NaiveDate,
}

impl ResolvedDate {
    /// Wrap a calendar day
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// The underlying calendar day
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// `YYYY-MM-DD`
    #[must_use]
    pub fn iso(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }

    /// `DD/MM/YYYY`
    #[must_use]
    pub fn ui(&self) -> String {
        format!(
            "{:02}/{:02}/{:04}",
            self.date.day(),
            self.date.month(),
            self.date.year()
        )
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ui())
    }
}

/// Resolve a token against a reference day.
///
/// Day-granularity calendar addition; saturates at the last representable
/// date instead of overflowing.
#[must_use]
pub fn resolve(token: DateToken, reference: NaiveDate) -> ResolvedDate {
    let date = reference
        .checked_add_days(Days::new(u64::from(token.offset_days())))
        .unwrap_or(NaiveDate::MAX);
    ResolvedDate::new(date)
}

/// Resolve a token against the host's local calendar day.
#[must_use]
pub fn resolve_now(token: DateToken) -> ResolvedDate {
    resolve(token, Local::now().date_naive())
}

/// Shorthand: parse `raw` and render it in UI form for today.
#[must_use]
pub fn to_ui_date(raw: &str) -> String {
    resolve_now(DateToken::parse(raw)).ui()
}

/// Shorthand: parse `raw` and render it in ISO form for today.
#[must_use]
pub fn to_iso_date(raw: &str) -> String {
    resolve_now(DateToken::parse(raw)).iso()
}

/// Parse a `DD/MM/YYYY` rendering back into a calendar day.
#[must_use]
pub fn parse_ui(ui: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(ui.trim(), "%d/%m/%Y").ok()
}
