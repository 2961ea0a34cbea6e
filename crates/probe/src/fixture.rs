//! Data-driven fixtures.
//!
//! A workbook is a YAML document whose top-level keys are sheet names and
//! whose values are lists of rows (column → scalar):
//!
//! ```yaml
//! HomePage:
//!   - expected_title: Restful-booker-platform demo
//!     welcome_text: Welcome to Shady Meadows B&B
//! Sanity:
//!   - check_in: today
//!     check_out: plus_2
//!     firstname: Jane
//! ```
//!
//! Scalars are stringified; `null` and blank cells are treated as absent.
//! Rows are loaded once per process and never mutated.

use crate::result::{ProbeError, ProbeResult};
use serde::Serialize;
use serde_yaml_ng::Value;
use std::path::Path;

/// Sheet holding smoke expectations
pub const HOME_SHEET: &str = "HomePage";

/// Sheet holding booking rows
pub const SANITY_SHEET: &str = "Sanity";

/// One row of a sheet: ordered column → value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScenarioRow {
    cells: Vec<(String, String)>,
}

impl ScenarioRow {
    /// Build a row from `(column, value)` pairs
    #[must_use]
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a column, if present
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Owned value of a column, if present
    #[must_use]
    pub fn owned(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    /// Column names in sheet order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    /// Number of present cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no present cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Value of `field`, or a [`ProbeError::MissingField`] naming the sheet
pub fn require<'a>(value: Option<&'a str>, sheet: &str, field: &str) -> ProbeResult<&'a str> {
    value.ok_or_else(|| ProbeError::MissingField {
        sheet: sheet.to_string(),
        field: field.to_string(),
    })
}

/// Named sheets loaded from one workbook, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<(String, Vec<ScenarioRow>)>,
}

impl Workbook {
    /// Load a workbook file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        if !path.exists() {
            return Err(ProbeError::data_load(format!(
                "Workbook not found at: {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Parse a workbook document
    pub fn from_yaml_str(raw: &str) -> ProbeResult<Self> {
        let doc: Value = serde_yaml_ng::from_str(raw)
            .map_err(|e| ProbeError::data_load(format!("malformed workbook: {e}")))?;
        let Value::Mapping(top) = doc else {
            return Err(ProbeError::data_load("workbook must map sheet names to rows"));
        };

        let mut sheets = Vec::with_capacity(top.len());
        for (name, rows) in top {
            let name = scalar(&name)
                .ok_or_else(|| ProbeError::data_load("sheet names must be scalars"))?;
            let rows = match rows {
                Value::Sequence(rows) => rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| parse_row(&name, i, row))
                    .collect::<ProbeResult<Vec<_>>>()?,
                Value::Null => Vec::new(),
                _ => {
                    return Err(ProbeError::data_load(format!(
                        "sheet \"{name}\" must be a list of rows"
                    )))
                }
            };
            sheets.push((name, rows));
        }
        Ok(Self { sheets })
    }

    /// Rows of a sheet; a missing sheet lists the available ones
    pub fn sheet(&self, name: &str) -> ProbeResult<&[ScenarioRow]> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.as_slice())
            .ok_or_else(|| {
                ProbeError::data_load(format!(
                    "Sheet \"{name}\" not found. Available: {}",
                    self.sheet_names().join(", ")
                ))
            })
    }

    /// Sheet names in document order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Typed smoke rows
    pub fn home_rows(&self) -> ProbeResult<Vec<HomeRow>> {
        Ok(self.sheet(HOME_SHEET)?.iter().map(HomeRow::from_row).collect())
    }

    /// Typed booking rows
    pub fn sanity_rows(&self) -> ProbeResult<Vec<SanityRow>> {
        Ok(self.sheet(SANITY_SHEET)?.iter().map(SanityRow::from_row).collect())
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_row(sheet: &str, index: usize, row: &Value) -> ProbeResult<ScenarioRow> {
    let Value::Mapping(map) = row else {
        return Err(ProbeError::data_load(format!(
            "row {} of sheet \"{sheet}\" is not a mapping",
            index + 1
        )));
    };

    let mut cells = Vec::with_capacity(map.len());
    for (column, cell) in map {
        let column = scalar(column).ok_or_else(|| {
            ProbeError::data_load(format!("non-scalar column name in sheet \"{sheet}\""))
        })?;
        match cell {
            Value::Null => {}
            Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
                return Err(ProbeError::data_load(format!(
                    "cell {column} in row {} of sheet \"{sheet}\" is not a scalar",
                    index + 1
                )))
            }
            other => {
                if let Some(text) = scalar(other).filter(|t| !t.trim().is_empty()) {
                    cells.push((column, text));
                }
            }
        }
    }
    Ok(ScenarioRow { cells })
}

/// Smoke expectations, one `Option` per column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct HomeRow {
    pub expected_title: Option<String>,
    pub welcome_text: Option<String>,
    pub btn_book_now: Option<String>,
    pub btn_check_availability: Option<String>,
    pub btn_single_book_now: Option<String>,
    pub btn_double_book_now: Option<String>,
    pub btn_suite_book_now: Option<String>,
    pub btn_form_submit: Option<String>,
    pub header_main: Option<String>,
    pub rooms: Option<String>,
    pub booking: Option<String>,
    pub amenities: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub admin: Option<String>,
    pub footer_brand: Option<String>,
    pub contact_us: Option<String>,
    pub quick_links: Option<String>,
}

impl HomeRow {
    /// Typed view of a `HomePage` row
    #[must_use]
    pub fn from_row(row: &ScenarioRow) -> Self {
        Self {
            expected_title: row.owned("expected_title"),
            welcome_text: row.owned("welcome_text"),
            btn_book_now: row.owned("btn_book_now"),
            btn_check_availability: row.owned("btn_check_availability"),
            btn_single_book_now: row.owned("btn_single_book_now"),
            btn_double_book_now: row.owned("btn_double_book_now"),
            btn_suite_book_now: row.owned("btn_suite_book_now"),
            btn_form_submit: row.owned("btn_form_submit"),
            header_main: row.owned("header_main"),
            rooms: row.owned("rooms"),
            booking: row.owned("booking"),
            amenities: row.owned("amenities"),
            location: row.owned("location"),
            contact: row.owned("contact"),
            admin: row.owned("admin"),
            footer_brand: row.owned("footer_brand"),
            contact_us: row.owned("contact_us"),
            quick_links: row.owned("quick_links"),
        }
    }

    /// Value of a required column
    pub fn required<'a>(&self, value: &'a Option<String>, field: &str) -> ProbeResult<&'a str> {
        require(value.as_deref(), HOME_SHEET, field)
    }
}

/// Booking inputs, one `Option` per column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct SanityRow {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub single_room: Option<String>,
    pub double_room: Option<String>,
    pub suite_room: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl SanityRow {
    /// Typed view of a `Sanity` row
    #[must_use]
    pub fn from_row(row: &ScenarioRow) -> Self {
        Self {
            check_in: row.owned("check_in"),
            check_out: row.owned("check_out"),
            single_room: row.owned("single_room"),
            double_room: row.owned("double_room"),
            suite_room: row.owned("suite_room"),
            firstname: row.owned("firstname"),
            lastname: row.owned("lastname"),
            email: row.owned("email"),
            phone: row.owned("phone"),
        }
    }

    /// Value of a required column
    pub fn required<'a>(&self, value: &'a Option<String>, field: &str) -> ProbeResult<&'a str> {
        require(value.as_deref(), SANITY_SHEET, field)
    }

    /// Guest details to type into the reservation form
    #[must_use]
    pub fn guest(&self) -> GuestDetails {
        GuestDetails {
            first_name: self.firstname.clone(),
            last_name: self.lastname.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Room-header candidates in single, double, suite order
    #[must_use]
    pub fn room_candidates(&self) -> Vec<&str> {
        [&self.single_room, &self.double_room, &self.suite_room]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .collect()
    }
}

/// Reservation form input. Absent fields are typed as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct GuestDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl GuestDetails {
    /// "first last" for logs
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}
