// SPDX-License-Identifier: MIT

//! Shared helpers for footprint date handling.
//!
//! Footprint dates use the `dd/mm/yyyy` wire format and monthly snapshots
//! are keyed by `MM/YYYY`.

use crate::error::AppError;
use chrono::{Datelike, Months, NaiveDate};

/// Parse a `dd/mm/yyyy` date string.
pub fn parse_date_dmy(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").map_err(|_| {
        AppError::BadRequest("Invalid date format. Please use dd/mm/yyyy.".to_string())
    })
}

/// Format a date as `dd/mm/yyyy`.
pub fn format_date_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format the month of a date as `MM/YYYY` (snapshot key).
pub fn month_key(date: NaiveDate) -> String {
    format!("{:02}/{}", date.month(), date.year())
}

/// Month key with `/` replaced by `-`, safe for use in document IDs.
pub fn month_doc_key(month: &str) -> String {
    month.replace('/', "-")
}

/// The same calendar day one month later, clamped to the end of month.
pub fn add_one_month(date: NaiveDate) -> NaiveDate {
    date + Months::new(1)
}
