//! Core business logic - framework-agnostic operations over the database.
//!
//! Every mutating operation opens one SeaORM transaction and either commits
//! all of its writes or none of them. The HTTP layer translates requests into
//! these calls and never touches entities directly.

/// Hour-accounting engine: package lifecycle, consumption, aggregates
pub mod accounting;
/// Users, password hashing, and login sessions
pub mod auth;
/// Catalog course package management
pub mod catalog;
/// Class records and consumption-record queries
pub mod records;
/// Student CRUD and pagination
pub mod student;

use crate::errors::{Error, Result};
use chrono::NaiveDate;

/// Parses a `YYYY-MM-DD` date from external input.
///
/// # Errors
/// Returns [`Error::InvalidDate`] for anything that does not parse; unlike
/// the system this replaces, bad dates are rejected instead of ignored.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_date_valid() {
        let date = parse_date("2024-03-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        for value in ["", "05/03/2024", "2024-13-01", "yesterday"] {
            let result = parse_date(value);
            assert!(matches!(result, Err(Error::InvalidDate { .. })), "{value}");
        }
    }
}
