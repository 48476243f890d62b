//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per bounded context.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate models before SQL mutations.
//! - Check-then-write sequences that guard invariants run inside one
//!   `Immediate` transaction on the owning connection.
//! - Repository APIs return semantic errors (not-found, conflicts) in
//!   addition to DB transport errors.

use chrono::NaiveDate;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attendance_repo;
pub mod catalog_repo;
pub mod library_repo;
pub mod registry_repo;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Schema readiness failure shared by repository constructors.
#[derive(Debug)]
pub enum SchemaError {
    /// Connection was not bootstrapped through `db::open_db*`.
    Uninitialized {
        expected_version: u32,
        actual_version: u32,
    },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    Db(rusqlite::Error),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: user_version {actual_version}, expected {expected_version}"
            ),
            Self::MissingTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingColumn { table, column } => {
                write!(f, "missing required column `{column}` in table `{table}`")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

/// Table requirement checked by repository constructors.
pub(crate) struct TableSpec {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// Verifies that the connection was migrated and carries the tables/columns
/// a repository relies on. Probing failures surface as `SchemaError::Db`.
pub(crate) fn ensure_schema(conn: &Connection, required: &[TableSpec]) -> Result<(), SchemaError> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(SchemaError::Db)?;
    if actual_version < expected_version {
        return Err(SchemaError::Uninitialized {
            expected_version,
            actual_version,
        });
    }

    for spec in required {
        if !table_exists(conn, spec.table)? {
            return Err(SchemaError::MissingTable(spec.table));
        }
        for column in spec.columns {
            if !table_has_column(conn, spec.table, column)? {
                return Err(SchemaError::MissingColumn {
                    table: spec.table,
                    column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, SchemaError> {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .map_err(SchemaError::Db)?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, SchemaError> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .map_err(SchemaError::Db)?;
    let mut rows = stmt.query([]).map_err(SchemaError::Db)?;
    while let Some(row) = rows.next().map_err(SchemaError::Db)? {
        let current: String = row.get(1).map_err(SchemaError::Db)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Encodes a calendar day as ISO `YYYY-MM-DD` text. Lexicographic order of
/// the stored text matches chronological order, so SQL range comparisons on
/// day columns stay correct.
pub(crate) fn day_to_db(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Decodes a stored day value; the error message names the offending column.
pub(crate) fn parse_day(column: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .map_err(|_| format!("invalid date value `{value}` in {column}"))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{day_to_db, parse_day};
    use chrono::NaiveDate;

    #[test]
    fn day_codec_roundtrips_iso_dates() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let encoded = day_to_db(day);
        assert_eq!(encoded, "2026-03-09");
        assert_eq!(parse_day("loans.issued_on", &encoded).unwrap(), day);
    }

    #[test]
    fn parse_day_names_column_on_corrupt_value() {
        let err = parse_day("loans.due_on", "03/09/2026").unwrap_err();
        assert!(err.contains("loans.due_on"));
        assert!(err.contains("03/09/2026"));
    }
}
