//! Typed access to the `people` table.
//!
//! `people(index serial primary key, name varchar(255) not null, dateofbirth date)`

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use tokio_postgres::Row;

use crate::error::{CheckResult, ValidationError};
use crate::session::Session;

/// Longest name the `name` column accepts.
pub const NAME_MAX_LEN: usize = 255;

/// Earliest accepted year.
pub const MIN_YEAR: i32 = 1;

/// Latest accepted year.
pub const MAX_YEAR: i32 = 9999;

/// A date of birth in `YYYY-MM-DD` form, between `0001-01-01` and `9999-12-31`.
///
/// PostgreSQL's `date` type reaches far beyond year 9999, so the four-digit
/// year window is enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Parses a `YYYY-MM-DD` date.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidDate {
            value: value.to_string(),
            reason,
        };

        let date = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => return Err(invalid(e.to_string())),
        };
        Self::try_from(date).map_err(|err| match err {
            ValidationError::InvalidDate { reason, .. } => invalid(reason),
        })
    }

    /// Returns the calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl TryFrom<NaiveDate> for BirthDate {
    type Error = ValidationError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            Ok(Self(date))
        } else {
            Err(ValidationError::InvalidDate {
                value: date.to_string(),
                reason: format!("year must be between {MIN_YEAR} and {MAX_YEAR}"),
            })
        }
    }
}

impl FromStr for BirthDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Primary key.
    pub index: i32,
    /// Name.
    pub name: String,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
}

impl Person {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            index: row.try_get(0)?,
            name: row.try_get(1)?,
            date_of_birth: row.try_get(2)?,
        })
    }
}

/// A row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    /// Name.
    pub name: String,
    /// Date of birth.
    pub date_of_birth: Option<BirthDate>,
}

impl NewPerson {
    /// Creates a row from a name and a `YYYY-MM-DD` date.
    pub fn new(name: impl Into<String>, date_of_birth: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.into(),
            date_of_birth: Some(BirthDate::parse(date_of_birth)?),
        })
    }
}

const INSERT: &str = "INSERT INTO people (name, dateofbirth) VALUES ($1, $2)";

/// Inserts a row and returns its key.
pub async fn insert(session: &Session, person: &NewPerson) -> CheckResult<i32> {
    let date = person.date_of_birth.map(|d| d.date());
    let row = session
        .query_one(
            "INSERT INTO people (name, dateofbirth) VALUES ($1, $2) RETURNING index",
            &[&person.name, &date],
        )
        .await?;
    Ok(row.try_get(0)?)
}

/// Inserts rows one by one through a prepared statement. Returns the number
/// of rows inserted.
pub async fn insert_many(session: &Session, people: &[NewPerson]) -> CheckResult<u64> {
    let statement = session.prepare(INSERT).await?;
    let mut inserted = 0;
    for person in people {
        let date = person.date_of_birth.map(|d| d.date());
        inserted += session.execute(&statement, &[&person.name, &date]).await?;
    }
    Ok(inserted)
}

/// Reads a row by key.
pub async fn find(session: &Session, index: i32) -> CheckResult<Option<Person>> {
    let row = session
        .query_opt(
            "SELECT index, name, dateofbirth FROM people WHERE index = $1",
            &[&index],
        )
        .await?;
    Ok(row.as_ref().map(Person::from_row).transpose()?)
}

/// Reads the first row with the given name.
pub async fn find_by_name(session: &Session, name: &str) -> CheckResult<Option<Person>> {
    let row = session
        .query_opt(
            "SELECT index, name, dateofbirth FROM people WHERE name = $1 ORDER BY index LIMIT 1",
            &[&name],
        )
        .await?;
    Ok(row.as_ref().map(Person::from_row).transpose()?)
}

/// Lists all rows ordered by name, then date of birth.
pub async fn list(session: &Session) -> CheckResult<Vec<Person>> {
    let rows = session
        .query(
            "SELECT index, name, dateofbirth FROM people ORDER BY name, dateofbirth",
            &[],
        )
        .await?;
    Ok(rows.iter().map(Person::from_row).collect::<Result<_, _>>()?)
}

/// Renames the row with the given key. Returns the number of rows updated.
pub async fn update_name(session: &Session, index: i32, name: &str) -> CheckResult<u64> {
    session
        .execute("UPDATE people SET name = $1 WHERE index = $2", &[&name, &index])
        .await
}

/// Deletes the row with the given key. Returns the number of rows deleted.
pub async fn delete(session: &Session, index: i32) -> CheckResult<u64> {
    session
        .execute("DELETE FROM people WHERE index = $1", &[&index])
        .await
}

/// Counts all rows.
pub async fn count(session: &Session) -> CheckResult<i64> {
    let row = session.query_one("SELECT COUNT(*) FROM people", &[]).await?;
    Ok(row.try_get(0)?)
}

/// Returns the largest key, or 0 for an empty table.
pub async fn max_index(session: &Session) -> CheckResult<i32> {
    let row = session
        .query_one("SELECT COALESCE(MAX(index), 0) FROM people", &[])
        .await?;
    Ok(row.try_get(0)?)
}
