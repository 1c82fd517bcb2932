//! Typed access to the `persons` table.

use chrono::NaiveDate;

use crate::error::CheckResult;
use crate::session::Session;

/// A `persons` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    /// `FirstName`
    pub first_name: String,
    /// `FamilyName`
    pub family_name: String,
    /// `DateOfBirth`
    pub date_of_birth: NaiveDate,
    /// `PlaceOfBirth`
    pub place_of_birth: String,
    /// `Occupation`
    pub occupation: String,
    /// `Hobby`
    pub hobby: String,
}

/// Inserts a row. Returns the number of rows inserted.
pub async fn insert(session: &Session, record: &PersonRecord) -> CheckResult<u64> {
    session
        .execute(
            "INSERT INTO persons
                 (FirstName, FamilyName, DateOfBirth, PlaceOfBirth, Occupation, Hobby)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &record.first_name,
                &record.family_name,
                &record.date_of_birth,
                &record.place_of_birth,
                &record.occupation,
                &record.hobby,
            ],
        )
        .await
}

/// Counts all rows.
pub async fn count(session: &Session) -> CheckResult<i64> {
    let row = session
        .query_one("SELECT COUNT(*) FROM persons", &[])
        .await?;
    Ok(row.try_get(0)?)
}
