//! Schema introspection and the fixture schema.
//!
//! Reads go through `information_schema`, which reports identifiers in
//! their folded (lowercase) form: `FirstName` is seen as `firstname`.

use serde::Serialize;

use crate::error::CheckResult;
use crate::session::Session;

/// Schema that holds the fixture tables.
pub const SCHEMA: &str = "public";

/// DDL for the fixture tables.
pub const FIXTURE_DDL: &str = "
    CREATE TABLE IF NOT EXISTS people (
        index serial PRIMARY KEY,
        name varchar(255) NOT NULL,
        dateofbirth date
    );
    CREATE TABLE IF NOT EXISTS persons (
        FirstName varchar,
        FamilyName varchar,
        DateOfBirth date,
        PlaceOfBirth varchar,
        Occupation varchar,
        Hobby varchar
    );
";

/// One row of `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// SQL data type as reported by `information_schema`, e.g. `character varying`.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a column description.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Creates the fixture tables if they do not exist.
pub async fn install(client: &tokio_postgres::Client) -> CheckResult<()> {
    client.batch_execute(FIXTURE_DDL).await?;
    Ok(())
}

/// Lists a table's columns in ordinal order. A missing table yields an
/// empty list.
pub async fn columns(session: &Session, table: &str) -> CheckResult<Vec<ColumnInfo>> {
    let rows = session
        .query(
            "SELECT column_name::text, data_type::text
             FROM information_schema.columns
             WHERE table_schema::text = $1 AND table_name::text = $2
             ORDER BY ordinal_position",
            &[&SCHEMA, &table],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| ColumnInfo::new(row.get::<_, String>(0), row.get::<_, String>(1)))
        .collect())
}

/// Looks up a single column.
pub async fn column(
    session: &Session,
    table: &str,
    column: &str,
) -> CheckResult<Option<ColumnInfo>> {
    let row = session
        .query_opt(
            "SELECT column_name::text, data_type::text
             FROM information_schema.columns
             WHERE table_schema::text = $1 AND table_name::text = $2 AND column_name::text = $3",
            &[&SCHEMA, &table, &column],
        )
        .await?;

    Ok(row.map(|row| ColumnInfo::new(row.get::<_, String>(0), row.get::<_, String>(1))))
}

/// Returns true if the table exists in the fixture schema.
pub async fn table_exists(session: &Session, table: &str) -> CheckResult<bool> {
    let row = session
        .query_opt(
            "SELECT 1 FROM information_schema.tables
             WHERE table_schema::text = $1 AND table_name::text = $2",
            &[&SCHEMA, &table],
        )
        .await?;
    Ok(row.is_some())
}

/// Pairs up columns by position and returns the pairs that differ.
///
/// Columns present on one side only are not reported; compare lengths for
/// added or dropped columns.
pub fn diff_columns(before: &[ColumnInfo], after: &[ColumnInfo]) -> Vec<(ColumnInfo, ColumnInfo)> {
    before
        .iter()
        .zip(after)
        .filter(|(b, a)| b != a)
        .map(|(b, a)| (b.clone(), a.clone()))
        .collect()
}
