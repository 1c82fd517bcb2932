//! Error types for the check harness.
//!
//! Errors fall into two tiers. Configuration, connection and liveness
//! failures are fatal to the test that hit them. Database errors raised by
//! the statements a test executes are returned unchanged so the test can
//! assert on their [`DbErrorKind`].

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// The primary error type for all harness operations.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Profile or connection-parameter resolution errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The database could not be reached.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The liveness probe did not return the expected scalar.
    #[error("liveness check failed: {message}")]
    Liveness { message: String },

    /// Errors raised by the database while executing a statement
    #[error(transparent)]
    Database(#[from] DbError),

    /// Input rejected before it reached the database
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CheckError {
    /// Returns the database error kind, if this is a database error.
    pub fn db_kind(&self) -> Option<DbErrorKind> {
        match self {
            CheckError::Database(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Returns true if this error is fatal to the harness rather than the
    /// outcome of a statement.
    pub fn is_harness_fatal(&self) -> bool {
        matches!(
            self,
            CheckError::Config(_) | CheckError::Connection { .. } | CheckError::Liveness { .. }
        )
    }
}

/// Errors related to profile selection and connection parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `TEST_ENV` named a profile that does not exist.
    #[error("unknown environment: {name}")]
    UnknownProfile { name: String },

    /// A port variable is set but is not a valid port number.
    #[error("invalid port in {variable}: {value:?}")]
    InvalidPort { variable: String, value: String },
}

/// Errors for input rejected at a typed boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The value is not a calendar date in the supported range.
    #[error("invalid date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },
}

/// Classification of database errors by SQLSTATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbErrorKind {
    /// 42P01
    UndefinedTable,
    /// 42703
    UndefinedColumn,
    /// 42701
    DuplicateColumn,
    /// 42804
    DatatypeMismatch,
    /// 23502
    NotNullViolation,
    /// 22001
    StringDataRightTruncation,
    /// 22007
    InvalidDatetimeFormat,
    /// 22008
    DatetimeFieldOverflow,
    /// 42601
    SyntaxError,
    /// Any other SQLSTATE, or an error without one (I/O, protocol).
    Other,
}

impl DbErrorKind {
    /// Maps a five-character SQLSTATE to a kind.
    pub fn from_sqlstate(code: &str) -> Self {
        match code {
            "42P01" => DbErrorKind::UndefinedTable,
            "42703" => DbErrorKind::UndefinedColumn,
            "42701" => DbErrorKind::DuplicateColumn,
            "42804" => DbErrorKind::DatatypeMismatch,
            "23502" => DbErrorKind::NotNullViolation,
            "22001" => DbErrorKind::StringDataRightTruncation,
            "22007" => DbErrorKind::InvalidDatetimeFormat,
            "22008" => DbErrorKind::DatetimeFieldOverflow,
            "42601" => DbErrorKind::SyntaxError,
            _ => DbErrorKind::Other,
        }
    }
}

impl fmt::Display for DbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DbErrorKind::UndefinedTable => "undefined table",
            DbErrorKind::UndefinedColumn => "undefined column",
            DbErrorKind::DuplicateColumn => "duplicate column",
            DbErrorKind::DatatypeMismatch => "datatype mismatch",
            DbErrorKind::NotNullViolation => "not-null violation",
            DbErrorKind::StringDataRightTruncation => "string data right truncation",
            DbErrorKind::InvalidDatetimeFormat => "invalid datetime format",
            DbErrorKind::DatetimeFieldOverflow => "datetime field overflow",
            DbErrorKind::SyntaxError => "syntax error",
            DbErrorKind::Other => "database error",
        };
        f.write_str(name)
    }
}

/// An error returned by the PostgreSQL driver while executing a statement.
#[derive(Error, Debug)]
#[error("{kind}: {source}")]
pub struct DbError {
    kind: DbErrorKind,
    #[source]
    source: tokio_postgres::Error,
}

impl DbError {
    /// Returns the classified kind.
    pub fn kind(&self) -> DbErrorKind {
        self.kind
    }

    /// Returns the raw SQLSTATE, if the server sent one.
    pub fn code(&self) -> Option<&str> {
        self.source.code().map(|c| c.code())
    }

    /// Returns the server's primary message, if the server sent one.
    pub fn message(&self) -> Option<&str> {
        self.source.as_db_error().map(|e| e.message())
    }
}

impl From<tokio_postgres::Error> for DbError {
    fn from(source: tokio_postgres::Error) -> Self {
        let kind = source
            .code()
            .map(|c| DbErrorKind::from_sqlstate(c.code()))
            .unwrap_or(DbErrorKind::Other);
        Self { kind, source }
    }
}

impl From<tokio_postgres::Error> for CheckError {
    fn from(err: tokio_postgres::Error) -> Self {
        CheckError::Database(DbError::from(err))
    }
}

/// Result type alias for harness operations.
pub type CheckResult<T> = Result<T, CheckError>;
