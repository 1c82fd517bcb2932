//! Assertion helpers for expected failures.

use std::fmt::Debug;

use helios_dbcheck::{CheckError, CheckResult, DbErrorKind, ValidationError};

/// Asserts that a result is a database error of the expected kind.
///
/// # Panics
///
/// Panics if the result is `Ok`, a non-database error, or a database error
/// of another kind.
pub fn assert_db_error<T: Debug>(result: CheckResult<T>, expected: DbErrorKind) {
    match result {
        Ok(value) => panic!("Expected {} error, got Ok({:?})", expected, value),
        Err(CheckError::Database(err)) => assert_eq!(
            err.kind(),
            expected,
            "Expected {} error, got {} (SQLSTATE {:?}): {}",
            expected,
            err.kind(),
            err.code(),
            err.message().unwrap_or("no server message")
        ),
        Err(other) => panic!("Expected {} error, got {}", expected, other),
    }
}

/// Asserts that a result is an invalid-date validation error.
pub fn assert_invalid_date<T: Debug>(result: Result<T, ValidationError>, value: &str) {
    match result {
        Ok(parsed) => panic!("Expected {:?} to be rejected, got {:?}", value, parsed),
        Err(ValidationError::InvalidDate { value: v, .. }) => {
            assert_eq!(v, value, "Rejected value mismatch");
        }
    }
}
