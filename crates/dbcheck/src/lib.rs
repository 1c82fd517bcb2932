//! Helios database checks
//!
//! This crate exercises a PostgreSQL database's CRUD and schema-migration
//! behavior against two fixture tables, `people` and `persons`. Every check
//! runs in its own [`Session`](session::Session): a connection with an open
//! transaction that is rolled back when the check ends, so checks never
//! change committed state and can run in any order.
//!
//! # Architecture
//!
//! - [`config`] - Profile selection (`TEST_ENV`) and connection parameters
//! - [`session`] - Connection setup, liveness probe and rollback-on-teardown
//! - [`error`] - Error types, including SQLSTATE classification
//! - [`schema`] - `information_schema` reads and the fixture DDL
//! - [`people`], [`persons`] - Typed row access for the fixture tables
//!
//! # Quick Start
//!
//! ```no_run
//! use helios_dbcheck::{Database, people};
//!
//! # async fn example() -> Result<(), helios_dbcheck::CheckError> {
//! let db = Database::from_env()?;
//! let session = db.session().await?;
//!
//! let before = people::count(&session).await?;
//! people::insert(&session, &people::NewPerson::new("Ada", "1815-12-10")?).await?;
//! assert_eq!(people::count(&session).await?, before + 1);
//!
//! // Nothing above is committed.
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Test Suites
//!
//! The catalog under `tests/` needs a database and is gated by features:
//!
//! - `live-db` - use the database selected by `TEST_ENV`
//! - `container` - start a throwaway PostgreSQL with testcontainers

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod people;
pub mod persons;
pub mod schema;
pub mod session;

// Re-export commonly used types at crate root
pub use config::{DbConfig, Profile};
pub use error::{CheckError, CheckResult, ConfigError, DbError, DbErrorKind, ValidationError};
pub use session::{Database, Session};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_dbcheck={},dbcheck={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
