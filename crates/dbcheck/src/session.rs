//! Connection sessions with rollback-on-teardown.
//!
//! A [`Session`] owns one pooled connection with an open transaction. Every
//! statement a test executes runs inside that transaction, and closing the
//! session rolls it back, so no test's writes or DDL outlive the test.
//!
//! ```no_run
//! use helios_dbcheck::session::Database;
//!
//! # async fn example() -> Result<(), helios_dbcheck::CheckError> {
//! let db = Database::from_env()?;
//! let session = db.session().await?;
//! session.execute("ALTER TABLE persons ADD COLUMN Age int", &[]).await?;
//! // The new column is gone again once the session is closed.
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;

use deadpool_postgres::{Config, Object, Pool, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row, Statement, ToStatement};

use crate::config::DbConfig;
use crate::error::{CheckError, CheckResult};

/// Upper bound on pooled connections per [`Database`].
const MAX_CONNECTIONS: usize = 2;

fn connection_error(message: impl Into<String>) -> CheckError {
    CheckError::Connection {
        message: message.into(),
    }
}

/// Entry point for opening sessions against one database.
pub struct Database {
    pool: Pool,
    config: DbConfig,
}

impl Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("pool_size", &self.pool.status().size)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Creates a database handle. No connection is made until a session or
    /// health check asks for one.
    pub fn new(config: DbConfig) -> CheckResult<Self> {
        let pool = Self::create_pool(&config)?;
        Ok(Self { pool, config })
    }

    /// Creates a database handle for the profile selected by `TEST_ENV`.
    pub fn from_env() -> CheckResult<Self> {
        Self::new(DbConfig::from_env()?)
    }

    fn create_pool(config: &DbConfig) -> CheckResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = config.host.clone();
        cfg.port = config.port;
        cfg.dbname = config.dbname.clone();
        cfg.user = config.user.clone();
        cfg.password = config.password.clone();

        let pool = cfg
            .builder(NoTls)
            .map_err(|e| connection_error(format!("Failed to create pool builder: {}", e)))?
            .max_size(MAX_CONNECTIONS)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| connection_error(e.to_string()))?;

        Ok(pool)
    }

    async fn get_client(&self) -> CheckResult<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| connection_error(e.to_string()))
    }

    /// Opens a session: acquires a connection, starts a transaction and runs
    /// the liveness probe.
    pub async fn session(&self) -> CheckResult<Session> {
        let client = self.get_client().await?;

        client
            .batch_execute("BEGIN")
            .await
            .map_err(|e| connection_error(format!("Failed to begin transaction: {}", e)))?;

        let session = Session {
            client: Some(client),
            active: true,
        };
        session.probe().await?;

        tracing::debug!(host = ?self.config.host, dbname = ?self.config.dbname, "Session opened");
        Ok(session)
    }

    /// Runs the liveness probe on a fresh connection outside any transaction.
    pub async fn health_check(&self) -> CheckResult<()> {
        let client = self.get_client().await?;
        liveness(&client).await
    }

    /// Creates the `people` and `persons` tables if they do not exist.
    ///
    /// Runs in auto-commit mode; the tables persist.
    pub async fn install_fixture_schema(&self) -> CheckResult<()> {
        let client = self.get_client().await?;
        crate::schema::install(&client).await?;
        tracing::info!(dbname = ?self.config.dbname, "Fixture schema installed");
        Ok(())
    }
}

async fn liveness(client: &tokio_postgres::Client) -> CheckResult<()> {
    let row = client
        .query_one("SELECT 1", &[])
        .await
        .map_err(|e| CheckError::Liveness {
            message: e.to_string(),
        })?;
    let value: i32 = row.try_get(0).map_err(|e| CheckError::Liveness {
        message: e.to_string(),
    })?;
    if value != 1 {
        return Err(CheckError::Liveness {
            message: format!("SELECT 1 returned {}", value),
        });
    }
    Ok(())
}

/// One test's connection, holding an open transaction.
///
/// Close it with [`Session::close`]. A session dropped without being closed
/// (for example when the test panics) discards its connection instead of
/// returning it to the pool; the server then aborts the open transaction.
pub struct Session {
    /// Option so close and drop can take it.
    client: Option<Object>,
    /// Whether a transaction is open.
    active: bool,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.active)
            .finish()
    }
}

impl Session {
    /// Refuses once the transaction is gone, so nothing runs in auto-commit.
    fn client(&self) -> CheckResult<&Object> {
        match &self.client {
            Some(client) if self.active => Ok(client),
            Some(_) => Err(connection_error("no open transaction")),
            None => Err(connection_error("session already closed")),
        }
    }

    /// Detaches the connection from the pool and closes it. The server aborts
    /// whatever transaction it still holds.
    fn discard(&mut self) {
        self.active = false;
        if let Some(client) = self.client.take() {
            drop(Object::take(client));
        }
    }

    async fn probe(&self) -> CheckResult<()> {
        liveness(self.client()?).await
    }

    /// Returns true while the session holds an open transaction.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Executes a statement, returning the number of rows modified.
    pub async fn execute<T>(
        &self,
        statement: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> CheckResult<u64>
    where
        T: ?Sized + ToStatement,
    {
        Ok(self.client()?.execute(statement, params).await?)
    }

    /// Executes a query, returning all rows.
    pub async fn query<T>(
        &self,
        statement: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> CheckResult<Vec<Row>>
    where
        T: ?Sized + ToStatement,
    {
        Ok(self.client()?.query(statement, params).await?)
    }

    /// Executes a query that must return exactly one row.
    pub async fn query_one<T>(
        &self,
        statement: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> CheckResult<Row>
    where
        T: ?Sized + ToStatement,
    {
        Ok(self.client()?.query_one(statement, params).await?)
    }

    /// Executes a query that returns at most one row.
    pub async fn query_opt<T>(
        &self,
        statement: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> CheckResult<Option<Row>>
    where
        T: ?Sized + ToStatement,
    {
        Ok(self.client()?.query_opt(statement, params).await?)
    }

    /// Executes one or more statements without parameters.
    pub async fn batch_execute(&self, sql: &str) -> CheckResult<()> {
        Ok(self.client()?.batch_execute(sql).await?)
    }

    /// Prepares a statement, reusing the connection's statement cache.
    pub async fn prepare(&self, sql: &str) -> CheckResult<Statement> {
        Ok(self.client()?.prepare_cached(sql).await?)
    }

    /// Discards everything done in the session so far and opens a fresh
    /// transaction.
    ///
    /// If either step fails the connection is discarded and the session is
    /// no longer active.
    pub async fn rollback(&mut self) -> CheckResult<()> {
        let restarted = restart(self.client()?).await;
        if let Err(e) = restarted {
            self.discard();
            return Err(connection_error(format!("Rollback failed: {}", e)));
        }
        tracing::debug!("Session rolled back");
        Ok(())
    }

    /// Rolls back the open transaction and releases the connection.
    pub async fn close(mut self) -> CheckResult<()> {
        if self.client.is_none() {
            return Ok(());
        }

        let rolled_back = self.client()?.batch_execute("ROLLBACK").await;
        if let Err(e) = rolled_back {
            // Never hand a connection in an unknown state back to the pool.
            self.discard();
            return Err(connection_error(format!("Rollback failed: {}", e)));
        }

        self.active = false;
        drop(self.client.take());
        tracing::debug!("Session closed");
        Ok(())
    }
}

async fn restart(client: &Object) -> Result<(), tokio_postgres::Error> {
    client.batch_execute("ROLLBACK").await?;
    client.batch_execute("BEGIN").await
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.client.is_some() && self.active {
            tracing::warn!("Session dropped without close; discarding its connection");
        }
        self.discard();
    }
}
