//! Per-test session lifecycle.
//!
//! [`TestSession::start`] resolves the shared configuration once per test
//! binary, waits for any other test's session to finish, opens a session and
//! fails the test immediately if the database is unreachable.
//! [`TestSession::finish`] rolls the session back. A test that panics before
//! calling `finish` drops its session, which discards the connection and
//! with it the open transaction.

use std::ops::{Deref, DerefMut};

use helios_dbcheck::{Database, DbConfig, Session};
use tokio::sync::{Mutex, MutexGuard, OnceCell};

/// Held by the running test's session; sessions never overlap.
static SERIAL: Mutex<()> = Mutex::const_new(());

/// Configuration shared by every test in the binary.
struct SharedDb {
    config: DbConfig,
    /// Kept alive for the duration of the test binary; dropped at process exit.
    #[cfg(feature = "container")]
    _container: testcontainers::ContainerAsync<testcontainers_modules::postgres::Postgres>,
}

static SHARED_DB: OnceCell<SharedDb> = OnceCell::const_new();

/// Resolves the profile selected by `TEST_ENV`. The schema must already exist.
#[cfg(not(feature = "container"))]
async fn init_shared_db() -> SharedDb {
    let config =
        DbConfig::from_env().unwrap_or_else(|e| panic!("Database configuration failed: {}", e));
    SharedDb { config }
}

/// Starts a PostgreSQL container and installs the fixture schema in it.
#[cfg(feature = "container")]
async fn init_shared_db() -> SharedDb {
    use testcontainers::ImageExt;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::postgres::Postgres;

    let run_id = std::env::var("GITHUB_RUN_ID").unwrap_or_default();
    let container = Postgres::default()
        .with_label("github.run_id", &run_id)
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get host port");

    let host = container
        .get_host()
        .await
        .expect("Failed to get host")
        .to_string();

    let config = DbConfig {
        host: Some(host),
        port: Some(port),
        dbname: Some("postgres".to_string()),
        user: Some("postgres".to_string()),
        password: Some("postgres".to_string()),
    };

    Database::new(config.clone())
        .expect("Failed to create database handle")
        .install_fixture_schema()
        .await
        .expect("Failed to install fixture schema");

    SharedDb {
        config,
        _container: container,
    }
}

/// Returns the configuration every session in this binary connects with.
pub async fn shared_config() -> &'static DbConfig {
    &SHARED_DB.get_or_init(init_shared_db).await.config
}

/// Waits until no other test holds a session. Tests that open sessions
/// directly from a [`Database`] hold the guard for their whole body.
pub async fn lock_sessions() -> MutexGuard<'static, ()> {
    SERIAL.lock().await
}

/// Creates a database handle with its own pool for the shared configuration.
pub async fn shared_database() -> Database {
    match Database::new(shared_config().await.clone()) {
        Ok(db) => db,
        Err(e) => panic!("Database connection failed: {}", e),
    }
}

/// A test's database session.
///
/// Dereferences to [`Session`], so tests call statement methods on it
/// directly.
pub struct TestSession {
    // Field order is drop order: the session goes before the serial guard.
    session: Session,
    _db: Database,
    _serial: MutexGuard<'static, ()>,
}

impl TestSession {
    /// Opens a session, failing the test if the database is unreachable.
    pub async fn start() -> Self {
        let serial = lock_sessions().await;
        let db = shared_database().await;
        let session = db
            .session()
            .await
            .unwrap_or_else(|e| panic!("Database connection failed: {}", e));

        Self {
            session,
            _db: db,
            _serial: serial,
        }
    }

    /// Rolls back everything the test did and releases the connection.
    pub async fn finish(self) {
        let TestSession {
            session,
            _db,
            _serial,
        } = self;
        session.close().await.expect("Failed to roll back session");
    }
}

impl Deref for TestSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for TestSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}
