//! Connection pools for the channel registry database.
//!
//! Writes go through a single-connection pool so SQLite never sees two
//! writers; reads share a small read-only pool. WAL lets the scheduler list
//! channels while a register command is writing. Connections are checked out
//! per query and returned on every exit path.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// How long a registry call waits for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reader and writer pools over the same registry file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) the registry database and apply migrations.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(write_opts)
            .await?;

        // The read-only pool cannot create the schema.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Open an existing registry file without creating it or applying
    /// migrations. Both handles share one read-only pool.
    pub async fn open_read_only(database_url: &str) -> Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(false)
            .read_only(true);

        let reader = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(opts)
            .await?;

        Ok(Self {
            writer: reader.clone(),
            reader,
        })
    }

    /// An empty registry that lives only as long as the pool.
    ///
    /// A single connection that never idles out, since an in-memory SQLite
    /// database disappears with its last connection.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        Ok(Self {
            reader: pool.clone(),
            writer: pool,
        })
    }

    /// Open the registry inside `data_dir`.
    ///
    /// In dry-run mode nothing on disk is created or migrated: an existing
    /// registry is opened read-only, a missing one is replaced by an empty
    /// in-memory registry.
    pub async fn open_registry(data_dir: &Path, dry_run: bool) -> Result<Self, sqlx::Error> {
        if !dry_run {
            return Self::new(&database_url(data_dir)).await;
        }

        if tokio::fs::try_exists(data_dir.join(DATABASE_FILE)).await? {
            Self::open_read_only(&database_url(data_dir)).await
        } else {
            tracing::info!(
                data_dir = %data_dir.display(),
                "dry run: no registry on disk, using an empty in-memory registry"
            );
            Self::in_memory().await
        }
    }

    /// Close both pools, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}

/// Registry file name inside the data directory.
pub const DATABASE_FILE: &str = "purgebot.db";

/// SQLite URL for the registry database inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display())
}
