use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, PoolError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

/// Database URL that selects a private in-memory SQLite database.
pub const IN_MEMORY: &str = ":memory:";

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database pool: {0}")]
    Pool(#[from] PoolError),

    #[error("failed to run database migrations: {0}")]
    Migrations(String),
}

#[derive(Debug, Clone)]
pub struct DbOptions {
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

/// Applies per-connection pragmas when r2d2 opens a new connection.
#[derive(Debug)]
struct SqlitePragmas {
    busy_timeout_ms: u64,
    wal: bool,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        let mut pragmas = format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        );
        if self.wal {
            pragmas.push_str(" PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        conn.batch_execute(&pragmas).map_err(r2d2::Error::QueryError)
    }
}

/// Opens the connection pool and brings the schema up to date.
///
/// Every connection of an in-memory database is its own database, so `:memory:`
/// is pinned to a single connection that is never recycled.
pub fn create_pool(database_url: &str, options: &DbOptions) -> Result<DbPool, DbError> {
    let in_memory = database_url == IN_MEMORY;
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    let mut builder = DbPool::builder().connection_customizer(Box::new(SqlitePragmas {
        busy_timeout_ms: options.busy_timeout_ms,
        wal: !in_memory,
    }));
    builder = if in_memory {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(options.pool_size)
    };
    let pool = builder.build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migrations(e.to_string()))?;
    if !applied.is_empty() {
        tracing::info!(count = applied.len(), "applied database migrations");
    }
    drop(conn);

    Ok(pool)
}
