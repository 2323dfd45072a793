use std::error::Error;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

use crate::config::DatabaseSettings;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Per-connection pragmas; SQLite keeps foreign key enforcement off unless asked.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub fn init_pool(settings: &DatabaseSettings) -> Result<DbPool, PoolError> {
    let timeout = Duration::from_secs(settings.timeout_seconds);
    let manager = ConnectionManager::<SqliteConnection>::new(&settings.url);
    Pool::builder()
        .max_size(settings.pool_size)
        .connection_timeout(timeout)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: timeout,
        }))
        .build(manager)
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), Box<dyn Error + Send + Sync>> {
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in &applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}
