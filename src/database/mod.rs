//! Database module
//!
//! Storage is reached through the `Abstract*` traits in [`repositories`].
//! Two drivers implement them: Postgres (production) and an in-memory
//! reference store used by tests and local runs. [`Database`] dereferences
//! to whichever driver was configured.

pub mod connection;
pub mod reference;
pub mod repositories;

pub use connection::{create_pool, health_check, run_migrations, DatabasePool, PoolConfig, PostgresDb};
pub use reference::ReferenceDb;
pub use repositories::{AbstractAttendees, AbstractEvents, AbstractUsers};

use crate::config::{DatabaseConfig, DatabaseDriver};
use crate::utils::errors::Result;

/// Every storage operation the application needs
pub trait AbstractDatabase: Sync + Send + AbstractUsers + AbstractEvents + AbstractAttendees {}

impl AbstractDatabase for ReferenceDb {}
impl AbstractDatabase for PostgresDb {}

/// Configured storage driver
#[derive(Clone)]
pub enum Database {
    Reference(ReferenceDb),
    Postgres(PostgresDb),
}

impl std::ops::Deref for Database {
    type Target = dyn AbstractDatabase;

    fn deref(&self) -> &Self::Target {
        match self {
            Database::Reference(reference) => reference,
            Database::Postgres(postgres) => postgres,
        }
    }
}

impl Database {
    /// Connect the driver selected in configuration, running migrations for Postgres
    pub async fn connect(config: &DatabaseConfig) -> Result<Database> {
        match config.driver {
            DatabaseDriver::Reference => {
                tracing::warn!("Using in-memory reference database, data will not persist");
                Ok(Database::Reference(ReferenceDb::default()))
            }
            DatabaseDriver::Postgres => {
                let pool = create_pool(&PoolConfig::from(config)).await?;
                run_migrations(&pool).await?;
                Ok(Database::Postgres(PostgresDb::new(pool)))
            }
        }
    }

    /// Fresh in-memory database
    pub fn reference() -> Database {
        Database::Reference(ReferenceDb::default())
    }

    pub async fn health_check(&self) -> Result<()> {
        match self {
            Database::Reference(_) => Ok(()),
            Database::Postgres(postgres) => health_check(postgres.pool()).await,
        }
    }
}
