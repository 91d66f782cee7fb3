//! confmig core
//!
//! Locates a project's config file and migrates it to the latest schema
//! version, in place with a backup, into another format, or as a dry run.
//!
//! # Example
//!
//! ```rust,ignore
//! use confmig_core::{MemoryLog, MigrateArgs, Migrator, MigratorConfig};
//! use confmig_migrate::MigrationRegistry;
//!
//! # async fn example() -> Result<(), confmig_core::MigrateError> {
//! let config = MigratorConfig::new().with_root("/path/to/project");
//! let registry = MigrationRegistry::new();
//! let log = MemoryLog::new(config.log_prefix());
//!
//! let outcome = Migrator::new(&config, &registry, &log)
//!     .migrate(&MigrateArgs::new().with_dry_run(true))
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod driver;
pub mod error;
pub mod locator;
pub mod log;

// Re-exports for convenience
pub use config::{MigrateArgs, MigratorConfig};
pub use driver::{backup_path, MigrateOutcome, Migrator};
pub use error::MigrateError;
pub use locator::{ConfigLocator, FormatHandle};
pub use log::{ConsoleLog, LogSink, MemoryLog};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the migrator
    pub use crate::{
        ConsoleLog, LogSink, MemoryLog, MigrateArgs, MigrateError, MigrateOutcome, Migrator,
        MigratorConfig,
    };
    pub use confmig_migrate::{MigrationError, MigrationRegistry, MigrationUtil};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
