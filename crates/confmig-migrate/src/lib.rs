//! confmig migrations
//!
//! Registry of ordered migration steps and the runner that applies them to a
//! [`ConfigDocument`](confmig_codec::ConfigDocument).
//!
//! # Example
//!
//! ```rust
//! use confmig_codec::ConfigDocument;
//! use confmig_migrate::{MigrationRegistry, MigrationRunner};
//! use serde_json::{json, Value};
//!
//! let mut registry = MigrationRegistry::new();
//! registry.add(|util| {
//!     util.map_with("migrate", "migrated", |v| match v {
//!         Value::String(s) => Value::String(s.replace("old", "new")),
//!         other => other,
//!     });
//!     Ok(())
//! });
//!
//! let mut doc = ConfigDocument::from_value(json!({ "version": 1, "migrate": "old-value" })).unwrap();
//! let report = MigrationRunner::new(&registry, 2).run(&mut doc).unwrap();
//!
//! assert_eq!(report.to_version, 2);
//! assert_eq!(doc.into_value(), json!({ "version": 2, "migrated": "new-value" }));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod registry;
pub mod runner;
pub mod util;

// Re-exports for convenience
pub use error::MigrationError;
pub use registry::{MigrationRegistry, MigrationStep};
pub use runner::{MigrationReport, MigrationRunner};
pub use util::MigrationUtil;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing migration steps
    pub use crate::{
        MigrationError, MigrationRegistry, MigrationReport, MigrationRunner, MigrationStep,
        MigrationUtil,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
