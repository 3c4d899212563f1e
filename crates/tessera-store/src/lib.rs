//! Tessera Store -- the entity database.
//!
//! This crate resolves persistent entity types to the files their components
//! are stored in, and loads or saves entities through an
//! [`EntityFormat`](tessera_ecs::codec::EntityFormat).
//!
//! # Modules
//!
//! - [`database`]: the lazily initialized type→path index, with load and
//!   save.
//! - [`scanner`]: where the database gets its candidate types from.
//!
//! A process normally holds one database. [`install`] registers it and
//! [`global`] returns it; passing an `Arc<EntityDatabase>` around works just
//! as well.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::OnceLock;

use tessera_ecs::EcsError;

pub mod database;
pub mod scanner;

pub use database::{DatabaseConfig, EntityDatabase};
pub use scanner::{EntityTypeTable, TypeScanner};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the entity database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The requested type is not an entity kind.
    #[error("type '{type_name}' is not an entity type")]
    TypeAccess { type_name: &'static str },

    /// The entity type is not indexed.
    #[error("path not found for entity type '{type_name}'")]
    NotFound { type_name: &'static str },

    /// A scan pass failed; nothing from it was indexed.
    #[error("database initialization failed: {message}")]
    Initialization {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A stored entity file could not be decoded or encoded.
    #[error("entity file for '{type_name}' at {} is malformed: {source}", path.display())]
    Codec {
        type_name: &'static str,
        path: PathBuf,
        #[source]
        source: EcsError,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Process-wide instance
// ---------------------------------------------------------------------------

static GLOBAL: OnceLock<EntityDatabase> = OnceLock::new();

/// Register the process-wide database.
///
/// Only the first call succeeds; later calls hand their database back.
pub fn install(database: EntityDatabase) -> Result<&'static EntityDatabase, EntityDatabase> {
    GLOBAL.set(database)?;
    Ok(global().unwrap_or_else(|| unreachable!("database was just installed")))
}

/// The process-wide database, if one has been installed.
pub fn global() -> Option<&'static EntityDatabase> {
    GLOBAL.get()
}

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::database::{DatabaseConfig, EntityDatabase};
    pub use crate::scanner::{EntityTypeTable, TypeScanner};
    pub use crate::DatabaseError;
}
