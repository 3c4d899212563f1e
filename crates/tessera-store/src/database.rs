//! The entity database: a lazily built index from entity type to the file
//! its persisted components live in.
//!
//! # Lifecycle
//!
//! The index is empty until first use. Any lookup calls
//! [`EntityDatabase::initialize`] with `force == false`, which asks the
//! [`TypeScanner`] for candidates, keeps the concrete persistent entity kinds
//! and computes `<entities_dir>/<TypeName>.<ext>` for each. Once a pass
//! succeeds the database is ready and further non-forced calls return
//! immediately. A forced call clears the index and rebuilds it.
//!
//! A failed pass inserts nothing and leaves the database not ready, so the
//! next lookup retries. Concurrent first passes may scan more than once;
//! insertion is first-wins so the index stays consistent.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use tessera_ecs::codec::EntityFormat;
use tessera_ecs::entity::Entity;
use tessera_ecs::kind::{EntityKind, TypeKey};

use crate::scanner::TypeScanner;
use crate::DatabaseError;

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

/// Where entity files are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding one file per persistent entity type. Created on
    /// first initialization.
    pub entities_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            entities_dir: PathBuf::from("data/entities"),
        }
    }
}

impl DatabaseConfig {
    /// Config storing entity files under `entities_dir`.
    pub fn new(entities_dir: impl Into<PathBuf>) -> Self {
        Self {
            entities_dir: entities_dir.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EntityDatabase
// ---------------------------------------------------------------------------

/// Index from persistent entity type to storage path, with load and save.
pub struct EntityDatabase {
    config: DatabaseConfig,
    scanner: Box<dyn TypeScanner>,
    format: EntityFormat,
    entries: DashMap<TypeKey, PathBuf>,
    ready: AtomicBool,
    scans: AtomicUsize,
}

impl EntityDatabase {
    /// Create an uninitialized database.
    pub fn new(
        config: DatabaseConfig,
        scanner: impl TypeScanner + 'static,
        format: EntityFormat,
    ) -> Self {
        Self {
            config,
            scanner: Box::new(scanner),
            format,
            entries: DashMap::new(),
            ready: AtomicBool::new(false),
            scans: AtomicUsize::new(0),
        }
    }

    /// The database configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The format entity files are written in.
    pub fn format(&self) -> &EntityFormat {
        &self.format
    }

    // -- initialization -----------------------------------------------------

    /// Build the type index.
    ///
    /// A no-op when already initialized, unless `force` is set, in which case
    /// the index is cleared and rebuilt.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::Initialization`] if the scanner fails or the entities
    /// directory cannot be created. Nothing from the failed pass is
    /// inserted and the database stays uninitialized.
    pub fn initialize(&self, force: bool) -> Result<(), DatabaseError> {
        if self.ready.load(Ordering::Acquire) && !force {
            return Ok(());
        }

        if force {
            self.ready.store(false, Ordering::Release);
            self.entries.clear();
            debug!("entity database cleared for forced refresh");
        }

        let staged = self.scan()?;

        let mut inserted = 0usize;
        for (key, path) in staged {
            if let dashmap::mapref::entry::Entry::Vacant(slot) = self.entries.entry(key) {
                slot.insert(path);
                inserted += 1;
            }
        }
        self.ready.store(true, Ordering::Release);

        info!(
            entities = self.entries.len(),
            inserted,
            dir = %self.config.entities_dir.display(),
            "entity database initialized"
        );
        Ok(())
    }

    /// One scan pass. Computes every path before anything is inserted.
    fn scan(&self) -> Result<Vec<(TypeKey, PathBuf)>, DatabaseError> {
        self.scans.fetch_add(1, Ordering::Relaxed);

        let candidates =
            self.scanner
                .find_all_implementations()
                .map_err(|e| DatabaseError::Initialization {
                    message: format!("type scan failed: {e}"),
                    source: e.into(),
                })?;

        let dir = &self.config.entities_dir;
        fs::create_dir_all(dir).map_err(|e| DatabaseError::Initialization {
            message: format!("cannot create entities directory {}: {e}", dir.display()),
            source: Box::new(e),
        })?;

        let extension = self.format.codec().extension();
        let mut staged = Vec::with_capacity(candidates.len());
        for key in candidates {
            if !key.is_entity() || key.is_abstract() || !key.is_persistent() {
                trace!(entity = key.name(), "skipping non-persistent or abstract type");
                continue;
            }
            staged.push((key, dir.join(format!("{}.{extension}", key.name()))));
        }
        Ok(staged)
    }

    /// Whether a scan pass has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Number of scan passes attempted so far.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    // -- lookups ------------------------------------------------------------

    /// Storage path for `key`, initializing on first use.
    ///
    /// `Ok(None)` if the type is not indexed.
    pub fn get_path(&self, key: TypeKey) -> Result<Option<PathBuf>, DatabaseError> {
        self.initialize(false)?;
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }

    /// Typed [`EntityDatabase::get_path`].
    pub fn get_path_of<E: EntityKind>(&self) -> Result<Option<PathBuf>, DatabaseError> {
        self.get_path(TypeKey::of::<E>())
    }

    /// Every indexed type and its path, as an independent copy.
    pub fn get_all(&self) -> Result<HashMap<TypeKey, PathBuf>, DatabaseError> {
        self.initialize(false)?;
        Ok(self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }

    /// Load the stored instance of `key`.
    ///
    /// The kind is instantiated with its starting components and the stored
    /// document is merged over them. `Ok(None)` if nothing has been saved for
    /// the type yet.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::TypeAccess`] if `key` is not an entity kind.
    /// - [`DatabaseError::NotFound`] if the type is not indexed.
    /// - [`DatabaseError::Codec`] if the stored file is malformed.
    pub fn get_entity(&self, key: TypeKey) -> Result<Option<Entity>, DatabaseError> {
        if !key.is_entity() {
            return Err(DatabaseError::TypeAccess {
                type_name: key.name(),
            });
        }

        let path = self
            .get_path(key)?
            .ok_or(DatabaseError::NotFound { type_name: key.name() })?;

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(entity = key.name(), path = %path.display(), "no stored instance");
                return Ok(None);
            }
            Err(e) => return Err(DatabaseError::Io { path, source: e }),
        };

        let entity = key
            .instantiate()
            .ok_or(DatabaseError::NotFound { type_name: key.name() })?;
        let merged = entity
            .read(&mut BufReader::new(file), &self.format)
            .map_err(|e| DatabaseError::Codec {
                type_name: key.name(),
                path: path.clone(),
                source: e,
            })?;

        debug!(entity = key.name(), components = merged, "entity loaded");
        Ok(Some(entity))
    }

    /// Typed [`EntityDatabase::get_entity`].
    pub fn get_entity_of<E: EntityKind>(&self) -> Result<Option<Entity>, DatabaseError> {
        self.get_entity(TypeKey::of::<E>())
    }

    // -- persistence --------------------------------------------------------

    /// Write `entity`'s persistent components to its indexed path.
    ///
    /// The file is written next to its destination and renamed into place,
    /// so readers never observe a partial document. Returns the path.
    pub fn save(&self, entity: &Entity) -> Result<PathBuf, DatabaseError> {
        let key = entity.kind();
        let path = self
            .get_path(key)?
            .ok_or(DatabaseError::NotFound { type_name: key.name() })?;

        let staging = staging_path(&path);
        let io_err = |source: io::Error| DatabaseError::Io {
            path: staging.clone(),
            source,
        };

        let file = fs::File::create(&staging).map_err(io_err)?;
        let mut sink = BufWriter::new(file);
        let written = entity
            .write(&mut sink, &self.format)
            .map_err(|e| DatabaseError::Codec {
                type_name: key.name(),
                path: path.clone(),
                source: e,
            })
            .and_then(|()| sink.flush().map_err(io_err));
        drop(sink);
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging) {
                warn!(path = %staging.display(), error = %cleanup, "failed to remove staging file");
            }
            return Err(e);
        }

        fs::rename(&staging, &path).map_err(|source| DatabaseError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(entity = key.name(), path = %path.display(), "entity saved");
        Ok(path)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl std::fmt::Debug for EntityDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDatabase")
            .field("config", &self.config)
            .field("format", &self.format)
            .field("entries", &self.entries.len())
            .field("ready", &self.is_initialized())
            .finish()
    }
}
