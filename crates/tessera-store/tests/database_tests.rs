//! Integration tests for the entity database: bootstrap, lookups, and the
//! save/load cycle against a real directory.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tessera_ecs::prelude::*;
use tessera_store::prelude::*;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Gold(u32);
tessera_ecs::persistent_component!(Gold, "gold");

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Level(u8);
tessera_ecs::persistent_component!(Level, "level");

#[derive(Debug, Default)]
struct Selected;
tessera_ecs::component!(Selected, "selected");

struct Merchant;
impl EntityKind for Merchant {
    const NAME: &'static str = "Merchant";
    const PERSISTENT: bool = true;

    fn assemble(entity: &Entity) {
        entity.insert(Gold(50));
        entity.insert(Level(1));
        entity.add::<Selected>();
    }
}

struct Guard;
impl EntityKind for Guard {
    const NAME: &'static str = "Guard";
    const PERSISTENT: bool = true;
}

struct Unlisted;
impl EntityKind for Unlisted {
    const NAME: &'static str = "Unlisted";
    const PERSISTENT: bool = true;
}

struct Plain;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn format() -> EntityFormat {
    let mut catalog = ComponentCatalog::new();
    catalog.register::<Gold>().register::<Level>();
    EntityFormat::json(catalog)
}

fn table() -> EntityTypeTable {
    EntityTypeTable::new().with::<Merchant>().with::<Guard>()
}

fn database(dir: &Path) -> EntityDatabase {
    EntityDatabase::new(DatabaseConfig::new(dir.join("entities")), table(), format())
}

/// Scanner whose first `failures` calls fail.
#[derive(Clone)]
struct FlakyScanner {
    calls: Arc<AtomicUsize>,
    failures: usize,
    inner: EntityTypeTable,
}

impl TypeScanner for FlakyScanner {
    fn find_all_implementations(&self) -> anyhow::Result<Vec<TypeKey>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            anyhow::bail!("scan {call} failed");
        }
        self.inner.find_all_implementations()
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[test]
fn lookups_initialize_lazily() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());

    assert!(!db.is_initialized());
    assert_eq!(db.scan_count(), 0);

    let path = db.get_path_of::<Merchant>().unwrap();
    assert_eq!(path, Some(dir.path().join("entities").join("Merchant.json")));
    assert!(db.is_initialized());
    assert_eq!(db.scan_count(), 1);
}

#[test]
fn repeated_initialize_scans_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());

    db.initialize(false).unwrap();
    db.initialize(false).unwrap();
    db.get_all().unwrap();
    db.get_path_of::<Guard>().unwrap();

    assert_eq!(db.scan_count(), 1);
}

#[test]
fn forced_initialize_rebuilds() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());

    db.initialize(false).unwrap();
    let before = db.get_all().unwrap();

    db.initialize(true).unwrap();
    assert_eq!(db.scan_count(), 2);
    assert!(db.is_initialized());
    assert_eq!(db.get_all().unwrap(), before);
}

#[test]
fn failed_initialize_inserts_nothing_and_retries() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let scanner = FlakyScanner {
        calls: Arc::clone(&calls),
        failures: 1,
        inner: table(),
    };
    let db = EntityDatabase::new(DatabaseConfig::new(dir.path()), scanner, format());

    let err = db.initialize(false).unwrap_err();
    match &err {
        DatabaseError::Initialization { message, .. } => {
            assert!(message.contains("scan 0 failed"), "message: {message}");
        }
        other => panic!("expected Initialization, got {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
    assert!(!db.is_initialized());

    // The failed pass left nothing behind; the next lookup retries.
    assert!(db.get_path_of::<Merchant>().unwrap().is_some());
    assert!(db.is_initialized());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_forced_refresh_leaves_empty_index() {
    let dir = tempfile::tempdir().unwrap();
    let healthy = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&healthy);
    let scanner = move || -> anyhow::Result<Vec<TypeKey>> {
        if flag.load(Ordering::SeqCst) {
            Ok(vec![TypeKey::of::<Merchant>()])
        } else {
            anyhow::bail!("scanner offline")
        }
    };
    let db = EntityDatabase::new(DatabaseConfig::new(dir.path()), scanner, format());
    db.initialize(false).unwrap();

    healthy.store(false, Ordering::SeqCst);
    assert!(db.initialize(true).is_err());
    assert!(!db.is_initialized());

    healthy.store(true, Ordering::SeqCst);
    assert_eq!(db.get_all().unwrap().len(), 1);
}

#[test]
fn unwritable_directory_is_an_initialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let db = EntityDatabase::new(DatabaseConfig::new(blocker.join("entities")), table(), format());
    assert!(matches!(
        db.initialize(false),
        Err(DatabaseError::Initialization { .. })
    ));
    assert!(!db.is_initialized());
}

#[test]
fn concurrent_first_use_builds_one_consistent_index() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(database(dir.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            std::thread::spawn(move || db.get_all().unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let expected = db.get_all().unwrap();
    assert_eq!(expected.len(), 2);
    for result in results {
        assert_eq!(result, expected);
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[test]
fn unregistered_type_has_no_path() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    assert_eq!(db.get_path_of::<Unlisted>().unwrap(), None);
}

#[test]
fn unregistered_type_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    assert!(matches!(
        db.get_entity_of::<Unlisted>(),
        Err(DatabaseError::NotFound { type_name: "Unlisted" })
    ));
}

#[test]
fn non_entity_type_is_a_type_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    assert!(matches!(
        db.get_entity(TypeKey::foreign::<Plain>()),
        Err(DatabaseError::TypeAccess { type_name: "Plain" })
    ));
}

#[test]
fn get_all_is_a_copy() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    let mut all = db.get_all().unwrap();
    all.clear();
    assert_eq!(db.get_all().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

#[test]
fn nothing_stored_yet_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    assert!(db.get_entity_of::<Merchant>().unwrap().is_none());
}

#[test]
fn save_then_load_round_trips() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());

    let merchant = Entity::build::<Merchant>();
    merchant.get::<Gold>().unwrap().write().0 = 999;
    merchant.remove::<Level>();

    let path = db.save(&merchant).unwrap();
    assert!(path.is_file());
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = db.get_entity_of::<Merchant>().unwrap().unwrap();
    assert!(loaded.is::<Merchant>());
    assert_eq!(*loaded.get::<Gold>().unwrap().read(), Gold(999));
    // Starting components the file does not mention keep their defaults.
    assert_eq!(*loaded.get::<Level>().unwrap().read(), Level(1));
    assert!(loaded.has::<Selected>());
}

#[test]
fn malformed_file_is_a_codec_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    let path = db.get_path_of::<Guard>().unwrap().unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    assert!(matches!(
        db.get_entity_of::<Guard>(),
        Err(DatabaseError::Codec { type_name: "Guard", .. })
    ));
}

#[test]
fn saving_unindexed_entity_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(dir.path());
    let entity = Entity::build::<Unlisted>();
    assert!(matches!(
        db.save(&entity),
        Err(DatabaseError::NotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// Global instance
// ---------------------------------------------------------------------------

#[test]
fn install_accepts_only_the_first_database() {
    let dir = tempfile::tempdir().unwrap();
    let first = tessera_store::install(database(dir.path())).unwrap();
    assert!(std::ptr::eq(first, tessera_store::global().unwrap()));

    let rejected = tessera_store::install(database(dir.path()));
    assert!(rejected.is_err());
}
