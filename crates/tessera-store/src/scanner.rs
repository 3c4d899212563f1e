//! Discovery of the entity types the database indexes.
//!
//! The database never enumerates types by itself. A [`TypeScanner`] hands it
//! the candidate list; [`EntityTypeTable`] is the start-up registration table
//! applications fill in by hand.

use tessera_ecs::kind::{EntityKind, TypeKey};

/// Source of candidate entity types.
///
/// Scanners may return abstract, transient or even non-entity keys; the
/// database filters them. Failures are opaque to the database and are
/// reported as an initialization error.
pub trait TypeScanner: Send + Sync {
    /// Every type the database should consider.
    fn find_all_implementations(&self) -> anyhow::Result<Vec<TypeKey>>;
}

/// Hand-maintained list of entity kinds.
///
/// ```
/// use tessera_ecs::prelude::*;
/// use tessera_store::{EntityTypeTable, TypeScanner};
///
/// struct Chest;
/// impl EntityKind for Chest {
///     const NAME: &'static str = "Chest";
///     const PERSISTENT: bool = true;
/// }
///
/// let table = EntityTypeTable::new().with::<Chest>();
/// assert_eq!(table.find_all_implementations().unwrap(), vec![TypeKey::of::<Chest>()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityTypeTable {
    kinds: Vec<TypeKey>,
}

impl EntityTypeTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E`. Registering the same kind twice keeps one entry.
    pub fn register<E: EntityKind>(&mut self) -> &mut Self {
        self.register_key(TypeKey::of::<E>())
    }

    /// Builder-style [`EntityTypeTable::register`].
    pub fn with<E: EntityKind>(mut self) -> Self {
        self.register::<E>();
        self
    }

    /// Register a key obtained at runtime.
    pub fn register_key(&mut self, key: TypeKey) -> &mut Self {
        if !self.kinds.contains(&key) {
            self.kinds.push(key);
        }
        self
    }

    /// Registered keys in registration order.
    pub fn kinds(&self) -> &[TypeKey] {
        &self.kinds
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl TypeScanner for EntityTypeTable {
    fn find_all_implementations(&self) -> anyhow::Result<Vec<TypeKey>> {
        Ok(self.kinds.clone())
    }
}

impl<F> TypeScanner for F
where
    F: Fn() -> anyhow::Result<Vec<TypeKey>> + Send + Sync,
{
    fn find_all_implementations(&self) -> anyhow::Result<Vec<TypeKey>> {
        self()
    }
}
