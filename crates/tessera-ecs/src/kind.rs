//! Entity kinds and the runtime type keys used at dynamic boundaries.
//!
//! Entities are identified by their type, not by an instance id. An entity
//! type is a marker type implementing [`EntityKind`]; its [`TypeKey`] is the
//! runtime descriptor the presenter and the entity database work with.
//!
//! A [`TypeKey`] can also describe a type that is *not* an entity kind
//! ([`TypeKey::foreign`]). Such keys are rejected wherever an entity type is
//! required.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entity::Entity;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// A type of entity.
///
/// ```
/// use tessera_ecs::prelude::*;
///
/// struct Creature;
/// impl EntityKind for Creature {
///     const NAME: &'static str = "Creature";
///     const ABSTRACT: bool = true;
/// }
///
/// struct Goblin;
/// impl EntityKind for Goblin {
///     const NAME: &'static str = "Goblin";
///     fn base() -> Option<TypeKey> {
///         Some(TypeKey::of::<Creature>())
///     }
/// }
///
/// assert!(TypeKey::of::<Goblin>().is_assignable_to(&TypeKey::of::<Creature>()));
/// assert!(TypeKey::of::<Creature>().instantiate().is_none());
/// ```
pub trait EntityKind: Send + Sync + 'static {
    /// Stable type name. Also names the entity's storage file.
    const NAME: &'static str;

    /// Abstract kinds exist only as allow-list bases and are never spawned.
    const ABSTRACT: bool = false;

    /// Whether instances of this kind can be stored in the entity database.
    const PERSISTENT: bool = false;

    /// Attach the components every fresh instance starts with.
    fn assemble(_entity: &Entity) {}

    /// The kind this one specializes, if any.
    fn base() -> Option<TypeKey> {
        None
    }
}

// ---------------------------------------------------------------------------
// TypeKey
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Shape {
    Entity {
        is_abstract: bool,
        persistent: bool,
        assemble: fn(&Entity),
        base: fn() -> Option<TypeKey>,
    },
    Foreign,
}

/// Runtime descriptor of a (possibly non-entity) type.
///
/// Equality and hashing only look at the Rust [`TypeId`].
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    shape: Shape,
}

/// Longest base chain followed before giving up; guards against cycles.
const MAX_LINEAGE: usize = 64;

impl TypeKey {
    /// Key for the entity kind `E`.
    pub fn of<E: EntityKind>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::NAME,
            shape: Shape::Entity {
                is_abstract: E::ABSTRACT,
                persistent: E::PERSISTENT,
                assemble: E::assemble,
                base: E::base,
            },
        }
    }

    /// Key for an arbitrary type that is not an entity kind.
    ///
    /// Plain paths are shortened to their last segment; generic types keep
    /// their full name.
    pub fn foreign<T: ?Sized + 'static>() -> Self {
        let full = std::any::type_name::<T>();
        let name = if full.contains('<') {
            full
        } else {
            full.rsplit_once("::").map_or(full, |(_, short)| short)
        };
        Self {
            id: TypeId::of::<T>(),
            name,
            shape: Shape::Foreign,
        }
    }

    /// The Rust `TypeId` this key describes.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The type's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the key describes an [`EntityKind`].
    pub fn is_entity(&self) -> bool {
        matches!(self.shape, Shape::Entity { .. })
    }

    /// Whether the key describes an abstract entity kind.
    pub fn is_abstract(&self) -> bool {
        matches!(
            self.shape,
            Shape::Entity {
                is_abstract: true,
                ..
            }
        )
    }

    /// Whether the key describes a persistent entity kind.
    pub fn is_persistent(&self) -> bool {
        matches!(
            self.shape,
            Shape::Entity {
                persistent: true,
                ..
            }
        )
    }

    /// The kind this one specializes.
    pub fn base(&self) -> Option<TypeKey> {
        match self.shape {
            Shape::Entity { base, .. } => base(),
            Shape::Foreign => None,
        }
    }

    /// Whether `self` is `ancestor` or specializes it, directly or not.
    pub fn is_assignable_to(&self, ancestor: &TypeKey) -> bool {
        let mut current = Some(*self);
        for _ in 0..MAX_LINEAGE {
            match current {
                Some(key) if key == *ancestor => return true,
                Some(key) => current = key.base(),
                None => return false,
            }
        }
        false
    }

    /// Build a fresh instance with the kind's starting components.
    ///
    /// Returns `None` for abstract kinds and foreign types.
    pub fn instantiate(&self) -> Option<Entity> {
        match self.shape {
            Shape::Entity {
                is_abstract: false,
                assemble,
                ..
            } => {
                let entity = Entity::new(*self);
                assemble(&entity);
                Some(entity)
            }
            _ => None,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
