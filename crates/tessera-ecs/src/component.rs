//! Component types and the per-entity component registry.
//!
//! A component is any `Default + Send + Sync + 'static` type implementing
//! [`Component`]. Each entity owns one [`Components`] registry which holds at
//! most one instance per concrete component type, keyed by [`TypeId`].
//!
//! Components are stored type-erased as [`ErasedComponent`] (an
//! `Arc<dyn AnyComponent>` whose concrete type is `RwLock<T>`) and handed out
//! as typed [`Shared<T>`] handles. The registry is the unit of
//! thread-safety: every method takes `&self` and is safe to call from many
//! threads at once. Insert-if-absent goes through the map's entry API, so
//! two racing [`Components::get_or_add`] calls always observe the same
//! instance.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::EcsError;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A capability that can be attached to an entity.
///
/// `NAME` is the stable tag written next to the component's data in
/// persisted entity documents. Components with `PERSISTENT == true` are the
/// only ones written out; use [`persistent_component!`](crate::persistent_component)
/// to implement the trait for a serde type.
pub trait Component: Default + Send + Sync + 'static {
    /// Stable name used as the component's tag in persisted documents.
    const NAME: &'static str;

    /// Whether this component survives a save/load round trip.
    const PERSISTENT: bool = false;

    /// Encode the component's fields for persistence.
    ///
    /// Transient components keep the default, which encodes nothing.
    fn encode(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        Ok(None)
    }
}

/// Shared, lockable handle to a component stored in a [`Components`] registry.
pub type Shared<T> = Arc<RwLock<T>>;

// ---------------------------------------------------------------------------
// ComponentType
// ---------------------------------------------------------------------------

/// Runtime descriptor of a component type.
///
/// Equality and hashing only look at the Rust [`TypeId`].
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    persistent: bool,
}

impl ComponentType {
    /// Descriptor for the component type `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
            persistent: T::PERSISTENT,
        }
    }

    /// The Rust `TypeId` this descriptor keys on.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The stable component name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether components of this type are written to storage.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// AnyComponent -- type-erased component storage
// ---------------------------------------------------------------------------

/// Object-safe view of a stored component.
///
/// Implemented for `RwLock<T>` for every [`Component`] `T`; callers never
/// implement it themselves.
pub trait AnyComponent: Send + Sync {
    /// Descriptor of the concrete component type.
    fn component_type(&self) -> ComponentType;

    /// Encode the component for persistence (see [`Component::encode`]).
    fn encode(&self) -> Result<Option<serde_json::Value>, serde_json::Error>;

    /// Borrow as `Any` for downcasting to `RwLock<T>`.
    fn as_any(&self) -> &dyn Any;

    /// Convert into an `Arc<dyn Any>` for downcasting to `Arc<RwLock<T>>`.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Component> AnyComponent for RwLock<T> {
    fn component_type(&self) -> ComponentType {
        ComponentType::of::<T>()
    }

    fn encode(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        self.read().encode()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A component stored behind its type-erased interface.
pub type ErasedComponent = Arc<dyn AnyComponent>;

/// Wrap a component value in freshly allocated shared storage.
pub fn erase<T: Component>(value: T) -> ErasedComponent {
    Arc::new(RwLock::new(value))
}

/// Recover the typed handle from an erased component.
///
/// Returns `None` if the erased component is not a `T`.
pub fn downcast<T: Component>(erased: &ErasedComponent) -> Option<Shared<T>> {
    Arc::clone(erased).into_any().downcast::<RwLock<T>>().ok()
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Thread-safe, type-keyed registry of the components attached to one entity.
#[derive(Default)]
pub struct Components {
    slots: DashMap<TypeId, ErasedComponent>,
}

impl Components {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Attach a default-constructed `T` unless one is already present.
    ///
    /// The value is built before the slot is locked. If another instance is
    /// already stored (including one that won a concurrent race) it is
    /// returned and the new value is dropped.
    pub fn add<T: Component>(&self) -> Shared<T> {
        let fresh: Shared<T> = Arc::new(RwLock::new(T::default()));
        self.claim(move || fresh)
    }

    /// Return the stored `T`, constructing and storing a default one if absent.
    ///
    /// Construction happens while the slot is locked, so concurrent callers
    /// never build more than one visible instance.
    pub fn get_or_add<T: Component>(&self) -> Shared<T> {
        self.claim(|| Arc::new(RwLock::new(T::default())))
    }

    /// Store `value`, replacing any existing `T`. Returns the replaced handle.
    pub fn insert<T: Component>(&self, value: T) -> Option<Shared<T>> {
        self.slots
            .insert(TypeId::of::<T>(), erase(value))
            .and_then(|old| downcast::<T>(&old))
    }

    /// Store an already erased component under its own type, replacing any
    /// existing one. Returns the replaced component.
    pub fn insert_erased(&self, component: ErasedComponent) -> Option<ErasedComponent> {
        let key = component.component_type().type_id();
        self.slots.insert(key, component)
    }

    /// Look up the stored `T`.
    pub fn get<T: Component>(&self) -> Option<Shared<T>> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| downcast::<T>(slot.value()))
    }

    /// Look up the stored `T`, failing with [`EcsError::MissingComponent`]
    /// when it is absent.
    pub fn try_get<T: Component>(&self) -> Result<Shared<T>, EcsError> {
        self.get::<T>().ok_or(EcsError::MissingComponent {
            component: T::NAME,
        })
    }

    /// Look up a component by its descriptor without knowing its type.
    pub fn get_erased(&self, ty: ComponentType) -> Option<ErasedComponent> {
        self.slots
            .get(&ty.type_id())
            .map(|slot| Arc::clone(slot.value()))
    }

    /// Whether a `T` is attached.
    pub fn has<T: Component>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Whether a component of the described type is attached.
    pub fn has_type(&self, ty: ComponentType) -> bool {
        self.slots.contains_key(&ty.type_id())
    }

    /// Detach the stored `T`. Returns whether anything was removed.
    pub fn remove<T: Component>(&self) -> bool {
        self.slots.remove(&TypeId::of::<T>()).is_some()
    }

    /// Detach the component of the described type. Returns whether anything
    /// was removed.
    pub fn remove_type(&self, ty: ComponentType) -> bool {
        self.slots.remove(&ty.type_id()).is_some()
    }

    /// Snapshot of every attached component. Iteration order is unspecified.
    pub fn all(&self) -> HashMap<ComponentType, ErasedComponent> {
        self.slots
            .iter()
            .map(|slot| (slot.value().component_type(), Arc::clone(slot.value())))
            .collect()
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no components are attached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The attached components whose type is persistent.
    pub fn serializable_subset(&self) -> Vec<ErasedComponent> {
        self.slots
            .iter()
            .filter(|slot| slot.value().component_type().is_persistent())
            .map(|slot| Arc::clone(slot.value()))
            .collect()
    }

    /// Descriptors of the attached persistent components.
    pub fn persistent_types(&self) -> Vec<ComponentType> {
        self.slots
            .iter()
            .map(|slot| slot.value().component_type())
            .filter(ComponentType::is_persistent)
            .collect()
    }

    fn claim<T: Component>(&self, make: impl FnOnce() -> Shared<T>) -> Shared<T> {
        match self.slots.entry(TypeId::of::<T>()) {
            Entry::Occupied(mut slot) => {
                if let Some(existing) = downcast::<T>(slot.get()) {
                    trace!(component = T::NAME, "component already attached");
                    return existing;
                }
                // Slot keyed by T but holding another type; repair it.
                let fresh = make();
                slot.insert(fresh.clone());
                fresh
            }
            Entry::Vacant(slot) => {
                let fresh = make();
                slot.insert(fresh.clone());
                fresh
            }
        }
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self
            .slots
            .iter()
            .map(|slot| slot.value().component_type().name())
            .collect();
        names.sort_unstable();
        f.debug_struct("Components").field("attached", &names).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
