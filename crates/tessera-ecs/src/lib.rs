//! Tessera ECS -- type-identified entities built from shared components.
//!
//! An entity is a bundle of components identified by its type (an
//! [`EntityKind`](kind::EntityKind)), not by an instance id. Each entity owns
//! a thread-safe [`Components`](component::Components) registry holding at
//! most one component per concrete type. Components marked persistent can be
//! written to and read back from a document through an
//! [`EntityFormat`](codec::EntityFormat).
//!
//! # Quick Start
//!
//! ```
//! use tessera_ecs::prelude::*;
//!
//! #[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Health(u32);
//! tessera_ecs::persistent_component!(Health, "health");
//!
//! struct Knight;
//! impl EntityKind for Knight {
//!     const NAME: &'static str = "Knight";
//!     fn assemble(entity: &Entity) {
//!         entity.insert(Health(30));
//!     }
//! }
//!
//! let knight = Entity::build::<Knight>();
//! knight.get::<Health>().unwrap().write().0 -= 5;
//! assert_eq!(*knight.get::<Health>().unwrap().read(), Health(25));
//! ```

#![deny(unsafe_code)]

pub mod codec;
pub mod component;
pub mod entity;
pub mod identity;
pub mod kind;
pub mod scene;
pub mod view;

#[doc(hidden)]
pub use serde_json;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by component and entity operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// A persisted block names a component type that is not in the catalog.
    #[error("component type '{name}' not registered. Registered components: [{registered}]")]
    UnknownComponent { name: String, registered: String },

    /// A persisted block's data does not match its component type.
    #[error("failed to deserialize component '{component}': {details}")]
    ComponentDecode { component: String, details: String },

    /// A persistent component could not be encoded.
    #[error("failed to serialize component '{component}': {details}")]
    ComponentEncode { component: String, details: String },

    /// The document itself could not be read or written.
    #[error("malformed entity document: {details}")]
    Codec { details: String },

    /// A required component is not attached.
    #[error("component '{component}' is not attached")]
    MissingComponent { component: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Component macros
// ---------------------------------------------------------------------------

/// Implement [`Component`](component::Component) for a transient type.
///
/// ```
/// #[derive(Default)]
/// struct Cooldown(f32);
/// tessera_ecs::component!(Cooldown, "cooldown");
/// ```
#[macro_export]
macro_rules! component {
    ($ty:ty, $name:literal) => {
        impl $crate::component::Component for $ty {
            const NAME: &'static str = $name;
        }
    };
}

/// Implement [`Component`](component::Component) for a persistent serde type.
///
/// The type is encoded with `serde_json` and must also implement
/// `Deserialize` to be registered in a
/// [`ComponentCatalog`](codec::ComponentCatalog).
#[macro_export]
macro_rules! persistent_component {
    ($ty:ty, $name:literal) => {
        impl $crate::component::Component for $ty {
            const NAME: &'static str = $name;
            const PERSISTENT: bool = true;

            fn encode(
                &self,
            ) -> ::std::result::Result<
                ::std::option::Option<$crate::serde_json::Value>,
                $crate::serde_json::Error,
            > {
                $crate::serde_json::to_value(self).map(::std::option::Option::Some)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::codec::{
        ComponentCatalog, EncodedComponent, EntityCodec, EntityDocument, EntityFormat, JsonCodec,
    };
    pub use crate::component::{Component, ComponentType, Components, ErasedComponent, Shared};
    pub use crate::entity::Entity;
    pub use crate::identity::{PresenterId, PresenterProperties};
    pub use crate::kind::{EntityKind, TypeKey};
    pub use crate::scene::{MemoryScene, NodeId, Placement, Prefab, SceneGraph};
    pub use crate::view::ViewBinding;
    pub use crate::EcsError;
    pub use crate::{component, persistent_component};
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::prelude::*;

    #[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Position {
        x: f32,
        y: f32,
    }
    crate::persistent_component!(Position, "position");

    #[derive(Debug, Default)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    crate::component!(Velocity, "velocity");

    struct Ship;
    impl EntityKind for Ship {
        const NAME: &'static str = "Ship";
        const PERSISTENT: bool = true;

        fn assemble(entity: &Entity) {
            entity.add::<Position>();
            entity.insert(Velocity { dx: 1.0, dy: 0.5 });
        }
    }

    #[test]
    fn build_attaches_starting_components() {
        let ship = Entity::build::<Ship>();
        assert!(ship.is::<Ship>());
        assert!(ship.has::<Position>());
        assert!(ship.has::<Velocity>());
        assert_eq!(ship.component_count(), 2);
    }

    #[test]
    fn handles_share_one_instance() {
        let ship = Entity::build::<Ship>();
        let a = ship.get::<Position>().unwrap();
        let b = ship.get_or_add::<Position>();
        assert!(Arc::ptr_eq(&a, &b));

        {
            let velocity = ship.get::<Velocity>().unwrap();
            let v = velocity.read();
            let mut p = a.write();
            p.x += v.dx;
            p.y += v.dy;
        }
        assert_eq!(*b.read(), Position { x: 1.0, y: 0.5 });
    }

    #[test]
    fn remove_then_add_creates_fresh_instance() {
        let ship = Entity::build::<Ship>();
        ship.get::<Position>().unwrap().write().x = 40.0;

        assert!(ship.remove::<Position>());
        assert!(!ship.remove::<Position>());
        assert!(!ship.has::<Position>());
        assert!(matches!(
            ship.try_get::<Position>(),
            Err(EcsError::MissingComponent { component: "position" })
        ));

        let fresh = ship.add::<Position>();
        assert_eq!(*fresh.read(), Position::default());
    }

    #[test]
    fn entities_cross_threads() {
        let ship = Arc::new(Entity::build::<Ship>());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ship = Arc::clone(&ship);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ship.get_or_add::<Position>().write().x += 1.0;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ship.get::<Position>().unwrap().read().x, 800.0);
    }

    #[test]
    fn document_round_trip_keeps_persistent_components() {
        let mut catalog = ComponentCatalog::new();
        catalog.register::<Position>();
        let format = EntityFormat::json(catalog);

        let ship = Entity::build::<Ship>();
        ship.get::<Position>().unwrap().write().y = -3.0;

        let mut bytes = Vec::new();
        ship.write(&mut bytes, &format).unwrap();

        let loaded = Entity::new(TypeKey::of::<Ship>());
        assert_eq!(loaded.read(&mut bytes.as_slice(), &format).unwrap(), 1);
        assert_eq!(
            *loaded.get::<Position>().unwrap().read(),
            Position { x: 0.0, y: -3.0 }
        );
        assert!(!loaded.has::<Velocity>());
    }
}
