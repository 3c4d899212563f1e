//! Tessera Engine -- presenters and the per-frame tick loop.
//!
//! This crate builds on [`tessera_ecs`] and [`tessera_store`] to provide the
//! controller layer: [`Presenter`](presenter::Presenter)s spawn entities into
//! a scene, answer queries over the entities they display, and apply
//! deferred destruction once per frame from the
//! [`TickLoop`](tick::TickLoop)'s late-update phase.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tessera_engine::prelude::*;
//!
//! struct Coin;
//! impl EntityKind for Coin {
//!     const NAME: &'static str = "Coin";
//!     fn assemble(entity: &Entity) {
//!         entity.insert(ViewBinding::with_prefab(Prefab::new("prefabs/coin")));
//!     }
//! }
//!
//! let scene = Arc::new(Mutex::new(MemoryScene::new()));
//! let presenter = Arc::new(Mutex::new(Presenter::new(Arc::clone(&scene))));
//! let mut tick_loop = TickLoop::new(TickConfig::default());
//! tick_loop.add_hook("coins", Arc::clone(&presenter));
//!
//! let view = presenter.lock().spawn_of::<Coin>(&Placement::default()).unwrap().unwrap();
//! presenter.lock().destroy(view.node());
//! assert_eq!(presenter.lock().len(), 1);
//!
//! tick_loop.tick();
//! assert!(presenter.lock().is_empty());
//! assert!(!scene.lock().is_alive(view.node()));
//! ```

#![deny(unsafe_code)]

pub mod presenter;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use tessera_ecs;

/// Re-export the store crate for convenience.
pub use tessera_store;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use tessera_ecs::prelude::*;
    pub use tessera_store::prelude::*;

    pub use crate::presenter::{
        DestructionQueue, Presenter, PresenterBuilder, PresenterError, ReapReport, SceneKey,
        SharedScene, View,
    };
    pub use crate::tick::{LateUpdate, SharedHook, TickConfig, TickDiagnostics, TickLoop};
}
