//! The view-binding component.
//!
//! An entity is only spawnable into a scene if it carries a [`ViewBinding`]
//! naming the prefab to instantiate. The binding also records the live node
//! created from that prefab; the node reference is runtime state and is never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, Prefab};

/// Links an entity to the prefab it is displayed with and to its live node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewBinding {
    prefab: Option<Prefab>,
    #[serde(skip)]
    current: Option<NodeId>,
}

crate::persistent_component!(ViewBinding, "view");

impl ViewBinding {
    /// Binding that instantiates `prefab`.
    pub fn with_prefab(prefab: Prefab) -> Self {
        Self {
            prefab: Some(prefab),
            current: None,
        }
    }

    /// The prefab views are instantiated from.
    pub fn prefab(&self) -> Option<&Prefab> {
        self.prefab.as_ref()
    }

    /// Replace the prefab.
    pub fn set_prefab(&mut self, prefab: Option<Prefab>) {
        self.prefab = prefab;
    }

    /// The live node bound to the entity, if any.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Record the node instantiated for the entity.
    pub fn bind(&mut self, node: NodeId) {
        self.current = Some(node);
    }

    /// Forget the live node. Returns the node that was bound.
    pub fn unbind(&mut self) -> Option<NodeId> {
        self.current.take()
    }
}
