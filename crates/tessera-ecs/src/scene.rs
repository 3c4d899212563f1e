//! The scene-node capability entities are bound to.
//!
//! The scene runtime itself (rendering, transforms, per-frame callbacks) lives
//! outside this crate. [`SceneGraph`] is the narrow surface the framework
//! needs: instantiate a positioned copy of a prefab, destroy it, name it,
//! and test whether it is still alive. [`MemoryScene`] is a headless
//! implementation for tools and tests.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Handle to a node in a scene.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Prefab / Placement
// ---------------------------------------------------------------------------

/// Reference to the visual template a view is instantiated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prefab(String);

impl Prefab {
    /// Prefab identified by `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The prefab's path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a new node is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// World position.
    pub position: Vec3,
    /// World rotation.
    pub rotation: Quat,
    /// Parent node, if any.
    pub parent: Option<NodeId>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            parent: None,
        }
    }
}

impl Placement {
    /// Placement at `position` with no rotation and no parent.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Same placement, rotated.
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Same placement, parented to `parent`.
    pub fn under(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

// ---------------------------------------------------------------------------
// SceneGraph
// ---------------------------------------------------------------------------

/// The scene-node runtime views live in.
pub trait SceneGraph: Send {
    /// Instantiate a positioned copy of `prefab`.
    fn instantiate(&mut self, prefab: &Prefab, placement: &Placement) -> NodeId;

    /// Destroy `node`. Destroying a dead node is a no-op.
    fn destroy(&mut self, node: NodeId);

    /// Set the node's display name.
    fn set_name(&mut self, node: NodeId, name: &str);

    /// The node's display name.
    fn name(&self, node: NodeId) -> Option<&str>;

    /// Whether `node` exists and has not been destroyed.
    fn is_alive(&self, node: NodeId) -> bool;

    /// The behaviour object attached to the node, for typed narrowing.
    fn payload(&self, node: NodeId) -> Option<&dyn Any>;
}

// ---------------------------------------------------------------------------
// MemoryScene
// ---------------------------------------------------------------------------

type PayloadFactory = Box<dyn Fn() -> Box<dyn Any + Send> + Send>;

struct MemoryNode {
    name: String,
    prefab: Prefab,
    placement: Placement,
    payload: Option<Box<dyn Any + Send>>,
}

/// Headless [`SceneGraph`] that keeps nodes in a map.
///
/// Prefabs registered with [`MemoryScene::register_prefab`] attach a payload
/// to every node instantiated from them.
#[derive(Default)]
pub struct MemoryScene {
    nodes: HashMap<NodeId, MemoryNode>,
    factories: HashMap<Prefab, PayloadFactory>,
    next_id: u64,
    instantiated: u64,
    destroyed: u64,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a payload built by `factory` to every instance of `prefab`.
    pub fn register_prefab<P, F>(&mut self, prefab: Prefab, factory: F)
    where
        P: Any + Send,
        F: Fn() -> P + Send + 'static,
    {
        self.factories.insert(
            prefab,
            Box::new(move || -> Box<dyn Any + Send> { Box::new(factory()) }),
        );
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of nodes ever instantiated.
    pub fn instantiated_count(&self) -> u64 {
        self.instantiated
    }

    /// Total number of nodes destroyed.
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }

    /// The prefab a live node was instantiated from.
    pub fn prefab(&self, node: NodeId) -> Option<&Prefab> {
        self.nodes.get(&node).map(|n| &n.prefab)
    }

    /// The placement a live node was instantiated with.
    pub fn placement(&self, node: NodeId) -> Option<Placement> {
        self.nodes.get(&node).map(|n| n.placement)
    }
}

impl SceneGraph for MemoryScene {
    fn instantiate(&mut self, prefab: &Prefab, placement: &Placement) -> NodeId {
        if let Some(parent) = placement.parent {
            if !self.nodes.contains_key(&parent) {
                warn!(%parent, %prefab, "parent node is not alive; instantiating at root");
            }
        }

        self.next_id += 1;
        let id = NodeId(self.next_id);
        let payload = self.factories.get(prefab).map(|factory| factory());
        self.nodes.insert(
            id,
            MemoryNode {
                name: prefab.as_str().to_owned(),
                prefab: prefab.clone(),
                placement: *placement,
                payload,
            },
        );
        self.instantiated += 1;
        debug!(node = %id, %prefab, "node instantiated");
        id
    }

    fn destroy(&mut self, node: NodeId) {
        if self.nodes.remove(&node).is_some() {
            self.destroyed += 1;
            debug!(%node, "node destroyed");
        }
    }

    fn set_name(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.name = name.to_owned();
        }
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn payload(&self, node: NodeId) -> Option<&dyn Any> {
        let payload = self.nodes.get(&node)?.payload.as_deref()?;
        Some(payload as &dyn Any)
    }
}

impl fmt::Debug for MemoryScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryScene")
            .field("live", &self.nodes.len())
            .field("instantiated", &self.instantiated)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sprite {
        frames: u8,
    }

    #[test]
    fn instantiate_and_destroy() {
        let mut scene = MemoryScene::new();
        let prefab = Prefab::new("prefabs/crate");
        let node = scene.instantiate(&prefab, &Placement::at(Vec3::new(1.0, 2.0, 3.0)));

        assert!(scene.is_alive(node));
        assert_eq!(scene.name(node), Some("prefabs/crate"));
        assert_eq!(scene.placement(node).unwrap().position, Vec3::new(1.0, 2.0, 3.0));

        scene.set_name(node, "Crate [NEW]");
        assert_eq!(scene.name(node), Some("Crate [NEW]"));

        scene.destroy(node);
        scene.destroy(node);
        assert!(!scene.is_alive(node));
        assert_eq!(scene.destroyed_count(), 1);
    }

    #[test]
    fn payload_comes_from_registered_factory() {
        let mut scene = MemoryScene::new();
        let prefab = Prefab::new("prefabs/sprite");
        scene.register_prefab(prefab.clone(), || Sprite { frames: 4 });

        let node = scene.instantiate(&prefab, &Placement::default());
        let sprite = scene.payload(node).and_then(|p| p.downcast_ref::<Sprite>());
        assert_eq!(sprite, Some(&Sprite { frames: 4 }));

        let bare = scene.instantiate(&Prefab::new("prefabs/other"), &Placement::default());
        assert!(scene.payload(bare).is_none());
    }

    #[test]
    fn node_ids_are_not_reused() {
        let mut scene = MemoryScene::new();
        let prefab = Prefab::new("p");
        let a = scene.instantiate(&prefab, &Placement::default());
        scene.destroy(a);
        let b = scene.instantiate(&prefab, &Placement::default());
        assert_ne!(a, b);
        assert!(!scene.is_alive(a));
    }
}
