//! Presenters: the spawn / bind / query / destroy lifecycle of entities and
//! their scene views.
//!
//! A [`Presenter`] owns a one-to-one table from live scene nodes to the
//! entities bound to them. Spawning follows a fixed sequence:
//!
//! 1. **Validate** the requested type: abstract kinds, types outside a
//!    non-empty allow-list and non-entity types are rejected, in that order.
//! 2. **Construct** a fresh instance, or load one from the
//!    [`EntityDatabase`] for persistent kinds.
//! 3. **Contextualize** the entity with the presenter's
//!    [`PresenterProperties`] (first presenter wins).
//! 4. **Bind**: if the entity carries a [`ViewBinding`] with a prefab, a
//!    node is instantiated at the requested placement, named
//!    `"<TypeName> [NEW]"`, recorded on the binding and in the table.
//!
//! Destruction is deferred. [`Presenter::destroy`] only queues the node in
//! the [`DestructionQueue`]; the next [`Presenter::reap`] (normally run from
//! the tick loop's late-update phase) drops the associations and destroys
//! the nodes. Until then a queued node is still visible to every query.
//!
//! Presenters built with clones of the same queue share it. Each entry is
//! tagged with the [`SceneKey`] of the scene the node lives in, so a reap
//! only takes the entries for its own scene: whichever presenter over that
//! scene reaps first destroys them, and entries for other scenes wait for a
//! presenter over those.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use tessera_ecs::component::{Component, ComponentType};
use tessera_ecs::entity::Entity;
use tessera_ecs::identity::{PresenterId, PresenterProperties};
use tessera_ecs::kind::{EntityKind, TypeKey};
use tessera_ecs::scene::{NodeId, Placement, SceneGraph};
use tessera_ecs::view::ViewBinding;
use tessera_store::{DatabaseError, EntityDatabase};

use crate::tick::LateUpdate;

/// A scene shared between presenters and the host.
pub type SharedScene<S> = Arc<Mutex<S>>;

// ---------------------------------------------------------------------------
// PresenterError
// ---------------------------------------------------------------------------

/// Errors produced by presenter operations.
#[derive(Debug, thiserror::Error)]
pub enum PresenterError {
    /// Abstract kinds cannot be spawned.
    #[error("entity type '{type_name}' is abstract and cannot be spawned")]
    AbstractType { type_name: &'static str },

    /// The type is outside the presenter's allow-list.
    #[error("entity type '{type_name}' is not allowed for presenter '{presenter}'")]
    NotAllowed {
        type_name: &'static str,
        presenter: String,
    },

    /// The type is not an entity kind.
    #[error("type '{type_name}' is not an entity type")]
    NotAnEntity { type_name: &'static str },

    /// The entity is already displayed by a live node.
    #[error("entity '{type_name}' is already bound to live {node}")]
    AlreadyBound {
        type_name: &'static str,
        node: NodeId,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

// ---------------------------------------------------------------------------
// SceneKey
// ---------------------------------------------------------------------------

/// Identity of a shared scene handle.
///
/// Node ids are only unique within one scene, so queued nodes are keyed by
/// scene as well. Clones of one [`SharedScene`] have the same key. The key
/// is the handle's address, so it is only meaningful while the scene is
/// alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneKey(usize);

impl SceneKey {
    /// The key of `scene`.
    pub fn of<S: ?Sized>(scene: &Arc<Mutex<S>>) -> Self {
        Self(Arc::as_ptr(scene) as *const () as usize)
    }
}

// ---------------------------------------------------------------------------
// DestructionQueue
// ---------------------------------------------------------------------------

/// Nodes awaiting destruction at the next reap, per scene.
///
/// Cloning yields a handle to the same queue.
#[derive(Clone, Default)]
pub struct DestructionQueue {
    pending: Arc<Mutex<HashSet<(SceneKey, NodeId)>>>,
}

impl DestructionQueue {
    /// A new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `node` of `scene`. Returns `false` if it was already queued.
    pub fn enqueue(&self, scene: SceneKey, node: NodeId) -> bool {
        self.pending.lock().insert((scene, node))
    }

    /// Whether `node` of `scene` is queued.
    pub fn contains(&self, scene: SceneKey, node: NodeId) -> bool {
        self.pending.lock().contains(&(scene, node))
    }

    /// Take every node queued for `scene`, in id order. Entries for other
    /// scenes stay queued.
    pub fn drain(&self, scene: SceneKey) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.pending.lock().retain(|&(key, node)| {
            if key == scene {
                nodes.push(node);
                false
            } else {
                true
            }
        });
        nodes.sort_unstable();
        nodes
    }

    /// Number of queued nodes across all scenes.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is queued for any scene.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Whether both handles refer to the same queue.
    pub fn shares_with(&self, other: &DestructionQueue) -> bool {
        Arc::ptr_eq(&self.pending, &other.pending)
    }
}

impl fmt::Debug for DestructionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestructionQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// View / ReapReport
// ---------------------------------------------------------------------------

/// The result of a successful spawn: the new node and who owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    node: NodeId,
    kind: TypeKey,
    properties: PresenterProperties,
}

impl View {
    /// The instantiated scene node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Type of the entity bound to the node.
    pub fn kind(&self) -> TypeKey {
        self.kind
    }

    /// Context of the presenter that spawned the view.
    pub fn properties(&self) -> &PresenterProperties {
        &self.properties
    }
}

/// What one [`Presenter::reap`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    /// Nodes taken from the destruction queue.
    pub drained: usize,
    /// Nodes destroyed in the scene.
    pub destroyed: usize,
    /// Associations removed from this presenter.
    pub released: usize,
}

// ---------------------------------------------------------------------------
// PresenterBuilder
// ---------------------------------------------------------------------------

/// Configures and builds a [`Presenter`].
pub struct PresenterBuilder<S> {
    scene: SharedScene<S>,
    queue: Option<DestructionQueue>,
    database: Option<Arc<EntityDatabase>>,
    allowed: Vec<TypeKey>,
    label: Option<String>,
}

impl<S: SceneGraph> PresenterBuilder<S> {
    /// Start building a presenter over `scene`.
    pub fn new(scene: SharedScene<S>) -> Self {
        Self {
            scene,
            queue: None,
            database: None,
            allowed: Vec::new(),
            label: None,
        }
    }

    /// Share `queue` instead of creating a private one.
    pub fn queue(mut self, queue: DestructionQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Load persistent entities from `database`.
    ///
    /// Without this the presenter uses the process-wide database, if one is
    /// installed.
    pub fn database(mut self, database: Arc<EntityDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    /// Allow `E` and every kind specializing it.
    pub fn allow<E: EntityKind>(self) -> Self {
        self.allow_key(TypeKey::of::<E>())
    }

    /// Allow a runtime type key. Checked by [`PresenterBuilder::build`].
    pub fn allow_key(mut self, key: TypeKey) -> Self {
        if !self.allowed.contains(&key) {
            self.allowed.push(key);
        }
        self
    }

    /// Label used in logs and errors.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Build the presenter.
    ///
    /// # Errors
    ///
    /// [`PresenterError::NotAnEntity`] if an allow-list entry is not an entity
    /// kind.
    pub fn build(self) -> Result<Presenter<S>, PresenterError> {
        if let Some(bad) = self.allowed.iter().find(|key| !key.is_entity()) {
            return Err(PresenterError::NotAnEntity {
                type_name: bad.name(),
            });
        }
        Ok(self.finish())
    }

    fn finish(self) -> Presenter<S> {
        let id = PresenterId::next();
        let label = self.label.unwrap_or_else(|| id.to_string());
        debug!(presenter = %id, %label, allowed = self.allowed.len(), "presenter created");

        Presenter {
            id,
            properties: PresenterProperties::new(id, label),
            scene_key: SceneKey::of(&self.scene),
            scene: self.scene,
            queue: self.queue.unwrap_or_default(),
            database: self.database,
            allowed: self.allowed,
            loaded: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Owns the lifecycle of entities displayed in a scene.
pub struct Presenter<S> {
    id: PresenterId,
    properties: PresenterProperties,
    scene: SharedScene<S>,
    scene_key: SceneKey,
    queue: DestructionQueue,
    database: Option<Arc<EntityDatabase>>,
    allowed: Vec<TypeKey>,
    /// Node → entity, ordered by node id.
    loaded: BTreeMap<NodeId, Arc<Entity>>,
}

impl<S: SceneGraph> Presenter<S> {
    /// Start building a presenter over `scene`.
    pub fn builder(scene: SharedScene<S>) -> PresenterBuilder<S> {
        PresenterBuilder::new(scene)
    }

    /// A presenter accepting every entity kind, with a private queue.
    pub fn new(scene: SharedScene<S>) -> Self {
        PresenterBuilder::new(scene).finish()
    }

    /// Process-unique id of this presenter.
    pub fn id(&self) -> PresenterId {
        self.id
    }

    /// The context stamped on spawned entities and views.
    pub fn properties(&self) -> &PresenterProperties {
        &self.properties
    }

    /// The scene views are instantiated in.
    pub fn scene(&self) -> &SharedScene<S> {
        &self.scene
    }

    /// Key under which this presenter's nodes are queued.
    pub fn scene_key(&self) -> SceneKey {
        self.scene_key
    }

    /// The destruction queue this presenter reaps.
    pub fn queue(&self) -> &DestructionQueue {
        &self.queue
    }

    /// The allow-list; empty means every entity kind.
    pub fn allowed_types(&self) -> &[TypeKey] {
        &self.allowed
    }

    fn database(&self) -> Option<&EntityDatabase> {
        self.database.as_deref().or_else(|| tessera_store::global())
    }

    // -- validation ---------------------------------------------------------

    /// Whether `key` passes the allow-list.
    ///
    /// With an empty allow-list every entity kind passes. Otherwise `key`
    /// must be, or specialize, one of the listed kinds.
    pub fn is_type_allowed(&self, key: TypeKey) -> bool {
        if self.allowed.is_empty() {
            return key.is_entity();
        }
        self.allowed.iter().any(|allowed| key.is_assignable_to(allowed))
    }

    fn validate(&self, key: TypeKey) -> Result<(), PresenterError> {
        if key.is_abstract() {
            return Err(PresenterError::AbstractType {
                type_name: key.name(),
            });
        }
        if !self.allowed.is_empty() && !self.is_type_allowed(key) {
            return Err(PresenterError::NotAllowed {
                type_name: key.name(),
                presenter: self.properties.label().to_owned(),
            });
        }
        if !key.is_entity() {
            return Err(PresenterError::NotAnEntity {
                type_name: key.name(),
            });
        }
        Ok(())
    }

    fn instantiate(key: TypeKey) -> Result<Entity, PresenterError> {
        key.instantiate().ok_or(PresenterError::NotAnEntity {
            type_name: key.name(),
        })
    }

    // -- spawning -----------------------------------------------------------

    /// Spawn a fresh instance of `key`.
    ///
    /// `Ok(None)` if the entity has no [`ViewBinding`] or no prefab; nothing
    /// is recorded in that case.
    pub fn spawn(
        &mut self,
        key: TypeKey,
        placement: &Placement,
    ) -> Result<Option<View>, PresenterError> {
        self.validate(key)?;
        let entity = Self::instantiate(key)?;
        Ok(self.bind(Arc::new(entity), placement))
    }

    /// Typed [`Presenter::spawn`].
    pub fn spawn_of<E: EntityKind>(
        &mut self,
        placement: &Placement,
    ) -> Result<Option<View>, PresenterError> {
        self.spawn(TypeKey::of::<E>(), placement)
    }

    /// Spawn the stored instance of a persistent kind.
    ///
    /// Transient kinds, and persistent kinds with nothing stored yet, are
    /// spawned fresh.
    pub fn spawn_from_storage(
        &mut self,
        key: TypeKey,
        placement: &Placement,
    ) -> Result<Option<View>, PresenterError> {
        self.validate(key)?;

        let stored = if key.is_persistent() {
            match self.database() {
                Some(database) => database.get_entity(key)?,
                None => {
                    warn!(entity = key.name(), "no entity database available; spawning fresh");
                    None
                }
            }
        } else {
            None
        };

        let entity = match stored {
            Some(entity) => entity,
            None => {
                if key.is_persistent() {
                    warn!(entity = key.name(), "no stored instance; spawning fresh");
                }
                Self::instantiate(key)?
            }
        };
        Ok(self.bind(Arc::new(entity), placement))
    }

    /// Typed [`Presenter::spawn_from_storage`].
    pub fn spawn_from_storage_of<E: EntityKind>(
        &mut self,
        placement: &Placement,
    ) -> Result<Option<View>, PresenterError> {
        self.spawn_from_storage(TypeKey::of::<E>(), placement)
    }

    /// Bind an existing entity to a new view.
    ///
    /// # Errors
    ///
    /// The validation errors of [`Presenter::spawn`], and
    /// [`PresenterError::AlreadyBound`] if the entity is still displayed by a
    /// live node.
    pub fn spawn_entity(
        &mut self,
        entity: Arc<Entity>,
        placement: &Placement,
    ) -> Result<Option<View>, PresenterError> {
        let key = entity.kind();
        self.validate(key)?;

        let live = {
            let scene = self.scene.lock();
            entity.try_get_view(&*scene)
        };
        if let Some(node) = live {
            return Err(PresenterError::AlreadyBound {
                type_name: key.name(),
                node,
            });
        }

        Ok(self.bind(entity, placement))
    }

    fn bind(&mut self, entity: Arc<Entity>, placement: &Placement) -> Option<View> {
        let kind = entity.kind();
        entity.init(self.properties.clone());

        let Some(binding) = entity.get::<ViewBinding>() else {
            debug!(entity = kind.name(), "no view binding; entity not displayed");
            return None;
        };
        let Some(prefab) = binding.read().prefab().cloned() else {
            debug!(entity = kind.name(), "view binding has no prefab; entity not displayed");
            return None;
        };

        let node = {
            let mut scene = self.scene.lock();
            let node = scene.instantiate(&prefab, placement);
            scene.set_name(node, &format!("{} [NEW]", kind.name()));
            node
        };
        binding.write().bind(node);
        self.loaded.insert(node, entity);

        debug!(presenter = %self.id, entity = kind.name(), %node, %prefab, "entity spawned");
        Some(View {
            node,
            kind,
            properties: self.properties.clone(),
        })
    }

    // -- destruction --------------------------------------------------------

    /// Queue `node` for destruction at the next reap.
    ///
    /// Returns `false` if it was already queued.
    pub fn destroy(&self, node: NodeId) -> bool {
        let queued = self.queue.enqueue(self.scene_key, node);
        trace!(presenter = %self.id, %node, queued, "destroy requested");
        queued
    }

    /// Apply queued destructions for this presenter's scene.
    ///
    /// Every node queued for the scene is removed from this presenter's table, unbound
    /// from its entity, and destroyed in the scene if still alive. Then any
    /// of this presenter's associations whose node has died by other means
    /// are released too.
    pub fn reap(&mut self) -> ReapReport {
        let drained = self.queue.drain(self.scene_key);
        let mut report = ReapReport {
            drained: drained.len(),
            ..ReapReport::default()
        };

        let mut scene = self.scene.lock();
        for node in drained {
            if let Some(entity) = self.loaded.remove(&node) {
                unbind(&entity, node);
                report.released += 1;
            }
            if scene.is_alive(node) {
                scene.destroy(node);
                report.destroyed += 1;
            }
        }

        let before = self.loaded.len();
        self.loaded.retain(|node, entity| {
            let alive = scene.is_alive(*node);
            if !alive {
                unbind(entity, *node);
            }
            alive
        });
        report.released += before - self.loaded.len();
        drop(scene);

        if report != ReapReport::default() {
            debug!(
                presenter = %self.id,
                drained = report.drained,
                destroyed = report.destroyed,
                released = report.released,
                "reaped"
            );
        }
        report
    }

    /// Destroy every view this presenter owns, immediately.
    pub fn destroy_all(&mut self) -> usize {
        let mut scene = self.scene.lock();
        let mut destroyed = 0;
        for (node, entity) in std::mem::take(&mut self.loaded) {
            unbind(&entity, node);
            if scene.is_alive(node) {
                scene.destroy(node);
                destroyed += 1;
            }
        }
        debug!(presenter = %self.id, destroyed, "all views destroyed");
        destroyed
    }

    // -- queries ------------------------------------------------------------

    /// Entities having every `required` type and none of the `excluded`
    /// ones. `None` skips that side of the test.
    pub fn filter(
        &self,
        required: Option<&[ComponentType]>,
        excluded: Option<&[ComponentType]>,
    ) -> Vec<Arc<Entity>> {
        self.loaded
            .values()
            .filter(|entity| {
                let has_required =
                    required.map_or(true, |types| types.iter().all(|ty| entity.has_type(*ty)));
                let has_excluded =
                    excluded.is_some_and(|types| types.iter().any(|ty| entity.has_type(*ty)));
                has_required && !has_excluded
            })
            .cloned()
            .collect()
    }

    /// Entities having every type in `required`.
    pub fn filter_all(&self, required: &[ComponentType]) -> Vec<Arc<Entity>> {
        self.filter(Some(required), None)
    }

    /// Entities having an `R`.
    pub fn filter_with<R: Component>(&self) -> Vec<Arc<Entity>> {
        self.filter_all(&[ComponentType::of::<R>()])
    }

    /// Entities having an `R` but no `X`.
    pub fn filter_with_without<R: Component, X: Component>(&self) -> Vec<Arc<Entity>> {
        self.filter(
            Some(&[ComponentType::of::<R>()]),
            Some(&[ComponentType::of::<X>()]),
        )
    }

    /// The entity bound to `node`.
    pub fn entity_by_view(&self, node: NodeId) -> Option<Arc<Entity>> {
        self.loaded.get(&node).cloned()
    }

    /// The entity bound to `node`, if it is an `E` or specializes it.
    pub fn entity_by_view_of<E: EntityKind>(&self, node: NodeId) -> Option<Arc<Entity>> {
        self.entity_by_view(node)
            .filter(|entity| entity.kind().is_assignable_to(&TypeKey::of::<E>()))
    }

    /// The first entity (by node order) whose type is exactly `key`.
    pub fn entity_by_type(&self, key: TypeKey) -> Option<Arc<Entity>> {
        self.loaded
            .values()
            .find(|entity| entity.kind() == key)
            .cloned()
    }

    /// Typed [`Presenter::entity_by_type`].
    pub fn entity_by_type_of<E: EntityKind>(&self) -> Option<Arc<Entity>> {
        self.entity_by_type(TypeKey::of::<E>())
    }

    /// Every node → entity association.
    pub fn entities(&self) -> &BTreeMap<NodeId, Arc<Entity>> {
        &self.loaded
    }

    /// Every live view this presenter owns.
    pub fn views(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.loaded.keys().copied()
    }

    /// Every entity this presenter displays.
    pub fn models(&self) -> impl Iterator<Item = &Arc<Entity>> + '_ {
        self.loaded.values()
    }

    /// Number of associations.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    /// Whether no view is displayed.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Clear the entity's back-reference if it still points at `node`.
fn unbind(entity: &Entity, node: NodeId) {
    if let Some(binding) = entity.get::<ViewBinding>() {
        let mut binding = binding.write();
        if binding.current() == Some(node) {
            binding.unbind();
        }
    }
}

impl<S: SceneGraph> LateUpdate for Presenter<S> {
    fn late_update(&mut self, _dt: f64) {
        self.reap();
    }
}

impl<S> fmt::Debug for Presenter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presenter")
            .field("id", &self.id)
            .field("label", &self.properties.label())
            .field("allowed", &self.allowed)
            .field("loaded", &self.loaded.len())
            .field("queue", &self.queue)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_ecs::scene::{MemoryScene, Prefab};

    struct Torch;
    impl EntityKind for Torch {
        const NAME: &'static str = "Torch";

        fn assemble(entity: &Entity) {
            entity.insert(ViewBinding::with_prefab(Prefab::new("prefabs/torch")));
        }
    }

    fn scene() -> SharedScene<MemoryScene> {
        Arc::new(Mutex::new(MemoryScene::new()))
    }

    #[test]
    fn queue_clones_share_state() {
        let a = DestructionQueue::new();
        let b = a.clone();
        assert!(a.shares_with(&b));
        assert!(!a.shares_with(&DestructionQueue::new()));

        let key = SceneKey::of(&scene());
        assert!(a.enqueue(key, NodeId::from_raw(3)));
        assert!(!b.enqueue(key, NodeId::from_raw(3)));
        assert!(b.contains(key, NodeId::from_raw(3)));
        assert_eq!(b.drain(key), vec![NodeId::from_raw(3)]);
        assert!(a.is_empty());
    }

    #[test]
    fn queue_drains_one_scene_at_a_time() {
        let (first, second) = (scene(), scene());
        let (k1, k2) = (SceneKey::of(&first), SceneKey::of(&second));
        assert_ne!(k1, k2);
        assert_eq!(k1, SceneKey::of(&Arc::clone(&first)));

        let queue = DestructionQueue::new();
        let node = NodeId::from_raw(1);
        assert!(queue.enqueue(k1, node));
        assert!(queue.enqueue(k2, node));
        assert!(queue.enqueue(k2, NodeId::from_raw(2)));

        assert_eq!(queue.drain(k1), vec![node]);
        assert!(!queue.contains(k1, node));
        assert!(queue.contains(k2, node));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain(k2), vec![node, NodeId::from_raw(2)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn spawned_node_is_named_after_type() {
        let scene = scene();
        let mut presenter = Presenter::new(Arc::clone(&scene));
        let view = presenter.spawn_of::<Torch>(&Placement::default()).unwrap().unwrap();

        assert_eq!(scene.lock().name(view.node()), Some("Torch [NEW]"));
        assert_eq!(view.kind(), TypeKey::of::<Torch>());
        assert_eq!(view.properties(), presenter.properties());
    }

    #[test]
    fn reap_with_empty_queue_is_a_noop() {
        let mut presenter = Presenter::new(scene());
        presenter.spawn_of::<Torch>(&Placement::default()).unwrap();
        assert_eq!(presenter.reap(), ReapReport::default());
        assert_eq!(presenter.len(), 1);
    }

    #[test]
    fn late_update_reaps() {
        let mut presenter = Presenter::new(scene());
        let view = presenter.spawn_of::<Torch>(&Placement::default()).unwrap().unwrap();
        presenter.destroy(view.node());
        presenter.late_update(1.0 / 60.0);
        assert!(presenter.is_empty());
    }

    #[test]
    fn default_label_is_presenter_id() {
        let presenter = Presenter::builder(scene()).build().unwrap();
        assert_eq!(presenter.properties().label(), presenter.id().to_string());
    }

    #[test]
    fn new_matches_default_builder() {
        let scene = scene();
        let presenter = Presenter::new(Arc::clone(&scene));
        assert_eq!(presenter.properties().label(), presenter.id().to_string());
        assert_eq!(presenter.scene_key(), SceneKey::of(&scene));
        assert!(presenter.allowed_types().is_empty());
        assert!(presenter.queue().is_empty());
    }
}
