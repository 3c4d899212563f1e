//! Entities: typed bundles of components.
//!
//! An [`Entity`] is identified by its [`TypeKey`]. It owns one [`Components`]
//! registry and an init-once [`PresenterProperties`] slot. Entities are
//! shared as `Arc<Entity>`; every method takes `&self`.

use std::any::Any;
use std::fmt;
use std::io;
use std::sync::OnceLock;

use tracing::{trace, warn};

use crate::codec::{EncodedComponent, EntityDocument, EntityFormat};
use crate::component::{Component, ComponentType, Components, ErasedComponent, Shared};
use crate::identity::PresenterProperties;
use crate::kind::{EntityKind, TypeKey};
use crate::scene::{NodeId, SceneGraph};
use crate::view::ViewBinding;
use crate::EcsError;

/// A domain object made of components.
pub struct Entity {
    kind: TypeKey,
    components: Components,
    properties: OnceLock<PresenterProperties>,
}

impl Entity {
    /// A bare entity of `kind`, with no components.
    pub fn new(kind: TypeKey) -> Self {
        Self {
            kind,
            components: Components::new(),
            properties: OnceLock::new(),
        }
    }

    /// A fresh `E` with its starting components.
    ///
    /// Unlike [`TypeKey::instantiate`] this does not refuse abstract kinds;
    /// abstractness is enforced where types arrive dynamically.
    pub fn build<E: EntityKind>() -> Self {
        let entity = Self::new(TypeKey::of::<E>());
        E::assemble(&entity);
        entity
    }

    /// The entity's type, which is also its identity.
    pub fn kind(&self) -> TypeKey {
        self.kind
    }

    /// Alias of [`Entity::kind`]: an entity is identified by its type.
    pub fn id(&self) -> TypeKey {
        self.kind
    }

    /// Whether the entity is of kind `E` (exactly, not a specialization).
    pub fn is<E: EntityKind>(&self) -> bool {
        self.kind == TypeKey::of::<E>()
    }

    // -- presenter context --------------------------------------------------

    /// Stamp the entity with presenter context.
    ///
    /// Only the first call has an effect; later calls are ignored. Returns
    /// whether this call set the properties.
    pub fn init(&self, properties: PresenterProperties) -> bool {
        match self.properties.set(properties) {
            Ok(()) => true,
            Err(ignored) => {
                trace!(
                    entity = self.kind.name(),
                    presenter = %ignored.presenter(),
                    "entity already initialized"
                );
                false
            }
        }
    }

    /// The presenter context, once initialized.
    pub fn properties(&self) -> Option<&PresenterProperties> {
        self.properties.get()
    }

    // -- view ---------------------------------------------------------------

    /// The bound node, if the entity has a [`ViewBinding`] whose node is
    /// still alive in `scene`.
    pub fn try_get_view(&self, scene: &dyn SceneGraph) -> Option<NodeId> {
        self.get_view().filter(|node| scene.is_alive(*node))
    }

    /// The node recorded on the entity's [`ViewBinding`], without checking
    /// that it is alive.
    pub fn get_view(&self) -> Option<NodeId> {
        self.components.get::<ViewBinding>()?.read().current()
    }

    /// The bound node's payload narrowed to `T`.
    ///
    /// `None` if there is no live view or its payload is not a `T`.
    pub fn get_view_as<'s, T: Any>(&self, scene: &'s dyn SceneGraph) -> Option<&'s T> {
        let node = self.try_get_view(scene)?;
        scene.payload(node)?.downcast_ref::<T>()
    }

    // -- components ---------------------------------------------------------

    /// The entity's component registry.
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// See [`Components::add`].
    pub fn add<T: Component>(&self) -> Shared<T> {
        self.components.add::<T>()
    }

    /// See [`Components::insert`].
    pub fn insert<T: Component>(&self, value: T) -> Option<Shared<T>> {
        self.components.insert(value)
    }

    /// Builder-style [`Entity::insert`].
    pub fn with<T: Component>(self, value: T) -> Self {
        self.components.insert(value);
        self
    }

    /// See [`Components::get`].
    pub fn get<T: Component>(&self) -> Option<Shared<T>> {
        self.components.get::<T>()
    }

    /// See [`Components::try_get`].
    pub fn try_get<T: Component>(&self) -> Result<Shared<T>, EcsError> {
        self.components.try_get::<T>()
    }

    /// See [`Components::get_or_add`].
    pub fn get_or_add<T: Component>(&self) -> Shared<T> {
        self.components.get_or_add::<T>()
    }

    /// See [`Components::has`].
    pub fn has<T: Component>(&self) -> bool {
        self.components.has::<T>()
    }

    /// See [`Components::has_type`].
    pub fn has_type(&self, ty: ComponentType) -> bool {
        self.components.has_type(ty)
    }

    /// See [`Components::remove`].
    pub fn remove<T: Component>(&self) -> bool {
        self.components.remove::<T>()
    }

    /// See [`Components::remove_type`].
    pub fn remove_type(&self, ty: ComponentType) -> bool {
        self.components.remove_type(ty)
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// See [`Components::serializable_subset`].
    pub fn serializable_subset(&self) -> Vec<ErasedComponent> {
        self.components.serializable_subset()
    }

    // -- persistence --------------------------------------------------------

    /// Concrete types of the components [`Entity::write`] emits, for codecs
    /// that need the closed type list up front.
    pub fn declared_extra_types(&self) -> Vec<ComponentType> {
        self.components.persistent_types()
    }

    /// Build the persisted form of this entity.
    ///
    /// Blocks are sorted by type name so output is stable.
    pub fn to_document(&self) -> Result<EntityDocument, EcsError> {
        let mut components = Vec::new();
        for component in self.serializable_subset() {
            let ty = component.component_type();
            let encoded = component.encode().map_err(|e| EcsError::ComponentEncode {
                component: ty.name().to_owned(),
                details: e.to_string(),
            })?;
            match encoded {
                Some(data) => components.push(EncodedComponent {
                    type_name: ty.name().to_owned(),
                    data,
                }),
                None => warn!(
                    entity = self.kind.name(),
                    component = ty.name(),
                    "persistent component produced no data -- skipping"
                ),
            }
        }
        components.sort_by(|a, b| a.type_name.cmp(&b.type_name));

        Ok(EntityDocument {
            entity: self.kind.name().to_owned(),
            extra_types: components.iter().map(|c| c.type_name.clone()).collect(),
            components,
        })
    }

    /// Merge a persisted document into this entity.
    ///
    /// Every block is decoded before anything is inserted, so a bad block
    /// leaves the entity untouched. Decoded components replace existing ones
    /// of the same type. Returns the number of components merged.
    pub fn apply_document(
        &self,
        document: &EntityDocument,
        format: &EntityFormat,
    ) -> Result<usize, EcsError> {
        if document.entity != self.kind.name() {
            warn!(
                entity = self.kind.name(),
                document = %document.entity,
                "document was written by a different entity type"
            );
        }

        let decoded = document
            .components
            .iter()
            .map(|block| format.catalog().decode(block))
            .collect::<Result<Vec<_>, _>>()?;

        let merged = decoded.len();
        for component in decoded {
            self.components.insert_erased(component);
        }
        Ok(merged)
    }

    /// Write the entity's persistent components to `sink`.
    pub fn write(&self, sink: &mut dyn io::Write, format: &EntityFormat) -> Result<(), EcsError> {
        let document = self.to_document()?;
        format.codec().write(sink, &document)
    }

    /// Read persisted components from `source` and merge them in.
    ///
    /// Returns the number of components merged.
    pub fn read(&self, source: &mut dyn io::Read, format: &EntityFormat) -> Result<usize, EcsError> {
        let document = format.codec().read(source)?;
        self.apply_document(&document, format)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.kind)
            .field("components", &self.components)
            .field("properties", &self.properties.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
