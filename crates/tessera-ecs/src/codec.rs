//! Entity persistence format: documents, the component catalog, and codecs.
//!
//! An entity is persisted as an [`EntityDocument`]: the entity's type name,
//! the closed list of component type names it declares (for formats that need
//! a schema up front), and one [`EncodedComponent`] block per persistent
//! component. The byte-level encoding is delegated to an [`EntityCodec`];
//! [`JsonCodec`] is the built-in one.
//!
//! Decoding blocks back into typed components needs to know every concrete
//! component type in advance. That table is the [`ComponentCatalog`], filled
//! at start-up with [`ComponentCatalog::register`].

use std::collections::HashMap;
use std::io;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::component::{erase, Component, ComponentType, ErasedComponent};
use crate::EcsError;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// One persisted component: its stable type name and encoded fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedComponent {
    /// The component's [`Component::NAME`].
    #[serde(rename = "type")]
    pub type_name: String,
    /// Encoded field data.
    pub data: serde_json::Value,
}

/// The persisted form of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Name of the entity type that produced this document.
    pub entity: String,
    /// Names of every component type present in `components`.
    #[serde(default)]
    pub extra_types: Vec<String>,
    /// Persistent component blocks.
    #[serde(default)]
    pub components: Vec<EncodedComponent>,
}

// ---------------------------------------------------------------------------
// ComponentCatalog
// ---------------------------------------------------------------------------

type DecodeFn = fn(serde_json::Value) -> Result<ErasedComponent, serde_json::Error>;

fn decode_as<T>(value: serde_json::Value) -> Result<ErasedComponent, serde_json::Error>
where
    T: Component + DeserializeOwned,
{
    let typed: T = serde_json::from_value(value)?;
    Ok(erase(typed))
}

#[derive(Clone, Copy)]
struct CatalogEntry {
    ty: ComponentType,
    decode: DecodeFn,
}

/// Closed table of component types that can be decoded from documents.
#[derive(Clone, Default)]
pub struct ComponentCatalog {
    by_name: HashMap<&'static str, CatalogEntry>,
}

impl ComponentCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its [`Component::NAME`].
    ///
    /// Registering the same type twice is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered for a different type.
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: Component + DeserializeOwned,
    {
        let ty = ComponentType::of::<T>();
        if let Some(existing) = self.by_name.get(T::NAME) {
            assert!(
                existing.ty == ty,
                "component name '{}' is already registered for a different type",
                T::NAME
            );
            return self;
        }
        self.by_name.insert(
            T::NAME,
            CatalogEntry {
                ty,
                decode: decode_as::<T>,
            },
        );
        self
    }

    /// Look up a registered type by name.
    pub fn lookup(&self, name: &str) -> Option<ComponentType> {
        self.by_name.get(name).map(|entry| entry.ty)
    }

    /// Every registered type.
    pub fn types(&self) -> Vec<ComponentType> {
        self.by_name.values().map(|entry| entry.ty).collect()
    }

    /// Registered names, sorted.
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Decode one block into a type-erased component.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownComponent`] if the block's type is not registered,
    /// [`EcsError::ComponentDecode`] if its data does not match the type.
    pub fn decode(&self, block: &EncodedComponent) -> Result<ErasedComponent, EcsError> {
        let entry = self
            .by_name
            .get(block.type_name.as_str())
            .ok_or_else(|| EcsError::UnknownComponent {
                name: block.type_name.clone(),
                registered: self.registered_names().join(", "),
            })?;
        (entry.decode)(block.data.clone()).map_err(|e| EcsError::ComponentDecode {
            component: block.type_name.clone(),
            details: e.to_string(),
        })
    }
}

impl std::fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCatalog")
            .field("registered", &self.registered_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EntityCodec
// ---------------------------------------------------------------------------

/// Byte-level encoding of [`EntityDocument`]s.
pub trait EntityCodec: Send + Sync {
    /// File extension used for documents in this encoding, without the dot.
    fn extension(&self) -> &'static str;

    /// Write one document to `sink`.
    fn write(&self, sink: &mut dyn io::Write, document: &EntityDocument) -> Result<(), EcsError>;

    /// Read one document from `source`.
    fn read(&self, source: &mut dyn io::Read) -> Result<EntityDocument, EcsError>;
}

/// JSON encoding of entity documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    /// Emit indented output.
    pub pretty: bool,
}

impl JsonCodec {
    /// Indented JSON, convenient for hand-edited entity files.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl EntityCodec for JsonCodec {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(&self, sink: &mut dyn io::Write, document: &EntityDocument) -> Result<(), EcsError> {
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut *sink, document)
        } else {
            serde_json::to_writer(&mut *sink, document)
        };
        result.map_err(|e| EcsError::Codec {
            details: e.to_string(),
        })?;
        sink.flush()?;
        Ok(())
    }

    fn read(&self, source: &mut dyn io::Read) -> Result<EntityDocument, EcsError> {
        serde_json::from_reader(source).map_err(|e| EcsError::Codec {
            details: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// EntityFormat
// ---------------------------------------------------------------------------

/// A codec paired with the catalog needed to decode its blocks.
pub struct EntityFormat {
    catalog: ComponentCatalog,
    codec: Box<dyn EntityCodec>,
}

impl EntityFormat {
    /// Pair `catalog` with an arbitrary codec.
    pub fn new(catalog: ComponentCatalog, codec: impl EntityCodec + 'static) -> Self {
        Self {
            catalog,
            codec: Box::new(codec),
        }
    }

    /// Pair `catalog` with pretty-printed JSON.
    pub fn json(catalog: ComponentCatalog) -> Self {
        Self::new(catalog, JsonCodec::pretty())
    }

    /// The component catalog.
    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// The byte-level codec.
    pub fn codec(&self) -> &dyn EntityCodec {
        self.codec.as_ref()
    }
}

impl std::fmt::Debug for EntityFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityFormat")
            .field("catalog", &self.catalog)
            .field("extension", &self.codec.extension())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
