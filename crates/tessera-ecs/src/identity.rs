//! Presenter identity carried by entities and views.
//!
//! When a presenter takes ownership of an entity it stamps it with
//! [`PresenterProperties`]. The stamp is set once per entity (see
//! [`Entity::init`](crate::entity::Entity::init)); the same properties are
//! attached to the view returned from a spawn.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PresenterId
// ---------------------------------------------------------------------------

/// Process-unique numeric ID of a presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PresenterId(pub u32);

static NEXT_PRESENTER_ID: AtomicU32 = AtomicU32::new(1);

impl PresenterId {
    /// Reserved for entities initialized outside any presenter (tools, tests).
    pub const DETACHED: PresenterId = PresenterId(0);

    /// Allocate the next unused ID.
    pub fn next() -> Self {
        PresenterId(NEXT_PRESENTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PresenterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "presenter#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PresenterProperties
// ---------------------------------------------------------------------------

/// Presenter-scoped context handed to entities and views.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresenterProperties {
    presenter: PresenterId,
    label: Arc<str>,
}

impl PresenterProperties {
    /// Properties for the presenter `presenter`, labelled for logs.
    pub fn new(presenter: PresenterId, label: impl Into<Arc<str>>) -> Self {
        Self {
            presenter,
            label: label.into(),
        }
    }

    /// The owning presenter.
    pub fn presenter(&self) -> PresenterId {
        self.presenter
    }

    /// Human-readable presenter label.
    pub fn label(&self) -> &str {
        &self.label
    }
}
