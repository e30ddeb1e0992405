//! Resource lifecycle trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Declared state of a single resource instance
///
/// Holds what the user configured plus what the remote service reported on
/// the last read, and the opaque remote identifier. An instance without an
/// identifier is absent: either not created yet, or found gone on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredState<C> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    /// Typed attributes of the resource
    #[serde(flatten)]
    pub config: C,
}

impl<C> DeclaredState<C> {
    pub fn new(config: C) -> Self {
        Self { id: None, config }
    }

    pub fn with_id(id: impl Into<String>, config: C) -> Self {
        Self {
            id: Some(id.into()),
            config,
        }
    }

    /// Remote identifier, if the resource exists
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the resource as absent
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_absent(&self) -> bool {
        self.id().is_none()
    }
}

/// Lifecycle of one remote resource kind
///
/// Implementations translate declared state into remote API calls and back.
/// Each method runs to completion before returning; the caller owns the
/// declared state between invocations.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Typed configuration of the resource
    type Config: Clone + Send + Sync;

    /// Validate configuration before any remote call
    fn validate(&self, config: &Self::Config) -> Result<()>;

    /// Name of the first immutable attribute that differs between `prior`
    /// and `desired`, if any. A change there cannot be applied in place.
    fn replacement_reason(&self, prior: &Self::Config, desired: &Self::Config) -> Option<&'static str>;

    fn requires_replacement(&self, prior: &Self::Config, desired: &Self::Config) -> bool {
        self.replacement_reason(prior, desired).is_some()
    }

    /// Create the resource and refresh computed attributes
    async fn create(&self, state: &mut DeclaredState<Self::Config>) -> Result<()>;

    /// Refresh declared state from the remote; clears the identifier when the
    /// resource no longer exists
    async fn read(&self, state: &mut DeclaredState<Self::Config>) -> Result<()>;

    /// Apply `state` in place over `prior`
    async fn update(
        &self,
        state: &mut DeclaredState<Self::Config>,
        prior: &DeclaredState<Self::Config>,
    ) -> Result<()>;

    /// Destroy the resource
    async fn delete(&self, state: &DeclaredState<Self::Config>) -> Result<()>;

    /// Build declared state from an import identifier
    async fn import(&self, import_id: &str) -> Result<Vec<DeclaredState<Self::Config>>>;
}
