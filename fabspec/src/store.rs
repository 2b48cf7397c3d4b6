//! Persistence boundary
//!
//! The pipeline never talks to a database directly. A session hands the
//! validated record, its identity and the search string to a `SpecStore`.

use crate::search::FabricIdentity;
use crate::types::SpecRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Stored fabric record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FabricId(pub Uuid);

impl FabricId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FabricId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FabricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage collaborator failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Fabric not found: {0}")]
    NotFound(FabricId),

    /// Identity already taken by another record
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Storage collaborator for fabric records
#[async_trait]
pub trait SpecStore: Send + Sync {
    /// Insert a new record, returning its id
    async fn create(
        &self,
        identity: &FabricIdentity,
        record: &SpecRecord,
        search: &str,
    ) -> Result<FabricId, StoreError>;

    /// Replace an existing record
    async fn update(
        &self,
        id: FabricId,
        identity: &FabricIdentity,
        record: &SpecRecord,
        search: &str,
    ) -> Result<(), StoreError>;
}
