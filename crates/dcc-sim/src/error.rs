//! Engine error taxonomy.

use thiserror::Error;

use dcc_core::data::DataStoreError;
use dcc_core::enums::EntityType;
use dcc_core::types::EntityId;

use crate::serialization::SnapshotError;

#[derive(Debug, Error)]
pub enum CampaignError {
    /// Required reference data is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(#[from] DataStoreError),

    /// Lookup of an entity that is not (or no longer) in the registry.
    #[error("entity {0} not found")]
    NotFound(EntityId),

    #[error("entity {id} is a {found}, expected {expected}")]
    WrongEntityType {
        id: EntityId,
        expected: &'static str,
        found: EntityType,
    },

    #[error("no active campaign")]
    Inactive,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl CampaignError {
    /// Logic-error class failures: the operation aborts, the engine survives.
    pub fn is_logic_error(&self) -> bool {
        matches!(
            self,
            CampaignError::NotFound(_) | CampaignError::WrongEntityType { .. }
        )
    }
}
