use crate::CoreError;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

mod memory;

pub use memory::MemorySnapshotStore;

/// A published copy of a card set, retrievable by its generated id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedSnapshot {
    pub id: String,
    /// Whole seconds, serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,
    /// Opaque payload, usually [`crate::CardRepository::share_payload`].
    pub card_set: Option<serde_json::Value>,
}

impl SharedSnapshot {
    pub fn new(card_set: Option<serde_json::Value>) -> Self {
        Self {
            id: crate::short_id(),
            timestamp: Utc::now().trunc_subsecs(0),
            card_set,
        }
    }

    /// Decode the payload as a card set, if it is one.
    pub fn decode_set(&self) -> Result<crate::CardSet, CoreError> {
        let raw = self
            .card_set
            .clone()
            .ok_or(CoreError::Invalid("snapshot has no card set"))?;
        Ok(serde_json::from_value(raw)?)
    }
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn insert(&self, card_set: Option<serde_json::Value>) -> Result<SharedSnapshot, CoreError>;
    async fn get(&self, id: &str) -> Result<Option<SharedSnapshot>, CoreError>;
    async fn list(&self) -> Result<Vec<SharedSnapshot>, CoreError>;
}
