use crate::{CoreError, SharedSnapshot, SnapshotStore};
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemorySnapshotStore {
    rows: RwLock<Vec<SharedSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn insert(&self, card_set: Option<serde_json::Value>) -> Result<SharedSnapshot, CoreError> {
        let snap = SharedSnapshot::new(card_set);
        self.rows.write().push(snap.clone());
        Ok(snap)
    }

    async fn get(&self, id: &str) -> Result<Option<SharedSnapshot>, CoreError> {
        Ok(self.rows.read().iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<SharedSnapshot>, CoreError> {
        Ok(self.rows.read().clone())
    }
}
