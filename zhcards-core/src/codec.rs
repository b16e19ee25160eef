use crate::{migrate, CoreError, KeyValueStore, LegacyReads, RepositoryState, LEGACY_KEYS};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key holding the whole serialized [`RepositoryState`].
pub const STORAGE_KEY: &str = "flashcard-data";

/// Reads and writes the repository state as one JSON blob.
///
/// Nothing here fails outward: a missing store reads as empty and ignores
/// writes, and unreadable data falls back to the empty state.
#[derive(Clone)]
pub struct StorageCodec {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl StorageCodec {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Codec with no durable store behind it.
    pub fn detached() -> Self {
        Self { store: None }
    }

    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    pub fn load(&self) -> RepositoryState {
        let Some(store) = &self.store else {
            return RepositoryState::default();
        };

        match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<RepositoryState>(&raw) {
                Ok(state) => {
                    debug!(sets = state.sets.len(), "loaded card data");
                    state
                }
                Err(e) => {
                    warn!(error = %e, "stored card data is malformed, starting empty");
                    RepositoryState::default()
                }
            },
            Ok(None) => self.load_legacy(store.as_ref()),
            Err(e) => {
                warn!(error = %e, "could not read card data, starting empty");
                RepositoryState::default()
            }
        }
    }

    pub fn save(&self, state: &RepositoryState) {
        if let Err(e) = self.try_save(state) {
            warn!(error = %e, "failed to persist card data");
        }
    }

    pub fn try_save(&self, state: &RepositoryState) -> Result<(), CoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let json = serde_json::to_string(state)?;
        store.set(STORAGE_KEY, &json)
    }

    fn load_legacy(&self, store: &dyn KeyValueStore) -> RepositoryState {
        let reads = match LegacyReads::read(store) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "could not read legacy card data");
                return RepositoryState::default();
            }
        };

        match migrate(&reads) {
            Ok(None) => RepositoryState::default(),
            Ok(Some(state)) => {
                match self.try_save(&state) {
                    Ok(()) => {
                        remove_legacy_keys(store);
                        debug!(sets = state.sets.len(), "migrated legacy card data");
                    }
                    Err(e) => warn!(error = %e, "could not save migrated data, legacy keys kept"),
                }
                state
            }
            Err(e) => {
                warn!(error = %e, "legacy card data is malformed, starting empty");
                RepositoryState::default()
            }
        }
    }
}

/// Drop the retired keys. Safe to repeat.
pub fn remove_legacy_keys(store: &dyn KeyValueStore) {
    for key in LEGACY_KEYS {
        if let Err(e) = store.remove(key) {
            warn!(key, error = %e, "could not remove legacy key");
        }
    }
}
