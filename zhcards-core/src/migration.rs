//! Folding of retired storage layouts into the current [`RepositoryState`].
//!
//! Two layouts predate the nested one:
//!
//! * `flashcards` alone: a flat array of cards, before sets existed.
//! * `flashcards` + `cardSets`: cards carrying a `setId` next to a flat array of
//!   sets without embedded cards.
//!
//! [`migrate`] is pure. Reading the old keys and deleting them afterwards is the
//! codec's job.

use crate::{
    Card, CardSet, CoreError, KeyValueStore, RepositoryState, DEFAULT_SET_ID,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const LEGACY_CARDS_KEY: &str = "flashcards";
pub const LEGACY_SETS_KEY: &str = "cardSets";
pub const LEGACY_KEYS: [&str; 2] = [LEGACY_CARDS_KEY, LEGACY_SETS_KEY];

/// Raw contents of the legacy keys, as found in the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyReads {
    pub cards: Option<String>,
    pub sets: Option<String>,
}

impl LegacyReads {
    pub fn read(store: &dyn KeyValueStore) -> Result<Self, CoreError> {
        Ok(Self {
            cards: store.get(LEGACY_CARDS_KEY)?,
            sets: store.get(LEGACY_SETS_KEY)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_none() && self.sets.is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCard {
    id: String,
    #[serde(default)]
    set_id: Option<String>,
    chinese: String,
    pinyin: String,
    english: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

impl LegacyCard {
    fn into_card(self) -> (Option<String>, Card) {
        let card = Card {
            id: self.id,
            chinese: self.chinese,
            pinyin: self.pinyin,
            english: self.english,
            created_at: self.created_at,
        };
        (self.set_id, card)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySet {
    id: String,
    name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

/// Build the current state from legacy data.
///
/// `Ok(None)` means there was nothing to migrate. Malformed legacy JSON is an
/// error; callers decide how to degrade.
pub fn migrate(reads: &LegacyReads) -> Result<Option<RepositoryState>, CoreError> {
    if reads.is_empty() {
        return Ok(None);
    }

    let cards: Vec<LegacyCard> = match &reads.cards {
        Some(raw) => serde_json::from_str(raw)?,
        None => Vec::new(),
    };

    let mut state = RepositoryState::default();

    match &reads.sets {
        None => {
            let mut default = CardSet::default_set();
            default.cards = cards.into_iter().map(|c| c.into_card().1).collect();
            state.sets.push(default);
        }
        Some(raw) => {
            let sets: Vec<LegacySet> = serde_json::from_str(raw)?;
            state.sets = sets
                .into_iter()
                .map(|s| CardSet {
                    id: s.id,
                    name: s.name,
                    created_at: s.created_at,
                    cards: Vec::new(),
                })
                .collect();
            state.normalize();

            let mut orphans = 0usize;
            for legacy in cards {
                let (set_id, card) = legacy.into_card();
                let set_id = set_id.unwrap_or_else(|| DEFAULT_SET_ID.to_string());
                match state.find_set_mut(&set_id) {
                    Some(set) => set.cards.push(card),
                    None => orphans += 1,
                }
            }
            if orphans > 0 {
                tracing::debug!(orphans, "dropped legacy cards pointing at unknown sets");
            }
        }
    }

    state.normalize();
    Ok(Some(state))
}
