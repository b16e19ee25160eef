use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub type SetId = String;
pub type CardId = String;

/// Id of the set that always exists and can never be deleted.
pub const DEFAULT_SET_ID: &str = "default";
pub const DEFAULT_SET_NAME: &str = "Default";

/// Current time at the precision the storage format keeps (milliseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, fields: NewCard) -> Self {
        Self {
            id: id.into(),
            chinese: fields.chinese,
            pinyin: fields.pinyin,
            english: fields.english,
            created_at: now(),
        }
    }

    /// Merge the populated fields of `patch`; id and creation time never change.
    pub fn apply(&mut self, patch: CardPatch) {
        if let Some(c) = patch.chinese {
            self.chinese = c;
        }
        if let Some(p) = patch.pinyin {
            self.pinyin = p;
        }
        if let Some(e) = patch.english {
            self.english = e;
        }
    }
}

/// Caller-supplied fields of a card about to be created.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCard {
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
}

impl NewCard {
    pub fn new(
        chinese: impl Into<String>,
        pinyin: impl Into<String>,
        english: impl Into<String>,
    ) -> Self {
        Self {
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            english: english.into(),
        }
    }
}

/// Partial update for a card. `None` leaves the field as it is.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardPatch {
    pub chinese: Option<String>,
    pub pinyin: Option<String>,
    pub english: Option<String>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.chinese.is_none() && self.pinyin.is_none() && self.english.is_none()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: SetId,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub cards: Vec<Card>,
}

impl CardSet {
    pub fn new(id: impl Into<SetId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now(),
            cards: Vec::new(),
        }
    }

    pub fn default_set() -> Self {
        Self::new(DEFAULT_SET_ID, DEFAULT_SET_NAME)
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_SET_ID
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }
}

fn default_selected() -> SetId {
    DEFAULT_SET_ID.to_string()
}

/// Everything that is persisted under the canonical storage key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryState {
    pub sets: Vec<CardSet>,
    #[serde(default = "default_selected")]
    pub selected_set_id: SetId,
}

impl Default for RepositoryState {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            selected_set_id: default_selected(),
        }
    }
}

impl RepositoryState {
    pub fn find_set(&self, id: &str) -> Option<&CardSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn find_set_mut(&mut self, id: &str) -> Option<&mut CardSet> {
        self.sets.iter_mut().find(|s| s.id == id)
    }

    pub fn contains_set(&self, id: &str) -> bool {
        self.find_set(id).is_some()
    }

    /// Re-establish the default-set and selection invariants on freshly loaded data.
    /// Returns true when anything had to change.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        if !self.contains_set(DEFAULT_SET_ID) {
            self.sets.insert(0, CardSet::default_set());
            changed = true;
        }
        if !self.contains_set(&self.selected_set_id) {
            self.selected_set_id = default_selected();
            changed = true;
        }
        changed
    }
}
