//! The card/set repository: sole owner and writer of the card collection.
//!
//! Every mutating call writes the whole state back through the
//! [`StorageCodec`] before returning. Calls that name a set or card that does
//! not exist are silent no-ops and write nothing; UI call sites only pass ids
//! they read from the repository itself.

use crate::{
    order, Card, CardPatch, CardSet, CoreError, IdGenerator, NewCard, RepositoryState,
    StorageCodec, UuidGenerator, DEFAULT_SET_ID,
};
use rand::Rng;
use tracing::warn;

pub struct CardRepository {
    state: RepositoryState,
    codec: StorageCodec,
    ids: Box<dyn IdGenerator>,
}

impl CardRepository {
    /// Load (and migrate, if needed) persisted state.
    pub fn open(codec: StorageCodec) -> Self {
        Self::open_with(codec, Box::new(UuidGenerator))
    }

    pub fn open_with(codec: StorageCodec, ids: Box<dyn IdGenerator>) -> Self {
        let mut state = codec.load();
        state.normalize();
        Self { state, codec, ids }
    }

    pub fn state(&self) -> &RepositoryState {
        &self.state
    }

    pub fn card_sets(&self) -> &[CardSet] {
        &self.state.sets
    }

    pub fn selected_set_id(&self) -> &str {
        &self.state.selected_set_id
    }

    pub fn find_set(&self, id: &str) -> Option<&CardSet> {
        self.state.find_set(id)
    }

    fn persist(&self) {
        self.codec.save(&self.state);
    }

    // ===== Sets =====

    pub fn add_set(&mut self, name: &str) -> String {
        let set = CardSet::new(self.ids.generate_id(), name);
        let id = set.id.clone();
        self.state.sets.push(set);
        self.persist();
        id
    }

    pub fn update_set(&mut self, id: &str, name: &str) {
        let Some(set) = self.state.find_set_mut(id) else {
            return;
        };
        set.name = name.to_string();
        self.persist();
    }

    /// Removes the set with its cards. The default set is never removed.
    pub fn delete_set(&mut self, id: &str) {
        if id == DEFAULT_SET_ID {
            return;
        }
        let before = self.state.sets.len();
        self.state.sets.retain(|s| s.id != id);
        if self.state.sets.len() == before {
            return;
        }
        if self.state.selected_set_id == id {
            self.state.selected_set_id = DEFAULT_SET_ID.to_string();
        }
        self.persist();
    }

    /// Not validated; callers pass ids read from [`Self::card_sets`].
    pub fn set_selected_set_id(&mut self, id: &str) {
        self.state.selected_set_id = id.to_string();
        self.persist();
    }

    /// Append a set that came from outside (a share snapshot or an import file).
    /// The set and its cards get fresh ids; names, fields and timestamps are kept.
    pub fn import_set(&mut self, mut set: CardSet) -> String {
        set.id = self.ids.generate_id();
        for card in &mut set.cards {
            card.id = self.ids.generate_id();
        }
        let id = set.id.clone();
        self.state.sets.push(set);
        self.persist();
        id
    }

    /// The set as it is posted to the share-snapshot endpoint.
    pub fn share_payload(&self, set_id: &str) -> Option<serde_json::Value> {
        let set = self.state.find_set(set_id)?;
        serde_json::to_value(set).ok()
    }

    // ===== Cards =====

    /// Owned copy of the set's cards, empty if the set is unknown.
    pub fn cards_by_set(&self, set_id: &str) -> Vec<Card> {
        self.state
            .find_set(set_id)
            .map(|s| s.cards.clone())
            .unwrap_or_default()
    }

    pub fn add_card(&mut self, set_id: &str, fields: NewCard) {
        let id = self.ids.generate_id();
        let Some(set) = self.state.find_set_mut(set_id) else {
            return;
        };
        set.cards.push(Card::new(id, fields));
        self.persist();
    }

    pub fn delete_card(&mut self, set_id: &str, card_id: &str) {
        let Some(set) = self.state.find_set_mut(set_id) else {
            return;
        };
        let before = set.cards.len();
        set.cards.retain(|c| c.id != card_id);
        if set.cards.len() != before {
            self.persist();
        }
    }

    pub fn update_card(&mut self, set_id: &str, card_id: &str, patch: CardPatch) {
        let Some(card) = self
            .state
            .find_set_mut(set_id)
            .and_then(|s| s.cards.iter_mut().find(|c| c.id == card_id))
        else {
            return;
        };
        card.apply(patch);
        self.persist();
    }

    /// Replace the set's order with the cards named by `ordered_ids`.
    ///
    /// Cards missing from the list are removed from the set and ids that match
    /// no card are skipped. Pass the complete id list, or use
    /// [`Self::try_reorder_cards`] to reject partial lists.
    pub fn reorder_cards(&mut self, set_id: &str, ordered_ids: &[String]) {
        let Some(set) = self.state.find_set_mut(set_id) else {
            return;
        };
        let result = order::reorder(std::mem::take(&mut set.cards), ordered_ids);
        if !result.dropped.is_empty() {
            warn!(
                set_id,
                dropped = result.dropped.len(),
                "reorder list was incomplete, cards removed"
            );
        }
        set.cards = result.cards;
        self.persist();
    }

    /// Like [`Self::reorder_cards`] but refuses anything other than a
    /// permutation of the set's current card ids. State is unchanged on error.
    pub fn try_reorder_cards(&mut self, set_id: &str, ordered_ids: &[String]) -> Result<(), CoreError> {
        let set = self
            .state
            .find_set_mut(set_id)
            .ok_or(CoreError::NotFound("set"))?;
        let result = order::reorder(set.cards.clone(), ordered_ids);
        if !result.is_complete() {
            return Err(CoreError::IncompleteOrder {
                set_id: set_id.to_string(),
                missing: result.dropped.len(),
                unknown: result.unknown.len(),
            });
        }
        set.cards = result.cards;
        self.persist();
        Ok(())
    }

    /// Shuffled copy of the set's cards; stored order is untouched.
    pub fn random_order(&self, set_id: &str) -> Vec<Card> {
        self.random_order_with(set_id, &mut rand::rng())
    }

    pub fn random_order_with<R: Rng + ?Sized>(&self, set_id: &str, rng: &mut R) -> Vec<Card> {
        match self.state.find_set(set_id) {
            Some(set) => order::shuffle(&set.cards, rng),
            None => Vec::new(),
        }
    }
}
