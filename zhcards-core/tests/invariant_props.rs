use std::sync::Arc;

use proptest::prelude::*;
use zhcards_core::{
    CardPatch, CardRepository, MemoryStore, NewCard, SequentialIds, StorageCodec, DEFAULT_SET_ID,
    STORAGE_KEY,
};

#[derive(Clone, Debug)]
enum Op {
    AddSet(String),
    RenameSet(usize, String),
    DeleteSet(usize),
    DeleteDefault,
    Select(usize),
    AddCard(usize, String),
    DeleteCard(usize, usize),
    UpdateCard(usize, usize, String),
    Reverse(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(Op::AddSet),
        (0..6usize, "[a-z]{1,6}").prop_map(|(i, n)| Op::RenameSet(i, n)),
        (0..6usize).prop_map(Op::DeleteSet),
        Just(Op::DeleteDefault),
        (0..6usize).prop_map(Op::Select),
        (0..6usize, "[a-z]{1,4}").prop_map(|(i, w)| Op::AddCard(i, w)),
        (0..6usize, 0..6usize).prop_map(|(i, j)| Op::DeleteCard(i, j)),
        (0..6usize, 0..6usize, "[a-z]{1,4}").prop_map(|(i, j, w)| Op::UpdateCard(i, j, w)),
        (0..6usize).prop_map(Op::Reverse),
    ]
}

fn set_at(r: &CardRepository, i: usize) -> String {
    let sets = r.card_sets();
    sets[i % sets.len()].id.clone()
}

fn card_at(r: &CardRepository, set: &str, j: usize) -> String {
    let cards = r.cards_by_set(set);
    if cards.is_empty() {
        "none".to_string()
    } else {
        cards[j % cards.len()].id.clone()
    }
}

fn apply(r: &mut CardRepository, op: &Op) {
    match op {
        Op::AddSet(n) => {
            r.add_set(n);
        }
        Op::RenameSet(i, n) => {
            let s = set_at(r, *i);
            r.update_set(&s, n);
        }
        Op::DeleteSet(i) => {
            let s = set_at(r, *i);
            r.delete_set(&s);
        }
        Op::DeleteDefault => r.delete_set(DEFAULT_SET_ID),
        Op::Select(i) => {
            let s = set_at(r, *i);
            r.set_selected_set_id(&s);
        }
        Op::AddCard(i, w) => {
            let s = set_at(r, *i);
            r.add_card(&s, NewCard::new(w.as_str(), "", ""));
        }
        Op::DeleteCard(i, j) => {
            let s = set_at(r, *i);
            let c = card_at(r, &s, *j);
            r.delete_card(&s, &c);
        }
        Op::UpdateCard(i, j, w) => {
            let s = set_at(r, *i);
            let c = card_at(r, &s, *j);
            r.update_card(
                &s,
                &c,
                CardPatch {
                    english: Some(w.clone()),
                    ..Default::default()
                },
            );
        }
        Op::Reverse(i) => {
            let s = set_at(r, *i);
            let mut ids: Vec<String> = r.cards_by_set(&s).into_iter().map(|c| c.id).collect();
            ids.reverse();
            r.reorder_cards(&s, &ids);
        }
    }
}

proptest! {
    #[test]
    fn default_set_and_selection_hold(ops in prop::collection::vec(op(), 0..40)) {
        let store = Arc::new(MemoryStore::new());
        let codec = StorageCodec::new(store.clone());
        let mut r = CardRepository::open_with(codec.clone(), Box::new(SequentialIds::new("p")));

        for op in &ops {
            let total_cards: usize = r.card_sets().iter().map(|s| s.cards.len()).sum();
            apply(&mut r, op);

            prop_assert!(r.find_set(DEFAULT_SET_ID).is_some());
            prop_assert!(r.find_set(r.selected_set_id()).is_some());
            if let Op::Reverse(_) = op {
                let after: usize = r.card_sets().iter().map(|s| s.cards.len()).sum();
                prop_assert_eq!(after, total_cards);
            }
        }

        if store.contains_key(STORAGE_KEY) {
            prop_assert_eq!(&codec.load(), r.state());
        }
    }
}
