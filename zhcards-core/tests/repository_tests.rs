use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use zhcards_core::{
    CardPatch, CardRepository, KeyValueStore, MemoryStore, NewCard, StorageCodec,
    DEFAULT_SET_ID, LEGACY_CARDS_KEY, STORAGE_KEY,
};

fn open(store: &Arc<MemoryStore>) -> CardRepository {
    CardRepository::open(StorageCodec::new(store.clone()))
}

fn ids(cards: &[zhcards_core::Card]) -> Vec<String> {
    cards.iter().map(|c| c.id.clone()).collect()
}

#[test]
fn mutations_survive_reopen() {
    let store = Arc::new(MemoryStore::new());
    let set_id = {
        let mut r = open(&store);
        let id = r.add_set("HSK 1");
        r.add_card(&id, NewCard::new("我", "wǒ", "I"));
        r.add_card(&id, NewCard::new("你", "nǐ", "you"));
        r.set_selected_set_id(&id);
        id
    };

    let r = open(&store);
    assert_eq!(r.selected_set_id(), set_id);
    let cards = r.cards_by_set(&set_id);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].chinese, "我");
    assert_eq!(cards[1].english, "you");
}

#[test]
fn cascading_delete() {
    let store = Arc::new(MemoryStore::new());
    let mut r = open(&store);
    let x = r.add_set("S");
    r.add_card(&x, NewCard::new("猫", "māo", "cat"));
    r.delete_set(&x);

    assert!(r.cards_by_set(&x).is_empty());
    assert!(r.card_sets().iter().all(|s| s.id != x));
    assert!(open(&store).find_set(&x).is_none());
}

#[test]
fn unknown_ids_are_no_ops() {
    let store = Arc::new(MemoryStore::new());
    let mut r = open(&store);
    let s = r.add_set("Food");
    r.add_card(&s, NewCard::new("饭", "fàn", "meal"));
    let before = r.state().clone();
    let blob = store.get(STORAGE_KEY).unwrap();

    r.update_card(
        "missing-set",
        "missing-card",
        CardPatch {
            chinese: Some("x".into()),
            ..Default::default()
        },
    );
    r.update_card(&s, "missing-card", CardPatch::default());
    r.update_set("missing-set", "renamed");
    r.delete_set("missing-set");
    r.delete_card(&s, "missing-card");
    r.delete_card("missing-set", "missing-card");
    r.add_card("missing-set", NewCard::new("a", "b", "c"));
    r.reorder_cards("missing-set", &[]);

    assert_eq!(r.state(), &before);
    assert_eq!(store.get(STORAGE_KEY).unwrap(), blob);
}

#[test]
fn reorder_with_full_permutation() {
    let store = Arc::new(MemoryStore::new());
    let mut r = open(&store);
    for w in ["一", "二", "三", "四"] {
        r.add_card(DEFAULT_SET_ID, NewCard::new(w, "", ""));
    }
    let mut wanted = ids(&r.cards_by_set(DEFAULT_SET_ID));
    wanted.reverse();
    wanted.swap(0, 2);

    r.reorder_cards(DEFAULT_SET_ID, &wanted);
    assert_eq!(ids(&r.cards_by_set(DEFAULT_SET_ID)), wanted);
    assert_eq!(ids(&open(&store).cards_by_set(DEFAULT_SET_ID)), wanted);
}

#[test]
fn lenient_reorder_drops_unlisted_cards() {
    let store = Arc::new(MemoryStore::new());
    let mut r = open(&store);
    for w in ["一", "二", "三"] {
        r.add_card(DEFAULT_SET_ID, NewCard::new(w, "", ""));
    }
    let current = ids(&r.cards_by_set(DEFAULT_SET_ID));

    r.reorder_cards(DEFAULT_SET_ID, &[current[2].clone(), "ghost".to_string()]);
    assert_eq!(ids(&r.cards_by_set(DEFAULT_SET_ID)), vec![current[2].clone()]);
}

#[test]
fn reorder_keeps_legacy_cards_with_repeated_ids() {
    let legacy = r#"[
        {"id":"c1","chinese":"一","pinyin":"yī","english":"one","createdAt":1710000000000},
        {"id":"c1","chinese":"二","pinyin":"èr","english":"two","createdAt":1710000000001}
    ]"#;
    let store = Arc::new(MemoryStore::with_entries([(LEGACY_CARDS_KEY, legacy)]));
    let mut r = open(&store);
    let full = ids(&r.cards_by_set(DEFAULT_SET_ID));
    assert_eq!(full.len(), 2);

    r.reorder_cards(DEFAULT_SET_ID, &full);
    let words: Vec<_> = r.cards_by_set(DEFAULT_SET_ID).into_iter().map(|c| c.chinese).collect();
    assert_eq!(words, vec!["一", "二"]);

    assert!(r.try_reorder_cards(DEFAULT_SET_ID, &full[..1]).is_err());
    r.try_reorder_cards(DEFAULT_SET_ID, &full).unwrap();
    assert_eq!(r.cards_by_set(DEFAULT_SET_ID).len(), 2);
    assert_eq!(open(&store).cards_by_set(DEFAULT_SET_ID).len(), 2);
}

#[test]
fn random_order_is_a_permutation_and_leaves_storage_alone() {
    let store = Arc::new(MemoryStore::new());
    let mut r = open(&store);
    for i in 0..12 {
        r.add_card(DEFAULT_SET_ID, NewCard::new(format!("字{i}"), "", ""));
    }
    let before = r.cards_by_set(DEFAULT_SET_ID);
    let blob = store.get(STORAGE_KEY).unwrap();

    let shuffled = r.random_order_with(DEFAULT_SET_ID, &mut Pcg32::seed_from_u64(11));
    let mut a = ids(&shuffled);
    let mut b = ids(&before);
    a.sort();
    b.sort();
    assert_eq!(a, b);

    let _ = r.random_order(DEFAULT_SET_ID);
    assert_eq!(r.cards_by_set(DEFAULT_SET_ID), before);
    assert_eq!(store.get(STORAGE_KEY).unwrap(), blob);
    assert!(r.random_order("missing").is_empty());
}

#[test]
fn legacy_flat_blob_becomes_default_set() {
    let legacy = r#"[{"id":"c1","chinese":"好","pinyin":"hǎo","english":"good","createdAt":1710000000000}]"#;
    let store = Arc::new(MemoryStore::with_entries([(LEGACY_CARDS_KEY, legacy)]));

    let r = open(&store);
    assert_eq!(r.card_sets().len(), 1);
    assert_eq!(r.card_sets()[0].id, DEFAULT_SET_ID);
    assert_eq!(ids(&r.cards_by_set(DEFAULT_SET_ID)), vec!["c1".to_string()]);
    assert!(!store.contains_key(LEGACY_CARDS_KEY));

    let again = open(&store);
    assert_eq!(again.state(), r.state());
}

#[test]
fn corrupt_blob_still_opens() {
    let store = Arc::new(MemoryStore::with_entries([(STORAGE_KEY, "{{{")]));
    let mut r = open(&store);
    assert_eq!(r.card_sets().len(), 1);
    r.add_set("Recovered");
    assert_eq!(open(&store).card_sets().len(), 2);
}

#[test]
fn stale_selection_resets_on_load() {
    let blob = r#"{"sets":[{"id":"default","name":"Default","createdAt":1,"cards":[]}],"selectedSetId":"deleted-elsewhere"}"#;
    let store = Arc::new(MemoryStore::with_entries([(STORAGE_KEY, blob)]));
    assert_eq!(open(&store).selected_set_id(), DEFAULT_SET_ID);
}

#[test]
fn detached_repository_works_in_memory() {
    let mut r = CardRepository::open(StorageCodec::detached());
    let s = r.add_set("Scratch");
    r.add_card(&s, NewCard::new("试", "shì", "try"));
    assert_eq!(r.cards_by_set(&s).len(), 1);
}
