use crate::Card;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

/// Uniformly random permutation of `items`, returned as a new vector.
///
/// Fisher–Yates: walk from the last index down to 1 and swap each slot with a
/// partner drawn uniformly from `[0, i]`.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

pub struct Reordered {
    pub cards: Vec<Card>,
    /// Cards of the input that no id referenced.
    pub dropped: Vec<Card>,
    /// Ids that matched no card.
    pub unknown: Vec<String>,
}

impl Reordered {
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty() && self.unknown.is_empty()
    }
}

/// Arrange `cards` in the order given by `ordered_ids`.
///
/// Matching is positional: each id takes the first not-yet-taken card with
/// that id, so cards sharing an id are all reachable by repeating it. An id
/// with nothing left to take is counted as unknown.
pub fn reorder(cards: Vec<Card>, ordered_ids: &[String]) -> Reordered {
    let mut by_id: HashMap<String, VecDeque<Card>> = HashMap::with_capacity(cards.len());
    let mut original_order = Vec::with_capacity(cards.len());
    for c in cards {
        original_order.push(c.id.clone());
        by_id.entry(c.id.clone()).or_default().push_back(c);
    }

    let mut out = Vec::with_capacity(ordered_ids.len());
    let mut unknown = Vec::new();
    for id in ordered_ids {
        match by_id.get_mut(id).and_then(VecDeque::pop_front) {
            Some(c) => out.push(c),
            None => unknown.push(id.clone()),
        }
    }

    let dropped = original_order
        .into_iter()
        .filter_map(|id| by_id.get_mut(&id).and_then(VecDeque::pop_front))
        .collect();

    Reordered {
        cards: out,
        dropped,
        unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewCard;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn cards(ids: &[&str]) -> Vec<Card> {
        ids.iter()
            .map(|id| Card::new(*id, NewCard::new(*id, "", "")))
            .collect()
    }

    fn ids(cards: &[Card]) -> Vec<String> {
        cards.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn shuffle_keeps_source_intact() {
        let src: Vec<u32> = (0..20).collect();
        let mut rng = Pcg32::seed_from_u64(7);
        let out = shuffle(&src, &mut rng);

        assert_eq!(src, (0..20).collect::<Vec<_>>());
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(sorted, src);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let src: Vec<u32> = (0..10).collect();
        let a = shuffle(&src, &mut Pcg32::seed_from_u64(42));
        let b = shuffle(&src, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(shuffle::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&[9], &mut rng), vec![9]);
    }

    #[test]
    fn shuffle_reaches_every_permutation_of_three() {
        let src = [1, 2, 3];
        let mut rng = Pcg32::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(shuffle(&src, &mut rng));
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn reorder_full_permutation() {
        let r = reorder(cards(&["a", "b", "c"]), &["c".into(), "a".into(), "b".into()]);
        assert!(r.is_complete());
        assert_eq!(ids(&r.cards), vec!["c", "a", "b"]);
    }

    #[test]
    fn reorder_partial_list_drops_and_skips() {
        let r = reorder(cards(&["a", "b", "c"]), &["b".into(), "zz".into()]);
        assert_eq!(ids(&r.cards), vec!["b"]);
        assert_eq!(ids(&r.dropped), vec!["a", "c"]);
        assert_eq!(r.unknown, vec!["zz".to_string()]);
        assert!(!r.is_complete());
    }

    #[test]
    fn reorder_ignores_repeated_ids() {
        let r = reorder(cards(&["a", "b"]), &["b".into(), "b".into(), "a".into()]);
        assert_eq!(ids(&r.cards), vec!["b", "a"]);
        assert_eq!(r.unknown, vec!["b".to_string()]);
    }

    #[test]
    fn reorder_keeps_cards_sharing_an_id() {
        let mut input = cards(&["a", "a", "b"]);
        input[1].chinese = "second".into();

        let r = reorder(input, &["b".into(), "a".into(), "a".into()]);
        assert!(r.is_complete());
        assert_eq!(ids(&r.cards), vec!["b", "a", "a"]);
        assert_eq!(r.cards[1].chinese, "a");
        assert_eq!(r.cards[2].chinese, "second");
    }

    #[test]
    fn reorder_counts_unlisted_duplicates_as_dropped() {
        let mut input = cards(&["a", "a"]);
        input[1].chinese = "second".into();

        let r = reorder(input, &["a".into()]);
        assert_eq!(r.cards.len(), 1);
        assert_eq!(r.dropped.len(), 1);
        assert_eq!(r.dropped[0].chinese, "second");
        assert!(!r.is_complete());
    }
}
