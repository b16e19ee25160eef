use std::io::{self, BufRead, Write};
use zhcards_core::Card;

/// Walk through `cards` one at a time: show the Chinese side, wait for enter,
/// then reveal pinyin and English. `q` stops early. Returns how many cards
/// were revealed.
pub fn present<R: BufRead, W: Write>(cards: &[Card], max: usize, mut input: R, out: &mut W) -> io::Result<usize> {
    let total = cards.len().min(max);
    if total == 0 {
        writeln!(out, "no cards in this set")?;
        return Ok(0);
    }

    let mut shown = 0usize;
    for (i, card) in cards.iter().take(total).enumerate() {
        writeln!(out, "\n[{}/{}] {}", i + 1, total, card.chinese)?;
        write!(out, "[enter=show, q=quit] ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if matches!(line.trim().to_lowercase().as_str(), "q" | "quit") {
            break;
        }

        if !card.pinyin.is_empty() {
            writeln!(out, "{}", card.pinyin)?;
        }
        writeln!(out, "{}", card.english)?;
        shown += 1;
    }

    writeln!(out, "\nstudied {shown}")?;
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zhcards_core::NewCard;

    fn sample() -> Vec<Card> {
        vec![
            Card::new("1", NewCard::new("一", "yī", "one")),
            Card::new("2", NewCard::new("二", "èr", "two")),
            Card::new("3", NewCard::new("三", "", "three")),
        ]
    }

    #[test]
    fn reveals_every_card() {
        let mut out = Vec::new();
        let n = present(&sample(), 10, "\n\n\n".as_bytes(), &mut out).unwrap();
        assert_eq!(n, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[1/3] 一"));
        assert!(text.contains("èr"));
        assert!(text.contains("studied 3"));
    }

    #[test]
    fn quit_and_max_stop_early() {
        let mut out = Vec::new();
        assert_eq!(present(&sample(), 10, "\nq\n".as_bytes(), &mut out).unwrap(), 1);

        let mut out = Vec::new();
        assert_eq!(present(&sample(), 2, "\n\n\n".as_bytes(), &mut out).unwrap(), 2);
        assert!(String::from_utf8(out).unwrap().contains("[2/2]"));
    }

    #[test]
    fn end_of_input_stops() {
        let mut out = Vec::new();
        assert_eq!(present(&sample(), 10, "".as_bytes(), &mut out).unwrap(), 0);
    }

    #[test]
    fn empty_set() {
        let mut out = Vec::new();
        assert_eq!(present(&[], 10, "".as_bytes(), &mut out).unwrap(), 0);
        assert!(String::from_utf8(out).unwrap().contains("no cards"));
    }
}
