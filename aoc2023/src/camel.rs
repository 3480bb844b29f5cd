//! Camel cards: poker-like hands ranked by kind, then card by card.

use arrayvec::ArrayVec;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandError {
    #[error("expected 5 cards, got {0}")]
    CardCount(usize),
    #[error("unknown card {0:?}")]
    UnknownCard(char),
}

/// Declared weakest first so that the derived `Ord` ranks hands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    FullHouse,
    FourOfAKind,
    FiveOfAKind,
}

/// Strength of a joker when `J` is wild; below every other card.
const JOKER: u8 = 1;

impl Kind {
    /// Jokers join whichever card is most common, which always yields the
    /// strongest kind reachable.
    fn of(cards: &[u8; 5]) -> Kind {
        let jokers = cards.iter().filter(|&&card| card == JOKER).count();
        let mut counts = cards.iter()
            .filter(|&&card| card != JOKER)
            .counts()
            .into_values()
            .sorted_unstable_by(|a, b| b.cmp(a))
            .collect::<ArrayVec<usize, 5>>();
        match counts.first_mut() {
            Some(most) => *most += jokers,
            None => counts.push(jokers),
        }
        match counts[..] {
            [5] => Kind::FiveOfAKind,
            [4, 1] => Kind::FourOfAKind,
            [3, 2] => Kind::FullHouse,
            [3, 1, 1] => Kind::ThreeOfAKind,
            [2, 2, 1] => Kind::TwoPair,
            [2, 1, 1, 1] => Kind::OnePair,
            _ => Kind::HighCard,
        }
    }
}

fn strength(card: char, jokers: bool) -> Result<u8, HandError> {
    Ok(match card {
        '2' ..= '9' => card as u8 - b'0',
        'T' => 10,
        'J' if jokers => JOKER,
        'J' => 11,
        'Q' => 12,
        'K' => 13,
        'A' => 14,
        _ => return Err(HandError::UnknownCard(card))
    })
}

/// Field order matters: the derived `Ord` compares kind first, then cards.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hand {
    pub kind: Kind,
    cards: [u8; 5],
    pub bid: u64,
}

impl Hand {
    pub fn new(cards: &str, bid: u64, jokers: bool) -> Result<Hand, HandError> {
        let count = cards.chars().count();
        let mut strengths = ArrayVec::<u8, 5>::new();
        for card in cards.chars() {
            strengths.try_push(strength(card, jokers)?).map_err(|_| HandError::CardCount(count))?;
        }
        let cards = strengths.into_inner().map_err(|short| HandError::CardCount(short.len()))?;
        Ok(Hand {kind: Kind::of(&cards), cards, bid})
    }
}

/// Sum of `bid * rank` with the weakest hand at rank 1.
pub fn winnings(mut hands: Vec<Hand>) -> u64 {
    hands.sort_unstable();
    hands.iter().zip(1 ..).map(|(hand, rank)| hand.bid * rank).sum()
}
