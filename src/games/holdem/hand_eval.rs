//! Showdown hand evaluation.
//!
//! `HandEvaluator::evaluate` ranks any 5-7 cards into one of ten categories
//! plus a category-specific tie-break key. Two hands with the same value are
//! separated by the players' own hole cards (highest first, then second);
//! board kickers are never consulted, so two hands can tie where standard
//! rules would find a winner.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::card::{Card, HoleCards, RANK_A};

/// Hand categories, ordered from worst (1) to best (10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    /// No pair; the five highest cards.
    HighCard = 1,
    /// Two cards of one rank.
    OnePair = 2,
    /// Two different pairs.
    TwoPair = 3,
    /// Three cards of one rank.
    ThreeOfAKind = 4,
    /// Five consecutive ranks, ace high or ace low.
    Straight = 5,
    /// Five cards of one suit.
    Flush = 6,
    /// Three of a kind plus a pair.
    FullHouse = 7,
    /// Four cards of one rank.
    FourOfAKind = 8,
    /// A straight in one suit, below ace high.
    StraightFlush = 9,
    /// Ace-high straight flush.
    RoyalFlush = 10,
}

impl HandCategory {
    /// Ordinal 1..=10.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Get the category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category-specific tie-break key. Only keys of the same category are ever
/// compared with each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TieBreak {
    /// High card and royal flush.
    None,
    /// Straight top, quad rank, triple rank or pair rank.
    Rank(u8),
    /// Full house (triple, pair) or two pair (high, low).
    Pair(u8, u8),
    /// Flush ranks, descending.
    Ranks(Vec<u8>),
}

/// Category plus tie-break key. Ordered weakest to strongest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandValue {
    /// Hand category.
    pub category: HandCategory,
    /// Tie-break within the category.
    pub tie_break: TieBreak,
}

impl HandValue {
    fn new(category: HandCategory, tie_break: TieBreak) -> Self {
        Self {
            category,
            tie_break,
        }
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.category, self.tie_break)
    }
}

/// Result of comparing both players' hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownOutcome {
    /// Winning seat, `None` on an exact tie.
    pub winner: Option<usize>,
    /// Category of the winning hand (or of both hands on a tie).
    pub category: HandCategory,
    /// Each seat's hand value.
    pub values: [HandValue; 2],
}

/// Highest straight top in a rank bitmask, treating the ace as 1 as well.
fn straight_top(rank_bits: u16) -> Option<u8> {
    let bits = if rank_bits & (1 << RANK_A) != 0 {
        rank_bits | (1 << 1)
    } else {
        rank_bits
    };
    (5..=RANK_A).rev().find(|&top| {
        let mask = 0b1_1111u16 << (top - 4);
        bits & mask == mask
    })
}

/// Hand evaluator for showdowns.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandEvaluator;

impl HandEvaluator {
    /// Create a new hand evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a set of cards (normally 5-7).
    ///
    /// The result does not depend on the order of `cards`.
    pub fn evaluate(&self, cards: &[Card]) -> HandValue {
        let mut sorted = cards.to_vec();
        sorted.sort_unstable();

        let mut rank_counts = [0u8; 15];
        let mut rank_bits = 0u16;
        let mut suit_bits = [0u16; 4];
        for card in &sorted {
            rank_counts[card.rank() as usize] += 1;
            rank_bits |= 1 << card.rank();
            suit_bits[card.suit() as usize] |= 1 << card.rank();
        }

        let flush_suit = suit_bits.iter().position(|bits| bits.count_ones() >= 5);

        // Straight flush: a run of five inside one suit.
        let straight_flush = suit_bits.iter().filter_map(|&bits| straight_top(bits)).max();
        if let Some(top) = straight_flush {
            return if top == RANK_A {
                HandValue::new(HandCategory::RoyalFlush, TieBreak::None)
            } else {
                HandValue::new(HandCategory::StraightFlush, TieBreak::Rank(top))
            };
        }

        let highest_with = |min: u8, except: Option<u8>| {
            (2..=RANK_A)
                .rev()
                .find(|&r| rank_counts[r as usize] >= min && Some(r) != except)
        };

        if let Some(quad) = highest_with(4, None) {
            return HandValue::new(HandCategory::FourOfAKind, TieBreak::Rank(quad));
        }

        let triple = highest_with(3, None);
        if let Some(triple) = triple {
            if let Some(pair) = highest_with(2, Some(triple)) {
                return HandValue::new(HandCategory::FullHouse, TieBreak::Pair(triple, pair));
            }
        }

        if let Some(suit) = flush_suit {
            let ranks: Vec<u8> = sorted
                .iter()
                .rev()
                .filter(|c| c.suit() as usize == suit)
                .map(Card::rank)
                .take(5)
                .collect();
            return HandValue::new(HandCategory::Flush, TieBreak::Ranks(ranks));
        }

        if let Some(top) = straight_top(rank_bits) {
            return HandValue::new(HandCategory::Straight, TieBreak::Rank(top));
        }

        if let Some(triple) = triple {
            return HandValue::new(HandCategory::ThreeOfAKind, TieBreak::Rank(triple));
        }

        let mut pairs = (2..=RANK_A).rev().filter(|&r| rank_counts[r as usize] == 2);
        match (pairs.next(), pairs.next()) {
            (Some(high), Some(low)) => HandValue::new(HandCategory::TwoPair, TieBreak::Pair(high, low)),
            (Some(pair), None) => HandValue::new(HandCategory::OnePair, TieBreak::Rank(pair)),
            _ => HandValue::new(HandCategory::HighCard, TieBreak::None),
        }
    }

    /// Evaluate hole cards together with the board.
    pub fn evaluate_hand(&self, hole: &HoleCards, board: &[Card]) -> HandValue {
        let mut cards = Vec::with_capacity(2 + board.len());
        cards.extend_from_slice(&hole.cards());
        cards.extend_from_slice(board);
        self.evaluate(&cards)
    }

    /// Compare two players' hands on a shared board.
    ///
    /// Equal hand values fall back to the hole cards, highest first.
    pub fn compare(&self, hole_a: &HoleCards, hole_b: &HoleCards, board: &[Card]) -> Ordering {
        let a = self.evaluate_hand(hole_a, board);
        let b = self.evaluate_hand(hole_b, board);
        a.cmp(&b).then_with(|| hole_a.ranks().cmp(&hole_b.ranks()))
    }

    /// Decide a two-player showdown.
    pub fn showdown(&self, holes: &[HoleCards; 2], board: &[Card]) -> ShowdownOutcome {
        let values = [
            self.evaluate_hand(&holes[0], board),
            self.evaluate_hand(&holes[1], board),
        ];
        let order = values[0]
            .cmp(&values[1])
            .then_with(|| holes[0].ranks().cmp(&holes[1].ranks()));

        let winner = match order {
            Ordering::Greater => Some(0),
            Ordering::Less => Some(1),
            Ordering::Equal => None,
        };
        let category = values[winner.unwrap_or(0)].category;

        ShowdownOutcome {
            winner,
            category,
            values,
        }
    }
}
