//! Card representation for heads-up hold'em.
//!
//! This module provides the fundamental card types:
//! - `Card`: A single playing card with rank and suit
//! - `HoleCards`: A player's two private cards
//! - `Board`: Community cards (0-5 cards)
//! - `Deck`: A deck of 52 cards dealt without replacement
//!
//! Cards are written as `<rank><suit>` with ranks `2`..`10`, `J`, `Q`, `K`,
//! `A` and suit glyphs `♣ ♦ ♥ ♠`, e.g. `10♠` or `A♦`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PokerError, Result};

// Rank values (2-14).
/// Deuce.
pub const RANK_2: u8 = 2;
/// Three.
pub const RANK_3: u8 = 3;
/// Four.
pub const RANK_4: u8 = 4;
/// Five.
pub const RANK_5: u8 = 5;
/// Six.
pub const RANK_6: u8 = 6;
/// Seven.
pub const RANK_7: u8 = 7;
/// Eight.
pub const RANK_8: u8 = 8;
/// Nine.
pub const RANK_9: u8 = 9;
/// Ten.
pub const RANK_10: u8 = 10;
/// Jack.
pub const RANK_J: u8 = 11;
/// Queen.
pub const RANK_Q: u8 = 12;
/// King.
pub const RANK_K: u8 = 13;
/// Ace.
pub const RANK_A: u8 = 14;

// Suit values (0-3).
/// Clubs (♣).
pub const SUIT_CLUBS: u8 = 0;
/// Diamonds (♦).
pub const SUIT_DIAMONDS: u8 = 1;
/// Hearts (♥).
pub const SUIT_HEARTS: u8 = 2;
/// Spades (♠).
pub const SUIT_SPADES: u8 = 3;

/// Suit glyphs for display, indexed by suit.
const SUIT_GLYPHS: [char; 4] = ['♣', '♦', '♥', '♠'];

/// A single playing card.
///
/// Ordered by rank, then suit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    rank: u8,
    suit: u8,
}

impl Card {
    /// Create a card from rank (2-14) and suit (0-3), rejecting anything
    /// outside those ranges.
    pub fn try_new(rank: u8, suit: u8) -> Result<Self> {
        if (RANK_2..=RANK_A).contains(&rank) && suit < 4 {
            Ok(Self { rank, suit })
        } else {
            Err(PokerError::MalformedCardToken(format!("rank {} suit {}", rank, suit)))
        }
    }

    #[inline]
    pub(crate) const fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank >= RANK_2 && rank <= RANK_A, "rank must be 2-14");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { rank, suit }
    }

    #[inline]
    pub(crate) fn from_id(id: u8) -> Self {
        debug_assert!(id < 52, "card id must be 0-51");
        Self::new(id / 4 + RANK_2, id % 4)
    }

    /// Dense ID (0-51): `(rank - 2) * 4 + suit`.
    #[inline]
    pub fn id(&self) -> u8 {
        (self.rank - RANK_2) * 4 + self.suit
    }

    /// Rank (2-14, 14 = ace).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Suit (0-3: ♣ ♦ ♥ ♠).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.suit
    }

    /// Rank symbol for display.
    pub fn rank_symbol(&self) -> &'static str {
        match self.rank {
            RANK_J => "J",
            RANK_Q => "Q",
            RANK_K => "K",
            RANK_A => "A",
            r => ["2", "3", "4", "5", "6", "7", "8", "9", "10"][(r - RANK_2) as usize],
        }
    }

    /// Suit glyph for display.
    pub fn suit_glyph(&self) -> char {
        SUIT_GLYPHS[self.suit as usize]
    }
}

impl FromStr for Card {
    type Err = PokerError;

    /// Parse a card token such as `"A♠"` or `"10♦"`.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || PokerError::MalformedCardToken(s.to_string());

        let glyph = s.chars().last().ok_or_else(malformed)?;
        let suit = SUIT_GLYPHS
            .iter()
            .position(|&g| g == glyph)
            .ok_or_else(malformed)? as u8;

        let rank = match &s[..s.len() - glyph.len_utf8()] {
            "J" => RANK_J,
            "Q" => RANK_Q,
            "K" => RANK_K,
            "A" => RANK_A,
            digits => match digits.parse::<u8>() {
                Ok(r) if (RANK_2..=RANK_10).contains(&r) && !digits.starts_with('0') => r,
                _ => return Err(malformed()),
            },
        };

        Ok(Self::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = PokerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_symbol(), self.suit_glyph())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Parse whitespace-separated card tokens, e.g. `"A♠ K♦ 10♥"`.
pub fn parse_cards(s: &str) -> Result<Vec<Card>> {
    s.split_whitespace().map(str::parse).collect()
}

/// A player's two hole cards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HoleCards {
    /// Higher card.
    pub card1: Card,
    /// Lower card.
    pub card2: Card,
}

impl HoleCards {
    /// Create hole cards, ordering high card first.
    pub fn new(card1: Card, card2: Card) -> Self {
        if card1 >= card2 {
            Self { card1, card2 }
        } else {
            Self {
                card1: card2,
                card2: card1,
            }
        }
    }

    /// Parse hole cards from a string like `"A♥ K♠"`.
    pub fn parse(s: &str) -> Result<Self> {
        match parse_cards(s)?.as_slice() {
            [a, b] => Ok(Self::new(*a, *b)),
            _ => Err(PokerError::MalformedCardToken(s.to_string())),
        }
    }

    /// Check if hole cards are suited.
    pub fn is_suited(&self) -> bool {
        self.card1.suit() == self.card2.suit()
    }

    /// Check if hole cards are a pair.
    pub fn is_pair(&self) -> bool {
        self.card1.rank() == self.card2.rank()
    }

    /// Both ranks, high first. Used as the showdown kicker.
    pub fn ranks(&self) -> [u8; 2] {
        [self.card1.rank(), self.card2.rank()]
    }

    /// Get both cards as an array.
    pub fn cards(&self) -> [Card; 2] {
        [self.card1, self.card2]
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.card1, self.card2)
    }
}

impl fmt::Debug for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Community cards on the board, stored inline.
#[derive(Clone, Copy)]
pub struct Board {
    cards: [Card; 5],
    len: u8,
}

impl Board {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            cards: [Card::new(RANK_2, SUIT_CLUBS); 5],
            len: 0,
        }
    }

    /// Create a board from up to five cards.
    pub fn from_cards(cards: &[Card]) -> Self {
        debug_assert!(cards.len() <= 5);
        let mut board = Self::new();
        for &card in cards {
            board.add(card);
        }
        board
    }

    /// Parse a board from a string like `"A♥ K♠ Q♦"`.
    pub fn parse(s: &str) -> Result<Self> {
        let cards = parse_cards(s)?;
        if cards.len() > 5 {
            return Err(PokerError::MalformedCardToken(s.to_string()));
        }
        Ok(Self::from_cards(&cards))
    }

    /// Get the number of cards on the board.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if board is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the cards on the board.
    pub fn cards(&self) -> &[Card] {
        &self.cards[..self.len as usize]
    }

    /// First `n` cards (the part visible on a given street).
    pub fn prefix(&self, n: usize) -> Self {
        Self::from_cards(&self.cards()[..n.min(self.len())])
    }

    /// Add a card to the board.
    pub fn add(&mut self, card: Card) {
        assert!(self.len < 5, "board already has five cards");
        self.cards[self.len as usize] = card;
        self.len += 1;
    }

    /// Check if the board contains a specific card.
    pub fn contains(&self, card: Card) -> bool {
        self.cards().contains(&card)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cards() == other.cards()
    }
}

impl Eq for Board {}

impl std::hash::Hash for Board {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cards().hash(state);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in self.cards() {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}

/// Betting round of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Street {
    /// Before any community card.
    Preflop,
    /// Three community cards.
    Flop,
    /// Four community cards.
    Turn,
    /// Five community cards.
    River,
}

impl Street {
    /// Get the next street, `None` after the river.
    pub fn next(&self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Number of board cards visible on this street.
    pub fn num_board_cards(&self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Street::Preflop => write!(f, "Preflop"),
            Street::Flop => write!(f, "Flop"),
            Street::Turn => write!(f, "Turn"),
            Street::River => write!(f, "River"),
        }
    }
}

/// A deck of 52 playing cards dealt without replacement.
#[derive(Clone)]
pub struct Deck {
    /// Cards in current order.
    cards: [Card; 52],
    /// Index of next card to deal.
    index: usize,
    /// Number of usable cards in the deck (52 minus dead cards).
    size: usize,
    /// Bitmask of dealt and dead cards.
    dealt_mask: u64,
}

impl Deck {
    /// Create a new deck in standard order.
    pub fn new() -> Self {
        let mut cards = [Card::from_id(0); 52];
        for (i, card) in cards.iter_mut().enumerate() {
            *card = Card::from_id(i as u8);
        }
        Self {
            cards,
            index: 0,
            size: 52,
            dealt_mask: 0,
        }
    }

    /// Create a shuffled deck.
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut deck = Self::new();
        deck.shuffle(rng);
        deck
    }

    /// Create a deck with specific cards removed.
    pub fn without(dead_cards: &[Card]) -> Self {
        let mut deck = Self::new();
        let mut write_idx = 0;
        for id in 0..52u8 {
            let card = Card::from_id(id);
            if dead_cards.contains(&card) {
                deck.dealt_mask |= 1u64 << id;
            } else {
                deck.cards[write_idx] = card;
                write_idx += 1;
            }
        }
        deck.size = write_idx;
        deck
    }

    /// Shuffle the remaining cards in the deck.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards[self.index..self.size].shuffle(rng);
    }

    /// Deal the next card from the deck.
    pub fn deal(&mut self) -> Result<Card> {
        if self.index >= self.size {
            return Err(PokerError::InsufficientCards {
                requested: 1,
                remaining: 0,
            });
        }
        let card = self.cards[self.index];
        self.index += 1;
        self.dealt_mask |= 1u64 << card.id();
        Ok(card)
    }

    /// Deal `n` cards, or none at all if fewer than `n` remain.
    pub fn deal_n(&mut self, n: usize) -> Result<Vec<Card>> {
        if n > self.remaining() {
            return Err(PokerError::InsufficientCards {
                requested: n,
                remaining: self.remaining(),
            });
        }
        (0..n).map(|_| self.deal()).collect()
    }

    /// Deal two hole cards.
    pub fn deal_hole(&mut self) -> Result<HoleCards> {
        let cards = self.deal_n(2)?;
        Ok(HoleCards::new(cards[0], cards[1]))
    }

    /// Get the number of remaining cards.
    pub fn remaining(&self) -> usize {
        self.size - self.index
    }

    /// Check if a card has been dealt or removed.
    pub fn is_dealt(&self, card: Card) -> bool {
        self.dealt_mask & (1u64 << card.id()) != 0
    }

    /// Get remaining cards as a slice.
    pub fn remaining_cards(&self) -> &[Card] {
        &self.cards[self.index..self.size]
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} remaining)", self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_card_creation() {
        let ace_spades = Card::new(RANK_A, SUIT_SPADES);
        assert_eq!(ace_spades.rank(), RANK_A);
        assert_eq!(ace_spades.suit(), SUIT_SPADES);
        assert_eq!(ace_spades.to_string(), "A♠");

        let ten_hearts = Card::new(RANK_10, SUIT_HEARTS);
        assert_eq!(ten_hearts.to_string(), "10♥");

        for id in 0..52 {
            assert_eq!(Card::from_id(id).id(), id);
        }

        assert_eq!(Card::try_new(RANK_A, SUIT_SPADES).unwrap(), ace_spades);
        assert!(Card::try_new(1, SUIT_CLUBS).is_err());
        assert!(Card::try_new(15, SUIT_CLUBS).is_err());
        assert!(Card::try_new(RANK_2, 4).is_err());
    }

    #[test]
    fn test_card_parsing() {
        for token in ["A♠", "K♥", "2♣", "10♦", "J♠", "Q♣"] {
            assert_eq!(card(token).to_string(), token);
        }
        assert_eq!(card("10♦").rank(), RANK_10);
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["", "A", "♠", "As", "1♠", "11♠", "010♠", "T♠", "Z♥", "A♠♠", "a♠"] {
            assert_eq!(
                token.parse::<Card>(),
                Err(PokerError::MalformedCardToken(token.to_string())),
                "{:?} should be rejected",
                token
            );
        }
        assert!(parse_cards("A♠ X♥").is_err());
    }

    #[test]
    fn test_card_ordering() {
        assert!(card("A♣") > card("K♠"));
        assert!(card("K♠") > card("K♥"));
        assert!(card("2♦") > card("2♣"));
    }

    #[test]
    fn test_card_serde_uses_tokens() {
        let json = serde_json::to_string(&card("Q♦")).unwrap();
        assert_eq!(json, "\"Q♦\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card("Q♦"));
        assert!(serde_json::from_str::<Card>("\"Qd\"").is_err());
    }

    #[test]
    fn test_hole_cards() {
        let hc = HoleCards::parse("K♠ A♥").unwrap();
        assert_eq!(hc.card1, card("A♥"));
        assert_eq!(hc.ranks(), [RANK_A, RANK_K]);
        assert!(!hc.is_suited());
        assert!(!hc.is_pair());

        assert!(HoleCards::parse("A♠ K♠").unwrap().is_suited());
        assert!(HoleCards::parse("A♥ A♠").unwrap().is_pair());
        assert!(HoleCards::parse("A♥").is_err());
    }

    #[test]
    fn test_board() {
        let mut board = Board::new();
        assert!(board.is_empty());

        board = Board::parse("A♥ K♠ Q♦").unwrap();
        assert_eq!(board.len(), 3);
        board.add(card("J♣"));
        board.add(card("10♣"));
        assert_eq!(board.len(), 5);
        assert!(board.contains(card("J♣")));
        assert_eq!(board.prefix(3), Board::parse("A♥ K♠ Q♦").unwrap());
        assert_eq!(board.to_string(), "A♥K♠Q♦J♣10♣");
        assert!(Board::parse("A♥ K♠ Q♦ J♣ 10♣ 9♣").is_err());
    }

    #[test]
    fn test_deck_deals_without_replacement() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.remaining(), 52);

        let mut seen = HashSet::new();
        for _ in 0..52 {
            let c = deck.deal().unwrap();
            assert!(deck.is_dealt(c));
            assert!(seen.insert(c), "{} dealt twice", c);
        }
        assert_eq!(deck.remaining(), 0);
        assert_eq!(
            deck.deal(),
            Err(PokerError::InsufficientCards {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_deal_n_is_all_or_nothing() {
        let mut deck = Deck::new();
        deck.deal_n(50).unwrap();
        assert_eq!(
            deck.deal_n(3),
            Err(PokerError::InsufficientCards {
                requested: 3,
                remaining: 2
            })
        );
        assert_eq!(deck.remaining(), 2);
        assert_eq!(deck.deal_n(2).unwrap().len(), 2);
    }

    #[test]
    fn test_deck_without() {
        let dead = parse_cards("A♠ A♥").unwrap();
        let deck = Deck::without(&dead);
        assert_eq!(deck.remaining(), 50);
        assert!(deck.is_dealt(dead[0]));
        assert!(!deck.remaining_cards().contains(&dead[1]));
    }

    #[test]
    fn test_street_progression() {
        assert_eq!(Street::Preflop.next(), Some(Street::Flop));
        assert_eq!(Street::Flop.next(), Some(Street::Turn));
        assert_eq!(Street::Turn.next(), Some(Street::River));
        assert_eq!(Street::River.next(), None);
        assert_eq!(Street::Turn.num_board_cards(), 4);
    }
}
