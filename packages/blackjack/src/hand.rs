use crate::card::Rank;
use crate::error::BlackjackError;
use crate::{Card, Shoe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Win,
    Loss,
    Push,
    Bust,
    Blackjack,
}

/// Effective value of every card: aces start at 11 and are demoted to 1,
/// first ace first, while the total is over 21.
pub fn effective_values(cards: &[Card]) -> Vec<u8> {
    let mut values: Vec<u8> = cards.iter().map(Card::value).collect();
    let mut total: u32 = values.iter().map(|v| *v as u32).sum();

    for (value, card) in values.iter_mut().zip(cards) {
        if total <= 21 {
            break;
        }
        if card.rank.is_ace() {
            *value = 1;
            total -= 10;
        }
    }

    values
}

/// Calculate the value of a blackjack hand
pub fn calculate_hand_value(cards: &[Card]) -> u8 {
    effective_values(cards).iter().sum()
}

/// Check if a hand is soft (has an ace counted as 11)
pub fn is_soft_hand(cards: &[Card]) -> bool {
    effective_values(cards)
        .iter()
        .zip(cards)
        .any(|(value, card)| card.rank.is_ace() && *value == 11)
}

pub fn is_busted(cards: &[Card]) -> bool {
    calculate_hand_value(cards) > 21
}

/// Check if a hand is blackjack (21 with 2 cards)
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && calculate_hand_value(cards) == 21
}

/// Check if two cards can be split (same rank)
pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card1.rank == card2.rank
}

/// Cards held by one party. The score and the per-card ace overlay are
/// rebuilt from the whole card list on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
    values: Vec<u8>,
    score: u8,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self {
            cards,
            ..Self::default()
        };
        hand.rescore();
        hand
    }

    /// Takes the next card from the shoe. On an empty shoe the hand is left
    /// untouched and the error is handed back to the caller.
    pub fn draw(&mut self, shoe: &mut Shoe) -> Result<Card, BlackjackError> {
        let card = shoe.deal()?;
        self.add_card(card);
        Ok(card)
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.rescore();
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.values.clear();
        self.score = 0;
    }

    fn rescore(&mut self) {
        self.values = effective_values(&self.cards);
        self.score = self.values.iter().sum();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Per-card values after ace demotion, parallel to [`Hand::cards`].
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn ranks(&self) -> Vec<Rank> {
        self.cards.iter().map(|c| c.rank).collect()
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_soft(&self) -> bool {
        self.values
            .iter()
            .zip(&self.cards)
            .any(|(value, card)| card.rank.is_ace() && *value == 11)
    }

    pub fn is_bust(&self) -> bool {
        self.score > 21
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.score == 21
    }

    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }

    /// Empties the hand and returns its cards in order.
    pub fn take_cards(&mut self) -> Vec<Card> {
        let cards = std::mem::take(&mut self.cards);
        self.clear();
        cards
    }
}
