use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::card::{Rank, Suit};
use crate::error::BlackjackError;
use crate::Card;

pub const CARDS_PER_DECK: usize = 52;

/// The pool of undealt cards, possibly spanning several decks.
///
/// Cards leave through [`Shoe::deal`] and never come back; the only way to
/// refill is to build a new shoe.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: VecDeque<Card>,
    num_decks: u8,
    rng: ChaCha8Rng,
}

impl Shoe {
    /// Builds `num_decks` standard decks, suit-major and rank-minor, unshuffled.
    pub fn new(num_decks: u8) -> Self {
        Self::build(num_decks, ChaCha8Rng::from_entropy())
    }

    /// Same as [`Shoe::new`] but every shuffle is reproducible from `seed`.
    pub fn with_seed(num_decks: u8, seed: u64) -> Self {
        Self::build(num_decks, ChaCha8Rng::seed_from_u64(seed))
    }

    /// A stacked shoe dealt front to back in the given order until shuffled.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let num_decks = u8::try_from(cards.len().div_ceil(CARDS_PER_DECK).max(1)).unwrap_or(u8::MAX);
        Self {
            cards: cards.into(),
            num_decks,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    fn build(num_decks: u8, rng: ChaCha8Rng) -> Self {
        let mut cards = VecDeque::with_capacity(num_decks as usize * CARDS_PER_DECK);
        for _ in 0..num_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push_back(Card::new(rank, suit));
                }
            }
        }
        Self {
            cards,
            num_decks,
            rng,
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.make_contiguous().shuffle(&mut self.rng);
    }

    pub fn deal(&mut self) -> Result<Card, BlackjackError> {
        self.cards.pop_front().ok_or(BlackjackError::EmptyShoe)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn num_decks(&self) -> u8 {
        self.num_decks
    }

    /// Whole decks left, rounded up and never below one.
    pub fn decks_remaining(&self) -> i32 {
        (self.cards.len().div_ceil(CARDS_PER_DECK) as i32).max(1)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_single_deck_deals_every_card_once() {
        let mut shoe = Shoe::new(1);
        let mut seen = HashSet::new();
        for _ in 0..52 {
            let card = shoe.deal().unwrap();
            assert!(seen.insert((card.rank, card.suit)), "duplicate {card}");
        }
        assert_eq!(seen.len(), 52);
        assert_eq!(shoe.deal(), Err(BlackjackError::EmptyShoe));
    }

    #[test]
    fn test_unshuffled_order_is_suit_major() {
        let mut shoe = Shoe::new(2);
        assert_eq!(shoe.len(), 104);
        assert_eq!(shoe.deal().unwrap(), Card::new(Rank::Two, Suit::Spades));
        assert_eq!(shoe.deal().unwrap(), Card::new(Rank::Three, Suit::Spades));
        for _ in 0..11 {
            shoe.deal().unwrap();
        }
        assert_eq!(shoe.deal().unwrap(), Card::new(Rank::Two, Suit::Hearts));
    }

    #[test]
    fn test_multi_deck_composition() {
        let shoe = Shoe::new(5);
        let aces = shoe.cards().filter(|c| c.rank == Rank::Ace).count();
        let kings_of_hearts = shoe
            .cards()
            .filter(|c| **c == Card::new(Rank::King, Suit::Hearts))
            .count();
        assert_eq!(shoe.len(), 260);
        assert_eq!(aces, 20);
        assert_eq!(kings_of_hearts, 5);
    }

    #[test]
    fn test_shuffle_keeps_composition() {
        let mut shoe = Shoe::with_seed(1, 7);
        shoe.shuffle();
        let cards: HashSet<Card> = shoe.cards().copied().collect();
        assert_eq!(shoe.len(), 52);
        assert_eq!(cards.len(), 52);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut a = Shoe::with_seed(2, 42);
        let mut b = Shoe::with_seed(2, 42);
        a.shuffle();
        b.shuffle();
        assert!(a.cards().eq(b.cards()));
    }

    #[test]
    fn test_stacked_shoe_deals_in_order() {
        let mut shoe = Shoe::from_cards(vec![
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Clubs),
        ]);
        assert_eq!(shoe.deal().unwrap().rank, Rank::Ace);
        assert_eq!(shoe.deal().unwrap().rank, Rank::Nine);
        assert!(shoe.is_empty());
    }

    #[test]
    fn test_stacked_deck_count_saturates() {
        let small = Shoe::from_cards(vec![Card::new(Rank::Two, Suit::Spades); CARDS_PER_DECK + 1]);
        assert_eq!(small.num_decks(), 2);

        let huge = Shoe::from_cards(vec![Card::new(Rank::Two, Suit::Spades); 300 * CARDS_PER_DECK]);
        assert_eq!(huge.num_decks(), u8::MAX);
    }

    #[test]
    fn test_decks_remaining_rounds_up() {
        let mut shoe = Shoe::new(2);
        assert_eq!(shoe.decks_remaining(), 2);
        shoe.deal().unwrap();
        assert_eq!(shoe.decks_remaining(), 2);
        for _ in 0..52 {
            shoe.deal().unwrap();
        }
        assert_eq!(shoe.decks_remaining(), 1);
        while shoe.deal().is_ok() {}
        assert_eq!(shoe.decks_remaining(), 1);
    }
}
