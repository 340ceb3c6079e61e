//! Hi-Lo card counting and the bet suggestion derived from it.

use serde::{Deserialize, Serialize};

use crate::card::Rank;
use crate::error::BlackjackError;
use crate::{Card, Hand, TableRules};

/// Hi-Lo tag for a single rank.
pub fn hi_lo(rank: Rank) -> i32 {
    match rank {
        Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
        Rank::Seven | Rank::Eight | Rank::Nine => 0,
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King | Rank::Ace => -1,
    }
}

pub fn running_count<'a>(cards: impl IntoIterator<Item = &'a Card>) -> i32 {
    cards.into_iter().map(|c| hi_lo(c.rank)).sum()
}

/// Running count over everything on the table: the dealer's hand, hole card
/// included, and every player hand.
pub fn table_running_count(dealer: &Hand, player_hands: &[&Hand]) -> i32 {
    running_count(dealer.cards()) + player_hands.iter().map(|h| running_count(h.cards())).sum::<i32>()
}

/// `prior + running / decks_remaining`, with the division truncating toward zero.
pub fn true_count(prior: i32, running: i32, decks_remaining: i32) -> Result<i32, BlackjackError> {
    if decks_remaining <= 0 {
        return Err(BlackjackError::InvalidArgument(format!(
            "decks remaining must be at least 1, got {decks_remaining}"
        )));
    }
    Ok(prior + running / decks_remaining)
}

/// `(true_count - 1) * betting_unit`. Zero or negative means "don't press".
pub fn recommended_bet(true_count: i32, betting_unit: u64) -> i64 {
    (true_count as i64 - 1) * betting_unit as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetAdvice {
    /// The count doesn't favour the player.
    Minimum(u64),
    Raise(u64),
}

impl BetAdvice {
    pub fn amount(&self) -> u64 {
        match self {
            BetAdvice::Minimum(amount) | BetAdvice::Raise(amount) => *amount,
        }
    }
}

pub fn bet_advice(true_count: i32, rules: &TableRules) -> BetAdvice {
    if true_count > 1 {
        BetAdvice::Raise(recommended_bet(true_count, rules.betting_unit) as u64)
    } else {
        BetAdvice::Minimum(rules.min_bet)
    }
}
