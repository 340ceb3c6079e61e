use serde::{Deserialize, Serialize};

use crate::shoe::CARDS_PER_DECK;

/// Blackjack payout multiplier as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    pub const SIX_TO_FIVE: Self = Self {
        numerator: 6,
        denominator: 5,
    };
    pub const ONE_TO_ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, &'static str> {
        if denominator == 0 {
            return Err("Denominator cannot be zero");
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Parses ratios written as `"3:2"`.
    pub fn parse(s: &str) -> Result<Self, &'static str> {
        let (num, den) = s.split_once(':').ok_or("Payout must look like 3:2")?;
        let num = num.trim().parse().map_err(|_| "Invalid payout numerator")?;
        let den = den.trim().parse().map_err(|_| "Invalid payout denominator")?;
        Self::new(num, den)
    }

    /// Winnings on top of the returned stake, rounded down.
    pub fn calculate_payout(&self, bet: u64) -> u64 {
        (bet * self.numerator as u64) / self.denominator as u64
    }
}

/// Table configuration for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    /// Number of decks in the shoe
    pub num_decks: u8,

    /// Bankroll the player sits down with
    pub starting_funds: u64,

    /// Unit the count advisor scales its bet suggestion by
    pub betting_unit: u64,

    /// Suggested bet when the count is neutral or negative
    pub min_bet: u64,

    /// Blackjack payout multiplier (commonly 3:2 or 6:5)
    pub blackjack_payout: PayoutRatio,

    /// Dealer hits on soft 17
    pub dealer_hits_soft_17: bool,

    /// A fresh shoe is built before dealing when fewer cards than this remain
    pub reshuffle_below: usize,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            num_decks: 5,
            starting_funds: 1000,
            betting_unit: 100,
            min_bet: 50,
            blackjack_payout: PayoutRatio::THREE_TO_TWO,
            dealer_hits_soft_17: false,
            reshuffle_below: CARDS_PER_DECK,
        }
    }
}

impl TableRules {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.num_decks == 0 {
            return Err("The shoe needs at least one deck");
        }
        if self.betting_unit == 0 {
            return Err("Betting unit must be positive");
        }
        if self.min_bet == 0 {
            return Err("Minimum bet must be positive");
        }
        if self.reshuffle_below > self.num_decks as usize * CARDS_PER_DECK {
            return Err("Reshuffle threshold is larger than the shoe");
        }
        Ok(())
    }
}
