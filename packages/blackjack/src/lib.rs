mod card;
mod error;
mod shoe;
mod rules;
mod hand;
pub mod strategy;
pub mod count;
mod round;

pub use card::{Card, Rank, Suit};
pub use error::BlackjackError;
pub use shoe::{Shoe, CARDS_PER_DECK};
pub use rules::{TableRules, PayoutRatio};
pub use hand::{Hand, HandOutcome, effective_values, calculate_hand_value, is_soft_hand, is_busted, is_blackjack, can_split_cards};
pub use strategy::{Action, LegalActions};
pub use count::BetAdvice;
pub use round::{RoundEngine, RoundPhase, PlayerHand, HandStatus, HandResult, SessionStats, Notice, DealerView, settle_hand};
