use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    DoubleDown,
    Split,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Hit => "Hit",
            Action::Stand => "Stand",
            Action::DoubleDown => "Double Down",
            Action::Split => "Split",
        };
        f.write_str(label)
    }
}

/// The actions a hand may take at its current decision point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalActions {
    pub hit: bool,
    pub stand: bool,
    pub double_down: bool,
    pub split: bool,
}

impl LegalActions {
    pub const NONE: Self = Self {
        hit: false,
        stand: false,
        double_down: false,
        split: false,
    };

    pub fn contains(&self, action: Action) -> bool {
        match action {
            Action::Hit => self.hit,
            Action::Stand => self.stand,
            Action::DoubleDown => self.double_down,
            Action::Split => self.split,
        }
    }

    pub fn to_vec(&self) -> Vec<Action> {
        [Action::Hit, Action::Stand, Action::DoubleDown, Action::Split]
            .into_iter()
            .filter(|a| self.contains(*a))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Basic-strategy advice for the player's hand against the dealer's up card.
///
/// `player_ranks` and `player_values` run in parallel; values are the hand's
/// effective values (aces already demoted where needed).
pub fn recommend(dealer_up: Rank, player_ranks: &[Rank], player_values: &[u8]) -> Action {
    if let Some(action) = pair_action(dealer_up, player_ranks) {
        return action;
    }
    totals_action(dealer_up, player_ranks, player_values)
}

/// Like [`recommend`], but never suggests an action outside `legal`.
pub fn recommend_legal(
    dealer_up: Rank,
    player_ranks: &[Rank],
    player_values: &[u8],
    legal: &LegalActions,
) -> Action {
    let mut action = recommend(dealer_up, player_ranks, player_values);
    if action == Action::Split && !legal.split {
        action = totals_action(dealer_up, player_ranks, player_values);
    }
    if action == Action::DoubleDown && !legal.double_down {
        let total: u32 = player_values.iter().map(|v| *v as u32).sum();
        action = if has_early_ace(player_ranks) && total >= 18 {
            Action::Stand
        } else {
            Action::Hit
        };
    }
    action
}

fn has_early_ace(player_ranks: &[Rank]) -> bool {
    player_ranks.iter().take(2).any(Rank::is_ace)
}

fn totals_action(dealer_up: Rank, player_ranks: &[Rank], player_values: &[u8]) -> Action {
    let total: u32 = player_values.iter().map(|v| *v as u32).sum();
    let dealer = dealer_up.value();

    if has_early_ace(player_ranks) {
        if let Some(action) = soft_action(total, dealer) {
            return action;
        }
    }
    // A soft total under 13 cannot bust on one card.
    if total < 13 && is_soft(player_ranks, player_values) {
        return Action::Hit;
    }
    hard_action(total, dealer)
}

fn is_soft(player_ranks: &[Rank], player_values: &[u8]) -> bool {
    player_ranks
        .iter()
        .zip(player_values)
        .any(|(rank, value)| rank.is_ace() && *value == 11)
}

fn pair_action(dealer_up: Rank, player_ranks: &[Rank]) -> Option<Action> {
    if player_ranks.len() != 2 || player_ranks[0] != player_ranks[1] {
        return None;
    }
    let dealer = dealer_up.value();

    let action = match player_ranks[0] {
        Rank::Ace | Rank::Eight => Action::Split,
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => Action::Stand,
        Rank::Nine => match dealer {
            2..=6 | 8 | 9 => Action::Split,
            _ => Action::Stand,
        },
        Rank::Seven => split_or_hit((2..=7).contains(&dealer)),
        Rank::Six => split_or_hit((2..=6).contains(&dealer)),
        // A pair of fives plays as a hard ten.
        Rank::Five => match dealer {
            2..=9 => Action::DoubleDown,
            _ => Action::Hit,
        },
        Rank::Four => split_or_hit((5..=6).contains(&dealer)),
        Rank::Three | Rank::Two => split_or_hit((2..=7).contains(&dealer)),
    };
    Some(action)
}

fn split_or_hit(split: bool) -> Action {
    if split {
        Action::Split
    } else {
        Action::Hit
    }
}

fn soft_action(total: u32, dealer: u8) -> Option<Action> {
    let action = match total {
        20 => Action::Stand,
        19 => match dealer {
            6 => Action::DoubleDown,
            _ => Action::Stand,
        },
        18 => match dealer {
            2..=6 => Action::DoubleDown,
            7 | 8 => Action::Stand,
            _ => Action::Hit,
        },
        17 => match dealer {
            3..=6 => Action::DoubleDown,
            _ => Action::Hit,
        },
        15 | 16 => match dealer {
            4..=6 => Action::DoubleDown,
            _ => Action::Hit,
        },
        13 | 14 => match dealer {
            5 | 6 => Action::DoubleDown,
            _ => Action::Hit,
        },
        _ => return None,
    };
    Some(action)
}

fn hard_action(total: u32, dealer: u8) -> Action {
    match total {
        t if t >= 17 => Action::Stand,
        13..=16 => match dealer {
            2..=6 => Action::Stand,
            _ => Action::Hit,
        },
        12 => match dealer {
            4..=6 => Action::Stand,
            _ => Action::Hit,
        },
        11 => Action::DoubleDown,
        10 => match dealer {
            2..=9 => Action::DoubleDown,
            _ => Action::Hit,
        },
        9 => match dealer {
            3..=6 => Action::DoubleDown,
            _ => Action::Hit,
        },
        _ => Action::Hit,
    }
}
