use thiserror::Error;

use crate::{Action, RoundPhase};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlackjackError {
    #[error("There are no cards left in the shoe")]
    EmptyShoe,
    #[error("Invalid bet {bet}: must be greater than 0 and at most {funds}")]
    InvalidBet { bet: u64, funds: u64 },
    #[error("{0} is not available right now")]
    InvalidAction(Action),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Expected phase {expected:?}, round is in {actual:?}")]
    WrongPhase {
        expected: RoundPhase,
        actual: RoundPhase,
    },
}
