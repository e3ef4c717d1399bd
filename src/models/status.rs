use std::fmt::{Display, Formatter, Result};

use crate::models::dispatch::DispatchOutcome;

/// Terminal state of one poll-and-notify run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The upstream feed did not contain the product; nothing was sent.
    NothingToDispatch,
    Dispatched(DispatchOutcome),
}

impl Display for RunOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            RunOutcome::NothingToDispatch => write!(f, "product not loaded"),
            RunOutcome::Dispatched(outcome) => write!(f, "{}", outcome),
        }
    }
}
