use serde::{Deserialize, Serialize};

use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPhase {
    Pending,
    Confirmed,
    Rejected,
}

impl RequestPhase {
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Confirm,
    Reject,
    /// Surface closed without an explicit decision.
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: RequestPhase,
    pub to: RequestPhase,
    pub reason: &'static str,
}

pub fn request_transition(
    from: RequestPhase,
    action: RequestAction,
) -> Result<(RequestPhase, StateTransition), PortError> {
    let (to, reason) = match (from, action) {
        (RequestPhase::Pending, RequestAction::Confirm) => (RequestPhase::Confirmed, "confirmed"),
        (RequestPhase::Pending, RequestAction::Reject) => (RequestPhase::Rejected, "rejected"),
        (RequestPhase::Pending, RequestAction::Dismiss) => {
            (RequestPhase::Rejected, "rejected_on_close")
        }
        (from, action) => {
            return Err(PortError::Conflict(format!(
                "illegal request transition: {from:?} --{action:?}-->"
            )))
        }
    };
    Ok((to, StateTransition { from, to, reason }))
}
