use serde::{Deserialize, Serialize};

use crate::domain::{RequestDescriptor, RequestMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmLabel {
    Accept,
    Sign,
}

/// Which confirmation surface the shell should present for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestSurface {
    Standard { confirm_label: ConfirmLabel },
    Erc20Send,
    /// Account mismatch blocks the request; only reject is offered.
    ActionCannotBeCompleted,
}

impl RequestSurface {
    pub fn allows_confirm(self) -> bool {
        !matches!(self, Self::ActionCannotBeCompleted)
    }
}

pub fn is_eligible(request: &RequestDescriptor) -> bool {
    match request.method {
        RequestMethod::PersonalSign
        | RequestMethod::SignTypedData
        | RequestMethod::SignTypedDataV4
        | RequestMethod::EthSign
        | RequestMethod::EthSendTransaction
        | RequestMethod::Erc20Send
        | RequestMethod::WalletSendCalls => true,
        RequestMethod::Other(_) => false,
    }
}

/// Picks the surface for an eligible request. Returns `None` for
/// ineligible ones, which have nothing to confirm.
pub fn select_surface(
    request: &RequestDescriptor,
    permit_mismatch_ux_enabled: bool,
    has_account_mismatch: bool,
) -> Option<RequestSurface> {
    if !is_eligible(request) {
        return None;
    }
    Some(surface_for_eligible(
        request,
        permit_mismatch_ux_enabled,
        has_account_mismatch,
    ))
}

/// Surface for a request already known to be eligible, as held by an open
/// `RequestHandle`.
pub(crate) fn surface_for_eligible(
    request: &RequestDescriptor,
    permit_mismatch_ux_enabled: bool,
    has_account_mismatch: bool,
) -> RequestSurface {
    if request.method == RequestMethod::Erc20Send {
        return RequestSurface::Erc20Send;
    }
    if permit_mismatch_ux_enabled && has_account_mismatch && request.method.is_typed_data() {
        return RequestSurface::ActionCannotBeCompleted;
    }
    let confirm_label = if request.method.is_transaction() || request.method.is_batched() {
        ConfirmLabel::Accept
    } else {
        ConfirmLabel::Sign
    };
    RequestSurface::Standard { confirm_label }
}
