use thiserror::Error;

use crate::domain::{BlockStatus, GasFeeResult, RequestMethod, SignerAccount, TransactionRequest};

/// Snapshot of everything confirmability depends on. Rebuild it whenever
/// one of the inputs changes; nothing here is cached.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmabilityInputs<'a> {
    pub internet_reachable: bool,
    pub link_mode_supported: bool,
    pub signer_account: Option<&'a SignerAccount>,
    pub sender_block: BlockStatus,
    pub recipient_block: BlockStatus,
    pub method: &'a RequestMethod,
    pub transaction: Option<&'a TransactionRequest>,
    pub gas_fee: &'a GasFeeResult,
    pub has_sufficient_funds: bool,
}

/// First rule that failed. Variant order follows evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotConfirmable {
    #[error("network unreachable and link mode unavailable")]
    Offline,
    #[error("no signer account matches the request account")]
    NoMatchingSigner,
    #[error("sender or recipient is blocked")]
    Blocked,
    #[error("blocklist lookup still loading")]
    BlocklistLoading,
    #[error("request has no transaction")]
    MissingTransaction,
    #[error("insufficient funds for value plus gas")]
    InsufficientFunds,
    #[error("gas fee estimate unavailable")]
    GasFeeUnavailable,
    #[error("gas fee estimation failed")]
    GasFeeError,
    #[error("gas fee estimate still loading")]
    GasFeeLoading,
}

pub fn evaluate(inputs: &ConfirmabilityInputs<'_>) -> Result<(), NotConfirmable> {
    // Link mode signs through universal links on device, so offline is fine.
    if !inputs.internet_reachable && !inputs.link_mode_supported {
        return Err(NotConfirmable::Offline);
    }

    if inputs.signer_account.is_none() {
        return Err(NotConfirmable::NoMatchingSigner);
    }

    if inputs.sender_block.is_blocked || inputs.recipient_block.is_blocked {
        return Err(NotConfirmable::Blocked);
    }
    if inputs.sender_block.is_loading || inputs.recipient_block.is_loading {
        return Err(NotConfirmable::BlocklistLoading);
    }

    if inputs.method.costs_gas() {
        if inputs.transaction.is_none() {
            return Err(NotConfirmable::MissingTransaction);
        }
        if !inputs.has_sufficient_funds {
            return Err(NotConfirmable::InsufficientFunds);
        }
        if inputs.gas_fee.value.is_none() {
            return Err(NotConfirmable::GasFeeUnavailable);
        }
        if inputs.gas_fee.error.is_some() {
            return Err(NotConfirmable::GasFeeError);
        }
        if inputs.gas_fee.is_loading {
            return Err(NotConfirmable::GasFeeLoading);
        }
        return Ok(());
    }

    if inputs.method.is_transaction() && inputs.transaction.is_none() {
        return Err(NotConfirmable::MissingTransaction);
    }

    Ok(())
}

pub fn is_confirmable(inputs: &ConfirmabilityInputs<'_>) -> bool {
    evaluate(inputs).is_ok()
}
