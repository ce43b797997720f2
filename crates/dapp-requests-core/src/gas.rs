use alloy::primitives::U256;

use crate::domain::{GasFeeParams, GasFeeResult, TransactionRequest};

/// Applies the estimated fee parameters to a dApp-supplied transaction.
///
/// Fee fields of the other fee model are cleared so the signer never sees
/// a mixed legacy/EIP-1559 request. Without estimated params the
/// transaction is returned untouched.
pub fn format_with_gas_estimates(
    tx: &TransactionRequest,
    gas_fee: &GasFeeResult,
) -> TransactionRequest {
    let mut out = tx.clone();
    match gas_fee.params {
        Some(GasFeeParams::Eip1559 {
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }) => {
            out.gas_limit = Some(gas_limit);
            out.max_fee_per_gas = Some(max_fee_per_gas);
            out.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            out.gas_price = None;
        }
        Some(GasFeeParams::Legacy {
            gas_limit,
            gas_price,
        }) => {
            out.gas_limit = Some(gas_limit);
            out.gas_price = Some(gas_price);
            out.max_fee_per_gas = None;
            out.max_priority_fee_per_gas = None;
        }
        None => {}
    }
    out
}

/// Native balance must cover the transferred value plus the gas fee.
/// An unknown balance never counts as sufficient.
pub fn has_sufficient_funds(
    native_balance: Option<U256>,
    value: Option<U256>,
    gas_fee: Option<U256>,
) -> bool {
    let Some(balance) = native_balance else {
        return false;
    };
    let Some(total) = value
        .unwrap_or(U256::ZERO)
        .checked_add(gas_fee.unwrap_or(U256::ZERO))
    else {
        return false;
    };
    balance >= total
}
