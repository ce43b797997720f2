use alloy::primitives::{Address, U256};

use dapp_requests_core::{
    evaluate, is_confirmable, BlockStatus, ConfirmabilityInputs, GasFeeResult, NotConfirmable,
    RequestMethod, SignerAccount, TransactionRequest,
};

fn signer() -> SignerAccount {
    SignerAccount {
        address: Address::repeat_byte(0x11),
        name: Some("main".to_owned()),
        derivation_index: 0,
    }
}

fn loaded_fee() -> GasFeeResult {
    GasFeeResult {
        value: Some(U256::from(21_000u64)),
        params: None,
        error: None,
        is_loading: false,
    }
}

fn inputs<'a>(
    method: &'a RequestMethod,
    account: &'a SignerAccount,
    tx: Option<&'a TransactionRequest>,
    fee: &'a GasFeeResult,
) -> ConfirmabilityInputs<'a> {
    ConfirmabilityInputs {
        internet_reachable: true,
        link_mode_supported: false,
        signer_account: Some(account),
        sender_block: BlockStatus::default(),
        recipient_block: BlockStatus::default(),
        method,
        transaction: tx,
        gas_fee: fee,
        has_sufficient_funds: true,
    }
}

#[test]
fn offline_without_link_mode_is_never_confirmable() {
    let account = signer();
    let tx = TransactionRequest::default();
    let fee = loaded_fee();
    let methods = [
        RequestMethod::PersonalSign,
        RequestMethod::SignTypedDataV4,
        RequestMethod::EthSendTransaction,
        RequestMethod::WalletSendCalls,
        RequestMethod::Erc20Send,
    ];
    for method in &methods {
        for blocked in [false, true] {
            for funds in [false, true] {
                let mut i = inputs(method, &account, Some(&tx), &fee);
                i.internet_reachable = false;
                i.sender_block.is_blocked = blocked;
                i.has_sufficient_funds = funds;
                assert_eq!(evaluate(&i), Err(NotConfirmable::Offline));
            }
        }
    }
}

#[test]
fn link_mode_allows_offline_signing() {
    let account = signer();
    let fee = GasFeeResult::default();
    let method = RequestMethod::PersonalSign;
    let mut i = inputs(&method, &account, None, &fee);
    i.internet_reachable = false;
    i.link_mode_supported = true;
    assert!(is_confirmable(&i));
}

#[test]
fn gas_costing_requests_need_a_usable_fee() {
    let account = signer();
    let tx = TransactionRequest::default();
    let method = RequestMethod::EthSendTransaction;

    let loading = GasFeeResult {
        is_loading: true,
        ..loaded_fee()
    };
    assert_eq!(
        evaluate(&inputs(&method, &account, Some(&tx), &loading)),
        Err(NotConfirmable::GasFeeLoading)
    );

    let errored = GasFeeResult {
        error: Some("estimate failed".to_owned()),
        ..loaded_fee()
    };
    assert_eq!(
        evaluate(&inputs(&method, &account, Some(&tx), &errored)),
        Err(NotConfirmable::GasFeeError)
    );

    let absent = GasFeeResult::default();
    assert_eq!(
        evaluate(&inputs(&method, &account, Some(&tx), &absent)),
        Err(NotConfirmable::GasFeeUnavailable)
    );

    let fee = loaded_fee();
    assert!(is_confirmable(&inputs(&method, &account, Some(&tx), &fee)));
}

#[test]
fn signer_mismatch_is_reported_before_gas_checks() {
    let account = signer();
    let fee = GasFeeResult {
        is_loading: true,
        ..GasFeeResult::default()
    };
    let method = RequestMethod::WalletSendCalls;
    let mut i = inputs(&method, &account, None, &fee);
    i.signer_account = None;
    i.has_sufficient_funds = false;
    assert_eq!(evaluate(&i), Err(NotConfirmable::NoMatchingSigner));
}

#[test]
fn blocklist_hits_and_loading_block_confirmation() {
    let account = signer();
    let fee = loaded_fee();
    let method = RequestMethod::PersonalSign;

    let mut blocked = inputs(&method, &account, None, &fee);
    blocked.recipient_block.is_blocked = true;
    blocked.sender_block.is_loading = true;
    assert_eq!(evaluate(&blocked), Err(NotConfirmable::Blocked));

    let mut loading = inputs(&method, &account, None, &fee);
    loading.recipient_block.is_loading = true;
    assert_eq!(evaluate(&loading), Err(NotConfirmable::BlocklistLoading));
}

#[test]
fn insufficient_funds_precede_fee_state() {
    let account = signer();
    let tx = TransactionRequest::default();
    let fee = GasFeeResult::default();
    let method = RequestMethod::Erc20Send;
    let mut i = inputs(&method, &account, Some(&tx), &fee);
    i.has_sufficient_funds = false;
    assert_eq!(evaluate(&i), Err(NotConfirmable::InsufficientFunds));

    i.transaction = None;
    assert_eq!(evaluate(&i), Err(NotConfirmable::MissingTransaction));
}

#[test]
fn message_requests_ignore_fee_and_funds() {
    let account = signer();
    let fee = GasFeeResult {
        error: Some("rpc down".to_owned()),
        ..GasFeeResult::default()
    };
    let method = RequestMethod::EthSign;
    let mut i = inputs(&method, &account, None, &fee);
    i.has_sufficient_funds = false;
    assert!(is_confirmable(&i));
}
