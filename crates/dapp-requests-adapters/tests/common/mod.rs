#![allow(dead_code)]

use alloy::primitives::{Address, U256};

use dapp_requests_adapters::{init_tracing, RequestRuntime, RuntimeAdapters, SigningAdapterConfig};
use dapp_requests_core::{
    BatchedCall, DappRequestInfo, DappRequestType, GasFeeParams, GasFeeResult, LiveConditions,
    RequestDescriptor, RequestMethod, RequestPayload, SignerAccount, TransactionRequest,
};

pub const TOPIC: &str = "wc-topic-1";
pub const CHAIN_ID: u64 = 1;

pub fn owner_address() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid owner address")
}

pub fn other_address() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("valid other address")
}

pub fn recipient_address() -> Address {
    "0x000000000000000000000000000000000000cafe"
        .parse()
        .expect("valid recipient address")
}

pub fn owner_account() -> SignerAccount {
    SignerAccount {
        address: owner_address(),
        name: Some("Main wallet".to_owned()),
        derivation_index: 0,
    }
}

pub fn dapp() -> DappRequestInfo {
    DappRequestInfo {
        name: "Example Swap".to_owned(),
        url: "https://swap.example.org".to_owned(),
        icon: None,
        request_type: DappRequestType::WalletConnectSessionRequest,
    }
}

pub fn request(internal_id: &str, method: RequestMethod, payload: RequestPayload) -> RequestDescriptor {
    RequestDescriptor {
        session_id: TOPIC.to_owned(),
        internal_id: internal_id.to_owned(),
        method,
        account: owner_address(),
        chain_id: CHAIN_ID,
        payload,
        dapp: dapp(),
        is_link_mode_supported: false,
    }
}

pub fn transfer() -> TransactionRequest {
    TransactionRequest {
        to: Some(recipient_address()),
        value: Some(U256::from(1_000u64)),
        data: Some(alloy::primitives::Bytes::new()),
        ..TransactionRequest::default()
    }
}

pub fn send_transaction_request(internal_id: &str) -> RequestDescriptor {
    request(
        internal_id,
        RequestMethod::EthSendTransaction,
        RequestPayload::Transaction(transfer()),
    )
}

pub fn batched_calls_request(internal_id: &str) -> RequestDescriptor {
    request(
        internal_id,
        RequestMethod::WalletSendCalls,
        RequestPayload::BatchedCalls {
            calls: vec![BatchedCall {
                to: recipient_address(),
                value: Some(U256::from(1_000u64)),
                data: None,
            }],
            encoded_transaction: TransactionRequest {
                to: Some(owner_address()),
                data: Some(alloy::primitives::Bytes::from(vec![0x34, 0x0b, 0x02, 0x12])),
                ..TransactionRequest::default()
            },
        },
    )
}

pub fn personal_sign_request(internal_id: &str) -> RequestDescriptor {
    request(
        internal_id,
        RequestMethod::PersonalSign,
        RequestPayload::Message {
            message: Some("Sign in to Example Swap".to_owned()),
            raw_message: "0x5369676e20696e".to_owned(),
        },
    )
}

pub fn typed_data_request(internal_id: &str) -> RequestDescriptor {
    request(
        internal_id,
        RequestMethod::SignTypedDataV4,
        RequestPayload::Message {
            message: Some("{\"primaryType\":\"Permit\"}".to_owned()),
            raw_message: "{\"primaryType\":\"Permit\"}".to_owned(),
        },
    )
}

pub fn ready_conditions() -> LiveConditions {
    LiveConditions {
        internet_reachable: true,
        gas_fee: GasFeeResult {
            value: Some(U256::from(21_000u64 * 20)),
            params: Some(GasFeeParams::Eip1559 {
                gas_limit: U256::from(21_000u64),
                max_fee_per_gas: U256::from(20u64),
                max_priority_fee_per_gas: U256::from(1u64),
            }),
            error: None,
            is_loading: false,
        },
        native_balance: Some(U256::from(1_000_000_000_000_000_000u64)),
        ..LiveConditions::default()
    }
}

pub fn new_runtime_with(config: SigningAdapterConfig) -> RequestRuntime {
    init_tracing();
    let adapters = RuntimeAdapters::from_config(&config, [1, 8453]);
    adapters
        .walletconnect
        .insert_session(TOPIC)
        .expect("insert session");
    adapters.accounts.add(owner_account()).expect("add account");
    RequestRuntime::new(&config, adapters)
}

pub fn new_runtime() -> RequestRuntime {
    new_runtime_with(SigningAdapterConfig::default())
}
