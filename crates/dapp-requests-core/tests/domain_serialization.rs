use alloy::primitives::{Address, U256};
use serde_json::json;

use dapp_requests_core::{
    DappRequestType, JsonRpcError, RequestDescriptor, RequestMethod, RequestPayload,
    SessionResponse,
};

#[test]
fn request_descriptor_decodes_from_session_payload() {
    let raw = json!({
        "session_id": "wc-topic-1",
        "internal_id": "1700000000001",
        "method": "eth_sendTransaction",
        "account": "0x1000000000000000000000000000000000000001",
        "chain_id": 8453,
        "payload": {
            "kind": "transaction",
            "to": "0x000000000000000000000000000000000000cafe",
            "value": "0x2386f26fc10000",
            "data": "0x"
        },
        "dapp": {
            "name": "Example",
            "url": "https://app.example.org",
            "icon": null,
            "request_type": "WalletConnectSessionRequest"
        },
        "is_link_mode_supported": false
    });
    let req: RequestDescriptor = serde_json::from_value(raw).expect("decode descriptor");
    assert_eq!(req.method, RequestMethod::EthSendTransaction);
    assert_eq!(req.dapp.request_type, DappRequestType::WalletConnectSessionRequest);
    assert_eq!(req.rpc_id().expect("numeric id"), 1_700_000_000_001);

    let tx = req.transaction().expect("transaction");
    assert_eq!(tx.chain_id, Some(8453));
    assert_eq!(tx.value, Some(U256::from(10_000_000_000_000_000u64)));
    assert_eq!(
        tx.to,
        Some(
            "0x000000000000000000000000000000000000CAFE"
                .parse::<Address>()
                .expect("address")
        )
    );
}

#[test]
fn unknown_methods_survive_round_trip() {
    let method: RequestMethod =
        serde_json::from_value(json!("wallet_getCallsStatus")).expect("decode method");
    assert_eq!(method, RequestMethod::Other("wallet_getCallsStatus".to_owned()));
    assert_eq!(
        serde_json::to_value(&method).expect("encode method"),
        json!("wallet_getCallsStatus")
    );
}

#[test]
fn message_prefers_structured_form() {
    let payload = RequestPayload::Message {
        message: Some("{\"types\":{}}".to_owned()),
        raw_message: "0xdead".to_owned(),
    };
    let encoded = serde_json::to_value(&payload).expect("encode payload");
    assert_eq!(encoded["kind"], json!("message"));

    let empty = RequestPayload::Message {
        message: Some(String::new()),
        raw_message: "0xdead".to_owned(),
    };
    let req = RequestDescriptor {
        session_id: "t".to_owned(),
        internal_id: "1".to_owned(),
        method: RequestMethod::PersonalSign,
        account: Address::ZERO,
        chain_id: 1,
        payload: empty,
        dapp: dapp_requests_core::DappRequestInfo {
            name: "d".to_owned(),
            url: "https://d.example".to_owned(),
            icon: None,
            request_type: DappRequestType::UwULinkRequest,
        },
        is_link_mode_supported: false,
    };
    assert_eq!(req.message().as_deref(), Some("0xdead"));
    assert!(req.transaction().is_none());
}

#[test]
fn rejection_response_matches_walletconnect_shape() {
    let response = SessionResponse::error("wc-topic-1", 42, JsonRpcError::user_rejected());
    assert_eq!(
        serde_json::to_value(&response).expect("encode response"),
        json!({
            "topic": "wc-topic-1",
            "response": {
                "id": 42,
                "jsonrpc": "2.0",
                "error": { "code": 5000, "message": "User rejected." }
            }
        })
    );
}
