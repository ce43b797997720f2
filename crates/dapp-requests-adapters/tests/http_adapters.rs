use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use dapp_requests_adapters::{
    AnalyticsAdapter, JsonRpcClient, RuntimeProfile, SigningAdapterConfig, WalletConnectAdapter,
};
use dapp_requests_core::{
    AnalyticsPort, JsonRpcError, Outcome, OutcomeEvent, PortError, ProviderPort,
    SessionResponderPort, SessionResponse,
};

const TX_HASH: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    body: Value,
}

#[test]
fn walletconnect_relay_checks_session_and_posts_response() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));

    let adapter = WalletConnectAdapter::with_config(&SigningAdapterConfig {
        wc_relay_url: Some(format!("{base_url}/")),
        http_timeout_ms: 5_000,
        ..SigningAdapterConfig::default()
    });

    assert!(adapter.has_session("wc-live").expect("live session"));
    assert!(!adapter.has_session("wc-gone").expect("gone session"));

    let response = SessionResponse::error("wc-live", 42, JsonRpcError::user_rejected());
    adapter.respond(&response).expect("respond");
    assert_eq!(adapter.responses().expect("responses"), vec![response]);

    let err = adapter
        .respond(&SessionResponse::result("wc-broken", 43, json!("0x")))
        .expect_err("relay failure");
    assert!(matches!(err, PortError::Transport(_)));

    let calls = calls.lock().expect("calls lock");
    let posted = calls
        .iter()
        .find(|c| c.method == Method::Post && c.path == "/sessions/wc-live/response")
        .expect("response posted");
    assert_eq!(posted.body["topic"], "wc-live");
    assert_eq!(posted.body["response"]["id"], 42);
    assert_eq!(posted.body["response"]["jsonrpc"], "2.0");
    assert_eq!(posted.body["response"]["error"]["code"], 5000);
    assert_eq!(posted.body["response"]["error"]["message"], "User rejected.");
}

#[test]
fn production_without_relay_is_disabled() {
    let adapter = WalletConnectAdapter::with_config(&SigningAdapterConfig {
        runtime_profile: RuntimeProfile::Production,
        ..SigningAdapterConfig::default()
    });
    let err = adapter.has_session("wc-live").expect_err("disabled relay");
    assert!(matches!(err, PortError::Policy(_)));
}

#[test]
fn analytics_sink_posts_sheet_completed_events() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));

    let adapter = AnalyticsAdapter::with_config(&SigningAdapterConfig {
        analytics_endpoint: Some(base_url),
        http_timeout_ms: 5_000,
        ..SigningAdapterConfig::default()
    });
    adapter
        .record_outcome(&OutcomeEvent {
            request_type: "sign_request".to_owned(),
            eth_method: "personal_sign".to_owned(),
            dapp_url: "https://swap.example.org".to_owned(),
            dapp_name: "Example Swap".to_owned(),
            wc_version: "2".to_owned(),
            chain_id: 1,
            outcome: Outcome::Confirm,
        })
        .expect("record outcome");
    assert_eq!(adapter.outcomes().expect("outcomes").len(), 1);

    let calls = calls.lock().expect("calls lock");
    let event = calls
        .iter()
        .find(|c| c.path == "/events")
        .expect("event posted");
    assert_eq!(event.body["event"], "WalletConnectSheetCompleted");
    assert_eq!(event.body["properties"]["eth_method"], "personal_sign");
    assert_eq!(event.body["properties"]["outcome"], "confirm");
}

#[test]
fn json_rpc_client_reads_chain_and_broadcasts() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));
    let client = JsonRpcClient::new(8453, &format!("{base_url}/rpc"), Duration::from_secs(5))
        .expect("rpc client");
    let account: Address = "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("account");

    assert_eq!(client.chain_id().expect("chain id"), 8453);
    assert_eq!(client.transaction_count(account).expect("nonce"), 9);
    let hash = client
        .send_raw_transaction(&Bytes::from(vec![0x02, 0xf8]))
        .expect("broadcast");
    assert_eq!(hash, TX_HASH.parse::<B256>().expect("hash"));

    let calls = calls.lock().expect("calls lock");
    let methods: Vec<&str> = calls
        .iter()
        .filter(|c| c.path == "/rpc")
        .filter_map(|c| c.body["method"].as_str())
        .collect();
    assert_eq!(
        methods,
        vec!["eth_chainId", "eth_getTransactionCount", "eth_sendRawTransaction"]
    );
    let nonce_call = calls
        .iter()
        .find(|c| c.body["method"] == "eth_getTransactionCount")
        .expect("nonce call");
    assert_eq!(nonce_call.body["params"][1], "pending");
}

#[test]
fn json_rpc_error_surfaces_as_transport_error() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));
    let client = JsonRpcClient::new(1, &format!("{base_url}/rpc-failing"), Duration::from_secs(5))
        .expect("rpc client");

    let err = client.chain_id().expect_err("rpc error");
    assert!(matches!(err, PortError::Transport(ref m) if m.contains("nonce too low")));
}

#[test]
fn json_rpc_gateway_failure_reports_status_and_body() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));
    let client = JsonRpcClient::new(1, &format!("{base_url}/rpc-down"), Duration::from_secs(5))
        .expect("rpc client");

    let err = client.chain_id().expect_err("gateway failure");
    assert!(
        matches!(err, PortError::Transport(ref m) if m.contains("502") && m.contains("upstream unavailable")),
        "unexpected error: {err:?}"
    );
}

fn spawn_mock_server(
    calls: Arc<Mutex<Vec<Call>>>,
) -> (String, thread::JoinHandle<Result<(), PortError>>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    let join = thread::spawn(move || {
        for _ in 0..16 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let method = req.method().clone();
            let path = req.url().to_owned();
            let mut raw = String::new();
            let _ = req.as_reader().read_to_string(&mut raw);
            let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
            if let Ok(mut g) = calls.lock() {
                g.push(Call {
                    method: method.clone(),
                    path: path.clone(),
                    body: body.clone(),
                });
            }

            if method == Method::Post && path == "/rpc-down" {
                let response = Response::from_string("upstream unavailable")
                    .with_status_code(StatusCode(502));
                let _ = req.respond(response);
                continue;
            }

            let rpc_id = body.get("id").cloned().unwrap_or(Value::Null);
            let (code, payload) = match (method, path.as_str()) {
                (Method::Get, "/sessions/wc-live") => (200, json!({"topic": "wc-live"})),
                (Method::Post, "/sessions/wc-live/response") => (200, json!({"ok": true})),
                (Method::Post, "/sessions/wc-broken/response") => {
                    (502, json!({"error": "relay unavailable"}))
                }
                (Method::Post, "/events") => (202, json!({"ok": true})),
                (Method::Post, "/rpc") => {
                    let result = match body["method"].as_str() {
                        Some("eth_chainId") => json!("0x2105"),
                        Some("eth_getTransactionCount") => json!("0x9"),
                        Some("eth_sendRawTransaction") => json!(TX_HASH),
                        _ => Value::Null,
                    };
                    (200, json!({"jsonrpc": "2.0", "id": rpc_id, "result": result}))
                }
                (Method::Post, "/rpc-failing") => (
                    200,
                    json!({
                        "jsonrpc": "2.0",
                        "id": rpc_id,
                        "error": {"code": -32000, "message": "nonce too low"}
                    }),
                ),
                _ => (404, json!({"error": "not found"})),
            };

            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
        Ok(())
    });

    (addr, join)
}
