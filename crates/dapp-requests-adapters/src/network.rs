use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use serde_json::Value;

use dapp_requests_core::{
    NetworkClientRegistryPort, PortError, ProviderPort, ProviderRegistryPort, SubmissionRoute,
};

use crate::SigningAdapterConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub chain_id: u64,
    pub route: SubmissionRoute,
    pub raw: Bytes,
    pub tx_hash: B256,
}

#[derive(Debug, Default)]
struct ChainState {
    chains: HashSet<u64>,
    private_chains: HashSet<u64>,
    nonces: HashMap<(u64, Address), u64>,
    broadcasts: Vec<Broadcast>,
    lookups: usize,
}

/// Provider and network-client registry.
///
/// Chains with a configured RPC URL are reached over JSON-RPC; the rest run
/// against a deterministic in-memory chain.
#[derive(Debug, Clone)]
pub struct NetworkAdapter {
    state: Arc<Mutex<ChainState>>,
    public_rpc: HashMap<u64, JsonRpcClient>,
    private_rpc: HashMap<u64, JsonRpcClient>,
}

impl NetworkAdapter {
    pub fn in_memory(chains: impl IntoIterator<Item = u64>) -> Self {
        Self::new(chains, &SigningAdapterConfig::default())
    }

    pub fn new(chains: impl IntoIterator<Item = u64>, config: &SigningAdapterConfig) -> Self {
        let chains: HashSet<u64> = chains.into_iter().collect();
        let private_chains = config
            .private_rpc_chains
            .iter()
            .copied()
            .filter(|c| chains.contains(c))
            .collect();
        let timeout = Duration::from_millis(config.http_timeout_ms);
        let build = |urls: &HashMap<u64, String>| -> HashMap<u64, JsonRpcClient> {
            urls.iter()
                .filter_map(|(chain_id, url)| match JsonRpcClient::new(*chain_id, url, timeout) {
                    Ok(client) => Some((*chain_id, client)),
                    Err(e) => {
                        tracing::warn!(chain_id, error = %e, "rpc client disabled");
                        None
                    }
                })
                .collect()
        };
        Self {
            state: Arc::new(Mutex::new(ChainState {
                chains,
                private_chains,
                ..ChainState::default()
            })),
            public_rpc: build(&config.public_rpc_urls),
            private_rpc: build(&config.private_rpc_urls),
        }
    }

    pub fn set_nonce(&self, chain_id: u64, address: Address, nonce: u64) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.nonces.insert((chain_id, address), nonce);
        Ok(())
    }

    pub fn broadcasts(&self) -> Result<Vec<Broadcast>, PortError> {
        Ok(self.lock()?.broadcasts.clone())
    }

    /// Registry lookups served so far (providers and clients).
    pub fn lookups(&self) -> Result<usize, PortError> {
        Ok(self.lock()?.lookups)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ChainState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("network lock poisoned: {e}")))
    }

    fn client(
        &self,
        chain_id: u64,
        route: SubmissionRoute,
    ) -> Result<Arc<dyn ProviderPort>, PortError> {
        let rpc = match route {
            SubmissionRoute::Public => &self.public_rpc,
            SubmissionRoute::Private => &self.private_rpc,
        };
        let mut g = self.lock()?;
        g.lookups += 1;
        if let Some(client) = rpc.get(&chain_id) {
            return Ok(Arc::new(client.clone()));
        }
        let known = match route {
            SubmissionRoute::Public => g.chains.contains(&chain_id),
            SubmissionRoute::Private => g.private_chains.contains(&chain_id),
        };
        if !known {
            return Err(PortError::NotFound(format!(
                "no {route:?} client for chain {chain_id}"
            )));
        }
        Ok(Arc::new(InMemoryChainClient {
            chain_id,
            route,
            state: Arc::clone(&self.state),
        }))
    }
}

impl ProviderRegistryPort for NetworkAdapter {
    fn provider(&self, chain_id: u64) -> Result<Arc<dyn ProviderPort>, PortError> {
        self.client(chain_id, SubmissionRoute::Public)
    }
}

impl NetworkClientRegistryPort for NetworkAdapter {
    fn public_client(&self, chain_id: u64) -> Result<Arc<dyn ProviderPort>, PortError> {
        self.client(chain_id, SubmissionRoute::Public)
    }

    fn private_client(&self, chain_id: u64) -> Result<Arc<dyn ProviderPort>, PortError> {
        self.client(chain_id, SubmissionRoute::Private)
    }
}

#[derive(Debug, Clone)]
struct InMemoryChainClient {
    chain_id: u64,
    route: SubmissionRoute,
    state: Arc<Mutex<ChainState>>,
}

impl ProviderPort for InMemoryChainClient {
    fn chain_id(&self) -> Result<u64, PortError> {
        Ok(self.chain_id)
    }

    fn transaction_count(&self, address: Address) -> Result<u64, PortError> {
        let g = self
            .state
            .lock()
            .map_err(|e| PortError::Transport(format!("network lock poisoned: {e}")))?;
        Ok(g.nonces.get(&(self.chain_id, address)).copied().unwrap_or(0))
    }

    fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, PortError> {
        if raw.is_empty() {
            return Err(PortError::Validation("empty raw transaction".to_owned()));
        }
        let tx_hash = keccak256(raw);
        let mut g = self
            .state
            .lock()
            .map_err(|e| PortError::Transport(format!("network lock poisoned: {e}")))?;
        g.broadcasts.push(Broadcast {
            chain_id: self.chain_id,
            route: self.route,
            raw: raw.clone(),
            tx_hash,
        });
        Ok(tx_hash)
    }
}

#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    chain_id: u64,
    url: String,
    client: reqwest::blocking::Client,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
    pub fn new(chain_id: u64, url: &str, timeout: Duration) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Transport(format!("rpc client init failed: {e}")))?;
        Ok(Self {
            chain_id,
            url: url.to_owned(),
            client,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("rpc request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PortError::Transport(format!("rpc status {status}: {body}")));
        }
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("rpc json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(PortError::Transport(format!("rpc returned error: {err}")));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("rpc missing result".to_owned()))
    }
}

impl ProviderPort for JsonRpcClient {
    fn chain_id(&self) -> Result<u64, PortError> {
        let result = self.call("eth_chainId", serde_json::json!([]))?;
        let chain_id = parse_quantity(&result)?;
        if chain_id != self.chain_id {
            tracing::warn!(expected = self.chain_id, actual = chain_id, "rpc chain id differs");
        }
        Ok(chain_id)
    }

    fn transaction_count(&self, address: Address) -> Result<u64, PortError> {
        let result = self.call(
            "eth_getTransactionCount",
            serde_json::json!([address, "pending"]),
        )?;
        parse_quantity(&result)
    }

    fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, PortError> {
        let result = self.call("eth_sendRawTransaction", serde_json::json!([raw]))?;
        let hash = result
            .as_str()
            .ok_or_else(|| PortError::Transport("eth_sendRawTransaction must return tx hash".to_owned()))?;
        hash.parse()
            .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))
    }
}

fn parse_quantity(value: &Value) -> Result<u64, PortError> {
    match value {
        Value::String(s) => {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(hex, 16)
                .map_err(|e| PortError::Validation(format!("invalid quantity {s}: {e}")))
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| PortError::Validation(format!("invalid quantity {n}"))),
        other => Err(PortError::Validation(format!("invalid quantity {other}"))),
    }
}
