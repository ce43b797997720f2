use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dapp_requests_core::{PortError, SessionResponderPort, SessionResponse};

use crate::SigningAdapterConfig;

#[derive(Debug, Clone)]
pub struct WalletConnectAdapter {
    mode: RelayMode,
    inner: Arc<Mutex<WalletConnectState>>,
}

#[derive(Debug, Clone)]
enum RelayMode {
    Disabled(String),
    InMemory,
    Http(HttpRelay),
}

#[derive(Debug, Clone)]
struct HttpRelay {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Default)]
struct WalletConnectState {
    sessions: HashSet<String>,
    responses: Vec<SessionResponse>,
}

impl Default for WalletConnectAdapter {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl WalletConnectAdapter {
    pub fn in_memory() -> Self {
        Self {
            mode: RelayMode::InMemory,
            inner: Arc::new(Mutex::new(WalletConnectState::default())),
        }
    }

    pub fn with_config(config: &SigningAdapterConfig) -> Self {
        let mode = match config.wc_relay_url {
            Some(ref base_url) => {
                match reqwest::blocking::Client::builder()
                    .timeout(Duration::from_millis(config.http_timeout_ms))
                    .build()
                {
                    Ok(client) => RelayMode::Http(HttpRelay {
                        base_url: base_url.trim_end_matches('/').to_owned(),
                        client,
                    }),
                    Err(e) => RelayMode::Disabled(format!(
                        "failed to initialize walletconnect relay client: {e}"
                    )),
                }
            }
            None if config.strict_runtime_required() => RelayMode::Disabled(
                "walletconnect relay URL not configured in production runtime profile"
                    .to_owned(),
            ),
            None => RelayMode::InMemory,
        };
        Self {
            mode,
            inner: Arc::new(Mutex::new(WalletConnectState::default())),
        }
    }

    pub fn insert_session(&self, topic: impl Into<String>) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("wc lock poisoned: {e}")))?;
        g.sessions.insert(topic.into());
        Ok(())
    }

    pub fn disconnect_session(&self, topic: &str) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("wc lock poisoned: {e}")))?;
        g.sessions.remove(topic);
        Ok(())
    }

    /// Responses sent so far, oldest first.
    pub fn responses(&self) -> Result<Vec<SessionResponse>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("wc lock poisoned: {e}")))?;
        Ok(g.responses.clone())
    }

    fn record(&self, response: &SessionResponse) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("wc lock poisoned: {e}")))?;
        g.responses.push(response.clone());
        Ok(())
    }
}

impl SessionResponderPort for WalletConnectAdapter {
    fn has_session(&self, topic: &str) -> Result<bool, PortError> {
        match &self.mode {
            RelayMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            RelayMode::InMemory => {
                let g = self
                    .inner
                    .lock()
                    .map_err(|e| PortError::Transport(format!("wc lock poisoned: {e}")))?;
                Ok(g.sessions.contains(topic))
            }
            RelayMode::Http(relay) => {
                let response = relay
                    .client
                    .get(format!("{}/sessions/{topic}", relay.base_url))
                    .send()
                    .map_err(|e| PortError::Transport(format!("wc relay request failed: {e}")))?;
                match response.status().as_u16() {
                    200..=299 => Ok(true),
                    404 => Ok(false),
                    code => Err(PortError::Transport(format!(
                        "wc relay session lookup status {code}"
                    ))),
                }
            }
        }
    }

    fn respond(&self, response: &SessionResponse) -> Result<(), PortError> {
        match &self.mode {
            RelayMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            RelayMode::InMemory => {
                if !self.has_session(&response.topic)? {
                    return Err(PortError::NotFound(format!(
                        "wc session missing: {}",
                        response.topic
                    )));
                }
                self.record(response)
            }
            RelayMode::Http(relay) => {
                let resp = relay
                    .client
                    .post(format!("{}/sessions/{}/response", relay.base_url, response.topic))
                    .json(response)
                    .send()
                    .map_err(|e| PortError::Transport(format!("wc relay request failed: {e}")))?;
                let status = resp.status();
                if !status.is_success() {
                    let body = resp.text().unwrap_or_default();
                    return Err(PortError::Transport(format!(
                        "wc relay status {status}: {body}"
                    )));
                }
                self.record(response)
            }
        }
    }
}
