use std::collections::HashMap;

use thiserror::Error;

use dapp_requests_core::{DispatcherConfig, RunnerConfig, TransactionConfigService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SigningAdapterConfig {
    pub runtime_profile: RuntimeProfile,
    pub wc_relay_url: Option<String>,
    pub wc_version: String,
    pub analytics_endpoint: Option<String>,
    pub http_timeout_ms: u64,
    pub job_queue_capacity: usize,
    pub public_rpc_urls: HashMap<u64, String>,
    pub private_rpc_urls: HashMap<u64, String>,
    pub private_rpc_enabled: bool,
    pub private_rpc_chains: Vec<u64>,
    pub submit_via_private_rpc: bool,
    pub permit_mismatch_ux_enabled: bool,
    pub biometrics_required_for_transactions: bool,
}

impl Default for SigningAdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            wc_relay_url: None,
            wc_version: "2".to_owned(),
            analytics_endpoint: None,
            http_timeout_ms: 15_000,
            job_queue_capacity: 64,
            public_rpc_urls: HashMap::new(),
            private_rpc_urls: HashMap::new(),
            private_rpc_enabled: true,
            // Flashbots-style private mempools exist on mainnet and Unichain.
            private_rpc_chains: vec![1, 130],
            submit_via_private_rpc: false,
            permit_mismatch_ux_enabled: false,
            biometrics_required_for_transactions: false,
        }
    }
}

impl SigningAdapterConfig {
    /// Reads `DAPP_REQUESTS_*` variables; invalid values are logged and
    /// replaced by defaults.
    pub fn from_env() -> Self {
        match Self::try_from_env() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "invalid dapp-requests environment, using defaults");
                Self::default()
            }
        }
    }

    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("DAPP_REQUESTS_PROFILE") {
            cfg.runtime_profile = match v.trim().to_ascii_lowercase().as_str() {
                "development" | "dev" => RuntimeProfile::Development,
                "production" | "prod" => RuntimeProfile::Production,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DAPP_REQUESTS_PROFILE",
                        value: v,
                    })
                }
            };
        }
        cfg.wc_relay_url = non_empty(lookup("DAPP_REQUESTS_WC_RELAY_URL"));
        cfg.analytics_endpoint = non_empty(lookup("DAPP_REQUESTS_ANALYTICS_URL"));
        if let Some(v) = lookup("DAPP_REQUESTS_WC_VERSION") {
            cfg.wc_version = v;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_HTTP_TIMEOUT_MS") {
            cfg.http_timeout_ms = parse_num("DAPP_REQUESTS_HTTP_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_JOB_QUEUE_CAPACITY") {
            cfg.job_queue_capacity = parse_num("DAPP_REQUESTS_JOB_QUEUE_CAPACITY", v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_PUBLIC_RPC_URLS") {
            cfg.public_rpc_urls = parse_rpc_map("DAPP_REQUESTS_PUBLIC_RPC_URLS", &v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_PRIVATE_RPC_URLS") {
            cfg.private_rpc_urls = parse_rpc_map("DAPP_REQUESTS_PRIVATE_RPC_URLS", &v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_PRIVATE_RPC_ENABLED") {
            cfg.private_rpc_enabled = parse_flag("DAPP_REQUESTS_PRIVATE_RPC_ENABLED", v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_PRIVATE_RPC_CHAINS") {
            cfg.private_rpc_chains = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_num("DAPP_REQUESTS_PRIVATE_RPC_CHAINS", s.to_owned()))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_SUBMIT_VIA_PRIVATE_RPC") {
            cfg.submit_via_private_rpc = parse_flag("DAPP_REQUESTS_SUBMIT_VIA_PRIVATE_RPC", v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_PERMIT_MISMATCH_UX") {
            cfg.permit_mismatch_ux_enabled = parse_flag("DAPP_REQUESTS_PERMIT_MISMATCH_UX", v)?;
        }
        if let Some(v) = lookup("DAPP_REQUESTS_BIOMETRICS_FOR_TRANSACTIONS") {
            cfg.biometrics_required_for_transactions =
                parse_flag("DAPP_REQUESTS_BIOMETRICS_FOR_TRANSACTIONS", v)?;
        }
        Ok(cfg)
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            wc_version: self.wc_version.clone(),
            permit_mismatch_ux_enabled: self.permit_mismatch_ux_enabled,
            biometrics_required_for_transactions: self.biometrics_required_for_transactions,
        }
    }

    pub fn transaction_config(&self) -> TransactionConfigService {
        TransactionConfigService {
            private_rpc_enabled: self.private_rpc_enabled,
            private_rpc_chains: self.private_rpc_chains.clone(),
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            submit_via_private_rpc: self.submit_via_private_rpc,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

fn parse_num<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

/// `1=https://rpc.one,8453=https://rpc.base`
fn parse_rpc_map(key: &'static str, value: &str) -> Result<HashMap<u64, String>, ConfigError> {
    let mut out = HashMap::new();
    for entry in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (chain, url) = entry.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            key,
            value: entry.to_owned(),
        })?;
        let chain_id = parse_num(key, chain.to_owned())?;
        out.insert(chain_id, url.trim().to_owned());
    }
    Ok(out)
}
