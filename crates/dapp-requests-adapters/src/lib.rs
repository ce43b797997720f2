pub mod accounts;
pub mod analytics;
pub mod config;
pub mod delegation;
pub mod logging;
pub mod network;
pub mod queue;
pub mod runtime;
pub mod shell;
pub mod signer;
pub mod wc;

pub use accounts::SignerAccountsAdapter;
pub use analytics::AnalyticsAdapter;
pub use config::{ConfigError, RuntimeProfile, SigningAdapterConfig};
pub use delegation::DelegationAdapter;
pub use logging::init_tracing;
pub use network::{Broadcast, JsonRpcClient, NetworkAdapter};
pub use queue::JobQueueAdapter;
pub use runtime::{RequestDispatcher, RequestRunner, RequestRuntime, RuntimeAdapters};
pub use shell::{BiometricAdapter, ShellAdapter};
pub use signer::{SignerManagerAdapter, TransactionRepositoryAdapter};
pub use wc::WalletConnectAdapter;
