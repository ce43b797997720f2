//! Wiring of the dispatcher and job runner onto the bundled adapters.
//! This is the boundary a host shell talks to.

use std::sync::Arc;

use dapp_requests_core::{
    ComposerDependencies, JobReceipt, OutcomeDispatcher, PortError, SigningJobRunner,
    TransactionServiceComposer,
};

use crate::{
    AnalyticsAdapter, BiometricAdapter, DelegationAdapter, JobQueueAdapter, NetworkAdapter,
    ShellAdapter, SignerAccountsAdapter, SignerManagerAdapter, SigningAdapterConfig,
    TransactionRepositoryAdapter, WalletConnectAdapter,
};

pub type RequestDispatcher = OutcomeDispatcher<
    WalletConnectAdapter,
    JobQueueAdapter,
    AnalyticsAdapter,
    SignerAccountsAdapter,
    ShellAdapter,
    BiometricAdapter,
>;

pub type RequestRunner = SigningJobRunner<WalletConnectAdapter>;

/// Adapter handles. Clones share state, so the runtime and its caller see
/// the same sessions, queue and records.
#[derive(Debug, Clone)]
pub struct RuntimeAdapters {
    pub walletconnect: WalletConnectAdapter,
    pub jobs: JobQueueAdapter,
    pub analytics: AnalyticsAdapter,
    pub accounts: SignerAccountsAdapter,
    pub shell: ShellAdapter,
    pub biometrics: BiometricAdapter,
    pub network: NetworkAdapter,
    pub delegation: DelegationAdapter,
    pub signer_manager: SignerManagerAdapter,
    pub repository: TransactionRepositoryAdapter,
}

impl RuntimeAdapters {
    pub fn from_config(config: &SigningAdapterConfig, chains: impl IntoIterator<Item = u64>) -> Self {
        Self {
            walletconnect: WalletConnectAdapter::with_config(config),
            jobs: JobQueueAdapter::with_capacity(config.job_queue_capacity),
            analytics: AnalyticsAdapter::with_config(config),
            accounts: SignerAccountsAdapter::default(),
            shell: ShellAdapter::default(),
            biometrics: BiometricAdapter::default(),
            network: NetworkAdapter::new(chains, config),
            delegation: DelegationAdapter::default(),
            signer_manager: SignerManagerAdapter::default(),
            repository: TransactionRepositoryAdapter::default(),
        }
    }
}

pub struct RequestRuntime {
    pub dispatcher: RequestDispatcher,
    pub runner: RequestRunner,
    pub adapters: RuntimeAdapters,
}

impl RequestRuntime {
    pub fn new(config: &SigningAdapterConfig, adapters: RuntimeAdapters) -> Self {
        let dispatcher = OutcomeDispatcher::new(
            adapters.walletconnect.clone(),
            adapters.jobs.clone(),
            adapters.analytics.clone(),
            adapters.accounts.clone(),
            adapters.shell.clone(),
            adapters.biometrics.clone(),
            config.dispatcher_config(),
        );

        let signer_manager = Arc::new(adapters.signer_manager.clone());
        let composer = TransactionServiceComposer::new(ComposerDependencies {
            accounts: Arc::new(adapters.accounts.clone()),
            providers: Arc::new(adapters.network.clone()),
            network_clients: Arc::new(adapters.network.clone()),
            delegation: Arc::new(adapters.delegation.clone()),
            signer_manager: signer_manager.clone(),
            repository: Arc::new(adapters.repository.clone()),
            analytics: Arc::new(adapters.analytics.clone()),
            config: config.transaction_config(),
        });
        let runner = SigningJobRunner::new(
            composer,
            signer_manager,
            adapters.walletconnect.clone(),
            config.runner_config(),
        );

        Self {
            dispatcher,
            runner,
            adapters,
        }
    }

    /// Runs every queued job in FIFO order. A failing job does not stop the
    /// ones behind it.
    pub fn drain_jobs(&self) -> Result<Vec<Result<JobReceipt, PortError>>, PortError> {
        let mut results = Vec::new();
        while let Some(job) = self.adapters.jobs.pop()? {
            let internal_id = job.internal_id().to_owned();
            let result = self.runner.run(job);
            if let Err(ref e) = result {
                tracing::warn!(%internal_id, error = %e, "signing job failed");
            }
            results.push(result);
        }
        Ok(results)
    }
}
