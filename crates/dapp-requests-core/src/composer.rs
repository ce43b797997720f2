//! Per-request assembly of the signer and transaction service that execute
//! a confirmed transaction.
//!
//! Everything built here is owned by a single submission attempt. Accessors
//! are lazy: composing a bundle performs no chain reads beyond resolving
//! the signer account.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use tracing::{debug, info};

use crate::domain::{
    DelegationAuthorization, DelegationStatus, SignerAccount, SubmissionRecord, SubmissionRoute,
    TransactionRequest,
};
use crate::ports::{
    AnalyticsPort, DelegationRegistryPort, NetworkClientRegistryPort, PortError, ProviderPort,
    ProviderRegistryPort, SignerAccountRegistryPort, SignerManagerPort, TransactionRepositoryPort,
};

pub type Accessor<T> = Arc<dyn Fn() -> Result<T, PortError> + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct TransactionConfigService {
    pub private_rpc_enabled: bool,
    pub private_rpc_chains: Vec<u64>,
}

impl TransactionConfigService {
    pub fn should_use_private_rpc(&self, chain_id: u64, submit_via_private_rpc: bool) -> bool {
        submit_via_private_rpc
            && self.private_rpc_enabled
            && self.private_rpc_chains.contains(&chain_id)
    }
}

pub trait TransactionSigner: Send + Sync {
    fn account(&self) -> &SignerAccount;

    /// Final form of the transaction that will be signed.
    fn prepare(&self, tx: TransactionRequest) -> Result<TransactionRequest, PortError>;

    fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Bytes, PortError>;

    fn includes_delegation(&self) -> bool {
        false
    }
}

pub struct PlainTransactionSigner {
    account: SignerAccount,
    get_provider: Accessor<Arc<dyn ProviderPort>>,
    signer_manager: Arc<dyn SignerManagerPort>,
}

impl PlainTransactionSigner {
    pub fn new(
        account: SignerAccount,
        get_provider: Accessor<Arc<dyn ProviderPort>>,
        signer_manager: Arc<dyn SignerManagerPort>,
    ) -> Self {
        Self {
            account,
            get_provider,
            signer_manager,
        }
    }
}

impl TransactionSigner for PlainTransactionSigner {
    fn account(&self) -> &SignerAccount {
        &self.account
    }

    fn prepare(&self, mut tx: TransactionRequest) -> Result<TransactionRequest, PortError> {
        tx.from = Some(self.account.address);
        if tx.nonce.is_none() {
            let provider = (self.get_provider)()?;
            tx.nonce = Some(provider.transaction_count(self.account.address)?);
        }
        Ok(tx)
    }

    fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Bytes, PortError> {
        self.signer_manager.sign_transaction(&self.account, tx)
    }
}

/// Signer that bundles an EIP-7702 delegation with the transaction when
/// the account is not yet delegated to the expected contract.
pub struct DelegationTransactionSigner {
    account: SignerAccount,
    get_provider: Accessor<Arc<dyn ProviderPort>>,
    get_network_client: Accessor<Arc<dyn ProviderPort>>,
    get_delegation_info: Accessor<DelegationStatus>,
    signer_manager: Arc<dyn SignerManagerPort>,
}

impl DelegationTransactionSigner {
    pub fn new(
        account: SignerAccount,
        get_provider: Accessor<Arc<dyn ProviderPort>>,
        get_network_client: Accessor<Arc<dyn ProviderPort>>,
        get_delegation_info: Accessor<DelegationStatus>,
        signer_manager: Arc<dyn SignerManagerPort>,
    ) -> Self {
        Self {
            account,
            get_provider,
            get_network_client,
            get_delegation_info,
            signer_manager,
        }
    }
}

impl TransactionSigner for DelegationTransactionSigner {
    fn account(&self) -> &SignerAccount {
        &self.account
    }

    fn prepare(&self, mut tx: TransactionRequest) -> Result<TransactionRequest, PortError> {
        tx.from = Some(self.account.address);
        let status = (self.get_delegation_info)()?;
        if !status.needs_delegation {
            if tx.nonce.is_none() {
                let provider = (self.get_provider)()?;
                tx.nonce = Some(provider.transaction_count(self.account.address)?);
            }
            return Ok(tx);
        }

        let contract = status.contract_address.ok_or_else(|| {
            PortError::Validation("delegation required but no contract address".to_owned())
        })?;
        let chain_id = tx
            .chain_id
            .ok_or_else(|| PortError::Validation("delegation requires chain id".to_owned()))?;
        let client = (self.get_network_client)()?;
        let nonce = client.transaction_count(self.account.address)?;
        // Self-sponsored 7702: the authorization consumes the nonce after the tx.
        tx.nonce = Some(nonce);
        tx.authorization_list = vec![DelegationAuthorization {
            chain_id,
            address: contract,
            nonce: nonce.saturating_add(1),
        }];
        debug!(
            account = %self.account.address,
            %contract,
            chain_id,
            "bundling delegation authorization"
        );
        Ok(tx)
    }

    fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Bytes, PortError> {
        self.signer_manager.sign_transaction(&self.account, tx)
    }

    fn includes_delegation(&self) -> bool {
        true
    }
}

pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryPort>,
    signer: Arc<dyn TransactionSigner>,
    config: TransactionConfigService,
    analytics: Arc<dyn AnalyticsPort + Send + Sync>,
    get_provider: Accessor<Arc<dyn ProviderPort>>,
    get_network_client: Accessor<Arc<dyn ProviderPort>>,
    chain_id: u64,
    submit_via_private_rpc: bool,
}

impl TransactionService {
    pub fn signer(&self) -> &Arc<dyn TransactionSigner> {
        &self.signer
    }

    pub fn route(&self) -> SubmissionRoute {
        if self
            .config
            .should_use_private_rpc(self.chain_id, self.submit_via_private_rpc)
        {
            SubmissionRoute::Private
        } else {
            SubmissionRoute::Public
        }
    }

    pub fn submit(&self, tx: TransactionRequest) -> Result<B256, PortError> {
        let provider = (self.get_provider)()?;
        let provider_chain = provider.chain_id()?;
        if provider_chain != self.chain_id {
            return Err(PortError::Policy(format!(
                "CHAIN_MISMATCH: expected {}, got {}",
                self.chain_id, provider_chain
            )));
        }

        let tx = TransactionRequest {
            chain_id: Some(self.chain_id),
            ..tx
        };
        let prepared = self.signer.prepare(tx)?;
        let raw = self.signer.sign_transaction(&prepared)?;
        let client = (self.get_network_client)()?;
        let tx_hash = client.send_raw_transaction(&raw)?;

        let account = self.signer.account().address;
        self.repository
            .record_submitted(account, tx_hash, &prepared)?;
        let record = SubmissionRecord {
            chain_id: self.chain_id,
            account,
            tx_hash,
            route: self.route(),
            includes_delegation: self.signer.includes_delegation(),
        };
        if let Err(e) = self.analytics.record_submission(&record) {
            tracing::warn!(%tx_hash, error = %e, "submission analytics failed");
        }
        info!(%tx_hash, %account, chain_id = self.chain_id, route = ?record.route, "transaction submitted");
        Ok(tx_hash)
    }
}

pub struct TransactionServiceBundle {
    pub signer: Arc<dyn TransactionSigner>,
    pub service: TransactionService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeInput {
    pub chain_id: u64,
    pub submit_via_private_rpc: bool,
    pub includes_delegation: bool,
    pub account: Address,
}

/// Collaborators injected into the composer.
#[derive(Clone)]
pub struct ComposerDependencies {
    pub accounts: Arc<dyn SignerAccountRegistryPort + Send + Sync>,
    pub providers: Arc<dyn ProviderRegistryPort>,
    pub network_clients: Arc<dyn NetworkClientRegistryPort>,
    pub delegation: Arc<dyn DelegationRegistryPort>,
    pub signer_manager: Arc<dyn SignerManagerPort>,
    pub repository: Arc<dyn TransactionRepositoryPort>,
    pub analytics: Arc<dyn AnalyticsPort + Send + Sync>,
    pub config: TransactionConfigService,
}

pub struct TransactionServiceComposer {
    deps: ComposerDependencies,
}

impl TransactionServiceComposer {
    pub fn new(deps: ComposerDependencies) -> Self {
        Self { deps }
    }

    pub fn compose(&self, input: &ComposeInput) -> Result<TransactionServiceBundle, PortError> {
        let account = self
            .deps
            .accounts
            .signer_accounts()?
            .into_iter()
            .find(|a| a.address == input.account)
            .ok_or_else(|| {
                PortError::NotFound(format!("active account not found: {}", input.account))
            })?;

        let chain_id = input.chain_id;

        let providers = Arc::clone(&self.deps.providers);
        let get_provider: Accessor<Arc<dyn ProviderPort>> =
            Arc::new(move || providers.provider(chain_id));

        let config = self.deps.config.clone();
        let use_private = config.should_use_private_rpc(chain_id, input.submit_via_private_rpc);
        let clients = Arc::clone(&self.deps.network_clients);
        let get_network_client: Accessor<Arc<dyn ProviderPort>> = Arc::new(move || {
            if use_private {
                clients.private_client(chain_id)
            } else {
                clients.public_client(chain_id)
            }
        });

        let delegation = Arc::clone(&self.deps.delegation);
        let delegated_address = account.address;
        let get_delegation_info: Accessor<DelegationStatus> =
            Arc::new(move || delegation.delegation_status(delegated_address, chain_id));

        let signer: Arc<dyn TransactionSigner> = if input.includes_delegation {
            Arc::new(DelegationTransactionSigner::new(
                account.clone(),
                Arc::clone(&get_provider),
                Arc::clone(&get_network_client),
                get_delegation_info,
                Arc::clone(&self.deps.signer_manager),
            ))
        } else {
            Arc::new(PlainTransactionSigner::new(
                account.clone(),
                Arc::clone(&get_provider),
                Arc::clone(&self.deps.signer_manager),
            ))
        };

        let service = TransactionService {
            repository: Arc::clone(&self.deps.repository),
            signer: Arc::clone(&signer),
            config,
            analytics: Arc::clone(&self.deps.analytics),
            get_provider,
            get_network_client,
            chain_id,
            submit_via_private_rpc: input.submit_via_private_rpc,
        };

        debug!(
            account = %account.address,
            chain_id,
            private_rpc = use_private,
            delegation = input.includes_delegation,
            "composed transaction services"
        );
        Ok(TransactionServiceBundle { signer, service })
    }
}
