use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::domain::{
    DelegationStatus, OutcomeEvent, RequestMethod, SessionResponse, SignerAccount, SigningJob,
    SubmissionRecord, TransactionRequest,
};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Protocol session that answers the dApp (WalletConnect `respondSessionRequest`).
pub trait SessionResponderPort {
    fn has_session(&self, topic: &str) -> Result<bool, PortError>;
    fn respond(&self, response: &SessionResponse) -> Result<(), PortError>;
}

pub trait SigningJobQueuePort {
    fn enqueue(&self, job: SigningJob) -> Result<(), PortError>;
}

pub trait AnalyticsPort {
    fn record_outcome(&self, event: &OutcomeEvent) -> Result<(), PortError>;
    fn record_submission(&self, record: &SubmissionRecord) -> Result<(), PortError>;
}

pub trait SignerAccountRegistryPort {
    fn signer_accounts(&self) -> Result<Vec<SignerAccount>, PortError>;
}

/// Host application shell: the confirmation surface and deep-link state.
pub trait ShellPort {
    fn close_surface(&self, request_id: &str) -> Result<(), PortError>;
    fn did_open_from_deep_link(&self) -> Result<bool, PortError>;
    fn return_to_previous_app(&self) -> Result<(), PortError>;
    fn set_did_open_from_deep_link(&self, value: bool) -> Result<(), PortError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricOutcome {
    Authenticated,
    Failed,
    Cancelled,
}

pub trait BiometricPort {
    fn authenticate(&self) -> Result<BiometricOutcome, PortError>;
}

/// Chain RPC access. Used both as the signer's provider and as the
/// broadcast client.
pub trait ProviderPort: Send + Sync {
    fn chain_id(&self) -> Result<u64, PortError>;
    fn transaction_count(&self, address: Address) -> Result<u64, PortError>;
    fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, PortError>;
}

pub trait ProviderRegistryPort: Send + Sync {
    fn provider(&self, chain_id: u64) -> Result<Arc<dyn ProviderPort>, PortError>;
}

pub trait NetworkClientRegistryPort: Send + Sync {
    fn public_client(&self, chain_id: u64) -> Result<Arc<dyn ProviderPort>, PortError>;
    fn private_client(&self, chain_id: u64) -> Result<Arc<dyn ProviderPort>, PortError>;
}

pub trait DelegationRegistryPort: Send + Sync {
    fn delegation_status(
        &self,
        address: Address,
        chain_id: u64,
    ) -> Result<DelegationStatus, PortError>;
}

/// Key custody. Produces raw signed transactions and message signatures.
pub trait SignerManagerPort: Send + Sync {
    fn sign_transaction(
        &self,
        account: &SignerAccount,
        tx: &TransactionRequest,
    ) -> Result<Bytes, PortError>;
    fn sign_message(
        &self,
        account: &SignerAccount,
        method: &RequestMethod,
        message: &str,
    ) -> Result<Bytes, PortError>;
}

pub trait TransactionRepositoryPort: Send + Sync {
    fn record_submitted(
        &self,
        account: Address,
        tx_hash: B256,
        tx: &TransactionRequest,
    ) -> Result<(), PortError>;
    fn transactions_for(&self, account: Address) -> Result<Vec<B256>, PortError>;
}

impl<T: SignerAccountRegistryPort + ?Sized> SignerAccountRegistryPort for Arc<T> {
    fn signer_accounts(&self) -> Result<Vec<SignerAccount>, PortError> {
        (**self).signer_accounts()
    }
}

impl<T: AnalyticsPort + ?Sized> AnalyticsPort for Arc<T> {
    fn record_outcome(&self, event: &OutcomeEvent) -> Result<(), PortError> {
        (**self).record_outcome(event)
    }

    fn record_submission(&self, record: &SubmissionRecord) -> Result<(), PortError> {
        (**self).record_submission(record)
    }
}

impl<T: SessionResponderPort + ?Sized> SessionResponderPort for Arc<T> {
    fn has_session(&self, topic: &str) -> Result<bool, PortError> {
        (**self).has_session(topic)
    }

    fn respond(&self, response: &SessionResponse) -> Result<(), PortError> {
        (**self).respond(response)
    }
}
