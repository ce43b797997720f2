use std::sync::Arc;

use alloy::primitives::{Bytes, B256};
use tracing::{debug, info};

use crate::composer::{ComposeInput, TransactionServiceComposer};
use crate::domain::{
    DappRequestType, MessageJob, RequestMethod, SessionResponse, SigningJob, TransactionJob,
};
use crate::ports::{PortError, SessionResponderPort, SignerManagerPort};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerConfig {
    pub submit_via_private_rpc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReceipt {
    Submitted { tx_hash: B256 },
    Signed { signature: Bytes },
}

/// Consumer side of the signing job queue: executes one job and answers
/// the dApp session with its result.
pub struct SigningJobRunner<R>
where
    R: SessionResponderPort,
{
    pub composer: TransactionServiceComposer,
    pub signer_manager: Arc<dyn SignerManagerPort>,
    pub responder: R,
    pub config: RunnerConfig,
}

impl<R> SigningJobRunner<R>
where
    R: SessionResponderPort,
{
    pub fn new(
        composer: TransactionServiceComposer,
        signer_manager: Arc<dyn SignerManagerPort>,
        responder: R,
        config: RunnerConfig,
    ) -> Self {
        Self {
            composer,
            signer_manager,
            responder,
            config,
        }
    }

    pub fn run(&self, job: SigningJob) -> Result<JobReceipt, PortError> {
        debug!(
            session_id = job.session_id(),
            internal_id = job.internal_id(),
            "running signing job"
        );
        let receipt = match &job {
            SigningJob::Transaction(tx_job) => self.run_transaction(tx_job)?,
            SigningJob::Message(msg_job) => self.run_message(msg_job)?,
        };

        if job.dapp().request_type == DappRequestType::WalletConnectSessionRequest {
            let id: u64 = job.internal_id().parse().map_err(|e| {
                PortError::Validation(format!("invalid request id {}: {e}", job.internal_id()))
            })?;
            let result = match &receipt {
                JobReceipt::Submitted { tx_hash } => serde_json::json!(tx_hash),
                JobReceipt::Signed { signature } => serde_json::json!(signature),
            };
            self.responder
                .respond(&SessionResponse::result(job.session_id(), id, result))?;
        }
        info!(
            session_id = job.session_id(),
            internal_id = job.internal_id(),
            "signing job completed"
        );
        Ok(receipt)
    }

    fn run_transaction(&self, job: &TransactionJob) -> Result<JobReceipt, PortError> {
        let bundle = self.composer.compose(&ComposeInput {
            chain_id: job.chain_id,
            submit_via_private_rpc: self.config.submit_via_private_rpc,
            includes_delegation: job.method == RequestMethod::WalletSendCalls,
            account: job.account.address,
        })?;
        let tx_hash = bundle.service.submit(job.transaction.clone())?;
        Ok(JobReceipt::Submitted { tx_hash })
    }

    fn run_message(&self, job: &MessageJob) -> Result<JobReceipt, PortError> {
        let signature = self
            .signer_manager
            .sign_message(&job.account, &job.method, &job.message)?;
        Ok(JobReceipt::Signed { signature })
    }
}
