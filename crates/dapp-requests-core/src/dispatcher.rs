use alloy::primitives::Address;
use tracing::{debug, info, warn};

use crate::confirmability::{evaluate, ConfirmabilityInputs, NotConfirmable};
use crate::domain::{
    JsonRpcError, LiveConditions, MessageJob, Outcome, OutcomeEvent, RequestDescriptor,
    RequestMethod, SessionResponse, SignerAccount, SigningJob, TransactionJob,
    TransactionRequest,
};
use crate::eligibility::{is_eligible, surface_for_eligible, RequestSurface};
use crate::gas::{format_with_gas_estimates, has_sufficient_funds};
use crate::ports::{
    AnalyticsPort, BiometricOutcome, BiometricPort, PortError, SessionResponderPort, ShellPort,
    SignerAccountRegistryPort, SigningJobQueuePort,
};
use crate::state_machine::{request_transition, RequestAction, RequestPhase, StateTransition};

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub wc_version: String,
    pub permit_mismatch_ux_enabled: bool,
    pub biometrics_required_for_transactions: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            wc_version: "2".to_owned(),
            permit_mismatch_ux_enabled: false,
            biometrics_required_for_transactions: false,
        }
    }
}

/// Handling state for one request. Only `OutcomeDispatcher::open` creates
/// it, and only for eligible requests. Not `Clone`: the phase must live in
/// exactly one place.
#[derive(Debug)]
pub struct RequestHandle {
    descriptor: RequestDescriptor,
    phase: RequestPhase,
    transitions: Vec<StateTransition>,
}

impl RequestHandle {
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    AlreadySettled,
    SurfaceForbidsConfirm,
    NotConfirmable(NotConfirmable),
    BiometricNotPassed(BiometricOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Dispatched {
        outcome: Outcome,
        transition: StateTransition,
    },
    Ignored(IgnoreReason),
}

impl DispatchResult {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Dispatched { outcome, .. } => Some(*outcome),
            Self::Ignored(_) => None,
        }
    }
}

pub struct OutcomeDispatcher<R, J, A, S, N, B>
where
    R: SessionResponderPort,
    J: SigningJobQueuePort,
    A: AnalyticsPort,
    S: SignerAccountRegistryPort,
    N: ShellPort,
    B: BiometricPort,
{
    pub responder: R,
    pub jobs: J,
    pub analytics: A,
    pub accounts: S,
    pub shell: N,
    pub biometrics: B,
    pub config: DispatcherConfig,
}

impl<R, J, A, S, N, B> OutcomeDispatcher<R, J, A, S, N, B>
where
    R: SessionResponderPort,
    J: SigningJobQueuePort,
    A: AnalyticsPort,
    S: SignerAccountRegistryPort,
    N: ShellPort,
    B: BiometricPort,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        responder: R,
        jobs: J,
        analytics: A,
        accounts: S,
        shell: N,
        biometrics: B,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            responder,
            jobs,
            analytics,
            accounts,
            shell,
            biometrics,
            config,
        }
    }

    pub fn open(&self, descriptor: RequestDescriptor) -> Option<RequestHandle> {
        if !is_eligible(&descriptor) {
            debug!(
                session_id = %descriptor.session_id,
                internal_id = %descriptor.internal_id,
                method = %descriptor.method,
                "ignoring unsupported dapp request"
            );
            return None;
        }
        Some(RequestHandle {
            descriptor,
            phase: RequestPhase::Pending,
            transitions: Vec::new(),
        })
    }

    pub fn surface(&self, handle: &RequestHandle, conditions: &LiveConditions) -> RequestSurface {
        surface_for_eligible(
            &handle.descriptor,
            self.config.permit_mismatch_ux_enabled,
            conditions.has_account_mismatch,
        )
    }

    pub fn evaluate(
        &self,
        handle: &RequestHandle,
        conditions: &LiveConditions,
    ) -> Result<(), NotConfirmable> {
        let signer = self.resolve_signer(handle.descriptor.account);
        let tx = handle.descriptor.transaction();
        self.evaluate_with(handle, conditions, signer.as_ref(), tx.as_ref())
    }

    /// Confirm entry point for the UI: runs the biometric gate first when
    /// the platform requires it.
    pub fn confirm_press(
        &self,
        handle: &mut RequestHandle,
        conditions: &LiveConditions,
    ) -> Result<DispatchResult, PortError> {
        if handle.phase.is_settled() {
            return Ok(DispatchResult::Ignored(IgnoreReason::AlreadySettled));
        }
        if self.config.biometrics_required_for_transactions {
            let verdict = self.biometrics.authenticate()?;
            if verdict != BiometricOutcome::Authenticated {
                debug!(
                    internal_id = %handle.descriptor.internal_id,
                    ?verdict,
                    "biometric gate not passed"
                );
                return Ok(DispatchResult::Ignored(IgnoreReason::BiometricNotPassed(
                    verdict,
                )));
            }
        }
        self.confirm(handle, conditions)
    }

    pub fn confirm(
        &self,
        handle: &mut RequestHandle,
        conditions: &LiveConditions,
    ) -> Result<DispatchResult, PortError> {
        if handle.phase.is_settled() {
            return Ok(DispatchResult::Ignored(IgnoreReason::AlreadySettled));
        }
        if !self.surface(handle, conditions).allows_confirm() {
            return Ok(DispatchResult::Ignored(IgnoreReason::SurfaceForbidsConfirm));
        }

        let signer = self.resolve_signer(handle.descriptor.account);
        let tx = handle.descriptor.transaction();
        if let Err(reason) = self.evaluate_with(handle, conditions, signer.as_ref(), tx.as_ref()) {
            return Ok(DispatchResult::Ignored(IgnoreReason::NotConfirmable(reason)));
        }
        let Some(account) = signer else {
            return Ok(DispatchResult::Ignored(IgnoreReason::NotConfirmable(
                NotConfirmable::NoMatchingSigner,
            )));
        };

        let request = &handle.descriptor;
        let job = if request.method.costs_gas() {
            let Some(tx) = tx else {
                return Ok(DispatchResult::Ignored(IgnoreReason::NotConfirmable(
                    NotConfirmable::MissingTransaction,
                )));
            };
            let method = if request.method.is_batched() {
                RequestMethod::WalletSendCalls
            } else {
                RequestMethod::EthSendTransaction
            };
            SigningJob::Transaction(TransactionJob {
                session_id: request.session_id.clone(),
                internal_id: request.internal_id.clone(),
                method,
                transaction: format_with_gas_estimates(&tx, &conditions.gas_fee),
                account,
                dapp: request.dapp.clone(),
                chain_id: request.chain_id,
                request: request.clone(),
            })
        } else {
            let message = request.message().ok_or_else(|| {
                PortError::Validation(format!(
                    "{} request {} carries no message",
                    request.method, request.internal_id
                ))
            })?;
            SigningJob::Message(MessageJob {
                session_id: request.session_id.clone(),
                internal_id: request.internal_id.clone(),
                method: request.method.clone(),
                message,
                account,
                dapp: request.dapp.clone(),
                chain_id: request.chain_id,
            })
        };

        self.jobs.enqueue(job)?;
        self.settle(handle, RequestAction::Confirm, Outcome::Confirm)
    }

    pub fn reject(&self, handle: &mut RequestHandle) -> Result<DispatchResult, PortError> {
        self.reject_with(handle, RequestAction::Reject)
    }

    /// Closing a pending request rejects it; closing a settled one is a no-op.
    pub fn close(&self, handle: &mut RequestHandle) -> Result<DispatchResult, PortError> {
        self.reject_with(handle, RequestAction::Dismiss)
    }

    fn reject_with(
        &self,
        handle: &mut RequestHandle,
        action: RequestAction,
    ) -> Result<DispatchResult, PortError> {
        if handle.phase.is_settled() {
            return Ok(DispatchResult::Ignored(IgnoreReason::AlreadySettled));
        }
        self.send_user_rejection(&handle.descriptor);
        self.settle(handle, action, Outcome::Reject)
    }

    fn evaluate_with(
        &self,
        handle: &RequestHandle,
        conditions: &LiveConditions,
        signer: Option<&SignerAccount>,
        tx: Option<&TransactionRequest>,
    ) -> Result<(), NotConfirmable> {
        let request = &handle.descriptor;
        let funds_ok = has_sufficient_funds(
            conditions.native_balance,
            tx.and_then(|t| t.value),
            conditions.gas_fee.value,
        );
        evaluate(&ConfirmabilityInputs {
            internet_reachable: conditions.internet_reachable,
            link_mode_supported: request.is_link_mode_supported,
            signer_account: signer,
            sender_block: conditions.sender_block,
            recipient_block: conditions.recipient_block,
            method: &request.method,
            transaction: tx,
            gas_fee: &conditions.gas_fee,
            has_sufficient_funds: funds_ok,
        })
    }

    fn resolve_signer(&self, address: Address) -> Option<SignerAccount> {
        match self.accounts.signer_accounts() {
            Ok(accounts) => accounts.into_iter().find(|a| a.address == address),
            Err(e) => {
                warn!(%address, error = %e, "signer account lookup failed");
                None
            }
        }
    }

    fn send_user_rejection(&self, request: &RequestDescriptor) {
        if !request.is_wallet_connect() {
            return;
        }
        match self.responder.has_session(&request.session_id) {
            Ok(true) => {}
            Ok(false) => {
                debug!(session_id = %request.session_id, "session closed, skipping rejection");
                return;
            }
            Err(e) => {
                warn!(session_id = %request.session_id, error = %e, "session lookup failed");
                return;
            }
        }
        let id = match request.rpc_id() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "cannot answer request without numeric id");
                return;
            }
        };
        let response =
            SessionResponse::error(request.session_id.clone(), id, JsonRpcError::user_rejected());
        if let Err(e) = self.responder.respond(&response) {
            warn!(session_id = %request.session_id, id, error = %e, "rejection response failed");
        }
    }

    fn settle(
        &self,
        handle: &mut RequestHandle,
        action: RequestAction,
        outcome: Outcome,
    ) -> Result<DispatchResult, PortError> {
        let (phase, transition) = request_transition(handle.phase, action)?;
        handle.phase = phase;
        handle.transitions.push(transition.clone());

        let request = &handle.descriptor;
        let event = self.outcome_event(request, outcome);
        if let Err(e) = self.analytics.record_outcome(&event) {
            warn!(internal_id = %request.internal_id, error = %e, "outcome analytics failed");
        }
        if let Err(e) = self.shell.close_surface(&request.internal_id) {
            warn!(internal_id = %request.internal_id, error = %e, "closing surface failed");
        }
        self.return_to_origin();

        info!(
            session_id = %request.session_id,
            internal_id = %request.internal_id,
            method = %request.method,
            ?outcome,
            reason = transition.reason,
            "dapp request settled"
        );
        Ok(DispatchResult::Dispatched {
            outcome,
            transition,
        })
    }

    fn outcome_event(&self, request: &RequestDescriptor, outcome: Outcome) -> OutcomeEvent {
        OutcomeEvent {
            request_type: request.method.family().event_type().to_owned(),
            eth_method: request.method.rpc_name().to_owned(),
            dapp_url: request.dapp.url.clone(),
            dapp_name: request.dapp.name.clone(),
            wc_version: self.config.wc_version.clone(),
            chain_id: request.chain_id,
            outcome,
        }
    }

    fn return_to_origin(&self) {
        match self.shell.did_open_from_deep_link() {
            Ok(true) => {
                if let Err(e) = self.shell.return_to_previous_app() {
                    warn!(error = %e, "returning to previous app failed");
                }
                if let Err(e) = self.shell.set_did_open_from_deep_link(false) {
                    warn!(error = %e, "clearing deep link flag failed");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "deep link flag unavailable"),
        }
    }
}
