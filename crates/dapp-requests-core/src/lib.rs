pub mod composer;
pub mod confirmability;
pub mod dispatcher;
pub mod domain;
pub mod eligibility;
pub mod gas;
pub mod ports;
pub mod runner;
pub mod state_machine;

pub use composer::{
    Accessor, ComposeInput, ComposerDependencies, DelegationTransactionSigner,
    PlainTransactionSigner, TransactionConfigService, TransactionService,
    TransactionServiceBundle, TransactionServiceComposer, TransactionSigner,
};
pub use confirmability::{evaluate, is_confirmable, ConfirmabilityInputs, NotConfirmable};
pub use dispatcher::{
    DispatchResult, DispatcherConfig, IgnoreReason, OutcomeDispatcher, RequestHandle,
};
pub use domain::{
    BatchedCall, BlockStatus, DappRequestInfo, DappRequestType, DelegationAuthorization,
    DelegationStatus, GasFeeParams, GasFeeResult, JsonRpcBody, JsonRpcError, JsonRpcResponse,
    LiveConditions, MessageJob, MethodFamily, Outcome, OutcomeEvent, RequestDescriptor,
    RequestMethod, RequestPayload, SessionResponse, SignerAccount, SigningJob, SubmissionRecord,
    SubmissionRoute, TransactionJob, TransactionRequest,
};
pub use eligibility::{is_eligible, select_surface, ConfirmLabel, RequestSurface};
pub use gas::{format_with_gas_estimates, has_sufficient_funds};
pub use ports::{
    AnalyticsPort, BiometricOutcome, BiometricPort, DelegationRegistryPort,
    NetworkClientRegistryPort, PortError, ProviderPort, ProviderRegistryPort,
    SessionResponderPort, ShellPort, SignerAccountRegistryPort, SignerManagerPort,
    SigningJobQueuePort, TransactionRepositoryPort,
};
pub use runner::{JobReceipt, RunnerConfig, SigningJobRunner};
pub use state_machine::{request_transition, RequestAction, RequestPhase, StateTransition};
