use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

/// JSON-RPC method carried by a dApp request.
///
/// Unsupported methods are kept as `Other` so the eligibility filter can
/// decide on them instead of failing at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestMethod {
    PersonalSign,
    SignTypedData,
    SignTypedDataV4,
    EthSign,
    EthSendTransaction,
    WalletSendCalls,
    Erc20Send,
    Other(String),
}

impl RequestMethod {
    pub fn rpc_name(&self) -> &str {
        match self {
            Self::PersonalSign => "personal_sign",
            Self::SignTypedData => "eth_signTypedData",
            Self::SignTypedDataV4 => "eth_signTypedData_v4",
            Self::EthSign => "eth_sign",
            Self::EthSendTransaction => "eth_sendTransaction",
            Self::WalletSendCalls => "wallet_sendCalls",
            Self::Erc20Send => "erc20_send",
            Self::Other(name) => name,
        }
    }

    pub fn from_rpc_name(name: &str) -> Self {
        match name {
            "personal_sign" => Self::PersonalSign,
            "eth_signTypedData" => Self::SignTypedData,
            "eth_signTypedData_v4" => Self::SignTypedDataV4,
            "eth_sign" => Self::EthSign,
            "eth_sendTransaction" => Self::EthSendTransaction,
            "wallet_sendCalls" => Self::WalletSendCalls,
            "erc20_send" => Self::Erc20Send,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Methods whose confirmation spends gas on the user's behalf.
    pub fn costs_gas(&self) -> bool {
        matches!(
            self,
            Self::EthSendTransaction | Self::Erc20Send | Self::WalletSendCalls
        )
    }

    /// Single-transaction requests (batched calls are tracked separately).
    pub fn is_transaction(&self) -> bool {
        matches!(self, Self::EthSendTransaction | Self::Erc20Send)
    }

    pub fn is_batched(&self) -> bool {
        matches!(self, Self::WalletSendCalls)
    }

    pub fn is_typed_data(&self) -> bool {
        matches!(self, Self::SignTypedData | Self::SignTypedDataV4)
    }

    /// Analytics family. Batched calls cost gas but are reported with
    /// message requests.
    pub fn family(&self) -> MethodFamily {
        if self.is_transaction() {
            MethodFamily::Transaction
        } else {
            MethodFamily::Message
        }
    }
}

impl From<String> for RequestMethod {
    fn from(value: String) -> Self {
        Self::from_rpc_name(&value)
    }
}

impl From<RequestMethod> for String {
    fn from(value: RequestMethod) -> Self {
        value.rpc_name().to_owned()
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rpc_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodFamily {
    Transaction,
    Message,
}

impl MethodFamily {
    /// Analytics tag for the request kind.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Transaction => "transaction_request",
            Self::Message => "sign_request",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DappRequestType {
    WalletConnectSessionRequest,
    UwULinkRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappRequestInfo {
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub request_type: DappRequestType,
}

/// EIP-7702 authorization attached when a transaction also installs a delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationAuthorization {
    pub chain_id: u64,
    pub address: Address,
    pub nonce: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorization_list: Vec<DelegationAuthorization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchedCall {
    pub to: Address,
    #[serde(default)]
    pub value: Option<U256>,
    #[serde(default)]
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestPayload {
    Transaction(TransactionRequest),
    BatchedCalls {
        calls: Vec<BatchedCall>,
        encoded_transaction: TransactionRequest,
    },
    Message {
        /// Decoded or structured form (typed data JSON), when available.
        message: Option<String>,
        raw_message: String,
    },
}

/// One pending request from a connected dApp. Read-only for the
/// lifetime of the interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub session_id: String,
    pub internal_id: String,
    pub method: RequestMethod,
    pub account: Address,
    pub chain_id: u64,
    pub payload: RequestPayload,
    pub dapp: DappRequestInfo,
    pub is_link_mode_supported: bool,
}

impl RequestDescriptor {
    /// The transaction this request would submit, bound to the request chain.
    pub fn transaction(&self) -> Option<TransactionRequest> {
        let tx = match &self.payload {
            RequestPayload::Transaction(tx) if self.method.is_transaction() => tx,
            RequestPayload::BatchedCalls {
                encoded_transaction,
                ..
            } if self.method.is_batched() => encoded_transaction,
            _ => return None,
        };
        Some(TransactionRequest {
            chain_id: Some(self.chain_id),
            ..tx.clone()
        })
    }

    /// Message to sign; the structured form wins over the raw one.
    pub fn message(&self) -> Option<String> {
        match &self.payload {
            RequestPayload::Message {
                message,
                raw_message,
            } => Some(
                message
                    .as_ref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(raw_message)
                    .clone(),
            ),
            _ => None,
        }
    }

    /// Protocol-level JSON-RPC id.
    pub fn rpc_id(&self) -> Result<u64, PortError> {
        self.internal_id.parse().map_err(|e| {
            PortError::Validation(format!("invalid request id {}: {e}", self.internal_id))
        })
    }

    pub fn is_wallet_connect(&self) -> bool {
        self.dapp.request_type == DappRequestType::WalletConnectSessionRequest
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerAccount {
    pub address: Address,
    pub name: Option<String>,
    pub derivation_index: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatus {
    pub is_blocked: bool,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GasFeeParams {
    Eip1559 {
        gas_limit: U256,
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
    Legacy {
        gas_limit: U256,
        gas_price: U256,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasFeeResult {
    /// Total fee in wei.
    pub value: Option<U256>,
    pub params: Option<GasFeeParams>,
    pub error: Option<String>,
    pub is_loading: bool,
}

/// Live reads the confirmation screen depends on. Each one may still be
/// loading; loading states keep the request unconfirmable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveConditions {
    pub internet_reachable: bool,
    pub sender_block: BlockStatus,
    pub recipient_block: BlockStatus,
    pub gas_fee: GasFeeResult,
    pub native_balance: Option<U256>,
    pub has_account_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Confirm,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub request_type: String,
    pub eth_method: String,
    pub dapp_url: String,
    pub dapp_name: String,
    pub wc_version: String,
    pub chain_id: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionJob {
    pub session_id: String,
    pub internal_id: String,
    pub method: RequestMethod,
    pub transaction: TransactionRequest,
    pub account: SignerAccount,
    pub dapp: DappRequestInfo,
    pub chain_id: u64,
    pub request: RequestDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageJob {
    pub session_id: String,
    pub internal_id: String,
    pub method: RequestMethod,
    pub message: String,
    pub account: SignerAccount,
    pub dapp: DappRequestInfo,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum SigningJob {
    Transaction(TransactionJob),
    Message(MessageJob),
}

impl SigningJob {
    pub fn session_id(&self) -> &str {
        match self {
            Self::Transaction(job) => &job.session_id,
            Self::Message(job) => &job.session_id,
        }
    }

    pub fn internal_id(&self) -> &str {
        match self {
            Self::Transaction(job) => &job.internal_id,
            Self::Message(job) => &job.internal_id,
        }
    }

    pub fn dapp(&self) -> &DappRequestInfo {
        match self {
            Self::Transaction(job) => &job.dapp,
            Self::Message(job) => &job.dapp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcError {
    /// WalletConnect SDK `USER_REJECTED`.
    pub fn user_rejected() -> Self {
        Self {
            code: 5000,
            message: "User rejected.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonRpcBody {
    Result(serde_json::Value),
    Error(JsonRpcError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub id: u64,
    pub jsonrpc: String,
    #[serde(flatten)]
    pub body: JsonRpcBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub topic: String,
    pub response: JsonRpcResponse,
}

impl SessionResponse {
    pub fn error(topic: impl Into<String>, id: u64, error: JsonRpcError) -> Self {
        Self {
            topic: topic.into(),
            response: JsonRpcResponse {
                id,
                jsonrpc: "2.0".to_owned(),
                body: JsonRpcBody::Error(error),
            },
        }
    }

    pub fn result(topic: impl Into<String>, id: u64, result: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            response: JsonRpcResponse {
                id,
                jsonrpc: "2.0".to_owned(),
                body: JsonRpcBody::Result(result),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionRoute {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub chain_id: u64,
    pub account: Address,
    pub tx_hash: alloy::primitives::B256,
    pub route: SubmissionRoute,
    pub includes_delegation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationStatus {
    pub needs_delegation: bool,
    pub contract_address: Option<Address>,
    pub current_delegation: Option<Address>,
}
