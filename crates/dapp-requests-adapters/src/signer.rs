use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{keccak256, Address, Bytes, B256};

use dapp_requests_core::{
    PortError, RequestMethod, SignerAccount, SignerManagerPort, TransactionRepositoryPort,
    TransactionRequest,
};

/// Deterministic stand-in for key custody: signatures are derived from the
/// account and payload so flows can be replayed and compared.
#[derive(Debug, Clone, Default)]
pub struct SignerManagerAdapter {
    locked: Arc<Mutex<bool>>,
}

impl SignerManagerAdapter {
    pub fn set_locked(&self, locked: bool) -> Result<(), PortError> {
        let mut g = self
            .locked
            .lock()
            .map_err(|e| PortError::Transport(format!("signer lock poisoned: {e}")))?;
        *g = locked;
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<(), PortError> {
        let g = self
            .locked
            .lock()
            .map_err(|e| PortError::Transport(format!("signer lock poisoned: {e}")))?;
        if *g {
            return Err(PortError::Policy("SIGNER_LOCKED".to_owned()));
        }
        Ok(())
    }

    fn signature(&self, domain: &str, signer: Address, payload: &[u8]) -> Bytes {
        let mut seed = Vec::with_capacity(domain.len() + 20 + payload.len());
        seed.extend_from_slice(domain.as_bytes());
        seed.extend_from_slice(signer.as_slice());
        seed.extend_from_slice(payload);
        let hash = keccak256(seed);
        let mut sig = Vec::with_capacity(65);
        sig.extend_from_slice(hash.as_slice());
        sig.extend_from_slice(keccak256(hash).as_slice());
        sig.push(27);
        Bytes::from(sig)
    }
}

impl SignerManagerPort for SignerManagerAdapter {
    fn sign_transaction(
        &self,
        account: &SignerAccount,
        tx: &TransactionRequest,
    ) -> Result<Bytes, PortError> {
        self.ensure_unlocked()?;
        let encoded = serde_json::to_vec(tx)
            .map_err(|e| PortError::Validation(format!("tx serialization failed: {e}")))?;
        let sig = self.signature("tx", account.address, &encoded);
        let mut raw = encoded;
        raw.extend_from_slice(&sig);
        Ok(Bytes::from(raw))
    }

    fn sign_message(
        &self,
        account: &SignerAccount,
        method: &RequestMethod,
        message: &str,
    ) -> Result<Bytes, PortError> {
        self.ensure_unlocked()?;
        Ok(self.signature(method.rpc_name(), account.address, message.as_bytes()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionRepositoryAdapter {
    inner: Arc<Mutex<HashMap<Address, Vec<(B256, TransactionRequest)>>>>,
}

impl TransactionRepositoryAdapter {
    pub fn transaction(
        &self,
        account: Address,
        tx_hash: B256,
    ) -> Result<Option<TransactionRequest>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("repository lock poisoned: {e}")))?;
        Ok(g.get(&account).and_then(|txs| {
            txs.iter()
                .find(|(hash, _)| *hash == tx_hash)
                .map(|(_, tx)| tx.clone())
        }))
    }
}

impl TransactionRepositoryPort for TransactionRepositoryAdapter {
    fn record_submitted(
        &self,
        account: Address,
        tx_hash: B256,
        tx: &TransactionRequest,
    ) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("repository lock poisoned: {e}")))?;
        let txs = g.entry(account).or_default();
        if txs.iter().any(|(hash, _)| *hash == tx_hash) {
            return Err(PortError::Conflict(format!("duplicate transaction {tx_hash}")));
        }
        txs.push((tx_hash, tx.clone()));
        Ok(())
    }

    fn transactions_for(&self, account: Address) -> Result<Vec<B256>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("repository lock poisoned: {e}")))?;
        Ok(g.get(&account)
            .map(|txs| txs.iter().map(|(hash, _)| *hash).collect())
            .unwrap_or_default())
    }
}
