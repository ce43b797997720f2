use std::sync::{Arc, Mutex};

use alloy::primitives::Address;

use dapp_requests_core::{PortError, SignerAccount, SignerAccountRegistryPort};

/// Mnemonic-backed accounts able to sign, sorted by derivation index.
#[derive(Debug, Clone, Default)]
pub struct SignerAccountsAdapter {
    inner: Arc<Mutex<Vec<SignerAccount>>>,
}

impl SignerAccountsAdapter {
    pub fn with_accounts(accounts: Vec<SignerAccount>) -> Self {
        let mut unique: Vec<SignerAccount> = Vec::with_capacity(accounts.len());
        for account in accounts {
            unique.retain(|a| a.address != account.address);
            unique.push(account);
        }
        unique.sort_by_key(|a| a.derivation_index);
        Self {
            inner: Arc::new(Mutex::new(unique)),
        }
    }

    pub fn add(&self, account: SignerAccount) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("accounts lock poisoned: {e}")))?;
        g.retain(|a| a.address != account.address);
        g.push(account);
        g.sort_by_key(|a| a.derivation_index);
        Ok(())
    }

    pub fn remove(&self, address: Address) -> Result<bool, PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("accounts lock poisoned: {e}")))?;
        let before = g.len();
        g.retain(|a| a.address != address);
        Ok(g.len() != before)
    }
}

impl SignerAccountRegistryPort for SignerAccountsAdapter {
    fn signer_accounts(&self) -> Result<Vec<SignerAccount>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("accounts lock poisoned: {e}")))?;
        Ok(g.clone())
    }
}
