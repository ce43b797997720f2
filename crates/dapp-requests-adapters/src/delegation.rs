use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;

use dapp_requests_core::{DelegationRegistryPort, DelegationStatus, PortError};

/// Delegation status per (account, chain). Accounts without a recorded
/// status need delegation to the chain's contract when one is set,
/// otherwise they need none.
#[derive(Debug, Clone, Default)]
pub struct DelegationAdapter {
    inner: Arc<Mutex<DelegationState>>,
}

#[derive(Debug, Default)]
struct DelegationState {
    statuses: HashMap<(Address, u64), DelegationStatus>,
    contracts: HashMap<u64, Address>,
}

impl DelegationAdapter {
    pub fn set_contract(&self, chain_id: u64, contract: Address) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("delegation lock poisoned: {e}")))?;
        g.contracts.insert(chain_id, contract);
        Ok(())
    }

    pub fn mark_delegated(
        &self,
        account: Address,
        chain_id: u64,
        contract: Address,
    ) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("delegation lock poisoned: {e}")))?;
        g.statuses.insert(
            (account, chain_id),
            DelegationStatus {
                needs_delegation: false,
                contract_address: Some(contract),
                current_delegation: Some(contract),
            },
        );
        Ok(())
    }
}

impl DelegationRegistryPort for DelegationAdapter {
    fn delegation_status(
        &self,
        address: Address,
        chain_id: u64,
    ) -> Result<DelegationStatus, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("delegation lock poisoned: {e}")))?;
        if let Some(status) = g.statuses.get(&(address, chain_id)) {
            return Ok(*status);
        }
        Ok(match g.contracts.get(&chain_id) {
            Some(contract) => DelegationStatus {
                needs_delegation: true,
                contract_address: Some(*contract),
                current_delegation: None,
            },
            None => DelegationStatus {
                needs_delegation: false,
                contract_address: None,
                current_delegation: None,
            },
        })
    }
}
