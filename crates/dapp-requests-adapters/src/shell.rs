use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dapp_requests_core::{BiometricOutcome, BiometricPort, PortError, ShellPort};

#[derive(Debug, Clone, Default)]
pub struct ShellAdapter {
    inner: Arc<Mutex<ShellState>>,
}

#[derive(Debug, Default)]
struct ShellState {
    opened_from_deep_link: bool,
    closed_surfaces: Vec<String>,
    returns_to_previous_app: usize,
}

impl ShellAdapter {
    pub fn opened_from_deep_link() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ShellState {
                opened_from_deep_link: true,
                ..ShellState::default()
            })),
        }
    }

    pub fn closed_surfaces(&self) -> Result<Vec<String>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("shell lock poisoned: {e}")))?;
        Ok(g.closed_surfaces.clone())
    }

    pub fn returns_to_previous_app(&self) -> Result<usize, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("shell lock poisoned: {e}")))?;
        Ok(g.returns_to_previous_app)
    }
}

impl ShellPort for ShellAdapter {
    fn close_surface(&self, request_id: &str) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("shell lock poisoned: {e}")))?;
        g.closed_surfaces.push(request_id.to_owned());
        Ok(())
    }

    fn did_open_from_deep_link(&self) -> Result<bool, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("shell lock poisoned: {e}")))?;
        Ok(g.opened_from_deep_link)
    }

    fn return_to_previous_app(&self) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("shell lock poisoned: {e}")))?;
        g.returns_to_previous_app += 1;
        Ok(())
    }

    fn set_did_open_from_deep_link(&self, value: bool) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("shell lock poisoned: {e}")))?;
        g.opened_from_deep_link = value;
        Ok(())
    }
}

/// Biometric prompt with scripted verdicts; authenticates once the script
/// runs out.
#[derive(Debug, Clone, Default)]
pub struct BiometricAdapter {
    inner: Arc<Mutex<BiometricState>>,
}

#[derive(Debug, Default)]
struct BiometricState {
    scripted: VecDeque<BiometricOutcome>,
    prompts: usize,
}

impl BiometricAdapter {
    pub fn scripted(outcomes: impl IntoIterator<Item = BiometricOutcome>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BiometricState {
                scripted: outcomes.into_iter().collect(),
                prompts: 0,
            })),
        }
    }

    pub fn prompts(&self) -> Result<usize, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("biometric lock poisoned: {e}")))?;
        Ok(g.prompts)
    }
}

impl BiometricPort for BiometricAdapter {
    fn authenticate(&self) -> Result<BiometricOutcome, PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("biometric lock poisoned: {e}")))?;
        g.prompts += 1;
        Ok(g
            .scripted
            .pop_front()
            .unwrap_or(BiometricOutcome::Authenticated))
    }
}
