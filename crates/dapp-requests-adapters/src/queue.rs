use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dapp_requests_core::{PortError, SigningJob, SigningJobQueuePort};

/// Bounded FIFO of confirmed signing jobs awaiting the runner.
#[derive(Debug, Clone)]
pub struct JobQueueAdapter {
    capacity: usize,
    inner: Arc<Mutex<VecDeque<SigningJob>>>,
}

impl Default for JobQueueAdapter {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl JobQueueAdapter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn pop(&self) -> Result<Option<SigningJob>, PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("job queue lock poisoned: {e}")))?;
        Ok(g.pop_front())
    }

    pub fn len(&self) -> Result<usize, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("job queue lock poisoned: {e}")))?;
        Ok(g.len())
    }

    pub fn is_empty(&self) -> Result<bool, PortError> {
        Ok(self.len()? == 0)
    }

    pub fn snapshot(&self) -> Result<Vec<SigningJob>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("job queue lock poisoned: {e}")))?;
        Ok(g.iter().cloned().collect())
    }
}

impl SigningJobQueuePort for JobQueueAdapter {
    fn enqueue(&self, job: SigningJob) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("job queue lock poisoned: {e}")))?;
        if g.len() >= self.capacity {
            return Err(PortError::Conflict("SIGNING_QUEUE_FULL".to_owned()));
        }
        tracing::debug!(
            session_id = job.session_id(),
            internal_id = job.internal_id(),
            "signing job queued"
        );
        g.push_back(job);
        Ok(())
    }
}
