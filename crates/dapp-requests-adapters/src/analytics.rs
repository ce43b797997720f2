use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use dapp_requests_core::{AnalyticsPort, OutcomeEvent, PortError, SubmissionRecord};

use crate::SigningAdapterConfig;

pub const SHEET_COMPLETED_EVENT: &str = "WalletConnectSheetCompleted";
pub const TRANSACTION_SUBMITTED_EVENT: &str = "TransactionSubmitted";

#[derive(Debug, Clone)]
pub struct AnalyticsAdapter {
    sink: Option<HttpSink>,
    inner: Arc<Mutex<AnalyticsState>>,
}

#[derive(Debug, Clone)]
struct HttpSink {
    endpoint: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Default)]
struct AnalyticsState {
    outcomes: Vec<OutcomeEvent>,
    submissions: Vec<SubmissionRecord>,
}

impl Default for AnalyticsAdapter {
    fn default() -> Self {
        Self {
            sink: None,
            inner: Arc::new(Mutex::new(AnalyticsState::default())),
        }
    }
}

impl AnalyticsAdapter {
    pub fn with_config(config: &SigningAdapterConfig) -> Self {
        let sink = config.analytics_endpoint.as_ref().and_then(|endpoint| {
            match reqwest::blocking::Client::builder()
                .timeout(Duration::from_millis(config.http_timeout_ms))
                .build()
            {
                Ok(client) => Some(HttpSink {
                    endpoint: endpoint.trim_end_matches('/').to_owned(),
                    client,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "analytics sink disabled");
                    None
                }
            }
        });
        Self {
            sink,
            inner: Arc::new(Mutex::new(AnalyticsState::default())),
        }
    }

    pub fn outcomes(&self) -> Result<Vec<OutcomeEvent>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("analytics lock poisoned: {e}")))?;
        Ok(g.outcomes.clone())
    }

    pub fn submissions(&self) -> Result<Vec<SubmissionRecord>, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("analytics lock poisoned: {e}")))?;
        Ok(g.submissions.clone())
    }

    fn post(&self, event: &str, properties: serde_json::Value) -> Result<(), PortError> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        let response = sink
            .client
            .post(format!("{}/events", sink.endpoint))
            .json(&json!({ "event": event, "properties": properties }))
            .send()
            .map_err(|e| PortError::Transport(format!("analytics request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(PortError::Transport(format!(
                "analytics sink status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

impl AnalyticsPort for AnalyticsAdapter {
    fn record_outcome(&self, event: &OutcomeEvent) -> Result<(), PortError> {
        {
            let mut g = self
                .inner
                .lock()
                .map_err(|e| PortError::Transport(format!("analytics lock poisoned: {e}")))?;
            g.outcomes.push(event.clone());
        }
        let properties = serde_json::to_value(event)
            .map_err(|e| PortError::Validation(format!("analytics serialize failed: {e}")))?;
        self.post(SHEET_COMPLETED_EVENT, properties)
    }

    fn record_submission(&self, record: &SubmissionRecord) -> Result<(), PortError> {
        {
            let mut g = self
                .inner
                .lock()
                .map_err(|e| PortError::Transport(format!("analytics lock poisoned: {e}")))?;
            g.submissions.push(record.clone());
        }
        let properties = serde_json::to_value(record)
            .map_err(|e| PortError::Validation(format!("analytics serialize failed: {e}")))?;
        self.post(TRANSACTION_SUBMITTED_EVENT, properties)
    }
}
