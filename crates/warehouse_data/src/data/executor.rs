use contracts::warehouse::{ApiEnvelope, SessionRequest};
use std::sync::Arc;

use super::client::{ApiResponse, ApiTransport};
use super::error::FetchError;
use super::on_hand::filter_on_hand;
use super::registry::{self, LOCATIONS, QUANTS};
use super::state::StateStore;
use crate::shared::config::ApiConfig;
use crate::shared::records::{into_records, Record};
use crate::system::auth::SessionCredentials;

const GENERIC_FAILURE: &str = "Request failed without a message";

/// Fetches one collection and commits the outcome into the store
pub struct FetchExecutor {
    config: ApiConfig,
    transport: Arc<dyn ApiTransport>,
    credentials: SessionCredentials,
    store: Arc<StateStore>,
}

impl FetchExecutor {
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn ApiTransport>,
        credentials: SessionCredentials,
        store: Arc<StateStore>,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
            store,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn credentials(&self) -> &SessionCredentials {
        &self.credentials
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch `key` and replace its collection
    ///
    /// Every failure is committed into the resource's error slot before it is
    /// returned; the previous collection is kept. Returns the number of
    /// records committed.
    pub async fn fetch_resource(&self, key: &str) -> Result<usize, FetchError> {
        self.fetch_into_slot(key, registry::resolve_response_field(key))
            .await
    }

    /// Same contract as [`fetch_resource`](Self::fetch_resource), reading the
    /// result array from an explicit response field
    pub(crate) async fn fetch_into_slot(
        &self,
        key: &str,
        field: &str,
    ) -> Result<usize, FetchError> {
        let slot = self.store.slot(key);

        let Some(session_id) = self.credentials.get_session_id() else {
            tracing::warn!("No session id, skipping fetch of {}", key);
            slot.fail(FetchError::NoSession.to_string());
            return Err(FetchError::NoSession);
        };

        slot.begin();
        let endpoint = registry::resolve_endpoint(key);
        let url = registry::resolve_url(key, endpoint, &self.config.base_url);
        tracing::debug!("Fetching {} from {}", key, url);

        let outcome = self
            .post(&url, endpoint, &SessionRequest::new(session_id))
            .await
            .map(|envelope| records_from(envelope, field));

        match outcome {
            Ok(records) => {
                let records = self.post_process(key, records);
                let count = records.len();
                slot.succeed(records);
                tracing::debug!("Loaded {} {} records", count, key);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", key, e);
                slot.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// POST a body and unwrap the gateway envelope
    pub(crate) async fn post<B: serde::Serialize>(
        &self,
        url: &str,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiEnvelope, FetchError> {
        let body = serde_json::to_value(body).map_err(|e| FetchError::InvalidPayload {
            endpoint: endpoint.to_string(),
            message: format!("Failed to serialize request: {}", e),
        })?;

        let response = self
            .transport
            .post_json(url, &self.config.routing_headers(), &body)
            .await
            .map_err(|e| FetchError::Network {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        interpret_response(endpoint, response)
    }

    fn post_process(&self, key: &str, records: Vec<Record>) -> Vec<Record> {
        match key {
            QUANTS => filter_on_hand(records, &self.store.data(LOCATIONS)),
            _ => records,
        }
    }
}

/// Map a raw answer onto the error taxonomy
pub(crate) fn interpret_response(
    endpoint: &str,
    response: ApiResponse,
) -> Result<ApiEnvelope, FetchError> {
    if !response.is_success() {
        return Err(FetchError::from_status(
            response.status,
            endpoint,
            response.body,
        ));
    }

    let envelope: ApiEnvelope =
        serde_json::from_str(&response.body).map_err(|e| FetchError::InvalidPayload {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

    if !envelope.is_success() {
        return Err(FetchError::Application(
            envelope
                .message_text()
                .unwrap_or(GENERIC_FAILURE)
                .to_string(),
        ));
    }

    Ok(envelope)
}

/// Result array under `field`; missing or non-array counts as empty
pub(crate) fn records_from(mut envelope: ApiEnvelope, field: &str) -> Vec<Record> {
    into_records(envelope.take_array(field))
}
