use std::sync::Arc;
use tokio::sync::watch;

use super::client::{ApiTransport, ReqwestTransport};
use super::error::FetchError;
use super::executor::FetchExecutor;
use super::orchestrator::{BatchOrchestrator, RefreshReport};
use super::state::{ResourceState, StateStore, StoreSummary};
use crate::shared::config::{get_credentials_path, ApiConfig, Config};
use crate::shared::records::Record;
use crate::system::auth::{FileStorage, MemoryStorage, SessionCredentials};

/// Everything pages need from the data layer: collections with their
/// loading/error state, and the actions that refresh them
///
/// Build one per signed-in session and hand it to the views.
pub struct WarehouseData {
    store: Arc<StateStore>,
    executor: Arc<FetchExecutor>,
    orchestrator: BatchOrchestrator,
}

impl WarehouseData {
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn ApiTransport>,
        credentials: SessionCredentials,
    ) -> Self {
        let store = Arc::new(StateStore::new());
        let executor = Arc::new(FetchExecutor::new(
            config,
            transport,
            credentials,
            store.clone(),
        ));
        let orchestrator = BatchOrchestrator::new(executor.clone());
        Self {
            store,
            executor,
            orchestrator,
        }
    }

    /// Production wiring: reqwest, session id persisted in the configured file
    pub fn from_config(config: &Config) -> Self {
        let credentials = SessionCredentials::new(
            Arc::new(FileStorage::new(get_credentials_path(config))),
            Arc::new(MemoryStorage::new()),
        );
        Self::new(
            config.api.clone(),
            Arc::new(ReqwestTransport::new()),
            credentials,
        )
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn credentials(&self) -> &SessionCredentials {
        self.executor.credentials()
    }

    /// Collection, loading flag and error of `key`
    pub fn resource(&self, key: &str) -> ResourceState {
        self.store.get(key).unwrap_or_default()
    }

    pub fn data(&self, key: &str) -> Arc<Vec<Record>> {
        self.store.data(key)
    }

    pub fn landed_cost_lines(&self, cost_id: i64) -> Option<Arc<Vec<Record>>> {
        self.store.landed_cost_lines(cost_id)
    }

    pub fn summary(&self) -> StoreSummary {
        self.store.summary()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    pub async fn fetch_one(&self, key: &str) -> Result<usize, FetchError> {
        self.executor.fetch_resource(key).await
    }

    pub async fn refresh_all(&self) -> RefreshReport {
        self.orchestrator.refresh_all().await
    }

    pub async fn retry_problematic(&self) -> Vec<(&'static str, Result<usize, FetchError>)> {
        self.orchestrator.retry_failing_resources().await
    }

    pub fn reset(&self) {
        self.orchestrator.reset_all();
    }

    pub async fn fetch_detail_lines(&self, cost_id: i64) -> Option<usize> {
        self.executor.fetch_detail_lines(cost_id).await
    }

    pub async fn refresh_stock_rules_direct(&self) -> Result<usize, FetchError> {
        self.executor.refresh_stock_rules_direct().await
    }

    /// Navigation hook: refresh everything when a session is present
    ///
    /// Without a session nothing is fetched and the store keeps its state.
    pub async fn on_route_changed(&self, route: &str) -> Option<RefreshReport> {
        if self.credentials().get_session_id().is_none() {
            tracing::debug!("Route changed to {} without a session, nothing to refresh", route);
            return None;
        }
        tracing::info!("Route changed to {}, refreshing", route);
        Some(self.refresh_all().await)
    }

    /// Forget the session and drop every cached collection
    pub fn sign_out(&self) {
        self.credentials().clear_session();
        self.reset();
    }
}
