use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

use super::error::{BatchFetchError, FetchError};
use super::executor::FetchExecutor;
use super::registry::{INVENTORY, INVENTORY_LINES, LOCATIONS, LOTS};

/// Fetched first and awaited: the quants filter reads it
pub const ANCHOR_RESOURCE: &str = LOCATIONS;

/// Upper bound of concurrent fetches during a bulk refresh
pub const BATCH_SIZE: usize = 5;

/// Collections refreshed by [`BatchOrchestrator::refresh_all`], in dispatch order
///
/// Left out on purpose: `valuationLayers`, `putawayRules`, `waves` and
/// `stockReport` currently fail upstream and are fetched by their pages only.
pub const BATCH_REFRESH_RESOURCES: &[&str] = &[
    "products",
    "warehouses",
    "quants",
    "pickings",
    "pickingTypes",
    "stockMoves",
    "stockMoveLines",
    "lots",
    "packages",
    "packageTypes",
    "categories",
    "uom",
    "inventory",
    "inventoryLines",
    "productTemplates",
    "productVariants",
    "attributes",
    "barcodes",
    "storageCategories",
    "routes",
    "stockRules",
    "reorderRules",
    "scraps",
    "batches",
    "backorders",
    "returns",
    "moveHistory",
    "deliveryCarriers",
    "landedCosts",
    "partners",
    "suppliers",
    "companies",
    "users",
];

/// Collections known to fail intermittently, re-fetched one by one on demand
pub const RETRY_RESOURCES: &[&str] = &[LOTS, INVENTORY, INVENTORY_LINES];

/// Outcome of one collection in a bulk refresh
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOutcome {
    pub resource: &'static str,
    pub result: Result<(), BatchFetchError>,
}

#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub run_id: Uuid,
    pub anchor: Result<(), FetchError>,
    pub outcomes: Vec<ResourceOutcome>,
}

impl RefreshReport {
    pub fn failed(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_clean(&self) -> bool {
        self.anchor.is_ok() && self.failed().next().is_none()
    }
}

/// Refreshes many collections with bounded concurrency; one failing
/// collection never aborts the others
pub struct BatchOrchestrator {
    executor: Arc<FetchExecutor>,
    resources: Vec<&'static str>,
}

impl BatchOrchestrator {
    pub fn new(executor: Arc<FetchExecutor>) -> Self {
        Self::with_resources(executor, BATCH_REFRESH_RESOURCES)
    }

    pub fn with_resources(executor: Arc<FetchExecutor>, resources: &[&'static str]) -> Self {
        Self {
            executor,
            resources: resources.to_vec(),
        }
    }

    pub fn resources(&self) -> &[&'static str] {
        &self.resources
    }

    /// Anchor first, then the curated list in groups of [`BATCH_SIZE`]
    pub async fn refresh_all(&self) -> RefreshReport {
        let run_id = Uuid::new_v4();
        tracing::info!(
            "Refresh {} started: {} resources in batches of {}",
            run_id,
            self.resources.len() + 1,
            BATCH_SIZE
        );

        let anchor = self
            .executor
            .fetch_resource(ANCHOR_RESOURCE)
            .await
            .map(|_| ());
        if let Err(e) = &anchor {
            tracing::warn!("Refresh {}: {} failed, continuing: {}", run_id, ANCHOR_RESOURCE, e);
        }

        let mut outcomes = Vec::with_capacity(self.resources.len());
        for batch in self.resources.chunks(BATCH_SIZE) {
            let results = join_all(batch.iter().map(|key| self.fetch_isolated(*key))).await;
            outcomes.extend(results);
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(
            "Refresh {} finished: {} ok, {} failed",
            run_id,
            outcomes.len() - failed,
            failed
        );

        RefreshReport {
            run_id,
            anchor,
            outcomes,
        }
    }

    async fn fetch_isolated(&self, key: &'static str) -> ResourceOutcome {
        let result = match self.executor.fetch_resource(key).await {
            Ok(_) => Ok(()),
            Err(source) => {
                let err = BatchFetchError {
                    resource: key.to_string(),
                    source,
                };
                tracing::warn!("Batch fetch of {} failed: {}", key, err.source);
                self.executor.store().slot(key).set_error(err.to_string());
                Err(err)
            }
        };
        ResourceOutcome {
            resource: key,
            result,
        }
    }

    /// Re-fetch [`RETRY_RESOURCES`] sequentially; errors stay in their slots
    pub async fn retry_failing_resources(&self) -> Vec<(&'static str, Result<usize, FetchError>)> {
        let mut results = Vec::with_capacity(RETRY_RESOURCES.len());
        for key in RETRY_RESOURCES {
            let result = self.executor.fetch_resource(key).await;
            if let Err(e) = &result {
                tracing::warn!("Retry of {} failed: {}", key, e);
            }
            results.push((*key, result));
        }
        results
    }

    /// Clear every collection and error; does not cancel in-flight fetches
    pub fn reset_all(&self) {
        self.executor.store().reset_all();
    }
}
