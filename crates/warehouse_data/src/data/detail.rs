//! On-demand fetchers that do not fit the generic registry path.

use contracts::warehouse::LandedCostLinesRequest;

use super::error::FetchError;
use super::executor::{records_from, FetchExecutor};
use super::registry::STOCK_RULES;
use crate::shared::api_utils::api_url;

/// Root-mounted route of the landed cost detail lines
pub const LANDED_COST_LINES_ENDPOINT: &str = "landed-costs/lines";
const LANDED_COST_LINES_FIELD: &str = "lines";

/// Envelope property the stock rules route actually answers with
pub const STOCK_RULES_DIRECT_FIELD: &str = "rules";

impl FetchExecutor {
    /// Load the lines of one landed cost into the keyed cache
    ///
    /// Lazy detail load: a missing id or session does nothing, failures are
    /// only logged and leave the cache untouched. Returns the number of lines
    /// stored.
    pub async fn fetch_detail_lines(&self, cost_id: i64) -> Option<usize> {
        if cost_id <= 0 {
            return None;
        }
        let session_id = self.credentials().get_session_id()?;

        let url = api_url(&self.config().base_url, LANDED_COST_LINES_ENDPOINT);
        let request = LandedCostLinesRequest {
            session_id,
            cost_id,
        };

        match self.post(&url, LANDED_COST_LINES_ENDPOINT, &request).await {
            Ok(envelope) => {
                let lines = records_from(envelope, LANDED_COST_LINES_FIELD);
                let count = lines.len();
                self.store().set_landed_cost_lines(cost_id, lines);
                Some(count)
            }
            Err(e) => {
                tracing::warn!("Failed to load landed cost lines for {}: {}", cost_id, e);
                None
            }
        }
    }

    /// Refresh one collection reading an explicit response field
    pub async fn refresh_resource_direct(
        &self,
        key: &str,
        field: &str,
    ) -> Result<usize, FetchError> {
        self.fetch_into_slot(key, field).await
    }

    /// Stock rules answer under `rules` instead of the registry field
    pub async fn refresh_stock_rules_direct(&self) -> Result<usize, FetchError> {
        self.refresh_resource_direct(STOCK_RULES, STOCK_RULES_DIRECT_FIELD)
            .await
    }
}
