use serde::{Deserialize, Serialize};

/// Body of every collection request: the gateway resolves the ERP session from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl SessionRequest {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Body of the landed cost detail request
///
/// `cost_id` stays snake_case on the wire, unlike `sessionId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandedCostLinesRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub cost_id: i64,
}
