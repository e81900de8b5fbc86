pub mod request;
pub mod response;

pub use request::{LandedCostLinesRequest, SessionRequest};
pub use response::ApiEnvelope;
