//! Data layer: registry, store, executor and bulk refresh.

pub mod client;
pub mod context;
pub mod detail;
pub mod error;
pub mod executor;
pub mod on_hand;
pub mod orchestrator;
pub mod registry;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiResponse, ApiTransport, ReqwestTransport, TransportError};
pub use executor::FetchExecutor;
pub use orchestrator::{BatchOrchestrator, RefreshReport, ResourceOutcome};
pub use registry::ResourceDescriptor;
pub use state::{ResourceSlot, ResourceState, StateStore, StoreSummary};
