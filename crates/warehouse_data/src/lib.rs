//! Client-side data layer of the warehouse dashboard.
//!
//! Pages never talk to the ERP gateway directly: they read collections from
//! the [`data::StateStore`] and trigger fetches through [`WarehouseData`].

pub mod data;
pub mod shared;
pub mod system;

pub use data::context::WarehouseData;
pub use data::error::{BatchFetchError, FetchError};
pub use data::state::{ResourceState, StateStore, StoreSummary};
pub use shared::records::Record;
