//! Wire types shared between the warehouse dashboard and its API gateway.

pub mod warehouse;
