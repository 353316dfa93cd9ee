//! Transports to the config service.
//!
//! - [`traits`]: the [`ConfigTransport`](traits::ConfigTransport) seam and wire types
//! - [`http`]: reqwest-backed transport for a real service
//! - [`memory`]: in-process fake service for tests and demos

pub mod traits;
pub mod http;
pub mod memory;
