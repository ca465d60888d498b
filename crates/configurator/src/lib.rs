//! Product configurator core.
//!
//! The crate resolves which quiz questions a shopper sees, scores catalog items
//! from persisted answers, filters item variants by spec facets, and forwards
//! leads to the ERP. Storage and transport sit behind traits so the HTTP service
//! and the tests can supply their own adapters.

pub mod catalog;
pub mod config;
pub mod error;
pub mod memory;
pub mod telemetry;
pub mod workflows;
