//! Infrastructure Layer
//!
//! Contains implementations for external concerns including:
//! - Rules engine and move source adapters (shakmaty)
//! - Prometheus metrics

pub mod engine;
pub mod metrics;
