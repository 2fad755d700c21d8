//! Metrics collection and export module.
//!
//! This module provides Prometheus counters for chain checks and a text
//! exposition renderer for the `/metrics` endpoint.
//!
//! # Submodules
//!
//! - `prom` - Prometheus metrics integration

pub mod prom;
