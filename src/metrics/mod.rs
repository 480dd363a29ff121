//! Optional counters (cargo feature `metrics`).

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
