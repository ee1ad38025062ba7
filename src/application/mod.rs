//! Application layer.
//!
//! Wires the pure domain decisions to persistence. The `AccessGate` is the
//! single entry point UI code uses to gate actions.

mod access_gate;

pub use access_gate::{AccessGate, QuotaStatus};
