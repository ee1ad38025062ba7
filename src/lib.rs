//! Access Gate - subscription tier and usage quota gate
//!
//! Decides whether a learner may start a quiz, use practice tools, open a
//! lesson or unlock another subject, based on their plan and per-feature
//! usage counters, and reports quota and reset information for display.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
