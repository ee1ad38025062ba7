//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Plan, status and the stored user profile
//! - `usage` - Quota counters, reset times and access decisions

pub mod foundation;
pub mod subscription;
pub mod usage;
