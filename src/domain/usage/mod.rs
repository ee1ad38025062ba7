//! Usage quota domain module.
//!
//! # Module Structure
//!
//! - `quota_key` - The closed set of tracked counters
//! - `limits` - Counters and the persisted snapshot
//! - `reset` - When each counter rolls over, for display
//! - `access` - Pure access decisions and their result type

mod access;
mod limits;
mod quota_key;
mod reset;

pub use access::{
    decide_multi_subject, decide_premium, decide_usage, AccessDeniedReason, AccessResult,
    LimitInfo,
};
pub use limits::{UsageCounter, UsageLimits};
pub use quota_key::{QuotaKey, ResetPeriod};
pub use reset::{next_reset, reset_time, NEVER_RESETS, RESET_UNKNOWN};
