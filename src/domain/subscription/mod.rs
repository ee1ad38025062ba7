//! Subscription domain module.
//!
//! Handles the learner's plan and status as read from the stored profile.
//!
//! # Module Structure
//!
//! - `plan` - SubscriptionPlan tiers
//! - `status` - SubscriptionStatus
//! - `profile` - Stored `currentUser` document
//! - `subscription` - Subscription snapshot derived from the profile

mod plan;
mod profile;
mod status;
#[allow(clippy::module_inception)]
mod subscription;

pub use plan::SubscriptionPlan;
pub use profile::UserProfile;
pub use status::SubscriptionStatus;
pub use subscription::Subscription;
