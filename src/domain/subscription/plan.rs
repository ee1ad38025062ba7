//! Subscription plan definitions.
//!
//! Represents the subscription tiers a learner can be on.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription plan (tier).
///
/// Determines whether usage quotas apply at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    /// Free tier - quota-limited quizzes, practice, lessons and one subject.
    #[default]
    Free,

    /// Premium tier - no quotas, certificates and advanced analytics.
    Premium,
}

impl SubscriptionPlan {
    /// Returns the display name for this plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "Free",
            SubscriptionPlan::Premium => "Premium",
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionPlan::Free),
            "premium" => Ok(SubscriptionPlan::Premium),
            _ => Err(ValidationError::unknown_value("subscription plan", s)),
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
