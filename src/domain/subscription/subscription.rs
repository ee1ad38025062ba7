//! Subscription value type.
//!
//! Built once from the stored profile at session load, then handed to the
//! gate as a read-only snapshot.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{SubscriptionPlan, SubscriptionStatus, UserProfile};
use crate::domain::foundation::Timestamp;

/// A user's current subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl Subscription {
    /// Free plan, active, no expiry. Used when no profile is stored.
    pub fn free() -> Self {
        Self::default()
    }

    /// Active premium subscription without an expiry.
    pub fn premium() -> Self {
        Self {
            plan: SubscriptionPlan::Premium,
            status: SubscriptionStatus::Active,
            expires_at: None,
        }
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    /// Premium plan in Active status. Bypasses every quota.
    pub fn is_premium_active(&self) -> bool {
        self.plan == SubscriptionPlan::Premium && self.status.is_active()
    }

    /// The tier predicate: true for the free plan regardless of status.
    pub fn is_free_tier(&self) -> bool {
        self.plan == SubscriptionPlan::Free
    }

    /// Derives the subscription from a stored profile.
    ///
    /// Unknown plans fall back to Free and unparseable expiries are dropped.
    /// An explicit status on the profile wins; otherwise a past expiry means
    /// Expired.
    pub fn from_profile(profile: &UserProfile, now: Timestamp) -> Self {
        let plan = match profile.subscription_plan.as_deref() {
            None => SubscriptionPlan::Free,
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(error = %err, "unrecognised subscription plan, treating as free");
                SubscriptionPlan::Free
            }),
        };

        let expires_at = profile
            .subscription_expiry
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match Timestamp::parse("subscription_expiry", raw) {
                Ok(ts) => Some(ts),
                Err(err) => {
                    warn!(error = %err, "ignoring unparseable subscription expiry");
                    None
                }
            });

        let explicit_status = profile
            .subscription_status
            .as_deref()
            .and_then(|raw| match raw.parse::<SubscriptionStatus>() {
                Ok(status) => Some(status),
                Err(err) => {
                    warn!(error = %err, "ignoring unrecognised subscription status");
                    None
                }
            });

        let status = explicit_status.unwrap_or(match expires_at {
            Some(expiry) if expiry.is_before(&now) => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Active,
        });

        Self {
            plan,
            status,
            expires_at,
        }
    }
}
