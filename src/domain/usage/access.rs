//! Access decisions.
//!
//! The decision functions here are pure: they look at a subscription and a
//! counter and return an [`AccessResult`]. Committing usage is the gate's
//! job, not theirs.

use serde::{Deserialize, Serialize};

use super::reset::NEVER_RESETS;
use super::UsageCounter;
use crate::domain::subscription::Subscription;

/// Reason why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDeniedReason {
    /// Feature is premium-only.
    PremiumRequired,

    /// Quota for the current period is used up.
    UsageLimit,

    /// Premium subscription has lapsed. Part of the result vocabulary for
    /// UI consumers; the gate itself reports lapsed premium accounts as
    /// `PremiumRequired`.
    SubscriptionExpired,
}

impl AccessDeniedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessDeniedReason::PremiumRequired => "premium_required",
            AccessDeniedReason::UsageLimit => "usage_limit",
            AccessDeniedReason::SubscriptionExpired => "subscription_expired",
        }
    }
}

impl std::fmt::Display for AccessDeniedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quota details shown alongside a usage decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitInfo {
    pub used: u32,
    pub limit: u32,
    pub reset_time: String,
}

/// Result of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    pub can_access: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<AccessDeniedReason>,
    pub upgrade_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_info: Option<LimitInfo>,
}

impl AccessResult {
    /// Unconditional allow, no quota details.
    pub fn allowed() -> Self {
        Self {
            can_access: true,
            reason: None,
            upgrade_required: false,
            limit_info: None,
        }
    }

    /// Denied because the feature is premium-only.
    pub fn premium_required() -> Self {
        Self {
            can_access: false,
            reason: Some(AccessDeniedReason::PremiumRequired),
            upgrade_required: true,
            limit_info: None,
        }
    }

    /// Allowed iff the counter has capacity; quota details always attached.
    pub fn from_counter(counter: UsageCounter, reset_time: impl Into<String>) -> Self {
        let can_access = counter.has_capacity();
        Self {
            can_access,
            reason: (!can_access).then_some(AccessDeniedReason::UsageLimit),
            upgrade_required: !can_access,
            limit_info: Some(LimitInfo {
                used: counter.used,
                limit: counter.limit,
                reset_time: reset_time.into(),
            }),
        }
    }

    pub fn is_denied(&self) -> bool {
        !self.can_access
    }

    /// User-facing explanation of a denial. `None` when access is allowed.
    pub fn user_message(&self) -> Option<String> {
        if self.can_access {
            return None;
        }

        let message = match (self.reason, &self.limit_info) {
            (Some(AccessDeniedReason::UsageLimit), Some(info)) if info.reset_time == NEVER_RESETS => {
                format!(
                    "Free accounts include {} subject. Upgrade to Premium to unlock more.",
                    info.limit
                )
            }
            (Some(AccessDeniedReason::UsageLimit), Some(info)) => format!(
                "You've used {} of {}. Your limit resets at {}, or upgrade to Premium for unlimited access.",
                info.used, info.limit, info.reset_time
            ),
            (Some(AccessDeniedReason::SubscriptionExpired), _) => {
                "Your Premium subscription has expired. Renew to continue.".to_string()
            }
            _ => "This feature requires a Premium subscription.".to_string(),
        };
        Some(message)
    }
}

/// Premium-only features: allowed for Premium+Active, denied otherwise.
pub fn decide_premium(subscription: &Subscription) -> AccessResult {
    if subscription.is_premium_active() {
        AccessResult::allowed()
    } else {
        AccessResult::premium_required()
    }
}

/// Quota-gated features.
///
/// Premium+Active bypasses the counter entirely. Everyone else is allowed
/// while `used < limit`.
pub fn decide_usage(
    subscription: &Subscription,
    counter: UsageCounter,
    reset_time: impl Into<String>,
) -> AccessResult {
    if subscription.is_premium_active() {
        return AccessResult::allowed();
    }
    AccessResult::from_counter(counter, reset_time)
}

/// One subject per free account.
///
/// Gated on the tier predicate rather than premium status, so any
/// non-free plan passes. Once a free account has unlocked a subject the
/// denial is permanent until upgrade.
pub fn decide_multi_subject(subscription: &Subscription, counter: UsageCounter) -> AccessResult {
    if subscription.is_free_tier() && counter.used >= 1 {
        return AccessResult {
            can_access: false,
            reason: Some(AccessDeniedReason::UsageLimit),
            upgrade_required: true,
            limit_info: Some(LimitInfo {
                used: counter.used,
                limit: counter.limit,
                reset_time: NEVER_RESETS.to_string(),
            }),
        };
    }
    AccessResult::allowed()
}
