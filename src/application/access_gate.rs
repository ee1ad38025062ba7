//! AccessGate - the session-scoped access control and usage quota gate.
//!
//! Constructed once per session with an injected store, then passed by
//! reference to whatever needs to gate an action. Decisions come from the
//! pure functions in `domain::usage`; this type adds the usage commit step
//! and persistence.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(FileKeyValueStore::new("./data"));
//! let mut gate = AccessGate::load(store, &UsageLimits::default());
//!
//! if gate.can_start_quiz().can_access {
//!     gate.increment_usage(QuotaKey::DailyQuizzes);
//!     // ... start the quiz
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{Subscription, UserProfile};
use crate::domain::usage::{
    decide_multi_subject, decide_premium, decide_usage, reset_time, AccessResult, QuotaKey,
    UsageCounter, UsageLimits,
};
use crate::ports::{KeyValueStore, CURRENT_USER_KEY, USAGE_LIMITS_KEY};

/// One row of the usage overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub key: QuotaKey,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub percentage: u32,
    pub reset_time: String,
}

/// Access control and usage quota gate for one session.
pub struct AccessGate {
    store: Arc<dyn KeyValueStore>,
    subscription: Subscription,
    limits: UsageLimits,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("subscription", &self.subscription)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl AccessGate {
    /// Builds a gate from explicit state. Performs no I/O.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        subscription: Subscription,
        limits: UsageLimits,
    ) -> Self {
        Self {
            store,
            subscription,
            limits,
            clock: local_now,
        }
    }

    /// Builds a gate from whatever the store holds.
    ///
    /// The subscription comes from the stored profile (Free when absent or
    /// unreadable). Usage comes from the stored snapshot merged over
    /// `defaults`. Never fails.
    pub fn load(store: Arc<dyn KeyValueStore>, defaults: &UsageLimits) -> Self {
        let subscription = load_subscription(store.as_ref());
        let limits = load_limits(store.as_ref(), defaults);

        info!(
            plan = %subscription.plan,
            status = %subscription.status,
            "access gate loaded"
        );

        Self::new(store, subscription, limits)
    }

    /// Overrides the local wall clock used for reset times.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Re-reads the stored profile, e.g. after sign-in or an upgrade.
    pub fn reload_subscription(&mut self) {
        self.subscription = load_subscription(self.store.as_ref());
        debug!(plan = %self.subscription.plan, "subscription reloaded");
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn usage_limits(&self) -> &UsageLimits {
        &self.limits
    }

    pub fn is_premium_user(&self) -> bool {
        self.subscription.is_premium_active()
    }

    pub fn is_free_tier(&self) -> bool {
        self.subscription.is_free_tier()
    }

    // ─── Premium-only features ──────────────────────────────────────

    /// Binary premium gate. Usage counters are never consulted.
    pub fn check_premium_gate(&self) -> AccessResult {
        decide_premium(&self.subscription)
    }

    pub fn can_download_certificates(&self) -> AccessResult {
        self.check_premium_gate()
    }

    pub fn can_access_advanced_analytics(&self) -> AccessResult {
        self.check_premium_gate()
    }

    // ─── Quota-gated features ───────────────────────────────────────

    /// Checks `key` without consuming anything.
    pub fn preview_usage(&self, key: QuotaKey) -> AccessResult {
        decide_usage(&self.subscription, self.limits.get(key), self.reset_time(key))
    }

    /// Checks `key` and, when allowed and `increment` is set, consumes one
    /// unit and persists.
    ///
    /// The reported `limit_info.used` reflects the count after the
    /// increment. A denied check never mutates.
    pub fn check_usage_gate(&mut self, key: QuotaKey, increment: bool) -> AccessResult {
        let mut result = self.preview_usage(key);

        if result.can_access && increment && !self.subscription.is_premium_active() {
            let counter = self.commit(key);
            if let Some(info) = result.limit_info.as_mut() {
                info.used = counter.used;
            }
        }

        if result.is_denied() {
            debug!(quota = %key, "usage gate denied");
        }
        result
    }

    // Named checks never consume; callers commit with `increment_usage`.

    pub fn can_start_quiz(&self) -> AccessResult {
        self.preview_usage(QuotaKey::DailyQuizzes)
    }

    pub fn can_use_practice_tools(&self) -> AccessResult {
        self.preview_usage(QuotaKey::DailyPractice)
    }

    pub fn can_start_lesson(&self) -> AccessResult {
        self.preview_usage(QuotaKey::WeeklyLessons)
    }

    pub fn can_open_subject(&self) -> AccessResult {
        self.preview_usage(QuotaKey::SubjectsAccess)
    }

    /// One subject per free account; see [`decide_multi_subject`].
    pub fn check_multi_subject_gate(&self) -> AccessResult {
        decide_multi_subject(&self.subscription, self.limits.subjects_access)
    }

    // ─── Usage tracking ─────────────────────────────────────────────

    /// Consumes one unit of `key` for a free account with capacity left.
    ///
    /// Returns whether anything changed. An exhausted quota or a non-free
    /// plan is a silent no-op.
    pub fn increment_usage(&mut self, key: QuotaKey) -> bool {
        if !self.subscription.is_free_tier() || self.limits.get(key).is_exhausted() {
            debug!(quota = %key, "increment skipped");
            return false;
        }
        self.commit(key);
        true
    }

    /// Clears the daily quiz and practice counters.
    pub fn reset_daily_limits(&mut self) {
        self.limits.reset(&QuotaKey::DAILY);
        self.persist();
        info!("daily usage limits reset");
    }

    /// Clears the weekly lesson counter.
    pub fn reset_weekly_limits(&mut self) {
        self.limits.reset(&QuotaKey::WEEKLY);
        self.persist();
        info!("weekly usage limits reset");
    }

    /// Replaces every counter with `defaults`, nothing used.
    pub fn reset_all_limits(&mut self, defaults: &UsageLimits) {
        self.limits = defaults.zeroed();
        self.persist();
        info!("all usage limits reset");
    }

    /// Adds `amount` uses to `key`, capped at the limit.
    pub fn simulate_usage(&mut self, key: QuotaKey, amount: u32) {
        let counter = self.limits.get_mut(key);
        counter.used = counter.limit.min(counter.used.saturating_add(amount));
        self.persist();
        debug!(quota = %key, amount, "simulated usage");
    }

    // ─── Display helpers ────────────────────────────────────────────

    pub fn remaining_usage(&self, key: QuotaKey) -> u32 {
        self.limits.get(key).remaining()
    }

    pub fn usage_percentage(&self, key: QuotaKey) -> u32 {
        self.limits.get(key).percentage()
    }

    pub fn reset_time(&self, key: QuotaKey) -> String {
        reset_time(key, (self.clock)())
    }

    /// Every counter with its remaining quota and reset time.
    pub fn usage_report(&self) -> Vec<QuotaStatus> {
        self.limits
            .iter()
            .map(|(key, counter)| QuotaStatus {
                key,
                used: counter.used,
                limit: counter.limit,
                remaining: counter.remaining(),
                percentage: counter.percentage(),
                reset_time: self.reset_time(key),
            })
            .collect()
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn commit(&mut self, key: QuotaKey) -> UsageCounter {
        let counter = self.limits.get_mut(key);
        counter.used = counter.used.saturating_add(1);
        let counter = *counter;
        self.persist();
        debug!(quota = %key, used = counter.used, limit = counter.limit, "usage recorded");
        counter
    }

    /// Writes the whole snapshot. Failures are logged and swallowed.
    fn persist(&self) {
        let json = match self.limits.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize usage limits");
                return;
            }
        };
        if let Err(err) = self.store.set(USAGE_LIMITS_KEY, &json) {
            warn!(error = %err, "failed to persist usage limits");
        }
    }
}

fn load_subscription(store: &dyn KeyValueStore) -> Subscription {
    let raw = match store.get(CURRENT_USER_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Subscription::free(),
        Err(err) => {
            warn!(error = %err, "failed to read stored user, assuming free plan");
            return Subscription::free();
        }
    };

    match UserProfile::from_json(&raw) {
        Ok(profile) => {
            if let Some(user_id) = profile.user_id() {
                debug!(%user_id, "loaded stored user profile");
            }
            Subscription::from_profile(&profile, Timestamp::now())
        }
        Err(err) => {
            warn!(error = %err, "stored user is malformed, assuming free plan");
            Subscription::free()
        }
    }
}

fn load_limits(store: &dyn KeyValueStore, defaults: &UsageLimits) -> UsageLimits {
    match store.get(USAGE_LIMITS_KEY) {
        Ok(Some(raw)) => UsageLimits::merge_snapshot(defaults, &raw),
        Ok(None) => *defaults,
        Err(err) => {
            warn!(error = %err, "failed to read usage limits, using defaults");
            *defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryKeyValueStore;
    use crate::domain::subscription::SubscriptionStatus;
    use crate::domain::usage::{AccessDeniedReason, NEVER_RESETS};
    use crate::ports::StorageError;
    use chrono::NaiveDate;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    /// Wednesday 2025-03-12 15:00 local.
    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn gate_with(subscription: Subscription, limits: UsageLimits) -> (AccessGate, Arc<InMemoryKeyValueStore>) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let gate = AccessGate::new(store.clone(), subscription, limits).with_clock(fixed_now);
        (gate, store)
    }

    fn limits_with(key: QuotaKey, used: u32, limit: u32) -> UsageLimits {
        let mut limits = UsageLimits::default();
        limits.set(key, UsageCounter::new(used, limit));
        limits
    }

    fn stored_limits(store: &InMemoryKeyValueStore) -> Option<UsageLimits> {
        store
            .get(USAGE_LIMITS_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    /// Store whose writes always fail.
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("down".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("down".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("down".to_string()))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Premium gate
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn free_user_denied_certificates_and_analytics() {
        let (gate, _) = gate_with(Subscription::free(), UsageLimits::default());

        for result in [gate.can_download_certificates(), gate.can_access_advanced_analytics()] {
            assert!(!result.can_access);
            assert_eq!(result.reason, Some(AccessDeniedReason::PremiumRequired));
            assert!(result.upgrade_required);
        }
    }

    #[test]
    fn premium_user_allowed_certificates() {
        let (gate, _) = gate_with(Subscription::premium(), UsageLimits::default());
        assert_eq!(gate.can_download_certificates(), AccessResult::allowed());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Usage gate
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn exhausted_daily_quizzes_denied_with_midnight_reset() {
        let (mut gate, _) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::DailyQuizzes, 5, 5),
        );

        let result = gate.check_usage_gate(QuotaKey::DailyQuizzes, false);

        assert!(!result.can_access);
        assert_eq!(result.reason, Some(AccessDeniedReason::UsageLimit));
        assert!(result.upgrade_required);
        let info = result.limit_info.unwrap();
        assert_eq!((info.used, info.limit), (5, 5));
        assert_eq!(info.reset_time, "12:00 AM");
    }

    #[test]
    fn check_without_increment_does_not_mutate_or_persist() {
        let (gate, store) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::DailyPractice, 1, 2),
        );

        let result = gate.can_use_practice_tools();

        assert!(result.can_access);
        assert_eq!(gate.usage_limits().daily_practice.used, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn check_with_increment_consumes_and_persists() {
        let (mut gate, store) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::DailyQuizzes, 4, 5),
        );

        let result = gate.check_usage_gate(QuotaKey::DailyQuizzes, true);

        assert!(result.can_access);
        assert_eq!(result.limit_info.unwrap().used, 5);
        assert_eq!(gate.usage_limits().daily_quizzes.used, 5);
        assert_eq!(stored_limits(&store).unwrap().daily_quizzes.used, 5);

        let again = gate.check_usage_gate(QuotaKey::DailyQuizzes, true);
        assert!(!again.can_access);
        assert_eq!(gate.usage_limits().daily_quizzes.used, 5);
    }

    #[test]
    fn premium_check_with_increment_consumes_nothing() {
        let (mut gate, store) = gate_with(
            Subscription::premium(),
            limits_with(QuotaKey::DailyQuizzes, 5, 5),
        );

        let result = gate.check_usage_gate(QuotaKey::DailyQuizzes, true);

        assert_eq!(result, AccessResult::allowed());
        assert_eq!(gate.usage_limits().daily_quizzes.used, 5);
        assert!(store.is_empty());
    }

    #[test]
    fn weekly_lesson_result_carries_next_sunday() {
        let (gate, _) = gate_with(Subscription::free(), UsageLimits::default());

        let result = gate.can_start_lesson();

        assert_eq!(result.limit_info.unwrap().reset_time, "3/16/2025");
    }

    #[test]
    fn subjects_quota_reports_never_reset() {
        let (gate, _) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::SubjectsAccess, 1, 1),
        );

        let result = gate.can_open_subject();

        assert!(!result.can_access);
        assert_eq!(result.limit_info.unwrap().reset_time, NEVER_RESETS);
    }

    #[test]
    fn named_checks_work_through_a_shared_borrow() {
        fn run_named_checks(gate: &AccessGate) -> Vec<AccessResult> {
            vec![
                gate.can_start_quiz(),
                gate.can_use_practice_tools(),
                gate.can_start_lesson(),
                gate.can_open_subject(),
            ]
        }

        let mut limits = UsageLimits::default();
        limits.set(QuotaKey::DailyQuizzes, UsageCounter::new(4, 5));
        limits.set(QuotaKey::DailyPractice, UsageCounter::new(2, 2));
        let (gate, store) = gate_with(Subscription::free(), limits);

        let results = run_named_checks(&gate);
        let again = run_named_checks(&gate);

        assert_eq!(results, again);
        assert!(results[0].can_access);
        assert!(!results[1].can_access);
        assert_eq!(*gate.usage_limits(), limits);
        assert!(store.is_empty());
    }

    #[test]
    fn premium_passes_all_four_quota_checks() {
        let mut exhausted = UsageLimits::default();
        for key in QuotaKey::ALL {
            let limit = exhausted.get(key).limit;
            exhausted.get_mut(key).used = limit;
        }
        let (gate, _) = gate_with(Subscription::premium(), exhausted);

        assert!(gate.can_start_quiz().can_access);
        assert!(gate.can_use_practice_tools().can_access);
        assert!(gate.can_start_lesson().can_access);
        assert!(gate.can_open_subject().can_access);
        assert!(gate.check_multi_subject_gate().can_access);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Multi-subject gate
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn multi_subject_gate_closes_after_first_subject() {
        let (mut gate, _) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::SubjectsAccess, 0, 1),
        );
        assert!(gate.check_multi_subject_gate().can_access);

        assert!(gate.increment_usage(QuotaKey::SubjectsAccess));

        let result = gate.check_multi_subject_gate();
        assert!(!result.can_access);
        assert_eq!(result.limit_info.unwrap().reset_time, NEVER_RESETS);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // increment_usage
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn increment_stops_at_limit() {
        let (mut gate, store) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::DailyPractice, 0, 2),
        );

        assert!(gate.increment_usage(QuotaKey::DailyPractice));
        assert!(gate.increment_usage(QuotaKey::DailyPractice));
        assert!(!gate.increment_usage(QuotaKey::DailyPractice));
        assert!(!gate.increment_usage(QuotaKey::DailyPractice));

        assert_eq!(gate.usage_limits().daily_practice.used, 2);
        assert_eq!(stored_limits(&store).unwrap().daily_practice.used, 2);
    }

    #[test]
    fn increment_is_noop_for_premium_plans() {
        for status in [SubscriptionStatus::Active, SubscriptionStatus::Expired] {
            let (mut gate, store) = gate_with(
                Subscription::premium().with_status(status),
                UsageLimits::default(),
            );

            assert!(!gate.increment_usage(QuotaKey::DailyQuizzes));
            assert_eq!(gate.usage_limits().daily_quizzes.used, 0);
            assert!(store.is_empty());
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Resets and helpers
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn daily_reset_leaves_weekly_and_subjects() {
        let mut limits = UsageLimits::default();
        for key in QuotaKey::ALL {
            limits.get_mut(key).used = 1;
        }
        let (mut gate, store) = gate_with(Subscription::free(), limits);

        gate.reset_daily_limits();

        let after = gate.usage_limits();
        assert_eq!(after.daily_quizzes.used, 0);
        assert_eq!(after.daily_practice.used, 0);
        assert_eq!(after.weekly_lessons.used, 1);
        assert_eq!(after.subjects_access.used, 1);
        assert_eq!(stored_limits(&store).unwrap(), *after);
    }

    #[test]
    fn weekly_reset_only_touches_lessons() {
        let mut limits = UsageLimits::default();
        for key in QuotaKey::ALL {
            limits.get_mut(key).used = 1;
        }
        let (mut gate, _) = gate_with(Subscription::free(), limits);

        gate.reset_weekly_limits();

        let after = gate.usage_limits();
        assert_eq!(after.weekly_lessons.used, 0);
        assert_eq!(after.daily_quizzes.used, 1);
        assert_eq!(after.subjects_access.used, 1);
    }

    #[test]
    fn reset_all_restores_defaults() {
        let (mut gate, _) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::WeeklyLessons, 9, 20),
        );

        gate.reset_all_limits(&UsageLimits::default());

        assert_eq!(*gate.usage_limits(), UsageLimits::default());
    }

    #[test]
    fn simulate_usage_caps_at_limit() {
        let (mut gate, _) = gate_with(Subscription::free(), UsageLimits::default());

        gate.simulate_usage(QuotaKey::DailyQuizzes, 3);
        assert_eq!(gate.usage_limits().daily_quizzes.used, 3);

        gate.simulate_usage(QuotaKey::DailyQuizzes, 100);
        assert_eq!(gate.usage_limits().daily_quizzes.used, 5);
    }

    #[test]
    fn usage_report_covers_every_key() {
        let (gate, _) = gate_with(
            Subscription::free(),
            limits_with(QuotaKey::DailyQuizzes, 2, 5),
        );

        let report = gate.usage_report();

        assert_eq!(report.len(), 4);
        assert_eq!(report[0].key, QuotaKey::DailyQuizzes);
        assert_eq!(report[0].remaining, 3);
        assert_eq!(report[0].percentage, 40);
        assert_eq!(gate.remaining_usage(QuotaKey::DailyQuizzes), 3);
        assert_eq!(gate.usage_percentage(QuotaKey::DailyQuizzes), 40);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Loading and persistence failures
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn load_from_empty_store_is_free_with_defaults() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let gate = AccessGate::load(store, &UsageLimits::default());

        assert_eq!(*gate.subscription(), Subscription::free());
        assert_eq!(*gate.usage_limits(), UsageLimits::default());
    }

    #[test]
    fn load_reads_profile_and_snapshot() {
        let store = Arc::new(InMemoryKeyValueStore::with_entries([
            (CURRENT_USER_KEY, r#"{"id":"u-7","subscriptionPlan":"premium"}"#),
            (USAGE_LIMITS_KEY, r#"{"dailyPractice":{"used":2,"limit":2}}"#),
        ]));

        let gate = AccessGate::load(store, &UsageLimits::default());

        assert!(gate.is_premium_user());
        assert!(!gate.is_free_tier());
        assert_eq!(gate.usage_limits().daily_practice, UsageCounter::new(2, 2));
        assert_eq!(gate.usage_limits().daily_quizzes, UsageCounter::fresh(5));
    }

    #[test]
    fn malformed_profile_means_free() {
        let store = Arc::new(InMemoryKeyValueStore::with_entries([(CURRENT_USER_KEY, "{oops")]));
        let gate = AccessGate::load(store, &UsageLimits::default());
        assert!(gate.is_free_tier());
    }

    #[test]
    fn reload_picks_up_upgrade() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let mut gate = AccessGate::load(store.clone(), &UsageLimits::default());
        assert!(!gate.is_premium_user());

        store
            .set(CURRENT_USER_KEY, r#"{"subscriptionPlan":"premium"}"#)
            .unwrap();
        gate.reload_subscription();

        assert!(gate.is_premium_user());
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let store: Arc<dyn KeyValueStore> = Arc::new(FailingStore);
        let mut gate = AccessGate::load(store, &UsageLimits::default()).with_clock(fixed_now);

        assert!(gate.is_free_tier());
        assert!(gate.increment_usage(QuotaKey::DailyQuizzes));
        assert_eq!(gate.usage_limits().daily_quizzes.used, 1);
        gate.reset_daily_limits();
        assert_eq!(gate.usage_limits().daily_quizzes.used, 0);
    }
}
