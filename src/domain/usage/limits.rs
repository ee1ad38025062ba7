//! Usage counters and the persisted limits snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::QuotaKey;

/// A single usage counter.
///
/// `used` may sit at or above `limit`; the key is exhausted from then
/// until the next reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub used: u32,
    pub limit: u32,
}

impl UsageCounter {
    pub fn new(used: u32, limit: u32) -> Self {
        Self { used, limit }
    }

    /// A counter with nothing used yet.
    pub fn fresh(limit: u32) -> Self {
        Self { used: 0, limit }
    }

    /// Strictly below the limit.
    pub fn has_capacity(&self) -> bool {
        self.used < self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        !self.has_capacity()
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    /// Share of the quota used, rounded to a whole percent.
    ///
    /// A zero limit counts as fully used.
    pub fn percentage(&self) -> u32 {
        if self.limit == 0 {
            return 100;
        }
        ((self.used as f64 / self.limit as f64) * 100.0).round() as u32
    }
}

/// All four counters, persisted as one JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimits {
    pub daily_quizzes: UsageCounter,
    pub daily_practice: UsageCounter,
    pub weekly_lessons: UsageCounter,
    pub subjects_access: UsageCounter,
}

impl Default for UsageLimits {
    /// | Key | Limit |
    /// |-----|-------|
    /// | dailyQuizzes | 5 |
    /// | dailyPractice | 2 |
    /// | weeklyLessons | 10 |
    /// | subjectsAccess | 1 |
    fn default() -> Self {
        Self {
            daily_quizzes: UsageCounter::fresh(5),
            daily_practice: UsageCounter::fresh(2),
            weekly_lessons: UsageCounter::fresh(10),
            subjects_access: UsageCounter::fresh(1),
        }
    }
}

impl UsageLimits {
    pub fn get(&self, key: QuotaKey) -> UsageCounter {
        match key {
            QuotaKey::DailyQuizzes => self.daily_quizzes,
            QuotaKey::DailyPractice => self.daily_practice,
            QuotaKey::WeeklyLessons => self.weekly_lessons,
            QuotaKey::SubjectsAccess => self.subjects_access,
        }
    }

    pub fn get_mut(&mut self, key: QuotaKey) -> &mut UsageCounter {
        match key {
            QuotaKey::DailyQuizzes => &mut self.daily_quizzes,
            QuotaKey::DailyPractice => &mut self.daily_practice,
            QuotaKey::WeeklyLessons => &mut self.weekly_lessons,
            QuotaKey::SubjectsAccess => &mut self.subjects_access,
        }
    }

    pub fn set(&mut self, key: QuotaKey, counter: UsageCounter) {
        *self.get_mut(key) = counter;
    }

    /// Counters in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (QuotaKey, UsageCounter)> + '_ {
        QuotaKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Same limits, nothing used.
    pub fn zeroed(&self) -> Self {
        let mut limits = *self;
        for key in QuotaKey::ALL {
            limits.get_mut(key).used = 0;
        }
        limits
    }

    /// Sets `used` to zero for each of `keys`.
    pub fn reset(&mut self, keys: &[QuotaKey]) {
        for key in keys {
            self.get_mut(*key).used = 0;
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Overlays a persisted snapshot on `defaults`, key by key.
    ///
    /// Entries that are missing or malformed keep their default, so a
    /// partially corrupt snapshot only loses the damaged keys. A snapshot
    /// that is not a JSON object yields the defaults unchanged.
    pub fn merge_snapshot(defaults: &UsageLimits, raw: &str) -> UsageLimits {
        let mut merged = *defaults;

        let object = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                warn!("usage limits snapshot is not an object, using defaults");
                return merged;
            }
            Err(err) => {
                warn!(error = %err, "failed to parse usage limits snapshot, using defaults");
                return merged;
            }
        };

        for key in QuotaKey::ALL {
            let Some(entry) = object.get(key.as_str()) else {
                continue;
            };
            match serde_json::from_value::<UsageCounter>(entry.clone()) {
                Ok(counter) => merged.set(key, counter),
                Err(err) => {
                    warn!(quota = %key, error = %err, "malformed usage entry, keeping default");
                }
            }
        }

        merged
    }
}
