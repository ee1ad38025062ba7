//! Quota keys - the closed set of tracked usage counters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// One of the four usage counters tracked for free accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotaKey {
    /// Quizzes started today.
    DailyQuizzes,
    /// Practice tool sessions today.
    DailyPractice,
    /// Lessons opened this week.
    WeeklyLessons,
    /// Subjects unlocked on the account. Never resets.
    SubjectsAccess,
}

/// How often a quota counter rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPeriod {
    /// At local midnight.
    Daily,
    /// At local midnight of the next week start (Sunday).
    Weekly,
    /// Structural limit; only an upgrade lifts it.
    Never,
}

impl QuotaKey {
    /// Every key, in storage order.
    pub const ALL: [QuotaKey; 4] = [
        QuotaKey::DailyQuizzes,
        QuotaKey::DailyPractice,
        QuotaKey::WeeklyLessons,
        QuotaKey::SubjectsAccess,
    ];

    /// Keys cleared by the daily reset.
    pub const DAILY: [QuotaKey; 2] = [QuotaKey::DailyQuizzes, QuotaKey::DailyPractice];

    /// Keys cleared by the weekly reset.
    pub const WEEKLY: [QuotaKey; 1] = [QuotaKey::WeeklyLessons];

    /// The key's name in the persisted snapshot.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaKey::DailyQuizzes => "dailyQuizzes",
            QuotaKey::DailyPractice => "dailyPractice",
            QuotaKey::WeeklyLessons => "weeklyLessons",
            QuotaKey::SubjectsAccess => "subjectsAccess",
        }
    }

    pub fn period(&self) -> ResetPeriod {
        match self {
            QuotaKey::DailyQuizzes | QuotaKey::DailyPractice => ResetPeriod::Daily,
            QuotaKey::WeeklyLessons => ResetPeriod::Weekly,
            QuotaKey::SubjectsAccess => ResetPeriod::Never,
        }
    }
}

impl fmt::Display for QuotaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuotaKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuotaKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| ValidationError::unknown_value("quota key", s))
    }
}
