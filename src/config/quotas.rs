//! Free-tier quota configuration

use serde::Deserialize;

use crate::domain::usage::{UsageCounter, UsageLimits};

/// Seed limits for a new free account
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Quizzes per day
    #[serde(default = "default_daily_quizzes")]
    pub daily_quizzes: u32,

    /// Practice tool sessions per day
    #[serde(default = "default_daily_practice")]
    pub daily_practice: u32,

    /// Lessons per week
    #[serde(default = "default_weekly_lessons")]
    pub weekly_lessons: u32,

    /// Subjects per account
    #[serde(default = "default_subjects_access")]
    pub subjects_access: u32,
}

fn default_daily_quizzes() -> u32 {
    5
}

fn default_daily_practice() -> u32 {
    2
}

fn default_weekly_lessons() -> u32 {
    10
}

fn default_subjects_access() -> u32 {
    1
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_quizzes: default_daily_quizzes(),
            daily_practice: default_daily_practice(),
            weekly_lessons: default_weekly_lessons(),
            subjects_access: default_subjects_access(),
        }
    }
}

impl QuotaConfig {
    /// Seed counters, nothing used
    pub fn defaults(&self) -> UsageLimits {
        UsageLimits {
            daily_quizzes: UsageCounter::fresh(self.daily_quizzes),
            daily_practice: UsageCounter::fresh(self.daily_practice),
            weekly_lessons: UsageCounter::fresh(self.weekly_lessons),
            subjects_access: UsageCounter::fresh(self.subjects_access),
        }
    }
}
