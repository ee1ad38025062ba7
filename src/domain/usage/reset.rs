//! Reset-time computation for quota display.
//!
//! Pure functions over a local wall-clock "now". The caller supplies the
//! time so results are deterministic under test.

use chrono::{Datelike, Days, NaiveDateTime};

use super::{QuotaKey, ResetPeriod};

/// Display value for the structural subjects limit.
pub const NEVER_RESETS: &str = "Never (upgrade required)";

/// Shown when the next reset cannot be computed (calendar overflow).
pub const RESET_UNKNOWN: &str = "N/A";

/// The local instant at which `key` next rolls over.
///
/// Daily keys reset at the next midnight. The weekly key resets at midnight
/// starting the next Sunday, which is always one to seven days away, so a
/// Sunday "now" yields the following Sunday. Structural keys never reset.
pub fn next_reset(key: QuotaKey, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    let reset_day = match key.period() {
        ResetPeriod::Daily => today.succ_opt()?,
        ResetPeriod::Weekly => {
            let days_ahead = 7 - u64::from(today.weekday().num_days_from_sunday());
            today.checked_add_days(Days::new(days_ahead))?
        }
        ResetPeriod::Never => return None,
    };
    reset_day.and_hms_opt(0, 0, 0)
}

/// Formats the next reset for display.
///
/// Daily keys render the reset instant's clock time, which is always
/// `12:00 AM`. Weekly keys render the reset date as `M/D/YYYY`.
pub fn reset_time(key: QuotaKey, now: NaiveDateTime) -> String {
    if key.period() == ResetPeriod::Never {
        return NEVER_RESETS.to_string();
    }

    match (key.period(), next_reset(key, now)) {
        (ResetPeriod::Daily, Some(at)) => at.format("%I:%M %p").to_string(),
        (ResetPeriod::Weekly, Some(at)) => at.format("%-m/%-d/%Y").to_string(),
        _ => RESET_UNKNOWN.to_string(),
    }
}
