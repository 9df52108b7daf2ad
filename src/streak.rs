//! Daily streak policy
//!
//! Streaks count consecutive calendar days. Days are compared in the time zone
//! of the supplied `now`, not by instant, so two timestamps on the same local
//! day are the same day regardless of time-of-day.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Result of evaluating the streak policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub new_streak: u32,
    pub new_last_active: DateTime<Utc>,
}

/// Compute the next streak count.
///
/// - same calendar day as `now`: unchanged, `last_active` kept
/// - the calendar day before `now`: `current_streak + 1`
/// - no prior date, a gap of two or more days, or a date after `now`: reset to 1
pub fn next_streak<Tz: TimeZone>(
    last_active: Option<DateTime<Utc>>,
    current_streak: u32,
    now: &DateTime<Tz>,
) -> StreakUpdate {
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    let Some(last) = last_active else {
        return StreakUpdate {
            new_streak: 1,
            new_last_active: now_utc,
        };
    };

    let last_day = last.with_timezone(&now.timezone()).date_naive();

    if last_day == today {
        return StreakUpdate {
            new_streak: current_streak,
            new_last_active: last,
        };
    }

    // Future dates fall through to the reset branch
    let new_streak = if today.pred_opt() == Some(last_day) {
        current_streak.saturating_add(1)
    } else {
        1
    };

    StreakUpdate {
        new_streak,
        new_last_active: now_utc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use pretty_assertions::assert_eq;

    fn day1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 15, 0).unwrap()
    }

    #[test]
    fn test_same_day_is_unchanged() {
        let later_same_day = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
        let update = next_streak(Some(day1()), 5, &later_same_day);

        assert_eq!(
            update,
            StreakUpdate {
                new_streak: 5,
                new_last_active: day1(),
            }
        );
    }

    #[test]
    fn test_consecutive_day_increments() {
        let day2 = Utc.with_ymd_and_hms(2024, 3, 11, 0, 5, 0).unwrap();
        let update = next_streak(Some(day1()), 5, &day2);

        assert_eq!(update.new_streak, 6);
        assert_eq!(update.new_last_active, day2);
    }

    #[test]
    fn test_gap_resets() {
        let day4 = day1() + Duration::days(3);
        let update = next_streak(Some(day1()), 5, &day4);

        assert_eq!(update.new_streak, 1);
        assert_eq!(update.new_last_active, day4);
    }

    #[test]
    fn test_no_prior_date_resets() {
        let update = next_streak(None, 0, &day1());
        assert_eq!(update.new_streak, 1);
        assert_eq!(update.new_last_active, day1());
    }

    #[test]
    fn test_future_last_active_resets() {
        let future = day1() + Duration::days(2);
        let update = next_streak(Some(future), 7, &day1());

        assert_eq!(update.new_streak, 1);
        assert_eq!(update.new_last_active, day1());
    }

    #[test]
    fn test_calendar_day_in_local_zone() {
        // 23:30 UTC on the 10th is already the 11th in UTC+2
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let now = plus_two.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();

        let update = next_streak(Some(last), 4, &now);
        assert_eq!(update.new_streak, 4);
        assert_eq!(update.new_last_active, last);

        // In UTC the same pair of instants spans two days
        let update = next_streak(Some(last), 4, &now.with_timezone(&Utc));
        assert_eq!(update.new_streak, 5);
    }

    #[test]
    fn test_idempotent_within_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 11, 7, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 11, 21, 0, 0).unwrap();

        let first = next_streak(Some(day1()), 2, &morning);
        let second = next_streak(Some(first.new_last_active), first.new_streak, &evening);

        assert_eq!(first.new_streak, 3);
        assert_eq!(second, first);
    }
}
