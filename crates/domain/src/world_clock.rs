use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CalendarDefinition, CalendarId};

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_START_YEAR: i32 = 1024;
pub const DEFAULT_START_MONTH: u32 = 3;
pub const DEFAULT_START_DAY: u32 = 14;
pub const DEFAULT_START_HOUR: u32 = 9;
pub const DEFAULT_START_MINUTE: u32 = 30;

// =============================================================================
// World Clock
// =============================================================================

/// In-world time with minute granularity.
///
/// Months, days and hours are 1-indexed/0-indexed the way people read them:
/// `month` and `day` start at 1, `hour` and `minute` start at 0. The clock only
/// moves forward; there is no API to set it to an earlier instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    pub calendar: CalendarId,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// Real-world timestamp of the last change.
    pub updated_at: DateTime<Utc>,
}

impl WorldClock {
    /// A fresh clock at the default starting instant (1024-03-14 09:30).
    pub fn starting(calendar: CalendarId, now: DateTime<Utc>) -> Self {
        let mut clock = Self {
            calendar,
            year: DEFAULT_START_YEAR,
            month: DEFAULT_START_MONTH,
            day: DEFAULT_START_DAY,
            hour: DEFAULT_START_HOUR,
            minute: DEFAULT_START_MINUTE,
            updated_at: now,
        };
        clock.normalize();
        clock
    }

    pub fn calendar_definition(&self) -> CalendarDefinition {
        CalendarDefinition::resolve(&self.calendar)
    }

    /// Advance by `minutes`, carrying into hours, days, months and years.
    ///
    /// Zero minutes leaves the time untouched but still stamps `updated_at`.
    pub fn advance_minutes(&mut self, minutes: u32, now: DateTime<Utc>) {
        self.normalize();
        let cal = self.calendar_definition();
        let minutes_per_hour = u64::from(cal.minutes_per_hour());
        let hours_per_day = u64::from(cal.hours_per_day());

        let total_minutes = u64::from(self.minute) + u64::from(minutes);
        self.minute = (total_minutes % minutes_per_hour) as u32;

        let total_hours = u64::from(self.hour) + total_minutes / minutes_per_hour;
        self.hour = (total_hours % hours_per_day) as u32;

        let mut days = total_hours / hours_per_day;
        while days > 0 {
            let remaining_in_month = u64::from(cal.days_in_month(self.month) - self.day);
            if days <= remaining_in_month {
                self.day += days as u32;
                days = 0;
            } else {
                days -= remaining_in_month + 1;
                self.day = 1;
                self.month += 1;
                if self.month > cal.month_count() {
                    self.month = 1;
                    self.year += 1;
                }
            }
        }

        self.updated_at = now;
    }

    /// Returns a copy advanced by `minutes`.
    pub fn advanced_by(&self, minutes: u32, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.advance_minutes(minutes, now);
        next
    }

    /// Minutes elapsed since year 0, month 1, day 1, 00:00 in this clock's calendar.
    ///
    /// Used to compare two observations of the same clock.
    pub fn absolute_minutes(&self) -> i64 {
        let cal = self.calendar_definition();
        let days_per_year: i64 = (1..=cal.month_count())
            .map(|m| i64::from(cal.days_in_month(m)))
            .sum();
        let days_before_month: i64 = (1..self.month.max(1))
            .map(|m| i64::from(cal.days_in_month(m)))
            .sum();
        let day_index = i64::from(self.year) * days_per_year
            + days_before_month
            + i64::from(self.day.max(1) - 1);
        (day_index * i64::from(cal.hours_per_day()) + i64::from(self.hour))
            * i64::from(cal.minutes_per_hour())
            + i64::from(self.minute)
    }

    /// Coarse segment of the day used for sub-zone state.
    pub fn time_segment(&self) -> &'static str {
        let hours_per_day = self.calendar_definition().hours_per_day().max(1);
        let fraction = f64::from(self.hour) / f64::from(hours_per_day);
        if fraction < 5.0 / 24.0 {
            "night"
        } else if fraction < 7.0 / 24.0 {
            "dawn"
        } else if fraction < 18.0 / 24.0 {
            "day"
        } else if fraction < 20.0 / 24.0 {
            "dusk"
        } else {
            "night"
        }
    }

    /// Human-readable timestamp, e.g. "1024-03-14 09:30".
    pub fn display(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }

    /// Pull fields back into the calendar's ranges.
    ///
    /// Needed when a clock was stored under a different layout.
    fn normalize(&mut self) {
        let cal = self.calendar_definition();
        self.month = self.month.clamp(1, cal.month_count());
        self.day = self.day.clamp(1, cal.days_in_month(self.month));
        self.hour = self.hour.min(cal.hours_per_day() - 1);
        self.minute = self.minute.min(cal.minutes_per_hour() - 1);
    }
}

impl std::fmt::Display for WorldClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
