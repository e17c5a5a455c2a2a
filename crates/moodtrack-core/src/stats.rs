//! Summary statistics over a mood history.
//!
//! The doctor's patient view shows the overall average, and the count and
//! average of entries from the last seven days.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Mood, PatientMoodEntry};

/// Length of the recent-activity window
const WEEK_DAYS: i64 = 7;

/// Anything with a rating and a date
pub trait RatedEntry {
    fn rate(&self) -> u8;
    fn recorded_at(&self) -> Option<DateTime<Utc>>;
}

impl RatedEntry for Mood {
    fn rate(&self) -> u8 {
        self.rate
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.parsed_date()
    }
}

impl RatedEntry for PatientMoodEntry {
    fn rate(&self) -> u8 {
        self.rate
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.parsed_date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekStats {
    pub count: usize,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodStats {
    pub count: usize,
    pub average: Option<f64>,
    pub week: WeekStats,
}

impl MoodStats {
    pub fn compute<E: RatedEntry>(entries: &[E], now: DateTime<Utc>) -> Self {
        Self {
            count: entries.len(),
            average: average(entries.iter().map(RatedEntry::rate)),
            week: week_stats(entries, now),
        }
    }

    /// The overall average as the nearest whole rating
    pub fn rounded_average(&self) -> Option<u8> {
        self.average.map(rounded_rating)
    }
}

/// Mean of the ratings, or `None` for an empty history
pub fn average(rates: impl IntoIterator<Item = u8>) -> Option<f64> {
    let (sum, count) = rates
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), rate| (sum + u32::from(rate), count + 1));
    (count > 0).then(|| f64::from(sum) / f64::from(count))
}

/// Entries dated within the last seven days (inclusive of the boundary).
/// Entries with an unreadable date are left out.
pub fn week_stats<E: RatedEntry>(entries: &[E], now: DateTime<Utc>) -> WeekStats {
    let cutoff = now - Duration::days(WEEK_DAYS);
    let recent: Vec<u8> = entries
        .iter()
        .filter(|e| e.recorded_at().is_some_and(|at| at >= cutoff))
        .map(RatedEntry::rate)
        .collect();

    WeekStats {
        count: recent.len(),
        average: average(recent),
    }
}

/// Round an average to the nearest whole rating (halves round up)
pub fn rounded_rating(average: f64) -> u8 {
    average.round().clamp(0.0, f64::from(u8::MAX)) as u8
}
