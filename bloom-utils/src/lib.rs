//! Shared utility functions for the bloom timing crates.

/// Date utility functions
pub mod dates {
    use anyhow::Context;
    use chrono::{Datelike, NaiveDate};
    use std::ops::RangeInclusive;

    /// Date format used for observation records and reports: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .with_context(|| format!("date must be YYYY-MM-DD, got {s:?}"))
    }

    /// Day of the calendar year, 1 = Jan 1, 366 = Dec 31 of a leap year.
    ///
    /// Each date is converted against its own year; there is no
    /// cross-year wrapping.
    pub fn day_of_year(date: &NaiveDate) -> u32 {
        date.ordinal()
    }

    /// The historical baseline years for a run in `current_year`:
    /// the `years` calendar years immediately before it.
    /// e.g., current year 2026 with 9 years -> 2017..=2025
    pub fn baseline_window(current_year: i32, years: u32) -> RangeInclusive<i32> {
        let years = i32::try_from(years).unwrap_or(i32::MAX);
        current_year.saturating_sub(years)..=current_year.saturating_sub(1)
    }

    /// First calendar year an observation may carry for a run in
    /// `current_year` (start of the baseline window).
    pub fn window_start(current_year: i32, years: u32) -> i32 {
        *baseline_window(current_year, years).start()
    }

}
