/// USGS water years run October 1 through September 30 and are named for
/// the calendar year in which they end.

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{RecordError, Result};

pub fn water_year_of(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    if date.month() < 10 {
        date.year()
    } else {
        date.year() + 1
    }
}

/// `(year-1)-10-01 00:00:00` through `year-09-30 23:59:59`.
pub fn water_year_window(year: i32) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year - 1, 10, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let end = NaiveDate::from_ymd_opt(year, 9, 30).and_then(|d| d.and_hms_opt(23, 59, 59));
    match (start, end) {
        (Some(s), Some(e)) => Ok((s, e)),
        _ => Err(RecordError::InvalidInput(format!(
            "water year {} is out of range",
            year
        ))),
    }
}

/// Every water year touched by `[start, end]`.
pub fn water_years_spanning(start: NaiveDate, end: NaiveDate) -> RangeInclusive<i32> {
    water_year_of(start)..=water_year_of(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_water_year_boundary() {
        assert_eq!(water_year_of(d(2023, 9, 30)), 2023);
        assert_eq!(water_year_of(d(2023, 10, 1)), 2024);
        assert_eq!(water_year_of(d(2024, 1, 15)), 2024);
    }

    #[test]
    fn test_water_year_window() {
        let (start, end) = water_year_window(2024).unwrap();
        assert_eq!(start.to_string(), "2023-10-01 00:00:00");
        assert_eq!(end.to_string(), "2024-09-30 23:59:59");
    }

    #[test]
    fn test_record_spanning_two_water_years() {
        let years: Vec<i32> = water_years_spanning(d(2023, 6, 1), d(2024, 5, 31)).collect();
        assert_eq!(years, vec![2023, 2024]);
    }

    #[test]
    fn test_record_within_one_water_year() {
        let years: Vec<i32> = water_years_spanning(d(2023, 10, 1), d(2024, 9, 30)).collect();
        assert_eq!(years, vec![2024]);
    }
}
