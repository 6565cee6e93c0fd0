/// Gap detection over a full-coverage unit-value response.
///
/// With `IncludeGapMarkers`, Aquarius inserts one marker point (empty value
/// or `EMPTY`) wherever the record breaks. The gap runs from the marker's
/// previous neighbor to its next neighbor. Markers at either end of the
/// response have only one neighbor and are skipped.

use chrono::NaiveDateTime;

use crate::model::Gap;

/// One full-coverage sample: minute-precision timestamp and whether the
/// point is a gap marker.
pub type CoverageSample = (NaiveDateTime, bool);

pub fn find_gaps(samples: &[CoverageSample]) -> Vec<Gap> {
    if samples.len() < 3 {
        return Vec::new();
    }

    samples
        .windows(3)
        .filter(|w| w[1].1)
        .map(|w| Gap::between(w[0].0, w[2].0))
        .collect()
}

/// A window with no points at all is one gap spanning the window.
pub fn whole_window_gap(start: NaiveDateTime, end: NaiveDateTime) -> Gap {
    Gap::between(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_single_interior_marker_is_bounded_by_neighbors() {
        let samples = vec![
            (t(0, 0), false),
            (t(0, 15), false),
            (t(1, 0), true),
            (t(3, 30), false),
            (t(3, 45), false),
        ];
        let gaps = find_gaps(&samples);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start, t(0, 15));
        assert_eq!(gaps[0].end, t(3, 30));
        assert_eq!(gaps[0].length, Duration::minutes(195));
    }

    #[test]
    fn test_boundary_markers_are_ignored() {
        let samples = vec![(t(0, 0), true), (t(0, 15), false), (t(0, 30), true)];
        assert!(find_gaps(&samples).is_empty());
    }

    #[test]
    fn test_no_markers_no_gaps() {
        let samples: Vec<CoverageSample> = (0..8).map(|i| (t(i, 0), false)).collect();
        assert!(find_gaps(&samples).is_empty());
    }

    #[test]
    fn test_two_separate_gaps() {
        let samples = vec![
            (t(0, 0), false),
            (t(1, 0), true),
            (t(2, 0), false),
            (t(3, 0), false),
            (t(4, 0), true),
            (t(6, 0), false),
        ];
        let gaps = find_gaps(&samples);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[1].start, t(3, 0));
        assert_eq!(gaps[1].length, Duration::hours(3));
    }

    #[test]
    fn test_whole_window_gap() {
        let gap = whole_window_gap(t(0, 0), t(23, 59));
        assert_eq!(gap.start, t(0, 0));
        assert_eq!(gap.end, t(23, 59));
        assert_eq!(gap.length, Duration::minutes(23 * 60 + 59));
    }
}
