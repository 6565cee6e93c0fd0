/// Field reading vs. recorder comparison.
///
/// The recorder value at the reading's time is linearly interpolated between
/// the unit value at or just before the reading and the one after it. The
/// discrepancy is `interpolated - reading`, in feet, to three decimals.

use chrono::{Duration, NaiveDateTime};

use crate::model::{round_to, DataPoint};

/// Index of the point with the smallest non-negative elapsed time to `at`.
/// The earliest of equally close points wins.
pub fn prior_point_index(points: &[DataPoint], at: NaiveDateTime) -> Option<usize> {
    let mut best: Option<(usize, Duration)> = None;
    for (i, p) in points.iter().enumerate() {
        let elapsed = at - p.datetime;
        if elapsed < Duration::zero() {
            continue;
        }
        if best.map_or(true, |(_, b)| elapsed < b) {
            best = Some((i, elapsed));
        }
    }
    best.map(|(i, _)| i)
}

/// Interpolate between `prior` and `next` at `at` and compare with `value`.
pub fn interpolated_discrepancy(
    at: NaiveDateTime,
    value: f64,
    prior: &DataPoint,
    next: &DataPoint,
) -> Option<f64> {
    let (p, n) = (prior.value?, next.value?);
    let span = (next.datetime - prior.datetime).num_seconds();
    let interpolated = if span == 0 {
        p
    } else {
        let fraction = (at - prior.datetime).num_seconds() as f64 / span as f64;
        p + fraction * (n - p)
    };
    Some(round_to(interpolated - value, 3))
}

/// Discrepancy of a reading against a time-ordered bordering window.
///
/// `None` when there is no unit value at or before the reading, when that
/// value is the last in the window, or when either neighbor is a gap.
pub fn reading_discrepancy(points: &[DataPoint], at: NaiveDateTime, value: f64) -> Option<f64> {
    let i = prior_point_index(points, at)?;
    let next = points.get(i + 1)?;
    interpolated_discrepancy(at, value, &points[i], next)
}
