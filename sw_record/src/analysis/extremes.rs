/// Record minimum and maximum unit values.
///
/// Points stay in time order; the extreme is returned as an index into the
/// slice. Among tied points the earliest is the extreme, and every point
/// sharing the extreme value is marked `unique = false`. Gap points (no
/// value) never qualify.

use crate::model::{DataPoint, Qualifier, QUALIFIER_ESTIMATED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

/// Select the extreme point and flag ties. Returns `None` when no point has
/// a value.
pub fn assess_extreme(points: &mut [DataPoint], which: Extreme) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let Some(v) = p.value else { continue };
        let better = match (best, which) {
            (None, _) => true,
            (Some((_, b)), Extreme::Max) => v > b,
            (Some((_, b)), Extreme::Min) => v < b,
        };
        if better {
            best = Some((i, v));
        }
    }

    let (index, value) = best?;
    let ties = points.iter().filter(|p| p.value == Some(value)).count();
    if ties > 1 {
        for p in points.iter_mut().filter(|p| p.value == Some(value)) {
            p.unique = false;
        }
    }
    Some(index)
}

/// True when `point` lies inside any ESTIMATED qualifier.
pub fn is_estimated(point: &DataPoint, qualifiers: &[Qualifier]) -> bool {
    qualifiers
        .iter()
        .any(|q| q.identifier == QUALIFIER_ESTIMATED && q.covers(point.datetime))
}
