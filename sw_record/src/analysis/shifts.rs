/// Shift-curve shape classification.
///
/// A shift curve is an ordered list of (gage height, offset) input points
/// applied on top of a base rating. Its "shape" is a hydrographer's name for
/// the pattern of zero and non-zero offsets, used in the record's shift
/// table together with a short rendering of the magnitude.

use std::fmt;

use serde::Serialize;

use crate::model::{round_to, ShiftInputPoint};

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShiftShape {
    NullShift,
    FullRating,
    HalfHouse,
    ReverseHalfHouse,
    CrookedHalfHouse,
    CrookedReverseHalfHouse,
    Trellis,
    AsymmetricTrellis,
    NonStandard,
}

impl fmt::Display for ShiftShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftShape::NullShift => "Null-Shift",
            ShiftShape::FullRating => "Full-Rating Shift",
            ShiftShape::HalfHouse => "Half-House",
            ShiftShape::ReverseHalfHouse => "Reverse Half-House",
            ShiftShape::CrookedHalfHouse => "Crooked Half-House",
            ShiftShape::CrookedReverseHalfHouse => "Crooked Reverse Half-House",
            ShiftShape::Trellis => "Trellis",
            ShiftShape::AsymmetricTrellis => "Asymmetric Trellis",
            ShiftShape::NonStandard => "NON-STANDARD",
        };
        write!(f, "{}", name)
    }
}

fn same_sign(a: f64, b: f64) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

/// Shape for a pair of equal-or-not non-zero offsets: `equal` when they
/// match, `crooked` when they differ with the same sign.
fn paired_shape(a: f64, b: f64, equal: ShiftShape, crooked: ShiftShape) -> ShiftShape {
    if a == b {
        equal
    } else if same_sign(a, b) {
        crooked
    } else {
        ShiftShape::NonStandard
    }
}

fn classify_three(a: f64, b: f64, c: f64) -> ShiftShape {
    match (a == 0.0, b == 0.0, c == 0.0) {
        (true, true, true) => ShiftShape::NullShift,
        (true, true, false) => ShiftShape::ReverseHalfHouse,
        (true, false, true) => ShiftShape::Trellis,
        (true, false, false) => paired_shape(
            b,
            c,
            ShiftShape::ReverseHalfHouse,
            ShiftShape::CrookedReverseHalfHouse,
        ),
        (false, true, true) => ShiftShape::HalfHouse,
        (false, true, false) => ShiftShape::NonStandard,
        (false, false, true) => {
            paired_shape(a, b, ShiftShape::HalfHouse, ShiftShape::CrookedHalfHouse)
        }
        (false, false, false) => ShiftShape::FullRating,
    }
}

/// Classify a shift by its offsets (feet). Offsets are rounded to
/// hundredths before comparison.
///
/// Four or more points that start and end at zero with a same-sign interior
/// are trellises; only other long shifts fall back to their first three points.
pub fn classify_shape(offsets: &[f64]) -> ShiftShape {
    let rounded: Vec<f64> = offsets.iter().map(|o| round_to(*o, 2)).collect();

    match rounded.as_slice() {
        [] => ShiftShape::NonStandard,
        [a] => {
            if *a == 0.0 {
                ShiftShape::NullShift
            } else {
                ShiftShape::FullRating
            }
        }
        [a, b] => match (*a == 0.0, *b == 0.0) {
            (true, true) => ShiftShape::NullShift,
            (false, true) => ShiftShape::HalfHouse,
            (true, false) => ShiftShape::ReverseHalfHouse,
            (false, false) => ShiftShape::FullRating,
        },
        [a, b, c] => classify_three(*a, *b, *c),
        [first, interior @ .., last] => {
            let zero_ended = *first == 0.0 && *last == 0.0;
            let interior_nonzero = interior.iter().all(|o| *o != 0.0);
            if zero_ended && interior_nonzero {
                let lead = interior[0];
                if interior.iter().all(|o| *o == lead) {
                    return ShiftShape::Trellis;
                }
                if interior.iter().all(|o| same_sign(*o, lead)) {
                    return ShiftShape::AsymmetricTrellis;
                }
            }
            classify_three(rounded[0], rounded[1], rounded[2])
        }
    }
}

// ---------------------------------------------------------------------------
// Reported magnitude
// ---------------------------------------------------------------------------

/// The magnitude column of the shift table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedMagnitude {
    pub text: String,
    /// Set when `text` is the full input-point list rather than one value.
    pub long: bool,
}

/// True when any input-point gage height differs from the previous shift's
/// point at the same position.
pub fn input_gage_heights_changed(
    previous: Option<&[ShiftInputPoint]>,
    current: &[ShiftInputPoint],
) -> bool {
    match previous {
        None => false,
        Some(prev) => prev
            .iter()
            .zip(current)
            .any(|(p, c)| p.gage_height != c.gage_height),
    }
}

pub fn reported_magnitude(
    shape: ShiftShape,
    points: &[ShiftInputPoint],
    gage_heights_changed: bool,
) -> ReportedMagnitude {
    let full = || ReportedMagnitude {
        text: format_input_points(points),
        long: true,
    };

    if gage_heights_changed {
        return full();
    }
    match (shape, points.first()) {
        (ShiftShape::NullShift, _) => ReportedMagnitude {
            text: "0.00'".to_string(),
            long: false,
        },
        (ShiftShape::HalfHouse, Some(first)) => ReportedMagnitude {
            text: format!("{:.2}'", round_to(first.offset, 2)),
            long: false,
        },
        _ => full(),
    }
}

/// `(1.00', 0.02'), (2.50', 0.00')`, or `None` for an empty list.
pub fn format_input_points(points: &[ShiftInputPoint]) -> String {
    if points.is_empty() {
        return "None".to_string();
    }
    points
        .iter()
        .map(|p| format!("({:.2}', {:.2}')", p.gage_height, p.offset))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `1.00', 2.50'`, or `None` for an empty list.
pub fn format_input_gage_heights(points: &[ShiftInputPoint]) -> String {
    if points.is_empty() {
        return "None".to_string();
    }
    points
        .iter()
        .map(|p| format!("{:.2}'", p.gage_height))
        .collect::<Vec<_>>()
        .join(", ")
}
