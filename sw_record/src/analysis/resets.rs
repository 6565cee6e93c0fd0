/// Recorder reset amounts.
///
/// When a technician resets the recorder they log a `ResetBefore` and a
/// `ResetAfter` reading. The reset amount is `after - before`. A visit may
/// reset more than once, and data entry is not always tidy, so pairing is
/// done in time order and anything that cannot be paired becomes a warning.

use chrono::NaiveDateTime;

use crate::model::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetReading {
    pub kind: ResetKind,
    pub datetime: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetResolution {
    /// Reset amounts in feet, in time order.
    pub amounts: Vec<f64>,
    pub warnings: Vec<String>,
}

pub fn resolve_resets(readings: &[ResetReading]) -> ResetResolution {
    if readings.len() < 2 {
        return ResetResolution::default();
    }

    if readings.len() == 2 {
        let before = readings.iter().find(|r| r.kind == ResetKind::Before);
        let after = readings.iter().find(|r| r.kind == ResetKind::After);
        if let (Some(b), Some(a)) = (before, after) {
            return ResetResolution {
                amounts: vec![round_to(a.value - b.value, 2)],
                warnings: Vec::new(),
            };
        }
    }

    pair_in_time_order(readings)
}

fn pair_in_time_order(readings: &[ResetReading]) -> ResetResolution {
    let mut sorted = readings.to_vec();
    sorted.sort_by_key(|r| r.datetime);

    let mut consumed = vec![false; sorted.len()];
    let mut resolution = ResetResolution::default();

    for i in 0..sorted.len() {
        if consumed[i] {
            continue;
        }
        let reading = sorted[i];
        match reading.kind {
            ResetKind::Before => {
                let partner = (i + 1..sorted.len())
                    .find(|&j| !consumed[j] && sorted[j].kind == ResetKind::After);
                match partner {
                    Some(j) => {
                        for flag in consumed.iter_mut().take(j + 1).skip(i) {
                            *flag = true;
                        }
                        resolution
                            .amounts
                            .push(round_to(sorted[j].value - reading.value, 2));
                    }
                    None => {
                        consumed[i] = true;
                        resolution.warnings.push(format!(
                            "before reset reading at {} without after reading",
                            reading.datetime
                        ));
                    }
                }
            }
            ResetKind::After => {
                consumed[i] = true;
                resolution.warnings.push(format!(
                    "after reset reading at {} without before reading",
                    reading.datetime
                ));
            }
        }
    }

    resolution
}
