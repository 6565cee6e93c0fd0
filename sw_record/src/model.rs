/// Core data types for the surface water record analysis core.
///
/// This module defines the shared domain model imported by all other modules:
/// unit values, gaps, qualifiers, corrections, sensors, and the error type
/// every fallible operation returns. It contains no logic beyond small
/// constructors and predicates, and no I/O.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Parameter names (as Aquarius reports them)
// ---------------------------------------------------------------------------

/// Stage relative to the local gage datum, in feet.
pub const PARAM_GAGE_HEIGHT: &str = "Gage height";

/// Lake/reservoir stage referenced to NGVD of 1929.
pub const PARAM_LAKE_NGVD29: &str = "Elevation, lake/res, NGVD29";

/// Lake/reservoir stage referenced to NAVD of 1988.
pub const PARAM_LAKE_NAVD88: &str = "Elevation, lake/res, NAVD88";

/// Streamflow, in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "Discharge";

/// Stage parameters in the order they are tried when looking up a site's
/// gage-height timeseries.
pub const STAGE_PARAMETERS: &[&str] = &[PARAM_GAGE_HEIGHT, PARAM_LAKE_NGVD29, PARAM_LAKE_NAVD88];

// ---------------------------------------------------------------------------
// Qualifier / correction / reading vocabularies
// ---------------------------------------------------------------------------

pub const QUALIFIER_ICE: &str = "ICE";
pub const QUALIFIER_BACKWATER: &str = "BACKWATER";
pub const QUALIFIER_ESTIMATED: &str = "ESTIMATED";

pub const CORRECTION_MULTIPOINT: &str = "USGSMultiPoint";
pub const CORRECTION_THRESHOLD_SUPPRESSION: &str = "ThresholdSuppression";
pub const CORRECTION_COPY_PASTE: &str = "CopyPaste";
pub const CORRECTION_DELETE_REGION: &str = "DeleteRegion";

/// USGS multi-point set type for routine gage-height corrections.
pub const SET_TWO: &str = "Set 2";

pub const READING_EXTREME_MAX: &str = "ExtremeMax";
pub const READING_RESET_BEFORE: &str = "ResetBefore";
pub const READING_RESET_AFTER: &str = "ResetAfter";

/// Sensor method string for a wire-weight gage.
pub const METHOD_WIRE_WEIGHT_GAGE: &str = "Gage height, wire weight gage";

/// Monitoring method string for crest-stage gage readings.
pub const METHOD_CREST_STAGE_GAGE: &str = "Gage height, crest stage gage";

// ---------------------------------------------------------------------------
// Unit values
// ---------------------------------------------------------------------------

/// A single recorder unit value.
///
/// `value` is `None` for a gap marker. The successor of a point is the next
/// element of the owning dataset's point vector; there are no stored links.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub datetime: NaiveDateTime,
    pub value: Option<f64>,
    /// Set post-hoc when the point falls inside an ESTIMATED qualifier.
    pub estimated: bool,
    /// Cleared post-hoc when another point shares this point's extreme value.
    pub unique: bool,
}

impl DataPoint {
    pub fn new(datetime: NaiveDateTime, value: Option<f64>) -> Self {
        DataPoint {
            datetime,
            value,
            estimated: false,
            unique: true,
        }
    }
}

/// A period with no recorded data.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub length: Duration,
}

impl Gap {
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Gap {
            start,
            end,
            length: end - start,
        }
    }
}

// ---------------------------------------------------------------------------
// Annotations and edits
// ---------------------------------------------------------------------------

/// A time-bounded annotation on a timeseries (ICE, BACKWATER, ESTIMATED, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub identifier: String,
}

impl Qualifier {
    /// Inclusive on both ends.
    pub fn covers(&self, datetime: NaiveDateTime) -> bool {
        datetime >= self.start && datetime <= self.end
    }
}

/// A general (non multi-point) correction: deletion, copy/paste, note, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub correction_type: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub processing_order: String,
    pub comment: String,
}

/// One (gage height, offset) pair of a multi-point correction or shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftInputPoint {
    pub gage_height: f64,
    pub offset: f64,
}

impl ShiftInputPoint {
    pub fn new(gage_height: f64, offset: f64) -> Self {
        ShiftInputPoint { gage_height, offset }
    }
}

/// A USGS multi-point correction, optionally prorated between a start and
/// an end set of input points.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPointCorrection {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub start_shifts: Vec<ShiftInputPoint>,
    /// Empty when the correction is not prorated.
    pub end_shifts: Vec<ShiftInputPoint>,
    /// USGS set type, e.g. "Set 2".
    pub processing_order: String,
    pub comment: String,
}

impl MultiPointCorrection {
    pub fn is_prorated(&self) -> bool {
        !self.end_shifts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Site equipment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub unique_id: String,
    pub parameter: String,
    pub method: String,
    /// Empty when the sensor has no sublocation.
    pub sublocation: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while fetching or reconciling record data.
///
/// Connectivity and payload errors propagate to the caller unrecovered.
/// Data-entry inconsistencies are not errors; they are collected as
/// warnings on the run context.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// Non-2xx HTTP response from an upstream service.
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// The request never produced a response (connect, TLS, timeout).
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The response body was missing a field or had an unexpected shape.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// The requested site number is unknown to Aquarius.
    #[error("Site not found: {0}")]
    SiteNotFound(String),
    /// The site exists but has nothing usable for the requested record.
    #[error("No data available: {0}")]
    NoDataAvailable(String),
    /// User input rejected before any network activity.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RecordError>;

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_gap_length_is_end_minus_start() {
        let gap = Gap::between(at(10, 0), at(11, 15));
        assert_eq!(gap.length, Duration::minutes(75));
    }

    #[test]
    fn test_qualifier_covers_is_inclusive() {
        let q = Qualifier {
            start: at(1, 0),
            end: at(2, 0),
            identifier: QUALIFIER_ICE.to_string(),
        };
        assert!(q.covers(at(1, 0)));
        assert!(q.covers(at(2, 0)));
        assert!(!q.covers(at(2, 15)));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.0049, 2), -0.0);
        assert_eq!(round_to(1.0006, 3), 1.001);
    }

    #[test]
    fn test_stage_parameters_try_gage_height_first() {
        assert_eq!(STAGE_PARAMETERS[0], PARAM_GAGE_HEIGHT);
        assert_eq!(STAGE_PARAMETERS.len(), 3);
    }

    #[test]
    fn test_error_display_matches_failure_classifier_prefixes() {
        assert_eq!(RecordError::HttpError(500).to_string(), "HTTP error: 500");
        assert!(RecordError::ParseError("x".into()).to_string().starts_with("Parse error"));
    }
}
