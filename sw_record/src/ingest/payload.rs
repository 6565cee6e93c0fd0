/// Aquarius Publish v2 response structures
///
/// Only the fields the record pipeline reads are modelled. Optional members
/// that Aquarius omits entirely (rather than sending `null`) carry
/// `#[serde(default)]`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::model::{RecordError, Result};

/// Marker Aquarius places in `Value.Numeric` for gap points.
pub const EMPTY_MARKER: &str = "EMPTY";

// ============================================================================
// Timestamp helpers
// ============================================================================

/// Parse an Aquarius timestamp as naive site-local time, discarding the
/// fractional seconds and UTC offset (`2023-10-01T00:15:00.0000000-05:00`).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let head = raw.get(0..19).ok_or_else(|| {
        RecordError::ParseError(format!("Timestamp too short: '{}'", raw))
    })?;
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| RecordError::ParseError(format!("Bad timestamp '{}': {}", raw, e)))
}

/// Like [`parse_timestamp`] but truncated to the minute.
pub fn parse_timestamp_to_minute(raw: &str) -> Result<NaiveDateTime> {
    let head = raw.get(0..16).ok_or_else(|| {
        RecordError::ParseError(format!("Timestamp too short: '{}'", raw))
    })?;
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M")
        .map_err(|e| RecordError::ParseError(format!("Bad timestamp '{}': {}", raw, e)))
}

/// Parse the date portion of an Aquarius timestamp.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let head = raw
        .get(0..10)
        .ok_or_else(|| RecordError::ParseError(format!("Date too short: '{}'", raw)))?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|e| RecordError::ParseError(format!("Bad date '{}': {}", raw, e)))
}

/// Accepts either a JSON string or integer and yields a string.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

// ============================================================================
// Location / timeseries descriptions
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationDescriptionListResponse {
    #[serde(default)]
    pub location_descriptions: Vec<LocationDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationDescription {
    pub name: String,
    pub identifier: String,
    pub unique_id: String,
}

/// Name and Aquarius id for a site number.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteInfo {
    pub name: String,
    pub unique_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesDescriptionListResponse {
    #[serde(default)]
    pub time_series_descriptions: Vec<TimeSeriesDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesDescription {
    pub identifier: String,
    pub unique_id: String,
    #[serde(default)]
    pub sub_location_identifier: String,
    #[serde(default)]
    pub parameter: String,
}

// ============================================================================
// Corrected data
// ============================================================================

/// Which variant of `GetTimeSeriesCorrectedData` to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageFlags {
    /// Include the last point before and first point after the window.
    pub full_coverage: bool,
    /// Insert explicit `EMPTY` points where the record has gaps.
    pub gap_markers: bool,
}

impl CoverageFlags {
    pub const POINTS_ONLY: CoverageFlags = CoverageFlags {
        full_coverage: false,
        gap_markers: false,
    };
    pub const FULL: CoverageFlags = CoverageFlags {
        full_coverage: true,
        gap_markers: true,
    };
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesDataResponse {
    /// As reported, when present. Emptiness is decided by `points`.
    #[serde(default)]
    pub num_points: u64,
    #[serde(default)]
    pub points: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub qualifiers: Vec<QualifierEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    /// Gap points may carry an empty object here.
    #[serde(default)]
    pub value: PointValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointValue {
    #[serde(default)]
    pub numeric: Option<NumericOrMarker>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericOrMarker {
    Number(f64),
    Marker(String),
}

impl PointValue {
    /// The numeric value, or `None` for an empty object or a marker.
    pub fn numeric(&self) -> Option<f64> {
        match &self.numeric {
            Some(NumericOrMarker::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// True for `{}` and for `{"Numeric": "EMPTY"}`.
    pub fn is_gap_marker(&self) -> bool {
        match &self.numeric {
            None => true,
            Some(NumericOrMarker::Marker(m)) => m == EMPTY_MARKER,
            Some(NumericOrMarker::Number(_)) => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QualifierEntry {
    pub identifier: String,
    pub start_time: String,
    pub end_time: String,
}

// ============================================================================
// Corrections
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorrectionListResponse {
    #[serde(default)]
    pub corrections: Vec<CorrectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorrectionEntry {
    #[serde(rename = "Type")]
    pub correction_type: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub processing_order: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub parameters: CorrectionParameters,
}

/// The free-form `Parameters` object, as populated for `USGSMultiPoint`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorrectionParameters {
    #[serde(default)]
    pub usgs_type: Option<String>,
    #[serde(default)]
    pub start_shift_points: Option<Vec<ShiftPointEntry>>,
    /// Present only for prorated corrections.
    #[serde(default)]
    pub end_shift_points: Option<Vec<ShiftPointEntry>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShiftPointEntry {
    pub value: f64,
    pub offset: f64,
}

// ============================================================================
// Field visits
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldVisitListResponse {
    #[serde(default)]
    pub field_visit_descriptions: Vec<FieldVisitDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldVisitDescription {
    pub identifier: String,
    pub start_time: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub completed_work: CompletedWork,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompletedWork {
    #[serde(default)]
    pub levels_performed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldVisitDataResponse {
    #[serde(default)]
    pub inspection_activity: InspectionActivity,
    #[serde(default)]
    pub discharge_activities: Vec<DischargeActivity>,
    #[serde(default)]
    pub control_condition_activity: Option<ControlConditionActivity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InspectionActivity {
    #[serde(default)]
    pub inspections: Vec<InspectionEntry>,
    #[serde(default)]
    pub readings: Vec<ReadingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InspectionEntry {
    pub inspection_type: String,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadingEntry {
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub monitoring_method: String,
    #[serde(default)]
    pub reading_type: String,
    /// Absent for crest-stage marks that cannot be tied to an event.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub value: Quantity,
    #[serde(default)]
    pub sub_location_identifier: String,
    #[serde(default)]
    pub comments: String,
}

/// `{"Numeric": 1.23, "Unit": "ft"}`, or `{}` when nothing was entered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quantity {
    #[serde(default)]
    pub numeric: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DischargeActivity {
    pub discharge_summary: DischargeSummary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DischargeSummary {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub measurement_id: String,
    pub measurement_time: String,
    #[serde(default)]
    pub discharge_method: String,
    #[serde(default)]
    pub mean_gage_height: Quantity,
    #[serde(default)]
    pub difference_during_visit: Quantity,
    #[serde(default)]
    pub discharge: Quantity,
    #[serde(default)]
    pub measurement_grade: String,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlConditionActivity {
    #[serde(default)]
    pub control_code: String,
    #[serde(default)]
    pub control_condition: String,
    #[serde(default)]
    pub distance_to_gage: Quantity,
}

// ============================================================================
// Sensors
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SensorListResponse {
    #[serde(default)]
    pub monitoring_methods: Vec<MonitoringMethodEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoringMethodEntry {
    pub unique_id: String,
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub sub_location_identifier: String,
}

// ============================================================================
// Ratings
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingModelListResponse {
    #[serde(default)]
    pub rating_model_descriptions: Vec<RatingModelDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingModelDescription {
    pub identifier: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingCurveListResponse {
    #[serde(default)]
    pub rating_curves: Vec<RatingCurveEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingCurveEntry {
    pub id: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub periods_of_applicability: Vec<PeriodOfApplicability>,
    #[serde(default)]
    pub shifts: Vec<ShiftEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeriodOfApplicability {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShiftEntry {
    pub period_of_applicability: PeriodOfApplicability,
    #[serde(default)]
    pub shift_points: Vec<RatingShiftPoint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingShiftPoint {
    pub input_value: f64,
    pub shift: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingOutputResponse {
    #[serde(default)]
    pub output_values: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_ignores_offset() {
        let dt = parse_timestamp("2023-10-01T00:15:00.0000000-05:00").unwrap();
        assert_eq!(dt.to_string(), "2023-10-01 00:15:00");
    }

    #[test]
    fn test_parse_timestamp_to_minute_drops_seconds() {
        let dt = parse_timestamp_to_minute("2023-10-01T00:15:42.0000000-05:00").unwrap();
        assert_eq!(dt.to_string(), "2023-10-01 00:15:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_short_input() {
        assert!(matches!(parse_timestamp("2023-10-01"), Err(RecordError::ParseError(_))));
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("2024-03-05T09:00:00.0000000-05:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_point_value_variants() {
        let json = r#"{
            "NumPoints": 3,
            "Points": [
                {"Timestamp": "2024-01-01T00:00:00.0000000-05:00", "Value": {"Numeric": 3.14159}},
                {"Timestamp": "2024-01-01T00:15:00.0000000-05:00", "Value": {"Numeric": "EMPTY"}},
                {"Timestamp": "2024-01-01T00:30:00.0000000-05:00", "Value": {}}
            ],
            "Qualifiers": []
        }"#;
        let resp: TimeSeriesDataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.num_points, 3);
        assert_eq!(resp.points[0].value.numeric(), Some(3.14159));
        assert!(!resp.points[0].value.is_gap_marker());
        assert!(resp.points[1].value.is_gap_marker());
        assert_eq!(resp.points[1].value.numeric(), None);
        assert!(resp.points[2].value.is_gap_marker());
    }

    #[test]
    fn test_multipoint_parameters_with_and_without_end_points() {
        let json = r#"{"Corrections": [
            {"Type": "USGSMultiPoint", "StartTime": "2024-01-01T00:00:00-05:00",
             "EndTime": "2024-02-01T00:00:00-05:00", "ProcessingOrder": "PostProcessing",
             "Comment": "drift",
             "Parameters": {"UsgsType": "Set 2",
                            "StartShiftPoints": [{"Value": 1.0, "Offset": 0.02}],
                            "EndShiftPoints": [{"Value": 1.0, "Offset": 0.05}]}},
            {"Type": "DeleteRegion", "StartTime": "2024-01-03T00:00:00-05:00",
             "EndTime": "2024-01-04T00:00:00-05:00", "ProcessingOrder": "PreProcessing"}
        ]}"#;
        let resp: CorrectionListResponse = serde_json::from_str(json).unwrap();
        let mp = &resp.corrections[0];
        assert_eq!(mp.parameters.usgs_type.as_deref(), Some("Set 2"));
        assert_eq!(mp.parameters.end_shift_points.as_ref().map(|v| v.len()), Some(1));
        let del = &resp.corrections[1];
        assert_eq!(del.comment, "");
        assert!(del.parameters.start_shift_points.is_none());
    }

    #[test]
    fn test_measurement_id_accepts_number_or_string() {
        let numeric: DischargeSummary = serde_json::from_str(
            r#"{"MeasurementId": 212, "MeasurementTime": "2024-01-01T10:00:00-05:00"}"#,
        )
        .unwrap();
        assert_eq!(numeric.measurement_id, "212");

        let text: DischargeSummary = serde_json::from_str(
            r#"{"MeasurementId": "213", "MeasurementTime": "2024-01-01T10:00:00-05:00",
                "DifferenceDuringVisit": {}}"#,
        )
        .unwrap();
        assert_eq!(text.measurement_id, "213");
        assert_eq!(text.difference_during_visit.numeric, None);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let result: std::result::Result<TimeSeriesDescription, _> =
            serde_json::from_str(r#"{"Identifier": "Gage height.ft@03277200"}"#);
        assert!(result.is_err());
    }
}
