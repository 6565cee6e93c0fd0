/// Renderer-facing summaries of a gathered site.
///
/// Every function here is a pure view over the record graph. Rows derive
/// `Serialize` so a report renderer can consume them as JSON.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::dataset::Dataset;
use super::field_visit::FieldVisit;
use super::rating::RatingModel;
use super::timeseries::GenericTimeseries;
use crate::analysis::shifts::{format_input_gage_heights, format_input_points};
use crate::model::{
    round_to, DataPoint, MultiPointCorrection, CORRECTION_COPY_PASTE, CORRECTION_DELETE_REGION,
    METHOD_CREST_STAGE_GAGE, QUALIFIER_BACKWATER, QUALIFIER_ICE,
};

// ============================================================================
// Backup data
// ============================================================================

/// How well the backup data logger was archived, as judged by the analyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArchivalCondition {
    ArchivedProperly,
    PartiallyArchived,
    NotArchivedProperly,
}

impl ArchivalCondition {
    /// Parse the analyst's selection label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Archived Properly" => Some(ArchivalCondition::ArchivedProperly),
            "Partially Archived" => Some(ArchivalCondition::PartiallyArchived),
            "Not Archived Properly" => Some(ArchivalCondition::NotArchivedProperly),
            _ => None,
        }
    }
}

/// Outcome of the backup-data review for one gage-height timeseries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackupDataStatus {
    ArchivedFilledAll,
    ArchivedFilledSome,
    ArchivedNotNeeded,
    ArchivedNotUsable,
    PartialFilledAll,
    PartialFilledSome,
    PartialNotNeeded,
    PartialNotUsable,
    UnavailableNotNeeded,
    UnavailableWithGaps,
}

impl BackupDataStatus {
    pub fn classify(condition: ArchivalCondition, has_pasted_data: bool, has_gaps: bool) -> Self {
        use ArchivalCondition::*;
        use BackupDataStatus::*;
        match (condition, has_pasted_data, has_gaps) {
            (ArchivedProperly, true, false) => ArchivedFilledAll,
            (ArchivedProperly, true, true) => ArchivedFilledSome,
            (ArchivedProperly, false, false) => ArchivedNotNeeded,
            (ArchivedProperly, false, true) => ArchivedNotUsable,
            (PartiallyArchived, true, false) => PartialFilledAll,
            (PartiallyArchived, true, true) => PartialFilledSome,
            (PartiallyArchived, false, false) => PartialNotNeeded,
            (PartiallyArchived, false, true) => PartialNotUsable,
            (NotArchivedProperly, _, false) => UnavailableNotNeeded,
            (NotArchivedProperly, _, true) => UnavailableWithGaps,
        }
    }

    /// Whether the copy/paste table belongs under the narrative.
    pub fn lists_pasted_data(&self) -> bool {
        matches!(
            self,
            BackupDataStatus::ArchivedFilledAll
                | BackupDataStatus::ArchivedFilledSome
                | BackupDataStatus::PartialFilledAll
                | BackupDataStatus::PartialFilledSome
        )
    }

    pub fn narrative(&self) -> &'static str {
        match self {
            BackupDataStatus::ArchivedFilledAll => {
                "Backup data was properly archived and used to fill in all gaps during the period."
            }
            BackupDataStatus::ArchivedFilledSome => {
                "Backup data was properly archived and used to fill in gaps where possible. Not all gaps could be successfully filled."
            }
            BackupDataStatus::ArchivedNotNeeded => {
                "Backup data was properly archived but not needed during the analysis period."
            }
            BackupDataStatus::ArchivedNotUsable => {
                "Backup data was properly archived but not usable in filling gaps during the period."
            }
            BackupDataStatus::PartialFilledAll => {
                "Backup data was partially available and used to fill in all gaps during the analysis period."
            }
            BackupDataStatus::PartialFilledSome => {
                "Backup data was partially available and used to fill in gaps where possible. Not all gaps could be successfully filled."
            }
            BackupDataStatus::PartialNotNeeded => {
                "Backup data was partially available but also not needed during the analysis period."
            }
            BackupDataStatus::PartialNotUsable => {
                "Backup data was partially available and not usable in filling in gaps during the analysis period."
            }
            BackupDataStatus::UnavailableNotNeeded => {
                "Backup data was not available or not archived properly; however, it was also not needed during the analysis period."
            }
            BackupDataStatus::UnavailableWithGaps => {
                "Backup data was not available or not archived properly and gaps occurred during the period."
            }
        }
    }
}

/// Backup-data status of a timeseries' record period. `None` until the
/// record dataset has been gathered.
pub fn backup_data_status(
    ts: &GenericTimeseries,
    condition: ArchivalCondition,
) -> Option<BackupDataStatus> {
    let dataset = ts.record_dataset.as_ref()?;
    Some(BackupDataStatus::classify(
        condition,
        dataset.has_pasted_data(),
        dataset.has_gaps(),
    ))
}

// ============================================================================
// Display names
// ============================================================================

pub fn correction_type_display(correction_type: &str) -> &str {
    match correction_type {
        CORRECTION_COPY_PASTE => "Copy & Paste",
        CORRECTION_DELETE_REGION => "Deletion",
        other => other,
    }
}

pub fn processing_order_display(processing_order: &str) -> &str {
    match processing_order {
        "PreProcessing" => "Pre-Processing",
        "PostProcessing" => "Post-Processing",
        other => other,
    }
}

// ============================================================================
// Gage-height record tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

pub fn ice_periods(dataset: &Dataset) -> Vec<PeriodRow> {
    qualifier_periods(dataset, QUALIFIER_ICE)
}

pub fn backwater_periods(dataset: &Dataset) -> Vec<PeriodRow> {
    qualifier_periods(dataset, QUALIFIER_BACKWATER)
}

fn qualifier_periods(dataset: &Dataset, identifier: &str) -> Vec<PeriodRow> {
    dataset
        .qualifiers_with(identifier)
        .map(|q| PeriodRow {
            start: q.start,
            end: q.end,
        })
        .collect()
}

/// Copy/paste corrections, i.e. backup data filled into the record.
pub fn pasted_data_periods(dataset: &Dataset) -> Vec<PeriodRow> {
    dataset
        .copy_paste_corrections()
        .map(|c| PeriodRow {
            start: c.start,
            end: c.end,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditRow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub edit_type: String,
    pub processing_order: String,
    pub comment: String,
}

pub fn edit_rows(dataset: &Dataset) -> Vec<EditRow> {
    dataset
        .general_corrections
        .iter()
        .map(|c| EditRow {
            start: c.start,
            end: c.end,
            edit_type: correction_type_display(&c.correction_type).to_string(),
            processing_order: processing_order_display(&c.processing_order).to_string(),
            comment: c.comment.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionRow {
    pub set_type: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// `(GH', magnitude')` pairs, or `None`.
    pub starting_points: String,
    pub ending_points: String,
    pub comment: String,
}

impl CorrectionRow {
    fn from_correction(c: &MultiPointCorrection) -> Self {
        CorrectionRow {
            set_type: c.processing_order.clone(),
            start: c.start,
            end: c.end,
            starting_points: format_input_points(&c.start_shifts),
            ending_points: format_input_points(&c.end_shifts),
            comment: c.comment.clone(),
        }
    }
}

/// Routine gage-height corrections (Set 2).
pub fn set_two_correction_rows(dataset: &Dataset) -> Vec<CorrectionRow> {
    dataset
        .set_two_corrections()
        .map(CorrectionRow::from_correction)
        .collect()
}

/// Every other multi-point set, usually abnormal corrections.
pub fn other_correction_rows(dataset: &Dataset) -> Vec<CorrectionRow> {
    dataset
        .other_multipoint_corrections()
        .map(CorrectionRow::from_correction)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub length_minutes: i64,
}

pub fn gap_rows(dataset: &Dataset) -> Vec<GapRow> {
    dataset
        .gaps
        .iter()
        .map(|g| GapRow {
            start: g.start,
            end: g.end,
            length_minutes: g.length.num_minutes(),
        })
        .collect()
}

// ============================================================================
// Extremes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeSummary {
    pub value: f64,
    pub datetime: NaiveDateTime,
    /// False when the value recurs; the first occurrence is reported.
    pub unique: bool,
    pub estimated: bool,
}

impl ExtremeSummary {
    fn from_point(point: &DataPoint) -> Option<Self> {
        Some(ExtremeSummary {
            value: point.value?,
            datetime: point.datetime,
            unique: point.unique,
            estimated: point.estimated,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremesSummary {
    /// `None` for the record period, otherwise the water year.
    pub water_year: Option<i32>,
    pub max: Option<ExtremeSummary>,
    pub min: Option<ExtremeSummary>,
}

fn extremes_of(dataset: &Dataset, water_year: Option<i32>) -> ExtremesSummary {
    ExtremesSummary {
        water_year,
        max: dataset.max_point().and_then(ExtremeSummary::from_point),
        min: dataset.min_point().and_then(ExtremeSummary::from_point),
    }
}

/// Record-period extremes first, then each water year in order.
pub fn extremes_summary(ts: &GenericTimeseries) -> Vec<ExtremesSummary> {
    let record = ts.record_dataset.iter().map(|d| extremes_of(d, None));
    let water_years = ts
        .water_year_datasets
        .iter()
        .map(|(year, d)| extremes_of(d, Some(*year)));
    record.chain(water_years).collect()
}

// ============================================================================
// Field visits
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldVisitRow {
    pub date: NaiveDate,
    pub party: String,
    pub activities: String,
}

/// One row per visit, by date.
pub fn field_visit_rows(visits: &[FieldVisit]) -> Vec<FieldVisitRow> {
    let mut rows: Vec<FieldVisitRow> = visits
        .iter()
        .map(|v| FieldVisitRow {
            date: v.date,
            party: v.party.clone(),
            activities: v.findings_text(),
        })
        .collect();
    rows.sort_by_key(|r| r.date);
    rows
}

pub fn checkbar_reading_count(visits: &[FieldVisit]) -> usize {
    visits.iter().filter(|v| v.checkbar_reading.is_some()).count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighWaterMarkRow {
    pub sensor_type: String,
    pub date_read: NaiveDate,
    pub occurred: NaiveDateTime,
    pub value: f64,
    pub discrepancy: Option<f64>,
    pub comment: String,
}

pub fn high_water_mark_rows(visits: &[FieldVisit]) -> Vec<HighWaterMarkRow> {
    visits
        .iter()
        .flat_map(|visit| {
            visit.high_water_marks.iter().map(move |mark| HighWaterMarkRow {
                sensor_type: if mark.monitoring_method == METHOD_CREST_STAGE_GAGE {
                    "CSG".to_string()
                } else {
                    mark.monitoring_method.clone()
                },
                date_read: visit.date,
                occurred: mark.datetime,
                value: mark.value,
                discrepancy: mark.discrepancy,
                comment: mark.comment.clone(),
            })
        })
        .collect()
}

// ============================================================================
// Stage-discharge relation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRow {
    pub number: String,
    pub time: NaiveDateTime,
    pub mean_gage_height: Option<f64>,
    pub gage_height_change: Option<f64>,
    /// cfs, to hundredths.
    pub discharge: Option<f64>,
    pub quality: String,
    pub rating: Option<String>,
    /// Percent from the base rating, to tenths.
    pub rating_error: Option<f64>,
    pub control_condition: Option<String>,
    pub comment: String,
}

/// Measurements of every visit, visits in date order.
pub fn measurement_rows(visits: &[FieldVisit]) -> Vec<MeasurementRow> {
    let mut ordered: Vec<&FieldVisit> = visits.iter().collect();
    ordered.sort_by_key(|v| v.date);
    ordered
        .into_iter()
        .flat_map(|visit| {
            visit.discharge_measurements.iter().map(move |qm| MeasurementRow {
                number: qm.number.clone(),
                time: qm.time,
                mean_gage_height: qm.mean_gage_height,
                gage_height_change: qm.gage_height_change,
                discharge: qm.discharge.map(|q| round_to(q, 2)),
                quality: qm.quality.clone(),
                rating: qm.rating_compared.clone(),
                rating_error: qm.difference_from_base_rating.map(|d| round_to(d, 1)),
                control_condition: visit.control_condition.clone(),
                comment: qm.comment.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftRow {
    pub rating_id: String,
    pub start: NaiveDateTime,
    pub shape: String,
    pub input_gage_heights: String,
    pub magnitude: String,
    /// Magnitude is the full input-point list.
    pub long_magnitude: bool,
    pub comment: String,
}

/// Shifts in effect during the period, across every rating of the model.
pub fn shift_rows(model: &RatingModel, start: NaiveDateTime, end: NaiveDateTime) -> Vec<ShiftRow> {
    model
        .ratings
        .iter()
        .flat_map(|rating| {
            rating
                .shifts_in_period(start, end)
                .into_iter()
                .map(move |shift| ShiftRow {
                    rating_id: rating.id.clone(),
                    start: shift.start,
                    shape: shift.shape.to_string(),
                    input_gage_heights: format_input_gage_heights(&shift.points),
                    magnitude: shift.reported.text.clone(),
                    long_magnitude: shift.reported.long,
                    comment: shift.comment.clone(),
                })
        })
        .collect()
}
