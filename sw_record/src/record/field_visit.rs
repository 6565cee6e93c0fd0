/// Field visits and the record facts derived from each one.
///
/// The visit detail is fetched once and cached. Derivation covers the
/// checkbar reading, high-water marks and crest-stage gage condition,
/// recorder resets, discharge measurements with the control condition, and
/// whether a stage reading was taken.

use chrono::{Duration, NaiveDate};

use super::reading::Reading;
use super::timeseries::GenericTimeseries;
use crate::analysis::inspection::{
    checkbar_value, format_control_condition, parse_csg_comment, CsgInspection,
};
use crate::analysis::resets::{resolve_resets, ResetKind, ResetReading};
use crate::ingest::payload::{
    parse_date, parse_timestamp, DischargeSummary, FieldVisitDataResponse, FieldVisitDescription,
};
use crate::ingest::AquariusSession;
use crate::logging::{self, DataSource};
use crate::model::{
    Result, READING_EXTREME_MAX, READING_RESET_AFTER, READING_RESET_BEFORE, STAGE_PARAMETERS,
};
use crate::request::RunContext;

const INSPECTION_WIRE_WEIGHT: &str = "WireWeightGage";
const INSPECTION_CREST_STAGE: &str = "CrestStageGage";

// ---------------------------------------------------------------------------
// Discharge measurements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DischargeMeasurement {
    pub number: String,
    pub time: chrono::NaiveDateTime,
    pub method: String,
    /// Mean gage height during the measurement, ft.
    pub mean_gage_height: Option<f64>,
    /// Gage-height change over the measurement, ft.
    pub gage_height_change: Option<f64>,
    /// cfs
    pub discharge: Option<f64>,
    pub quality: String,
    pub comment: String,
    /// Percent difference from the base rating, set by the site back-check.
    pub difference_from_base_rating: Option<f64>,
    pub rating_compared: Option<String>,
}

impl DischargeMeasurement {
    pub fn from_summary(summary: &DischargeSummary) -> Result<Self> {
        Ok(DischargeMeasurement {
            number: summary.measurement_id.clone(),
            time: parse_timestamp(&summary.measurement_time)?,
            method: summary.discharge_method.clone(),
            mean_gage_height: summary.mean_gage_height.numeric,
            gage_height_change: summary.difference_during_visit.numeric,
            discharge: summary.discharge.numeric,
            quality: summary.measurement_grade.clone(),
            comment: summary.comments.clone(),
            difference_from_base_rating: None,
            rating_compared: None,
        })
    }
}

/// `(Q - base) / base * 100`; a zero base reports 100%.
pub fn percent_difference_from_base(discharge: f64, base: f64) -> f64 {
    if base == 0.0 {
        100.0
    } else {
        (discharge - base) / base * 100.0
    }
}

// ---------------------------------------------------------------------------
// Field visit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FieldVisit {
    pub identifier: String,
    pub date: NaiveDate,
    /// Initials of the field party.
    pub party: String,
    pub levels_performed: bool,
    pub checkbar_reading: Option<Reading>,
    pub high_water_marks: Vec<Reading>,
    pub csg: CsgInspection,
    pub reset_readings: Vec<Reading>,
    /// `None` when the visit did not reset the recorder.
    pub reset_amounts: Option<Vec<f64>>,
    pub discharge_measurements: Vec<DischargeMeasurement>,
    pub control_condition: Option<String>,
    pub has_stage_reading: bool,

    data_response: Option<FieldVisitDataResponse>,
}

impl FieldVisit {
    pub fn new(identifier: &str, date: NaiveDate, party: &str) -> Self {
        FieldVisit {
            identifier: identifier.to_string(),
            date,
            party: party.to_string(),
            levels_performed: false,
            checkbar_reading: None,
            high_water_marks: Vec::new(),
            csg: CsgInspection::default(),
            reset_readings: Vec::new(),
            reset_amounts: None,
            discharge_measurements: Vec::new(),
            control_condition: None,
            has_stage_reading: false,
            data_response: None,
        }
    }

    pub fn from_description(desc: &FieldVisitDescription) -> Result<Self> {
        let mut visit = FieldVisit::new(&desc.identifier, parse_date(&desc.start_time)?, &desc.party);
        visit.levels_performed = desc.completed_work.levels_performed;
        Ok(visit)
    }

    /// Fetch (or reuse) the visit detail and derive everything the record
    /// needs. Readings are compared against `gage_height_timeseries`.
    pub fn retrieve_records_related_data(
        &mut self,
        gage_height_timeseries: &[GenericTimeseries],
        session: &dyn AquariusSession,
        ctx: &mut RunContext,
        bordering_window: Duration,
    ) -> Result<()> {
        let data = match self.data_response.take() {
            Some(cached) => cached,
            None => session.field_visit_data(&self.identifier)?,
        };
        let result = self.derive(&data, gage_height_timeseries, session, ctx, bordering_window);
        self.data_response = Some(data);
        result
    }

    /// Drop the cached visit detail.
    pub fn refresh(&mut self) {
        self.data_response = None;
    }

    /// Everything is derived into locals first; fields change only once every
    /// step has succeeded.
    fn derive(
        &mut self,
        data: &FieldVisitDataResponse,
        gage_height_timeseries: &[GenericTimeseries],
        session: &dyn AquariusSession,
        ctx: &mut RunContext,
        bordering_window: Duration,
    ) -> Result<()> {
        let checkbar_reading = self.find_checkbar(data);
        let high_water_marks =
            self.high_water_marks_from(data, gage_height_timeseries, session, ctx, bordering_window)?;
        let csg = csg_from(data);
        let (reset_readings, reset_amounts) = self.resets_from(data, ctx)?;
        let discharge_measurements = data
            .discharge_activities
            .iter()
            .map(|a| DischargeMeasurement::from_summary(&a.discharge_summary))
            .collect::<Result<Vec<_>>>()?;
        let control_condition = if discharge_measurements.is_empty() {
            None
        } else {
            data.control_condition_activity.as_ref().map(|c| {
                format_control_condition(
                    &c.control_code,
                    &c.control_condition,
                    c.distance_to_gage.numeric,
                )
            })
        };
        let has_stage_reading = data
            .inspection_activity
            .readings
            .iter()
            .any(|r| STAGE_PARAMETERS.contains(&r.parameter.as_str()));

        self.checkbar_reading = checkbar_reading;
        self.high_water_marks = high_water_marks;
        self.csg = csg;
        self.reset_readings = reset_readings;
        self.reset_amounts = reset_amounts;
        self.discharge_measurements = discharge_measurements;
        self.control_condition = control_condition;
        self.has_stage_reading = has_stage_reading;
        Ok(())
    }

    /// Last wire-weight inspection whose comment holds a decimal number.
    fn find_checkbar(&self, data: &FieldVisitDataResponse) -> Option<Reading> {
        let at = self.date.and_time(chrono::NaiveTime::MIN);
        data.inspection_activity
            .inspections
            .iter()
            .filter(|i| i.inspection_type == INSPECTION_WIRE_WEIGHT)
            .filter_map(|i| checkbar_value(&i.comments))
            .last()
            .map(|v| Reading::checkbar(at, v))
    }

    fn high_water_marks_from(
        &self,
        data: &FieldVisitDataResponse,
        gage_height_timeseries: &[GenericTimeseries],
        session: &dyn AquariusSession,
        ctx: &mut RunContext,
        bordering_window: Duration,
    ) -> Result<Vec<Reading>> {
        let mut marks = Vec::new();
        for entry in data
            .inspection_activity
            .readings
            .iter()
            .filter(|r| r.reading_type == READING_EXTREME_MAX)
        {
            // Crest-stage marks with no time cannot be tied to an event.
            let Some(mut mark) = Reading::from_entry(entry)? else {
                continue;
            };
            mark.check_discrepancy(gage_height_timeseries, session, ctx, bordering_window)?;
            marks.push(mark);
        }
        Ok(marks)
    }

    /// Reset readings and the amounts they resolve to; `None` amounts when
    /// the visit did not reset the recorder.
    fn resets_from(
        &self,
        data: &FieldVisitDataResponse,
        ctx: &mut RunContext,
    ) -> Result<(Vec<Reading>, Option<Vec<f64>>)> {
        let mut readings = Vec::new();
        for entry in data.inspection_activity.readings.iter().filter(|r| {
            r.reading_type == READING_RESET_BEFORE || r.reading_type == READING_RESET_AFTER
        }) {
            match Reading::from_entry(entry)? {
                Some(r) => readings.push(r),
                None => ctx.warn(format!(
                    "visit {}: {} reading without time or value ignored",
                    self.date, entry.reading_type
                )),
            }
        }

        let inputs: Vec<ResetReading> = readings
            .iter()
            .map(|r| ResetReading {
                kind: if r.reading_type == READING_RESET_BEFORE {
                    ResetKind::Before
                } else {
                    ResetKind::After
                },
                datetime: r.datetime,
                value: r.value,
            })
            .collect();

        let resolution = resolve_resets(&inputs);
        for warning in resolution.warnings {
            ctx.warn(format!("visit {}: {}", self.date, warning));
        }
        let amounts = if resolution.amounts.is_empty() {
            None
        } else {
            Some(resolution.amounts)
        };
        Ok((readings, amounts))
    }

    // ---------------------------------------------------------------------------
    // Findings
    // ---------------------------------------------------------------------------

    /// Short notes for the field-visit table, in display order.
    pub fn findings(&self) -> Vec<String> {
        let mut findings = Vec::new();

        if let Some(amounts) = &self.reset_amounts {
            let listed: Vec<String> = amounts.iter().map(|a| format!("{}'", a)).collect();
            findings.push(format!("Reset: {}", listed.join(", ")));
        }
        if self.discharge_measurements.is_empty() && self.has_stage_reading {
            findings.push("Stage-Only Visit".to_string());
        }
        for qm in &self.discharge_measurements {
            findings.push(format!("Qm {}", qm.number));
        }
        if self.levels_performed {
            findings.push("Levels".to_string());
        }

        logging::debug(
            DataSource::Analysis,
            None,
            &format!("visit {} findings: {:?}", self.identifier, findings),
        );
        findings
    }

    pub fn findings_text(&self) -> String {
        self.findings().join(", ")
    }
}

/// Crest-stage codes, later inspections overriding earlier ones.
fn csg_from(data: &FieldVisitDataResponse) -> CsgInspection {
    let mut csg = CsgInspection::default();
    for inspection in data
        .inspection_activity
        .inspections
        .iter()
        .filter(|i| i.inspection_type == INSPECTION_CREST_STAGE)
    {
        csg.merge(parse_csg_comment(&inspection.comments));
    }
    csg
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn visit_data(json: &str) -> FieldVisitDataResponse {
        serde_json::from_str(json).unwrap()
    }

    fn ctx() -> RunContext {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        RunContext::new(crate::request::RecordRequest::new("03277200", d, d).unwrap())
    }

    #[test]
    fn test_percent_difference() {
        assert_relative_eq!(percent_difference_from_base(105.0, 100.0), 5.0);
        assert_relative_eq!(percent_difference_from_base(95.0, 100.0), -5.0);
        assert_eq!(percent_difference_from_base(12.0, 0.0), 100.0);
    }

    #[test]
    fn test_from_description() {
        let desc: FieldVisitDescription = serde_json::from_str(
            r#"{"Identifier": "abc123", "StartTime": "2024-04-11T09:30:00.0000000-04:00",
                "Party": "MG/JS", "CompletedWork": {"LevelsPerformed": true}}"#,
        )
        .unwrap();
        let v = FieldVisit::from_description(&desc).unwrap();
        assert_eq!(v.date, NaiveDate::from_ymd_opt(2024, 4, 11).unwrap());
        assert_eq!(v.party, "MG/JS");
        assert!(v.levels_performed);
    }

    #[test]
    fn test_checkbar_last_match_wins() {
        let data = visit_data(
            r#"{"InspectionActivity": {"Inspections": [
                {"InspectionType": "WireWeightGage", "Comments": "checkbar 12.345"},
                {"InspectionType": "WireWeightGage", "Comments": "no number"},
                {"InspectionType": "WireWeightGage", "Comments": "recheck 12.350"}
            ]}}"#,
        );
        let v = FieldVisit::new("x", NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(), "");
        let cb = v.find_checkbar(&data).unwrap();
        assert_eq!(cb.value, 12.35);
        assert_eq!(cb.datetime.to_string(), "2024-04-11 00:00:00");
        assert_eq!(cb.reading_type, "Calibration");
    }

    #[test]
    fn test_csg_codes_from_crest_stage_inspections_only() {
        let data = visit_data(
            r#"{"InspectionActivity": {"Inspections": [
                {"InspectionType": "WireWeightGage", "Comments": "VentHoleConditionCode = Plugged"},
                {"InspectionType": "CrestStageGage",
                 "Comments": "GageInspectedCode = Inspected\nIntakeHoleConditionCode = Open"}
            ]}}"#,
        );
        let csg = csg_from(&data);
        assert_eq!(csg.inspected_code.as_deref(), Some("Inspected"));
        assert_eq!(csg.intake_code.as_deref(), Some("Open"));
        assert_eq!(csg.vent_code, None);
    }

    #[test]
    fn test_resets_and_warning() {
        let data = visit_data(
            r#"{"InspectionActivity": {"Readings": [
                {"Parameter": "Gage height", "ReadingType": "ResetAfter",
                 "Time": "2024-04-11T08:00:00-04:00", "Value": {"Numeric": 3.0}},
                {"Parameter": "Gage height", "ReadingType": "ResetBefore",
                 "Time": "2024-04-11T09:00:00-04:00", "Value": {"Numeric": 3.10}},
                {"Parameter": "Gage height", "ReadingType": "ResetAfter",
                 "Time": "2024-04-11T09:05:00-04:00", "Value": {"Numeric": 3.22}}
            ]}}"#,
        );
        let v = FieldVisit::new("x", NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(), "");
        let mut c = ctx();
        let (readings, amounts) = v.resets_from(&data, &mut c).unwrap();
        assert_eq!(amounts, Some(vec![0.12]));
        assert_eq!(readings.len(), 3);
        assert_eq!(c.warnings().len(), 1);
    }

    #[test]
    fn test_findings_order() {
        let mut v = FieldVisit::new("x", NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(), "");
        v.reset_amounts = Some(vec![0.1, -0.02]);
        v.levels_performed = true;
        v.has_stage_reading = true;
        assert_eq!(v.findings(), vec!["Reset: 0.1', -0.02'", "Stage-Only Visit", "Levels"]);

        v.discharge_measurements.push(DischargeMeasurement {
            number: "212".to_string(),
            time: v.date.and_hms_opt(10, 0, 0).unwrap(),
            method: "Midsection".to_string(),
            mean_gage_height: Some(3.1),
            gage_height_change: None,
            discharge: Some(120.0),
            quality: "Good".to_string(),
            comment: String::new(),
            difference_from_base_rating: None,
            rating_compared: None,
        });
        assert_eq!(v.findings_text(), "Reset: 0.1', -0.02', Qm 212, Levels");
    }
}
