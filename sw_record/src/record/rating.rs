/// Discharge rating model, its rating curves, and each curve's shifts.

use chrono::NaiveDateTime;

use crate::analysis::shifts::{
    classify_shape, input_gage_heights_changed, reported_magnitude, ReportedMagnitude, ShiftShape,
};
use crate::ingest::payload::{parse_timestamp, RatingCurveEntry, ShiftEntry};
use crate::ingest::AquariusSession;
use crate::model::{RecordError, Result, ShiftInputPoint};

// ---------------------------------------------------------------------------
// Shift curves
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftCurve {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub points: Vec<ShiftInputPoint>,
    pub comment: String,
    pub shape: ShiftShape,
    pub reported: ReportedMagnitude,
    /// Input-point gage heights moved relative to the previous shift.
    pub gage_heights_changed: bool,
}

impl ShiftCurve {
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        points: Vec<ShiftInputPoint>,
        comment: &str,
        previous: Option<&ShiftCurve>,
    ) -> Self {
        let offsets: Vec<f64> = points.iter().map(|p| p.offset).collect();
        let shape = classify_shape(&offsets);
        let gage_heights_changed =
            input_gage_heights_changed(previous.map(|p| p.points.as_slice()), &points);
        let reported = reported_magnitude(shape, &points, gage_heights_changed);
        ShiftCurve {
            start,
            end,
            points,
            comment: comment.to_string(),
            shape,
            reported,
            gage_heights_changed,
        }
    }

    fn from_entry(entry: &ShiftEntry, previous: Option<&ShiftCurve>) -> Result<Self> {
        let period = &entry.period_of_applicability;
        let points = entry
            .shift_points
            .iter()
            .map(|p| ShiftInputPoint::new(p.input_value, p.shift))
            .collect();
        Ok(ShiftCurve::new(
            parse_timestamp(&period.start_time)?,
            parse_timestamp(&period.end_time)?,
            points,
            &period.remarks,
            previous,
        ))
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub id: String,
    pub model_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub remarks: String,
    /// Time-ordered as Aquarius lists them.
    pub shifts: Vec<ShiftCurve>,
}

impl Rating {
    /// Applicability runs from the first period's start to the last
    /// period's end; Aquarius does not merge adjacent periods.
    pub fn from_entry(entry: &RatingCurveEntry, model_id: &str) -> Result<Self> {
        let (Some(first), Some(last)) = (
            entry.periods_of_applicability.first(),
            entry.periods_of_applicability.last(),
        ) else {
            return Err(RecordError::ParseError(format!(
                "rating {} has no periods of applicability",
                entry.id
            )));
        };

        let mut shifts: Vec<ShiftCurve> = Vec::with_capacity(entry.shifts.len());
        for shift in &entry.shifts {
            let curve = ShiftCurve::from_entry(shift, shifts.last())?;
            shifts.push(curve);
        }

        Ok(Rating {
            id: entry.id.clone(),
            model_id: model_id.to_string(),
            start: parse_timestamp(&first.start_time)?,
            end: parse_timestamp(&last.end_time)?,
            remarks: entry.remarks.clone(),
            shifts,
        })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    /// Shifts in effect at some point of `[start, end]`. A shift is in
    /// effect from its own start until the next shift starts; the last one
    /// is open-ended.
    pub fn shifts_in_period(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&ShiftCurve> {
        self.shifts
            .iter()
            .enumerate()
            .filter(|(i, shift)| {
                let effective_end = self.shifts.get(i + 1).map(|next| next.start);
                let ends_before = effective_end.is_some_and(|e| e < start);
                let starts_after = shift.start > end;
                !(ends_before || starts_after)
            })
            .map(|(_, shift)| shift)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Rating model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RatingModel {
    pub id: String,
    pub ratings: Vec<Rating>,
}

impl RatingModel {
    pub fn new(id: &str) -> Self {
        RatingModel {
            id: id.to_string(),
            ratings: Vec::new(),
        }
    }

    /// Load the ratings and shifts applicable to the record period.
    pub fn retrieve_info_for_record(
        &mut self,
        session: &dyn AquariusSession,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<()> {
        let response = session.rating_model_detail(&self.id, Some((start, end)))?;
        let ratings = response
            .rating_curves
            .iter()
            .map(|curve| Rating::from_entry(curve, &self.id))
            .collect::<Result<Vec<_>>>()?;
        self.ratings = ratings;
        Ok(())
    }

    /// Id of the rating in effect at `at`. Where periods overlap the later
    /// listed rating wins.
    pub fn rating_id_for(&self, at: NaiveDateTime) -> Option<&str> {
        self.ratings
            .iter()
            .filter(|r| r.contains(at))
            .last()
            .map(|r| r.id.as_str())
    }

    /// Shifts of every rating that were in effect during the period.
    pub fn shifts_in_period(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&ShiftCurve> {
        self.ratings
            .iter()
            .flat_map(|r| r.shifts_in_period(start, end))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::payload::RatingCurveListResponse;
    use chrono::NaiveDate;

    fn t(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    const CURVES: &str = r#"{"RatingCurves": [
        {"Id": "13.0", "Remarks": "old rating",
         "PeriodsOfApplicability": [
            {"StartTime": "2020-10-01T00:00:00-05:00", "EndTime": "2022-06-01T00:00:00-05:00"},
            {"StartTime": "2022-06-01T00:00:00-05:00", "EndTime": "2023-03-01T00:00:00-05:00"}],
         "Shifts": []},
        {"Id": "14.0", "Remarks": "",
         "PeriodsOfApplicability": [
            {"StartTime": "2023-03-01T00:00:00-05:00", "EndTime": "9999-12-31T00:00:00-05:00"}],
         "Shifts": [
            {"PeriodOfApplicability": {"StartTime": "2023-03-01T00:00:00-05:00",
                "EndTime": "9999-12-31T00:00:00-05:00", "Remarks": "base"},
             "ShiftPoints": [{"InputValue": 1.0, "Shift": 0.0}]},
            {"PeriodOfApplicability": {"StartTime": "2023-08-15T00:00:00-05:00",
                "EndTime": "9999-12-31T00:00:00-05:00", "Remarks": "fill on control"},
             "ShiftPoints": [{"InputValue": 1.0, "Shift": 0.12}, {"InputValue": 3.0, "Shift": 0.0}]},
            {"PeriodOfApplicability": {"StartTime": "2024-02-01T00:00:00-05:00",
                "EndTime": "9999-12-31T00:00:00-05:00", "Remarks": "scour"},
             "ShiftPoints": [{"InputValue": 1.5, "Shift": -0.05}, {"InputValue": 3.0, "Shift": 0.0}]}
         ]}
    ]}"#;

    fn ratings() -> Vec<Rating> {
        let resp: RatingCurveListResponse = serde_json::from_str(CURVES).unwrap();
        resp.rating_curves
            .iter()
            .map(|c| Rating::from_entry(c, "Discharge.STGQ@03277200").unwrap())
            .collect()
    }

    #[test]
    fn test_rating_spans_all_applicability_periods() {
        let r = &ratings()[0];
        assert_eq!(r.start, t(2020, 10, 1));
        assert_eq!(r.end, t(2023, 3, 1));
        assert_eq!(r.remarks, "old rating");
    }

    #[test]
    fn test_shifts_compare_with_previous() {
        let r = &ratings()[1];
        assert_eq!(r.shifts.len(), 3);

        assert_eq!(r.shifts[0].shape, ShiftShape::NullShift);
        assert_eq!(r.shifts[0].reported.text, "0.00'");

        assert_eq!(r.shifts[1].shape, ShiftShape::HalfHouse);
        assert!(!r.shifts[1].gage_heights_changed);
        assert_eq!(r.shifts[1].reported.text, "0.12'");
        assert_eq!(r.shifts[1].comment, "fill on control");

        assert!(r.shifts[2].gage_heights_changed);
        assert!(r.shifts[2].reported.long);
        assert_eq!(r.shifts[2].reported.text, "(1.50', -0.05'), (3.00', 0.00')");
    }

    #[test]
    fn test_rating_id_for() {
        let mut model = RatingModel::new("Discharge.STGQ@03277200");
        model.ratings = ratings();
        assert_eq!(model.rating_id_for(t(2021, 5, 1)), Some("13.0"));
        // Boundary instant belongs to both; the later rating wins.
        assert_eq!(model.rating_id_for(t(2023, 3, 1)), Some("14.0"));
        assert_eq!(model.rating_id_for(t(2019, 1, 1)), None);
    }

    #[test]
    fn test_shifts_in_period() {
        let r = &ratings()[1];
        let in_period = r.shifts_in_period(t(2023, 10, 1), t(2024, 9, 30));
        let comments: Vec<&str> = in_period.iter().map(|s| s.comment.as_str()).collect();
        assert_eq!(comments, vec!["fill on control", "scour"]);

        let early = r.shifts_in_period(t(2023, 4, 1), t(2023, 5, 1));
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].comment, "base");
    }

    #[test]
    fn test_rating_without_periods_is_parse_error() {
        let resp: RatingCurveListResponse =
            serde_json::from_str(r#"{"RatingCurves": [{"Id": "1.0"}]}"#).unwrap();
        assert!(matches!(
            Rating::from_entry(&resp.rating_curves[0], "m"),
            Err(RecordError::ParseError(_))
        ));
    }
}
