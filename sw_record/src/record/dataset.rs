/// A timeseries restricted to one date window, with everything the record
/// needs to know about it: unit values, gaps, qualifiers, corrections and
/// extremes.
///
/// Responses are cached on the dataset after the first fetch. The
/// full-coverage response is shared by qualifier and gap assessment, and
/// the correction list by both correction passes.

use chrono::NaiveDateTime;

use crate::analysis::extremes::{assess_extreme, is_estimated, Extreme};
use crate::analysis::gaps::{find_gaps, whole_window_gap, CoverageSample};
use crate::ingest::payload::{
    parse_timestamp, parse_timestamp_to_minute, CorrectionEntry, CorrectionListResponse,
    CoverageFlags, ShiftPointEntry, TimeSeriesDataResponse,
};
use crate::ingest::AquariusSession;
use crate::logging::{self, DataSource};
use crate::model::{
    round_to, Correction, DataPoint, Gap, MultiPointCorrection, Qualifier, RecordError, Result,
    ShiftInputPoint, CORRECTION_COPY_PASTE, CORRECTION_MULTIPOINT,
    CORRECTION_THRESHOLD_SUPPRESSION, SET_TWO,
};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub ts_unique_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Time-ascending. The successor of `points[i]` is `points[i + 1]`.
    pub points: Vec<DataPoint>,
    pub max_index: Option<usize>,
    pub min_index: Option<usize>,
    pub qualifiers: Vec<Qualifier>,
    pub general_corrections: Vec<Correction>,
    pub multipoint_corrections: Vec<MultiPointCorrection>,
    pub gaps: Vec<Gap>,

    data_response: Option<TimeSeriesDataResponse>,
    full_coverage_response: Option<TimeSeriesDataResponse>,
    corrections_response: Option<CorrectionListResponse>,
}

impl Dataset {
    pub fn new(ts_unique_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Dataset {
            ts_unique_id: ts_unique_id.to_string(),
            start,
            end,
            points: Vec::new(),
            max_index: None,
            min_index: None,
            qualifiers: Vec::new(),
            general_corrections: Vec::new(),
            multipoint_corrections: Vec::new(),
            gaps: Vec::new(),
            data_response: None,
            full_coverage_response: None,
            corrections_response: None,
        }
    }

    /// Build and fully populate a dataset. Nothing is returned on failure,
    /// so callers never hold a half-gathered record.
    pub fn load_for_records(
        session: &dyn AquariusSession,
        ts_unique_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self> {
        let mut dataset = Dataset::new(ts_unique_id, start, end);
        dataset.gather_data_for_records(session)?;
        Ok(dataset)
    }

    /// Gather points, qualifiers, corrections, gaps and extremes.
    ///
    /// Every response is fetched and parsed before any field is replaced, so
    /// an error leaves the dataset exactly as it was.
    pub fn gather_data_for_records(&mut self, session: &dyn AquariusSession) -> Result<()> {
        self.fetch_points(session)?;
        self.fetch_full_coverage(session)?;
        self.fetch_corrections(session)?;
        let (Some(data), Some(full), Some(corrections)) = (
            self.data_response.as_ref(),
            self.full_coverage_response.as_ref(),
            self.corrections_response.as_ref(),
        ) else {
            return Err(RecordError::NoDataAvailable(self.ts_unique_id.clone()));
        };

        let mut points = points_from(data)?;
        let qualifiers = qualifiers_from(full)?;
        let general_corrections = general_corrections_from(corrections)?;
        let multipoint_corrections = multipoint_corrections_from(corrections)?;
        let gaps = gaps_from(full, self.start, self.end)?;
        let max_index = flagged_extreme(&mut points, Extreme::Max, &qualifiers);
        let min_index = flagged_extreme(&mut points, Extreme::Min, &qualifiers);

        self.points = points;
        self.qualifiers = qualifiers;
        self.general_corrections = general_corrections;
        self.multipoint_corrections = multipoint_corrections;
        self.gaps = gaps;
        self.max_index = max_index;
        self.min_index = min_index;

        logging::debug(
            DataSource::Analysis,
            None,
            &format!(
                "{} {}..{}: {} points, {} gaps, {} qualifiers, {} corrections",
                self.ts_unique_id,
                self.start,
                self.end,
                self.points.len(),
                self.gaps.len(),
                self.qualifiers.len(),
                self.general_corrections.len() + self.multipoint_corrections.len()
            ),
        );
        Ok(())
    }

    /// Unit values only, rounded to hundredths.
    pub fn gather_data(&mut self, session: &dyn AquariusSession) -> Result<()> {
        self.fetch_points(session)?;
        let Some(data) = self.data_response.as_ref() else {
            return Err(RecordError::NoDataAvailable(self.ts_unique_id.clone()));
        };
        self.points = points_from(data)?;
        Ok(())
    }

    /// Drop cached responses and derived state; the next gather re-fetches.
    pub fn refresh(&mut self) {
        *self = Dataset::new(&self.ts_unique_id, self.start, self.end);
    }

    // ---------------------------------------------------------------------------
    // Fetching
    // ---------------------------------------------------------------------------

    fn fetch_points(&mut self, session: &dyn AquariusSession) -> Result<()> {
        if self.data_response.is_none() {
            let resp = session.timeseries_data(
                &self.ts_unique_id,
                self.start,
                self.end,
                CoverageFlags::POINTS_ONLY,
            )?;
            self.data_response = Some(resp);
        }
        Ok(())
    }

    fn fetch_full_coverage(&mut self, session: &dyn AquariusSession) -> Result<()> {
        if self.full_coverage_response.is_none() {
            let resp =
                session.timeseries_data(&self.ts_unique_id, self.start, self.end, CoverageFlags::FULL)?;
            self.full_coverage_response = Some(resp);
        }
        Ok(())
    }

    fn fetch_corrections(&mut self, session: &dyn AquariusSession) -> Result<()> {
        if self.corrections_response.is_none() {
            let resp = session.corrections(&self.ts_unique_id, self.start, self.end)?;
            self.corrections_response = Some(resp);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Record-level queries
    // ---------------------------------------------------------------------------

    pub fn max_point(&self) -> Option<&DataPoint> {
        self.max_index.and_then(|i| self.points.get(i))
    }

    pub fn min_point(&self) -> Option<&DataPoint> {
        self.min_index.and_then(|i| self.points.get(i))
    }

    /// The unit value after `index`, if any.
    pub fn successor(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index + 1)
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }

    pub fn qualifiers_with<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = &'a Qualifier> {
        self.qualifiers.iter().filter(move |q| q.identifier == identifier)
    }

    pub fn copy_paste_corrections(&self) -> impl Iterator<Item = &Correction> {
        self.general_corrections
            .iter()
            .filter(|c| c.correction_type == CORRECTION_COPY_PASTE)
    }

    pub fn has_pasted_data(&self) -> bool {
        self.copy_paste_corrections().next().is_some()
    }

    pub fn set_two_corrections(&self) -> impl Iterator<Item = &MultiPointCorrection> {
        self.multipoint_corrections
            .iter()
            .filter(|c| c.processing_order == SET_TWO)
    }

    pub fn other_multipoint_corrections(&self) -> impl Iterator<Item = &MultiPointCorrection> {
        self.multipoint_corrections
            .iter()
            .filter(|c| c.processing_order != SET_TWO)
    }
}

// ---------------------------------------------------------------------------
// Assessment passes
// ---------------------------------------------------------------------------

fn points_from(data: &TimeSeriesDataResponse) -> Result<Vec<DataPoint>> {
    data.points
        .iter()
        .map(|p| {
            let datetime = parse_timestamp(&p.timestamp)?;
            Ok(DataPoint::new(datetime, p.value.numeric().map(|v| round_to(v, 2))))
        })
        .collect()
}

fn qualifiers_from(full: &TimeSeriesDataResponse) -> Result<Vec<Qualifier>> {
    full.qualifiers
        .iter()
        .map(|q| {
            Ok(Qualifier {
                start: parse_timestamp(&q.start_time)?,
                end: parse_timestamp(&q.end_time)?,
                identifier: q.identifier.clone(),
            })
        })
        .collect()
}

fn general_corrections_from(corrections: &CorrectionListResponse) -> Result<Vec<Correction>> {
    corrections
        .corrections
        .iter()
        .filter(|c| {
            c.correction_type != CORRECTION_MULTIPOINT
                && c.correction_type != CORRECTION_THRESHOLD_SUPPRESSION
        })
        .map(|c| {
            Ok(Correction {
                correction_type: c.correction_type.clone(),
                start: parse_timestamp(&c.start_time)?,
                end: parse_timestamp(&c.end_time)?,
                processing_order: c.processing_order.clone(),
                comment: c.comment.clone(),
            })
        })
        .collect()
}

fn multipoint_corrections_from(
    corrections: &CorrectionListResponse,
) -> Result<Vec<MultiPointCorrection>> {
    corrections
        .corrections
        .iter()
        .filter(|c| c.correction_type == CORRECTION_MULTIPOINT)
        .map(multipoint_from_entry)
        .collect()
}

/// Gaps from the full-coverage response. A response without any points is
/// one gap over the whole window.
fn gaps_from(full: &TimeSeriesDataResponse, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Gap>> {
    if full.points.is_empty() {
        return Ok(vec![whole_window_gap(start, end)]);
    }
    let samples = full
        .points
        .iter()
        .map(|p| Ok((parse_timestamp_to_minute(&p.timestamp)?, p.value.is_gap_marker())))
        .collect::<Result<Vec<CoverageSample>>>()?;
    Ok(find_gaps(&samples))
}

/// Extreme point index, with the point flagged when an ESTIMATED qualifier
/// covers it.
fn flagged_extreme(points: &mut [DataPoint], which: Extreme, qualifiers: &[Qualifier]) -> Option<usize> {
    let index = assess_extreme(points, which)?;
    points[index].estimated = is_estimated(&points[index], qualifiers);
    Some(index)
}

fn shift_points(entries: &[ShiftPointEntry]) -> Vec<ShiftInputPoint> {
    entries
        .iter()
        .map(|e| ShiftInputPoint::new(e.value, e.offset))
        .collect()
}

fn multipoint_from_entry(entry: &CorrectionEntry) -> Result<MultiPointCorrection> {
    let params = &entry.parameters;
    let start_points = params.start_shift_points.as_deref().ok_or_else(|| {
        RecordError::ParseError(format!(
            "USGSMultiPoint correction at {} has no StartShiftPoints",
            entry.start_time
        ))
    })?;
    let usgs_type = params.usgs_type.clone().ok_or_else(|| {
        RecordError::ParseError(format!(
            "USGSMultiPoint correction at {} has no UsgsType",
            entry.start_time
        ))
    })?;

    Ok(MultiPointCorrection {
        start: parse_timestamp(&entry.start_time)?,
        end: parse_timestamp(&entry.end_time)?,
        start_shifts: shift_points(start_points),
        end_shifts: params
            .end_shift_points
            .as_deref()
            .map(shift_points)
            .unwrap_or_default(),
        processing_order: usgs_type,
        comment: entry.comment.clone(),
    })
}
