/// Upstream service seams.
///
/// The record graph never talks HTTP directly; it is handed an
/// `AquariusSession` (and optionally a `SimsSession`) per call. The
/// production implementation lives in [`aquarius`]; tests substitute an
/// in-memory fake.

pub mod aquarius;
pub mod payload;
pub mod sims;

use chrono::NaiveDateTime;

use crate::model::Result;
use payload::{
    CorrectionListResponse, CoverageFlags, FieldVisitDataResponse, FieldVisitListResponse,
    RatingCurveListResponse, RatingModelListResponse, SensorListResponse, SiteInfo,
    TimeSeriesDataResponse, TimeSeriesDescription,
};

/// Read-only queries against the Aquarius Publish API.
pub trait AquariusSession {
    /// Name and Aquarius unique id for an NWIS site number.
    fn site_info(&self, site_no: &str) -> Result<SiteInfo>;

    /// Published, instantaneous timeseries of `parameter` at the site.
    fn timeseries_list(&self, site_no: &str, parameter: &str) -> Result<Vec<TimeSeriesDescription>>;

    fn timeseries_data(
        &self,
        unique_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
        coverage: CoverageFlags,
    ) -> Result<TimeSeriesDataResponse>;

    fn corrections(
        &self,
        unique_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<CorrectionListResponse>;

    fn field_visits(
        &self,
        site_no: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<FieldVisitListResponse>;

    fn field_visit_data(&self, identifier: &str) -> Result<FieldVisitDataResponse>;

    fn sensors(&self, site_no: &str) -> Result<SensorListResponse>;

    fn rating_models(&self, site_no: &str) -> Result<RatingModelListResponse>;

    /// Rating curves and shifts, optionally limited to a period.
    fn rating_model_detail(
        &self,
        model_id: &str,
        period: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<RatingCurveListResponse>;

    /// Base-rating discharge (shifts not applied) at `gage_height` for the
    /// curve in effect at `at`.
    fn rating_base_output(&self, model_id: &str, gage_height: f64, at: NaiveDateTime) -> Result<f64>;
}

/// Station description text kept in SIMs.
pub trait SimsSession {
    fn levels_description(&self, site_no: &str) -> Result<String>;
    fn ratings_description(&self, site_no: &str) -> Result<String>;
}
