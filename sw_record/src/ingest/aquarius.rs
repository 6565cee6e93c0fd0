/// Aquarius Publish v2 REST client
///
/// Blocking `reqwest` implementation of [`AquariusSession`]. Authentication
/// is a pre-issued session token sent in the `X-Authentication-Token`
/// header; obtaining that token is the embedding application's job.
///
/// API reference: `<server>/AQUARIUS/Publish/v2/swagger-ui`

use std::time::Duration as StdDuration;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;

use super::AquariusSession;
use super::payload::{
    CorrectionListResponse, CoverageFlags, FieldVisitDataResponse, FieldVisitListResponse,
    LocationDescriptionListResponse, RatingCurveListResponse, RatingModelListResponse,
    RatingOutputResponse, SensorListResponse, SiteInfo, TimeSeriesDataResponse,
    TimeSeriesDescription, TimeSeriesDescriptionListResponse,
};
use crate::config::AquariusSettings;
use crate::logging::{self, DataSource};
use crate::model::{RecordError, Result};

const AUTH_HEADER: &str = "X-Authentication-Token";
const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// Client
// ============================================================================

pub struct AquariusHttpClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl AquariusHttpClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// `Config` when no base URL is configured, `RequestFailed` when the
    /// TLS backend cannot be initialised.
    pub fn new(settings: &AquariusSettings) -> Result<Self> {
        if settings.base_url.trim().is_empty() {
            return Err(RecordError::Config(
                "aquarius.base_url is not set (config file or AQUARIUS_URL)".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| RecordError::RequestFailed(e.to_string()))?;

        Ok(AquariusHttpClient {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        })
    }

    fn endpoint_url(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url, operation)
    }

    /// GET `operation` with query parameters and decode the JSON body.
    fn get_json<T: DeserializeOwned>(&self, operation: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(operation);
        logging::debug(DataSource::Aquarius, None, &format!("GET {} {:?}", operation, params));

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(params);
        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }

        let result = request
            .send()
            .map_err(|e| RecordError::RequestFailed(e.to_string()))
            .and_then(|response| {
                let status = response.status();
                if !status.is_success() {
                    return Err(RecordError::HttpError(status.as_u16()));
                }
                response
                    .text()
                    .map_err(|e| RecordError::RequestFailed(e.to_string()))
            })
            .and_then(|body| {
                serde_json::from_str::<T>(&body)
                    .map_err(|e| RecordError::ParseError(format!("{}: {}", operation, e)))
            });

        if let Err(ref e) = result {
            logging::log_aquarius_failure(None, operation, e);
        }
        result
    }
}

fn format_query_time(dt: NaiveDateTime) -> String {
    dt.format(QUERY_TIME_FORMAT).to_string()
}

fn coverage_params(coverage: CoverageFlags) -> [(&'static str, String); 2] {
    [
        ("ReturnFullCoverage", coverage.full_coverage.to_string()),
        ("IncludeGapMarkers", coverage.gap_markers.to_string()),
    ]
}

// ============================================================================
// AquariusSession implementation
// ============================================================================

impl AquariusSession for AquariusHttpClient {
    fn site_info(&self, site_no: &str) -> Result<SiteInfo> {
        let response: LocationDescriptionListResponse = self.get_json(
            "GetLocationDescriptionList",
            &[("LocationIdentifier", site_no.to_string())],
        )?;

        response
            .location_descriptions
            .into_iter()
            .find(|loc| loc.identifier == site_no)
            .map(|loc| SiteInfo {
                name: loc.name,
                unique_id: loc.unique_id,
            })
            .ok_or_else(|| RecordError::SiteNotFound(site_no.to_string()))
    }

    fn timeseries_list(&self, site_no: &str, parameter: &str) -> Result<Vec<TimeSeriesDescription>> {
        let response: TimeSeriesDescriptionListResponse = self.get_json(
            "GetTimeSeriesDescriptionList",
            &[
                ("LocationIdentifier", site_no.to_string()),
                ("Parameter", parameter.to_string()),
                ("Publish", "true".to_string()),
                ("ComputationIdentifier", "Instantaneous".to_string()),
            ],
        )?;
        Ok(response.time_series_descriptions)
    }

    fn timeseries_data(
        &self,
        unique_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
        coverage: CoverageFlags,
    ) -> Result<TimeSeriesDataResponse> {
        let mut params = vec![
            ("TimeSeriesUniqueId", unique_id.to_string()),
            ("QueryFrom", format_query_time(from)),
            ("QueryTo", format_query_time(to)),
        ];
        params.extend(coverage_params(coverage));
        self.get_json("GetTimeSeriesCorrectedData", &params)
    }

    fn corrections(
        &self,
        unique_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<CorrectionListResponse> {
        self.get_json(
            "GetCorrectionList",
            &[
                ("TimeSeriesUniqueId", unique_id.to_string()),
                ("QueryFrom", format_query_time(from)),
                ("QueryTo", format_query_time(to)),
            ],
        )
    }

    fn field_visits(
        &self,
        site_no: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<FieldVisitListResponse> {
        self.get_json(
            "GetFieldVisitDescriptionList",
            &[
                ("LocationIdentifier", site_no.to_string()),
                ("QueryFrom", format_query_time(from)),
                ("QueryTo", format_query_time(to)),
            ],
        )
    }

    fn field_visit_data(&self, identifier: &str) -> Result<FieldVisitDataResponse> {
        self.get_json(
            "GetFieldVisitData",
            &[("FieldVisitIdentifier", identifier.to_string())],
        )
    }

    fn sensors(&self, site_no: &str) -> Result<SensorListResponse> {
        self.get_json(
            "GetSensorsAndGauges",
            &[("LocationIdentifier", site_no.to_string())],
        )
    }

    fn rating_models(&self, site_no: &str) -> Result<RatingModelListResponse> {
        self.get_json(
            "GetRatingModelDescriptionList",
            &[("LocationIdentifier", site_no.to_string())],
        )
    }

    fn rating_model_detail(
        &self,
        model_id: &str,
        period: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<RatingCurveListResponse> {
        let mut params = vec![("RatingModelIdentifier", model_id.to_string())];
        if let Some((from, to)) = period {
            params.push(("QueryFrom", format_query_time(from)));
            params.push(("QueryTo", format_query_time(to)));
        }
        self.get_json("GetRatingCurveList", &params)
    }

    fn rating_base_output(&self, model_id: &str, gage_height: f64, at: NaiveDateTime) -> Result<f64> {
        let response: RatingOutputResponse = self.get_json(
            "GetRatingModelOutputValues",
            &[
                ("RatingModelIdentifier", model_id.to_string()),
                ("InputValues", format!("[{}]", gage_height)),
                ("EffectiveTime", format_query_time(at)),
                ("ApplyShifts", "false".to_string()),
            ],
        )?;

        response.output_values.first().copied().flatten().ok_or_else(|| {
            RecordError::NoDataAvailable(format!(
                "rating {} has no output for {} ft at {}",
                model_id, gage_height, at
            ))
        })
    }
}
