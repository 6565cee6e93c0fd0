/// A gaging station and everything gathered for one record period.
///
/// `Site::load` only resolves the site's name and Aquarius id.
/// `gather_records_info` then walks the data sources in a fixed order:
/// gage-height timeseries, sensors, SIMs levels text, field visits,
/// discharge timeseries, and for discharge sites the SIMs ratings text,
/// rating model, and measurement back-check against the base rating.

use chrono::Duration;

use super::field_visit::{percent_difference_from_base, FieldVisit};
use super::rating::RatingModel;
use super::timeseries::GenericTimeseries;
use crate::config::AnalysisSettings;
use crate::ingest::payload::TimeSeriesDescription;
use crate::ingest::{AquariusSession, SimsSession};
use crate::logging::{self, DataSource};
use crate::model::{RecordError, Result, Sensor, METHOD_WIRE_WEIGHT_GAGE};
use crate::request::RunContext;

#[derive(Debug, Clone)]
pub struct Site {
    pub site_no: String,
    pub name: String,
    pub unique_id: String,
    pub gage_height_timeseries: Vec<GenericTimeseries>,
    pub discharge_timeseries: Vec<GenericTimeseries>,
    pub sensors: Vec<Sensor>,
    pub field_visits: Vec<FieldVisit>,
    pub rating_model: Option<RatingModel>,
    pub levels_description: String,
    pub ratings_description: String,
    pub settings: AnalysisSettings,
}

impl Site {
    /// Resolve the site's name and unique id.
    ///
    /// # Errors
    /// `SiteNotFound` when Aquarius has no location with this number.
    pub fn load(site_no: &str, session: &dyn AquariusSession) -> Result<Self> {
        let info = session.site_info(site_no)?;
        logging::info(
            DataSource::Aquarius,
            Some(site_no),
            &format!("Loaded site '{}'", info.name),
        );
        Ok(Site {
            site_no: site_no.to_string(),
            name: info.name,
            unique_id: info.unique_id,
            gage_height_timeseries: Vec::new(),
            discharge_timeseries: Vec::new(),
            sensors: Vec::new(),
            field_visits: Vec::new(),
            rating_model: None,
            levels_description: String::new(),
            ratings_description: String::new(),
            settings: AnalysisSettings::default(),
        })
    }

    pub fn with_settings(mut self, settings: AnalysisSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Gather everything the record for `ctx.request` needs.
    ///
    /// Any fetch or payload error aborts the gather and leaves the site as
    /// it was; data-entry problems are recorded on `ctx` and processing
    /// continues.
    pub fn gather_records_info(
        &mut self,
        session: &dyn AquariusSession,
        sims: &dyn SimsSession,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let gage_height = self.gather_stage_timeseries(session, ctx)?;
        let sensors = self.gather_sensors(session)?;
        let levels_description = sims.levels_description(&self.site_no)?;
        logging::debug(
            DataSource::Sims,
            Some(&self.site_no),
            &format!("levels description: {} chars", levels_description.len()),
        );
        let mut field_visits = self.gather_field_visits(&gage_height, session, ctx)?;

        let descriptions = session.timeseries_list(&self.site_no, &self.settings.discharge_parameter)?;
        let discharge = populate_all(&descriptions, session, ctx)?;

        let mut ratings_description = String::new();
        let mut rating_model = None;
        if !discharge.is_empty() {
            ratings_description = sims.ratings_description(&self.site_no)?;
            logging::debug(
                DataSource::Sims,
                Some(&self.site_no),
                &format!("ratings description: {} chars", ratings_description.len()),
            );
            rating_model = self.gather_rating_model(session, ctx)?;
            if let Some(model) = &rating_model {
                backcheck_discharge_measurements(&mut field_visits, model, session, ctx)?;
            }
        }

        self.gage_height_timeseries = gage_height;
        self.sensors = sensors;
        self.levels_description = levels_description;
        self.field_visits = field_visits;
        self.discharge_timeseries = discharge;
        self.ratings_description = ratings_description;
        self.rating_model = rating_model;

        logging::log_gather_summary(
            &self.site_no,
            self.gage_height_timeseries.len() + self.discharge_timeseries.len(),
            self.field_visits.len(),
            ctx.warnings().len(),
        );
        Ok(())
    }

    /// Whether a wire-weight gage is among the site's published sensors.
    pub fn has_wire_weight_gage(&self) -> bool {
        self.sensors.iter().any(|s| s.method == METHOD_WIRE_WEIGHT_GAGE)
    }

    /// Forget everything gathered so the next gather re-fetches.
    pub fn refresh(&mut self) {
        self.gage_height_timeseries.clear();
        self.discharge_timeseries.clear();
        self.sensors.clear();
        self.field_visits.clear();
        self.rating_model = None;
        self.levels_description.clear();
        self.ratings_description.clear();
    }

    // ---------------------------------------------------------------------------
    // Gathering steps
    // ---------------------------------------------------------------------------

    /// Stage timeseries under the first configured parameter that has any.
    fn gather_stage_timeseries(
        &self,
        session: &dyn AquariusSession,
        ctx: &RunContext,
    ) -> Result<Vec<GenericTimeseries>> {
        for parameter in &self.settings.stage_parameters {
            let descriptions = session.timeseries_list(&self.site_no, parameter)?;
            if descriptions.is_empty() {
                logging::debug(
                    DataSource::Aquarius,
                    Some(&self.site_no),
                    &format!("no '{}' timeseries", parameter),
                );
                continue;
            }
            return populate_all(&descriptions, session, ctx);
        }
        Err(RecordError::NoDataAvailable(format!(
            "site {} has no stage timeseries ({})",
            self.site_no,
            self.settings.stage_parameters.join(", ")
        )))
    }

    fn gather_sensors(&self, session: &dyn AquariusSession) -> Result<Vec<Sensor>> {
        let response = session.sensors(&self.site_no)?;
        Ok(response
            .monitoring_methods
            .into_iter()
            .map(|m| Sensor {
                unique_id: m.unique_id,
                parameter: m.parameter,
                method: m.method,
                sublocation: m.sub_location_identifier,
            })
            .collect())
    }

    fn gather_field_visits(
        &self,
        gage_height_timeseries: &[GenericTimeseries],
        session: &dyn AquariusSession,
        ctx: &mut RunContext,
    ) -> Result<Vec<FieldVisit>> {
        let window = Duration::hours(self.settings.bordering_window_hours);
        let response = session.field_visits(
            &self.site_no,
            ctx.request.period_start(),
            ctx.request.period_end(),
        )?;

        let mut visits = Vec::with_capacity(response.field_visit_descriptions.len());
        for description in &response.field_visit_descriptions {
            let mut visit = FieldVisit::from_description(description)?;
            visit.retrieve_records_related_data(gage_height_timeseries, session, ctx, window)?;
            visits.push(visit);
        }
        Ok(visits)
    }

    /// The site's first discharge rating model, loaded for the period.
    fn gather_rating_model(
        &self,
        session: &dyn AquariusSession,
        ctx: &mut RunContext,
    ) -> Result<Option<RatingModel>> {
        let models = session.rating_models(&self.site_no)?;
        let Some(first) = models.rating_model_descriptions.first() else {
            ctx.warn("discharge timeseries present but no rating model found");
            return Ok(None);
        };

        let mut model = RatingModel::new(&first.identifier);
        model.retrieve_info_for_record(session, ctx.request.period_start(), ctx.request.period_end())?;
        Ok(Some(model))
    }
}

/// Percent difference of each measurement from the unshifted base rating
/// at its mean gage height and time.
fn backcheck_discharge_measurements(
    field_visits: &mut [FieldVisit],
    model: &RatingModel,
    session: &dyn AquariusSession,
    ctx: &mut RunContext,
) -> Result<()> {
    for visit in field_visits.iter_mut() {
        for qm in &mut visit.discharge_measurements {
            let (Some(gage_height), Some(discharge)) = (qm.mean_gage_height, qm.discharge) else {
                ctx.warn(format!(
                    "measurement {} on {} lacks mean gage height or discharge; not back-checked",
                    qm.number, visit.date
                ));
                continue;
            };
            let base = session.rating_base_output(&model.id, gage_height, qm.time)?;
            qm.difference_from_base_rating = Some(percent_difference_from_base(discharge, base));
            qm.rating_compared = model.rating_id_for(qm.time).map(str::to_string);
        }
    }
    Ok(())
}

/// Build each timeseries and populate its datasets for the record period.
fn populate_all(
    descriptions: &[TimeSeriesDescription],
    session: &dyn AquariusSession,
    ctx: &RunContext,
) -> Result<Vec<GenericTimeseries>> {
    descriptions
        .iter()
        .map(|desc| {
            let mut ts = GenericTimeseries::from_description(desc);
            ts.populate_datasets_for_records(
                session,
                ctx.request.period_start(),
                ctx.request.period_end(),
            )?;
            Ok(ts)
        })
        .collect()
}
