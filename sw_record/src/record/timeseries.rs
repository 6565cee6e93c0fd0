/// One Aquarius timeseries (gage height or discharge) at a site.
///
/// Each timeseries carries its own corrections and edits, independent of
/// any other timeseries at the same site, so the record keeps one dataset
/// for the record period and one per water year the period touches.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::dataset::Dataset;
use crate::analysis::water_year::{water_year_window, water_years_spanning};
use crate::ingest::payload::TimeSeriesDescription;
use crate::ingest::AquariusSession;
use crate::model::Result;

#[derive(Debug, Clone)]
pub struct GenericTimeseries {
    pub identifier: String,
    pub unique_id: String,
    /// Empty when the timeseries has no sublocation.
    pub sublocation: String,
    pub record_dataset: Option<Dataset>,
    pub water_year_datasets: BTreeMap<i32, Dataset>,
}

impl GenericTimeseries {
    pub fn new(identifier: &str, unique_id: &str, sublocation: &str) -> Self {
        GenericTimeseries {
            identifier: identifier.to_string(),
            unique_id: unique_id.to_string(),
            sublocation: sublocation.to_string(),
            record_dataset: None,
            water_year_datasets: BTreeMap::new(),
        }
    }

    pub fn from_description(desc: &TimeSeriesDescription) -> Self {
        Self::new(&desc.identifier, &desc.unique_id, &desc.sub_location_identifier)
    }

    /// Populate the record-period dataset and one dataset per water year
    /// from the start date's water year through the end date's.
    ///
    /// On error neither the record dataset nor the water-year map is
    /// touched.
    pub fn populate_datasets_for_records(
        &mut self,
        session: &dyn AquariusSession,
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> Result<()> {
        let record =
            Dataset::load_for_records(session, &self.unique_id, period_start, period_end)?;

        let mut water_years = BTreeMap::new();
        for year in water_years_spanning(period_start.date(), period_end.date()) {
            let (start, end) = water_year_window(year)?;
            water_years.insert(
                year,
                Dataset::load_for_records(session, &self.unique_id, start, end)?,
            );
        }

        self.record_dataset = Some(record);
        self.water_year_datasets = water_years;
        Ok(())
    }

    pub fn water_year_dataset(&self, year: i32) -> Option<&Dataset> {
        self.water_year_datasets.get(&year)
    }

    pub fn has_record_period_gaps(&self) -> bool {
        self.record_dataset.as_ref().is_some_and(Dataset::has_gaps)
    }

    /// Forget every dataset so the next populate re-fetches.
    pub fn refresh(&mut self) {
        self.record_dataset = None;
        self.water_year_datasets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_description_keeps_sublocation() {
        let desc = TimeSeriesDescription {
            identifier: "Gage height.ft.Upstream@03277200".to_string(),
            unique_id: "5f1e".to_string(),
            sub_location_identifier: "Upstream".to_string(),
            parameter: "Gage height".to_string(),
        };
        let ts = GenericTimeseries::from_description(&desc);
        assert_eq!(ts.sublocation, "Upstream");
        assert!(ts.record_dataset.is_none());
        assert!(!ts.has_record_period_gaps());
    }
}
