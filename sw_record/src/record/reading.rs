/// Field readings and their comparison against the recorder.

use chrono::{Duration, NaiveDateTime};

use super::dataset::Dataset;
use super::timeseries::GenericTimeseries;
use crate::analysis::discrepancy::reading_discrepancy;
use crate::ingest::payload::{parse_timestamp, ReadingEntry};
use crate::ingest::AquariusSession;
use crate::model::Result;
use crate::request::RunContext;

pub const CHECKBAR_PARAMETER: &str = "Elevation, Relative Datum";
pub const CHECKBAR_METHOD: &str = "Wire Weight Gage";
pub const CHECKBAR_READING_TYPE: &str = "Calibration";

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub parameter: String,
    pub monitoring_method: String,
    /// e.g. `ExtremeMax`, `ResetBefore`, `Routine`.
    pub reading_type: String,
    pub datetime: NaiveDateTime,
    pub value: f64,
    /// Empty when the reading has no sublocation.
    pub sublocation: String,
    pub comment: String,
    /// Interpolated recorder value minus the reading, once checked.
    pub discrepancy: Option<f64>,
}

impl Reading {
    /// Convert a visit reading. Readings without a time or a numeric value
    /// cannot be placed on the record and yield `Ok(None)`.
    pub fn from_entry(entry: &ReadingEntry) -> Result<Option<Reading>> {
        let (Some(time), Some(value)) = (entry.time.as_deref(), entry.value.numeric) else {
            return Ok(None);
        };
        Ok(Some(Reading {
            parameter: entry.parameter.clone(),
            monitoring_method: entry.monitoring_method.clone(),
            reading_type: entry.reading_type.clone(),
            datetime: parse_timestamp(time)?,
            value,
            sublocation: entry.sub_location_identifier.clone(),
            comment: entry.comments.clone(),
            discrepancy: None,
        }))
    }

    /// Wire-weight checkbar calibration reading recorded at `datetime`.
    pub fn checkbar(datetime: NaiveDateTime, value: f64) -> Reading {
        Reading {
            parameter: CHECKBAR_PARAMETER.to_string(),
            monitoring_method: CHECKBAR_METHOD.to_string(),
            reading_type: CHECKBAR_READING_TYPE.to_string(),
            datetime,
            value,
            sublocation: String::new(),
            comment: String::new(),
            discrepancy: None,
        }
    }

    /// Compare against the gage-height recorder.
    ///
    /// With one GH timeseries that one is used; with several, the one whose
    /// sublocation matches the reading's. No match leaves the discrepancy
    /// unset and records a warning.
    pub fn check_discrepancy(
        &mut self,
        gage_height_timeseries: &[GenericTimeseries],
        session: &dyn AquariusSession,
        ctx: &mut RunContext,
        window: Duration,
    ) -> Result<()> {
        let target = match gage_height_timeseries {
            [] => None,
            [only] => Some(only),
            many => many.iter().find(|ts| ts.sublocation == self.sublocation),
        };
        let Some(ts) = target else {
            if !gage_height_timeseries.is_empty() {
                ctx.warn(format!(
                    "{} reading at {} has sublocation '{}' matching no gage-height timeseries",
                    self.reading_type, self.datetime, self.sublocation
                ));
            }
            self.discrepancy = None;
            return Ok(());
        };

        let mut bordering = Dataset::new(
            &ts.unique_id,
            self.datetime - window,
            self.datetime + window,
        );
        bordering.gather_data(session)?;
        self.discrepancy = reading_discrepancy(&bordering.points, self.datetime, self.value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::payload::Quantity;

    fn entry(time: Option<&str>, value: Option<f64>) -> ReadingEntry {
        ReadingEntry {
            parameter: "Gage height".to_string(),
            monitoring_method: "Crest stage".to_string(),
            reading_type: "ExtremeMax".to_string(),
            time: time.map(str::to_string),
            value: Quantity { numeric: value, unit: Some("ft".to_string()) },
            sub_location_identifier: "Downstream".to_string(),
            comments: String::new(),
        }
    }

    #[test]
    fn test_from_entry_parses_time_and_sublocation() {
        let r = Reading::from_entry(&entry(Some("2024-05-02T13:45:00.0000000-05:00"), Some(8.12)))
            .unwrap()
            .unwrap();
        assert_eq!(r.datetime.to_string(), "2024-05-02 13:45:00");
        assert_eq!(r.value, 8.12);
        assert_eq!(r.sublocation, "Downstream");
        assert!(r.discrepancy.is_none());
    }

    #[test]
    fn test_from_entry_without_time_or_value() {
        assert_eq!(Reading::from_entry(&entry(None, Some(8.12))).unwrap(), None);
        assert_eq!(
            Reading::from_entry(&entry(Some("2024-05-02T13:45:00-05:00"), None)).unwrap(),
            None
        );
    }

    #[test]
    fn test_from_entry_bad_time_is_error() {
        assert!(Reading::from_entry(&entry(Some("05/02/2024"), Some(1.0))).is_err());
    }
}
