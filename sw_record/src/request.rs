/// Per-run inputs and collected warnings.
///
/// A report-generation run is parameterised by one validated
/// `RecordRequest` and accumulates non-fatal data-entry problems on a
/// `RunContext` that the caller inspects afterwards.

use chrono::{NaiveDate, NaiveDateTime};

use crate::logging::{self, DataSource};
use crate::model::{RecordError, Result};

/// Validated user inputs for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRequest {
    pub site_no: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RecordRequest {
    /// # Errors
    /// `InvalidInput` when the site number is not 8 to 15 digits or the
    /// period ends before it starts.
    pub fn new(site_no: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        let site_no = site_no.trim();
        let well_formed = (8..=15).contains(&site_no.len())
            && site_no.chars().all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(RecordError::InvalidInput(format!(
                "site number '{}' must be 8 to 15 digits",
                site_no
            )));
        }
        if end_date < start_date {
            return Err(RecordError::InvalidInput(format!(
                "record period ends ({}) before it starts ({})",
                end_date, start_date
            )));
        }
        Ok(RecordRequest {
            site_no: site_no.to_string(),
            start_date,
            end_date,
        })
    }

    /// Midnight at the start of the first day.
    pub fn period_start(&self) -> NaiveDateTime {
        self.start_date.and_time(chrono::NaiveTime::MIN)
    }

    /// 23:59:59 on the last day.
    pub fn period_end(&self) -> NaiveDateTime {
        self.end_date
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| self.end_date.and_time(chrono::NaiveTime::MIN))
    }
}

/// A data-entry inconsistency that did not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunWarning {
    pub site_no: String,
    pub message: String,
}

/// Mutable state threaded through one run.
#[derive(Debug)]
pub struct RunContext {
    pub request: RecordRequest,
    warnings: Vec<RunWarning>,
}

impl RunContext {
    pub fn new(request: RecordRequest) -> Self {
        RunContext {
            request,
            warnings: Vec::new(),
        }
    }

    /// Record and log a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        logging::warn(DataSource::Analysis, Some(&self.request.site_no), &message);
        self.warnings.push(RunWarning {
            site_no: self.request.site_no.clone(),
            message,
        });
    }

    pub fn warnings(&self) -> &[RunWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_valid_request_spans_whole_days() {
        let req = RecordRequest::new("03277200", d(2023, 10, 1), d(2024, 9, 30)).unwrap();
        assert_eq!(req.period_start().to_string(), "2023-10-01 00:00:00");
        assert_eq!(req.period_end().to_string(), "2024-09-30 23:59:59");
    }

    #[test]
    fn test_fifteen_digit_site_number_accepted() {
        assert!(RecordRequest::new("381023084293401", d(2024, 1, 1), d(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_rejects_end_before_start() {
        let result = RecordRequest::new("03277200", d(2024, 2, 1), d(2024, 1, 31));
        assert!(matches!(result, Err(RecordError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_malformed_site_number() {
        for bad in ["0327720", "03277200A", "", "1234567890123456"] {
            let result = RecordRequest::new(bad, d(2024, 1, 1), d(2024, 2, 1));
            assert!(matches!(result, Err(RecordError::InvalidInput(_))), "{}", bad);
        }
    }

    #[test]
    fn test_context_collects_warnings() {
        let req = RecordRequest::new("03277200", d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        let mut ctx = RunContext::new(req);
        ctx.warn("after reset reading without before reading");
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].site_no, "03277200");
    }
}
