/// Derived-metric algorithms for the record.
///
/// Everything here is a pure function over in-memory values; fetching and
/// caching live in `record`. Data-entry inconsistencies come back as
/// warning strings alongside the result rather than as errors.
///
/// Submodules:
/// - `gaps`: gap detection over full-coverage unit values.
/// - `extremes`: record min/max selection with tie flagging.
/// - `shifts`: shift-curve shape classification and reported magnitudes.
/// - `discrepancy`: field reading vs. interpolated recorder value.
/// - `resets`: recorder reset amounts from before/after readings.
/// - `water_year`: October-September water-year arithmetic.
/// - `inspection`: free-text inspection comment scraping.

pub mod discrepancy;
pub mod extremes;
pub mod gaps;
pub mod inspection;
pub mod resets;
pub mod shifts;
pub mod water_year;
