/// The record object graph for one site and period.
///
/// A `Site` owns its gage-height and discharge timeseries (each with a
/// record-period dataset and one dataset per water year), its field visits,
/// and for discharge sites the rating model. Everything is built during a
/// single gather and lives only as long as the run.
///
/// Submodules:
/// - `dataset`: one timeseries over one window, with gaps and extremes.
/// - `timeseries`: record-period and water-year datasets of a timeseries.
/// - `reading`: field readings and their recorder discrepancy.
/// - `field_visit`: per-visit derived facts and discharge measurements.
/// - `rating`: rating model, ratings and shift curves.
/// - `site`: gather orchestration.
/// - `findings`: renderer-facing summaries.

pub mod dataset;
pub mod field_visit;
pub mod findings;
pub mod rating;
pub mod reading;
pub mod site;
pub mod timeseries;

pub use dataset::Dataset;
pub use field_visit::{DischargeMeasurement, FieldVisit};
pub use rating::{Rating, RatingModel, ShiftCurve};
pub use reading::Reading;
pub use site::Site;
pub use timeseries::GenericTimeseries;
