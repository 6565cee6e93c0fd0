//! Surface water record analysis core.
//!
//! Pulls gage-height, discharge, field-visit, correction and rating data
//! for a USGS gaging station from Aquarius (and station text from SIMs)
//! and derives the facts a surface water record narrates: gaps, extremes,
//! reading discrepancies, corrections, shift shapes, reset amounts and
//! water-year partitions.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod record;
pub mod request;
