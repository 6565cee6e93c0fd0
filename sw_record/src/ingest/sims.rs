/// SIMs station-description sources
///
/// The levels and ratings paragraphs are edited by hand in SIMs and copied
/// into the record verbatim. The SIMs web service itself sits behind agency
/// single sign-on, so this module ships offline sources only; a networked
/// implementation plugs in through [`SimsSession`].

use std::collections::HashMap;

use super::SimsSession;
use crate::model::Result;

/// Source used when no SIMs text is available. Every description is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSims;

impl SimsSession for NoSims {
    fn levels_description(&self, _site_no: &str) -> Result<String> {
        Ok(String::new())
    }

    fn ratings_description(&self, _site_no: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// Descriptions supplied up front, keyed by site number.
#[derive(Debug, Clone, Default)]
pub struct StaticSims {
    levels: HashMap<String, String>,
    ratings: HashMap<String, String>,
}

impl StaticSims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels(mut self, site_no: &str, text: &str) -> Self {
        self.levels.insert(site_no.to_string(), text.to_string());
        self
    }

    pub fn with_ratings(mut self, site_no: &str, text: &str) -> Self {
        self.ratings.insert(site_no.to_string(), text.to_string());
        self
    }
}

impl SimsSession for StaticSims {
    fn levels_description(&self, site_no: &str) -> Result<String> {
        Ok(self.levels.get(site_no).cloned().unwrap_or_default())
    }

    fn ratings_description(&self, site_no: &str) -> Result<String> {
        Ok(self.ratings.get(site_no).cloned().unwrap_or_default())
    }
}
