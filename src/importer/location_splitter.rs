// ==========================================
// AuditGov - Location splitter
// ==========================================
// "City/RG" -> (CITY, RG)
// Storage guards: region cut to its first N chars, city to at most M chars
// Oversized values are truncated, never rejected
// ==========================================

use crate::importer::field_normalizer::{clean_text, truncate};

/// City name used when the source gives none
pub const UNDEFINED_CITY: &str = "UNDEFINED";

/// Region code used when the source gives none
pub const UNDEFINED_REGION: &str = "XX";

pub const DEFAULT_CITY_MAX_LEN: usize = 150;
pub const DEFAULT_REGION_LEN: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct LocationSplitter {
    city_max_len: usize,
    region_len: usize,
}

impl Default for LocationSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CITY_MAX_LEN, DEFAULT_REGION_LEN)
    }
}

impl LocationSplitter {
    pub fn new(city_max_len: usize, region_len: usize) -> Self {
        Self {
            city_max_len,
            region_len,
        }
    }

    /// Split a combined destination into (city, region code)
    pub fn split(&self, raw: &str) -> (String, String) {
        let cleaned = clean_text(raw);
        if cleaned.is_empty() {
            return (UNDEFINED_CITY.to_string(), UNDEFINED_REGION.to_string());
        }

        let mut parts = cleaned.split('/');
        let city = parts.next().unwrap_or_default().trim();
        let region = parts.next().map(str::trim).unwrap_or_default();

        let city = if city.is_empty() {
            UNDEFINED_CITY.to_string()
        } else {
            truncate(city, self.city_max_len)
        };

        let region = if region.is_empty() {
            UNDEFINED_REGION.to_string()
        } else {
            truncate(region, self.region_len)
        };

        (city, region)
    }
}

/// Split with the default storage limits
pub fn split_location(raw: &str) -> (String, String) {
    LocationSplitter::default().split(raw)
}
