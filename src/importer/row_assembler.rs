// ==========================================
// AuditGov - Row assembler
// ==========================================
// RawTripRecord -> Trip
// total = per diem + fare + other expenses - refund
// prepare(): pure normalization, ids unresolved
// resolve(): fills agency / destination ids through the resolver
// ==========================================

use crate::config::ImportSettings;
use crate::domain::types::EntityKind;
use crate::domain::{Agency, City, DataQualityFlags, RawTripRecord, Trip};
use crate::engine::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_normalizer::{
    clean_text, parse_amount_checked, parse_date_checked, today, DEFAULT_DATE_PATTERN,
};
use crate::importer::location_splitter::LocationSplitter;

pub struct RowAssembler {
    date_pattern: String,
    splitter: LocationSplitter,
}

impl Default for RowAssembler {
    fn default() -> Self {
        Self {
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            splitter: LocationSplitter::default(),
        }
    }
}

impl RowAssembler {
    pub fn from_settings(settings: &ImportSettings) -> Self {
        Self {
            date_pattern: settings.date_pattern.clone(),
            splitter: LocationSplitter::new(settings.city_max_len, settings.region_len),
        }
    }

    /// Normalize every field; never fails
    pub fn prepare(&self, raw: &RawTripRecord) -> Trip {
        let mut quality = DataQualityFlags::default();

        let start_date = match parse_date_checked(&raw.start_date, &self.date_pattern) {
            Some(date) => date,
            None => {
                let fallback = today();
                tracing::warn!(
                    row = raw.row_number,
                    raw = %raw.start_date,
                    fallback = %fallback,
                    "unparseable start date, using import date"
                );
                quality.date_defaulted = true;
                fallback
            }
        };

        let mut amount = |field: &str, text: &str| -> f64 {
            match parse_amount_checked(text) {
                Some(value) => value,
                None => {
                    tracing::warn!(row = raw.row_number, field, raw = %text, "unparseable amount, using 0.0");
                    quality.amount_defaulted = true;
                    0.0
                }
            }
        };

        let per_diem = amount("per_diem", &raw.per_diem);
        let fare = amount("fare", &raw.fare);
        let refund = amount("refund", &raw.refund);
        let other = amount("other_expenses", &raw.other_expenses);
        let total_value = per_diem + fare + other - refund;

        let (city, region) = self.splitter.split(&raw.destination);

        Trip {
            process_id: clean_text(&raw.process_id),
            start_date,
            total_value,
            agency: Agency::new(clean_text(&raw.agency_name)),
            destination: City::new(city, region),
            quality,
            row_number: raw.row_number,
        }
    }

    /// Fill the store ids of both references.
    ///
    /// # Errors
    /// - EntityResolutionError: the store failed; the run must abort
    pub fn resolve(&self, mut trip: Trip, resolver: &mut EntityResolver) -> ImportResult<Trip> {
        let row = trip.row_number;

        let agency_id = resolver
            .resolve_agency(&trip.agency)
            .map_err(|e| ImportError::EntityResolutionError {
                kind: EntityKind::Agency,
                row,
                message: e.to_string(),
            })?;
        trip.agency.id = Some(agency_id);

        let city_id = resolver
            .resolve_city(&trip.destination)
            .map_err(|e| ImportError::EntityResolutionError {
                kind: EntityKind::City,
                row,
                message: e.to_string(),
            })?;
        trip.destination.id = Some(city_id);

        Ok(trip)
    }
}
