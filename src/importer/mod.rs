// ==========================================
// AuditGov - Import layer
// ==========================================
// Duty: delimited disclosure export -> agencies, cities, trips
// Flow: parse -> map -> normalize/split -> resolve -> persist, one transaction
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod field_normalizer;
pub mod file_parser;
pub mod location_splitter;
pub mod row_assembler;
pub mod row_outcome;
pub mod run_control;
pub mod trip_importer_impl;
pub mod trip_importer_trait;

pub use error::{ImportError, ImportResult};
pub use field_mapper::TrailingFieldMapper;
pub use field_normalizer::{clean_text, parse_amount, parse_date, truncate};
pub use file_parser::{DelimitedFileParser, RowStream, SourceRow};
pub use location_splitter::{split_location, LocationSplitter, UNDEFINED_CITY, UNDEFINED_REGION};
pub use row_assembler::RowAssembler;
pub use row_outcome::RowOutcome;
pub use run_control::{
    CancellationToken, CounterProgressSink, FanOutProgressSink, ProgressSink, TracingProgressSink,
};
pub use trip_importer_impl::TripImporterImpl;
pub use trip_importer_trait::{FieldMapper, FileParser, TripImporter};
