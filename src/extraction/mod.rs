//! Structured extraction of production metrics from SCADA report text.
//!
//! Submodules:
//! - `models`: `ProductionMetrics` and its equipment/reading/alarm entities
//! - `rules`: ordered per-field pattern tables
//! - `extractor`: the `StructuredExtractor` itself
//! - `format`: operator-facing rendering of results and failures
//! - `errors`: fatal (`ExtractionError`) and dropped (`EntityError`) failures

pub mod errors;
pub mod extractor;
pub mod format;
pub mod models;
pub mod rules;

pub use errors::{EntityError, ExtractionError, FieldViolation, RequiredField};
pub use extractor::{extract, StructuredExtractor, SubEntityScope};
pub use format::{format_extraction_error, format_production_metrics};
pub use models::{
    AlarmInfo, AlarmSeverity, EquipmentState, EquipmentStatus, ProductionMetrics, SensorReading,
};
