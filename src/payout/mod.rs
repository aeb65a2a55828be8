//! Payout Batch Processor
//!
//! Periodically folds eligible, unpaid earnings entries into a payout batch
//! and produces a signed (SHA-256) CSV export for the external sink. Batch
//! creation is idempotent on the period key; entry assignment is conditional
//! on the entry being unassigned, so racing runs fail loudly instead of
//! double-paying.

pub mod batch;
pub mod export;
pub mod processor;

pub use batch::{BatchStatus, PayoutBatch};
pub use export::{build_csv, csv_sha256, ExportSink, NullExportSink, RecordingExportSink};
pub use processor::PayoutProcessor;
