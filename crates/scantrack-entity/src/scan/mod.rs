//! Scan domain entities.

pub mod document;
pub mod import;
pub mod model;
pub mod record;

pub use document::ScanDocument;
pub use import::ImportScan;
pub use model::{CreateScan, Scan};
pub use record::ScanRecord;
