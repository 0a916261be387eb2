//! Scan import, lookup, and component membership services.

pub mod service;

pub use service::ScanService;
