//! # scantrack-service
//!
//! Business logic service layer for Scantrack. Each service validates its
//! input, delegates persistence to a store trait, and logs what changed.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references, so the same service runs
//! against PostgreSQL or the in-memory store.

pub mod component;
pub mod project;
pub mod scan;

pub use component::ComponentService;
pub use project::ProjectService;
pub use scan::ScanService;
