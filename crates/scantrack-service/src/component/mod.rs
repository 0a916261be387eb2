//! Component services.

pub mod service;

pub use service::ComponentService;
