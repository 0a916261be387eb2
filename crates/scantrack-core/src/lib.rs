//! # scantrack-core
//!
//! Core crate for Scantrack. Contains configuration schemas, typed
//! external identifiers, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Scantrack crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
