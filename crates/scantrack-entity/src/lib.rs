//! # scantrack-entity
//!
//! Domain entity models for Scantrack. Row structs derive `sqlx::FromRow`;
//! the numeric primary keys they carry are storage-internal and are never
//! serialized. Everything that leaves the process is addressed by the
//! typed uuids from `scantrack_core::types`.

pub mod component;
pub mod project;
pub mod scan;
pub mod validation;
