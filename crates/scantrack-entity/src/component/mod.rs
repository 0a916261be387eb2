//! Component domain entities.

pub mod model;

pub use model::{Component, CreateComponent};
