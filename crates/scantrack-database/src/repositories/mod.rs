//! PostgreSQL repository implementations of the store traits.

pub mod component;
pub mod project;
pub mod scan;

pub use component::ComponentRepository;
pub use project::ProjectRepository;
pub use scan::ScanRepository;

/// Whether `err` is a violation of the named unique index or constraint.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// Whether `err` is a foreign key violation (SQLSTATE 23503), raised when a
/// referenced row was deleted concurrently.
pub(crate) fn violates_foreign_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}
