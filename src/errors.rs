//! Unified error types and result handling.
//!
//! Every fallible path in the crate funnels into [`Error`]. The accounting
//! engine raises the domain-specific variants; the API layer maps each kind
//! to an HTTP status and the uniform response envelope.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Student (ID: {id}) does not exist")]
    StudentNotFound { id: i64 },

    #[error("Course package (ID: {id}) does not exist")]
    PackageNotFound { id: i64 },

    #[error("Catalog package (ID: {id}) does not exist")]
    CatalogPackageNotFound { id: i64 },

    #[error("User (ID: {id}) does not exist")]
    UserNotFound { id: i64 },

    #[error("Invalid hour value: {hours}")]
    InvalidHours { hours: f64 },

    #[error("Invalid date: {value} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("Class record content cannot be empty")]
    EmptyContent,

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Insufficient remaining hours: {remaining} available, {requested} requested")]
    InsufficientHours { remaining: f64, requested: f64 },

    #[error("Student (ID: {student_id}) has no active course package")]
    NoActivePackage { student_id: i64 },

    #[error("Package (ID: {package_id}) does not belong to student (ID: {student_id})")]
    PackageOwnershipMismatch { package_id: i64, student_id: i64 },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username '{username}' is already taken")]
    UsernameTaken { username: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("WeChat API error: {message}")]
    Wechat { message: String },
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
