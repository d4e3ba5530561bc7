//! Centralized error types for Tenki.
//!
//! This module provides a typed error hierarchy that:
//! - Separates storage, configuration and service failures
//! - Provides user-friendly messages suitable for a rendered page
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Anything that aborts a request or startup should be convertible to this type.
/// Use `user_message()` to get a page-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Service-level errors (templates, weather, etc.) mapped from other crates.
    #[error("Service error: {0}")]
    Service(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display on an error page.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Service(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Database/storage errors (SQLite file, schema, blocking tasks).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),

    #[error("Reset failed: {0}")]
    ResetFailed(String),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to open the local database. Check the database path."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Corruption(_) => {
                "Local data may be corrupted. Consider resetting the database."
            }
            DatabaseError::ResetFailed(_) => "The database could not be reset.",
            DatabaseError::TaskFailed(_) => "A data operation was interrupted. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}
