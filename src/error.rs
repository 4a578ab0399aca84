//! Error types for source generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for source generation operations
pub type Result<T> = std::result::Result<T, SourceGenError>;

/// Source generation errors
#[derive(Error, Debug)]
pub enum SourceGenError {
    #[error("Circular dependency detected at {schema}: {}", .cycle.join(" -> "))]
    CircularDependency { schema: String, cycle: Vec<String> },

    #[error("Unsupported field kind {kind} for field {schema}.{field}")]
    UnsupportedFieldKind {
        schema: String,
        field: String,
        kind: String,
    },

    #[error("Schema not found: {name}{}", .referenced_by.as_ref().map(|r| format!(" (referenced by {r})")).unwrap_or_default())]
    UnknownSchema {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("Schema already defined: {0}")]
    DuplicateSchema(String),

    #[error("Invalid namespace {namespace:?} on schema {schema}")]
    InvalidNamespace { schema: String, namespace: String },

    #[error("Invalid name {name:?} in schema {schema}: {reason}")]
    InvalidName {
        schema: String,
        name: String,
        reason: String,
    },

    #[error("Namespace {namespace} maps to {}, which another unit already occupies", .path.display())]
    UnitConflict { namespace: String, path: PathBuf },

    #[error("Invalid schema definition in {}: {reason}", .path.display())]
    InvalidDefinition { path: PathBuf, reason: String },

    #[error("Failed to write unit {}: {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SourceGenError {
    /// True for errors caused by the shape of the schema graph itself
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CircularDependency { .. } | Self::UnknownSchema { .. } | Self::DuplicateSchema(_)
        )
    }
}
