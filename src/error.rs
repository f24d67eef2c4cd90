//! Error types for schema mutation operations

use thiserror::Error;

/// Errors that can occur while planning or executing schema mutations
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Reserved field conflict: column '{column}' is platform-managed and must be of type '{expected}'")]
    ReservedFieldConflict { column: String, expected: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column already exists: {0}")]
    ColumnAlreadyExists(String),

    #[error("Foreign key already exists on column: {0}")]
    ForeignKeyAlreadyExists(String),

    #[error("No foreign key on column: {0}")]
    ForeignKeyNotFound(String),

    #[error("Table '{0}' is a system table and cannot be modified")]
    SystemTableForbidden(String),

    #[error("Alter request contains no operations")]
    EmptyBatch,

    #[error("Catalog error: {0}")]
    Catalog(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    pub fn reserved_field(column: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ReservedFieldConflict {
            column: column.into(),
            expected: expected.into(),
        }
    }

    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound(name.into())
    }

    pub fn table_already_exists(name: impl Into<String>) -> Self {
        Self::TableAlreadyExists(name.into())
    }

    /// Machine-readable error kind token
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::ReservedFieldConflict { .. } => "reserved_field_conflict",
            Self::TableNotFound(_) => "table_not_found",
            Self::TableAlreadyExists(_) => "table_already_exists",
            Self::ColumnNotFound(_) => "column_not_found",
            Self::ColumnAlreadyExists(_) => "column_already_exists",
            Self::ForeignKeyAlreadyExists(_) => "foreign_key_already_exists",
            Self::ForeignKeyNotFound(_) => "foreign_key_not_found",
            Self::SystemTableForbidden(_) => "system_table_forbidden",
            Self::EmptyBatch => "empty_batch",
            Self::Catalog(_) => "catalog_error",
            Self::Json(_) => "serialization_error",
        }
    }

    /// Suggested next action for the caller, where one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TableNotFound(_) | Self::ColumnNotFound(_) | Self::ForeignKeyNotFound(_) => {
                Some("inspect the current schema via get_schema before retrying")
            }
            Self::ColumnAlreadyExists(_) | Self::ForeignKeyAlreadyExists(_) => {
                Some("drop the existing column or constraint first, or pick another name")
            }
            Self::Catalog(_) => Some(
                "the batch may be partially applied; re-fetch the schema via get_schema to see true state before retrying",
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
