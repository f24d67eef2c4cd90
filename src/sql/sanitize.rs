//! SQL Identifier Sanitization Utilities
//!
//! Provides functions to safely validate and quote SQL identifiers, and to
//! enforce the reserved system-table namespace.

use regex::Regex;

use crate::error::{Result, SchemaError};

/// Prefix marking platform-internal tables, invisible to the mutation API
pub const SYSTEM_TABLE_PREFIX: char = '_';

/// Maximum identifier length accepted (PostgreSQL truncates at 63 bytes)
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// What an identifier names, for error messages and per-kind rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Table,
    Column,
}

impl IdentifierKind {
    fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Table => "table",
            IdentifierKind::Column => "column",
        }
    }
}

/// PostgreSQL reserved keywords that cannot be used as identifiers
pub const POSTGRES_RESERVED_WORDS: &[&str] = &[
    "ALL",
    "ANALYSE",
    "ANALYZE",
    "AND",
    "ANY",
    "ARRAY",
    "AS",
    "ASC",
    "ASYMMETRIC",
    "BOTH",
    "CASE",
    "CAST",
    "CHECK",
    "COLLATE",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CURRENT_CATALOG",
    "CURRENT_DATE",
    "CURRENT_ROLE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "DEFAULT",
    "DEFERRABLE",
    "DESC",
    "DISTINCT",
    "DO",
    "ELSE",
    "END",
    "EXCEPT",
    "FALSE",
    "FETCH",
    "FOR",
    "FOREIGN",
    "FROM",
    "GRANT",
    "GROUP",
    "HAVING",
    "IN",
    "INITIALLY",
    "INTERSECT",
    "INTO",
    "LATERAL",
    "LEADING",
    "LIMIT",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "ONLY",
    "OR",
    "ORDER",
    "PLACING",
    "PRIMARY",
    "REFERENCES",
    "RETURNING",
    "SELECT",
    "SESSION_USER",
    "SOME",
    "SYMMETRIC",
    "TABLE",
    "THEN",
    "TO",
    "TRAILING",
    "TRUE",
    "UNION",
    "UNIQUE",
    "USER",
    "USING",
    "VARIADIC",
    "WHEN",
    "WHERE",
    "WINDOW",
    "WITH",
];

/// Quote a SQL identifier to make it safe for use in queries
///
/// # Example
/// ```
/// use dynschema::sql::quote_identifier;
///
/// let quoted = quote_identifier("my_table");
/// assert_eq!(quoted, "\"my_table\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    // Escape any double quotes in the identifier by doubling them
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Validate a table or column name
///
/// Rules:
/// - Must not be empty
/// - Must start with a lowercase letter or underscore
/// - Can only contain lowercase letters, digits, and underscores
/// - Must not exceed the PostgreSQL identifier length limit
/// - Cannot be a PostgreSQL reserved word
pub fn validate_identifier(name: &str, kind: IdentifierKind) -> Result<()> {
    if name.is_empty() {
        return Err(SchemaError::invalid_identifier(format!(
            "{} name cannot be empty",
            kind.as_str()
        )));
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(SchemaError::invalid_identifier(format!(
            "{} name '{}' exceeds {} characters",
            kind.as_str(),
            name,
            MAX_IDENTIFIER_LEN
        )));
    }

    let re = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();
    if !re.is_match(name) {
        return Err(SchemaError::invalid_identifier(format!(
            "{} name '{}' is invalid; names must start with a lowercase letter and contain only lowercase letters, digits, and underscores",
            kind.as_str(),
            name
        )));
    }

    if POSTGRES_RESERVED_WORDS.contains(&name.to_uppercase().as_str()) {
        return Err(SchemaError::invalid_identifier(format!(
            "{} name '{}' is a PostgreSQL reserved keyword",
            kind.as_str(),
            name
        )));
    }

    Ok(())
}

/// Validate a table name arriving through a user-facing create/alter/delete
/// path
///
/// The `_` namespace belongs to platform-internal tables and is rejected with
/// `SystemTableForbidden` regardless of caller privilege.
pub fn check_user_table_name(name: &str) -> Result<()> {
    if name.starts_with(SYSTEM_TABLE_PREFIX) {
        return Err(SchemaError::SystemTableForbidden(name.to_string()));
    }
    validate_identifier(name, IdentifierKind::Table)
}

/// Whether a catalog table name belongs to the platform-internal namespace
pub fn is_system_table(name: &str) -> bool {
    name.starts_with(SYSTEM_TABLE_PREFIX)
}
