//! Core type definitions for the schema mutation engine
//!
//! Includes the column type registry, column descriptors, and foreign key
//! descriptors.

use serde::{Deserialize, Serialize};

// ============================================================================
// Column Type Registry
// ============================================================================

/// Abstract column type with its native SQL mapping
///
/// The set is closed: every variant must resolve to a native type and a
/// generator default, and adding a variant is a compile error until every
/// match arm below handles it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Text field (unlimited length, maps to TEXT)
    Text,

    /// Integer field (maps to BIGINT for 64-bit range)
    Integer,

    /// Floating-point field (maps to DOUBLE PRECISION)
    Float,

    /// Boolean field (maps to BOOLEAN)
    Boolean,

    /// Calendar date without time of day (maps to DATE)
    Date,

    /// Timestamp, always stored in UTC (maps to TIMESTAMPTZ)
    DateTime,

    /// UUID identifier (maps to UUID)
    Uuid,

    /// JSON document, stored as binary JSON (maps to JSONB)
    Json,
}

impl ColumnType {
    /// Native PostgreSQL type for this column kind
    pub fn native_sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "TIMESTAMPTZ",
            ColumnType::Uuid => "UUID",
            ColumnType::Json => "JSONB",
        }
    }

    /// Default-value expression used when a non-nullable column is added
    /// without an explicit default
    pub fn generator_default(&self) -> &'static str {
        match self {
            ColumnType::Text => "''",
            ColumnType::Integer => "0",
            ColumnType::Float => "0",
            ColumnType::Boolean => "FALSE",
            ColumnType::Date => "NOW()",
            ColumnType::DateTime => "NOW()",
            ColumnType::Uuid => "gen_random_uuid()",
            ColumnType::Json => "'{}'::jsonb",
        }
    }

    /// The lowercase wire tag, as used in requests and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Uuid => "uuid",
            ColumnType::Json => "json",
        }
    }
}

// ============================================================================
// Foreign Keys
// ============================================================================

/// Referential action for ON DELETE / ON UPDATE clauses
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferentialAction {
    #[default]
    Restrict,
    Cascade,
    #[serde(rename = "set-null")]
    SetNull,
    #[serde(rename = "set-default")]
    SetDefault,
    #[serde(rename = "no-action")]
    NoAction,
}

impl ReferentialAction {
    /// SQL clause fragment for this action
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }

    /// Parse a catalog rule string (e.g. `information_schema` delete_rule)
    pub fn from_catalog_rule(rule: &str) -> Self {
        match rule.to_uppercase().as_str() {
            "CASCADE" => ReferentialAction::Cascade,
            "SET NULL" => ReferentialAction::SetNull,
            "SET DEFAULT" => ReferentialAction::SetDefault,
            "NO ACTION" => ReferentialAction::NoAction,
            _ => ReferentialAction::Restrict,
        }
    }
}

/// Foreign key reference attached to a column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKeyDescriptor {
    /// Referenced table name
    #[serde(rename = "refTable")]
    pub ref_table: String,

    /// Referenced column name
    #[serde(rename = "refColumn")]
    pub ref_column: String,

    /// Action on delete of the referenced row (default: restrict)
    #[serde(default, rename = "onDelete")]
    pub on_delete: ReferentialAction,

    /// Action on update of the referenced key (default: restrict)
    #[serde(default, rename = "onUpdate")]
    pub on_update: ReferentialAction,
}

impl ForeignKeyDescriptor {
    /// Create a foreign key reference with default actions
    pub fn new(ref_table: impl Into<String>, ref_column: impl Into<String>) -> Self {
        Self {
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
        }
    }

    /// Set the on-delete action
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the on-update action
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    /// Deterministic constraint name for this reference on `column`
    pub fn constraint_name(&self, column: &str) -> String {
        format!("fk_{}_{}_{}", column, self.ref_table, self.ref_column)
    }
}

// ============================================================================
// Column Descriptors
// ============================================================================

fn default_nullable() -> bool {
    true
}

/// Column definition as submitted by callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name (must be a valid PostgreSQL identifier)
    pub name: String,

    /// Abstract column type
    #[serde(flatten)]
    pub column_type: ColumnType,

    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Whether the column has a UNIQUE constraint (default: false)
    #[serde(default)]
    pub unique: bool,

    /// Default value (SQL expression, e.g., "0", "NOW()", "'active'")
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "default")]
    pub default_value: Option<String>,

    /// Optional foreign key reference
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "foreignKey")]
    pub foreign_key: Option<ForeignKeyDescriptor>,
}

impl ColumnDescriptor {
    /// Create a new column descriptor with a name and type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            unique: false,
            default_value: None,
            foreign_key: None,
        }
    }

    /// Set the column as non-nullable
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the column as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a default value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Attach a foreign key reference
    pub fn references(mut self, foreign_key: ForeignKeyDescriptor) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // ColumnType Registry Tests
    // =========================================================================

    #[test]
    fn test_native_sql_type_mapping() {
        assert_eq!(ColumnType::Text.native_sql_type(), "TEXT");
        assert_eq!(ColumnType::Integer.native_sql_type(), "BIGINT");
        assert_eq!(ColumnType::Float.native_sql_type(), "DOUBLE PRECISION");
        assert_eq!(ColumnType::Boolean.native_sql_type(), "BOOLEAN");
        assert_eq!(ColumnType::Date.native_sql_type(), "DATE");
        assert_eq!(ColumnType::DateTime.native_sql_type(), "TIMESTAMPTZ");
        assert_eq!(ColumnType::Uuid.native_sql_type(), "UUID");
        assert_eq!(ColumnType::Json.native_sql_type(), "JSONB");
    }

    #[test]
    fn test_generator_defaults() {
        assert_eq!(ColumnType::Text.generator_default(), "''");
        assert_eq!(ColumnType::Integer.generator_default(), "0");
        assert_eq!(ColumnType::Boolean.generator_default(), "FALSE");
        assert_eq!(ColumnType::Uuid.generator_default(), "gen_random_uuid()");
        assert_eq!(ColumnType::Json.generator_default(), "'{}'::jsonb");
    }

    #[test]
    fn test_type_names_match_wire_tags() {
        assert_eq!(ColumnType::DateTime.type_name(), "datetime");
        assert_eq!(ColumnType::Float.type_name(), "float");
        let json = serde_json::to_string(&ColumnType::DateTime).unwrap();
        assert_eq!(json, r#"{"type":"datetime"}"#);
    }

    #[test]
    fn test_column_type_deserialization() {
        let col: ColumnType = serde_json::from_str(r#"{"type":"uuid"}"#).unwrap();
        assert_eq!(col, ColumnType::Uuid);
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let result = serde_json::from_str::<ColumnType>(r#"{"type":"decimal"}"#);
        assert!(result.is_err());
    }

    // =========================================================================
    // ReferentialAction Tests
    // =========================================================================

    #[test]
    fn test_referential_action_default_is_restrict() {
        assert_eq!(ReferentialAction::default(), ReferentialAction::Restrict);
    }

    #[test]
    fn test_referential_action_sql() {
        assert_eq!(ReferentialAction::Cascade.as_sql(), "CASCADE");
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::SetDefault.as_sql(), "SET DEFAULT");
        assert_eq!(ReferentialAction::NoAction.as_sql(), "NO ACTION");
        assert_eq!(ReferentialAction::Restrict.as_sql(), "RESTRICT");
    }

    #[test]
    fn test_referential_action_from_catalog_rule() {
        assert_eq!(
            ReferentialAction::from_catalog_rule("CASCADE"),
            ReferentialAction::Cascade
        );
        assert_eq!(
            ReferentialAction::from_catalog_rule("SET NULL"),
            ReferentialAction::SetNull
        );
        // Unknown rules fall back to restrict
        assert_eq!(
            ReferentialAction::from_catalog_rule("SOMETHING"),
            ReferentialAction::Restrict
        );
    }

    #[test]
    fn test_referential_action_wire_names() {
        let json = serde_json::to_string(&ReferentialAction::SetNull).unwrap();
        assert_eq!(json, r#""set-null""#);
        let parsed: ReferentialAction = serde_json::from_str(r#""no-action""#).unwrap();
        assert_eq!(parsed, ReferentialAction::NoAction);
    }

    // =========================================================================
    // ForeignKeyDescriptor Tests
    // =========================================================================

    #[test]
    fn test_foreign_key_builder() {
        let fk = ForeignKeyDescriptor::new("users", "id")
            .on_delete(ReferentialAction::Cascade)
            .on_update(ReferentialAction::NoAction);

        assert_eq!(fk.ref_table, "users");
        assert_eq!(fk.ref_column, "id");
        assert_eq!(fk.on_delete, ReferentialAction::Cascade);
        assert_eq!(fk.on_update, ReferentialAction::NoAction);
    }

    #[test]
    fn test_foreign_key_defaults_to_restrict() {
        let fk = ForeignKeyDescriptor::new("users", "id");
        assert_eq!(fk.on_delete, ReferentialAction::Restrict);
        assert_eq!(fk.on_update, ReferentialAction::Restrict);
    }

    #[test]
    fn test_constraint_name_is_deterministic() {
        let fk = ForeignKeyDescriptor::new("users", "id");
        assert_eq!(fk.constraint_name("owner_id"), "fk_owner_id_users_id");
        // Same inputs, same name
        assert_eq!(
            fk.constraint_name("owner_id"),
            ForeignKeyDescriptor::new("users", "id").constraint_name("owner_id")
        );
    }

    #[test]
    fn test_foreign_key_deserialization_defaults() {
        let json = r#"{"refTable":"users","refColumn":"id"}"#;
        let fk: ForeignKeyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(fk.on_delete, ReferentialAction::Restrict);
        assert_eq!(fk.on_update, ReferentialAction::Restrict);
    }

    // =========================================================================
    // ColumnDescriptor Tests
    // =========================================================================

    #[test]
    fn test_column_descriptor_new() {
        let col = ColumnDescriptor::new("title", ColumnType::Text);
        assert_eq!(col.name, "title");
        assert_eq!(col.column_type, ColumnType::Text);
        assert!(col.nullable); // default
        assert!(!col.unique); // default
        assert!(col.default_value.is_none());
        assert!(col.foreign_key.is_none());
    }

    #[test]
    fn test_column_descriptor_chained_builders() {
        let col = ColumnDescriptor::new("owner_id", ColumnType::Uuid)
            .not_null()
            .references(ForeignKeyDescriptor::new("users", "id"));

        assert!(!col.nullable);
        assert!(col.foreign_key.is_some());
    }

    #[test]
    fn test_column_descriptor_serialization() {
        let col = ColumnDescriptor::new("score", ColumnType::Float).not_null();
        let json = serde_json::to_string(&col).unwrap();
        assert!(json.contains("\"name\":\"score\""));
        assert!(json.contains("\"type\":\"float\""));
        assert!(json.contains("\"nullable\":false"));
        assert!(!json.contains("foreignKey"));
    }

    #[test]
    fn test_column_descriptor_deserialization() {
        let json = r#"{"name":"count","type":"integer","nullable":false,"unique":true}"#;
        let col: ColumnDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(col.name, "count");
        assert_eq!(col.column_type, ColumnType::Integer);
        assert!(!col.nullable);
        assert!(col.unique);
    }

    #[test]
    fn test_column_descriptor_with_foreign_key_round_trip() {
        let col = ColumnDescriptor::new("author_id", ColumnType::Uuid).references(
            ForeignKeyDescriptor::new("authors", "id").on_delete(ReferentialAction::SetNull),
        );

        let json = serde_json::to_string(&col).unwrap();
        let back: ColumnDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, col);
    }
}
