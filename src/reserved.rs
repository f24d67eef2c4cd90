//! Platform-owned reserved fields
//!
//! Every user table carries three platform-managed columns: a UUID primary
//! key and the two audit timestamps. They are appended automatically on
//! create and cannot be redeclared with a different type.

use crate::error::{Result, SchemaError};
use crate::types::{ColumnDescriptor, ColumnType};

/// A platform-owned column with its fixed required type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedField {
    pub name: &'static str,
    pub column_type: ColumnType,
}

/// The fixed reserved triple, in table-definition order
pub static RESERVED_FIELDS: [ReservedField; 3] = [
    ReservedField {
        name: "id",
        column_type: ColumnType::Uuid,
    },
    ReservedField {
        name: "created_at",
        column_type: ColumnType::DateTime,
    },
    ReservedField {
        name: "updated_at",
        column_type: ColumnType::DateTime,
    },
];

impl ReservedField {
    /// Column clause used in CREATE TABLE
    pub fn sql_definition(&self) -> String {
        match self.name {
            "id" => "id UUID PRIMARY KEY DEFAULT gen_random_uuid()".to_string(),
            _ => format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", self.name),
        }
    }
}

/// Look up a reserved field by name
pub fn reserved_field(name: &str) -> Option<&'static ReservedField> {
    RESERVED_FIELDS.iter().find(|f| f.name == name)
}

/// Whether a column name belongs to the reserved set
pub fn is_reserved_field(name: &str) -> bool {
    reserved_field(name).is_some()
}

/// Filter redeclarations of reserved fields out of a column list
///
/// A redeclaration with the matching type is dropped silently (the platform
/// adds the column itself). A redeclaration with a different type fails with
/// `ReservedFieldConflict` naming the required type.
pub fn filter_reserved(columns: Vec<ColumnDescriptor>) -> Result<Vec<ColumnDescriptor>> {
    let mut surviving = Vec::with_capacity(columns.len());

    for col in columns {
        match reserved_field(&col.name) {
            Some(reserved) if reserved.column_type == col.column_type => {
                // Idempotent no-op, the platform manages this column
                continue;
            }
            Some(reserved) => {
                return Err(SchemaError::reserved_field(
                    col.name,
                    reserved.column_type.type_name(),
                ));
            }
            None => surviving.push(col),
        }
    }

    Ok(surviving)
}
