//! Schema Mutation Planner
//!
//! Simulates a batch of structural operations against a copy of the table's
//! current column set before any DDL executes. The real catalog state is
//! never touched during planning, so a validation failure leaves no partial
//! state and the whole batch is rejected as a unit.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::types::{ColumnDescriptor, ForeignKeyDescriptor};

/// Current structural state of a table, captured once at plan time
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    /// Table name
    pub table_name: String,
    /// Names of the columns currently in the catalog
    pub columns: BTreeSet<String>,
    /// Foreign keys currently attached, keyed by column name
    pub foreign_keys: BTreeMap<String, ForeignKeyDescriptor>,
}

impl TableSnapshot {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: BTreeSet::new(),
            foreign_keys: BTreeMap::new(),
        }
    }

    /// Add a column name to the snapshot (builder, used in tests and by the
    /// catalog reader)
    pub fn with_column(mut self, name: impl Into<String>) -> Self {
        self.columns.insert(name.into());
        self
    }

    /// Attach a foreign key to a column in the snapshot
    pub fn with_foreign_key(mut self, column: impl Into<String>, fk: ForeignKeyDescriptor) -> Self {
        self.foreign_keys.insert(column.into(), fk);
        self
    }
}

/// A foreign key addition targeting one column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddForeignKey {
    /// Column the constraint attaches to
    pub column: String,
    /// The reference itself
    #[serde(flatten)]
    pub foreign_key: ForeignKeyDescriptor,
}

/// Batch of structural operations against one table
///
/// At least one operation group must be non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlterTableRequest {
    /// Table to alter
    #[serde(rename = "tableName")]
    pub table_name: String,

    /// Columns to drop
    #[serde(default, rename = "dropColumns")]
    pub drop_columns: Vec<String>,

    /// Columns to add
    #[serde(default, rename = "addColumns")]
    pub add_columns: Vec<ColumnDescriptor>,

    /// Columns to rename, old name → new name
    #[serde(default, rename = "renameColumns")]
    pub rename_columns: BTreeMap<String, String>,

    /// Foreign keys to add
    #[serde(default, rename = "addForeignKeys")]
    pub add_foreign_keys: Vec<AddForeignKey>,

    /// Columns whose foreign key should be dropped
    #[serde(default, rename = "dropForeignKeys")]
    pub drop_foreign_keys: Vec<String>,
}

impl AlterTableRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Whether the request carries no operations at all
    pub fn is_empty(&self) -> bool {
        self.drop_columns.is_empty()
            && self.add_columns.is_empty()
            && self.rename_columns.is_empty()
            && self.add_foreign_keys.is_empty()
            && self.drop_foreign_keys.is_empty()
    }
}

/// A validated batch, ready for the DDL executor
///
/// Dropped foreign keys carry the descriptor found in the catalog so the
/// executor can derive the constraint name to drop.
#[derive(Debug, Clone)]
pub struct MutationPlan {
    pub table_name: String,
    pub drop_columns: Vec<String>,
    pub add_columns: Vec<ColumnDescriptor>,
    pub rename_columns: Vec<(String, String)>,
    pub add_foreign_keys: Vec<(String, ForeignKeyDescriptor)>,
    pub drop_foreign_keys: Vec<(String, ForeignKeyDescriptor)>,
    /// The working set after all simulated operations
    pub final_columns: BTreeSet<String>,
}

impl MutationPlan {
    /// Human-readable operation labels, in execution order
    pub fn summarize(&self) -> Vec<String> {
        let mut ops = Vec::new();
        for name in &self.drop_columns {
            ops.push(format!("drop_column:{}", name));
        }
        for col in &self.add_columns {
            ops.push(format!("add_column:{}", col.name));
        }
        for (old, new) in &self.rename_columns {
            ops.push(format!("rename_column:{}->{}", old, new));
        }
        for (column, _) in &self.add_foreign_keys {
            ops.push(format!("add_foreign_key:{}", column));
        }
        for (column, _) in &self.drop_foreign_keys {
            ops.push(format!("drop_foreign_key:{}", column));
        }
        ops
    }
}

/// Validate a batch against a snapshot and produce an executable plan
///
/// Single pass, fixed order, on a copy of the column set (the working set):
///
/// 1. Foreign-key additions are checked against the snapshot's foreign-key
///    map: a column that already carries a constraint is a conflict,
///    independent of the drops/adds below.
/// 2. Foreign-key drops require the column to exist and carry a constraint.
/// 3. Drops are simulated first, so a later add may reuse a name freed in
///    the same batch.
/// 4. Adds fail on any name still present in the working set, including
///    names added earlier in the same batch.
/// 5. Renames fail when the old name is absent or the new name occupied.
///
/// The first failure aborts the whole batch; no DDL is issued for a batch
/// that does not validate end to end.
pub fn plan(snapshot: &TableSnapshot, request: &AlterTableRequest) -> Result<MutationPlan> {
    if request.is_empty() {
        return Err(SchemaError::EmptyBatch);
    }

    // Working copy; the snapshot itself stays untouched.
    let mut working_set = snapshot.columns.clone();

    // Step 1: foreign-key additions vs the current constraint map
    for add_fk in &request.add_foreign_keys {
        if snapshot.foreign_keys.contains_key(&add_fk.column) {
            return Err(SchemaError::ForeignKeyAlreadyExists(add_fk.column.clone()));
        }
    }

    // Step 2: foreign-key drops
    let mut drop_foreign_keys = Vec::with_capacity(request.drop_foreign_keys.len());
    for column in &request.drop_foreign_keys {
        if !snapshot.columns.contains(column) {
            return Err(SchemaError::ColumnNotFound(column.clone()));
        }
        match snapshot.foreign_keys.get(column) {
            Some(fk) => drop_foreign_keys.push((column.clone(), fk.clone())),
            None => return Err(SchemaError::ForeignKeyNotFound(column.clone())),
        }
    }

    // Step 3: simulate drops
    for column in &request.drop_columns {
        if !working_set.remove(column) {
            return Err(SchemaError::ColumnNotFound(column.clone()));
        }
    }

    // Step 4: simulate adds
    for col in &request.add_columns {
        if !working_set.insert(col.name.clone()) {
            return Err(SchemaError::ColumnAlreadyExists(col.name.clone()));
        }
    }

    // Step 5: simulate renames
    let mut rename_columns = Vec::with_capacity(request.rename_columns.len());
    for (old, new) in &request.rename_columns {
        if !working_set.contains(old) {
            return Err(SchemaError::ColumnNotFound(old.clone()));
        }
        if working_set.contains(new) {
            return Err(SchemaError::ColumnAlreadyExists(new.clone()));
        }
        working_set.remove(old);
        working_set.insert(new.clone());
        rename_columns.push((old.clone(), new.clone()));
    }

    Ok(MutationPlan {
        table_name: snapshot.table_name.clone(),
        drop_columns: request.drop_columns.clone(),
        add_columns: request.add_columns.clone(),
        rename_columns,
        add_foreign_keys: request
            .add_foreign_keys
            .iter()
            .map(|a| (a.column.clone(), a.foreign_key.clone()))
            .collect(),
        drop_foreign_keys,
        final_columns: working_set,
    })
}
