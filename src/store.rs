//! SchemaStore - Main entry point for dynamic table schema mutation
//!
//! This module provides the `SchemaStore` struct that validates, plans, and
//! executes structural changes against a live PostgreSQL catalog, keeps the
//! persisted metadata snapshot in sync, and emits schema-reload signals.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::broadcast;

use crate::config::StoreConfig;
use crate::error::{Result, SchemaError};
use crate::events::{ChangeKind, SchemaChange, SchemaNotifier};
use crate::metadata::{MetadataSnapshot, MetadataSync, TableMetadata};
use crate::planner::{AlterTableRequest, plan};
use crate::reserved::{RESERVED_FIELDS, filter_reserved};
use crate::sql::ddl::DdlGenerator;
use crate::sql::sanitize::{
    IdentifierKind, check_user_table_name, is_system_table, validate_identifier,
};
use crate::types::ColumnDescriptor;

/// Request to create a new user table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableRequest {
    /// Table name
    #[serde(rename = "tableName")]
    pub table_name: String,

    /// User-defined columns; the platform fields are appended automatically
    pub columns: Vec<ColumnDescriptor>,

    /// Whether to enable row-level security on the new table
    #[serde(default, rename = "enableAccessControl")]
    pub enable_access_control: bool,
}

impl CreateTableRequest {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            enable_access_control: false,
        }
    }

    /// Enable row-level security on the created table
    pub fn with_access_control(mut self) -> Self {
        self.enable_access_control = true;
        self
    }
}

/// Successful table creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableResponse {
    /// Table name
    #[serde(rename = "tableName")]
    pub table_name: String,

    /// The user columns that were created (after reserved-field filtering)
    pub columns: Vec<ColumnDescriptor>,

    /// The platform-owned columns added automatically
    #[serde(rename = "autoFields")]
    pub auto_fields: Vec<String>,
}

/// Successful table alteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlterTableResponse {
    /// Table name
    #[serde(rename = "tableName")]
    pub table_name: String,

    /// Operation labels in the order they were executed
    #[serde(rename = "operationsApplied")]
    pub operations_applied: Vec<String>,
}

/// Dynamic table schema mutation engine
///
/// Owns the catalog connection, the metadata synchronizer, and the schema
/// change notifier. Every mutation is a single synchronous call chain:
/// validate, plan against a working copy, execute, resync, notify.
pub struct SchemaStore {
    /// Database connection pool
    pool: PgPool,
    /// Store configuration
    config: StoreConfig,
    /// Catalog reader and snapshot writer
    sync: MetadataSync,
    /// Schema reload signal for the query layer
    notifier: SchemaNotifier,
}

impl SchemaStore {
    /// Create a new SchemaStore from configuration
    ///
    /// This will:
    /// 1. Connect to the database
    /// 2. Create the metadata table if it doesn't exist
    /// 3. Install the shared updated-at trigger function
    pub async fn new(config: StoreConfig) -> Result<Self> {
        let pool = PgPool::connect(&config.database_url).await?;
        Self::from_pool(pool, config).await
    }

    /// Create a new SchemaStore from an existing pool
    pub async fn from_pool(pool: PgPool, config: StoreConfig) -> Result<Self> {
        let sync = MetadataSync::new(pool.clone(), config.clone());
        let store = Self {
            pool,
            config,
            sync,
            notifier: SchemaNotifier::default(),
        };

        store.sync.ensure_metadata_table().await?;

        if store.config.touch_trigger {
            let ddl = DdlGenerator::new(&store.config);
            sqlx::query(&ddl.generate_touch_function())
                .execute(&store.pool)
                .await?;
        }

        Ok(store)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Subscribe to schema change events
    pub fn subscribe(&self) -> broadcast::Receiver<SchemaChange> {
        self.notifier.subscribe()
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Create a user table
    ///
    /// The platform fields (id, created_at, updated_at) are always appended;
    /// redeclaring one with a matching type is a no-op, with a different
    /// type an error.
    pub async fn create_table(&self, request: CreateTableRequest) -> Result<CreateTableResponse> {
        check_user_table_name(&request.table_name)?;

        for col in &request.columns {
            validate_identifier(&col.name, IdentifierKind::Column)?;
        }

        let columns = filter_reserved(request.columns)?;

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(SchemaError::ColumnAlreadyExists(col.name.clone()));
            }
        }

        if self.sync.table_exists(&request.table_name).await? {
            return Err(SchemaError::table_already_exists(&request.table_name));
        }

        let ddl = DdlGenerator::new(&self.config);

        let create_sql = ddl.generate_create_table(&request.table_name, &columns);
        log::info!("creating table '{}'", request.table_name);
        sqlx::query(&create_sql).execute(&self.pool).await?;

        if request.enable_access_control {
            let rls_sql = ddl.generate_enable_row_security(&request.table_name);
            sqlx::query(&rls_sql).execute(&self.pool).await?;
        }

        if ddl.touch_trigger_enabled() {
            let trigger_sql = ddl.generate_touch_trigger(&request.table_name);
            sqlx::query(&trigger_sql).execute(&self.pool).await?;
        }

        self.resync_after_mutation(&request.table_name).await;
        self.notifier.notify(&request.table_name, ChangeKind::Created);

        Ok(CreateTableResponse {
            table_name: request.table_name,
            columns,
            auto_fields: RESERVED_FIELDS.iter().map(|f| f.name.to_string()).collect(),
        })
    }

    /// Apply a batch of structural changes to a table
    ///
    /// The whole batch is validated against a working copy of the current
    /// column set before any statement runs; a single invalid operation
    /// rejects the batch with no DDL issued. Execution itself is one
    /// statement per change and is not wrapped in a transaction, so a
    /// mid-batch failure can leave earlier statements committed; the
    /// error's hint tells callers to re-fetch the schema.
    pub async fn alter_table(&self, request: AlterTableRequest) -> Result<AlterTableResponse> {
        check_user_table_name(&request.table_name)?;

        if request.is_empty() {
            return Err(SchemaError::EmptyBatch);
        }

        if !self.sync.table_exists(&request.table_name).await? {
            return Err(SchemaError::table_not_found(&request.table_name));
        }

        for col in &request.add_columns {
            validate_identifier(&col.name, IdentifierKind::Column)?;
        }
        for new_name in request.rename_columns.values() {
            validate_identifier(new_name, IdentifierKind::Column)?;
        }

        // Reserved redeclarations drop out of the add list before planning
        let mut request = request;
        request.add_columns = filter_reserved(request.add_columns)?;
        if request.is_empty() {
            return Err(SchemaError::EmptyBatch);
        }

        let snapshot = self.sync.read_table_snapshot(&request.table_name).await?;
        let mut mutation = plan(&snapshot, &request)?;

        // The executor re-runs the filter on the add list
        mutation.add_columns = filter_reserved(mutation.add_columns)?;

        let ddl = DdlGenerator::new(&self.config);
        let statements = ddl.generate_alter_statements(&mutation);

        log::info!(
            "altering table '{}' ({} statements)",
            request.table_name,
            statements.len()
        );

        for (index, statement) in statements.iter().enumerate() {
            log::debug!("executing: {}", statement);
            if let Err(err) = sqlx::query(statement).execute(&self.pool).await {
                log::warn!(
                    "alter batch for '{}' failed at statement {} of {}; earlier statements are committed",
                    request.table_name,
                    index + 1,
                    statements.len()
                );
                return Err(err.into());
            }
        }

        self.resync_after_mutation(&request.table_name).await;
        self.notifier.notify(&request.table_name, ChangeKind::Altered);

        Ok(AlterTableResponse {
            table_name: request.table_name,
            operations_applied: mutation.summarize(),
        })
    }

    /// Drop a user table; dependent constraints cascade
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        check_user_table_name(table_name)?;

        if !self.sync.table_exists(table_name).await? {
            return Err(SchemaError::table_not_found(table_name));
        }

        let ddl = DdlGenerator::new(&self.config);
        let drop_sql = ddl.generate_drop_table(table_name);
        log::info!("dropping table '{}'", table_name);
        sqlx::query(&drop_sql).execute(&self.pool).await?;

        self.resync_after_mutation(table_name).await;
        self.notifier.notify(table_name, ChangeKind::Deleted);

        Ok(())
    }

    /// Read the live schema of one table from the catalog
    ///
    /// System tables are invisible through this interface.
    pub async fn get_schema(&self, table_name: &str) -> Result<TableMetadata> {
        if is_system_table(table_name) {
            return Err(SchemaError::table_not_found(table_name));
        }

        if !self.sync.table_exists(table_name).await? {
            return Err(SchemaError::table_not_found(table_name));
        }

        self.sync.read_table_metadata(table_name).await
    }

    /// Names of all non-system base tables
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.sync.list_user_tables().await
    }

    /// Load the persisted metadata snapshot, if one exists
    pub async fn get_snapshot(&self) -> Result<Option<MetadataSnapshot>> {
        self.sync.load_snapshot().await
    }

    /// Rebuild the snapshot after a successful mutation
    ///
    /// A resync failure must not make the schema change itself appear to
    /// have failed; the snapshot stays stale until the next mutation.
    async fn resync_after_mutation(&self, table_name: &str) {
        if let Err(err) = self.sync.resync().await {
            log::warn!(
                "metadata resync after mutating '{}' failed, snapshot is stale: {}",
                table_name,
                err
            );
        }
    }
}
