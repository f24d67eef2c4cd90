//! Metadata Synchronizer
//!
//! Re-derives the full schema and row-count projection from the live
//! catalog after every successful mutation and persists it as a single
//! versioned snapshot. Read-only consumers (admin UI, documentation
//! generators, the query layer) read this snapshot instead of the catalog.

use sqlx::{PgPool, Row};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::planner::TableSnapshot;
use crate::sql::sanitize::{is_system_table, quote_identifier};
use crate::types::{ForeignKeyDescriptor, ReferentialAction};

/// Snapshot category under which the table projection is stored
pub const TABLES_CATEGORY: &str = "tables";

/// Persisted column projection
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Resolved native SQL type (e.g. "BIGINT", "TIMESTAMPTZ")
    pub sql_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Whether the column is part of the primary key
    pub primary_key: bool,
    /// Whether the column carries a unique constraint
    pub unique: bool,
    /// Default expression, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Foreign key edge, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyDescriptor>,
}

/// Persisted table projection
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    /// Table name
    pub table_name: String,
    /// Columns in catalog ordinal order
    pub columns: Vec<ColumnMetadata>,
    /// Best-effort row count (zero when the table vanished mid-scan)
    pub row_count: i64,
}

/// The full versioned snapshot blob
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSnapshot {
    /// Snapshot version id, fresh per resync
    pub version: String,
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// One entry per non-system table; absent tables have no entry
    pub tables: Vec<TableMetadata>,
}

/// Map a catalog udt name to the registry's native type spelling
fn resolve_native_type(udt_name: &str) -> String {
    match udt_name {
        "text" => "TEXT".to_string(),
        "int8" => "BIGINT".to_string(),
        "float8" => "DOUBLE PRECISION".to_string(),
        "bool" => "BOOLEAN".to_string(),
        "date" => "DATE".to_string(),
        "timestamptz" => "TIMESTAMPTZ".to_string(),
        "uuid" => "UUID".to_string(),
        "jsonb" => "JSONB".to_string(),
        other => other.to_uppercase(),
    }
}

/// Catalog reader and snapshot writer
///
/// All reads go to `information_schema`, never to the planner's transient
/// working set.
pub struct MetadataSync {
    pool: PgPool,
    config: StoreConfig,
}

impl MetadataSync {
    pub fn new(pool: PgPool, config: StoreConfig) -> Self {
        Self { pool, config }
    }

    /// Ensure the snapshot table exists
    pub async fn ensure_metadata_table(&self) -> Result<()> {
        let metadata_table = quote_identifier(&self.config.metadata_table);

        let create_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                category VARCHAR(255) PRIMARY KEY,
                version VARCHAR(255) NOT NULL,
                payload JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            metadata_table
        );

        sqlx::query(&create_sql).execute(&self.pool).await?;

        Ok(())
    }

    // =========================================================================
    // Catalog Reads
    // =========================================================================

    /// Whether a base table with this name exists in the public schema
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public'
                  AND table_type = 'BASE TABLE'
                  AND table_name = $1
            ) AS present
            "#,
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("present")?)
    }

    /// Names of all non-system base tables, sorted
    pub async fn list_user_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT table_name FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut tables = Vec::new();
        for row in rows {
            let name: String = row.try_get("table_name")?;
            if !is_system_table(&name) {
                tables.push(name);
            }
        }

        Ok(tables)
    }

    /// Read the planner's structural snapshot for one table
    pub async fn read_table_snapshot(&self, table_name: &str) -> Result<TableSnapshot> {
        let mut snapshot = TableSnapshot::new(table_name);

        let rows = sqlx::query(
            r#"
            SELECT column_name FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            let name: String = row.try_get("column_name")?;
            snapshot.columns.insert(name);
        }

        for (column, fk) in self.read_foreign_keys(table_name).await? {
            snapshot.foreign_keys.insert(column, fk);
        }

        Ok(snapshot)
    }

    /// Read the full metadata projection for one table
    pub async fn read_table_metadata(&self, table_name: &str) -> Result<TableMetadata> {
        let column_rows = sqlx::query(
            r#"
            SELECT column_name, udt_name, is_nullable, column_default
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await?;

        let key_rows = sqlx::query(
            r#"
            SELECT kcu.column_name, tc.constraint_type
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = 'public' AND tc.table_name = $1
              AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await?;

        let mut primary_keys = Vec::new();
        let mut unique_columns = Vec::new();
        for row in &key_rows {
            let column: String = row.try_get("column_name")?;
            let constraint_type: String = row.try_get("constraint_type")?;
            if constraint_type == "PRIMARY KEY" {
                primary_keys.push(column);
            } else {
                unique_columns.push(column);
            }
        }

        let foreign_keys = self.read_foreign_keys(table_name).await?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let name: String = row.try_get("column_name")?;
            let udt_name: String = row.try_get("udt_name")?;
            let is_nullable: String = row.try_get("is_nullable")?;
            let default_value: Option<String> = row.try_get("column_default")?;

            let foreign_key = foreign_keys
                .iter()
                .find(|(column, _)| column == &name)
                .map(|(_, fk)| fk.clone());

            columns.push(ColumnMetadata {
                sql_type: resolve_native_type(&udt_name),
                nullable: is_nullable == "YES",
                primary_key: primary_keys.contains(&name),
                unique: unique_columns.contains(&name),
                default_value,
                foreign_key,
                name,
            });
        }

        let row_count = self.row_count(table_name).await;

        Ok(TableMetadata {
            table_name: table_name.to_string(),
            columns,
            row_count,
        })
    }

    /// Foreign key edges for a table, as (column, descriptor) pairs
    pub async fn read_foreign_keys(
        &self,
        table_name: &str,
    ) -> Result<Vec<(String, ForeignKeyDescriptor)>> {
        let rows = sqlx::query(
            r#"
            SELECT kcu.column_name,
                   ccu.table_name AS ref_table,
                   ccu.column_name AS ref_column,
                   rc.delete_rule,
                   rc.update_rule
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
              ON tc.constraint_name = ccu.constraint_name
             AND tc.table_schema = ccu.table_schema
            JOIN information_schema.referential_constraints rc
              ON tc.constraint_name = rc.constraint_name
             AND tc.table_schema = rc.constraint_schema
            WHERE tc.table_schema = 'public' AND tc.table_name = $1
              AND tc.constraint_type = 'FOREIGN KEY'
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await?;

        let mut foreign_keys = Vec::with_capacity(rows.len());
        for row in rows {
            let column: String = row.try_get("column_name")?;
            let ref_table: String = row.try_get("ref_table")?;
            let ref_column: String = row.try_get("ref_column")?;
            let delete_rule: String = row.try_get("delete_rule")?;
            let update_rule: String = row.try_get("update_rule")?;

            foreign_keys.push((
                column,
                ForeignKeyDescriptor {
                    ref_table,
                    ref_column,
                    on_delete: ReferentialAction::from_catalog_rule(&delete_rule),
                    on_update: ReferentialAction::from_catalog_rule(&update_rule),
                },
            ));
        }

        Ok(foreign_keys)
    }

    /// Best-effort row count; a table that vanished mid-scan counts as zero
    async fn row_count(&self, table_name: &str) -> i64 {
        let count_sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name));
        match sqlx::query_as::<_, (i64,)>(&count_sql)
            .fetch_one(&self.pool)
            .await
        {
            Ok((count,)) => count,
            Err(err) => {
                log::warn!(
                    "row count for '{}' failed, treating as empty: {}",
                    table_name,
                    err
                );
                0
            }
        }
    }

    // =========================================================================
    // Snapshot Persistence
    // =========================================================================

    /// Rebuild the snapshot from the live catalog and persist it as a
    /// single replace
    pub async fn resync(&self) -> Result<MetadataSnapshot> {
        let tables = self.list_user_tables().await?;

        let mut projections = Vec::with_capacity(tables.len());
        for table in &tables {
            projections.push(self.read_table_metadata(table).await?);
        }

        let snapshot = MetadataSnapshot {
            version: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            tables: projections,
        };

        let payload = serde_json::to_value(&snapshot)?;
        let metadata_table = quote_identifier(&self.config.metadata_table);

        let upsert_sql = format!(
            r#"
            INSERT INTO {} (category, version, payload, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (category)
            DO UPDATE SET version = EXCLUDED.version,
                          payload = EXCLUDED.payload,
                          updated_at = NOW()
            "#,
            metadata_table
        );

        sqlx::query(&upsert_sql)
            .bind(TABLES_CATEGORY)
            .bind(&snapshot.version)
            .bind(&payload)
            .execute(&self.pool)
            .await?;

        log::debug!(
            "metadata snapshot {} persisted ({} tables)",
            snapshot.version,
            snapshot.tables.len()
        );

        Ok(snapshot)
    }

    /// Load the persisted snapshot, if one has been written
    pub async fn load_snapshot(&self) -> Result<Option<MetadataSnapshot>> {
        let metadata_table = quote_identifier(&self.config.metadata_table);

        let select_sql = format!(
            "SELECT payload FROM {} WHERE category = $1",
            metadata_table
        );

        let row = sqlx::query(&select_sql)
            .bind(TABLES_CATEGORY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.try_get("payload")?;
                Ok(Some(serde_json::from_value(payload)?))
            }
            None => Ok(None),
        }
    }
}
