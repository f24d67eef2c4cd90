//! DDL Generation for Dynamic Schema Management
//!
//! Generates PostgreSQL DDL statements for table creation, validated
//! mutation batches, and table deletion.

use crate::config::StoreConfig;
use crate::planner::MutationPlan;
use crate::reserved::RESERVED_FIELDS;
use crate::sql::sanitize::quote_identifier;
use crate::types::{ColumnDescriptor, ForeignKeyDescriptor};

/// Name of the shared trigger function that refreshes `updated_at`
pub const TOUCH_FUNCTION: &str = "_touch_updated_at";

/// DDL generator for user tables
pub struct DdlGenerator<'a> {
    config: &'a StoreConfig,
}

impl<'a> DdlGenerator<'a> {
    /// Create a new DDL generator with the given configuration
    pub fn new(config: &'a StoreConfig) -> Self {
        Self { config }
    }

    /// Generate CREATE TABLE with the platform-owned columns
    ///
    /// Column order: the `id` primary key, user-defined columns, then the
    /// two audit timestamps.
    pub fn generate_create_table(&self, table_name: &str, columns: &[ColumnDescriptor]) -> String {
        let quoted_table = quote_identifier(table_name);

        let mut column_defs = vec![RESERVED_FIELDS[0].sql_definition()];

        for col in columns {
            column_defs.push(Self::format_column_definition(col));
        }

        column_defs.push(RESERVED_FIELDS[1].sql_definition());
        column_defs.push(RESERVED_FIELDS[2].sql_definition());

        format!("CREATE TABLE {} ({})", quoted_table, column_defs.join(", "))
    }

    /// Generate the statements for a validated mutation plan, in the fixed
    /// execution order: drop columns, add columns, rename columns, add
    /// foreign keys, drop foreign keys
    pub fn generate_alter_statements(&self, plan: &MutationPlan) -> Vec<String> {
        let quoted_table = quote_identifier(&plan.table_name);
        let mut statements = Vec::new();

        for column in &plan.drop_columns {
            statements.push(format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quoted_table,
                quote_identifier(column)
            ));
        }

        for col in &plan.add_columns {
            statements.push(format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quoted_table,
                Self::format_column_definition(col)
            ));
        }

        for (old, new) in &plan.rename_columns {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                quoted_table,
                quote_identifier(old),
                quote_identifier(new)
            ));
        }

        for (column, fk) in &plan.add_foreign_keys {
            statements.push(Self::format_add_foreign_key(&quoted_table, column, fk));
        }

        for (column, fk) in &plan.drop_foreign_keys {
            statements.push(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                quoted_table,
                quote_identifier(&fk.constraint_name(column))
            ));
        }

        statements
    }

    /// Generate DROP TABLE; CASCADE removes dependent constraints
    pub fn generate_drop_table(&self, table_name: &str) -> String {
        let quoted_table = quote_identifier(table_name);
        format!("DROP TABLE IF EXISTS {} CASCADE", quoted_table)
    }

    /// Generate the row-level security toggle for a table
    pub fn generate_enable_row_security(&self, table_name: &str) -> String {
        format!(
            "ALTER TABLE {} ENABLE ROW LEVEL SECURITY",
            quote_identifier(table_name)
        )
    }

    /// Generate the shared trigger function that stamps `updated_at`
    pub fn generate_touch_function(&self) -> String {
        format!(
            "CREATE OR REPLACE FUNCTION {}() RETURNS trigger AS $$ BEGIN NEW.updated_at = NOW(); RETURN NEW; END; $$ LANGUAGE plpgsql",
            TOUCH_FUNCTION
        )
    }

    /// Generate the per-table BEFORE UPDATE trigger
    pub fn generate_touch_trigger(&self, table_name: &str) -> String {
        let trigger_name = quote_identifier(&format!("trg_{}_touch", table_name));
        format!(
            "CREATE TRIGGER {} BEFORE UPDATE ON {} FOR EACH ROW EXECUTE FUNCTION {}()",
            trigger_name,
            quote_identifier(table_name),
            TOUCH_FUNCTION
        )
    }

    /// Whether the configuration installs the updated-at trigger on create
    pub fn touch_trigger_enabled(&self) -> bool {
        self.config.touch_trigger
    }

    /// Format a single column definition for CREATE TABLE or ADD COLUMN
    ///
    /// Default clause precedence: explicit user default, then the type's
    /// generator default when the column is non-nullable, otherwise none.
    /// A foreign key requested alongside the add becomes an inline
    /// constraint clause.
    pub fn format_column_definition(col: &ColumnDescriptor) -> String {
        let mut parts = vec![
            quote_identifier(&col.name),
            col.column_type.native_sql_type().to_string(),
        ];

        if col.unique {
            parts.push("UNIQUE".to_string());
        }

        if !col.nullable {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default) = &col.default_value {
            parts.push(format!("DEFAULT {}", default));
        } else if !col.nullable {
            parts.push(format!("DEFAULT {}", col.column_type.generator_default()));
        }

        if let Some(fk) = &col.foreign_key {
            parts.push(format!(
                "CONSTRAINT {} REFERENCES {}({}) ON DELETE {} ON UPDATE {}",
                quote_identifier(&fk.constraint_name(&col.name)),
                quote_identifier(&fk.ref_table),
                quote_identifier(&fk.ref_column),
                fk.on_delete.as_sql(),
                fk.on_update.as_sql()
            ));
        }

        parts.join(" ")
    }

    fn format_add_foreign_key(
        quoted_table: &str,
        column: &str,
        fk: &ForeignKeyDescriptor,
    ) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {} ON UPDATE {}",
            quoted_table,
            quote_identifier(&fk.constraint_name(column)),
            quote_identifier(column),
            quote_identifier(&fk.ref_table),
            quote_identifier(&fk.ref_column),
            fk.on_delete.as_sql(),
            fk.on_update.as_sql()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{AlterTableRequest, TableSnapshot, plan};
    use crate::types::{ColumnType, ReferentialAction};

    fn test_config() -> StoreConfig {
        StoreConfig::builder("postgres://localhost/test").build()
    }

    // ==================== CREATE TABLE Tests ====================

    #[test]
    fn test_generate_create_table_appends_reserved_fields() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        let columns = vec![
            ColumnDescriptor::new("title", ColumnType::Text).not_null(),
            ColumnDescriptor::new("views", ColumnType::Integer),
        ];

        let ddl = generator.generate_create_table("articles", &columns);

        assert!(ddl.starts_with("CREATE TABLE \"articles\" ("));
        assert!(ddl.contains("id UUID PRIMARY KEY DEFAULT gen_random_uuid()"));
        assert!(ddl.contains("\"title\" TEXT NOT NULL"));
        assert!(ddl.contains("\"views\" BIGINT"));
        assert!(ddl.contains("created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(ddl.contains("updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
    }

    #[test]
    fn test_generate_create_table_empty_columns() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        let ddl = generator.generate_create_table("empty_table", &[]);

        // Still carries the platform-owned columns
        assert!(ddl.contains("id UUID PRIMARY KEY"));
        assert!(ddl.contains("created_at"));
        assert!(ddl.contains("updated_at"));
    }

    #[test]
    fn test_generate_create_table_all_column_types() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        let columns = vec![
            ColumnDescriptor::new("t", ColumnType::Text),
            ColumnDescriptor::new("i", ColumnType::Integer),
            ColumnDescriptor::new("f", ColumnType::Float),
            ColumnDescriptor::new("b", ColumnType::Boolean),
            ColumnDescriptor::new("d", ColumnType::Date),
            ColumnDescriptor::new("dt", ColumnType::DateTime),
            ColumnDescriptor::new("u", ColumnType::Uuid),
            ColumnDescriptor::new("j", ColumnType::Json),
        ];

        let ddl = generator.generate_create_table("all_types", &columns);

        assert!(ddl.contains("\"t\" TEXT"));
        assert!(ddl.contains("\"i\" BIGINT"));
        assert!(ddl.contains("\"f\" DOUBLE PRECISION"));
        assert!(ddl.contains("\"b\" BOOLEAN"));
        assert!(ddl.contains("\"d\" DATE"));
        assert!(ddl.contains("\"dt\" TIMESTAMPTZ"));
        assert!(ddl.contains("\"u\" UUID"));
        assert!(ddl.contains("\"j\" JSONB"));
    }

    #[test]
    fn test_generate_create_table_with_inline_foreign_key() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        let columns = vec![
            ColumnDescriptor::new("author_id", ColumnType::Uuid).references(
                ForeignKeyDescriptor::new("authors", "id").on_delete(ReferentialAction::Cascade),
            ),
        ];

        let ddl = generator.generate_create_table("articles", &columns);

        assert!(ddl.contains("CONSTRAINT \"fk_author_id_authors_id\""));
        assert!(ddl.contains("REFERENCES \"authors\"(\"id\")"));
        assert!(ddl.contains("ON DELETE CASCADE"));
        assert!(ddl.contains("ON UPDATE RESTRICT"));
    }

    // ==================== Column Definition Tests ====================

    #[test]
    fn test_format_column_definition_basic() {
        let col = ColumnDescriptor::new("name", ColumnType::Text);
        assert_eq!(DdlGenerator::format_column_definition(&col), "\"name\" TEXT");
    }

    #[test]
    fn test_format_column_definition_explicit_default_wins() {
        let col = ColumnDescriptor::new("status", ColumnType::Text)
            .not_null()
            .default("'active'");
        assert_eq!(
            DdlGenerator::format_column_definition(&col),
            "\"status\" TEXT NOT NULL DEFAULT 'active'"
        );
    }

    #[test]
    fn test_format_column_definition_generator_default_when_not_null() {
        let col = ColumnDescriptor::new("count", ColumnType::Integer).not_null();
        assert_eq!(
            DdlGenerator::format_column_definition(&col),
            "\"count\" BIGINT NOT NULL DEFAULT 0"
        );
    }

    #[test]
    fn test_format_column_definition_nullable_gets_no_generator_default() {
        let col = ColumnDescriptor::new("count", ColumnType::Integer);
        assert_eq!(
            DdlGenerator::format_column_definition(&col),
            "\"count\" BIGINT"
        );
    }

    #[test]
    fn test_format_column_definition_unique_not_null() {
        let col = ColumnDescriptor::new("slug", ColumnType::Text)
            .unique()
            .not_null();
        assert_eq!(
            DdlGenerator::format_column_definition(&col),
            "\"slug\" TEXT UNIQUE NOT NULL DEFAULT ''"
        );
    }

    // ==================== ALTER Statement Tests ====================

    fn make_plan(request: AlterTableRequest) -> MutationPlan {
        let snapshot = TableSnapshot::new("articles")
            .with_column("id")
            .with_column("title")
            .with_column("author_id")
            .with_foreign_key("author_id", ForeignKeyDescriptor::new("authors", "id"));
        plan(&snapshot, &request).unwrap()
    }

    #[test]
    fn test_alter_statements_fixed_order() {
        let mut request = AlterTableRequest::new("articles");
        request.drop_columns = vec!["title".to_string()];
        request.add_columns = vec![ColumnDescriptor::new("body", ColumnType::Text)];
        request.drop_foreign_keys = vec!["author_id".to_string()];

        let config = test_config();
        let generator = DdlGenerator::new(&config);
        let statements = generator.generate_alter_statements(&make_plan(request));

        assert_eq!(statements.len(), 3);
        assert!(statements[0].contains("DROP COLUMN \"title\""));
        assert!(statements[1].contains("ADD COLUMN \"body\" TEXT"));
        assert!(statements[2].contains("DROP CONSTRAINT \"fk_author_id_authors_id\""));
    }

    #[test]
    fn test_alter_statements_rename() {
        let mut request = AlterTableRequest::new("articles");
        request
            .rename_columns
            .insert("title".to_string(), "headline".to_string());

        let config = test_config();
        let generator = DdlGenerator::new(&config);
        let statements = generator.generate_alter_statements(&make_plan(request));

        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            "ALTER TABLE \"articles\" RENAME COLUMN \"title\" TO \"headline\""
        );
    }

    #[test]
    fn test_alter_statements_add_foreign_key() {
        let mut request = AlterTableRequest::new("articles");
        request.add_foreign_keys = vec![crate::planner::AddForeignKey {
            column: "title".to_string(),
            foreign_key: ForeignKeyDescriptor::new("topics", "id")
                .on_delete(ReferentialAction::SetNull)
                .on_update(ReferentialAction::Cascade),
        }];

        let config = test_config();
        let generator = DdlGenerator::new(&config);
        let statements = generator.generate_alter_statements(&make_plan(request));

        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            "ALTER TABLE \"articles\" ADD CONSTRAINT \"fk_title_topics_id\" FOREIGN KEY (\"title\") REFERENCES \"topics\"(\"id\") ON DELETE SET NULL ON UPDATE CASCADE"
        );
    }

    // ==================== DROP TABLE / Auxiliary Tests ====================

    #[test]
    fn test_generate_drop_table() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        assert_eq!(
            generator.generate_drop_table("articles"),
            "DROP TABLE IF EXISTS \"articles\" CASCADE"
        );
    }

    #[test]
    fn test_generate_enable_row_security() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        assert_eq!(
            generator.generate_enable_row_security("articles"),
            "ALTER TABLE \"articles\" ENABLE ROW LEVEL SECURITY"
        );
    }

    #[test]
    fn test_generate_touch_trigger() {
        let config = test_config();
        let generator = DdlGenerator::new(&config);

        let func = generator.generate_touch_function();
        assert!(func.contains("CREATE OR REPLACE FUNCTION _touch_updated_at()"));
        assert!(func.contains("NEW.updated_at = NOW()"));

        let trigger = generator.generate_touch_trigger("articles");
        assert_eq!(
            trigger,
            "CREATE TRIGGER \"trg_articles_touch\" BEFORE UPDATE ON \"articles\" FOR EACH ROW EXECUTE FUNCTION _touch_updated_at()"
        );
    }

    #[test]
    fn test_touch_trigger_toggle() {
        let on = StoreConfig::builder("postgres://localhost/test").build();
        assert!(DdlGenerator::new(&on).touch_trigger_enabled());

        let off = StoreConfig::builder("postgres://localhost/test")
            .touch_trigger(false)
            .build();
        assert!(!DdlGenerator::new(&off).touch_trigger_enabled());
    }
}
