//! # dynschema
//!
//! A dynamic table schema mutation engine for PostgreSQL control planes.
//!
//! This crate turns a declarative, JSON-shaped description of structural
//! changes into safe, ordered DDL against a live PostgreSQL catalog. A whole
//! batch of changes is validated against a simulated future state before any
//! statement runs, and a persisted metadata snapshot is kept in sync for
//! read-only consumers.
//!
//! ## Features
//!
//! - **Batch Validation**: Every alter batch is simulated on a working copy
//!   of the column set; one invalid operation rejects the batch with no DDL
//! - **Type-Safe Column Definitions**: Text, Integer, Float, Boolean, Date,
//!   DateTime, Uuid, and Json column kinds with fixed native mappings
//! - **Platform Columns**: Every table carries id, created_at, and
//!   updated_at, which cannot be redeclared with a different type
//! - **Foreign Keys**: Column-level references with configurable ON DELETE
//!   and ON UPDATE actions and deterministic constraint names
//! - **System-Table Protection**: The `_` namespace is unreachable through
//!   the mutation API
//! - **Metadata Snapshot**: A versioned JSONB projection of the live schema,
//!   replaced wholesale after every successful mutation
//! - **Change Notification**: A broadcast signal lets the row-level query
//!   layer invalidate its cached schema without a restart
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynschema::{
//!     ColumnDescriptor, ColumnType, CreateTableRequest, SchemaStore, StoreConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::builder("postgres://localhost/mydb").build();
//!     let store = SchemaStore::new(config).await?;
//!
//!     // Create a table; id, created_at, and updated_at are added for you
//!     let created = store
//!         .create_table(CreateTableRequest::new(
//!             "articles",
//!             vec![
//!                 ColumnDescriptor::new("title", ColumnType::Text).not_null(),
//!                 ColumnDescriptor::new("views", ColumnType::Integer).not_null(),
//!                 ColumnDescriptor::new("tags", ColumnType::Json),
//!             ],
//!         ))
//!         .await?;
//!     assert_eq!(created.auto_fields, ["id", "created_at", "updated_at"]);
//!
//!     // Alter it in one validated batch
//!     use dynschema::AlterTableRequest;
//!     let mut alter = AlterTableRequest::new("articles");
//!     alter.add_columns = vec![ColumnDescriptor::new("body", ColumnType::Text)];
//!     alter
//!         .rename_columns
//!         .insert("views".to_string(), "view_count".to_string());
//!     store.alter_table(alter).await?;
//!
//!     // Read the live schema back
//!     let schema = store.get_schema("articles").await?;
//!     assert!(schema.columns.iter().any(|c| c.name == "view_count"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The store is configured using `StoreConfig`:
//!
//! ```rust
//! use dynschema::StoreConfig;
//!
//! let config = StoreConfig::builder("postgres://localhost/mydb")
//!     .metadata_table("_metadata") // Default snapshot table name
//!     .touch_trigger(true)         // Install updated_at triggers (default)
//!     .build();
//! ```
//!
//! ## Concurrency
//!
//! Schema mutation is an ordinary request/response operation; there is no
//! cross-request locking. Two concurrent batches against the same table may
//! both pass planning against the same current state, and the later one can
//! fail at execution. Callers that need strict serialization must serialize
//! schema changes per table themselves. Alter batches are executed one
//! statement at a time without a wrapping transaction, so a mid-batch
//! failure can leave earlier statements committed; the returned error says
//! so and callers should re-fetch the schema before retrying.

pub mod config;
pub mod error;
pub mod events;
pub mod metadata;
pub mod planner;
pub mod reserved;
pub mod sql;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Result, SchemaError};
pub use events::{ChangeKind, SchemaChange, SchemaNotifier};
pub use metadata::{ColumnMetadata, MetadataSnapshot, MetadataSync, TableMetadata};
pub use planner::{AddForeignKey, AlterTableRequest, MutationPlan, TableSnapshot, plan};
pub use reserved::{RESERVED_FIELDS, ReservedField, filter_reserved, is_reserved_field};
pub use store::{AlterTableResponse, CreateTableRequest, CreateTableResponse, SchemaStore};
pub use types::{ColumnDescriptor, ColumnType, ForeignKeyDescriptor, ReferentialAction};

// Re-export SQL utilities for advanced users
pub use sql::ddl::DdlGenerator;
pub use sql::sanitize::{check_user_table_name, quote_identifier, validate_identifier};
