//! SQL utilities for the schema mutation engine
//!
//! Provides DDL generation and identifier sanitization.

pub mod ddl;
pub mod sanitize;

pub use ddl::DdlGenerator;
pub use sanitize::{
    POSTGRES_RESERVED_WORDS, check_user_table_name, quote_identifier, validate_identifier,
};
