//! Configuration for SchemaStore
//!
//! Provides a builder pattern for configuring the schema store.

/// Configuration for the schema store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Name of the metadata snapshot table (default: "_metadata")
    pub metadata_table: String,
    /// Whether new tables get the updated-at trigger (default: true)
    pub touch_trigger: bool,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    metadata_table: String,
    touch_trigger: bool,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            metadata_table: "_metadata".to_string(),
            touch_trigger: true,
        }
    }

    /// Set the metadata table name (default: "_metadata")
    ///
    /// The name must stay inside the platform-internal `_` namespace so the
    /// mutation API cannot reach it.
    pub fn metadata_table(mut self, name: impl Into<String>) -> Self {
        self.metadata_table = name.into();
        self
    }

    /// Enable or disable the updated-at trigger on new tables (default: true)
    pub fn touch_trigger(mut self, enabled: bool) -> Self {
        self.touch_trigger = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            metadata_table: self.metadata_table,
            touch_trigger: self.touch_trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::builder("postgres://localhost/test").build();

        assert_eq!(config.database_url, "postgres://localhost/test");
        assert_eq!(config.metadata_table, "_metadata");
        assert!(config.touch_trigger);
    }

    #[test]
    fn test_custom_metadata_table() {
        let config = StoreConfig::builder("postgres://localhost/test")
            .metadata_table("_control_plane")
            .build();

        assert_eq!(config.metadata_table, "_control_plane");
    }

    #[test]
    fn test_touch_trigger_disabled() {
        let config = StoreConfig::builder("postgres://localhost/test")
            .touch_trigger(false)
            .build();

        assert!(!config.touch_trigger);
    }

    #[test]
    fn test_builder_accepts_string() {
        let config = StoreConfig::builder(String::from("postgres://localhost/db")).build();
        assert_eq!(config.database_url, "postgres://localhost/db");
    }

    #[test]
    fn test_config_clone() {
        let config1 = StoreConfig::builder("postgres://localhost/test")
            .metadata_table("_meta")
            .build();
        let config2 = config1.clone();

        assert_eq!(config1.metadata_table, config2.metadata_table);
        assert_eq!(config1.touch_trigger, config2.touch_trigger);
    }
}
