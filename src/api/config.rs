// Configuration for C Verify
//
// This module handles configuration for the C Verify tool.

use crate::api::types::AnalysisConfig;
use anyhow::Result;
use std::fs;
use std::path::Path;

/// Configuration manager for C Verify
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(config: &AnalysisConfig, path: P) -> Result<()> {
        let config_str = serde_json::to_string_pretty(config)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Create a builder for configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for creating configurations
#[derive(Default)]
pub struct ConfigBuilder {
    config: AnalysisConfig,
}

impl ConfigBuilder {
    /// Set whether to detect null pointer dereferences
    pub fn detect_null_pointer(mut self, value: bool) -> Self {
        self.config.detect_null_pointer = value;
        self
    }

    /// Set whether to detect memory leaks
    pub fn detect_memory_leak(mut self, value: bool) -> Self {
        self.config.detect_memory_leak = value;
        self
    }

    /// Set whether to detect uninitialized variable reads
    pub fn detect_uninitialized(mut self, value: bool) -> Self {
        self.config.detect_uninitialized = value;
        self
    }

    /// Set whether to detect infinite loops
    pub fn detect_infinite_loop(mut self, value: bool) -> Self {
        self.config.detect_infinite_loop = value;
        self
    }

    /// Set whether to detect buffer overflows
    pub fn detect_buffer_overflow(mut self, value: bool) -> Self {
        self.config.detect_buffer_overflow = value;
        self
    }

    /// Set whether to detect missing return statements
    pub fn detect_missing_return(mut self, value: bool) -> Self {
        self.config.detect_missing_return = value;
        self
    }

    /// Set the minimum classifier confidence
    pub fn classifier_threshold(mut self, value: f64) -> Self {
        self.config.classifier_threshold = value;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AnalysisConfig {
        self.config
    }
}
