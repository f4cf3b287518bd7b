//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use crate::csv::{unescape_separator, Dialect};
use crate::error::Result;
use crate::export::{ExportOptions, TextFormat};

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file without validating it.
    ///
    /// Used when command-line overrides are applied before validation.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Build the output dialect, expanding escapes in the separators.
    pub fn dialect(&self) -> Result<Dialect> {
        let export = &self.export;
        Dialect::new(
            &unescape_separator(&export.fields_terminated_by),
            &export.fields_enclosed_by,
            &export.fields_escaped_by,
            &unescape_separator(&export.lines_terminated_by),
        )
    }

    /// Options handed to the table exporter.
    pub fn export_options(&self) -> Result<ExportOptions> {
        Ok(ExportOptions {
            output_dir: self.export.output_dir.clone(),
            compress: self.export.compress,
            skip_header: self.export.skip_header,
            dialect: self.dialect()?,
            format: TextFormat {
                null_value: self.export.null_value.clone(),
                binary: self.export.binary_format,
            },
        })
    }
}
