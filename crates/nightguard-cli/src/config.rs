//! Configuration file handling for nightguard

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use nightguard_client::UnitSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Service parameters document used when nothing else is configured
pub const DEFAULT_PARAMS: &str = "service_params.json";

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to the service parameters JSON document
    pub params: Option<PathBuf>,
    /// Default VIN
    pub vin: Option<String>,
    /// Default output format
    pub output: Option<String>,
    /// Default unit system (metric or imperial)
    pub units: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("nightguard");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides<'_>) -> Result<MergedConfig> {
        let output = match (args.output, self.output.as_deref()) {
            (Some(format), _) => format,
            (None, Some(name)) => OutputFormat::from_str(name, true)
                .map_err(|e| anyhow!("Invalid output format in config: {}", e))?,
            (None, None) => OutputFormat::default(),
        };
        let units = match (args.units, self.units.as_deref()) {
            (Some(units), _) => units,
            (None, Some(name)) => name.parse::<UnitSystem>().context("Invalid units in config")?,
            (None, None) => UnitSystem::default(),
        };

        Ok(MergedConfig {
            params: args
                .params
                .map(Path::to_path_buf)
                .or_else(|| self.params.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PARAMS)),
            vin: args.vin.map(String::from).or_else(|| self.vin.clone()),
            output,
            units,
            no_color: args.no_color || self.no_color.unwrap_or(false),
        })
    }
}

/// Values given on the command line; `None` defers to the config file
#[derive(Debug, Default)]
pub struct ArgOverrides<'a> {
    pub params: Option<&'a Path>,
    pub vin: Option<&'a str>,
    pub output: Option<OutputFormat>,
    pub units: Option<UnitSystem>,
    pub no_color: bool,
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub params: PathBuf,
    pub vin: Option<String>,
    pub output: OutputFormat,
    pub units: UnitSystem,
    pub no_color: bool,
}

impl MergedConfig {
    /// VIN required by per-vehicle commands
    pub fn require_vin(&self) -> Result<&str> {
        self.vin
            .as_deref()
            .context("No VIN given. Pass --vin, set NIGHTGUARD_VIN, or add `vin` to the config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let merged = Config::default()
            .merge_with_args(&ArgOverrides::default())
            .unwrap();
        assert_eq!(merged.params, PathBuf::from(DEFAULT_PARAMS));
        assert_eq!(merged.output, OutputFormat::Table);
        assert_eq!(merged.units, UnitSystem::Metric);
        assert!(merged.vin.is_none());
        assert!(merged.require_vin().is_err());
    }

    #[test]
    fn test_file_values_fill_gaps() {
        let config: Config = toml::from_str(
            r#"
            params = "/etc/nightguard/service_params.json"
            vin = "YV4952NA4F120DEMO"
            output = "json"
            units = "Imperial"
            "#,
        )
        .unwrap();
        let merged = config.merge_with_args(&ArgOverrides::default()).unwrap();
        assert_eq!(
            merged.params,
            PathBuf::from("/etc/nightguard/service_params.json")
        );
        assert_eq!(merged.require_vin().unwrap(), "YV4952NA4F120DEMO");
        assert_eq!(merged.output, OutputFormat::Json);
        assert_eq!(merged.units, UnitSystem::Imperial);
    }

    #[test]
    fn test_args_win() {
        let config = Config {
            vin: Some("YV4952NA4F120DEMO".into()),
            output: Some("json".into()),
            no_color: Some(false),
            ..Default::default()
        };
        let args = ArgOverrides {
            vin: Some("YV1XZ12345A000000"),
            output: Some(OutputFormat::Csv),
            no_color: true,
            ..Default::default()
        };
        let merged = config.merge_with_args(&args).unwrap();
        assert_eq!(merged.vin.as_deref(), Some("YV1XZ12345A000000"));
        assert_eq!(merged.output, OutputFormat::Csv);
        assert!(merged.no_color);
    }

    #[test]
    fn test_invalid_file_values() {
        let config = Config {
            units: Some("nautical".into()),
            ..Default::default()
        };
        assert!(config.merge_with_args(&ArgOverrides::default()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "vin = \"YV4952NA4F120DEMO\"\nno_color = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.vin.as_deref(), Some("YV4952NA4F120DEMO"));
        assert_eq!(config.no_color, Some(true));
    }
}
