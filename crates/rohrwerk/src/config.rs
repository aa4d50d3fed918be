//! Application configuration.
//!
//! A small JSON file pointing at the two database files and carrying the
//! issuer data printed on every invoice. All fields except `version` have
//! defaults, so an empty `{"version": "1.0"}` file is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Job database location; `None` means the platform default under
    /// the home directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Supplier catalog export location.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub company: CompanyInfo,
}

/// Issuer letterhead and banking boilerplate printed on invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default = "default_company_name")]
    pub name: String,
    #[serde(default = "default_company_address")]
    pub address: String,
    #[serde(default = "default_company_phone")]
    pub phone: String,
    #[serde(default = "default_bank_name")]
    pub bank_name: String,
    #[serde(default = "default_iban")]
    pub iban: String,
    #[serde(default = "default_bic")]
    pub bic: String,
    #[serde(default = "default_vat_number")]
    pub vat_number: String,
}

fn default_company_name() -> String {
    "DÜBENDORFER SANITÄR-SERVICE GmbH".to_string()
}

fn default_company_address() -> String {
    "Glattwiesenstrasse 20, 8152 Glattbrugg".to_string()
}

fn default_company_phone() -> String {
    "Tel: 076 388 95 60".to_string()
}

fn default_bank_name() -> String {
    "UBS Switzerland AG".to_string()
}

fn default_iban() -> String {
    "CH85 0028 3283 1127 5501 Y".to_string()
}

fn default_bic() -> String {
    "UBSWCHZH80A".to_string()
}

fn default_vat_number() -> String {
    "CHE-257.523.928".to_string()
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: default_company_name(),
            address: default_company_address(),
            phone: default_company_phone(),
            bank_name: default_bank_name(),
            iban: default_iban(),
            bic: default_bic(),
            vat_number: default_vat_number(),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.company.name.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "Company name must not be empty".to_string(),
        });
    }

    if config.company.iban.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "IBAN must not be empty".to_string(),
        });
    }

    Ok(())
}
