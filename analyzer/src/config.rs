//! Analyzer configuration.
//!
//! Defaults match the ToxRefDB subchronic export. Every value can be
//! overridden from the environment (a `.env` file is honoured) and then from
//! command-line flags.
//!
//! | Variable                           | Default          |
//! |------------------------------------|------------------|
//! | `NOAEL_RANK_OUTPUT_DIR`            | `.`              |
//! | `NOAEL_RANK_EXPORT_INTERMEDIATE`   | `true`           |
//! | `NOAEL_RANK_DELIMITER`             | auto-detected    |
//! | `NOAEL_RANK_COLUMN_CHEMICAL`       | `chemical_name`  |
//! | `NOAEL_RANK_COLUMN_ENDPOINT`       | `Endpoint`       |
//! | `NOAEL_RANK_COLUMN_DIRECTION`      | `direction`      |
//! | `NOAEL_RANK_COLUMN_DOSE`           | `noael_dose`     |
//! | `NOAEL_RANK_COLUMN_CATEGORY`       | `Category`       |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Header names of the columns the loader reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub chemical_name: String,
    pub endpoint: String,
    pub direction: String,
    pub noael_dose: String,
    pub noael_category: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            chemical_name: "chemical_name".to_string(),
            endpoint: "Endpoint".to_string(),
            direction: "direction".to_string(),
            noael_dose: "noael_dose".to_string(),
            noael_category: "Category".to_string(),
        }
    }
}

/// Options for the analysis pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    /// Input column names
    pub columns: ColumnNames,

    /// Directory receiving the result tables
    pub output_dir: PathBuf,

    /// Also write the consolidated (intermediate) table
    pub export_intermediate: bool,

    /// Input delimiter; detected from the header line when unset
    #[serde(default)]
    pub delimiter: Option<char>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            output_dir: PathBuf::from("."),
            export_intermediate: true,
            delimiter: None,
        }
    }
}

impl AnalyzerOptions {
    /// Defaults overridden by `NOAEL_RANK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each known key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(dir) = lookup("NOAEL_RANK_OUTPUT_DIR") {
            options.output_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("NOAEL_RANK_EXPORT_INTERMEDIATE") {
            options.export_intermediate = parse_bool("NOAEL_RANK_EXPORT_INTERMEDIATE", &flag)?;
        }

        if let Some(raw) = lookup("NOAEL_RANK_DELIMITER") {
            options.delimiter = Some(parse_delimiter("NOAEL_RANK_DELIMITER", &raw)?);
        }

        let columns = &mut options.columns;
        let overrides = [
            ("NOAEL_RANK_COLUMN_CHEMICAL", &mut columns.chemical_name),
            ("NOAEL_RANK_COLUMN_ENDPOINT", &mut columns.endpoint),
            ("NOAEL_RANK_COLUMN_DIRECTION", &mut columns.direction),
            ("NOAEL_RANK_COLUMN_DOSE", &mut columns.noael_dose),
            ("NOAEL_RANK_COLUMN_CATEGORY", &mut columns.noael_category),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key) {
                *slot = parse_column_name(key, &value)?;
            }
        }

        Ok(options)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Trimmed, non-empty column name.
pub fn parse_column_name(key: &str, raw: &str) -> Result<String, ConfigError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "column name cannot be empty".to_string(),
        });
    }
    Ok(name.to_string())
}

/// Parse a single-byte delimiter; `\t` and `tab` mean a tab.
pub fn parse_delimiter(key: &str, raw: &str) -> Result<char, ConfigError> {
    let delimiter = match raw {
        "\\t" | "tab" | "TAB" => '\t',
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected a single character, got '{}'", raw),
                    })
                }
            }
        }
    };
    if !delimiter.is_ascii() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("delimiter must be ASCII, got '{}'", delimiter),
        });
    }
    Ok(delimiter)
}
