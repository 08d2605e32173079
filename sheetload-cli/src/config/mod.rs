//! Run configuration
//!
//! Values come from a TOML file, then the environment, then command-line
//! overrides, each layer replacing what the previous one set. `Config::job`
//! validates the merged result into a `LoadJob`.

mod database;

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use database::{DatabaseConfig, DatabaseTarget};

use crate::db::{ReplaceMode, ReplaceOptions, TableRef};
use crate::error::LoadError;
use crate::sheet::HeaderOptions;

/// Table and schema names accepted for the destination
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

/// Column removed from every sheet unless configured otherwise
pub const DEFAULT_DROP_COLUMN: &str = "序号";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub target: TargetConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
    pub drop_columns: Vec<String>,
    pub normalize_headers: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            sheet: None,
            drop_columns: vec![DEFAULT_DROP_COLUMN.to_string()],
            normalize_headers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub mode: ReplaceMode,
    pub batch_size: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            table: None,
            schema: None,
            mode: ReplaceMode::default(),
            batch_size: 1000,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub drop_columns: Option<Vec<String>>,
    pub normalize_headers: Option<bool>,
    pub mode: Option<ReplaceMode>,
    pub batch_size: Option<usize>,
    pub database_url: Option<String>,
}

/// What to read from the workbook
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub sheet: Option<String>,
    pub drop_columns: Vec<String>,
    pub headers: HeaderOptions,
}

/// A validated run: which sheet goes into which table, and how
#[derive(Debug, Clone)]
pub struct LoadJob {
    pub source: SourceSpec,
    pub table: TableRef,
    pub replace: ReplaceOptions,
}

impl Config {
    /// `<config_dir>/sheetload/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sheetload").join("config.toml"))
    }

    /// Read `explicit`, or the default file when it exists, or start empty
    pub fn load(explicit: Option<&Path>) -> Result<Self, LoadError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(LoadError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        log::info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|e| {
            LoadError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
            .map_err(|e| LoadError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        toml::from_str(text).map_err(|e| LoadError::Config(e.to_string()))
    }

    /// Apply environment variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), LoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SHEETLOAD_FILE") {
            self.source.path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SHEETLOAD_SHEET") {
            self.source.sheet = Some(v);
        }
        if let Some(v) = lookup("SHEETLOAD_TABLE") {
            self.target.table = Some(v);
        }
        if let Some(v) = lookup("SHEETLOAD_SCHEMA") {
            self.target.schema = Some(v);
        }

        let db = &mut self.database;
        if let Some(v) = lookup("DATABASE_URL") {
            db.url = Some(v);
        }
        if let Some(v) = lookup("SHEETLOAD_DB_HOST") {
            db.host = v;
        }
        if let Some(v) = lookup("SHEETLOAD_DB_PORT") {
            db.port = v.parse().map_err(|_| {
                LoadError::Config(format!("SHEETLOAD_DB_PORT is not a port number: '{}'", v))
            })?;
        }
        if let Some(v) = lookup("SHEETLOAD_DB_USER") {
            db.user = Some(v);
        }
        if let Some(v) = lookup("SHEETLOAD_DB_PASSWORD") {
            db.password = Some(v);
        }
        if let Some(v) = lookup("SHEETLOAD_DB_NAME") {
            db.dbname = Some(v);
        }
        if let Some(v) = lookup("SHEETLOAD_DB_SSLMODE") {
            db.sslmode = v;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            path,
            sheet,
            table,
            schema,
            drop_columns,
            normalize_headers,
            mode,
            batch_size,
            database_url,
        } = overrides;

        if path.is_some() {
            self.source.path = path;
        }
        if sheet.is_some() {
            self.source.sheet = sheet;
        }
        if let Some(columns) = drop_columns {
            self.source.drop_columns = columns;
        }
        if let Some(normalize) = normalize_headers {
            self.source.normalize_headers = normalize;
        }
        if table.is_some() {
            self.target.table = table;
        }
        if schema.is_some() {
            self.target.schema = schema;
        }
        if let Some(mode) = mode {
            self.target.mode = mode;
        }
        if let Some(batch_size) = batch_size {
            self.target.batch_size = batch_size;
        }
        if database_url.is_some() {
            self.database.url = database_url;
        }
    }

    /// The source half of a job, enough to inspect a sheet
    pub fn source_spec(&self) -> Result<SourceSpec, LoadError> {
        let path = self.source.path.clone().ok_or_else(|| {
            LoadError::Config("no spreadsheet given (--file or [source] path)".to_string())
        })?;
        Ok(SourceSpec {
            path,
            sheet: self.source.sheet.clone(),
            drop_columns: self.source.drop_columns.clone(),
            headers: HeaderOptions {
                normalize: self.source.normalize_headers,
            },
        })
    }

    pub fn job(&self) -> Result<LoadJob, LoadError> {
        let source = self.source_spec()?;

        let name = self.target.table.clone().ok_or_else(|| {
            LoadError::Config("no destination table given (--table or [target] table)".to_string())
        })?;
        validate_identifier("table", &name)?;
        if let Some(schema) = &self.target.schema {
            validate_identifier("schema", schema)?;
        }

        if self.target.batch_size == 0 {
            return Err(LoadError::Config("batch_size must be at least 1".to_string()));
        }

        Ok(LoadJob {
            source,
            table: TableRef::new(name).with_schema(self.target.schema.clone()),
            replace: ReplaceOptions {
                mode: self.target.mode,
                batch_size: self.target.batch_size,
            },
        })
    }
}

fn validate_identifier(what: &str, value: &str) -> Result<(), LoadError> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(LoadError::Config(format!(
            "invalid {} name '{}': only letters, digits and underscores are allowed",
            what, value
        )))
    }
}
