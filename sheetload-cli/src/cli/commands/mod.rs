//! Subcommand arguments and handlers

pub mod inspect;
pub mod load;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{Config, ConfigOverrides};

/// Options shared by every command that reads a sheet
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Config file (default: <config dir>/sheetload/config.toml if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Spreadsheet to read (xlsx, xlsm, xlsb, xls, ods)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Sheet name (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Column to remove before loading; repeat for several. Replaces the configured list
    #[arg(long = "drop-column", value_name = "NAME", conflicts_with = "keep_all_columns")]
    pub drop_columns: Vec<String>,

    /// Do not remove any column
    #[arg(long)]
    pub keep_all_columns: bool,

    /// Trim header names, turn whitespace into '_' and strip quoting characters
    #[arg(long)]
    pub normalize_headers: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl SourceArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        let drop_columns = if self.keep_all_columns {
            Some(Vec::new())
        } else if self.drop_columns.is_empty() {
            None
        } else {
            Some(self.drop_columns.clone())
        };

        ConfigOverrides {
            path: self.file.clone(),
            sheet: self.sheet.clone(),
            drop_columns,
            normalize_headers: self.normalize_headers.then_some(true),
            ..Default::default()
        }
    }

    /// Merge config file, environment and `overrides`
    pub fn resolve(&self, overrides: ConfigOverrides) -> Result<Config> {
        if self.no_color {
            colored::control::set_override(false);
        }

        let mut config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        config
            .apply_env(|key| std::env::var(key).ok())
            .context("Invalid environment configuration")?;
        config.apply_overrides(overrides);
        log::debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}
