pub mod handler;

use clap::Args;

use super::SourceArgs;
use crate::config::ConfigOverrides;
use crate::db::ReplaceMode;

pub use handler::handle_load_command;

#[derive(Args, Debug, Clone)]
pub struct LoadCommands {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Destination table (letters, digits and underscores)
    #[arg(long)]
    pub table: Option<String>,

    /// Destination schema
    #[arg(long)]
    pub schema: Option<String>,

    /// How to replace the existing table
    #[arg(long, value_enum)]
    pub mode: Option<ReplaceMode>,

    /// Maximum rows per INSERT statement
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Connection URL (postgres://, postgresql:// or sqlite:)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Exit with an error status when the load fails
    #[arg(long)]
    pub fail_on_error: bool,
}

impl LoadCommands {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            table: self.table.clone(),
            schema: self.schema.clone(),
            mode: self.mode,
            batch_size: self.batch_size,
            database_url: self.database_url.clone(),
            ..self.source.overrides()
        }
    }
}
