pub mod handler;

use clap::{Args, ValueEnum};

use super::SourceArgs;

pub use handler::handle_inspect_command;

#[derive(Args, Debug, Clone)]
pub struct InspectCommands {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Also show the first N rows
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub preview: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
