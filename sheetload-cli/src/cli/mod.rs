//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

use commands::inspect::InspectCommands;
use commands::load::LoadCommands;

/// Load one spreadsheet sheet into a database table
#[derive(Parser, Debug)]
#[command(name = "sheetload", version, about)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace a table with the contents of a sheet
    Load(LoadCommands),
    /// Show what a load would write, without touching the database
    Inspect(InspectCommands),
}
