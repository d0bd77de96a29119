//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use crate::domain::Spreadsheet;

/// Cell grid with single-hop references and a standalone arithmetic engine
#[derive(Parser, Debug)]
#[command(name = "cellgrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log verbosity, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct GridSize {
    /// Number of rows in the grid
    #[arg(long, default_value_t = Spreadsheet::DEFAULT_ROWS)]
    pub rows: usize,

    /// Number of columns in the grid
    #[arg(long, default_value_t = Spreadsheet::DEFAULT_COLUMNS)]
    pub columns: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an arithmetic expression
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,

        /// Variable binding as NAME=VALUE, may be repeated
        #[arg(short, long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// Print every non-empty cell of a saved sheet
    Show {
        file: String,

        #[command(flatten)]
        size: GridSize,
    },

    /// Set one cell's text in a saved sheet, creating the file if needed
    Set {
        file: String,
        address: String,
        text: String,

        #[command(flatten)]
        size: GridSize,
    },

    /// Write a sheet filled with sample content
    Demo {
        file: String,

        #[command(flatten)]
        size: GridSize,
    },
}
