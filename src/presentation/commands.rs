use crate::application::App;
use crate::domain::{DomainError, ExpressionError, ExpressionTree};
use crate::infrastructure::{PersistenceError, XmlRepository};
use crate::presentation::args::{Cli, Commands, GridSize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("invalid variable binding '{0}', expected NAME=VALUE")]
    InvalidBinding(String),

    #[error("could not write output: {0}")]
    Output(#[from] std::io::Error),
}

pub fn execute_command<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    match &cli.command {
        Commands::Eval { expression, vars } => _eval(expression, vars, out),
        Commands::Show { file, size } => _show(file, *size, out),
        Commands::Set { file, address, text, size } => _set(file, address, text, *size, out),
        Commands::Demo { file, size } => _demo(file, *size, out),
    }
}

fn parse_binding(binding: &str) -> Result<(&str, f64), CliError> {
    let invalid = || CliError::InvalidBinding(binding.to_string());
    let (name, value) = binding.split_once('=').ok_or_else(invalid)?;
    let value = value.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok((name.trim(), value))
}

#[instrument(skip(out))]
fn _eval<W: Write>(expression: &str, vars: &[String], out: &mut W) -> Result<(), CliError> {
    let mut tree = ExpressionTree::new(expression)?;
    for binding in vars {
        let (name, value) = parse_binding(binding)?;
        tree.set_variable(name, value)?;
    }

    match tree.evaluate()? {
        Some(value) => writeln!(out, "{}", value)?,
        None => writeln!(out, "(empty)")?,
    }
    Ok(())
}

/// Opens `file` into a session of the given size; a missing file gives an empty sheet.
fn open_session(file: &str, size: GridSize) -> Result<App, CliError> {
    let mut app = App::new(size.rows, size.columns);
    if Path::new(file).exists() {
        let (report, filename) = XmlRepository::load_spreadsheet(&mut app.spreadsheet, file)?;
        app.set_load_result(Ok((report, filename)));
    } else {
        debug!(file, "no saved sheet, starting empty");
    }
    Ok(app)
}

fn save_session<W: Write>(app: &mut App, file: &str, out: &mut W) -> Result<(), CliError> {
    let filename = XmlRepository::save_spreadsheet(&app.spreadsheet, file)?;
    app.set_save_result(Ok(filename));
    if let Some(message) = &app.status_message {
        writeln!(out, "{}", message)?;
    }
    Ok(())
}

#[instrument(skip(out))]
fn _show<W: Write>(file: &str, size: GridSize, out: &mut W) -> Result<(), CliError> {
    let mut app = App::new(size.rows, size.columns);
    let (report, filename) = XmlRepository::load_spreadsheet(&mut app.spreadsheet, file)?;
    app.set_load_result(Ok((report, filename)));

    for cell in app.spreadsheet.cells().filter(|cell| !cell.is_blank()) {
        writeln!(
            out,
            "{}\t{}\t{}",
            cell.name(),
            cell.text(),
            app.displayed(cell.row(), cell.column())
        )?;
    }
    if let Some(message) = &app.status_message {
        writeln!(out, "{}", message)?;
    }
    Ok(())
}

#[instrument(skip(out))]
fn _set<W: Write>(
    file: &str,
    address: &str,
    text: &str,
    size: GridSize,
    out: &mut W,
) -> Result<(), CliError> {
    let mut app = open_session(file, size)?;
    app.edit_cell(address, text)?;
    save_session(&mut app, file, out)
}

#[instrument(skip(out))]
fn _demo<W: Write>(file: &str, size: GridSize, out: &mut W) -> Result<(), CliError> {
    let mut app = App::new(size.rows, size.columns);
    app.fill_demo()?;
    save_session(&mut app, file, out)
}
