use crate::domain::Spreadsheet;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write sheet document: {0}")]
    Serialize(#[from] quick_xml::se::SeError),

    #[error("invalid sheet document: {0}")]
    Deserialize(#[from] quick_xml::de::DeError),
}

/// Root of the saved document: `<spreadsheet><cell name="A1"><text>..</text></cell>..</spreadsheet>`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "spreadsheet")]
struct SheetDocument {
    #[serde(rename = "cell", default)]
    cells: Vec<CellRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CellRecord {
    #[serde(rename = "@name")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Outcome of applying a saved document to a grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Reads and writes cell text as XML.
///
/// Only cells with text or a value are written, in row-major order. Loading
/// re-applies each record's text through [`Spreadsheet::set_text`] in
/// document order, so a formula saved before its target resolves against
/// the target's text at that moment and is not revisited afterwards.
pub struct XmlRepository;

impl XmlRepository {
    pub fn write_xml<W: Write>(spreadsheet: &Spreadsheet, mut writer: W) -> Result<(), PersistenceError> {
        let document = SheetDocument {
            cells: spreadsheet
                .cells()
                .filter(|cell| !cell.is_blank())
                .map(|cell| CellRecord {
                    name: cell.name().to_string(),
                    text: Some(cell.text().to_string()),
                })
                .collect(),
        };

        let xml = quick_xml::se::to_string(&document)?;
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;
        debug!(cells = document.cells.len(), "wrote sheet document");
        Ok(())
    }

    /// Applies every record of the document in `reader` onto `spreadsheet`.
    ///
    /// The grid is not cleared first. Records naming a cell outside the grid,
    /// or without a `<text>` child, are skipped.
    pub fn read_xml<R: BufRead>(spreadsheet: &mut Spreadsheet, reader: R) -> Result<LoadReport, PersistenceError> {
        let document: SheetDocument = quick_xml::de::from_reader(reader)?;
        let mut report = LoadReport::default();

        for record in document.cells {
            let Some(text) = record.text else {
                warn!(cell = %record.name, "record without text, skipping");
                report.skipped += 1;
                continue;
            };

            let Some(cell) = spreadsheet.get_cell(&record.name) else {
                warn!(cell = %record.name, "record names no cell of this grid, skipping");
                report.skipped += 1;
                continue;
            };

            let (row, column) = (cell.row(), cell.column());
            match spreadsheet.set_cell_text(row, column, &text) {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    warn!(cell = %record.name, error = %e, "could not apply record");
                    report.skipped += 1;
                }
            }
        }

        debug!(applied = report.applied, skipped = report.skipped, "read sheet document");
        Ok(report)
    }

    #[instrument(level = "debug", skip(spreadsheet))]
    pub fn save_spreadsheet(spreadsheet: &Spreadsheet, filename: &str) -> Result<String, PersistenceError> {
        let file = File::create(filename)?;
        Self::write_xml(spreadsheet, file)?;
        Ok(filename.to_string())
    }

    #[instrument(level = "debug", skip(spreadsheet))]
    pub fn load_spreadsheet(spreadsheet: &mut Spreadsheet, filename: &str) -> Result<(LoadReport, String), PersistenceError> {
        let file = File::open(filename)?;
        let report = Self::read_xml(spreadsheet, BufReader::new(file))?;
        Ok((report, filename.to_string()))
    }

    /// Reads a document into a fresh grid of the given size.
    pub fn open(filename: &str, rows: usize, columns: usize) -> Result<(Spreadsheet, LoadReport), PersistenceError> {
        let content = fs::read_to_string(filename)?;
        let mut spreadsheet = Spreadsheet::new(rows, columns);
        let report = Self::read_xml(&mut spreadsheet, content.as_bytes())?;
        Ok((spreadsheet, report))
    }
}
