//! Application state for a session on one spreadsheet.
//!
//! [`App`] plays the display side of the grid: it forwards user edits to the
//! [`Spreadsheet`] and keeps a mirror of rendered values that is updated only
//! from the [`CellChanged`] notifications the grid hands back.

use crate::domain::{CellChanged, DomainError, DomainResult, Spreadsheet};
use crate::infrastructure::{LoadReport, PersistenceError};
use tracing::debug;

/// Main application state containing the spreadsheet and what is shown for it.
///
/// # Examples
///
/// ```
/// use cellgrid::application::App;
///
/// let mut app = App::new(10, 5);
/// app.edit_cell("B1", "hello").unwrap();
/// app.edit_cell("A1", "=B1").unwrap();
/// assert_eq!(app.displayed(0, 0), "hello");
/// ```
#[derive(Debug)]
pub struct App {
    /// The spreadsheet data structure
    pub spreadsheet: Spreadsheet,
    /// Rendered value of every cell, indexed `[row][column]`
    pub display: Vec<Vec<String>>,
    /// Current filename (if file has been saved/loaded)
    pub filename: Option<String>,
    /// Temporary status message to display
    pub status_message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::with_spreadsheet(Spreadsheet::default())
    }
}

impl App {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_spreadsheet(Spreadsheet::new(rows, columns))
    }

    pub fn with_spreadsheet(spreadsheet: Spreadsheet) -> Self {
        let mut app = Self {
            display: Vec::new(),
            spreadsheet,
            filename: None,
            status_message: None,
        };
        app.refresh_display();
        app
    }

    /// Rendered value at `(row, column)`, or `""` outside the grid.
    pub fn displayed(&self, row: usize, column: usize) -> &str {
        self.display
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    /// Sets the text of the cell named `address` and redraws it if its value changed.
    pub fn edit_cell(&mut self, address: &str, text: &str) -> DomainResult<()> {
        let cell = self
            .spreadsheet
            .get_cell(address)
            .ok_or_else(|| DomainError::InvalidCellReference(address.to_string()))?;
        let (row, column) = (cell.row(), cell.column());

        if let Some(change) = self.spreadsheet.set_cell_text(row, column, text)? {
            self.on_cell_changed(change);
        }
        Ok(())
    }

    /// Empties the cell named `address`.
    ///
    /// The grid does not notify for empty text, so the mirror is refreshed
    /// from the cell directly.
    pub fn clear_cell(&mut self, address: &str) -> DomainResult<()> {
        self.edit_cell(address, "")?;
        if let Some(cell) = self.spreadsheet.get_cell(address) {
            let (row, column) = (cell.row(), cell.column());
            self.display[row][column].clear();
        }
        Ok(())
    }

    /// Empties every cell and the mirror with it.
    pub fn clear_all(&mut self) {
        self.spreadsheet.clear();
        self.refresh_display();
    }

    /// Applies a change notification to the mirror.
    pub fn on_cell_changed(&mut self, change: CellChanged) {
        debug!(cell = %change.name, "redrawing");
        if let Some(slot) = self
            .display
            .get_mut(change.row)
            .and_then(|cells| cells.get_mut(change.column))
        {
            *slot = change.value;
        }
    }

    /// Rebuilds the whole mirror from the grid's current values.
    pub fn refresh_display(&mut self) {
        let columns = self.spreadsheet.column_count();
        let mut display = vec![vec![String::new(); columns]; self.spreadsheet.row_count()];
        for cell in self.spreadsheet.cells() {
            display[cell.row()][cell.column()] = cell.value().to_string();
        }
        self.display = display;
    }

    /// Fills the sheet with sample content: column B holds text and column A
    /// references the B cell of the same row.
    pub fn fill_demo(&mut self) -> DomainResult<()> {
        for row in 0..self.spreadsheet.row_count() {
            if self.spreadsheet.column_count() < 2 {
                break;
            }
            let number = row + 1;
            self.edit_cell(&format!("B{number}"), &format!("This is cell B{number}"))?;
            self.edit_cell(&format!("A{number}"), &format!("=B{number}"))?;
        }
        Ok(())
    }

    /// Processes the result of a save operation.
    pub fn set_save_result(&mut self, result: Result<String, PersistenceError>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Saved to {}", filename));
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }
    }

    /// Processes the result of a load operation and redraws every cell.
    ///
    /// Loading applies records onto the current grid, so callers normally
    /// clear it first with [`App::clear_all`].
    pub fn set_load_result(&mut self, result: Result<(LoadReport, String), PersistenceError>) {
        match result {
            Ok((report, filename)) => {
                self.status_message = Some(if report.skipped == 0 {
                    format!("Loaded {} cells from {}", report.applied, filename)
                } else {
                    format!(
                        "Loaded {} cells from {} ({} skipped)",
                        report.applied, filename, report.skipped
                    )
                });
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Load failed: {}", error));
            }
        }
        self.refresh_display();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert_eq!(app.display.len(), 50);
        assert_eq!(app.display[0].len(), 26);
        assert!(app.filename.is_none());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_edit_cell_updates_display() {
        let mut app = App::new(5, 5);
        app.edit_cell("C2", "value").unwrap();
        assert_eq!(app.displayed(1, 2), "value");
        assert_eq!(app.displayed(9, 9), "");
    }

    #[test]
    fn test_edit_cell_invalid_address() {
        let mut app = App::new(5, 5);
        assert_eq!(
            app.edit_cell("F1", "x"),
            Err(DomainError::InvalidCellReference("F1".to_string()))
        );
    }

    #[test]
    fn test_clear_cell_updates_display() {
        let mut app = App::new(5, 5);
        app.edit_cell("A1", "x").unwrap();
        app.clear_cell("A1").unwrap();
        assert_eq!(app.displayed(0, 0), "");
        assert!(app.spreadsheet.get_cell("A1").unwrap().is_blank());
    }

    #[test]
    fn test_clear_all() {
        let mut app = App::new(5, 5);
        app.edit_cell("A1", "x").unwrap();
        app.edit_cell("E5", "y").unwrap();
        app.clear_all();
        assert!(app.display.iter().flatten().all(String::is_empty));
    }

    #[test]
    fn test_fill_demo() {
        let mut app = App::new(4, 3);
        app.fill_demo().unwrap();
        for row in 0..4 {
            let expected = format!("This is cell B{}", row + 1);
            assert_eq!(app.displayed(row, 1), expected);
            assert_eq!(app.displayed(row, 0), expected);
        }
        assert_eq!(app.spreadsheet.get_cell("A3").unwrap().text(), "=B3");
    }

    #[test]
    fn test_set_save_result() {
        let mut app = App::default();
        app.set_save_result(Ok("sheet.xml".to_string()));
        assert_eq!(app.filename.as_deref(), Some("sheet.xml"));
        assert_eq!(app.status_message.as_deref(), Some("Saved to sheet.xml"));

        let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        app.set_save_result(Err(error.into()));
        assert!(app.status_message.unwrap().starts_with("Save failed"));
        assert_eq!(app.filename.as_deref(), Some("sheet.xml"));
    }

    #[test]
    fn test_set_load_result_refreshes_display() {
        let mut app = App::new(3, 3);
        app.spreadsheet.set_text("B2", "loaded").unwrap();

        let report = LoadReport { applied: 1, skipped: 1 };
        app.set_load_result(Ok((report, "in.xml".to_string())));
        assert_eq!(app.displayed(1, 1), "loaded");
        assert_eq!(
            app.status_message.as_deref(),
            Some("Loaded 1 cells from in.xml (1 skipped)")
        );
    }

    #[test]
    fn test_set_load_result_failure() {
        let mut app = App::default();
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        app.set_load_result(Err(error.into()));
        assert!(app.status_message.unwrap().starts_with("Load failed"));
        assert!(app.filename.is_none());
    }
}
