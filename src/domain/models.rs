use tracing::debug;
use super::column::{column_name, column_number};
use super::errors::{DomainError, DomainResult};

/// A single addressable cell holding user text and its derived value.
///
/// The name is fixed at construction from the coordinates, e.g. row 0,
/// column 1 is `B1`. Text is only changed through [`Spreadsheet`], which
/// recomputes the value as part of the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    row: usize,
    column: usize,
    name: String,
    text: String,
    value: String,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            name: format!("{}{}", column_name(column + 1), row + 1),
            text: String::new(),
            value: String::new(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text as entered by the user.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The value derived from the text, suitable for display.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.value.is_empty()
    }

    /// Returns `false` without touching anything when `text` is unchanged.
    fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        true
    }
}

/// Notification that a cell's value was recomputed and should be redrawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChanged {
    pub row: usize,
    pub column: usize,
    pub name: String,
    pub value: String,
}

impl CellChanged {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            row: cell.row,
            column: cell.column,
            name: cell.name.clone(),
            value: cell.value.clone(),
        }
    }
}

/// A fixed-size grid of cells.
///
/// Setting a cell's text resolves its value immediately:
///
/// - empty text gives an empty value and no notification;
/// - text of the form `=<letter><row>` copies the referenced cell's *text*
///   one hop deep, falling back to the formula itself when the reference
///   does not resolve;
/// - any other text is its own value.
///
/// Values are not recomputed when a referenced cell changes later.
///
/// # Examples
///
/// ```
/// use cellgrid::domain::Spreadsheet;
///
/// let mut sheet = Spreadsheet::new(10, 26);
/// sheet.set_text("B1", "hello").unwrap();
/// let change = sheet.set_text("A1", "=B1").unwrap().unwrap();
/// assert_eq!(change.value, "hello");
/// ```
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROWS, Self::DEFAULT_COLUMNS)
    }
}

impl Spreadsheet {
    pub const DEFAULT_ROWS: usize = 50;
    pub const DEFAULT_COLUMNS: usize = 26;

    pub fn new(rows: usize, columns: usize) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| Cell::new(row, column)))
            .collect();
        Self { rows, columns, cells }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.index(row, column).map(|index| &self.cells[index])
    }

    /// Looks up a cell by its name, e.g. `C12`.
    ///
    /// The name is a run of letters naming the column followed by a 1-based
    /// row number. Returns `None` for malformed names and for coordinates
    /// outside the grid.
    pub fn get_cell(&self, address: &str) -> Option<&Cell> {
        let (row, column) = Self::parse_cell_reference(address)?;
        self.cell(row, column)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Parses a cell name into zero-based `(row, column)` coordinates without
    /// checking them against any grid.
    pub fn parse_cell_reference(address: &str) -> Option<(usize, usize)> {
        let split = address.find(|ch: char| !ch.is_ascii_alphabetic())?;
        let (letters, digits) = address.split_at(split);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let column = column_number(letters)? - 1;
        let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
        Some((row, column))
    }

    /// Sets the text of the cell named `address`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCellReference`] when `address` does not
    /// name a cell of this grid.
    pub fn set_text(&mut self, address: &str, text: &str) -> DomainResult<Option<CellChanged>> {
        let (row, column) = Self::parse_cell_reference(address)
            .ok_or_else(|| DomainError::InvalidCellReference(address.to_string()))?;
        self.set_cell_text(row, column, text)
    }

    /// Sets the text of the cell at `(row, column)` and recomputes its value.
    ///
    /// Returns the change notification for the display layer, or `None` when
    /// the text was unchanged or became empty.
    pub fn set_cell_text(
        &mut self,
        row: usize,
        column: usize,
        text: &str,
    ) -> DomainResult<Option<CellChanged>> {
        let index = self.index(row, column).ok_or_else(|| {
            DomainError::InvalidCellReference(format!("row {}, column {}", row + 1, column + 1))
        })?;

        if !self.cells[index].set_text(text) {
            return Ok(None);
        }
        Ok(self.propagate(index))
    }

    /// Empties the text of one cell.
    pub fn clear_cell(&mut self, row: usize, column: usize) -> DomainResult<Option<CellChanged>> {
        self.set_cell_text(row, column, "")
    }

    /// Empties every cell that has text or a value.
    pub fn clear(&mut self) {
        for index in 0..self.cells.len() {
            if !self.cells[index].is_blank() && self.cells[index].set_text("") {
                self.propagate(index);
            }
        }
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then(|| row * self.columns + column)
    }

    fn propagate(&mut self, index: usize) -> Option<CellChanged> {
        let text = self.cells[index].text.clone();
        if text.is_empty() {
            self.cells[index].value.clear();
            return None;
        }

        let resolved = text
            .strip_prefix('=')
            .map(|reference| self.resolve_reference(reference).map(|target| target.text.clone()));
        let value = match resolved {
            Some(Some(target_text)) => target_text,
            Some(None) => {
                debug!(formula = %text, "unresolved reference, keeping formula text");
                text
            }
            None => text,
        };

        let cell = &mut self.cells[index];
        cell.value = value;
        debug!(cell = %cell.name, value = %cell.value, "value changed");
        Some(CellChanged::from_cell(cell))
    }

    /// Resolves the body of a formula: one column letter then a row number.
    fn resolve_reference(&self, reference: &str) -> Option<&Cell> {
        let mut chars = reference.chars();
        let letter = chars.next().filter(char::is_ascii_alphabetic)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let column = column_number(letter.encode_utf8(&mut [0; 4]))? - 1;
        let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
        self.cell(row, column)
    }
}
