use serde::{Deserialize, Serialize};

use crate::style::RowStyle;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Integer value, written as a number where the format allows it.
    Number(u64),
    /// Literal text.
    Text(String),
    /// Nothing.
    Empty,
}

impl Cell {
    /// Text cell from anything string-like.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Number cell, or an empty cell when the value is absent.
    pub fn optional_number(value: Option<u64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    /// Literal content as it appears in the artifact.
    pub fn literal(&self) -> String {
        match self {
            Cell::Number(value) => value.to_string(),
            Cell::Text(value) => value.clone(),
            Cell::Empty => String::new(),
        }
    }

    /// Length of the literal content in characters.
    pub fn display_len(&self) -> usize {
        match self {
            Cell::Number(value) => value.to_string().len(),
            Cell::Text(value) => value.chars().count(),
            Cell::Empty => 0,
        }
    }
}

/// One styled row of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values in column order.
    pub cells: Vec<Cell>,
    /// Style shared by every cell in the row.
    pub style: RowStyle,
}

/// A named sheet with rows and computed column widths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name shown on its tab.
    pub name: String,
    /// Rows in insertion order.
    pub rows: Vec<Row>,
    /// Column widths in characters; empty until sized.
    #[serde(default)]
    pub column_widths: Vec<usize>,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// Number of columns spanned by the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }
}

/// Capability required by the report renderer from a tabular backend.
///
/// Rows and sizing always apply to the most recently added sheet.
pub trait TabularWriter {
    /// Starts a new sheet and makes it current.
    fn add_sheet(&mut self, name: &str);
    /// Appends a row to the current sheet.
    fn append_row(&mut self, cells: Vec<Cell>, style: RowStyle);
    /// Sizes every column of the current sheet to its longest literal plus
    /// `padding`, capped at `cap` when one is given.
    fn auto_size_columns(&mut self, padding: usize, cap: Option<usize>);
}

/// In-memory workbook that the encoders serialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    /// Sheets in creation order.
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Creates an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    fn current(&mut self) -> &mut Sheet {
        if self.sheets.is_empty() {
            self.sheets.push(Sheet::new("Sheet1"));
        }
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }
}

impl TabularWriter for Workbook {
    fn add_sheet(&mut self, name: &str) {
        self.sheets.push(Sheet::new(name));
    }

    fn append_row(&mut self, cells: Vec<Cell>, style: RowStyle) {
        self.current().rows.push(Row { cells, style });
    }

    fn auto_size_columns(&mut self, padding: usize, cap: Option<usize>) {
        let sheet = self.current();
        let mut widths = vec![0usize; sheet.column_count()];
        for row in &sheet.rows {
            for (idx, cell) in row.cells.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.display_len());
            }
        }
        sheet.column_widths = widths
            .into_iter()
            .map(|longest| {
                let width = longest + padding;
                cap.map_or(width, |cap| width.min(cap))
            })
            .collect();
    }
}
