//! Measurement table scraping
//!
//! The measurement details page holds a table shaped like
//!
//! ```html
//! <table>
//!   <thead><tr><th>Time</th><th>Temperature</th><th>Humidity</th></tr></thead>
//!   <tbody>
//!     <tr><td>10.03.2024 12:30</td><td>12.3 C</td><td>55%</td></tr>
//!     ...
//!   </tbody>
//! </table>
//! ```
//!
//! with the newest row first. The HTML is reduced to owned strings right
//! away so the parsed document never outlives the call.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::trace;

use crate::error::{HistoryError, HistoryResult};
use crate::units::{extract_value_unit, parse_number, strip_suffix_chars, unit_suffix_len};

fn selector(cell: &'static OnceLock<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("static selector is valid"))
}

fn table_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "table")
}

fn thead_header_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "thead th")
}

fn any_header_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "th")
}

fn body_row_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "tbody tr")
}

fn data_cell_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "td")
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Values of one column, typed by whether they were parsed as numbers
#[derive(Debug, Clone, PartialEq)]
pub enum Readings {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Readings {
    pub fn len(&self) -> usize {
        match self {
            Readings::Numeric(values) => values.len(),
            Readings::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Readings::Numeric(values) => Some(values.as_slice()),
            Readings::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Readings::Text(values) => Some(values.as_slice()),
            Readings::Numeric(_) => None,
        }
    }
}

/// Header names and body cell texts of a measurement table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementTable {
    pub headers: Vec<String>,
    /// Body rows, newest first
    pub rows: Vec<Vec<String>>,
}

impl MeasurementTable {
    /// Extract the first `<table>` of an HTML page, if there is one
    pub fn first_in_html(html: &str) -> Option<Self> {
        let document = Html::parse_document(html);
        let table = document.select(table_selector()).next()?;

        let mut headers: Vec<String> = table
            .select(thead_header_selector())
            .map(cell_text)
            .collect();
        if headers.is_empty() {
            headers = table.select(any_header_selector()).map(cell_text).collect();
        }

        // Header-only rows have no <td> and are skipped
        let rows: Vec<Vec<String>> = table
            .select(body_row_selector())
            .map(|row| {
                row.select(data_cell_selector())
                    .map(cell_text)
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect();

        trace!(headers = ?headers, rows = rows.len(), "Parsed measurement table");
        Some(Self { headers, rows })
    }

    /// Zero-based index of the first header exactly matching `column_name`
    pub fn column_position(&self, column_name: &str) -> HistoryResult<usize> {
        self.headers
            .iter()
            .position(|header| header == column_name)
            .ok_or_else(|| HistoryError::ColumnNotFound {
                column: column_name.to_string(),
                available: self.headers.clone(),
            })
    }

    /// Cell texts of one column, top to bottom
    fn column_cells(&self, column: usize) -> HistoryResult<Vec<&str>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .get(column)
                    .map(String::as_str)
                    .ok_or(HistoryError::MissingCell { row, column })
            })
            .collect()
    }

    /// Values of the column at `column` with the unit suffix stripped
    ///
    /// The first cell decides how many trailing characters make up the unit;
    /// that many characters are cut from every cell. With `numeric` set the
    /// remainders are parsed as numbers. An empty body yields no readings and
    /// an empty unit.
    pub fn column_values(
        &self,
        column: usize,
        numeric: bool,
    ) -> HistoryResult<(Readings, String)> {
        let cells = self.column_cells(column)?;

        let Some(first) = cells.first() else {
            let empty = if numeric {
                Readings::Numeric(Vec::new())
            } else {
                Readings::Text(Vec::new())
            };
            return Ok((empty, String::new()));
        };

        let suffix_len = unit_suffix_len(first)?;
        let (_, unit) = extract_value_unit(first)?;

        let stripped = cells.iter().map(|cell| strip_suffix_chars(cell, suffix_len));
        let readings = if numeric {
            Readings::Numeric(stripped.map(parse_number).collect::<HistoryResult<Vec<_>>>()?)
        } else {
            Readings::Text(stripped.map(|s| s.trim().to_string()).collect())
        };

        Ok((readings, unit))
    }

    /// Locate `column_name` and return its values and unit
    pub fn measurements(
        &self,
        column_name: &str,
        numeric: bool,
    ) -> HistoryResult<(Readings, String)> {
        let column = self.column_position(column_name)?;
        self.column_values(column, numeric)
    }
}
