use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use super::model::{CellValue, RawRow};

/// One worksheet as positional rows of cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// All sheets of a spreadsheet document, in workbook order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Parse an in-memory xlsx/xlsm/xlsb/xls/ods document.
    ///
    /// Sheets that fail to decode are logged and left out.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, calamine::Error> {
        let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let names = reader.sheet_names();

        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            match reader.worksheet_range(&name) {
                Ok(range) => {
                    let rows = range_to_rows(&range);
                    sheets.push(Sheet { name, rows });
                }
                Err(e) => log::warn!("Skipping unreadable sheet '{name}': {e}"),
            }
        }
        Ok(Workbook { sheets })
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Convert a calamine range into rows anchored at A1.
///
/// calamine trims leading empty rows and columns from the used range; they
/// are padded back so column positions match what the user sees.
pub fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let (row0, col0) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<RawRow> = (0..row0).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = Vec::with_capacity(col0 as usize + row.len());
        cells.extend((0..col0).map(|_| CellValue::Empty));
        cells.extend(row.iter().map(cell_value));
        rows.push(cells);
    }
    rows
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Date(ndt.to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
