use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// The two social platforms an export can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "FB")]
    Facebook,
    #[serde(rename = "IG")]
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Facebook, Platform::Instagram];

    /// Short code used in file names and rule keys (`FB` / `IG`).
    pub fn code(self) -> &'static str {
        match self {
            Platform::Facebook => "FB",
            Platform::Instagram => "IG",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of a sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell after load-time coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
    Missing,
}

impl CellValue {
    /// Numeric view of the cell. Text is parsed leniently so that columns
    /// which were never coerced at load time can still feed a chart.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{v}")
                }
            }
            CellValue::Timestamp(ts) => {
                if ts.time() == NaiveTime::MIN {
                    write!(f, "{}", ts.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Missing => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – one sheet of a workbook
// ---------------------------------------------------------------------------

/// A sheet with unique, ordered column names and row-major cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// Every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, padding or truncating rows to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Missing);
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Mutable access used by the loader's coercion pass.
    pub fn column_mut(&mut self, name: &str) -> Option<impl Iterator<Item = &mut CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter_mut().map(move |row| &mut row[idx]))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – both workbooks
// ---------------------------------------------------------------------------

/// Sheets of one workbook, in workbook order.
pub type Workbook = IndexMap<String, Table>;

/// Both loaded workbooks. Built once at start-up and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub facebook: Workbook,
    pub instagram: Workbook,
}

impl Dataset {
    pub fn new(facebook: Workbook, instagram: Workbook) -> Self {
        Dataset {
            facebook,
            instagram,
        }
    }

    pub fn workbook(&self, platform: Platform) -> &Workbook {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Instagram => &self.instagram,
        }
    }

    pub fn table(&self, platform: Platform, sheet: &str) -> Option<&Table> {
        self.workbook(platform).get(sheet)
    }

    /// Sheet names for a platform, in workbook order.
    pub fn sheet_names(&self, platform: Platform) -> Vec<String> {
        self.workbook(platform).keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.facebook.is_empty() && self.instagram.is_empty()
    }
}
