use crate::data::model::{CellValue, Dataset, Platform};
use crate::error::{BuildError, ExportError};

/// UTF-8 byte-order mark so spreadsheet apps pick the right encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Table projection
// ---------------------------------------------------------------------------

/// The selected sheet as shown in the data table and written to CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableProjection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableProjection {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        self.rows.len().div_ceil(page_size.max(1)).max(1)
    }

    /// Rows of page `page` (0-based); out-of-range pages are empty.
    pub fn page(&self, page: usize, page_size: usize) -> &[Vec<CellValue>] {
        let page_size = page_size.max(1);
        let start = page.saturating_mul(page_size).min(self.rows.len());
        let end = start.saturating_add(page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

/// Columns and rows of `(platform, sheet)` exactly as loaded.
pub fn project(
    platform: Platform,
    sheet: &str,
    dataset: &Dataset,
) -> Result<TableProjection, BuildError> {
    let table = dataset
        .table(platform, sheet)
        .ok_or_else(|| BuildError::MissingTable {
            platform,
            sheet: sheet.to_string(),
        })?;
    Ok(TableProjection {
        columns: table.columns.clone(),
        rows: table.rows.clone(),
    })
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// A serialised sheet ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn export_file_name(platform: Platform, sheet: &str) -> String {
    format!("{}_{sheet}_data.csv", platform.code())
}

/// Serialise the whole selected sheet: BOM, header, one line per row, no
/// index column. `Ok(None)` when no sheet is selected.
pub fn export_csv(
    dataset: &Dataset,
    platform: Platform,
    sheet: Option<&str>,
) -> Result<Option<CsvExport>, ExportError> {
    let Some(sheet) = sheet else {
        return Ok(None);
    };
    let table = dataset
        .table(platform, sheet)
        .ok_or_else(|| ExportError::MissingTable {
            platform,
            sheet: sheet.to_string(),
        })?;

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;

    Ok(Some(CsvExport {
        file_name: export_file_name(platform, sheet),
        bytes,
    }))
}
