use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Dataset, Platform, Table, Workbook};
use crate::config::Config;

// ---------------------------------------------------------------------------
// Per-sheet preparation tables
// ---------------------------------------------------------------------------

/// Instagram exports name their columns differently per sheet; these renames
/// bring them onto the vocabulary the dashboard uses.
const IG_RENAMES: &[(&str, &[(&str, &str)])] = &[
    (
        "圖文",
        &[
            ("類別", "分類"),
            ("發布日期", "張貼日期"),
            ("發布時間", "張貼時間"),
            ("發布時", "發布小時"),
            ("永久連結", "發布網址"),
            ("觸及人數", "觸及數量"),
            ("按讚數", "按讚數量"),
            ("分享", "分享數量"),
            ("留言數", "留言數量"),
            ("分享率", "分享率別"),
        ],
    ),
    (
        "限時動態",
        &[
            ("期間（秒）", "動態時間"),
            ("發布日期", "張貼日期"),
            ("發布時間", "張貼時間"),
            ("發布時", "發布小時"),
            ("觸及人數", "觸及數量"),
            ("按讚數", "按讚數量"),
            ("分享", "分享數量"),
            ("分享率", "分享率別"),
        ],
    ),
];

const FB_NUMERIC: &[(&str, &[&str])] = &[
    ("貼文", &["觸及人數", "總點擊次數", "連結點擊次數", "心情", "留言", "分享"]),
    ("影片", &["心情", "影片觀看 3 秒以上的次數", "觸及人數", "留言", "分享"]),
];

const IG_NUMERIC: &[(&str, &[&str])] = &[(
    "圖文",
    &["觸及數量", "按讚數量", "分享數量", "留言數量", "珍藏次數", "分享率別"],
)];

const FB_DATE_COLUMN: &str = "發布日期";
const IG_DATE_COLUMN: &str = "張貼日期";

fn lookup<'a, T>(table: &'a [(&str, T)], sheet: &str) -> Option<&'a T> {
    table.iter().find(|(name, _)| *name == sheet).map(|(_, v)| v)
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load both workbooks named by `config`.
///
/// Never fails: any problem is logged and an empty [`Dataset`] is returned so
/// the dashboard still opens.
pub fn load_dataset(config: &Config) -> Dataset {
    match try_load_dataset(config) {
        Ok(dataset) => {
            for platform in Platform::ALL {
                let workbook = dataset.workbook(platform);
                log::info!("Loaded {} sheets for {platform}", workbook.len());
                for (sheet, table) in workbook {
                    log::debug!("  {sheet}: {} rows, {} columns", table.len(), table.columns.len());
                }
            }
            dataset
        }
        Err(e) => {
            log::error!("Failed to load data: {e:#}");
            Dataset::default()
        }
    }
}

/// Fallible part of [`load_dataset`].
pub fn try_load_dataset(config: &Config) -> Result<Dataset> {
    let fb_path = config.fb_path();
    let ig_path = config.ig_path();
    if !fb_path.exists() || !ig_path.exists() {
        bail!(
            "data files not found (expected {} and {})",
            fb_path.display(),
            ig_path.display()
        );
    }

    let mut facebook = load_workbook(&fb_path)
        .with_context(|| format!("loading {}", fb_path.display()))?;
    let mut instagram = load_workbook(&ig_path)
        .with_context(|| format!("loading {}", ig_path.display()))?;

    prepare_facebook(&mut facebook);
    prepare_instagram(&mut instagram);

    Ok(Dataset::new(facebook, instagram))
}

/// Read every sheet of a workbook (xlsx, xls, xlsb or ods). The first row of
/// each sheet is taken as the header.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let mut sheets = Workbook::new();

    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("reading sheet '{name}'"))?;
        sheets.insert(name, range_to_table(&range));
    }

    Ok(sheets)
}

// ---------------------------------------------------------------------------
// Platform-specific preparation
// ---------------------------------------------------------------------------

fn prepare_facebook(workbook: &mut Workbook) {
    for (sheet, table) in workbook.iter_mut() {
        if let Some(columns) = lookup(FB_NUMERIC, sheet) {
            for column in *columns {
                coerce_numeric(table, column);
            }
        }
        coerce_date(table, FB_DATE_COLUMN);
    }
}

fn prepare_instagram(workbook: &mut Workbook) {
    for (sheet, table) in workbook.iter_mut() {
        if let Some(renames) = lookup(IG_RENAMES, sheet) {
            for (from, to) in *renames {
                table.rename_column(from, to);
            }
            // A rename can land on a name the export already uses.
            table.columns = unique_headers(std::mem::take(&mut table.columns));
        }
        if let Some(columns) = lookup(IG_NUMERIC, sheet) {
            for column in *columns {
                coerce_numeric(table, column);
            }
        }
        coerce_date(table, IG_DATE_COLUMN);
    }
}

/// Turn every cell of `column` into a number; anything unparseable becomes
/// [`CellValue::Missing`]. Absent columns are skipped.
pub fn coerce_numeric(table: &mut Table, column: &str) {
    let Some(cells) = table.column_mut(column) else {
        return;
    };
    for cell in cells {
        *cell = match cell.as_f64() {
            Some(v) => CellValue::Number(v),
            None => CellValue::Missing,
        };
    }
}

/// Turn every cell of `column` into a timestamp; anything unparseable becomes
/// [`CellValue::Missing`]. Absent columns are skipped.
pub fn coerce_date(table: &mut Table, column: &str) {
    let Some(cells) = table.column_mut(column) else {
        return;
    };
    for cell in cells {
        let parsed = match cell {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Number(serial) => excel_serial_to_datetime(*serial),
            CellValue::Text(s) => parse_datetime_text(s),
            CellValue::Missing => None,
        };
        *cell = parsed.map_or(CellValue::Missing, CellValue::Timestamp);
    }
}

// ---------------------------------------------------------------------------
// calamine → Table
// ---------------------------------------------------------------------------

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = unique_headers(header.iter().map(|d| d.to_string()).collect());
    let body = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    Table::new(columns, body)
}

/// Blank headers become `Unnamed: i`; repeats get `.1`, `.2`, … suffixes.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::String(s) if s.trim().is_empty() => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if serial < 1.0 {
                // Time-of-day only: keep it readable as a category label.
                match excel_serial_to_datetime(serial) {
                    Some(ts) => CellValue::Text(ts.format("%H:%M:%S").to_string()),
                    None => CellValue::Missing,
                }
            } else {
                excel_serial_to_datetime(serial).map_or(CellValue::Missing, CellValue::Timestamp)
            }
        }
        Data::DateTimeIso(s) => {
            parse_datetime_text(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Timestamp)
        }
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// Excel stores dates as days since 1899-12-30.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y.%m.%d"];

/// Parse the date and date-time layouts found in platform exports.
pub fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
