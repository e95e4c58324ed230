//! Column extraction and the small statistics the chart builders need.

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use super::spec::{AxisScale, Bin, BoxStats};
use crate::data::model::{CellValue, Table};
use crate::error::BuildError;

/// Bins used for numeric and time axes of a density heatmap.
pub const HEATMAP_BINS: usize = 20;

fn cells<'a>(
    table: &'a Table,
    column: &str,
) -> Result<impl Iterator<Item = &'a CellValue> + 'a, BuildError> {
    table.column(column).ok_or_else(|| BuildError::MissingColumn {
        column: column.to_string(),
    })
}

/// Numeric view of a column; non-numeric cells are `None`.
pub fn numeric(table: &Table, column: &str) -> Result<Vec<Option<f64>>, BuildError> {
    Ok(cells(table, column)?.map(CellValue::as_f64).collect())
}

/// Display label per row; missing cells are `None`.
pub fn labels(table: &Table, column: &str) -> Result<Vec<Option<String>>, BuildError> {
    Ok(cells(table, column)?
        .map(|cell| (!cell.is_missing()).then(|| cell.to_string()))
        .collect())
}

fn epoch_seconds(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

// ---------------------------------------------------------------------------
// Axis positions
// ---------------------------------------------------------------------------

/// A column mapped onto plot coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Positions {
    pub values: Vec<Option<f64>>,
    pub scale: AxisScale,
}

/// Place a column on an axis.
///
/// Any timestamp makes it a time axis; a column whose present cells are all
/// numeric is linear; anything else is categorical in first-appearance order.
pub fn positions(table: &Table, column: &str) -> Result<Positions, BuildError> {
    let column_cells: Vec<&CellValue> = cells(table, column)?.collect();

    if column_cells
        .iter()
        .any(|c| matches!(c, CellValue::Timestamp(_)))
    {
        let values = column_cells
            .iter()
            .map(|c| match c {
                CellValue::Timestamp(ts) => Some(epoch_seconds(ts)),
                _ => None,
            })
            .collect();
        return Ok(Positions {
            values,
            scale: AxisScale::Time,
        });
    }

    let present = column_cells.iter().filter(|c| !c.is_missing());
    let all_numeric = present.clone().all(|c| c.as_f64().is_some());
    if all_numeric && present.count() > 0 {
        return Ok(Positions {
            values: column_cells.iter().map(|c| c.as_f64()).collect(),
            scale: AxisScale::Linear,
        });
    }

    let mut order: IndexMap<String, usize> = IndexMap::new();
    let values = column_cells
        .iter()
        .map(|c| {
            if c.is_missing() {
                return None;
            }
            let next = order.len();
            Some(*order.entry(c.to_string()).or_insert(next) as f64)
        })
        .collect();
    Ok(Positions {
        values,
        scale: AxisScale::Category(order.into_keys().collect()),
    })
}

/// Row pairs where both coordinates are present, in row order.
pub fn paired(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<[f64; 2]> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect()
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Row indices per label, labels in first-appearance order.
pub fn group_rows(labels: &[Option<String>]) -> IndexMap<String, Vec<usize>> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (row, label) in labels.iter().enumerate() {
        if let Some(label) = label {
            groups.entry(label.clone()).or_default().push(row);
        }
    }
    groups
}

/// Sum of `values` per label; missing values contribute nothing.
pub fn sum_by_label(labels: &[Option<String>], values: &[Option<f64>]) -> Vec<(String, f64)> {
    group_rows(labels)
        .into_iter()
        .map(|(label, rows)| {
            let total = rows.iter().filter_map(|&r| values.get(r).copied().flatten()).sum();
            (label, total)
        })
        .collect()
}

/// Present values per label, labels in first-appearance order.
pub fn values_by_label(
    labels: &[Option<String>],
    values: &[Option<f64>],
) -> Vec<(String, Vec<f64>)> {
    group_rows(labels)
        .into_iter()
        .map(|(label, rows)| {
            let vals = rows.iter().filter_map(|&r| values.get(r).copied().flatten()).collect();
            (label, vals)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub fn min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Box statistics, `None` for an empty sample.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (lo_fence, hi_fence) = (q1 - fence, q3 + fence);

    let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
    let (lower_whisker, upper_whisker) = min_max(inside).unwrap_or((q1, q3));
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// Bins covering an axis: one per category, or `HEATMAP_BINS` equal-width
/// bins over the observed range.
pub fn axis_bins(positions: &Positions) -> Vec<Bin> {
    if let AxisScale::Category(labels) = &positions.scale {
        return labels
            .iter()
            .enumerate()
            .map(|(i, label)| Bin {
                start: i as f64 - 0.5,
                end: i as f64 + 0.5,
                label: label.clone(),
            })
            .collect();
    }

    let Some((lo, hi)) = min_max(positions.values.iter().flatten().copied()) else {
        return Vec::new();
    };
    if hi <= lo {
        return vec![Bin {
            start: lo - 0.5,
            end: hi + 0.5,
            label: format!("{lo}"),
        }];
    }
    let width = (hi - lo) / HEATMAP_BINS as f64;
    (0..HEATMAP_BINS)
        .map(|i| {
            let start = lo + width * i as f64;
            let end = if i + 1 == HEATMAP_BINS { hi } else { start + width };
            Bin {
                start,
                end,
                label: format!("{start:.1}-{end:.1}"),
            }
        })
        .collect()
}

/// Index of the bin holding `value`; the last bin is closed on the right.
pub fn bin_index(bins: &[Bin], value: f64) -> Option<usize> {
    let last = bins.len().checked_sub(1)?;
    bins.iter().position(|b| value >= b.start && value < b.end).or_else(|| {
        (value == bins[last].end).then_some(last)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue::{Missing, Number, Text};

    fn table() -> Table {
        Table::new(
            vec!["label".into(), "n".into(), "mixed".into()],
            vec![
                vec![Text("b".into()), Number(1.0), Text("x".into())],
                vec![Text("a".into()), Missing, Number(2.0)],
                vec![Text("b".into()), Number(3.0), Missing],
            ],
        )
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = numeric(&table(), "nope").unwrap_err();
        assert_eq!(err.to_string(), "column 'nope' not found");
    }

    #[test]
    fn positions_pick_scale_from_contents() {
        let t = table();
        let n = positions(&t, "n").unwrap();
        assert_eq!(n.scale, AxisScale::Linear);
        assert_eq!(n.values, vec![Some(1.0), None, Some(3.0)]);

        let label = positions(&t, "label").unwrap();
        assert_eq!(
            label.scale,
            AxisScale::Category(vec!["b".to_string(), "a".to_string()])
        );
        assert_eq!(label.values, vec![Some(0.0), Some(1.0), Some(0.0)]);

        let mixed = positions(&t, "mixed").unwrap();
        assert!(matches!(mixed.scale, AxisScale::Category(_)));
    }

    #[test]
    fn sums_skip_missing_values() {
        let t = table();
        let sums = sum_by_label(&labels(&t, "label").unwrap(), &numeric(&t, "n").unwrap());
        assert_eq!(sums, vec![("b".to_string(), 4.0), ("a".to_string(), 0.0)]);
    }

    #[test]
    fn box_stats_use_linear_quartiles_and_flag_outliers() {
        let stats = box_stats(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn bins_cover_the_full_range() {
        let p = Positions {
            values: vec![Some(0.0), Some(10.0), None],
            scale: AxisScale::Linear,
        };
        let bins = axis_bins(&p);
        assert_eq!(bins.len(), HEATMAP_BINS);
        assert_eq!(bin_index(&bins, 0.0), Some(0));
        assert_eq!(bin_index(&bins, 10.0), Some(HEATMAP_BINS - 1));
        assert_eq!(bin_index(&bins, 11.0), None);
    }
}
