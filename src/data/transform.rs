use indexmap::IndexMap;

use super::model::CellValue;

// ---------------------------------------------------------------------------
// Display transforms: label shortening and category ranking
// ---------------------------------------------------------------------------

/// Category labels are cut to this many characters before grouping.
pub const CATEGORY_LABEL_CHARS: usize = 5;

/// Label of the synthetic bucket collecting everything past the top N.
pub const OTHER_LABEL: &str = "其他";

/// First `max_chars` characters of `label`.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    label.chars().take(max_chars).collect()
}

/// Truncated display label per cell, `None` for missing cells.
///
/// The source cells are only read; grouping works on the returned labels.
pub fn truncated_labels<'a>(
    cells: impl Iterator<Item = &'a CellValue>,
    max_chars: usize,
) -> Vec<Option<String>> {
    cells
        .map(|cell| match cell {
            CellValue::Missing => None,
            other => Some(truncate_label(&other.to_string(), max_chars)),
        })
        .collect()
}

/// Count occurrences of each non-missing value, sorted by count descending.
///
/// Equal counts keep the order in which the values first appear.
pub fn value_counts<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Vec<(String, u64)> {
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for cell in cells {
        if cell.is_missing() {
            continue;
        }
        *counts.entry(cell.to_string()).or_default() += 1;
    }
    let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
    // `sort_by` is stable, so first-appearance order survives among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Keep the first `n` entries and fold the remainder into one [`OTHER_LABEL`]
/// entry holding their summed count. Input must already be ranked.
pub fn top_n_with_other(ranked: Vec<(String, u64)>, n: usize) -> Vec<(String, u64)> {
    if ranked.len() <= n {
        return ranked;
    }
    let mut ranked = ranked;
    let rest: u64 = ranked.drain(n..).map(|(_, count)| count).sum();
    ranked.push((OTHER_LABEL.to_string(), rest));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_label("生活小知識分享", 5), "生活小知識");
        assert_eq!(truncate_label("abc", 5), "abc");
        assert_eq!(truncate_label("", 5), "");
    }

    #[test]
    fn truncated_labels_leave_missing_cells_out() {
        let cells = vec![text("Announcements"), CellValue::Missing, CellValue::Number(3.0)];
        let labels = truncated_labels(cells.iter(), CATEGORY_LABEL_CHARS);
        assert_eq!(
            labels,
            vec![Some("Annou".to_string()), None, Some("3".to_string())]
        );
        // source untouched
        assert_eq!(cells[0], text("Announcements"));
    }

    #[test]
    fn value_counts_ranks_and_keeps_first_seen_order_on_ties() {
        let cells = vec![text("b"), text("a"), text("a"), text("c"), CellValue::Missing, text("b"), text("d")];
        let counts = value_counts(cells.iter());
        assert_eq!(
            counts,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn eleven_categories_fold_the_tail_into_other() {
        let mut cells = Vec::new();
        cells.extend(std::iter::repeat(text("A")).take(12));
        cells.extend(std::iter::repeat(text("B")).take(9));
        for label in ["C", "D", "E", "F", "G", "H", "I", "J", "K"] {
            cells.push(text(label));
        }

        let summary = top_n_with_other(value_counts(cells.iter()), 10);

        assert_eq!(summary.len(), 11);
        assert_eq!(summary[0], ("A".to_string(), 12));
        assert_eq!(summary[1], ("B".to_string(), 9));
        for (label, count) in &summary[2..10] {
            assert_eq!(*count, 1, "{label} should keep its own count");
        }
        assert_eq!(summary[10], (OTHER_LABEL.to_string(), 1));
    }

    #[test]
    fn short_rankings_pass_through() {
        let ranked = vec![("x".to_string(), 3), ("y".to_string(), 1)];
        assert_eq!(top_n_with_other(ranked.clone(), 10), ranked);
    }
}
