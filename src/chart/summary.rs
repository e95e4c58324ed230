use super::spec::{Background, ChartKind, ChartSpec, Margin, PieSlice, TitleAlign, Trace};
use crate::data::model::{Platform, Table};
use crate::data::transform::{top_n_with_other, value_counts};
use crate::rules::rule_for;

/// Categories shown individually before the rest is folded into "other".
pub const TOP_CATEGORIES: usize = 10;

const PIE_TITLE: &str = "各類別所占比例（前十名）";
const NO_CATEGORY: &str = "影片、限動沒有類別";
const PIE_MARGIN: Margin = Margin::new(20, 20, 40, 20);

/// Category breakdown for the side panel.
///
/// * no sheet → empty spec
/// * sheet types without a category column → placeholder message
/// * otherwise a pie of the top categories plus an "other" slice
pub fn summarize(platform: Platform, sheet: Option<&str>, table: Option<&Table>) -> ChartSpec {
    let Some(sheet) = sheet else {
        return ChartSpec::empty();
    };
    let placeholder = || transparent(ChartSpec::placeholder(NO_CATEGORY));

    let Some(column) = rule_for(platform, sheet).and_then(|rule| rule.kind.category_column())
    else {
        return placeholder();
    };
    let Some(cells) = table.and_then(|t| t.column(column)) else {
        log::warn!("{platform}/{sheet}: no '{column}' column for the category breakdown");
        return placeholder();
    };

    let slices = top_n_with_other(value_counts(cells), TOP_CATEGORIES)
        .into_iter()
        .map(|(label, count)| PieSlice {
            label,
            value: count as f64,
        })
        .collect();

    let mut spec = ChartSpec::new(ChartKind::Pie, PIE_TITLE).with_color_by(column);
    spec.layout.title_align = TitleAlign::Center;
    spec.layout.margin = Some(PIE_MARGIN);
    spec.layout.show_legend = true;
    transparent(spec.with_trace(Trace::Pie { slices }))
}

fn transparent(mut spec: ChartSpec) -> ChartSpec {
    spec.layout.background = Background::Transparent;
    spec
}
