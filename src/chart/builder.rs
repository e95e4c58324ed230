use super::series::{
    axis_bins, bin_index, box_stats, labels, min_max, numeric, paired, positions, sum_by_label,
    values_by_label,
};
use super::spec::{AxisScale, BarDatum, BoxDatum, ChartKind, ChartSpec, HeatmapData, Rgb, Trace};
use crate::data::model::{Platform, Table};
use crate::data::transform::{CATEGORY_LABEL_CHARS, truncated_labels};
use crate::error::BuildError;
use crate::rules::rule_for;

/// The four axis selections feeding the builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Axes<'a> {
    pub x1: Option<&'a str>,
    pub y1: Option<&'a str>,
    pub x2: Option<&'a str>,
    pub y2: Option<&'a str>,
}

const MOOD: &str = "心情";
const FB_POST_DATE: &str = "發布日期";
const FB_POST_TIME: &str = "發布時間";
const FB_CATEGORY: &str = "類別";
const IG_HOUR: &str = "發布小時";
const IG_CATEGORY: &str = "分類";
const IG_POST_TIME: &str = "張貼時間";
const IG_REACH: &str = "觸及數量";

const VIDEO_X_RANGE: [f64; 2] = [0.0, 600.0];
const VIDEO_ENGAGEMENT_RANGE: [f64; 2] = [0.0, 600.0];
const VIDEO_VIEWS_RANGE: [f64; 2] = [0.0, 40_000.0];

const FB_STORY_PLACEHOLDER: &str = "無特殊交互事項";
const IG_POST_PLACEHOLDER: &str = "沒有需要交互的項目";

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Build the primary and secondary chart for a sheet.
///
/// Unsupported sheets and unmatched axis values give [`ChartKind::Empty`]
/// specs. A missing column is an error; the caller decides how to show it.
/// Both specs go through [`ChartSpec::finalize`].
pub fn build(
    platform: Platform,
    sheet: &str,
    table: &Table,
    axes: &Axes<'_>,
) -> Result<(ChartSpec, ChartSpec), BuildError> {
    let (primary, secondary) = match rule_for(platform, sheet) {
        Some(rule) => (rule.build)(table, axes)?,
        None => (ChartSpec::empty(), ChartSpec::empty()),
    };
    Ok((primary.finalize(), secondary.finalize()))
}

// ---------------------------------------------------------------------------
// Per-sheet branches
// ---------------------------------------------------------------------------

pub fn fb_post(table: &Table, axes: &Axes<'_>) -> Result<(ChartSpec, ChartSpec), BuildError> {
    let primary = match (axes.x1, axes.y1) {
        (Some(x @ FB_POST_DATE), Some(y)) => line(table, x, y, format!("{y}趨勢圖"))?,
        (Some(x @ FB_POST_TIME), Some(y)) => {
            grouped_sums(ChartKind::Histogram, table, x, y, format!("{x}與{y}分布"))?
        }
        (Some(x @ FB_CATEGORY), Some(y)) => {
            category_bars(table, x, y, format!("{y}的類別分布"))?
        }
        _ => ChartSpec::empty(),
    };

    let secondary = match (axes.x2, axes.y2) {
        (Some(x @ MOOD), Some(y)) => {
            let spec = scatter(table, x, y, format!("{x}與{y}關係"))?;
            with_diagonal(spec, table, x)?
        }
        (Some(x @ FB_POST_TIME), Some(y)) => {
            density_heatmap(table, x, y, format!("{x}與{y}分布熱力圖"))?
        }
        (Some(x @ FB_CATEGORY), Some(y)) => {
            category_boxes(table, x, y, format!("{y}的類別分布"))?
        }
        _ => ChartSpec::empty(),
    };

    Ok((primary, secondary))
}

/// Video: mood scatter with fixed ranges, then a time histogram. The x
/// selectors are fixed and therefore ignored.
pub fn fb_video(table: &Table, axes: &Axes<'_>) -> Result<(ChartSpec, ChartSpec), BuildError> {
    let primary = match axes.y1 {
        Some(y) => {
            let mut spec = scatter(table, MOOD, y, format!("{MOOD}與{y}關係"))?;
            spec = with_diagonal(spec, table, MOOD)?;
            spec.layout.x_range = Some(VIDEO_X_RANGE);
            spec.layout.y_range = Some(video_y_range(y));
            spec
        }
        None => ChartSpec::empty(),
    };

    let secondary = match axes.y2 {
        Some(y) => grouped_sums(
            ChartKind::Histogram,
            table,
            FB_POST_TIME,
            y,
            format!("{FB_POST_TIME}與{y}分布"),
        )?,
        None => ChartSpec::empty(),
    };

    Ok((primary, secondary))
}

fn video_y_range(metric: &str) -> [f64; 2] {
    match metric {
        "留言" | "分享" => VIDEO_ENGAGEMENT_RANGE,
        _ => VIDEO_VIEWS_RANGE,
    }
}

/// Stories: a time histogram and a fixed "nothing to compare" message.
pub fn fb_story(table: &Table, axes: &Axes<'_>) -> Result<(ChartSpec, ChartSpec), BuildError> {
    let primary = match axes.y1 {
        Some(y) => grouped_sums(
            ChartKind::Histogram,
            table,
            FB_POST_TIME,
            y,
            format!("{FB_POST_TIME}與{y}分布"),
        )?,
        None => ChartSpec::empty(),
    };
    Ok((primary, ChartSpec::placeholder(FB_STORY_PLACEHOLDER)))
}

pub fn ig_post(table: &Table, axes: &Axes<'_>) -> Result<(ChartSpec, ChartSpec), BuildError> {
    let primary = match (axes.x1, axes.y1) {
        (Some(x @ IG_HOUR), Some(y)) => bar(table, x, y, format!("{x}與{y}分布"))?,
        (Some(x @ IG_CATEGORY), Some(y)) => {
            category_boxes(table, x, y, format!("{y}的分類分布"))?
        }
        _ => ChartSpec::empty(),
    };
    Ok((primary, ChartSpec::placeholder(IG_POST_PLACEHOLDER)))
}

pub fn ig_story(table: &Table, axes: &Axes<'_>) -> Result<(ChartSpec, ChartSpec), BuildError> {
    let primary = match (axes.x1, axes.y1) {
        (Some(x @ IG_POST_TIME), Some(y)) => {
            grouped_sums(ChartKind::Bar, table, x, y, format!("{x}與{y}分布"))?
        }
        (Some(x @ IG_REACH), Some(y)) => scatter(table, x, y, format!("{x}與{y}關係"))?,
        _ => ChartSpec::empty(),
    };

    let secondary = match (axes.x2, axes.y2) {
        (Some(x), Some(y)) => density_heatmap(table, x, y, format!("{x}與{y}分布熱力圖"))?,
        _ => ChartSpec::empty(),
    };

    Ok((primary, secondary))
}

// ---------------------------------------------------------------------------
// Chart constructors
// ---------------------------------------------------------------------------

fn line(table: &Table, x: &str, y: &str, title: String) -> Result<ChartSpec, BuildError> {
    let xs = positions(table, x)?;
    let ys = numeric(table, y)?;

    let mut spec = ChartSpec::new(ChartKind::Line, title)
        .with_axes(x, y)
        .with_trace(Trace::Line {
            name: y.to_string(),
            points: paired(&xs.values, &ys),
            color: None,
            dashed: false,
        });
    spec.layout.x_scale = xs.scale;
    Ok(spec)
}

fn scatter(table: &Table, x: &str, y: &str, title: String) -> Result<ChartSpec, BuildError> {
    let xs = positions(table, x)?;
    let ys = numeric(table, y)?;

    let mut spec = ChartSpec::new(ChartKind::Scatter, title)
        .with_axes(x, y)
        .with_trace(Trace::Markers {
            name: y.to_string(),
            points: paired(&xs.values, &ys),
        });
    spec.layout.x_scale = xs.scale;
    Ok(spec)
}

/// Overlay a red dashed y = x line spanning the observed range of `column`.
fn with_diagonal(spec: ChartSpec, table: &Table, column: &str) -> Result<ChartSpec, BuildError> {
    let values = numeric(table, column)?;
    let Some((lo, hi)) = min_max(values.into_iter().flatten()) else {
        return Ok(spec);
    };
    Ok(spec.with_trace(Trace::Line {
        name: "對角線".to_string(),
        points: vec![[lo, lo], [hi, hi]],
        color: Some(Rgb::RED),
        dashed: true,
    }))
}

/// Sum `y` per distinct `x`. Numeric `x` keeps its value as bar position.
fn bar(table: &Table, x: &str, y: &str, title: String) -> Result<ChartSpec, BuildError> {
    let xs = positions(table, x)?;
    let sums = sum_by_label(&labels(table, x)?, &numeric(table, y)?);
    let linear = xs.scale == AxisScale::Linear;

    let bars: Vec<BarDatum> = sums
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let position = if linear {
                label.parse().unwrap_or(i as f64)
            } else {
                i as f64
            };
            BarDatum {
                label,
                position,
                value,
                group: None,
            }
        })
        .collect();

    let mut spec = ChartSpec::new(ChartKind::Bar, title).with_axes(x, y);
    spec.layout.x_scale = if linear {
        AxisScale::Linear
    } else {
        AxisScale::Category(bars.iter().map(|b| b.label.clone()).collect())
    };
    Ok(spec.with_trace(Trace::Bars { bars }))
}

/// One coloured bar per distinct `x` holding the sum of `y`.
fn grouped_sums(
    kind: ChartKind,
    table: &Table,
    x: &str,
    y: &str,
    title: String,
) -> Result<ChartSpec, BuildError> {
    let groups = labels(table, x)?;
    let values = numeric(table, y)?;
    Ok(colored_bars(kind, &groups, &values, x, y, title))
}

/// Like [`grouped_sums`] but grouped on the shortened category label.
fn category_bars(table: &Table, x: &str, y: &str, title: String) -> Result<ChartSpec, BuildError> {
    let groups = truncated_categories(table, x)?;
    let values = numeric(table, y)?;
    Ok(colored_bars(ChartKind::Bar, &groups, &values, x, y, title))
}

fn colored_bars(
    kind: ChartKind,
    groups: &[Option<String>],
    values: &[Option<f64>],
    x: &str,
    y: &str,
    title: String,
) -> ChartSpec {
    let bars: Vec<BarDatum> = sum_by_label(groups, values)
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| BarDatum {
            label,
            position: i as f64,
            value,
            group: Some(i),
        })
        .collect();

    let mut spec = ChartSpec::new(kind, title).with_axes(x, y).with_color_by(x);
    spec.layout.x_scale = AxisScale::Category(bars.iter().map(|b| b.label.clone()).collect());
    spec.layout.show_legend = true;
    spec.with_trace(Trace::Bars { bars })
}

/// One box per shortened category label.
fn category_boxes(table: &Table, x: &str, y: &str, title: String) -> Result<ChartSpec, BuildError> {
    let groups = truncated_categories(table, x)?;
    let values = numeric(table, y)?;
    let grouped = values_by_label(&groups, &values);

    let category_labels: Vec<String> = grouped.iter().map(|(label, _)| label.clone()).collect();
    let boxes = grouped
        .into_iter()
        .enumerate()
        .filter_map(|(i, (label, vals))| {
            box_stats(&vals).map(|stats| BoxDatum {
                label,
                position: i as f64,
                group: i,
                stats,
            })
        })
        .collect();

    let mut spec = ChartSpec::new(ChartKind::Box, title)
        .with_axes(x, y)
        .with_color_by(x);
    spec.layout.x_scale = AxisScale::Category(category_labels);
    spec.layout.show_legend = true;
    Ok(spec.with_trace(Trace::Boxes { boxes }))
}

fn truncated_categories(table: &Table, column: &str) -> Result<Vec<Option<String>>, BuildError> {
    let cells = table.column(column).ok_or_else(|| BuildError::MissingColumn {
        column: column.to_string(),
    })?;
    Ok(truncated_labels(cells, CATEGORY_LABEL_CHARS))
}

/// Row counts over a grid of `x` and `y` bins.
fn density_heatmap(table: &Table, x: &str, y: &str, title: String) -> Result<ChartSpec, BuildError> {
    let xs = positions(table, x)?;
    let ys = positions(table, y)?;
    let x_bins = axis_bins(&xs);
    let y_bins = axis_bins(&ys);

    let mut counts = vec![vec![0u32; x_bins.len()]; y_bins.len()];
    for (xv, yv) in xs.values.iter().zip(&ys.values) {
        let (Some(xv), Some(yv)) = (xv, yv) else {
            continue;
        };
        if let (Some(xi), Some(yi)) = (bin_index(&x_bins, *xv), bin_index(&y_bins, *yv)) {
            counts[yi][xi] += 1;
        }
    }

    let mut spec = ChartSpec::new(ChartKind::DensityHeatmap, title).with_axes(x, y);
    spec.layout.x_scale = xs.scale;
    spec.layout.y_scale = ys.scale;
    Ok(spec.with_trace(Trace::Heatmap(HeatmapData {
        x_bins,
        y_bins,
        counts,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::{Background, TitleAlign};
    use crate::data::model::CellValue::{self, Missing, Number, Text, Timestamp};
    use chrono::NaiveDate;

    fn day(d: u32) -> CellValue {
        Timestamp(NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn fb_posts() -> Table {
        Table::new(
            ["發布日期", "發布時間", "類別", "留言", "心情", "總點擊次數"]
                .map(String::from)
                .to_vec(),
            vec![
                vec![day(1), Text("09:00".into()), Text("生活小知識分享".into()), Number(5.0), Number(10.0), Number(100.0)],
                vec![day(2), Text("12:00".into()), Text("生活小知識問答".into()), Number(7.0), Number(30.0), Number(80.0)],
                vec![day(3), Text("09:00".into()), Text("公告".into()), Missing, Number(20.0), Number(40.0)],
            ],
        )
    }

    fn axes<'a>(x1: &'a str, y1: &'a str, x2: &'a str, y2: &'a str) -> Axes<'a> {
        Axes {
            x1: Some(x1),
            y1: Some(y1),
            x2: Some(x2),
            y2: Some(y2),
        }
    }

    fn bars(spec: &ChartSpec) -> &[BarDatum] {
        match &spec.traces[0] {
            Trace::Bars { bars } => bars,
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn fb_post_date_axis_gives_line_chart() {
        let table = fb_posts();
        let (primary, secondary) = build(
            Platform::Facebook,
            "貼文",
            &table,
            &axes("發布日期", "留言", "類別", "總點擊次數"),
        )
        .unwrap();

        assert_eq!(primary.kind, ChartKind::Line);
        assert_eq!(primary.title, "留言趨勢圖");
        assert_eq!(primary.x.as_deref(), Some("發布日期"));
        assert_eq!(primary.y.as_deref(), Some("留言"));
        assert_eq!(primary.layout.x_scale, AxisScale::Time);
        match &primary.traces[0] {
            Trace::Line { points, .. } => assert_eq!(points.len(), 2),
            other => panic!("expected line, got {other:?}"),
        }

        assert_eq!(secondary.kind, ChartKind::Box);
        assert_eq!(secondary.title, "總點擊次數的類別分布");
    }

    #[test]
    fn fb_post_time_axis_sums_per_time_slot() {
        let table = fb_posts();
        let (primary, secondary) = build(
            Platform::Facebook,
            "貼文",
            &table,
            &axes("發布時間", "總點擊次數", "發布時間", "留言"),
        )
        .unwrap();

        assert_eq!(primary.kind, ChartKind::Histogram);
        assert_eq!(primary.color_by.as_deref(), Some("發布時間"));
        let b = bars(&primary);
        assert_eq!(b.len(), 2);
        assert_eq!((b[0].label.as_str(), b[0].value), ("09:00", 140.0));
        assert_eq!((b[1].label.as_str(), b[1].value), ("12:00", 80.0));

        assert_eq!(secondary.kind, ChartKind::DensityHeatmap);
        assert_eq!(secondary.title, "發布時間與留言分布熱力圖");
        match &secondary.traces[0] {
            Trace::Heatmap(heat) => {
                assert_eq!(heat.x_bins.len(), 2);
                let total: u32 = heat.counts.iter().flatten().sum();
                assert_eq!(total, 2, "row with missing comments is not counted");
            }
            other => panic!("expected heatmap, got {other:?}"),
        }
    }

    #[test]
    fn category_groups_use_first_five_characters() {
        let table = fb_posts();
        let (primary, _) = build(
            Platform::Facebook,
            "貼文",
            &table,
            &axes("類別", "總點擊次數", "心情", "留言"),
        )
        .unwrap();

        assert_eq!(primary.kind, ChartKind::Bar);
        let b = bars(&primary);
        assert_eq!(b[0].label, "生活小知識");
        assert_eq!(b[0].value, 180.0);
        assert_eq!(b[1].label, "公告");
        // source rows keep the full label
        assert_eq!(table.rows[0][2], Text("生活小知識分享".into()));
    }

    #[test]
    fn mood_scatter_gets_diagonal_over_observed_range() {
        let table = fb_posts();
        let (_, secondary) = build(
            Platform::Facebook,
            "貼文",
            &table,
            &axes("發布日期", "留言", "心情", "總點擊次數"),
        )
        .unwrap();

        assert_eq!(secondary.kind, ChartKind::Scatter);
        assert_eq!(secondary.traces.len(), 2);
        match &secondary.traces[1] {
            Trace::Line { points, dashed, .. } => {
                assert!(*dashed);
                assert_eq!(points, &vec![[10.0, 10.0], [30.0, 30.0]]);
            }
            other => panic!("expected diagonal, got {other:?}"),
        }
    }

    #[test]
    fn video_ranges_follow_chosen_metric() {
        let table = Table::new(
            ["心情", "留言", "觸及人數", "發布時間"].map(String::from).to_vec(),
            vec![
                vec![Number(3.0), Number(1.0), Number(500.0), Text("08:00".into())],
                vec![Number(9.0), Number(4.0), Number(900.0), Text("20:00".into())],
            ],
        );
        let chosen = Axes {
            x1: Some("心情"),
            y1: Some("留言"),
            x2: Some("發布時間"),
            y2: Some("觸及人數"),
        };
        let (primary, secondary) = build(Platform::Facebook, "影片", &table, &chosen).unwrap();
        assert_eq!(primary.kind, ChartKind::Scatter);
        assert_eq!(primary.title, "心情與留言關係");
        assert_eq!(primary.layout.x_range, Some([0.0, 600.0]));
        assert_eq!(primary.layout.y_range, Some([0.0, 600.0]));
        assert_eq!(secondary.kind, ChartKind::Histogram);
        assert_eq!(secondary.title, "發布時間與觸及人數分布");

        let reach = Axes {
            y1: Some("觸及人數"),
            ..chosen
        };
        let (primary, _) = build(Platform::Facebook, "影片", &table, &reach).unwrap();
        assert_eq!(primary.layout.y_range, Some([0.0, 40_000.0]));
        match &primary.traces[1] {
            Trace::Line { points, .. } => assert_eq!(points, &vec![[3.0, 3.0], [9.0, 9.0]]),
            other => panic!("expected diagonal, got {other:?}"),
        }
    }

    #[test]
    fn fb_story_secondary_is_always_the_placeholder() {
        let table = Table::new(
            ["發布時間", "觸及人數"].map(String::from).to_vec(),
            vec![vec![Text("10:00".into()), Number(55.0)]],
        );
        for (x2, y2) in [("none", "none"), ("心情", "留言"), ("whatever", "x")] {
            let (primary, secondary) = build(
                Platform::Facebook,
                "限動",
                &table,
                &axes("發布時間", "觸及人數", x2, y2),
            )
            .unwrap();
            assert_eq!(primary.kind, ChartKind::Histogram);
            assert_eq!(secondary.kind, ChartKind::Annotation);
            assert_eq!(secondary.annotation_text(), Some("無特殊交互事項"));
        }
    }

    #[test]
    fn ig_post_hour_bar_and_category_box() {
        let table = Table::new(
            ["發布小時", "分類", "觸及數量"].map(String::from).to_vec(),
            vec![
                vec![Number(9.0), Text("旅遊日記系列一".into()), Number(100.0)],
                vec![Number(9.0), Text("美食".into()), Number(50.0)],
                vec![Number(21.0), Text("旅遊日記系列二".into()), Number(70.0)],
            ],
        );
        let chosen = Axes {
            x1: Some("發布小時"),
            y1: Some("觸及數量"),
            ..Axes::default()
        };
        let (primary, secondary) = build(Platform::Instagram, "圖文", &table, &chosen).unwrap();
        assert_eq!(primary.kind, ChartKind::Bar);
        assert_eq!(primary.layout.x_scale, AxisScale::Linear);
        let b = bars(&primary);
        assert_eq!((b[0].position, b[0].value), (9.0, 150.0));
        assert_eq!((b[1].position, b[1].value), (21.0, 70.0));
        assert_eq!(secondary.annotation_text(), Some("沒有需要交互的項目"));

        let by_category = Axes {
            x1: Some("分類"),
            ..chosen
        };
        let (primary, _) = build(Platform::Instagram, "圖文", &table, &by_category).unwrap();
        assert_eq!(primary.kind, ChartKind::Box);
        assert_eq!(primary.title, "觸及數量的分類分布");
        match &primary.traces[0] {
            Trace::Boxes { boxes } => {
                assert_eq!(boxes.len(), 2);
                assert_eq!(boxes[0].label, "旅遊日記系");
                assert_eq!(boxes[0].stats.median, 85.0);
            }
            other => panic!("expected boxes, got {other:?}"),
        }
    }

    #[test]
    fn ig_story_scatter_and_heatmap() {
        let table = Table::new(
            ["張貼時間", "觸及數量", "按讚數量"].map(String::from).to_vec(),
            vec![
                vec![Text("10:00".into()), Number(100.0), Number(3.0)],
                vec![Text("22:00".into()), Number(300.0), Number(9.0)],
            ],
        );
        let (primary, secondary) = build(
            Platform::Instagram,
            "限時動態",
            &table,
            &axes("觸及數量", "按讚數量", "張貼時間", "按讚數量"),
        )
        .unwrap();
        assert_eq!(primary.kind, ChartKind::Scatter);
        assert_eq!(primary.title, "觸及數量與按讚數量關係");
        assert_eq!(secondary.kind, ChartKind::DensityHeatmap);

        let (primary, _) = build(
            Platform::Instagram,
            "限時動態",
            &table,
            &axes("張貼時間", "按讚數量", "張貼時間", "按讚數量"),
        )
        .unwrap();
        assert_eq!(primary.kind, ChartKind::Bar);
        assert_eq!(primary.color_by.as_deref(), Some("張貼時間"));
    }

    #[test]
    fn unmatched_branches_are_empty_and_still_styled() {
        let table = fb_posts();
        let (primary, secondary) = build(
            Platform::Facebook,
            "貼文",
            &table,
            &axes("觸及人數", "留言", "分享", "留言"),
        )
        .unwrap();
        for spec in [&primary, &secondary] {
            assert_eq!(spec.kind, ChartKind::Empty);
            assert_eq!(spec.layout.title_align, TitleAlign::Center);
            assert_eq!(spec.layout.background, Background::White);
        }

        let (primary, secondary) =
            build(Platform::Instagram, "Reels", &table, &Axes::default()).unwrap();
        assert_eq!(primary.kind, ChartKind::Empty);
        assert_eq!(secondary.kind, ChartKind::Empty);
    }

    #[test]
    fn missing_column_is_reported() {
        let table = fb_posts();
        let err = build(
            Platform::Facebook,
            "貼文",
            &table,
            &axes("發布日期", "連結點擊次數", "類別", "留言"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::MissingColumn { ref column } if column == "連結點擊次數"));
    }
}
