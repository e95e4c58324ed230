use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, LineStyle, Plot, PlotBounds,
    PlotPoints, PlotUi, Points, Polygon,
};

use crate::chart::spec::{
    AxisScale, Background, ChartKind, ChartSpec, HeatmapData, PieSlice, TitleAlign, Trace,
};
use crate::color::{from_rgb, generate_palette, group_color, sequential};

// ---------------------------------------------------------------------------
// ChartSpec → egui
// ---------------------------------------------------------------------------

/// Draw one chart spec into the available space.
pub fn chart(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    let fill = match spec.layout.background {
        Background::White => Color32::WHITE,
        Background::Transparent => Color32::TRANSPARENT,
        Background::Default => ui.visuals().extreme_bg_color,
    };
    let mut frame = egui::Frame::default().fill(fill);
    if let Some(m) = spec.layout.margin {
        frame = frame.inner_margin(egui::Margin {
            left: m.left as i8,
            right: m.right as i8,
            top: 0,
            bottom: m.bottom as i8,
        });
    }

    frame.show(ui, |ui: &mut Ui| {
        if !spec.title.is_empty() {
            let title = egui::RichText::new(&spec.title).strong().color(Color32::DARK_GRAY);
            match spec.layout.title_align {
                TitleAlign::Center => {
                    ui.vertical_centered(|ui: &mut Ui| ui.label(title));
                }
                TitleAlign::Left => {
                    ui.label(title);
                }
            }
        }

        match spec.kind {
            ChartKind::Empty => {
                ui.allocate_space(ui.available_size());
            }
            ChartKind::Annotation => annotations(ui, spec),
            ChartKind::Pie => pie(ui, spec),
            _ => plot(ui, id, spec),
        }
    });
}

fn annotations(ui: &mut Ui, spec: &ChartSpec) {
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    for note in &spec.annotations {
        let pos = Pos2::new(
            rect.left() + rect.width() * note.x as f32,
            rect.bottom() - rect.height() * note.y as f32,
        );
        let color = note.color.map(from_rgb).unwrap_or(Color32::DARK_GRAY);
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            &note.text,
            FontId::proportional(note.font_size),
            color,
        );
    }
}

fn tick_label(scale: &AxisScale, value: f64) -> String {
    match scale {
        AxisScale::Linear => format!("{value}"),
        AxisScale::Time => chrono::DateTime::from_timestamp(value as i64, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        AxisScale::Category(labels) => {
            let idx = value.round();
            if (value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        }
    }
}

fn plot(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    let x_scale = spec.layout.x_scale.clone();
    let y_scale = spec.layout.y_scale.clone();

    let mut plot = Plot::new(id)
        .x_axis_label(spec.x.clone().unwrap_or_default())
        .y_axis_label(spec.y.clone().unwrap_or_default())
        .x_axis_formatter(move |mark, _range| tick_label(&x_scale, mark.value))
        .y_axis_formatter(move |mark, _range| tick_label(&y_scale, mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);
    if spec.layout.show_legend {
        plot = plot.legend(Legend::default());
    }
    if matches!(spec.kind, ChartKind::Bar | ChartKind::Histogram) {
        plot = plot.include_y(0.0);
    }

    let fixed_bounds = match (spec.layout.x_range, spec.layout.y_range) {
        (Some([x0, x1]), Some([y0, y1])) => Some(PlotBounds::from_min_max([x0, y0], [x1, y1])),
        _ => None,
    };

    plot.show(ui, |plot_ui| {
        for trace in &spec.traces {
            draw_trace(plot_ui, trace);
        }
        if let Some(bounds) = fixed_bounds {
            plot_ui.set_plot_bounds(bounds);
        }
    });
}

fn draw_trace(plot_ui: &mut PlotUi, trace: &Trace) {
    match trace {
        Trace::Line {
            name,
            points,
            color,
            dashed,
        } => {
            let series: PlotPoints = points.iter().copied().collect();
            let mut line = Line::new(series).name(name).width(1.5);
            if let Some(c) = color {
                line = line.color(from_rgb(*c));
            }
            if *dashed {
                line = line.style(LineStyle::dashed_dense());
            }
            plot_ui.line(line);
        }
        Trace::Markers { name, points } => {
            let series: PlotPoints = points.iter().copied().collect();
            plot_ui.points(Points::new(series).name(name).radius(3.0));
        }
        Trace::Bars { bars } => {
            let groups = bars.iter().filter_map(|b| b.group).max().map_or(0, |g| g + 1);
            // One chart per bar so every group gets its own legend entry.
            for b in bars {
                let color = match b.group {
                    Some(g) => group_color(g, groups),
                    None => Color32::LIGHT_BLUE,
                };
                let bar = Bar::new(b.position, b.value).width(0.7).fill(color);
                let chart = BarChart::new(vec![bar]).color(color);
                let chart = match b.group {
                    Some(_) => chart.name(&b.label),
                    None => chart,
                };
                plot_ui.bar_chart(chart);
            }
        }
        Trace::Boxes { boxes } => {
            let palette = generate_palette(boxes.len());
            for (b, color) in boxes.iter().zip(palette) {
                let s = &b.stats;
                let elem = BoxElem::new(
                    b.position,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .box_width(0.5)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.label).color(color));

                if !s.outliers.is_empty() {
                    let series: PlotPoints = s.outliers.iter().map(|&v| [b.position, v]).collect();
                    plot_ui.points(Points::new(series).color(color).radius(2.5));
                }
            }
        }
        Trace::Heatmap(heat) => heatmap(plot_ui, heat),
        // Pies are painted outside of a plot.
        Trace::Pie { .. } => {}
    }
}

fn heatmap(plot_ui: &mut PlotUi, heat: &HeatmapData) {
    let max = heat.max_count();
    if max == 0 {
        return;
    }
    for (row, y_bin) in heat.counts.iter().zip(&heat.y_bins) {
        for (&count, x_bin) in row.iter().zip(&heat.x_bins) {
            if count == 0 {
                continue;
            }
            let cell = PlotPoints::new(vec![
                [x_bin.start, y_bin.start],
                [x_bin.end, y_bin.start],
                [x_bin.end, y_bin.end],
                [x_bin.start, y_bin.end],
            ]);
            let color = sequential(count as f32 / max as f32);
            plot_ui.polygon(
                Polygon::new(cell)
                    .fill_color(color)
                    .stroke(Stroke::NONE)
                    .name(format!("{} × {}: {count}", x_bin.label, y_bin.label)),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn pie(ui: &mut Ui, spec: &ChartSpec) {
    let Some(Trace::Pie { slices }) = spec.traces.first() else {
        return;
    };
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if total <= 0.0 {
        return;
    }
    let palette = generate_palette(slices.len());

    ui.horizontal(|ui: &mut Ui| {
        let side = ui.available_height().min(ui.available_width() * 0.5).max(80.0);
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(side), Sense::hover());
        paint_pie(ui, rect, slices, total, &palette);

        if spec.layout.show_legend {
            ui.vertical(|ui: &mut Ui| {
                for (slice, color) in slices.iter().zip(&palette) {
                    ui.horizontal(|ui: &mut Ui| {
                        let (swatch, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
                        ui.painter().rect_filled(swatch, 2.0, *color);
                        ui.label(format!(
                            "{} {:.1}% ({})",
                            slice.label,
                            slice.value / total * 100.0,
                            slice.value
                        ));
                    });
                }
            });
        }
    });
}

fn paint_pie(ui: &Ui, rect: egui::Rect, slices: &[PieSlice], total: f64, palette: &[Color32]) {
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.45;
    let point = |angle: f32| center + radius * Vec2::new(angle.cos(), angle.sin());

    // Start at 12 o'clock and go clockwise.
    let mut start = -TAU / 4.0;
    for (slice, color) in slices.iter().zip(palette) {
        let sweep = (slice.value / total) as f32 * TAU;
        let steps = ((sweep / TAU) * 90.0).ceil().max(1.0) as usize;
        for i in 0..steps {
            let a0 = start + sweep * i as f32 / steps as f32;
            let a1 = start + sweep * (i + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![center, point(a0), point(a1)],
                *color,
                Stroke::NONE,
            ));
        }
        start += sweep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ticks_only_on_whole_positions() {
        let scale = AxisScale::Category(vec!["公告".into(), "活動".into()]);
        assert_eq!(tick_label(&scale, 0.0), "公告");
        assert_eq!(tick_label(&scale, 1.0), "活動");
        assert_eq!(tick_label(&scale, 0.5), "");
        assert_eq!(tick_label(&scale, 2.0), "");
        assert_eq!(tick_label(&scale, -1.0), "");
    }

    #[test]
    fn time_ticks_render_dates() {
        assert_eq!(tick_label(&AxisScale::Time, 1_704_067_200.0), "2024-01-01");
    }
}
