use serde::Serialize;

// ---------------------------------------------------------------------------
// ChartSpec – renderer-agnostic chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
    Scatter,
    Box,
    DensityHeatmap,
    Pie,
    /// Text only, no axes.
    Annotation,
    /// Nothing to draw.
    Empty,
}

/// A complete, declarative description of one chart.
///
/// Specs are rebuilt from scratch on every selection change and never
/// patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color_by: Option<String>,
    pub traces: Vec<Trace>,
    pub annotations: Vec<Annotation>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREY: Rgb = Rgb(0x66, 0x66, 0x66);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Line {
        name: String,
        points: Vec<[f64; 2]>,
        color: Option<Rgb>,
        dashed: bool,
    },
    Markers {
        name: String,
        points: Vec<[f64; 2]>,
    },
    Bars {
        bars: Vec<BarDatum>,
    },
    Boxes {
        boxes: Vec<BoxDatum>,
    },
    Heatmap(HeatmapData),
    Pie {
        slices: Vec<PieSlice>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub label: String,
    pub position: f64,
    pub value: f64,
    /// Colour group; `None` draws every bar in one colour.
    pub group: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxDatum {
    pub label: String,
    pub position: f64,
    pub group: usize,
    pub stats: BoxStats,
}

/// Five-number summary with 1.5·IQR whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub label: String,
}

/// Row counts per (x bin, y bin) cell. `counts[y][x]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapData {
    pub x_bins: Vec<Bin>,
    pub y_bins: Vec<Bin>,
    pub counts: Vec<Vec<u32>>,
}

impl HeatmapData {
    pub fn max_count(&self) -> u32 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

/// Free text placed in paper coordinates (0..1 on both axes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f32,
    pub color: Option<Rgb>,
}

impl Annotation {
    /// Text centred in the chart area.
    pub fn centered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: 0.5,
            y: 0.5,
            font_size: 14.0,
            color: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Default,
    White,
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub left: u8,
    pub right: u8,
    pub top: u8,
    pub bottom: u8,
}

impl Margin {
    pub const fn new(left: u8, right: u8, top: u8, bottom: u8) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// How axis positions map back to tick labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    Linear,
    /// Positions are seconds since the Unix epoch.
    Time,
    /// Position `i` is the `i`-th label.
    Category(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title_align: TitleAlign,
    pub background: Background,
    pub margin: Option<Margin>,
    pub x_range: Option<[f64; 2]>,
    pub y_range: Option<[f64; 2]>,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub show_legend: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title_align: TitleAlign::Left,
            background: Background::Default,
            margin: None,
            x_range: None,
            y_range: None,
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            show_legend: false,
        }
    }
}

/// Margins every dashboard chart gets in the final styling pass.
pub const CHART_MARGIN: Margin = Margin::new(50, 20, 40, 30);

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x: None,
            y: None,
            color_by: None,
            traces: Vec::new(),
            annotations: Vec::new(),
            layout: Layout::default(),
        }
    }

    /// A spec that renders nothing.
    pub fn empty() -> Self {
        Self::new(ChartKind::Empty, "")
    }

    /// A text-only chart with one large grey message in the middle.
    pub fn placeholder(text: impl Into<String>) -> Self {
        let mut spec = Self::new(ChartKind::Annotation, "");
        spec.annotations.push(Annotation {
            font_size: 24.0,
            color: Some(Rgb::GREY),
            ..Annotation::centered(text)
        });
        spec
    }

    /// The chart shown when building a selection failed.
    pub fn error(message: &str) -> Self {
        let mut spec = Self::new(ChartKind::Annotation, "");
        spec.annotations
            .push(Annotation::centered(format!("圖表生成錯誤: {message}")));
        spec
    }

    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x = Some(x.to_string());
        self.y = Some(y.to_string());
        self
    }

    pub fn with_color_by(mut self, column: &str) -> Self {
        self.color_by = Some(column.to_string());
        self
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    /// The uniform styling pass: centred title, white background, fixed
    /// margins. Leaves everything else as built.
    pub fn finalize(mut self) -> Self {
        self.layout.title_align = TitleAlign::Center;
        self.layout.background = Background::White;
        self.layout.margin = Some(CHART_MARGIN);
        self
    }

    /// Message of the first annotation, if any.
    pub fn annotation_text(&self) -> Option<&str> {
        self.annotations.first().map(|a| a.text.as_str())
    }
}
