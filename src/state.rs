use std::sync::Arc;

use crate::chart::builder::{self, Axes};
use crate::chart::spec::ChartSpec;
use crate::chart::summary::summarize;
use crate::data::model::{Dataset, Platform};
use crate::error::BuildError;
use crate::resolver::{AxisSlot, ResolvedOptions, resolve};
use crate::table::{self, CsvExport, TableProjection};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// What the user currently has picked in the selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub platform: Platform,
    pub sheet: Option<String>,
    pub x1: Option<String>,
    pub y1: Option<String>,
    pub x2: Option<String>,
    pub y2: Option<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            platform: Platform::Facebook,
            sheet: None,
            x1: None,
            y1: None,
            x2: None,
            y2: None,
        }
    }
}

impl Selection {
    pub fn axis(&self, slot: AxisSlot) -> Option<&str> {
        match slot {
            AxisSlot::X1 => self.x1.as_deref(),
            AxisSlot::Y1 => self.y1.as_deref(),
            AxisSlot::X2 => self.x2.as_deref(),
            AxisSlot::Y2 => self.y2.as_deref(),
        }
    }

    fn axis_mut(&mut self, slot: AxisSlot) -> &mut Option<String> {
        match slot {
            AxisSlot::X1 => &mut self.x1,
            AxisSlot::Y1 => &mut self.y1,
            AxisSlot::X2 => &mut self.x2,
            AxisSlot::Y2 => &mut self.y2,
        }
    }

    pub fn axes(&self) -> Axes<'_> {
        Axes {
            x1: self.x1.as_deref(),
            y1: self.y1.as_deref(),
            x2: self.x2.as_deref(),
            y2: self.y2.as_deref(),
        }
    }

    /// Reset every axis to the resolved default.
    fn apply_defaults(&mut self, options: &ResolvedOptions) {
        for slot in AxisSlot::ALL {
            *self.axis_mut(slot) = options.axis(slot).default.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Derived outputs
// ---------------------------------------------------------------------------

/// Everything rendered for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub primary: ChartSpec,
    pub secondary: ChartSpec,
    pub table: TableProjection,
    pub title: String,
}

pub const ERROR_TITLE: &str = "錯誤";

impl DashboardView {
    /// Nothing selected yet.
    pub fn idle() -> Self {
        Self {
            primary: ChartSpec::empty(),
            secondary: ChartSpec::empty(),
            table: TableProjection::default(),
            title: String::new(),
        }
    }

    fn failed(error: &BuildError) -> Self {
        Self {
            primary: ChartSpec::error(&error.to_string()),
            secondary: ChartSpec::error(&error.to_string()),
            table: TableProjection::default(),
            title: ERROR_TITLE.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.title == ERROR_TITLE
    }
}

/// Charts, table and title for a selection.
///
/// Never fails: a build error turns the whole view into the error state
/// (annotated charts, empty table, error title) and is logged.
pub fn compute_view(dataset: &Dataset, selection: &Selection) -> DashboardView {
    let (Some(sheet), Some(_)) = (selection.sheet.as_deref(), selection.y1.as_deref()) else {
        return DashboardView::idle();
    };

    match try_compute_view(dataset, selection.platform, sheet, &selection.axes()) {
        Ok(view) => view,
        Err(e) => {
            log::error!("Failed to build {}/{sheet}: {e}", selection.platform);
            DashboardView::failed(&e)
        }
    }
}

fn try_compute_view(
    dataset: &Dataset,
    platform: Platform,
    sheet: &str,
    axes: &Axes<'_>,
) -> Result<DashboardView, BuildError> {
    let table = dataset
        .table(platform, sheet)
        .ok_or_else(|| BuildError::MissingTable {
            platform,
            sheet: sheet.to_string(),
        })?;
    let (primary, secondary) = builder::build(platform, sheet, table, axes)?;
    let projection = table::project(platform, sheet, dataset)?;

    Ok(DashboardView {
        primary,
        secondary,
        table: projection,
        title: format!("{} - {sheet} 所有數據", platform.display_name()),
    })
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at start-up, shared read-only.
    pub dataset: Arc<Dataset>,

    pub selection: Selection,

    /// Selector configuration for the current (platform, sheet).
    pub options: ResolvedOptions,

    /// Charts, table and title for the current selection.
    pub view: DashboardView,

    /// Category breakdown for the side panel.
    pub pie: ChartSpec,

    /// Current page of the data table (0-based).
    pub page: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let mut state = Self {
            dataset,
            selection: Selection::default(),
            options: ResolvedOptions::hidden(),
            view: DashboardView::idle(),
            pie: ChartSpec::empty(),
            page: 0,
            status_message: None,
        };
        if state.dataset.is_empty() {
            state.status_message = Some("No data loaded".to_string());
        }
        state.resolve_and_refresh();
        state
    }

    /// Sheets selectable for the current platform, in workbook order.
    pub fn sheet_options(&self) -> Vec<String> {
        self.dataset.sheet_names(self.selection.platform)
    }

    /// Switch platform. The sheet survives only if the new platform has it.
    pub fn set_platform(&mut self, platform: Platform) {
        if platform == self.selection.platform {
            return;
        }
        self.selection.platform = platform;
        let keep = self
            .selection
            .sheet
            .as_deref()
            .is_some_and(|s| self.dataset.table(platform, s).is_some());
        if !keep {
            self.selection.sheet = None;
        }
        self.resolve_and_refresh();
    }

    /// Switch sheet; axes reset to the defaults of the new sheet type.
    pub fn set_sheet(&mut self, sheet: &str) {
        if self.dataset.table(self.selection.platform, sheet).is_none() {
            log::warn!(
                "Ignoring unknown sheet '{sheet}' for {}",
                self.selection.platform
            );
            return;
        }
        self.selection.sheet = Some(sheet.to_string());
        self.resolve_and_refresh();
    }

    /// Change one axis. Values the resolver does not offer are ignored.
    pub fn set_axis(&mut self, slot: AxisSlot, value: &str) {
        if !self.options.axis(slot).accepts(value) {
            log::warn!("Ignoring {slot:?} = '{value}': not an option for this sheet");
            return;
        }
        if self.selection.axis(slot) == Some(value) {
            return;
        }
        *self.selection.axis_mut(slot) = Some(value.to_string());
        self.refresh();
    }

    fn resolve_and_refresh(&mut self) {
        self.options = resolve(self.selection.platform, self.selection.sheet.as_deref());
        self.selection.apply_defaults(&self.options);
        self.pie = summarize(
            self.selection.platform,
            self.selection.sheet.as_deref(),
            self.selection
                .sheet
                .as_deref()
                .and_then(|s| self.dataset.table(self.selection.platform, s)),
        );
        self.refresh();
    }

    /// Recompute charts and table for the current selection.
    fn refresh(&mut self) {
        self.view = compute_view(&self.dataset, &self.selection);
        self.page = 0;
    }

    /// Serialise the selected sheet. Failures are logged and yield `None`.
    pub fn export(&self) -> Option<CsvExport> {
        match table::export_csv(
            &self.dataset,
            self.selection.platform,
            self.selection.sheet.as_deref(),
        ) {
            Ok(export) => export,
            Err(e) => {
                log::error!("CSV export failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::ChartKind;
    use crate::data::model::{CellValue, Table, Workbook};
    use crate::rules::NO_INTERACTION;

    fn fb_posts() -> Table {
        Table::new(
            ["發布日期", "發布時間", "類別", "留言", "心情", "總點擊次數"]
                .map(String::from)
                .to_vec(),
            vec![
                vec![
                    CellValue::Text("2024-01-01".into()),
                    CellValue::Text("09:00".into()),
                    CellValue::Text("公告".into()),
                    CellValue::Number(3.0),
                    CellValue::Number(8.0),
                    CellValue::Number(40.0),
                ],
                vec![
                    CellValue::Text("2024-01-02".into()),
                    CellValue::Text("12:00".into()),
                    CellValue::Text("活動".into()),
                    CellValue::Number(5.0),
                    CellValue::Number(2.0),
                    CellValue::Number(60.0),
                ],
            ],
        )
    }

    fn dataset() -> Arc<Dataset> {
        let mut fb = Workbook::new();
        fb.insert("貼文".to_string(), fb_posts());
        fb.insert(
            "限動".to_string(),
            Table::new(
                vec!["發布時間".into(), "觸及人數".into()],
                vec![vec![CellValue::Text("10:00".into()), CellValue::Number(5.0)]],
            ),
        );
        // a sheet whose columns do not match the option table
        fb.insert(
            "影片".to_string(),
            Table::new(vec!["標題".into()], vec![vec![CellValue::Text("x".into())]]),
        );
        let mut ig = Workbook::new();
        ig.insert(
            "圖文".to_string(),
            Table::new(
                vec!["分類".into(), "發布小時".into(), "觸及數量".into()],
                vec![vec![CellValue::Text("旅遊".into()), CellValue::Number(9.0), CellValue::Number(10.0)]],
            ),
        );
        Arc::new(Dataset::new(fb, ig))
    }

    #[test]
    fn starts_idle_with_hidden_selectors() {
        let state = AppState::new(dataset());
        assert_eq!(state.selection.sheet, None);
        assert!(!state.options.comparison_visible);
        assert_eq!(state.view, DashboardView::idle());
        assert_eq!(state.pie.kind, ChartKind::Empty);
        assert_eq!(state.sheet_options(), vec!["貼文", "限動", "影片"]);
    }

    #[test]
    fn picking_fb_posts_applies_defaults_and_builds_line_chart() {
        let mut state = AppState::new(dataset());
        state.set_sheet("貼文");

        assert!(state.options.comparison_visible);
        assert_eq!(state.selection.x1.as_deref(), Some("發布日期"));
        assert_eq!(state.selection.y1.as_deref(), Some("留言"));
        assert_eq!(state.selection.x2.as_deref(), Some("類別"));
        assert_eq!(state.selection.y2.as_deref(), Some("總點擊次數"));
        assert_eq!(state.view.primary.kind, ChartKind::Line);
        assert_eq!(state.view.secondary.kind, ChartKind::Box);
        assert_eq!(state.view.title, "Facebook - 貼文 所有數據");
        assert_eq!(state.view.table.rows.len(), 2);
        assert_eq!(state.pie.kind, ChartKind::Pie);
    }

    #[test]
    fn axis_changes_are_validated() {
        let mut state = AppState::new(dataset());
        state.set_sheet("貼文");

        state.set_axis(AxisSlot::X1, "類別");
        assert_eq!(state.view.primary.kind, ChartKind::Bar);

        state.set_axis(AxisSlot::X1, "觸及數量");
        assert_eq!(state.selection.x1.as_deref(), Some("類別"));
    }

    #[test]
    fn fb_story_second_pair_cannot_be_changed() {
        let mut state = AppState::new(dataset());
        state.set_sheet("限動");
        assert_eq!(state.selection.x2.as_deref(), Some(NO_INTERACTION));
        assert_eq!(state.view.secondary.kind, ChartKind::Annotation);

        state.set_axis(AxisSlot::X2, NO_INTERACTION);
        state.set_axis(AxisSlot::X2, "心情");
        assert_eq!(state.selection.x2.as_deref(), Some(NO_INTERACTION));
        assert_eq!(state.pie.kind, ChartKind::Annotation);
    }

    #[test]
    fn missing_columns_turn_into_error_view() {
        let mut state = AppState::new(dataset());
        state.set_sheet("影片");

        assert!(state.view.is_error());
        assert_eq!(state.view.title, ERROR_TITLE);
        assert!(state.view.table.is_empty());
        for spec in [&state.view.primary, &state.view.secondary] {
            assert_eq!(spec.kind, ChartKind::Annotation);
            assert!(spec.annotation_text().unwrap().starts_with("圖表生成錯誤: "));
        }
    }

    #[test]
    fn switching_platform_drops_foreign_sheet() {
        let mut state = AppState::new(dataset());
        state.set_sheet("貼文");
        state.set_platform(Platform::Instagram);

        assert_eq!(state.selection.sheet, None);
        assert!(!state.options.comparison_visible);
        assert_eq!(state.view, DashboardView::idle());
        assert_eq!(state.sheet_options(), vec!["圖文"]);

        state.set_sheet("圖文");
        assert_eq!(state.view.primary.kind, ChartKind::Bar);
        assert_eq!(state.view.secondary.kind, ChartKind::Annotation);
        assert_eq!(state.selection.x2, None);
    }

    #[test]
    fn unknown_sheet_is_ignored() {
        let mut state = AppState::new(dataset());
        state.set_sheet("圖文");
        assert_eq!(state.selection.sheet, None);
    }

    #[test]
    fn empty_dataset_is_usable() {
        let mut state = AppState::new(Arc::new(Dataset::default()));
        assert!(state.status_message.is_some());
        assert!(state.sheet_options().is_empty());
        state.set_platform(Platform::Instagram);
        assert_eq!(state.view, DashboardView::idle());
        assert!(state.export().is_none());
    }

    #[test]
    fn export_follows_selection() {
        let mut state = AppState::new(dataset());
        assert!(state.export().is_none());
        state.set_sheet("限動");
        let export = state.export().unwrap();
        assert_eq!(export.file_name, "FB_限動_data.csv");
    }
}
