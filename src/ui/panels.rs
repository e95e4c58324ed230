use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Platform;
use crate::resolver::{AxisOptionSet, AxisSlot};
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Left side panel – selectors and category breakdown
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("社群數據");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Platform ----
            ui.strong("平台");
            ui.horizontal(|ui: &mut Ui| {
                for platform in Platform::ALL {
                    if ui
                        .selectable_label(state.selection.platform == platform, platform.display_name())
                        .clicked()
                    {
                        state.set_platform(platform);
                    }
                }
            });
            ui.add_space(4.0);

            // ---- Sheet ----
            ui.strong("工作表");
            let sheets = state.sheet_options();
            let current = state.selection.sheet.clone();
            egui::ComboBox::from_id_salt("sheet")
                .selected_text(current.as_deref().unwrap_or("請選擇"))
                .show_ui(ui, |ui: &mut Ui| {
                    for sheet in &sheets {
                        if ui
                            .selectable_label(current.as_deref() == Some(sheet.as_str()), sheet)
                            .clicked()
                        {
                            state.set_sheet(sheet);
                        }
                    }
                });
            if sheets.is_empty() {
                ui.label(RichText::new("沒有可用的工作表").weak());
            }
            ui.separator();

            // ---- Comparison selectors ----
            if state.options.comparison_visible {
                ui.strong("比較");
                for (slot, label) in [
                    (AxisSlot::X1, "X 軸 1"),
                    (AxisSlot::Y1, "Y 軸 1"),
                    (AxisSlot::X2, "X 軸 2"),
                    (AxisSlot::Y2, "Y 軸 2"),
                ] {
                    axis_selector(ui, state, slot, label);
                }
                ui.separator();
            }

            // ---- Category breakdown ----
            ui.allocate_ui(egui::vec2(ui.available_width(), 260.0), |ui: &mut Ui| {
                plot::chart(ui, "category_pie", &state.pie);
            });
        });
}

fn axis_selector(ui: &mut Ui, state: &mut AppState, slot: AxisSlot, label: &str) {
    let set: AxisOptionSet = state.options.axis(slot).clone();
    if !set.visible {
        return;
    }
    let current = state.selection.axis(slot).map(str::to_owned);
    let shown = current
        .as_deref()
        .and_then(|v| set.label_of(v))
        .unwrap_or_default()
        .to_owned();

    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(("axis", slot))
            .selected_text(shown)
            .show_ui(ui, |ui: &mut Ui| {
                for option in &set.options {
                    let selected = current.as_deref() == Some(option.value.as_str());
                    let response = ui.add_enabled(
                        !option.disabled,
                        egui::SelectableLabel::new(selected, &option.label),
                    );
                    if response.clicked() {
                        state.set_axis(slot, &option.value);
                    }
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("檔案", |ui: &mut Ui| {
            let can_export = state.selection.sheet.is_some();
            if ui.add_enabled(can_export, egui::Button::new("下載 CSV…")).clicked() {
                save_csv_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.view.title.is_empty() {
            let mut title = RichText::new(&state.view.title).strong();
            if state.view.is_error() {
                title = title.color(Color32::RED);
            }
            ui.label(title);
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask where to save the selected sheet and write it there.
pub fn save_csv_dialog(state: &mut AppState) {
    let Some(export) = state.export() else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("下載 CSV")
        .set_file_name(&export.file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, &export.bytes) {
            Ok(()) => {
                log::info!("Wrote {} bytes to {}", export.bytes.len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                state.status_message = Some(format!("下載失敗: {e}"));
            }
        }
    }
}
