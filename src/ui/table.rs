use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::ui::panels::save_csv_dialog;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Data table with paging
// ---------------------------------------------------------------------------

/// Render the selected sheet, one page at a time, with the download button.
pub fn data_table(ui: &mut Ui, state: &mut AppState, page_size: usize) {
    let page_count = state.view.table.page_count(page_size);
    state.page = state.page.min(page_count - 1);

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(&state.view.title);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            if ui
                .add_enabled(state.selection.sheet.is_some(), egui::Button::new("下載 CSV"))
                .clicked()
            {
                save_csv_dialog(state);
            }
            ui.separator();
            if ui.add_enabled(state.page + 1 < page_count, egui::Button::new("▶")).clicked() {
                state.page += 1;
            }
            ui.label(format!("{} / {page_count}", state.page + 1));
            if ui.add_enabled(state.page > 0, egui::Button::new("◀")).clicked() {
                state.page -= 1;
            }
        });
    });
    ui.separator();

    let projection = &state.view.table;
    if projection.is_empty() {
        ui.label(RichText::new("沒有資料").weak());
        return;
    }
    let rows = projection.page(state.page, page_size);

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0).clip(true), projection.columns.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for column in &projection.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}
