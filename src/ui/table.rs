use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::report::PreviewTable;

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 400.0;

/// Render the raw data preview.
pub fn preview_table(ui: &mut Ui, preview: &PreviewTable) {
    ui.label(format!(
        "Showing {} of {} matching rows",
        preview.rows.len(),
        preview.total_rows
    ));

    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("preview_table", |ui: &mut Ui| {
                let mut table = TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .max_scroll_height(MAX_TABLE_HEIGHT);
                for _ in &preview.headers {
                    table = table.column(Column::auto().at_least(60.0).clip(true));
                }

                table
                    .header(20.0, |mut header| {
                        for name in &preview.headers {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, preview.rows.len(), |mut row| {
                            let cells = &preview.rows[row.index()];
                            for i in 0..preview.headers.len() {
                                let text = cells.get(i).map(String::as_str).unwrap_or("");
                                row.col(|ui: &mut Ui| {
                                    ui.label(text);
                                });
                            }
                        });
                    });
            });
        });
}
