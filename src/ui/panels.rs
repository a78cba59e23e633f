use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::{category_options, YearSelection};
use crate::report::layout::YearControl;
use crate::report::SectionBody;
use crate::state::AppState;
use crate::ui::{plot, table};

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 0);

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the Arc so the state can be mutated while reading the data.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    match state.layout.slider_range(&dataset) {
        None => {
            ui.label("No dated accidents in this file.");
        }
        Some((min, max)) => match state.layout.year_control {
            YearControl::Range => year_range_controls(ui, state, min, max),
            YearControl::Single => single_year_control(ui, state, min, max),
        },
    }

    let Some(column) = state.layout.category_filter else {
        return;
    };
    ui.separator();
    ui.strong(column.label());

    let Some(options) = category_options(&dataset, column) else {
        ui.colored_label(WARNING_COLOR, format!("{} data is missing.", column.label()));
        return;
    };

    let current = state.selected_category().map(str::to_string);
    let mut choice = current.clone();
    egui::ComboBox::from_id_salt("category_filter")
        .selected_text(current.as_deref().unwrap_or("All categories"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut choice, None, "All categories");
            for value in options {
                ui.selectable_value(&mut choice, Some(value.clone()), value);
            }
        });
    if choice != current {
        state.set_category(choice.as_deref());
    }
}

fn year_range_controls(ui: &mut Ui, state: &mut AppState, min: i32, max: i32) {
    ui.strong("Select Year Range");
    let (mut low, mut high) = match state.criteria.years {
        YearSelection::Range { low, high } => (low, high),
        _ => (min, max),
    };

    let low_changed = ui.add(Slider::new(&mut low, min..=max).text("From")).changed();
    let high_changed = ui.add(Slider::new(&mut high, min..=max).text("To")).changed();

    // Keep the range ordered by dragging the other end along.
    if low > high {
        if low_changed {
            high = low;
        } else {
            low = high;
        }
    }
    if low_changed || high_changed {
        state.set_years(YearSelection::Range { low, high });
    }
}

fn single_year_control(ui: &mut Ui, state: &mut AppState, min: i32, max: i32) {
    ui.strong("Select Year");
    let mut year = match state.criteria.years {
        YearSelection::Single(y) => y,
        _ => max,
    };
    if ui.add(Slider::new(&mut year, min..=max)).changed() {
        state.set_years(YearSelection::Single(year));
    }
}

// ---------------------------------------------------------------------------
// Central panel – metrics, charts, recommendations, preview
// ---------------------------------------------------------------------------

/// Render the dashboard produced by the last re-run.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(dashboard) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an accident dataset  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new(&state.layout.title).size(26.0));
            ui.label(&state.layout.subtitle);
            ui.add_space(8.0);

            ui.horizontal(|ui: &mut Ui| {
                metric(ui, "Total Accidents", dashboard.metrics.total_accidents.to_string());
                metric(
                    ui,
                    "Total Fatal Injuries",
                    dashboard.metrics.total_fatal_injuries.to_string(),
                );
            });

            for (i, section) in dashboard.sections.iter().enumerate() {
                ui.add_space(12.0);
                ui.heading(&section.heading);
                match &section.body {
                    SectionBody::Chart(chart) => plot::chart(ui, chart, &format!("section_{i}")),
                    SectionBody::Warning(message) => {
                        ui.colored_label(WARNING_COLOR, format!("⚠ {message}"));
                    }
                }
            }

            ui.add_space(12.0);
            ui.heading("Business Recommendations");
            for group in dashboard.recommendations {
                ui.add_space(4.0);
                ui.strong(group.title);
                for point in group.points {
                    ui.label(format!("  • {point}"));
                }
            }

            ui.add_space(12.0);
            ui.heading("Raw Data Preview");
            table::preview_table(ui, &dashboard.preview);
        });
}

fn metric(ui: &mut Ui, title: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(title);
            ui.label(RichText::new(value).size(22.0).strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.data_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let matching = state
                .dashboard
                .as_ref()
                .map(|d| d.metrics.total_accidents)
                .unwrap_or(0);
            ui.label(format!("{} accidents loaded, {matching} match", ds.len()));
            if ds.dropped_rows > 0 {
                ui.label(format!("({} rows without a valid date skipped)", ds.dropped_rows));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open accident data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(path);
    }
}
