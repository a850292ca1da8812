use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::color::Theme;
use crate::data::model::{Pclass, Port, Sex};
use crate::state::AppState;

use super::{charts, tables};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🚢 Titanic Survival");
    ui.label("Adjust the filters to explore survival patterns.");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Sex");
            for sex in Sex::ALL {
                if !state.dataset.sexes.contains(&sex) {
                    continue;
                }
                let mut checked = state.filters.sexes().contains(&sex);
                if ui.checkbox(&mut checked, sex.as_str()).changed() {
                    state.toggle_sex(sex);
                }
            }
            ui.add_space(4.0);

            ui.strong("Class");
            for pclass in Pclass::ALL {
                let mut checked = state.filters.classes().contains(&pclass);
                if ui.checkbox(&mut checked, pclass.label()).changed() {
                    state.toggle_class(pclass);
                }
            }
            ui.add_space(4.0);

            ui.strong("Embarked");
            for port in Port::ALL {
                if !state.dataset.ports.contains(&port) {
                    continue;
                }
                let mut checked = state.filters.ports().contains(&port);
                if ui.checkbox(&mut checked, port.label()).changed() {
                    state.toggle_port(port);
                }
            }
            let mut include_port = state.filters.include_missing_port();
            if ui
                .checkbox(&mut include_port, "Keep unknown port")
                .on_hover_text("Only applies while at least one port is selected")
                .changed()
            {
                state.set_include_missing_port(include_port);
            }
            ui.small("Nothing ticked in a group means no restriction.");
            ui.separator();

            age_controls(ui, state);
            ui.add_space(4.0);
            fare_controls(ui, state);
            ui.separator();

            ui.strong("Display");
            egui::ComboBox::from_id_salt("theme")
                .selected_text(state.theme.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for theme in Theme::ALL {
                        ui.selectable_value(&mut state.theme, theme, theme.name());
                    }
                });
            ui.checkbox(&mut state.show_outliers, "Show every fare point");
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
            ui.separator();

            ui.strong("Selection");
            ui.label(format!("Filtered passengers: {}", state.visible_indices.len()));
            ui.small(state.filters.to_string());
        });
}

fn age_controls(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.dataset.age_bounds;
    let age = state.filters.age();
    let (mut lo, mut hi) = (age.min(), age.max());
    let mut include_missing = state.filters.include_missing_age();

    ui.strong("Age");
    let mut changed = ui
        .toggle_value(&mut include_missing, "Include unknown ages")
        .changed();
    changed |= ui
        .add(Slider::new(&mut lo, bounds.min()..=bounds.max()).text("from"))
        .changed();
    changed |= ui
        .add(Slider::new(&mut hi, bounds.min()..=bounds.max()).text("to"))
        .changed();
    if changed {
        state.set_age_range(lo, hi, include_missing);
    }
}

fn fare_controls(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.dataset.fare_bounds;
    let fare = state.filters.fare();
    let (mut lo, mut hi) = (fare.min(), fare.max());

    ui.strong("Fare");
    let mut changed = ui
        .add(Slider::new(&mut lo, bounds.min()..=bounds.max()).text("from"))
        .changed();
    changed |= ui
        .add(Slider::new(&mut hi, bounds.min()..=bounds.max()).text("to"))
        .changed();
    if changed {
        state.set_fare_range(lo, hi);
    }
}

// ---------------------------------------------------------------------------
// Central panel – metrics and distributions
// ---------------------------------------------------------------------------

pub fn main_panel(ui: &mut Ui, state: &AppState) {
    let summary = &state.summary;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.columns(2, |cols| {
                cols[0].heading("Key figures");
                tables::survival_metrics(&mut cols[0], &summary.counts);

                cols[1].heading("Survival by class");
                charts::class_survival_chart(&mut cols[1], &summary.by_class, state.theme);
                cols[1].small("Survivors in a class divided by passengers in that class.");
            });
            ui.separator();

            if summary.rows == 0 {
                ui.label("No passengers match the current filters. Adjust the side panel.");
                return;
            }

            ui.heading("Age distribution");
            if summary.age_histogram.bins() == 0 {
                ui.label("No passenger in the selection has a known age.");
            } else {
                charts::age_histogram_chart(ui, &summary.age_histogram, state.theme);
            }
            ui.separator();

            ui.heading("Fare by class and outcome");
            charts::fare_box_chart(ui, &summary.fare_boxes, state.theme, state.show_outliers);
            ui.separator();

            ui.heading("Survival by age band and class");
            charts::age_class_heatmap(ui, &summary.age_class, state.theme);
            ui.small("Each cell is the mean survival of that age band and class.");
            ui.separator();

            ui.heading("Survival by class and port");
            tables::class_port_table(ui, &summary.class_port);
        });
}

// ---------------------------------------------------------------------------
// Right side panel – top groups
// ---------------------------------------------------------------------------

pub fn top_groups_panel(ui: &mut Ui, state: &AppState) {
    let summary = &state.summary;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Top groups");
            if summary.rows == 0 {
                ui.label("No passengers match the current filters.");
            } else {
                ui.strong("Survivors by port");
                if summary.port_survivors.is_empty() {
                    ui.label("No survivors with a known port.");
                } else {
                    charts::port_survivors_chart(ui, &summary.port_survivors, state.theme);
                }
                ui.separator();

                ui.strong("Sex × class survival");
                tables::sex_class_table(ui, &summary.top_sex_class);
                ui.separator();

                ui.strong("Surnames with most survivors");
                if summary.top_surnames.is_empty() {
                    ui.label("No survivors in the selection.");
                } else {
                    tables::surname_table(ui, &summary.top_surnames);
                }
            }
            ui.separator();

            ui.collapsing("About the dataset", |ui: &mut Ui| {
                ui.hyperlink_to("Kaggle Titanic dataset", "https://www.kaggle.com/c/titanic");
                ui.label("Survived: 1 = survived, 0 = died");
                ui.label("Pclass: ticket class (1 = upper, 2 = middle, 3 = lower)");
                ui.label("Age: some values missing");
                ui.label("SibSp / Parch: siblings-spouses / parents-children aboard");
                ui.label("Cabin: mostly missing");
                ui.label("Embarked: C = Cherbourg, Q = Queenstown, S = Southampton");
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
            if ui.button("Export summary…").clicked() {
                ui.close_menu();
                match export_summary(state) {
                    Ok(Some(path)) => {
                        log::info!("Exported summary to {}", path.display());
                        state.status_message = None;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::error!("Failed to export summary: {e:#}");
                        state.status_message = Some(format!("Error: {e:#}"));
                    }
                }
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.label(format!(
            "{} passengers loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the current summary as JSON. `Ok(None)` when the dialog is cancelled.
pub fn export_summary(state: &AppState) -> Result<Option<PathBuf>> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("titanic_summary.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return Ok(None);
    };
    let json = serde_json::to_string_pretty(&state.summary).context("serializing summary")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}
