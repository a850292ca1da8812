use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{PortPivot, SexClassRate, SurnameCount, SurvivalCounts};

use super::percent;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Metric tiles
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String, delta: String, delta_color: Color32) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(label);
            ui.heading(RichText::new(value).strong());
            ui.label(RichText::new(delta).color(delta_color));
        });
    });
}

/// Survivor and casualty tiles with their share of the filtered passengers.
pub fn survival_metrics(ui: &mut Ui, counts: &SurvivalCounts) {
    let pct = counts.rate_percent();
    metric(
        ui,
        "Survivors",
        counts.survived.to_string(),
        format!("▲ {pct:.1}%"),
        Color32::from_rgb(0, 140, 60),
    );
    ui.add_space(6.0);
    metric(
        ui,
        "Casualties",
        counts.died.to_string(),
        format!("▼ {:.1}%", 100.0 - pct),
        Color32::from_rgb(200, 40, 40),
    );
}

// ---------------------------------------------------------------------------
// Class × port pivot
// ---------------------------------------------------------------------------

pub fn class_port_table(ui: &mut Ui, pivot: &PortPivot) {
    ui.push_id("class_port_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(70.0))
            .columns(Column::auto().at_least(110.0), pivot.ports.len())
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui| {
                    ui.strong("Class");
                });
                for port in &pivot.ports {
                    header.col(|ui| {
                        ui.strong(port.label());
                    });
                }
            })
            .body(|mut body| {
                for row in &pivot.rows {
                    body.row(ROW_HEIGHT, |mut r| {
                        r.col(|ui| {
                            ui.label(row.pclass.to_string());
                        });
                        for cell in &row.cells {
                            r.col(|ui| {
                                match cell {
                                    Some(rate) => ui.label(percent(*rate)),
                                    None => ui.weak("–"),
                                };
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Ranked tables
// ---------------------------------------------------------------------------

pub fn sex_class_table(ui: &mut Ui, rows: &[SexClassRate]) {
    ui.push_id("sex_class_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), 3)
            .header(ROW_HEIGHT, |mut header| {
                for title in ["Sex", "Class", "Survival"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(ROW_HEIGHT, |mut r| {
                        r.col(|ui| {
                            ui.label(row.sex.as_str());
                        });
                        r.col(|ui| {
                            ui.label(row.pclass.to_string());
                        });
                        r.col(|ui| {
                            ui.label(percent(row.rate));
                        });
                    });
                }
            });
    });
}

pub fn surname_table(ui: &mut Ui, rows: &[SurnameCount]) {
    ui.push_id("surname_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(120.0))
            .column(Column::auto().at_least(70.0))
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui| {
                    ui.strong("Last name");
                });
                header.col(|ui| {
                    ui.strong("Survivors");
                });
            })
            .body(|mut body| {
                for row in rows {
                    body.row(ROW_HEIGHT, |mut r| {
                        r.col(|ui| {
                            ui.label(&row.last_name);
                        });
                        r.col(|ui| {
                            ui.label(row.survivors.to_string());
                        });
                    });
                }
            });
    });
}
