use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::color::Theme;
use crate::data::aggregate::{AgeBand, AgeBandRate, AgeHistogram, ClassRate, FareBox, PortCount};
use crate::data::model::Pclass;

use super::percent;

/// Static chart: no panning or zooming, just hover.
macro_rules! fixed_plot {
    ($id:expr, $height:expr) => {
        Plot::new($id)
            .height($height)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
    };
}

// ---------------------------------------------------------------------------
// Survival rate per class
// ---------------------------------------------------------------------------

pub fn class_survival_chart(ui: &mut Ui, by_class: &[ClassRate], theme: Theme) {
    let colors = theme.palette(Pclass::ALL.len());
    let bars: Vec<Bar> = by_class
        .iter()
        .map(|c| {
            let n = c.pclass.number();
            Bar::new(n as f64, c.rate * 100.0)
                .name(format!("{} ({})", c.pclass.label(), percent(c.rate)))
                .fill(colors[usize::from(n) - 1])
                .width(0.6)
        })
        .collect();

    fixed_plot!("class_survival", 250.0)
        .x_axis_label("Class")
        .y_axis_label("Survival rate (%)")
        .include_y(0.0)
        .include_y(100.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Survival rate"));
        });
}

// ---------------------------------------------------------------------------
// Age distribution, survivors vs non-survivors overlaid
// ---------------------------------------------------------------------------

pub fn age_histogram_chart(ui: &mut Ui, hist: &AgeHistogram, theme: Theme) {
    let series = |counts: &[usize], color: Color32, name: &str| {
        let bars = counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(i, &n)| {
                Bar::new(hist.bin_center(i), n as f64)
                    .width(hist.bin_width)
                    .fill(color.gamma_multiply(0.65))
            })
            .collect();
        BarChart::new(bars).color(color).name(name)
    };

    fixed_plot!("age_histogram", 300.0)
        .legend(Legend::default())
        .x_axis_label("Age")
        .y_axis_label("Passengers")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(series(&hist.died, theme.died(), "Died"));
            plot_ui.bar_chart(series(&hist.survived, theme.survived(), "Survived"));
        });
}

// ---------------------------------------------------------------------------
// Fare distribution per class × outcome
// ---------------------------------------------------------------------------

pub fn fare_box_chart(ui: &mut Ui, boxes: &[FareBox], theme: Theme, show_points: bool) {
    let x_of = |b: &FareBox| b.pclass.number() as f64 + if b.survived { 0.2 } else { -0.2 };

    let plot_for = |survived: bool, color: Color32, name: &str| {
        let elems = boxes
            .iter()
            .filter(|b| b.survived == survived)
            .map(|b| {
                BoxElem::new(
                    x_of(b),
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(format!("{} / {name}", b.pclass.label()))
                .box_width(0.35)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color))
            })
            .collect();
        BoxPlot::new(elems).name(name).color(color)
    };

    fixed_plot!("fare_boxes", 300.0)
        .legend(Legend::default())
        .x_axis_label("Class")
        .y_axis_label("Fare")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(plot_for(false, theme.died(), "Died"));
            plot_ui.box_plot(plot_for(true, theme.survived(), "Survived"));
            if show_points {
                for b in boxes {
                    let x = x_of(b);
                    let pts: Vec<[f64; 2]> = b.fares.iter().map(|&f| [x, f]).collect();
                    let color = if b.survived { theme.survived() } else { theme.died() };
                    plot_ui.points(Points::new(PlotPoints::new(pts)).radius(2.0).color(color));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Survivors per port (horizontal bars)
// ---------------------------------------------------------------------------

pub fn port_survivors_chart(ui: &mut Ui, counts: &[PortCount], theme: Theme) {
    let colors = theme.palette(counts.len());
    // Highest count drawn on top.
    let bars: Vec<Bar> = counts
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (c, color))| {
            Bar::new((counts.len() - i) as f64, c.survivors as f64)
                .name(format!("{}: {}", c.port.label(), c.survivors))
                .fill(color)
                .width(0.7)
        })
        .collect();

    fixed_plot!("port_survivors", 250.0)
        .x_axis_label("Survivors")
        .show_axes([true, false])
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Survivors"));
        });
}

// ---------------------------------------------------------------------------
// Age band × class heatmap
// ---------------------------------------------------------------------------

/// Grid of coloured cells; bands without passengers in a class stay blank.
pub fn age_class_heatmap(ui: &mut Ui, cells: &[AgeBandRate], theme: Theme) {
    const CELL: Vec2 = Vec2::new(72.0, 24.0);

    egui::Grid::new("age_class_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Age band");
            for pclass in Pclass::ALL {
                ui.strong(pclass.label());
            }
            ui.end_row();

            for band in AgeBand::ALL {
                ui.label(band.to_string());
                for pclass in Pclass::ALL {
                    let (rect, response) = ui.allocate_exact_size(CELL, Sense::hover());
                    let Some(cell) = cells.iter().find(|c| c.band == band && c.pclass == pclass)
                    else {
                        continue;
                    };
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, theme.heat(cell.rate));
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        percent(cell.rate),
                        FontId::proportional(12.0),
                        theme.heat_text(cell.rate),
                    );
                    response.on_hover_text(format!(
                        "{band}, {}: {} of {} survived ({})",
                        pclass.label(),
                        cell.survivors,
                        cell.total,
                        percent(cell.rate)
                    ));
                }
                ui.end_row();
            }
        });
}
