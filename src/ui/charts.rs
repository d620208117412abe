use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, ScrollArea, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::color::{ColorMap, heat_color};
use crate::data::pipeline::{PipelineHalt, Severity, run_pipeline};
use crate::data::views::{
    BarAggregate, PivotMatrix, TrendSeries, bar_aggregate, pivot_matrix, trend_series,
};
use crate::state::AppState;

/// Seconds per revealed year during trend playback.
const PLAYBACK_STEP_SECS: f64 = 0.8;

// ---------------------------------------------------------------------------
// Central panel – pipeline outcome
// ---------------------------------------------------------------------------

/// Run the pipeline against the current selection and render the three
/// charts, or the halt message that stopped the run.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(workbook) = &state.workbook else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Please upload a file  (File → Open…)");
        });
        return;
    };

    let (bars, trend, pivot, metric) = match run_pipeline(workbook, &state.selection) {
        Ok(output) => (
            bar_aggregate(&output.table, &output.metric),
            trend_series(&output.table, &output.metric),
            pivot_matrix(&output.table, &output.metric),
            output.metric,
        ),
        Err(halt) => {
            halt_message(ui, &halt);
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("{metric} by County"));
            bar_chart(ui, &bars, &metric);
            ui.separator();

            ui.heading(format!("Trend of {metric} Over Time"));
            trend_chart(ui, state, &trend, &metric);
            ui.separator();

            ui.heading(format!("Heatmap of {metric} by Year and County"));
            heatmap(ui, &pivot);
        });
}

fn halt_message(ui: &mut Ui, halt: &PipelineHalt) {
    let color = match halt.severity() {
        Severity::Warning => Color32::YELLOW,
        Severity::Error => Color32::RED,
    };
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(halt.to_string()).color(color).heading());
    });
}

// ---------------------------------------------------------------------------
// Bar chart – metric totals per county
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, aggregate: &BarAggregate, metric: &str) {
    let bars: Vec<Bar> = aggregate
        .bars
        .iter()
        .enumerate()
        .map(|(i, (county, total))| {
            Bar::new(i as f64, *total)
                .name(county)
                .width(0.6)
                .fill(Color32::LIGHT_BLUE)
        })
        .collect();

    let labels: Vec<String> = aggregate.bars.iter().map(|(c, _)| c.clone()).collect();

    Plot::new("bar_chart")
        .height(260.0)
        .y_axis_label(metric.to_string())
        .x_axis_label("County")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round() as i64;
            if (mark.value - idx as f64).abs() > f64::EPSILON {
                return String::new();
            }
            labels
                .get(usize::try_from(idx).unwrap_or(usize::MAX))
                .cloned()
                .unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(metric));
        });
}

// ---------------------------------------------------------------------------
// Trend chart – one line per county, with Year playback
// ---------------------------------------------------------------------------

fn trend_chart(ui: &mut Ui, state: &mut AppState, trend: &TrendSeries, metric: &str) {
    if trend.years.is_empty() {
        ui.label("No numeric values to plot.");
        return;
    }
    let last_year = trend.years.len() - 1;
    state.playback.cursor = state.playback.cursor.min(last_year);

    // ---- Playback controls ----
    ui.horizontal(|ui: &mut Ui| {
        let icon = if state.playback.playing { "⏸" } else { "▶" };
        if ui.button(icon).clicked() {
            state.playback.playing = !state.playback.playing;
            // Restart from the beginning when playing off the end.
            if state.playback.playing && state.playback.cursor == last_year {
                state.playback.cursor = 0;
            }
            state.playback.last_advance = ui.input(|i| i.time);
        }
        let cursor_label = trend.years[state.playback.cursor].clone();
        ui.add(
            egui::Slider::new(&mut state.playback.cursor, 0..=last_year)
                .show_value(false)
                .text(cursor_label),
        );
    });

    // ---- Advance the cursor while playing ----
    if state.playback.playing {
        let now = ui.input(|i| i.time);
        if now - state.playback.last_advance >= PLAYBACK_STEP_SECS {
            state.playback.cursor += 1;
            state.playback.last_advance = now;
            if state.playback.cursor >= last_year {
                state.playback.cursor = last_year;
                state.playback.playing = false;
            }
        }
        ui.ctx().request_repaint();
    }

    let cursor = state.playback.cursor;
    let counties = trend.counties();
    let color_map = ColorMap::new(&counties);
    let year_labels = trend.years.clone();

    Plot::new("trend_chart")
        .height(260.0)
        .legend(egui_plot::Legend::default())
        .y_axis_label(metric.to_string())
        .x_axis_label("Year")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round() as i64;
            if (mark.value - idx as f64).abs() > f64::EPSILON {
                return String::new();
            }
            year_labels
                .get(usize::try_from(idx).unwrap_or(usize::MAX))
                .cloned()
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for county in &counties {
                let color = color_map.color_for(county);

                // Points up to the playback cursor, in row order.
                let coords: Vec<[f64; 2]> = trend
                    .points
                    .iter()
                    .filter(|p| p.county == *county && p.year_index <= cursor)
                    .map(|p| [p.year_index as f64, p.value])
                    .collect();
                if coords.is_empty() {
                    continue;
                }

                let line_points: PlotPoints = coords.clone().into();
                plot_ui.line(Line::new(line_points).name(county).color(color).width(1.5));

                let marker_points: PlotPoints = coords.into();
                plot_ui.points(Points::new(marker_points).color(color).radius(3.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap – metric across years and counties
// ---------------------------------------------------------------------------

const HEAT_CELL_HEIGHT: f32 = 28.0;
const HEAT_LABEL_WIDTH: f32 = 64.0;

fn heatmap(ui: &mut Ui, pivot: &PivotMatrix) {
    if pivot.is_empty() {
        ui.label("No numeric values to plot.");
        return;
    }
    let Some((lo, hi)) = pivot.value_range() else {
        ui.label("No numeric values to plot.");
        return;
    };
    let span = (hi - lo).max(f64::EPSILON);

    let n_cols = pivot.counties.len();
    let n_rows = pivot.years.len();
    let cell_w = ((ui.available_width() - HEAT_LABEL_WIDTH) / n_cols as f32).clamp(40.0, 160.0);

    let size = Vec2::new(
        HEAT_LABEL_WIDTH + cell_w * n_cols as f32,
        HEAT_CELL_HEIGHT * (n_rows + 1) as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let text_color = ui.visuals().text_color();

    // Column headers.
    for (ci, county) in pivot.counties.iter().enumerate() {
        let pos = origin
            + Vec2::new(
                HEAT_LABEL_WIDTH + (ci as f32 + 0.5) * cell_w,
                HEAT_CELL_HEIGHT * 0.5,
            );
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            county,
            FontId::proportional(12.0),
            text_color,
        );
    }

    // Row labels and cells.
    for (yi, year) in pivot.years.iter().enumerate() {
        let row_top = origin.y + HEAT_CELL_HEIGHT * (yi + 1) as f32;
        painter.text(
            egui::pos2(origin.x + HEAT_LABEL_WIDTH - 6.0, row_top + HEAT_CELL_HEIGHT * 0.5),
            Align2::RIGHT_CENTER,
            year,
            FontId::proportional(12.0),
            text_color,
        );

        for ci in 0..n_cols {
            let rect = Rect::from_min_size(
                egui::pos2(origin.x + HEAT_LABEL_WIDTH + ci as f32 * cell_w, row_top),
                Vec2::new(cell_w - 2.0, HEAT_CELL_HEIGHT - 2.0),
            );
            match pivot.values[yi][ci] {
                Some(value) => {
                    let t = (value - lo) / span;
                    painter.rect_filled(rect, egui::CornerRadius::same(2), heat_color(t));
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{value}"),
                        FontId::proportional(11.0),
                        Color32::WHITE,
                    );
                }
                None => {
                    painter.rect_filled(
                        rect,
                        egui::CornerRadius::same(2),
                        ui.visuals().faint_bg_color,
                    );
                }
            }
        }
    }

    // Color-scale legend.
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{lo}"));
        let (response, painter) = ui.allocate_painter(Vec2::new(120.0, 12.0), Sense::hover());
        let rect = response.rect;
        let steps = 24;
        let step_w = rect.width() / steps as f32;
        for i in 0..steps {
            let t = i as f64 / (steps - 1) as f64;
            let r = Rect::from_min_size(
                egui::pos2(rect.min.x + i as f32 * step_w, rect.min.y),
                Vec2::new(step_w + 0.5, rect.height()),
            );
            painter.rect_filled(r, egui::CornerRadius::ZERO, heat_color(t));
        }
        ui.label(format!("{hi}"));
    });
}
