use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Any change to the widgets recomputes all
/// three charts in one go.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some((year_min, year_max)) = state.dashboard.year_bounds else {
        ui.label("No emissions records loaded.");
        return;
    };

    let mut selection = state.selection.clone();

    // ---- Basin selector ----
    ui.strong("Select Basin:");
    let current_label = state
        .dashboard
        .basin_options
        .iter()
        .find(|o| o.value == selection.basin)
        .map(|o| o.label.clone())
        .unwrap_or_else(|| selection.basin.clone());
    egui::ComboBox::from_id_salt("basin_dropdown")
        .selected_text(current_label)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in &state.dashboard.basin_options {
                ui.selectable_value(&mut selection.basin, option.value.clone(), option.label.as_str());
            }
        });
    ui.add_space(12.0);

    // ---- Year range ----
    ui.strong("Select Year Range:");
    let from_changed = ui
        .add(egui::Slider::new(&mut selection.year_from, year_min..=year_max).text("from"))
        .changed();
    let to_changed = ui
        .add(egui::Slider::new(&mut selection.year_to, year_min..=year_max).text("to"))
        .changed();
    // keep the handles ordered; the one being dragged pushes the other
    if selection.year_from > selection.year_to {
        if from_changed {
            selection.year_to = selection.year_from;
        } else if to_changed {
            selection.year_from = selection.year_to;
        }
    }
    ui.add_space(12.0);

    if ui.button("Reset filters").clicked() {
        state.reset_filters();
        return;
    }

    state.set_selection(selection);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top summary bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("U.S. EPA Methane Emissions Dashboard");
        ui.separator();

        ui.label(format!(
            "{} emission records loaded, {} visible, {} facilities",
            state.dashboard.len(),
            state.visible_records,
            state.dashboard.facilities.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
