use std::sync::Arc;

use eframe::egui::{self, RichText, Sense, Ui, vec2};
use workspace_map::map::{EdgeKind, ElementKind, LabelMode};
use workspace_map::stats::{ColoringMode, Legend, edge_color};
use workspace_map::view::{EdgeScope, MapView};

use super::{MAX_EDGE_LENGTH, MIN_EDGE_LENGTH, MapModel};

const MAX_LISTED_HITS: usize = 12;

impl MapModel {
    pub(super) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Map Controls");
        ui.separator();
        ui.add_space(4.0);

        if ui
            .checkbox(&mut self.animate, "Animate layout")
            .on_hover_text("Run the force simulation in the background.")
            .changed()
        {
            self.canvas.set_animated(self.animate);
            for window in &mut self.element_windows {
                window.canvas.set_animated(self.animate);
            }
        }

        let shared = Arc::clone(self.canvas.view());
        let mut view = shared.lock();

        if ui
            .add(
                egui::Slider::new(&mut self.edge_length, MIN_EDGE_LENGTH..=MAX_EDGE_LENGTH)
                    .text("Edge length")
                    .clamping(egui::SliderClamping::Always),
            )
            .changed()
        {
            view.set_edge_length(self.edge_length);
        }

        ui.separator();
        draw_appearance(ui, &mut view);

        ui.separator();
        ui.label(RichText::new("Links").strong());
        draw_edge_kinds(ui, &mut view);

        ui.horizontal(|ui| {
            let mut scope = view.state().scope;
            ui.radio_value(&mut scope, EdgeScope::Subgraph, "Shown nodes only")
                .on_hover_text("Newly shown links only join nodes already on screen.");
            ui.radio_value(&mut scope, EdgeScope::WholeGraph, "Whole graph")
                .on_hover_text("Newly shown links also pull in their hidden far ends.");
            if scope != view.state().scope {
                view.set_scope(scope);
            }
        });

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button("Expand all").clicked() {
                view.expand_all();
            }
            if ui.button("Collapse all").clicked() {
                view.collapse_all();
            }
            if ui
                .add_enabled(view.state().focus.is_some(), egui::Button::new("Leave focus"))
                .clicked()
            {
                view.focus_off();
            }
        });
        ui.small("Double-click toggles a subtree, right-click focuses, shift+right-click opens the element map.");

        ui.separator();
        ui.label("Search labels");
        ui.text_edit_singleline(&mut self.search);
        self.draw_search_hits(ui, &mut view);

        if let Some(legend) = view.legend() {
            ui.separator();
            draw_legend(ui, &legend);
        }
    }

    fn draw_search_hits(&self, ui: &mut Ui, view: &mut MapView) {
        let Some((query, hits)) = &self.search_cache else {
            return;
        };
        if query != self.search.trim() {
            return;
        }
        if hits.is_empty() {
            ui.weak("No matches.");
            return;
        }

        for &id in hits.iter().take(MAX_LISTED_HITS) {
            let node = view.graph().node(id);
            let label = node.full_label().to_owned();
            let visible = node.visible;
            ui.horizontal(|ui| {
                ui.label(label);
                if ui
                    .add_enabled(visible, egui::Button::new("Focus").small())
                    .on_disabled_hover_text("Expand its parent to show it first.")
                    .clicked()
                {
                    // Hits come from this view's own graph.
                    let _ = view.focus_on(id);
                }
            });
        }
        if hits.len() > MAX_LISTED_HITS {
            ui.weak(format!("and {} more", hits.len() - MAX_LISTED_HITS));
        }
    }
}

fn draw_appearance(ui: &mut Ui, view: &mut MapView) {
    let mut coloring = view.state().coloring;
    egui::ComboBox::from_label("Coloring")
        .selected_text(coloring.label())
        .show_ui(ui, |ui| {
            for mode in ColoringMode::ALL {
                ui.selectable_value(&mut coloring, mode, mode.label());
            }
        });
    if coloring != view.state().coloring {
        view.set_coloring(coloring);
    }

    let mut label_mode = view.state().label_mode;
    ui.horizontal(|ui| {
        ui.label("Labels");
        ui.selectable_value(&mut label_mode, LabelMode::Short, "Short");
        ui.selectable_value(&mut label_mode, LabelMode::Long, "Full");
    });
    if label_mode != view.state().label_mode {
        view.set_label_mode(label_mode);
    }
}

fn draw_edge_kinds(ui: &mut Ui, view: &mut MapView) {
    egui::Grid::new("edge_kinds")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            ui.label("");
            ui.label("Show");
            ui.label("Pull");
            ui.end_row();

            for kind in EdgeKind::ALL {
                ui.colored_label(edge_color(kind), kind.label());

                let mut shown = view.state().visible_kinds.contains(kind);
                if ui.checkbox(&mut shown, "").changed() {
                    view.set_edge_kind_visible(kind, shown);
                }
                let mut pulls = view.state().force_kinds.contains(kind);
                if ui.checkbox(&mut pulls, "").changed() {
                    view.set_edge_kind_force(kind, pulls);
                }
                ui.end_row();
            }
        });
}

pub(super) fn draw_element_filters(ui: &mut Ui, view: &mut MapView) {
    ui.horizontal_wrapped(|ui| {
        for kind in ElementKind::ALL {
            let mut shown = !view.state().hidden_elements.contains(&kind);
            if ui.checkbox(&mut shown, kind.label()).changed() {
                view.set_element_kind_visible(kind, shown);
            }
        }
    });
}

fn draw_legend(ui: &mut Ui, legend: &Legend) {
    ui.label(RichText::new(legend.title).strong());
    egui::ScrollArea::vertical()
        .id_salt("legend")
        .max_height(240.0)
        .show(ui, |ui| {
            egui::Grid::new("legend_rows").num_columns(3).show(ui, |ui| {
                ui.label("");
                ui.label(legend.value_axis);
                ui.label(legend.count_axis);
                ui.end_row();

                for row in &legend.rows {
                    let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, row.color);
                    ui.label(row.key.as_str());
                    ui.label(row.count.to_string());
                    ui.end_row();
                }
            });
        });
}
