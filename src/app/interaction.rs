use eframe::egui::{self, PointerButton, Pos2, Ui};
use workspace_map::map::NodeId;
use workspace_map::view::MapView;

use super::render::to_map;

#[derive(Debug, Default)]
pub(super) struct PointerOutcome {
    /// Workspace whose element map was asked for.
    pub element_map: Option<NodeId>,
    /// A gesture grabbed or reshaped the map.
    pub changed: bool,
}

/// Maps pointer events on the canvas onto view operations. Shift plus a
/// secondary click asks for the element map of the workspace under the
/// pointer instead of focusing it.
pub(super) fn handle_pointer(
    ui: &Ui,
    response: &egui::Response,
    origin: Pos2,
    view: &mut MapView,
) -> PointerOutcome {
    let mut outcome = PointerOutcome::default();
    let (press_origin, latest) =
        ui.input(|input| (input.pointer.press_origin(), input.pointer.latest_pos()));
    let pointer = response
        .interact_pointer_pos()
        .or(latest)
        .map(|pos| to_map(origin, pos));

    if response.drag_started_by(PointerButton::Primary)
        && let Some(point) = press_origin.map(|pos| to_map(origin, pos)).or(pointer)
    {
        // Grab what was under the pointer when the button went down.
        outcome.changed |= view.press(point).is_some();
    }
    if let Some(point) = pointer {
        if response.dragged_by(PointerButton::Primary) {
            view.drag(point);
        }
        if response.drag_stopped_by(PointerButton::Primary) {
            view.release(point);
        }
    }

    let Some(point) = pointer else {
        return outcome;
    };
    if response.double_clicked_by(PointerButton::Primary) {
        outcome.changed |= view.double_click(point).is_some();
    } else if response.clicked_by(PointerButton::Secondary) {
        if ui.input(|input| input.modifiers.shift) {
            outcome.element_map = view
                .pick_at(point)
                .filter(|&id| view.graph().node(id).workspace().is_some());
        } else {
            outcome.changed |= view.secondary_click(point).is_some();
        }
    }

    outcome
}
