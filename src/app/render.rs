use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, Vec2, vec2,
};
use workspace_map::map::{ArrowMode, Edge, NodeId};
use workspace_map::stats::{edge_color, text_color_for};
use workspace_map::view::MapView;

use super::MapCanvas;

const LABEL_FONT_SIZE: f32 = 12.0;
const LABEL_PADDING: Vec2 = vec2(10.0, 4.0);
const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.0;
const BACKGROUND: Color32 = Color32::from_rgb(236, 238, 240);
const HIGHLIGHT: Color32 = Color32::from_rgb(255, 64, 160);

impl MapCanvas {
    /// Paints the map into the remaining space and feeds pointer input to
    /// the view. Returns a workspace whose element map was requested.
    /// Gestures that change the map restart a stopped ticker.
    pub(super) fn draw(&mut self, ui: &mut Ui, highlight: &HashSet<NodeId>) -> Option<NodeId> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let shared = Arc::clone(self.view());
        let mut view = shared.lock();
        if rect.width() > 0.0 && rect.height() > 0.0 {
            view.set_viewport(rect.size());
        }

        let outcome = super::interaction::handle_pointer(ui, &response, rect.min, &mut view);
        if response.hovered()
            && let Some(pointer) = response.hover_pos()
            && view.pick_at(to_map(rect.min, pointer)).is_some()
        {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        for (_, edge) in view.graph().edges() {
            draw_edge(&painter, &view, rect.min, edge);
        }

        let visible = view
            .graph()
            .visible_nodes()
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        for id in visible {
            draw_node(&painter, &mut view, rect.min, id, highlight.contains(&id));
        }
        drop(view);

        if outcome.changed {
            self.wake();
        }
        outcome.element_map
    }
}

pub(super) fn to_map(origin: Pos2, screen: Pos2) -> Pos2 {
    (screen - origin).to_pos2()
}

fn draw_edge(painter: &Painter, view: &MapView, origin: Pos2, edge: &Edge) {
    let graph = view.graph();
    let (from, to) = (graph.node(edge.from()), graph.node(edge.to()));
    if !(edge.visible && from.visible && to.visible) {
        return;
    }

    let start = origin + from.pos.to_vec2();
    let end = origin + to.pos.to_vec2();
    let direction = (end - start).normalized();
    let shift = direction.rot90() * edge.kind().paint_offset();
    let (start, end) = (start + shift, end + shift);

    let color = edge_color(edge.kind());
    painter.line_segment([start, end], Stroke::new(1.2, color));

    // Arrow tips sit on the target's box edge, not its centre.
    match edge.arrow() {
        ArrowMode::None => {}
        ArrowMode::To => draw_arrow_head(painter, start, end, to.label_size, color),
        ArrowMode::From => draw_arrow_head(painter, end, start, from.label_size, color),
        ArrowMode::Both => {
            draw_arrow_head(painter, start, end, to.label_size, color);
            draw_arrow_head(painter, end, start, from.label_size, color);
        }
    }

    if edge.shows_weight_label() {
        painter.text(
            start + (end - start) * 0.5,
            Align2::CENTER_CENTER,
            edge.weight.to_string(),
            FontId::proportional(LABEL_FONT_SIZE - 2.0),
            color,
        );
    }
}

fn draw_arrow_head(painter: &Painter, start: Pos2, end: Pos2, target_size: Vec2, color: Color32) {
    let direction = (end - start).normalized();
    if direction == Vec2::ZERO {
        return;
    }

    let half = target_size * 0.5;
    let reach_x = if direction.x == 0.0 { f32::INFINITY } else { half.x / direction.x.abs() };
    let reach_y = if direction.y == 0.0 { f32::INFINITY } else { half.y / direction.y.abs() };
    let tip = end - direction * reach_x.min(reach_y);

    let back = tip - direction * ARROW_LENGTH;
    let side = direction.rot90() * ARROW_HALF_WIDTH;
    painter.add(egui::Shape::convex_polygon(
        vec![tip, back + side, back - side],
        color,
        Stroke::NONE,
    ));
}

fn draw_node(painter: &Painter, view: &mut MapView, origin: Pos2, id: NodeId, highlighted: bool) {
    let fill = view.node_color(id);
    let node = view.graph().node(id);
    let text_color = text_color_for(fill);
    let galley = painter.layout_no_wrap(
        node.label().to_owned(),
        FontId::proportional(LABEL_FONT_SIZE),
        text_color,
    );

    let size = galley.size() + LABEL_PADDING;
    if node.label_size != size {
        // Measured once per label change; the id comes straight from the graph.
        let _ = view.set_label_size(id, size);
    }

    let node = view.graph().node(id);
    let bounds = Rect::from_center_size(origin + node.pos.to_vec2(), size);
    painter.rect_filled(bounds, 2.0, fill);

    let outline = if highlighted {
        Stroke::new(2.5, HIGHLIGHT)
    } else if node.focus {
        Stroke::new(2.0, Color32::BLACK)
    } else {
        Stroke::new(1.0, Color32::from_gray(60))
    };
    painter.rect_stroke(bounds, 2.0, outline, egui::StrokeKind::Outside);

    if node.has_children() && view.graph().is_visible_leaf(id) {
        // Collapsed subtree marker.
        painter.circle_filled(bounds.right_top(), 3.0, Color32::from_gray(60));
    }

    painter.galley(bounds.min + LABEL_PADDING * 0.5, galley, text_color);
}
