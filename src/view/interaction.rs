use eframe::egui::Pos2;

use crate::map::NodeId;

use super::{MapView, Pick};

impl MapView {
    /// The shown node under `point` whose centre is closest to it.
    pub fn pick_at(&self, point: Pos2) -> Option<NodeId> {
        self.graph
            .visible_nodes()
            .filter(|(_, node)| node.contains(point))
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .distance_sq(point)
                    .total_cmp(&b.pos.distance_sq(point))
            })
            .map(|(id, _)| id)
    }

    fn move_node(&mut self, id: NodeId, point: Pos2) {
        let node = self.graph.node_mut(id);
        node.pos = point;
        node.refresh_bounds();
    }

    /// Grabs the node under the pointer and pins it there while held.
    pub fn press(&mut self, point: Pos2) -> Option<NodeId> {
        let id = self.pick_at(point)?;

        let was_fixed = self.graph.node(id).fixed;
        self.pick = Some(Pick { node: id, was_fixed });
        self.graph.node_mut(id).fixed = true;
        self.move_node(id, point);
        self.simulation.rearm();
        Some(id)
    }

    pub fn drag(&mut self, point: Pos2) {
        if let Some(pick) = self.pick {
            self.move_node(pick.node, point);
            self.simulation.rearm();
        }
    }

    pub fn release(&mut self, point: Pos2) {
        let Some(pick) = self.pick.take() else {
            return;
        };

        self.move_node(pick.node, point);
        self.graph.node_mut(pick.node).fixed = pick.was_fixed;
        self.simulation.rearm();
    }

    /// Leaves focus mode, then expands a node showing no children or
    /// collapses one that does.
    pub fn double_click(&mut self, point: Pos2) -> Option<NodeId> {
        let id = self.pick_at(point)?;

        self.focus_off();
        if self.graph.is_visible_leaf(id) {
            self.apply_expand(id);
        } else {
            self.apply_collapse(id);
        }
        self.simulation.rearm();
        Some(id)
    }

    pub fn secondary_click(&mut self, point: Pos2) -> Option<NodeId> {
        let id = self.pick_at(point)?;

        if !self.graph.node(id).focus {
            self.apply_focus_on(id);
        }
        self.simulation.rearm();
        Some(id)
    }
}
