use crate::error::MapError;
use crate::map::{EdgeKind, ElementKind, NodeId};

use super::{EdgeScope, MapView, fan_out_positions};

impl MapView {
    fn ensure_node(&self, id: NodeId) -> Result<(), MapError> {
        if self.graph.contains(id) {
            Ok(())
        } else {
            Err(MapError::UnknownNode(id))
        }
    }

    /// Shows the node's neighbours over every visible edge kind and fans its
    /// children out below it.
    pub fn expand(&mut self, id: NodeId) -> Result<(), MapError> {
        self.ensure_node(id)?;
        self.apply_expand(id);
        Ok(())
    }

    pub(super) fn apply_expand(&mut self, id: NodeId) {
        log::debug!("expand {}", self.graph.node(id).full_label());

        self.expand_node(id);
        self.revalidate_edges();
        self.simulation.rearm();
    }

    fn expand_node(&mut self, id: NodeId) {
        for edge_id in self.graph.node(id).edges().to_vec() {
            let edge = self.graph.edge(edge_id);
            if !self.state.visible_kinds.contains(edge.kind()) {
                continue;
            }

            let other = edge.other_end(id);
            self.graph.edge_mut(edge_id).visible = true;
            self.graph.node_mut(other).visible = true;
        }

        if !self.state.visible_kinds.contains(EdgeKind::Child) {
            return;
        }

        let node = self.graph.node(id);
        let children = node.children().to_vec();
        let parent = node.parent().map(|parent| self.graph.node(parent).pos);
        let placed = fan_out_positions(
            node.pos,
            parent,
            children.len(),
            self.simulation.params.edge_length,
        );
        for (child, pos) in children.into_iter().zip(placed) {
            let child = self.graph.node_mut(child);
            child.pos = pos;
            child.refresh_bounds();
        }
    }

    /// Hides everything below the node, then drops whatever was only
    /// reachable through the hidden part.
    pub fn collapse(&mut self, id: NodeId) -> Result<(), MapError> {
        self.ensure_node(id)?;
        self.apply_collapse(id);
        Ok(())
    }

    pub(super) fn apply_collapse(&mut self, id: NodeId) {
        log::debug!("collapse {}", self.graph.node(id).full_label());

        for descendant in self.graph.descendants(id) {
            self.graph.node_mut(descendant).visible = false;
        }

        self.state.collapsed = Some(id);
        self.revalidate_edges();
        self.revalidate_nodes();
        self.state.collapsed = None;
        self.simulation.rearm();
    }

    pub fn revalidate_edges(&mut self) {
        let visible_kinds = self.state.visible_kinds;
        for edge_id in self.graph.edge_ids() {
            let edge = self.graph.edge(edge_id);
            let visible = self.graph.node(edge.from()).visible
                && self.graph.node(edge.to()).visible
                && visible_kinds.contains(edge.kind());
            self.graph.edge_mut(edge_id).visible = visible;
        }
    }

    fn is_exempt(&self, id: NodeId) -> bool {
        if self.graph.node(id).is_special() {
            return true;
        }
        match self.state.focus {
            Some(focus) => id == focus,
            None => id == self.root() || Some(id) == self.state.collapsed,
        }
    }

    /// Hides shown nodes left without any shown edge.
    pub fn revalidate_nodes(&mut self) {
        for id in self.graph.node_ids() {
            let node = self.graph.node(id);
            if !node.visible || self.is_exempt(id) {
                continue;
            }

            let connected = node
                .edges()
                .iter()
                .any(|&edge| self.graph.edge(edge).visible);
            if !connected {
                self.graph.node_mut(id).visible = false;
            }
        }
    }

    /// Isolates the node: everything else is hidden, then the node is
    /// expanded in place with itself and its parent pinned.
    pub fn focus_on(&mut self, id: NodeId) -> Result<(), MapError> {
        self.ensure_node(id)?;
        self.apply_focus_on(id);
        Ok(())
    }

    pub(super) fn apply_focus_on(&mut self, id: NodeId) {
        log::debug!("focus on {}", self.graph.node(id).full_label());

        for node in self.graph.nodes_mut() {
            if !node.is_special() {
                node.fixed = false;
            }
            node.focus = false;
            node.visible = false;
        }
        for edge in self.graph.edges_mut() {
            edge.visible = false;
        }

        let node = self.graph.node_mut(id);
        node.visible = true;
        node.fixed = true;
        node.focus = true;
        if let Some(parent) = node.parent() {
            self.graph.node_mut(parent).fixed = true;
        }
        self.state.anchor = Some(id);
        self.state.focus = Some(id);

        self.expand_node(id);
        self.revalidate_edges();
        self.simulation.rearm();
    }

    /// Leaves focus mode, handing the anchor to the focused node's parent.
    pub fn focus_off(&mut self) {
        let Some(id) = self.state.focus.take() else {
            return;
        };
        log::debug!("focus off {}", self.graph.node(id).full_label());

        if let Some(parent) = self.graph.node(id).parent() {
            self.graph.node_mut(parent).fixed = true;
            self.state.anchor = Some(parent);
            let node = self.graph.node_mut(id);
            if !node.is_special() {
                node.fixed = false;
            }
        }
        self.graph.node_mut(id).focus = false;
        self.simulation.rearm();
    }

    pub fn set_edge_kind_visible(&mut self, kind: EdgeKind, visible: bool) {
        log::debug!("{} edges visible: {visible}", kind.label());
        self.state.visible_kinds.set(kind, visible);

        if visible {
            match self.state.scope {
                EdgeScope::Subgraph => self.reveal_edges_between_shown(kind),
                EdgeScope::WholeGraph => {
                    self.reveal_edges_touching_shown(kind);
                    self.reveal_edges_between_shown(kind);
                }
            }
        } else {
            for edge in self.graph.edges_mut() {
                if edge.kind() == kind {
                    edge.visible = false;
                }
            }
            self.revalidate_nodes();
        }

        self.simulation.rearm();
    }

    fn reveal_edges_between_shown(&mut self, kind: EdgeKind) {
        for edge_id in self.graph.edge_ids() {
            let edge = self.graph.edge(edge_id);
            if edge.kind() != kind || edge.visible {
                continue;
            }
            if self.graph.node(edge.from()).visible && self.graph.node(edge.to()).visible {
                self.graph.edge_mut(edge_id).visible = true;
            }
        }
    }

    // A single sweep in edge order, not a closure: calling it again can
    // reach further.
    fn reveal_edges_touching_shown(&mut self, kind: EdgeKind) {
        for edge_id in self.graph.edge_ids() {
            let edge = self.graph.edge(edge_id);
            if edge.kind() != kind || edge.visible {
                continue;
            }

            let (from, to) = (edge.from(), edge.to());
            if self.graph.node(from).visible || self.graph.node(to).visible {
                self.graph.node_mut(from).visible = true;
                self.graph.node_mut(to).visible = true;
                self.graph.edge_mut(edge_id).visible = true;
            }
        }
    }

    pub fn set_edge_kind_force(&mut self, kind: EdgeKind, enabled: bool) {
        log::debug!("{} edges pull: {enabled}", kind.label());
        self.state.force_kinds.set(kind, enabled);
        self.simulation.rearm();
    }

    pub fn set_scope(&mut self, scope: EdgeScope) {
        self.state.scope = scope;
    }

    fn anchor_root(&mut self) {
        let root = self.root();
        if let Some(anchor) = self.state.anchor.take() {
            let node = self.graph.node_mut(anchor);
            if !node.is_special() {
                node.fixed = false;
            }
        }
        self.graph.node_mut(root).fixed = true;
        self.state.anchor = Some(root);
    }

    pub fn expand_all(&mut self) {
        let root = self.root();
        log::debug!("expand all");

        self.expand_node(root);
        for id in self.graph.descendants(root) {
            self.expand_node(id);
        }
        self.graph.node_mut(root).visible = true;

        self.focus_off();
        self.anchor_root();
        self.revalidate_edges();
        self.simulation.rearm();
    }

    pub fn collapse_all(&mut self) {
        let root = self.root();
        log::debug!("collapse all");

        for id in self.graph.descendants(root) {
            self.graph.node_mut(id).visible = false;
        }
        self.graph.node_mut(root).visible = true;

        self.focus_off();
        self.anchor_root();
        for edge in self.graph.edges_mut() {
            edge.visible = false;
        }
        self.simulation.rearm();
    }

    /// Shows or hides every element of one kind in an element map.
    pub fn set_element_kind_visible(&mut self, kind: ElementKind, visible: bool) {
        self.state.hidden_elements.retain(|&hidden| hidden != kind);
        if !visible {
            self.state.hidden_elements.push(kind);
        }

        for node in self.graph.nodes_mut() {
            if node.element_kind() == Some(kind) {
                node.visible = visible;
            }
        }
        self.revalidate_edges();
        self.simulation.rearm();
    }
}
