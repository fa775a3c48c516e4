use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2};

use crate::util::{element_short_label, estimated_label_size, workspace_short_label};

use super::workspace::{ElementKind, WorkspaceInfo};

pub const INITIAL_EDGE_LENGTH: f32 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Child,
    Goal,
    Action,
    Discussion,
    Document,
    MessageRule,
    Participant,
}

impl EdgeKind {
    pub const COUNT: usize = 7;
    pub const ALL: [EdgeKind; Self::COUNT] = [
        Self::Child,
        Self::Goal,
        Self::Action,
        Self::Discussion,
        Self::Document,
        Self::MessageRule,
        Self::Participant,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Child => "Parent-child",
            Self::Goal => "Goal",
            Self::Action => "Action",
            Self::Discussion => "Discussion",
            Self::Document => "Document",
            Self::MessageRule => "Message rule",
            Self::Participant => "Participant",
        }
    }

    /// Parallel shift applied when painting, so overlapping kinds between the
    /// same pair of nodes stay distinguishable.
    pub fn paint_offset(self) -> f32 {
        match self {
            Self::Goal => -6.0,
            Self::Action => -4.0,
            Self::Discussion => -2.0,
            Self::Child => 0.0,
            Self::Document => 2.0,
            Self::Participant => 4.0,
            Self::MessageRule => 6.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeKindSet([bool; EdgeKind::COUNT]);

impl EdgeKindSet {
    pub fn none() -> Self {
        Self([false; EdgeKind::COUNT])
    }

    pub fn all() -> Self {
        Self([true; EdgeKind::COUNT])
    }

    pub fn only(kind: EdgeKind) -> Self {
        let mut set = Self::none();
        set.set(kind, true);
        set
    }

    pub fn contains(&self, kind: EdgeKind) -> bool {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: EdgeKind, enabled: bool) {
        self.0[kind.index()] = enabled;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArrowMode {
    #[default]
    None,
    From,
    To,
    Both,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelMode {
    #[default]
    Short,
    Long,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Workspace {
        name: String,
        owner: String,
    },
    Element {
        workspace: String,
        kind: ElementKind,
        name: String,
    },
    Group(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementInfo {
    pub kind: ElementKind,
    pub name: String,
    pub workspace: String,
    pub created: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Workspace(Box<WorkspaceInfo>),
    Element(ElementInfo),
    /// Synthetic grouping node, e.g. the root collecting several workgroups.
    Group(String),
}

impl NodeKind {
    fn labels(&self) -> (String, String) {
        match self {
            Self::Workspace(info) => (workspace_short_label(&info.name), info.name.clone()),
            Self::Element(element) if element.kind == ElementKind::MessageRule => {
                ("Msg.Rule".to_owned(), "Message Rule".to_owned())
            }
            Self::Element(element) => (element_short_label(&element.name), element.name.clone()),
            Self::Group(name) => (name.clone(), name.clone()),
        }
    }

    fn key(&self) -> NodeKey {
        match self {
            Self::Workspace(info) => NodeKey::Workspace {
                name: info.name.clone(),
                owner: info.owner.clone(),
            },
            Self::Element(element) => NodeKey::Element {
                workspace: element.workspace.clone(),
                kind: element.kind,
                name: element.name.clone(),
            },
            Self::Group(name) => NodeKey::Group(name.clone()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    short_label: String,
    full_label: String,
    label_mode: LabelMode,
    pub pos: Pos2,
    pub delta: Vec2,
    pub label_size: Vec2,
    pub bounds: Rect,
    pub fixed: bool,
    pub visible: bool,
    pub focus: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        let (short_label, full_label) = kind.labels();
        let label_size = estimated_label_size(&short_label);

        Self {
            kind,
            short_label,
            full_label,
            label_mode: LabelMode::Short,
            pos: Pos2::ZERO,
            delta: Vec2::ZERO,
            label_size,
            bounds: Rect::from_center_size(Pos2::ZERO, label_size),
            fixed: false,
            visible: false,
            focus: false,
            parent,
            children: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn key(&self) -> NodeKey {
        self.kind.key()
    }

    pub fn workspace(&self) -> Option<&WorkspaceInfo> {
        match &self.kind {
            NodeKind::Workspace(info) => Some(info),
            _ => None,
        }
    }

    pub fn element_kind(&self) -> Option<ElementKind> {
        match &self.kind {
            NodeKind::Element(element) => Some(element.kind),
            _ => None,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn label(&self) -> &str {
        match self.label_mode {
            LabelMode::Short => &self.short_label,
            LabelMode::Long => &self.full_label,
        }
    }

    pub fn short_label(&self) -> &str {
        &self.short_label
    }

    pub fn full_label(&self) -> &str {
        &self.full_label
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn refresh_bounds(&mut self) {
        self.bounds = Rect::from_center_size(self.pos, self.label_size);
    }

    pub fn set_label_size(&mut self, size: Vec2) {
        self.label_size = size;
        self.refresh_bounds();
    }

    pub fn contains(&self, point: Pos2) -> bool {
        self.bounds.contains(point)
    }

    fn set_label_mode(&mut self, mode: LabelMode) {
        if self.label_mode == mode {
            return;
        }
        self.label_mode = mode;
        self.label_size = estimated_label_size(self.label());
        self.refresh_bounds();
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    from: NodeId,
    to: NodeId,
    kind: EdgeKind,
    arrow: ArrowMode,
    pub weight: u32,
    pub length: f32,
    pub visible: bool,
    objects: Vec<String>,
}

impl Edge {
    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn arrow(&self) -> ArrowMode {
        self.arrow
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.from == node { self.to } else { self.from }
    }

    pub fn shows_weight_label(&self) -> bool {
        self.weight > 1 || !matches!(self.kind, EdgeKind::Child | EdgeKind::Goal)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    root: Option<NodeId>,
    index: HashMap<NodeKey, NodeId>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; the first parentless node becomes the root unless one
    /// was set explicitly.
    pub fn add_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let node = Node::new(kind, parent);
        self.index.entry(node.key()).or_insert(id);
        self.nodes.push(node);

        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => {}
        }

        id
    }

    pub fn attach(&mut self, child: NodeId, parent: NodeId) {
        if child == parent {
            return;
        }

        if let Some(previous) = self.nodes[child.0].parent.take() {
            self.nodes[previous.0].children.retain(|&id| id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        arrow: ArrowMode,
        object: Option<String>,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            from,
            to,
            kind,
            arrow,
            weight: 1,
            length: INITIAL_EDGE_LENGTH,
            visible: false,
            objects: object.into_iter().collect(),
        });
        self.nodes[from.0].edges.push(id);
        if to != from {
            self.nodes[to.0].edges.push(id);
        }
        id
    }

    pub fn find_edge(&self, a: NodeId, b: NodeId, kind: EdgeKind) -> Option<EdgeId> {
        self.nodes[a.0]
            .edges
            .iter()
            .copied()
            .find(|&id| self.edges[id.0].kind == kind && self.edges[id.0].connects(a, b))
    }

    /// Connects `a` and `b`, folding a repeated link of the same kind into
    /// the existing edge's weight instead of adding a parallel edge.
    pub fn link(
        &mut self,
        a: NodeId,
        b: NodeId,
        kind: EdgeKind,
        arrow: ArrowMode,
        object: Option<String>,
    ) -> EdgeId {
        if let Some(id) = self.find_edge(a, b, kind) {
            let edge = &mut self.edges[id.0];
            edge.weight += 1;
            edge.objects.extend(object);
            return id;
        }

        self.add_edge(a, b, kind, arrow, object)
    }

    pub fn find(&self, key: &NodeKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn find_by_label(&self, short_label: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.short_label == short_label)
            .map(NodeId)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + use<> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(index, edge)| (EdgeId(index), edge))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut()
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes().filter(|(_, node)| node.visible)
    }

    /// True when none of the node's children is currently shown.
    pub fn is_visible_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0]
            .children
            .iter()
            .all(|child| !self.nodes[child.0].visible)
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.nodes[id.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();

        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    /// Pre-order walk of the tree below the root, paired with tree depth.
    pub fn tree_levels(&self) -> Vec<(NodeId, usize)> {
        let Some(root) = self.root else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            out.push((id, level));
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push((child, level + 1));
            }
        }
        out
    }

    pub fn set_edge_lengths(&mut self, length: f32) {
        for edge in &mut self.edges {
            edge.length = length;
        }
    }

    pub fn set_label_mode(&mut self, mode: LabelMode) {
        for node in &mut self.nodes {
            node.set_label_mode(mode);
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [Node], &[Edge]) {
        (&mut self.nodes, &self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(name: &str) -> NodeKind {
        NodeKind::Workspace(Box::new(WorkspaceInfo::new(name, "owner")))
    }

    #[test]
    fn first_parentless_node_becomes_root() {
        let mut graph = MapGraph::new();
        let root = graph.add_node(workspace("root"), None);
        let child = graph.add_node(workspace("child"), Some(root));

        assert_eq!(graph.root(), Some(root));
        assert_eq!(graph.node(child).parent(), Some(root));
        assert_eq!(graph.node(root).children(), &[child]);
    }

    #[test]
    fn repeated_links_merge_into_one_weighted_edge() {
        let mut graph = MapGraph::new();
        let a = graph.add_node(workspace("a"), None);
        let b = graph.add_node(workspace("b"), Some(a));

        let first = graph.link(a, b, EdgeKind::Document, ArrowMode::None, Some("x".into()));
        let second = graph.link(b, a, EdgeKind::Document, ArrowMode::None, Some("y".into()));
        let other = graph.link(a, b, EdgeKind::Action, ArrowMode::None, None);

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(graph.edge(first).weight, 2);
        assert_eq!(graph.edge(first).objects(), &["x".to_owned(), "y".to_owned()]);
        assert_eq!(graph.node(a).edges().len(), 2);
    }

    #[test]
    fn visible_leaf_ignores_hidden_children() {
        let mut graph = MapGraph::new();
        let root = graph.add_node(workspace("root"), None);
        let child = graph.add_node(workspace("child"), Some(root));

        assert!(graph.is_visible_leaf(root));
        assert!(!graph.node(root).is_leaf());

        graph.node_mut(child).visible = true;
        assert!(!graph.is_visible_leaf(root));
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut graph = MapGraph::new();
        let root = graph.add_node(workspace("root"), None);
        let a = graph.add_node(workspace("a"), Some(root));
        let a1 = graph.add_node(workspace("a1"), Some(a));
        let b = graph.add_node(workspace("b"), Some(root));

        assert_eq!(graph.descendants(root), vec![a, a1, b]);
        assert_eq!(
            graph.tree_levels(),
            vec![(root, 0), (a, 1), (a1, 2), (b, 1)]
        );
    }

    #[test]
    fn lookup_by_identity_and_label() {
        let mut graph = MapGraph::new();
        let root = graph.add_node(NodeKind::Group("Workgroups".into()), None);
        let ws = graph.add_node(workspace("procurement-2001"), Some(root));

        let key = NodeKey::Workspace {
            name: "procurement-2001".into(),
            owner: "owner".into(),
        };
        assert_eq!(graph.find(&key), Some(ws));
        assert_eq!(graph.find_by_label("proc...2001"), Some(ws));
        assert!(graph.node(root).is_special());
    }

    #[test]
    fn long_labels_apply_to_every_node() {
        let mut graph = MapGraph::new();
        let root = graph.add_node(workspace("procurement-2001"), None);

        graph.set_label_mode(LabelMode::Long);
        assert_eq!(graph.node(root).label(), "procurement-2001");
        graph.set_label_mode(LabelMode::Short);
        assert_eq!(graph.node(root).label(), "proc...2001");
    }
}
