use super::graph::{ArrowMode, EdgeKind, ElementInfo, MapGraph, NodeId, NodeKey, NodeKind};
use super::workspace::{ElementKind, ElementRecord, WorkspaceInfo};

impl ElementKind {
    /// Edge kind used when a role is linked to an element of this kind.
    pub fn edge_kind(self) -> EdgeKind {
        match self {
            Self::Participant | Self::Role => EdgeKind::Participant,
            Self::Action => EdgeKind::Action,
            Self::Discussion => EdgeKind::Discussion,
            Self::Document => EdgeKind::Document,
            Self::MessageRule | Self::MessageType => EdgeKind::MessageRule,
        }
    }
}

impl MapGraph {
    /// Builds the element map of one workspace: a hidden copy of the
    /// workspace as root with every role, participant, object, message rule
    /// and message type as its children, linked participant to role and
    /// role to assigned object.
    pub fn element_map(&self, workspace: NodeId) -> Option<MapGraph> {
        let info = self.get(workspace)?.workspace()?;
        Some(build_element_map(info))
    }
}

fn build_element_map(info: &WorkspaceInfo) -> MapGraph {
    let mut graph = MapGraph::new();
    let root = graph.add_node(NodeKind::Workspace(Box::new(info.clone())), None);
    graph.node_mut(root).fixed = true;

    let mut add = |kind: ElementKind, name: &str, created: Option<u64>| {
        graph.add_node(
            NodeKind::Element(ElementInfo {
                kind,
                name: name.to_owned(),
                workspace: info.name.clone(),
                created,
            }),
            Some(root),
        );
    };

    for role in &info.roles {
        add(ElementKind::Role, &role.name, role.created);
    }
    for (kind, records) in [
        (ElementKind::Participant, &info.participants),
        (ElementKind::Action, &info.actions),
        (ElementKind::Discussion, &info.discussions),
        (ElementKind::Document, &info.documents),
    ] {
        for ElementRecord { name, created, .. } in records {
            add(kind, name, *created);
        }
    }
    for rule in &info.message_rules {
        add(ElementKind::MessageRule, &rule.describe(), None);
    }
    for message_type in &info.message_types {
        add(ElementKind::MessageType, &message_type.name, message_type.created);
    }

    for role in &info.roles {
        let Some(role_node) = find_element(&graph, info, ElementKind::Role, &role.name) else {
            continue;
        };

        for participant in &role.participants {
            match find_element(&graph, info, ElementKind::Participant, participant) {
                Some(node) => {
                    graph.add_edge(node, role_node, EdgeKind::Participant, ArrowMode::None, None);
                }
                None => log::warn!(
                    "role {} in {} lists unknown participant {participant}",
                    role.name,
                    info.name
                ),
            }
        }

        for object in &role.assigned_objects {
            let target = info
                .object_kind(object)
                .and_then(|kind| Some((kind, find_element(&graph, info, kind, object)?)));
            match target {
                Some((kind, node)) => {
                    graph.add_edge(role_node, node, kind.edge_kind(), ArrowMode::None, None);
                }
                None => log::warn!(
                    "role {} in {} is assigned unknown object {object}",
                    role.name,
                    info.name
                ),
            }
        }
    }

    graph
}

fn find_element(
    graph: &MapGraph,
    info: &WorkspaceInfo,
    kind: ElementKind,
    name: &str,
) -> Option<NodeId> {
    graph.find(&NodeKey::Element {
        workspace: info.name.clone(),
        kind,
        name: name.to_owned(),
    })
}
