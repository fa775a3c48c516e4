use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::graph::{ArrowMode, EdgeKind, MapGraph, NodeId, NodeKind};
use super::parse::{ParsedWorkspace, parse_snapshot};

pub const GROUP_ROOT_NAME: &str = "Workgroups";

#[derive(Clone, Debug)]
pub struct LoadedMap {
    pub graph: MapGraph,
    /// Reference time recorded in the snapshot, in unix seconds.
    pub now: Option<u64>,
}

pub fn load_workspace_map(path: &Path) -> Result<LoadedMap> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    collect_workspace_map(&raw)
        .with_context(|| format!("failed to build workspace map from {}", path.display()))
}

pub fn collect_workspace_map(raw: &str) -> Result<LoadedMap> {
    let snapshot = parse_snapshot(raw)?;
    let workgroup_count = snapshot.workgroups.len();

    let parsed = snapshot
        .workgroups
        .into_iter()
        .flat_map(|workgroup| {
            let name = workgroup.name;
            workgroup
                .workspaces
                .into_iter()
                .map(move |workspace| workspace.into_parsed(&name))
        })
        .collect::<Vec<_>>();

    let mut graph = MapGraph::new();
    let mut lookup = HashMap::with_capacity(parsed.len());
    let mut placed = Vec::with_capacity(parsed.len());

    for ParsedWorkspace { info, parent } in parsed {
        let key = lookup_key(&info.name, &info.owner);
        if lookup.contains_key(&key) {
            log::warn!(
                "skipping duplicate workspace {} owned by {}",
                info.name,
                info.owner
            );
            continue;
        }

        let id = graph.add_node(NodeKind::Workspace(Box::new(info)), None);
        lookup.insert(key, id);
        placed.push((id, parent));
    }

    let mut parentless = Vec::new();
    for (id, parent) in placed {
        let Some(parent) = parent else {
            parentless.push(id);
            continue;
        };

        let Some(&parent_id) = lookup.get(&lookup_key(&parent.name, &parent.owner)) else {
            log::warn!(
                "workspace {} names unknown parent {} owned by {}",
                graph.node(id).full_label(),
                parent.name,
                parent.owner
            );
            parentless.push(id);
            continue;
        };

        if would_cycle(&graph, id, parent_id) {
            log::warn!(
                "ignoring parent {} of {}: the hierarchy would loop",
                parent.name,
                graph.node(id).full_label()
            );
            parentless.push(id);
            continue;
        }

        graph.attach(id, parent_id);
    }

    let root = match parentless.as_slice() {
        [single] if workgroup_count <= 1 => *single,
        _ => {
            let root = graph.add_node(NodeKind::Group(GROUP_ROOT_NAME.to_owned()), None);
            for &top in &parentless {
                graph.attach(top, root);
            }
            root
        }
    };
    graph.set_root(root);

    build_links(&mut graph, &lookup);

    log::info!(
        "built workspace map with {} nodes and {} links",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(LoadedMap {
        graph,
        now: snapshot.now,
    })
}

fn lookup_key(name: &str, owner: &str) -> (String, String) {
    (name.to_lowercase(), owner.to_lowercase())
}

fn would_cycle(graph: &MapGraph, child: NodeId, parent: NodeId) -> bool {
    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if current == child {
            return true;
        }
        cursor = graph.node(current).parent();
    }
    false
}

#[derive(Default)]
struct SharedGroups {
    goals: BTreeMap<String, Vec<NodeId>>,
    documents: BTreeMap<String, Vec<NodeId>>,
    discussions: BTreeMap<String, Vec<NodeId>>,
    actions: BTreeMap<String, Vec<NodeId>>,
    participants: BTreeMap<String, Vec<NodeId>>,
}

fn join(groups: &mut BTreeMap<String, Vec<NodeId>>, key: &str, id: NodeId) {
    let members = groups.entry(key.to_owned()).or_default();
    if !members.contains(&id) {
        members.push(id);
    }
}

fn build_links(graph: &mut MapGraph, lookup: &HashMap<(String, String), NodeId>) {
    let mut groups = SharedGroups::default();

    for id in graph.node_ids() {
        if let Some(parent) = graph.node(id).parent() {
            graph.add_edge(parent, id, EdgeKind::Child, ArrowMode::To, None);
        }

        let Some(info) = graph.node(id).workspace().cloned() else {
            continue;
        };

        if let Some(goal) = &info.goal {
            join(&mut groups.goals, goal, id);
        }
        for document in &info.documents {
            join(&mut groups.documents, document.sharing_key(), id);
        }
        for discussion in &info.discussions {
            join(&mut groups.discussions, discussion.sharing_key(), id);
        }
        for action in &info.actions {
            join(&mut groups.actions, action.sharing_key(), id);
        }
        for participant in &info.participants {
            join(&mut groups.participants, &participant.name, id);
        }

        for rule in &info.message_rules {
            let key = lookup_key(&rule.target_workspace, &rule.target_owner);
            let Some(&target) = lookup.get(&key) else {
                log::warn!(
                    "message rule in {} targets unknown workspace {} owned by {}",
                    info.name,
                    rule.target_workspace,
                    rule.target_owner
                );
                continue;
            };
            if target == id {
                log::debug!("ignoring message rule from {} to itself", info.name);
                continue;
            }

            graph.link(
                id,
                target,
                EdgeKind::MessageRule,
                ArrowMode::To,
                Some(rule.describe()),
            );
        }
    }

    // Shared goals always get their own edge; the other kinds accumulate weight.
    for (goal, members) in &groups.goals {
        for_each_pair(members, |a, b| {
            graph.add_edge(a, b, EdgeKind::Goal, ArrowMode::None, Some(goal.clone()));
        });
    }

    for (kind, shared) in [
        (EdgeKind::Document, &groups.documents),
        (EdgeKind::Discussion, &groups.discussions),
        (EdgeKind::Action, &groups.actions),
        (EdgeKind::Participant, &groups.participants),
    ] {
        for (object, members) in shared {
            for_each_pair(members, |a, b| {
                graph.link(a, b, kind, ArrowMode::None, Some(object.clone()));
            });
        }
    }
}

fn for_each_pair(members: &[NodeId], mut visit: impl FnMut(NodeId, NodeId)) {
    for (index, &a) in members.iter().enumerate() {
        for &b in &members[index + 1..] {
            visit(a, b);
        }
    }
}
