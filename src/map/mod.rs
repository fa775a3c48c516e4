mod collect;
mod elements;
mod graph;
mod parse;
mod workspace;

pub use collect::{GROUP_ROOT_NAME, LoadedMap, collect_workspace_map, load_workspace_map};
pub use graph::{
    ArrowMode, Edge, EdgeId, EdgeKind, EdgeKindSet, ElementInfo, INITIAL_EDGE_LENGTH, LabelMode,
    MapGraph, Node, NodeId, NodeKey, NodeKind,
};
pub use workspace::{ElementKind, ElementRecord, MessageRuleRecord, RoleRecord, WorkspaceInfo};
