mod interaction;
mod placement;
mod visibility;

use eframe::egui::{Color32, Vec2, pos2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::MapError;
use crate::layout::{Simulation, SimulationParams, TickOutcome};
use crate::map::{EdgeKindSet, EdgeKind, ElementKind, LabelMode, MapGraph, NodeId};
use crate::stats::{ColoringMode, DEFAULT_RECENCY_WINDOW, Legend, MapStatistics};

pub use placement::{element_row_fraction, fan_out_positions};

pub const TOP_OFFSET: f32 = 150.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeScope {
    /// Reveal only edges whose endpoints are both already shown.
    #[default]
    Subgraph,
    /// Also reveal the far endpoint of edges touching a shown node.
    WholeGraph,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub visible_kinds: EdgeKindSet,
    pub force_kinds: EdgeKindSet,
    pub scope: EdgeScope,
    pub coloring: ColoringMode,
    pub label_mode: LabelMode,
    pub focus: Option<NodeId>,
    pub anchor: Option<NodeId>,
    pub collapsed: Option<NodeId>,
    pub hidden_elements: Vec<ElementKind>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            visible_kinds: EdgeKindSet::only(EdgeKind::Child),
            force_kinds: EdgeKindSet::only(EdgeKind::Child),
            scope: EdgeScope::Subgraph,
            coloring: ColoringMode::ParentChild,
            label_mode: LabelMode::Short,
            focus: None,
            anchor: None,
            collapsed: None,
            hidden_elements: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ViewOptions {
    pub params: SimulationParams,
    /// Reference time for metric ages, unix seconds.
    pub now: u64,
    pub recency_window: u32,
    /// Seeds the zero-distance perturbation; entropy when unset.
    pub seed: Option<u64>,
}

impl ViewOptions {
    pub fn new(now: u64) -> Self {
        Self {
            params: SimulationParams::tree(),
            now,
            recency_window: DEFAULT_RECENCY_WINDOW,
            seed: None,
        }
    }

    pub fn with_params(self, params: SimulationParams) -> Self {
        Self { params, ..self }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pick {
    node: NodeId,
    was_fixed: bool,
}

/// One interactive map: the graph, its visibility state and the
/// simulation that lays it out.
#[derive(Debug)]
pub struct MapView {
    graph: MapGraph,
    state: ViewState,
    simulation: Simulation,
    viewport: Vec2,
    pick: Option<Pick>,
    statistics: MapStatistics,
    rng: StdRng,
}

impl MapView {
    /// Tree map: the root is shown and anchored at the top centre, every
    /// other node starts hidden below it, one row per tree level.
    pub fn new(graph: MapGraph, viewport: Vec2, options: ViewOptions) -> Result<Self, MapError> {
        let mut view = Self::build(graph, viewport, options)?;
        let root = view.root();
        let edge_length = view.simulation.params.edge_length;

        for (id, level) in view.graph.tree_levels() {
            let node = view.graph.node_mut(id);
            node.pos = pos2(viewport.x / 2.0, TOP_OFFSET + level as f32 * edge_length);
            node.refresh_bounds();
        }

        let node = view.graph.node_mut(root);
        node.visible = true;
        node.fixed = true;
        view.state.anchor = Some(root);

        log::debug!(
            "tree view over {} nodes, root {}",
            view.graph.node_count(),
            view.graph.node(root).full_label()
        );
        Ok(view)
    }

    /// Element map: every element is shown in its kind's row and all edge
    /// kinds are visible and pulling; the workspace root stays hidden.
    pub fn element_view(
        graph: MapGraph,
        viewport: Vec2,
        options: ViewOptions,
    ) -> Result<Self, MapError> {
        let mut view = Self::build(graph, viewport, options)?;
        view.state.visible_kinds = EdgeKindSet::all();
        view.state.force_kinds = EdgeKindSet::all();

        let root = view.root();
        for kind in ElementKind::ALL {
            let members = view
                .graph
                .nodes()
                .filter(|(_, node)| node.element_kind() == Some(kind))
                .map(|(id, _)| id)
                .collect::<Vec<_>>();
            let count = members.len() as f32;
            for (index, id) in members.into_iter().enumerate() {
                let node = view.graph.node_mut(id);
                node.pos = pos2(
                    (index as f32 + 0.5) * viewport.x / count,
                    element_row_fraction(kind) * viewport.y,
                );
                node.visible = true;
                node.refresh_bounds();
            }
        }

        let node = view.graph.node_mut(root);
        node.visible = false;
        node.fixed = true;
        view.revalidate_edges();
        Ok(view)
    }

    fn build(mut graph: MapGraph, viewport: Vec2, options: ViewOptions) -> Result<Self, MapError> {
        // The first parentless node becomes the root, so only an empty
        // graph lacks one.
        if graph.root().is_none() {
            return Err(MapError::EmptyGraph);
        }

        graph.set_edge_lengths(options.params.edge_length);
        let statistics = MapStatistics::compute(&graph, options.now, options.recency_window);
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            graph,
            state: ViewState::default(),
            simulation: Simulation::new(options.params),
            viewport,
            pick: None,
            statistics,
            rng,
        })
    }

    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn statistics(&self) -> &MapStatistics {
        &self.statistics
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn params(&self) -> &SimulationParams {
        &self.simulation.params
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn root(&self) -> NodeId {
        // `build` refuses graphs without a root.
        self.graph.root().unwrap_or(NodeId(0))
    }

    pub fn picked(&self) -> Option<NodeId> {
        self.pick.map(|pick| pick.node)
    }

    /// Takes effect on the next tick.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.simulation.rearm();
        }
    }

    pub fn tick(&mut self) -> Result<TickOutcome, MapError> {
        self.simulation.tick(
            &mut self.graph,
            self.viewport,
            &self.state.force_kinds,
            &mut self.rng,
        )
    }

    pub fn rearm(&mut self) {
        self.simulation.rearm();
    }

    /// Records the size the renderer actually drew a node's label at.
    pub fn set_label_size(&mut self, id: NodeId, size: Vec2) -> Result<(), MapError> {
        if !self.graph.contains(id) {
            return Err(MapError::UnknownNode(id));
        }
        self.graph.node_mut(id).set_label_size(size);
        Ok(())
    }

    pub fn set_edge_length(&mut self, length: f32) {
        log::debug!("edge length {length}");
        self.simulation.params.edge_length = length;
        self.graph.set_edge_lengths(length);
        self.simulation.rearm();
    }

    pub fn set_coloring(&mut self, mode: ColoringMode) {
        log::debug!("coloring {mode:?}");
        self.state.coloring = mode;
        self.simulation.rearm_once();
    }

    pub fn set_label_mode(&mut self, mode: LabelMode) {
        self.state.label_mode = mode;
        self.graph.set_label_mode(mode);
        self.simulation.rearm_once();
    }

    pub fn node_color(&self, id: NodeId) -> Color32 {
        self.statistics
            .node_color(&self.graph, id, self.state.coloring)
    }

    pub fn legend(&self) -> Option<Legend> {
        self.statistics.legend(self.state.coloring)
    }

    /// Nodes whose full or short label fuzzily matches `query`, best first.
    pub fn search(&self, query: &str) -> Vec<NodeId> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut matches = self
            .graph
            .nodes()
            .filter_map(|(id, node)| {
                let score = fuzzy_match_score(&matcher, node.full_label(), query)
                    .max(fuzzy_match_score(&matcher, node.short_label(), query))?;
                Some((id, score))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        matches.into_iter().map(|(id, _)| id).collect()
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}
