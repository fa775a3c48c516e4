mod forces;

use std::time::Duration;

use eframe::egui::Vec2;
use rand::Rng;

use crate::error::MapError;
use crate::map::{EdgeKindSet, INITIAL_EDGE_LENGTH, MapGraph};
use forces::{accumulate_repulsion, accumulate_springs, clamp_step, contain};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepulsionProfile {
    /// Multiplier applied to each in-range pairwise push.
    pub scale: f32,
    /// The summed push is rescaled to this magnitude.
    pub normalizer: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub edge_length: f32,
    pub margin_gap: f32,
    pub max_iterations: u32,
    pub major_change_fraction: f32,
    /// When false the ticker stops purely on the iteration budget.
    pub require_quiescence: bool,
    pub base_elasticity: f32,
    pub hub_elasticity_factor: f32,
    pub repulsion: RepulsionProfile,
    pub max_step: f32,
    pub spring_epsilon: f32,
    pub tick_interval: Duration,
}

impl SimulationParams {
    pub fn tree() -> Self {
        Self {
            edge_length: INITIAL_EDGE_LENGTH,
            margin_gap: 3.0,
            max_iterations: 20,
            major_change_fraction: 0.02,
            require_quiescence: true,
            base_elasticity: 10.0,
            hub_elasticity_factor: 5.0,
            repulsion: RepulsionProfile {
                scale: 2.0,
                normalizer: 2.0,
            },
            max_step: 5.0,
            spring_epsilon: 1e-4,
            tick_interval: Duration::from_millis(100),
        }
    }

    pub fn element() -> Self {
        Self {
            max_iterations: 200,
            require_quiescence: false,
            hub_elasticity_factor: 1.0,
            repulsion: RepulsionProfile {
                scale: 1.0,
                normalizer: 10.0,
            },
            ..Self::tree()
        }
    }

    pub fn weighted() -> Self {
        Self {
            max_iterations: 10,
            ..Self::element()
        }
    }

    fn major_threshold(&self) -> f32 {
        self.major_change_fraction * self.edge_length
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::tree()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxReport {
    /// Largest absolute pending displacement per axis, before damping.
    pub max_delta: Vec2,
    pub major_change: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Moved { major_change: bool },
    Idle,
}

/// Iteration bookkeeping around [`relax`]; one per view.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub params: SimulationParams,
    iterations: u32,
    major_change: bool,
    scratch: Vec<Vec2>,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            iterations: 0,
            major_change: false,
            scratch: Vec::new(),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Restarts the full iteration budget.
    pub fn rearm(&mut self) {
        self.iterations = 0;
    }

    /// Allows exactly one more step, enough to repaint cosmetic changes.
    pub fn rearm_once(&mut self) {
        self.iterations = self.params.max_iterations.saturating_sub(1);
    }

    pub fn is_settled(&self) -> bool {
        self.iterations >= self.params.max_iterations
            && !(self.params.require_quiescence && self.major_change)
    }

    pub fn tick<R: Rng>(
        &mut self,
        graph: &mut MapGraph,
        viewport: Vec2,
        forces: &EdgeKindSet,
        rng: &mut R,
    ) -> Result<TickOutcome, MapError> {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.params.max_iterations
            && !(self.params.require_quiescence && self.major_change)
        {
            return Ok(TickOutcome::Idle);
        }

        let report = relax_inner(graph, viewport, forces, &self.params, rng, &mut self.scratch)?;
        self.major_change = report.major_change;
        Ok(TickOutcome::Moved {
            major_change: report.major_change,
        })
    }
}

pub fn relax(
    graph: &mut MapGraph,
    viewport: Vec2,
    forces: &EdgeKindSet,
    params: &SimulationParams,
) -> Result<RelaxReport, MapError> {
    relax_with_rng(graph, viewport, forces, params, &mut rand::thread_rng())
}

pub fn relax_with_rng<R: Rng>(
    graph: &mut MapGraph,
    viewport: Vec2,
    forces: &EdgeKindSet,
    params: &SimulationParams,
    rng: &mut R,
) -> Result<RelaxReport, MapError> {
    relax_inner(graph, viewport, forces, params, rng, &mut Vec::new())
}

fn validate(graph: &MapGraph, viewport: Vec2) -> Result<(), MapError> {
    if graph.node_count() == 0 {
        return Err(MapError::EmptyGraph);
    }

    let usable = |extent: f32| extent.is_finite() && extent > 0.0;
    if !(usable(viewport.x) && usable(viewport.y)) {
        return Err(MapError::InvalidViewport {
            width: viewport.x,
            height: viewport.y,
        });
    }

    if let Some((id, _)) = graph
        .nodes()
        .find(|(_, node)| !(node.pos.x.is_finite() && node.pos.y.is_finite()))
    {
        return Err(MapError::NonFinitePosition(id));
    }

    Ok(())
}

fn relax_inner<R: Rng>(
    graph: &mut MapGraph,
    viewport: Vec2,
    forces: &EdgeKindSet,
    params: &SimulationParams,
    rng: &mut R,
    scratch: &mut Vec<Vec2>,
) -> Result<RelaxReport, MapError> {
    validate(graph, viewport)?;

    let (nodes, edges) = graph.parts_mut();
    accumulate_springs(nodes, edges, forces, params);
    accumulate_repulsion(nodes, params, rng, scratch);

    let mut max_delta = Vec2::ZERO;
    for node in nodes.iter_mut().filter(|node| node.visible) {
        if !node.fixed {
            node.pos += clamp_step(node.delta, params.max_step);
        }
        contain(node, viewport, params.margin_gap);

        max_delta = max_delta.max(node.delta.abs());
        node.delta /= 2.0;
    }

    let threshold = params.major_threshold();
    Ok(RelaxReport {
        max_delta,
        major_change: max_delta.x >= threshold || max_delta.y >= threshold,
    })
}
