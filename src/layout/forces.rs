use eframe::egui::{Vec2, vec2};
use rand::Rng;

use crate::map::{Edge, EdgeKindSet, Node};

use super::SimulationParams;

fn is_expanded_hub(nodes: &[Node], node: &Node) -> bool {
    !node.is_leaf()
        && node
            .children()
            .iter()
            .any(|child| nodes[child.index()].visible)
}

pub(super) fn accumulate_springs(
    nodes: &mut [Node],
    edges: &[Edge],
    forces: &EdgeKindSet,
    params: &SimulationParams,
) {
    for edge in edges {
        if !forces.contains(edge.kind()) {
            continue;
        }

        let (from, to) = (edge.from().index(), edge.to().index());
        if !(nodes[from].visible && nodes[to].visible) {
            continue;
        }

        let v = nodes[to].pos - nodes[from].pos;
        let mut length = v.length();
        if length == 0.0 {
            length = params.spring_epsilon;
        }

        let shared: &[Node] = nodes;
        let elasticity =
            if is_expanded_hub(shared, &shared[from]) && is_expanded_hub(shared, &shared[to]) {
                params.base_elasticity * params.hub_elasticity_factor
            } else {
                params.base_elasticity
            };

        let f = (edge.length - length) / (length * elasticity);
        nodes[to].delta += v * f;
        nodes[from].delta -= v * f;
    }
}

pub(super) fn accumulate_repulsion<R: Rng>(
    nodes: &mut [Node],
    params: &SimulationParams,
    rng: &mut R,
    scratch: &mut Vec<Vec2>,
) {
    let reach_sq = params.edge_length * params.edge_length;

    scratch.clear();
    scratch.resize(nodes.len(), Vec2::ZERO);

    for (index, node) in nodes.iter().enumerate() {
        if !node.visible {
            continue;
        }

        let mut sum = Vec2::ZERO;
        for (other_index, other) in nodes.iter().enumerate() {
            if other_index == index || !other.visible {
                continue;
            }

            let v = node.pos - other.pos;
            let distance_sq = v.length_sq();
            if distance_sq == 0.0 {
                sum += vec2(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
            } else if distance_sq < reach_sq {
                sum += v * (params.repulsion.scale / distance_sq);
            }
        }

        let magnitude = sum.length();
        if magnitude > 0.0 {
            scratch[index] = sum / (magnitude / params.repulsion.normalizer);
        }
    }

    for (node, push) in nodes.iter_mut().zip(scratch.iter()) {
        node.delta += *push;
    }
}

pub(super) fn clamp_step(delta: Vec2, max_step: f32) -> Vec2 {
    vec2(
        delta.x.clamp(-max_step, max_step),
        delta.y.clamp(-max_step, max_step),
    )
}

/// Moves the node back inside `[margin, viewport - margin]` on each axis.
pub(super) fn contain(node: &mut Node, viewport: Vec2, margin: f32) {
    node.refresh_bounds();

    let mut shift = Vec2::ZERO;
    if node.bounds.min.x < margin {
        shift.x = margin - node.bounds.min.x;
    } else if node.bounds.max.x > viewport.x - margin {
        shift.x = (viewport.x - margin) - node.bounds.max.x;
    }
    if node.bounds.min.y < margin {
        shift.y = margin - node.bounds.min.y;
    } else if node.bounds.max.y > viewport.y - margin {
        shift.y = (viewport.y - margin) - node.bounds.max.y;
    }

    if shift != Vec2::ZERO {
        node.pos += shift;
        node.bounds = node.bounds.translate(shift);
    }
}
