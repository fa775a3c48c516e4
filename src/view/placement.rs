use std::f32::consts::{FRAC_PI_4, PI};

use eframe::egui::{Pos2, pos2};

use crate::map::ElementKind;

/// Direction the node points away from its parent, measured from the
/// downward vertical. Nodes without a parent point straight down.
fn heading(node: Pos2, parent: Option<Pos2>) -> f32 {
    let Some(parent) = parent else {
        return 0.0;
    };

    let v = node - parent;
    let length = v.length();
    if length == 0.0 {
        return 0.0;
    }

    let angle = (-v.x / length).clamp(-1.0, 1.0).asin();
    if v.y < 0.0 {
        if angle < 0.0 { -PI - angle } else { PI - angle }
    } else {
        angle
    }
}

fn spread(count: usize) -> f32 {
    match count {
        0 | 1 => 0.0,
        2..=4 => count as f32 * FRAC_PI_4,
        _ => PI,
    }
}

/// Places `count` children on an arc one edge length beyond `node`,
/// centred on the direction leading away from its parent.
pub fn fan_out_positions(
    node: Pos2,
    parent: Option<Pos2>,
    count: usize,
    edge_length: f32,
) -> Vec<Pos2> {
    let heading = heading(node, parent);
    let spread = spread(count);
    let step = if count > 1 {
        spread / (count - 1) as f32
    } else {
        0.0
    };

    (0..count)
        .map(|index| {
            let angle = heading + spread / 2.0 - index as f32 * step;
            pos2(
                node.x - edge_length * angle.sin(),
                node.y + edge_length * angle.cos(),
            )
        })
        .collect()
}

/// Vertical position of an element kind's row, as a fraction of the
/// viewport height.
pub fn element_row_fraction(kind: ElementKind) -> f32 {
    match kind {
        ElementKind::Participant => 0.5 / 4.0,
        ElementKind::Role => 1.5 / 4.0,
        ElementKind::Action | ElementKind::Discussion | ElementKind::Document => 2.5 / 4.0,
        ElementKind::MessageRule | ElementKind::MessageType => 3.5 / 4.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn single_child_continues_straight_on() {
        let placed = fan_out_positions(pos2(100.0, 100.0), None, 1, 50.0);
        assert!(close(placed[0], pos2(100.0, 150.0)));

        // Parent below: keep going up.
        let placed = fan_out_positions(pos2(100.0, 100.0), Some(pos2(100.0, 200.0)), 1, 50.0);
        assert!(close(placed[0], pos2(100.0, 50.0)));

        // Parent to the left: keep going right.
        let placed = fan_out_positions(pos2(100.0, 100.0), Some(pos2(0.0, 100.0)), 1, 50.0);
        assert!(close(placed[0], pos2(150.0, 100.0)));
    }

    #[test]
    fn children_fan_symmetrically() {
        let placed = fan_out_positions(pos2(0.0, 0.0), None, 2, 10.0);
        assert_eq!(placed.len(), 2);
        assert!((placed[0].x + placed[1].x).abs() < 1e-4);
        assert!((placed[0].y - placed[1].y).abs() < 1e-4);
        assert!(placed[0].x < 0.0);
    }

    #[test]
    fn five_or_more_children_cover_a_half_circle() {
        let placed = fan_out_positions(pos2(0.0, 0.0), None, 5, 10.0);
        assert!(close(placed[0], pos2(-10.0, 0.0)));
        assert!(close(placed[2], pos2(0.0, 10.0)));
        assert!(close(placed[4], pos2(10.0, 0.0)));
    }

    #[test]
    fn coincident_parent_falls_back_to_straight_down() {
        let placed = fan_out_positions(pos2(5.0, 5.0), Some(pos2(5.0, 5.0)), 1, 10.0);
        assert!(close(placed[0], pos2(5.0, 15.0)));
    }
}
