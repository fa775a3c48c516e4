use eframe::egui::Color32;

use crate::map::{EdgeKind, ElementKind};

pub const MAX_RAMP_ENTRIES: usize = 256;

pub const NODE_COLOR: Color32 = Color32::from_rgb(250, 220, 100);
pub const LEAF_COLOR: Color32 = Color32::WHITE;
pub const SPECIAL_COLOR: Color32 = Color32::from_rgb(192, 192, 192);

const MESSAGE_RULE_COLOR: Color32 = Color32::from_rgb(190, 95, 0);
const PARTICIPANT_COLOR: Color32 = Color32::from_rgb(255, 119, 200);

pub fn edge_color(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Child => Color32::BLACK,
        EdgeKind::Goal => Color32::from_rgb(255, 0, 0),
        EdgeKind::Action => Color32::from_rgb(0, 255, 255),
        EdgeKind::Discussion => Color32::from_rgb(0, 255, 0),
        EdgeKind::Document => Color32::from_rgb(0, 0, 255),
        EdgeKind::MessageRule => MESSAGE_RULE_COLOR,
        EdgeKind::Participant => PARTICIPANT_COLOR,
    }
}

pub fn element_color(kind: ElementKind) -> Color32 {
    match kind {
        ElementKind::Role => NODE_COLOR,
        ElementKind::Participant => PARTICIPANT_COLOR,
        ElementKind::MessageRule => MESSAGE_RULE_COLOR,
        ElementKind::MessageType => Color32::from_rgb(128, 128, 128),
        ElementKind::Action => edge_color(EdgeKind::Action),
        ElementKind::Discussion => edge_color(EdgeKind::Discussion),
        ElementKind::Document => edge_color(EdgeKind::Document),
    }
}

/// Black on light backgrounds, white on dark ones.
pub fn text_color_for(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let grayscale = u32::from(r) * 3 + u32::from(g) * 6 + u32::from(b);
    if grayscale > 5 * 255 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn channel(value: f64) -> u8 {
    // Float to int casts saturate, NaN becomes 0.
    (value as i32).clamp(0, 255) as u8
}

/// Green through yellow to red, one color per histogram entry.
pub fn density_ramp(entries: usize) -> Vec<Color32> {
    let entries = entries.min(MAX_RAMP_ENTRIES);

    let (red_interval, green_interval) = if entries > 1 {
        (
            255.0 / ((entries - 1) / 3) as f64,
            255.0 / (2 * (entries - 1) / 3) as f64,
        )
    } else {
        (0.0, 0.0)
    };

    let third = entries / 3;
    (0..entries)
        .map(|i| {
            if i < third {
                Color32::from_rgb(channel(i as f64 * red_interval), 255, 0)
            } else {
                let step = ((i + 1) as f64 - entries as f64 / 3.0) - 1.0;
                Color32::from_rgb(255, channel(255.0 - step * green_interval), 0)
            }
        })
        .collect()
}

/// Yellow to red, one color per histogram entry.
pub fn intensity_ramp(entries: usize) -> Vec<Color32> {
    let entries = entries.min(MAX_RAMP_ENTRIES);
    let interval = if entries > 1 { 255 / (entries - 1) } else { 0 };

    (0..entries)
        .map(|i| Color32::from_rgb(255, (255 - i * interval) as u8, 0))
        .collect()
}
