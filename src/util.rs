use eframe::egui::{Vec2, vec2};

const LABEL_LIMIT: usize = 10;
const ESTIMATED_CHAR_WIDTH: f32 = 6.0;
const LABEL_PAD_X: f32 = 10.0;
const MIN_BOX_HEIGHT: f32 = 17.0;

pub fn workspace_short_label(name: &str) -> String {
    let count = name.chars().count();
    if count <= LABEL_LIMIT {
        return name.to_owned();
    }

    let head = name.chars().take(4).collect::<String>();
    let tail = name.chars().skip(count - 4).collect::<String>();
    format!("{head}...{tail}")
}

pub fn element_short_label(name: &str) -> String {
    if name.chars().count() <= LABEL_LIMIT {
        return name.to_owned();
    }

    let head = name.chars().take(7).collect::<String>();
    format!("{head}...")
}

/// Box size used until a renderer reports the measured label size.
pub fn estimated_label_size(label: &str) -> Vec2 {
    let width = label.chars().count() as f32 * ESTIMATED_CHAR_WIDTH + LABEL_PAD_X;
    vec2(width, MIN_BOX_HEIGHT)
}

pub fn days_between(from_secs: u64, to_secs: u64) -> u32 {
    const SECONDS_PER_DAY: u64 = 60 * 60 * 24;
    (from_secs.abs_diff(to_secs) / SECONDS_PER_DAY).min(u32::MAX as u64) as u32
}
