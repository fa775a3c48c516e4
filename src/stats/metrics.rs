use crate::map::WorkspaceInfo;
use crate::util::days_between;

pub const DEFAULT_RECENCY_WINDOW: u32 = 30;

/// Logarithmic decay of an event `age_days` old: 1.0 today, falling to 0.0
/// at the edge of the window and staying there.
pub fn recency_weight(age_days: u32, window: u32) -> f32 {
    if age_days >= window {
        return 0.0;
    }
    if window <= 1 {
        return 1.0;
    }

    let decay = ((age_days as f64) + 1.0).ln() / (window as f64).ln();
    (1.0 - decay) as f32
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorkspaceMetrics {
    pub abs_density: u32,
    pub min_role_density: u32,
    pub max_role_density: u32,
    pub mean_role_density: f32,
    pub evolution_objects: u32,
    pub evolution_weeks: f32,
    pub evolution_intensity: f32,
    pub evolution_recency: f32,
    pub message_intensity: f32,
    pub message_recency: f32,
}

impl WorkspaceMetrics {
    pub fn measure(info: &WorkspaceInfo, now: u64, window: u32) -> Self {
        let count = |len: usize| u32::try_from(len).unwrap_or(u32::MAX);

        let abs_density = count(
            info.documents.len()
                + info.discussions.len()
                + info.actions.len()
                + info.message_types.len()
                + info.message_rules.len(),
        );
        let evolution_objects = abs_density
            .saturating_add(count(info.roles.len()))
            .saturating_add(count(info.participants.len()));

        let role_densities = info
            .roles
            .iter()
            .map(|role| count(role.assigned_objects.len()))
            .collect::<Vec<_>>();
        let (min_role_density, max_role_density, mean_role_density) = match (
            role_densities.iter().min(),
            role_densities.iter().max(),
        ) {
            (Some(&min), Some(&max)) => {
                let total = role_densities.iter().map(|&density| density as f32).sum::<f32>();
                (min, max, total / role_densities.len() as f32)
            }
            _ => (0, 0, 0.0),
        };

        let evolution_weeks = info
            .created
            .map(|created| days_between(created, now) as f32 / 7.0)
            .unwrap_or(0.0);
        let per_week = |amount: usize| {
            if evolution_weeks > 0.0 {
                amount as f32 / evolution_weeks
            } else {
                0.0
            }
        };

        let decay = |created: u64| recency_weight(days_between(created, now), window);
        let evolution_recency: f32 = info
            .roles
            .iter()
            .filter_map(|role| role.created)
            .chain(
                info.participants
                    .iter()
                    .chain(&info.documents)
                    .chain(&info.discussions)
                    .chain(&info.actions)
                    .filter_map(|element| element.created),
            )
            .map(decay)
            .sum();
        let message_recency: f32 = info
            .messages_sent
            .iter()
            .chain(&info.messages_received)
            .copied()
            .map(decay)
            .sum();

        Self {
            abs_density,
            min_role_density,
            max_role_density,
            mean_role_density,
            evolution_objects,
            evolution_weeks,
            evolution_intensity: per_week(evolution_objects as usize),
            evolution_recency,
            message_intensity: per_week(info.messages_sent.len() + info.messages_received.len()),
            message_recency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ElementRecord, RoleRecord};

    const DAY: u64 = 86_400;

    #[test]
    fn recency_decays_logarithmically_inside_the_window() {
        assert_eq!(recency_weight(0, 30), 1.0);
        assert!(recency_weight(29, 30).abs() < 1e-6);
        assert_eq!(recency_weight(30, 30), 0.0);
        assert!(recency_weight(5, 30) > recency_weight(6, 30));
    }

    #[test]
    fn densities_and_rates() {
        let now = 70 * DAY;
        let dated = |name: &str, day: u64| ElementRecord {
            name: name.into(),
            url: None,
            created: Some(day * DAY),
        };

        let mut info = WorkspaceInfo::new("ops", "ann");
        info.created = Some(0);
        info.documents = vec![dated("a", 70), dated("b", 0)];
        info.actions = vec![dated("c", 0)];
        info.participants = vec![dated("ann", 70)];
        info.roles = vec![
            RoleRecord {
                name: "lead".into(),
                assigned_objects: vec!["a".into(), "b".into(), "c".into()],
                ..RoleRecord::default()
            },
            RoleRecord {
                name: "guest".into(),
                ..RoleRecord::default()
            },
        ];
        info.messages_sent = vec![now, now - 40 * DAY];
        info.messages_received = vec![now];

        let metrics = WorkspaceMetrics::measure(&info, now, DEFAULT_RECENCY_WINDOW);

        assert_eq!(metrics.abs_density, 3);
        assert_eq!(metrics.evolution_objects, 6);
        assert_eq!(
            (metrics.min_role_density, metrics.max_role_density),
            (0, 3)
        );
        assert_eq!(metrics.mean_role_density, 1.5);
        assert_eq!(metrics.evolution_weeks, 10.0);
        assert_eq!(metrics.evolution_intensity, 0.6);
        assert_eq!(metrics.message_intensity, 0.3);
        // Two things created today, everything else too old.
        assert_eq!(metrics.evolution_recency, 2.0);
        assert_eq!(metrics.message_recency, 2.0);
    }

    #[test]
    fn missing_creation_date_means_no_rates() {
        let mut info = WorkspaceInfo::new("ops", "ann");
        info.messages_sent = vec![0];

        let metrics = WorkspaceMetrics::measure(&info, 0, DEFAULT_RECENCY_WINDOW);
        assert_eq!(metrics.evolution_intensity, 0.0);
        assert_eq!(metrics.message_intensity, 0.0);
        assert_eq!(metrics.message_recency, 1.0);
        assert_eq!(metrics.min_role_density, 0);
    }
}
