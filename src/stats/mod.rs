mod histogram;
mod metrics;
mod palette;

use eframe::egui::Color32;

use crate::map::{MapGraph, NodeId, NodeKind};

pub use histogram::Histogram;
pub use metrics::{DEFAULT_RECENCY_WINDOW, WorkspaceMetrics, recency_weight};
pub use palette::{
    LEAF_COLOR, MAX_RAMP_ENTRIES, NODE_COLOR, SPECIAL_COLOR, density_ramp, edge_color,
    element_color, intensity_ramp, text_color_for,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColoringMode {
    #[default]
    ParentChild,
    AbsoluteDensity,
    MinimumDensity,
    MaximumDensity,
    MeanDensity,
    EvolutionIntensity,
    EvolutionRecency,
    MessageIntensity,
    MessageRecency,
}

impl ColoringMode {
    pub const ALL: [ColoringMode; 9] = [
        Self::ParentChild,
        Self::AbsoluteDensity,
        Self::MinimumDensity,
        Self::MaximumDensity,
        Self::MeanDensity,
        Self::EvolutionIntensity,
        Self::EvolutionRecency,
        Self::MessageIntensity,
        Self::MessageRecency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ParentChild => "Parent/child",
            Self::AbsoluteDensity => "Absolute workspace density",
            Self::MinimumDensity => "Minimum workspace density",
            Self::MaximumDensity => "Maximum workspace density",
            Self::MeanDensity => "Mean workspace density",
            Self::EvolutionIntensity => "Evolution intensity",
            Self::EvolutionRecency => "Evolution recency",
            Self::MessageIntensity => "Message intensity",
            Self::MessageRecency => "Message recency",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendRow {
    pub key: String,
    pub count: u32,
    pub color: Color32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Legend {
    pub title: &'static str,
    pub count_axis: &'static str,
    pub value_axis: &'static str,
    pub rows: Vec<LegendRow>,
}

#[derive(Clone, Debug, Default)]
struct ColorScale<K> {
    histogram: Histogram<K>,
    colors: Vec<Color32>,
}

impl<K: Copy + PartialOrd + ToString> ColorScale<K> {
    fn new(histogram: Histogram<K>, ramp: fn(usize) -> Vec<Color32>) -> Self {
        let colors = ramp(histogram.len());
        Self { histogram, colors }
    }

    fn bucket(&self, key: K) -> Option<usize> {
        let index = self.histogram.index_of(key)?;
        Some(index.min(self.colors.len().checked_sub(1)?))
    }

    fn color(&self, key: K) -> Option<Color32> {
        self.bucket(key).map(|index| self.colors[index])
    }

    fn legend(
        &self,
        title: &'static str,
        count_axis: &'static str,
        value_axis: &'static str,
    ) -> Legend {
        let rows = self
            .histogram
            .entries()
            .iter()
            .zip(&self.colors)
            .map(|(&(key, count), &color)| LegendRow {
                key: key.to_string(),
                count,
                color,
            })
            .collect();

        Legend {
            title,
            count_axis,
            value_axis,
            rows,
        }
    }
}

/// Per-workspace metrics and the color scales built from them, computed
/// once per loaded map.
#[derive(Clone, Debug, Default)]
pub struct MapStatistics {
    metrics: Vec<Option<WorkspaceMetrics>>,
    density: ColorScale<u32>,
    evolution_intensity: ColorScale<f32>,
    evolution_recency: ColorScale<f32>,
    message_intensity: ColorScale<f32>,
    message_recency: ColorScale<f32>,
}

impl MapStatistics {
    pub fn compute(graph: &MapGraph, now: u64, window: u32) -> Self {
        let metrics = graph
            .nodes()
            .map(|(_, node)| match node.kind() {
                NodeKind::Workspace(info) => Some(WorkspaceMetrics::measure(info, now, window)),
                _ => None,
            })
            .collect::<Vec<_>>();

        let measured = || metrics.iter().flatten();
        let density = Histogram::from_values(measured().flat_map(|metric| {
            [
                metric.abs_density,
                metric.min_role_density,
                metric.max_role_density,
                metric.mean_role_density as u32,
            ]
        }));
        let floats = |pick: fn(&WorkspaceMetrics) -> f32| {
            ColorScale::new(Histogram::from_values(measured().map(pick)), intensity_ramp)
        };
        let evolution_intensity = floats(|metric| metric.evolution_intensity);
        let evolution_recency = floats(|metric| metric.evolution_recency);
        let message_intensity = floats(|metric| metric.message_intensity);
        let message_recency = floats(|metric| metric.message_recency);

        let statistics = Self {
            metrics,
            density: ColorScale::new(density, density_ramp),
            evolution_intensity,
            evolution_recency,
            message_intensity,
            message_recency,
        };

        log::debug!(
            "measured {} workspaces, {} distinct densities",
            statistics.metrics.iter().flatten().count(),
            statistics.density.histogram.len()
        );
        statistics
    }

    pub fn metrics(&self, id: NodeId) -> Option<&WorkspaceMetrics> {
        self.metrics.get(id.index())?.as_ref()
    }

    pub fn density_histogram(&self) -> &Histogram<u32> {
        &self.density.histogram
    }

    /// Index into the active mode's ramp for a workspace node.
    pub fn bucket(&self, id: NodeId, mode: ColoringMode) -> Option<usize> {
        let metric = self.metrics(id)?;
        match mode {
            ColoringMode::ParentChild => None,
            ColoringMode::AbsoluteDensity => self.density.bucket(metric.abs_density),
            ColoringMode::MinimumDensity => self.density.bucket(metric.min_role_density),
            ColoringMode::MaximumDensity => self.density.bucket(metric.max_role_density),
            ColoringMode::MeanDensity => self.density.bucket(metric.mean_role_density as u32),
            ColoringMode::EvolutionIntensity => {
                self.evolution_intensity.bucket(metric.evolution_intensity)
            }
            ColoringMode::EvolutionRecency => self.evolution_recency.bucket(metric.evolution_recency),
            ColoringMode::MessageIntensity => self.message_intensity.bucket(metric.message_intensity),
            ColoringMode::MessageRecency => self.message_recency.bucket(metric.message_recency),
        }
    }

    pub fn node_color(&self, graph: &MapGraph, id: NodeId, mode: ColoringMode) -> Color32 {
        let node = graph.node(id);
        if node.is_special() {
            return SPECIAL_COLOR;
        }
        if let Some(kind) = node.element_kind() {
            return element_color(kind);
        }

        let Some(metric) = self.metrics(id) else {
            return NODE_COLOR;
        };
        let color = match mode {
            ColoringMode::ParentChild => {
                return if node.is_leaf() { LEAF_COLOR } else { NODE_COLOR };
            }
            ColoringMode::AbsoluteDensity => self.density.color(metric.abs_density),
            ColoringMode::MinimumDensity => self.density.color(metric.min_role_density),
            ColoringMode::MaximumDensity => self.density.color(metric.max_role_density),
            ColoringMode::MeanDensity => self.density.color(metric.mean_role_density as u32),
            ColoringMode::EvolutionIntensity => {
                self.evolution_intensity.color(metric.evolution_intensity)
            }
            ColoringMode::EvolutionRecency => self.evolution_recency.color(metric.evolution_recency),
            ColoringMode::MessageIntensity => self.message_intensity.color(metric.message_intensity),
            ColoringMode::MessageRecency => self.message_recency.color(metric.message_recency),
        };
        color.unwrap_or(NODE_COLOR)
    }

    pub fn legend(&self, mode: ColoringMode) -> Option<Legend> {
        let legend = match mode {
            ColoringMode::ParentChild => return None,
            ColoringMode::AbsoluteDensity
            | ColoringMode::MinimumDensity
            | ColoringMode::MaximumDensity
            | ColoringMode::MeanDensity => {
                self.density
                    .legend("Workspace Density", "Num. Workspaces", "Objects/Workspace")
            }
            ColoringMode::EvolutionIntensity => self.evolution_intensity.legend(
                "Evolution Intensity",
                "Num. Workspaces",
                "New Objects/Week",
            ),
            ColoringMode::EvolutionRecency => self.evolution_recency.legend(
                "Evolution Recency",
                "Num. Workspaces",
                "New Recent Objects",
            ),
            ColoringMode::MessageIntensity => self.message_intensity.legend(
                "Message Intensity",
                "Num. Workspaces",
                "New Msg./Week",
            ),
            ColoringMode::MessageRecency => self.message_recency.legend(
                "Message Recency",
                "Num. Workspaces",
                "New Recent Msgs.",
            ),
        };
        Some(legend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ElementRecord, WorkspaceInfo};

    fn workspace_with_documents(name: &str, documents: usize) -> NodeKind {
        let mut info = WorkspaceInfo::new(name, "ann");
        info.documents = (0..documents)
            .map(|index| ElementRecord {
                name: format!("doc{index}"),
                ..ElementRecord::default()
            })
            .collect();
        NodeKind::Workspace(Box::new(info))
    }

    fn sample() -> (MapGraph, [NodeId; 4]) {
        let mut graph = MapGraph::new();
        let root = graph.add_node(NodeKind::Group("Workgroups".into()), None);
        let a = graph.add_node(workspace_with_documents("a", 0), Some(root));
        let b = graph.add_node(workspace_with_documents("b", 2), Some(a));
        let c = graph.add_node(workspace_with_documents("c", 5), Some(a));
        (graph, [root, a, b, c])
    }

    #[test]
    fn density_pool_skips_special_nodes() {
        let (graph, _) = sample();
        let statistics = MapStatistics::compute(&graph, 0, DEFAULT_RECENCY_WINDOW);

        // No roles anywhere, so min/max/mean all land on zero.
        assert_eq!(
            statistics.density_histogram().entries(),
            &[(0, 10), (2, 1), (5, 1)]
        );
    }

    #[test]
    fn colors_follow_the_active_mode() {
        let (graph, [root, a, b, c]) = sample();
        let statistics = MapStatistics::compute(&graph, 0, DEFAULT_RECENCY_WINDOW);

        assert_eq!(
            statistics.node_color(&graph, root, ColoringMode::AbsoluteDensity),
            SPECIAL_COLOR
        );
        assert_eq!(
            statistics.node_color(&graph, a, ColoringMode::ParentChild),
            NODE_COLOR
        );
        assert_eq!(
            statistics.node_color(&graph, b, ColoringMode::ParentChild),
            LEAF_COLOR
        );

        let ramp = density_ramp(3);
        assert_eq!(statistics.bucket(c, ColoringMode::AbsoluteDensity), Some(2));
        assert_eq!(
            statistics.node_color(&graph, c, ColoringMode::AbsoluteDensity),
            ramp[2]
        );
        assert_eq!(statistics.bucket(root, ColoringMode::AbsoluteDensity), None);
    }

    #[test]
    fn density_modes_share_one_legend() {
        let (graph, _) = sample();
        let statistics = MapStatistics::compute(&graph, 0, DEFAULT_RECENCY_WINDOW);

        let absolute = statistics.legend(ColoringMode::AbsoluteDensity).unwrap();
        let mean = statistics.legend(ColoringMode::MeanDensity).unwrap();
        assert_eq!(absolute, mean);
        assert_eq!(absolute.rows.len(), 3);
        assert_eq!(absolute.rows[1].key, "2");
        assert!(statistics.legend(ColoringMode::ParentChild).is_none());
    }
}
