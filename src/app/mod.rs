use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use eframe::egui::{self, Context, Vec2, vec2};
use parking_lot::Mutex;
use workspace_map::animator::{Animator, SharedView, TickReport};
use workspace_map::layout::SimulationParams;
use workspace_map::map::{LoadedMap, MapGraph, NodeId, load_workspace_map};
use workspace_map::view::{MapView, ViewOptions};

mod controls;
mod interaction;
mod render;

pub const MIN_EDGE_LENGTH: f32 = 50.0;
pub const MAX_EDGE_LENGTH: f32 = 500.0;

// Replaced by the real canvas size on the first frame.
const INITIAL_VIEWPORT: Vec2 = vec2(1000.0, 700.0);
const ELEMENT_VIEWPORT: Vec2 = vec2(640.0, 480.0);
const REPAINT_INTERVAL: Duration = Duration::from_millis(33);

pub struct AppConfig {
    pub snapshot: PathBuf,
    pub edge_length: f32,
    pub animate: bool,
    pub now: Option<u64>,
}

pub struct WorkspaceMapApp {
    config: AppConfig,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedMap, String>>,
    },
    Ready(Box<MapModel>),
    Error(String),
}

/// A view plus the ticker animating it.
struct MapCanvas {
    animator: Animator,
    last_report: Option<TickReport>,
    failure: Option<String>,
}

struct ElementWindow {
    id: egui::Id,
    title: String,
    open: bool,
    canvas: MapCanvas,
}

struct MapModel {
    canvas: MapCanvas,
    now: u64,
    animate: bool,
    edge_length: f32,
    search: String,
    search_cache: Option<(String, Vec<NodeId>)>,
    element_windows: Vec<ElementWindow>,
}

impl WorkspaceMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let state = Self::start_load(config.snapshot.clone());
        Self { config, state }
    }

    fn start_load(snapshot: PathBuf) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_workspace_map(&snapshot).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }

    fn ready(&self, loaded: LoadedMap) -> AppState {
        let now = self
            .config
            .now
            .or(loaded.now)
            .unwrap_or_else(current_unix_time);
        let params = SimulationParams {
            edge_length: self.config.edge_length,
            ..SimulationParams::tree()
        };
        let options = ViewOptions::new(now).with_params(params);

        match MapView::new(loaded.graph, INITIAL_VIEWPORT, options) {
            Ok(view) => AppState::Ready(Box::new(MapModel {
                canvas: MapCanvas::new(view, self.config.animate),
                now,
                animate: self.config.animate,
                edge_length: self.config.edge_length,
                search: String::new(),
                search_cache: None,
                element_windows: Vec::new(),
            })),
            Err(error) => AppState::Error(error.to_string()),
        }
    }
}

fn current_unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

impl eframe::App for WorkspaceMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(result);
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading workgroup snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(REPAINT_INTERVAL);
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to build the workspace map");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(result) = transition {
            self.state = match result {
                Ok(loaded) => self.ready(loaded),
                Err(error) => AppState::Error(error),
            };
        } else if retry {
            self.state = Self::start_load(self.config.snapshot.clone());
        }
    }
}

impl MapCanvas {
    fn new(view: MapView, animate: bool) -> Self {
        let mut animator = Animator::new(Arc::new(Mutex::new(view)));
        if animate {
            animator.start();
        }
        Self {
            animator,
            last_report: None,
            failure: None,
        }
    }

    fn view(&self) -> &SharedView {
        self.animator.view()
    }

    fn set_animated(&mut self, animate: bool) {
        if animate {
            self.failure = None;
            self.animator.start();
        } else {
            self.animator.stop();
        }
    }

    /// Starts a stopped ticker so the layout reacts to a gesture.
    fn wake(&mut self) -> bool {
        if self.animator.is_running() {
            return false;
        }
        self.failure = None;
        self.animator.start()
    }

    fn poll(&mut self) {
        for report in self.animator.reports() {
            if let TickReport::Failed(error) = &report {
                self.failure = Some(error.to_string());
            }
            self.last_report = Some(report);
        }
    }

    fn is_moving(&self) -> bool {
        self.animator.is_running() && matches!(self.last_report, Some(TickReport::Moved { .. }))
    }
}

impl ElementWindow {
    fn open(graph: &MapGraph, workspace: NodeId, now: u64, animate: bool) -> Option<Self> {
        let title = format!("Elements of {}", graph.get(workspace)?.full_label());
        let elements = graph.element_map(workspace)?;
        let options = ViewOptions::new(now).with_params(SimulationParams::element());

        match MapView::element_view(elements, ELEMENT_VIEWPORT, options) {
            Ok(view) => Some(Self {
                id: egui::Id::new(("element_map", workspace.index())),
                title,
                open: true,
                canvas: MapCanvas::new(view, animate),
            }),
            Err(error) => {
                log::warn!("cannot open {title}: {error}");
                None
            }
        }
    }
}

impl MapModel {
    fn search_hits(&mut self) -> HashSet<NodeId> {
        let query = self.search.trim();
        if query.is_empty() {
            return HashSet::new();
        }

        if let Some((cached, hits)) = &self.search_cache
            && cached == query
        {
            return hits.iter().copied().collect();
        }

        let hits = self.canvas.view().lock().search(query);
        let set = hits.iter().copied().collect();
        self.search_cache = Some((query.to_owned(), hits));
        set
    }

    fn show(&mut self, ctx: &Context) {
        self.canvas.poll();
        for window in &mut self.element_windows {
            window.canvas.poll();
        }
        // A gesture may have restarted the ticker, a failed tick stops it.
        self.animate = self.canvas.animator.is_running();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        let highlight = self.search_hits();
        let mut requested = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            requested = self.canvas.draw(ui, &highlight);
        });

        if let Some(workspace) = requested
            && !self
                .element_windows
                .iter()
                .any(|window| window.id == egui::Id::new(("element_map", workspace.index())))
        {
            let view = self.canvas.view().lock();
            if let Some(window) = ElementWindow::open(view.graph(), workspace, self.now, self.animate)
            {
                log::info!("opened {}", window.title);
                self.element_windows.push(window);
            }
        }

        let empty = HashSet::new();
        for window in &mut self.element_windows {
            egui::Window::new(window.title.as_str())
                .id(window.id)
                .open(&mut window.open)
                .default_size(ELEMENT_VIEWPORT)
                .show(ctx, |ui| {
                    {
                        let mut view = window.canvas.view().lock();
                        controls::draw_element_filters(ui, &mut view);
                    }
                    window.canvas.draw(ui, &empty);
                });
        }
        // Dropping a window's animator stops its ticker.
        self.element_windows.retain(|window| window.open);

        let moving = self.canvas.is_moving()
            || self
                .element_windows
                .iter()
                .any(|window| window.canvas.is_moving());
        if moving || self.canvas.animator.is_running() {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }

    fn draw_top_bar(&self, ui: &mut egui::Ui) {
        let view = self.canvas.view().lock();
        let graph = view.graph();
        let shown = graph.visible_nodes().count();

        ui.horizontal(|ui| {
            ui.heading("workspace-map");
            ui.separator();
            ui.label(format!("root: {}", graph.node(view.root()).full_label()));
            ui.label(format!("nodes: {}/{}", shown, graph.node_count()));
            ui.label(format!("edges: {}", graph.edge_count()));
            if let Some(focus) = view.state().focus {
                ui.label(format!("focus: {}", graph.node(focus).full_label()));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(failure) = &self.canvas.failure {
                    ui.colored_label(egui::Color32::LIGHT_RED, failure);
                } else if view.simulation().is_settled() {
                    ui.label("settled");
                } else {
                    ui.label(format!("step {}", view.simulation().iterations()));
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use workspace_map::map::{ArrowMode, EdgeKind, NodeKind, WorkspaceInfo};

    use super::*;

    fn still_canvas() -> MapCanvas {
        let mut graph = MapGraph::new();
        let root = graph.add_node(
            NodeKind::Workspace(Box::new(WorkspaceInfo::new("root", "ann"))),
            None,
        );
        let leaf = graph.add_node(
            NodeKind::Workspace(Box::new(WorkspaceInfo::new("leaf", "ann"))),
            Some(root),
        );
        graph.add_edge(root, leaf, EdgeKind::Child, ArrowMode::To, None);

        let params = SimulationParams {
            tick_interval: Duration::from_millis(2),
            ..SimulationParams::tree()
        };
        let options = ViewOptions::new(0).with_params(params).with_seed(1);
        let view = MapView::new(graph, vec2(400.0, 300.0), options).unwrap();
        MapCanvas::new(view, false)
    }

    #[test]
    fn gestures_wake_a_stopped_ticker() {
        let mut canvas = still_canvas();
        assert!(!canvas.animator.is_running());

        let root = canvas.view().lock().root();
        let at = canvas.view().lock().graph().node(root).pos;
        assert_eq!(canvas.view().lock().double_click(at), Some(root));

        assert!(canvas.wake());
        assert!(canvas.animator.is_running());
        assert!(!canvas.wake());
        canvas.animator.stop();
    }
}
