use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::error::MapError;
use crate::layout::TickOutcome;
use crate::view::MapView;

pub type SharedView = Arc<Mutex<MapView>>;

#[derive(Clone, Debug, PartialEq)]
pub enum TickReport {
    Moved { major_change: bool },
    Idle,
    /// The ticker stops after sending this.
    Failed(MapError),
}

impl From<TickOutcome> for TickReport {
    fn from(outcome: TickOutcome) -> Self {
        match outcome {
            TickOutcome::Moved { major_change } => Self::Moved { major_change },
            TickOutcome::Idle => Self::Idle,
        }
    }
}

struct Ticker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn is_alive(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.handle.is_finished()
    }
}

/// Drives one view's simulation from a background thread, one relax step
/// per `tick_interval`, each under the view lock.
pub struct Animator {
    view: SharedView,
    ticker: Option<Ticker>,
    tx: Sender<TickReport>,
    rx: Receiver<TickReport>,
}

impl Animator {
    pub fn new(view: SharedView) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            view,
            ticker: None,
            tx,
            rx,
        }
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_alive)
    }

    /// Returns false when a ticker was already running and got reused.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let running = Arc::new(AtomicBool::new(true));
        let handle = {
            let running = Arc::clone(&running);
            let view = Arc::clone(&self.view);
            let tx = self.tx.clone();
            thread::spawn(move || run_ticker(&view, &running, &tx))
        };

        log::info!("animation started");
        self.ticker = Some(Ticker { running, handle });
        true
    }

    /// Asks the ticker to finish; it exits before its next step. Never
    /// blocks, so it is safe to call while holding the view lock.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.running.store(false, Ordering::Release);
            log::info!("animation stopped");
        }
    }

    /// Drains every report sent since the last call.
    pub fn reports(&self) -> impl Iterator<Item = TickReport> + '_ {
        self.rx.try_iter()
    }

    pub fn receiver(&self) -> &Receiver<TickReport> {
        &self.rx
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_ticker(view: &SharedView, running: &AtomicBool, tx: &Sender<TickReport>) {
    while running.load(Ordering::Acquire) {
        let (report, interval) = {
            let mut view = view.lock();
            let report = match view.tick() {
                Ok(outcome) => TickReport::from(outcome),
                Err(error) => TickReport::Failed(error),
            };
            (report, view.params().tick_interval)
        };

        if let TickReport::Failed(error) = &report {
            log::error!("layout step failed: {error}");
            running.store(false, Ordering::Release);
            let _ = tx.send(report);
            return;
        }
        if tx.send(report).is_err() {
            break;
        }

        thread::sleep(interval);
    }
    log::debug!("ticker exited");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use eframe::egui::vec2;

    use super::*;
    use crate::layout::SimulationParams;
    use crate::map::{ArrowMode, EdgeKind, MapGraph, NodeKind, WorkspaceInfo};
    use crate::view::ViewOptions;

    const WAIT: Duration = Duration::from_secs(5);

    fn shared_view() -> SharedView {
        let mut graph = MapGraph::new();
        let root = graph.add_node(
            NodeKind::Workspace(Box::new(WorkspaceInfo::new("root", "ann"))),
            None,
        );
        let child = graph.add_node(
            NodeKind::Workspace(Box::new(WorkspaceInfo::new("child", "ann"))),
            Some(root),
        );
        graph.add_edge(root, child, EdgeKind::Child, ArrowMode::To, None);

        let params = SimulationParams {
            tick_interval: Duration::from_millis(2),
            ..SimulationParams::tree()
        };
        let mut view = MapView::new(
            graph,
            vec2(800.0, 600.0),
            ViewOptions::new(0).with_params(params).with_seed(7),
        )
        .unwrap();
        view.expand(root).unwrap();
        Arc::new(Mutex::new(view))
    }

    #[test]
    fn ticks_until_the_budget_runs_out() {
        let mut animator = Animator::new(shared_view());
        assert!(animator.start());

        let first = animator.receiver().recv_timeout(WAIT).unwrap();
        assert!(matches!(first, TickReport::Moved { .. }));

        let settled = (0..500)
            .map_while(|_| animator.receiver().recv_timeout(WAIT).ok())
            .any(|report| report == TickReport::Idle);
        assert!(settled);
        assert!(animator.view().lock().simulation().is_settled());

        animator.stop();
        assert!(!animator.is_running());
    }

    #[test]
    fn start_reuses_a_running_ticker() {
        let mut animator = Animator::new(shared_view());
        assert!(animator.start());
        assert!(!animator.start());
        assert!(animator.is_running());

        animator.stop();
        assert!(animator.start());
    }

    #[test]
    fn failed_step_is_reported_and_ends_the_ticker() {
        let view = shared_view();
        view.lock().set_viewport(vec2(0.0, 0.0));

        let mut animator = Animator::new(Arc::clone(&view));
        animator.start();

        let report = animator.receiver().recv_timeout(WAIT).unwrap();
        assert!(matches!(report, TickReport::Failed(MapError::InvalidViewport { .. })));
        assert!(animator.receiver().recv_timeout(Duration::from_millis(50)).is_err());
        assert!(!animator.is_running());
    }
}
