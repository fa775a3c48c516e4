mod app;

use std::path::PathBuf;

use clap::Parser;
use workspace_map::map::INITIAL_EDGE_LENGTH;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Workgroup snapshot in JSON form.
    snapshot: PathBuf,

    #[arg(long, default_value_t = INITIAL_EDGE_LENGTH)]
    edge_length: f32,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 860.0)]
    height: f32,

    /// Start with the layout ticker paused.
    #[arg(long)]
    no_animation: bool,

    /// Reference time for metric ages, unix seconds. Falls back to the
    /// snapshot's own timestamp, then the current time.
    #[arg(long)]
    now: Option<u64>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };
    let config = app::AppConfig {
        snapshot: args.snapshot,
        edge_length: args.edge_length.clamp(app::MIN_EDGE_LENGTH, app::MAX_EDGE_LENGTH),
        animate: !args.no_animation,
        now: args.now,
    };

    eframe::run_native(
        "workspace-map",
        options,
        Box::new(move |cc| Ok(Box::new(app::WorkspaceMapApp::new(cc, config)))),
    )
}
