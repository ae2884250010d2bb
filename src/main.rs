mod api;
mod app;
mod camera;
mod graph;
mod session;
mod util;
mod vec3;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:3000/api")]
    api_base: String,

    #[arg(long, default_value = "default-graph")]
    graph_id: String,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MindGraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::MindGraphApp::new(
                cc,
                &args.api_base,
                &args.graph_id,
            )?))
        }),
    )
}
