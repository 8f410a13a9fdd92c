//! Minimal embedding: a window with one editor widget and a few wired
//! nodes. Run with `cargo run -p wiregraph-gui --example sandbox`.

use eframe::egui;
use wiregraph_core::{EngineConfig, PortCapacity, PortDirection, PortOrientation};
use wiregraph_events::{Event, EventBus, EventListener};
use wiregraph_graph::{Theme, Vec2, ports};
use wiregraph_gui::GraphEditorView;

struct LogSink;

impl EventListener for LogSink {
    fn handle_event(&mut self, event: &Event) {
        tracing::info!(?event, "bus");
    }
}

struct SandboxApp {
    editor: GraphEditorView,
    bus: EventBus,
    sink: LogSink,
}

impl SandboxApp {
    fn new() -> Self {
        let bus = EventBus::new();
        let mut editor = GraphEditorView::new(EngineConfig::default(), Theme::dark(), bus.clone());

        let scene = editor.controller_mut().scene_mut();
        let source = scene.add_node("source", Vec2::new(80.0, 120.0), Vec2::new(140.0, 60.0));
        let filter = scene.add_node("filter", Vec2::new(340.0, 180.0), Vec2::new(140.0, 60.0));
        let sink = scene.add_node("sink", Vec2::new(620.0, 120.0), Vec2::new(140.0, 60.0));

        let theme = Theme::dark();
        let mut port = |scene: &mut wiregraph_graph::Scene, node, direction, offset| {
            let color = match direction {
                PortDirection::Input => theme.port_input,
                PortDirection::Output => theme.port_output,
            };
            scene
                .add_port(
                    node,
                    direction,
                    PortOrientation::Horizontal,
                    PortCapacity::Multi,
                    offset,
                    color,
                )
                .expect("node was just added")
        };
        let source_out = port(scene, source, PortDirection::Output, Vec2::new(140.0, 30.0));
        let filter_in = port(scene, filter, PortDirection::Input, Vec2::new(0.0, 30.0));
        let _filter_out = port(scene, filter, PortDirection::Output, Vec2::new(140.0, 30.0));
        let _sink_in = port(scene, sink, PortDirection::Input, Vec2::new(0.0, 30.0));
        let _ = ports::connect_ports(scene, source_out, filter_in);

        Self {
            editor,
            bus,
            sink: LogSink,
        }
    }
}

impl eframe::App for SandboxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.editor.show(ui, rect);
            });
        self.bus.dispatch_to(&mut self.sink);
    }
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt::init();
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "wiregraph sandbox",
        options,
        Box::new(|_cc| Ok(Box::new(SandboxApp::new()))),
    )
}
