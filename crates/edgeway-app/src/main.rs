//! Edgeway preview: runs a scripted editing session over demo content and
//! writes the resulting canvas as SVG.
//!
//! Usage: `edgeway [OUTPUT.svg]`. Set `EDGEWAY_CONFIG` to a JSON file to
//! override the snapping configuration.

mod svg;

use std::cell::Cell;
use std::rc::Rc;
use std::{env, fs, io};

use edgeway_core::{
    ConfigError, Configuration, DiagramController, DiagramOwner, EdgeId, EdgeSpec, MouseButton,
    NodeId, NodePositionChange, NodeSpec, PointerCapture, PointerEvent,
};
use kurbo::{Point, Size};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Render error: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Rendered size of an entity node.
const NODE_SIZE: Size = Size::new(192.0, 80.0);
const SCREEN: Size = Size::new(1280.0, 720.0);

/// Surface that only tracks how many captures are held.
#[derive(Default)]
struct PreviewSurface {
    active: Cell<usize>,
}

impl PointerCapture for PreviewSurface {
    fn capture(&self, edge: &EdgeId) {
        self.active.set(self.active.get() + 1);
        log::debug!("Pointer captured for {}", edge);
    }

    fn release(&self, edge: &EdgeId) {
        self.active.set(self.active.get().saturating_sub(1));
        log::debug!("Pointer released for {}", edge);
    }
}

#[derive(Default)]
struct PreviewOwner {
    menus_opened: usize,
}

impl DiagramOwner for PreviewOwner {
    fn on_open_edge_context_menu(
        &mut self,
        edge_id: &EdgeId,
        waypoint_index: Option<usize>,
        x: f64,
        y: f64,
    ) {
        self.menus_opened += 1;
        match waypoint_index {
            Some(index) => {
                log::info!("Context menu for {} waypoint {} at ({}, {})", edge_id, index, x, y)
            }
            None => log::info!("Context menu for {} at ({}, {})", edge_id, x, y),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Edgeway preview");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = load_config()?;
    let surface = Rc::new(PreviewSurface::default());
    let mut controller = DiagramController::new(PreviewOwner::default(), config, surface.clone());

    let (nodes, edges) = demo_content();
    let ids: Vec<NodeId> = nodes.iter().map(|node| node.identifier.clone()).collect();
    controller.set_content(nodes, edges);
    for id in &ids {
        controller.set_node_measured(id, NODE_SIZE);
    }

    controller.center_viewport_to_node(&"node-000".into(), SCREEN);
    // Zoom back out around the screen center so the whole routed edge is visible
    let screen_center = Point::new(SCREEN.width / 2.0, SCREEN.height / 2.0);
    controller.camera_mut().zoom_at(screen_center, 0.5);
    let view = controller.viewport(SCREEN);
    log::info!(
        "Viewport at ({:.1}, {:.1}), {:.1}x{:.1}",
        view.position.x,
        view.position.y,
        view.width,
        view.height
    );

    script_session(&mut controller);

    if surface.active.get() != 0 {
        log::warn!("{} pointer captures still held", surface.active.get());
    }
    log::info!("{} context menus opened", controller.owner().menus_opened);

    let output = svg::render(&controller)?;
    match env::args().nth(1) {
        Some(path) => {
            fs::write(&path, output)?;
            log::info!("Wrote {}", path);
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn load_config() -> Result<Configuration, AppError> {
    match env::var("EDGEWAY_CONFIG") {
        Ok(path) => {
            let json = fs::read_to_string(&path)?;
            let config = Configuration::from_json_str(&json)?;
            log::info!("Loaded configuration from {}", path);
            Ok(config)
        }
        Err(_) => Ok(Configuration::default()),
    }
}

fn demo_content() -> (Vec<NodeSpec>, Vec<EdgeSpec>) {
    let node = |id: &str, label: &str, x: f64, y: f64| NodeSpec {
        identifier: id.into(),
        initial_position: Point::new(x, y),
        label: label.to_string(),
    };
    let nodes = vec![
        node("node-000", "dcat:Catalog", 110.0, 160.0),
        node("node-001", "dcat:CatalogRecord", 510.0, 160.0),
        node("node-002", "dcat-ap:Catalog", 110.0, 350.0),
    ];
    let edges = vec![
        EdgeSpec {
            identifier: "edge-000".into(),
            source: "node-000".into(),
            target: "node-001".into(),
            initial_waypoints: vec![
                Point::new(360.0, 170.0),
                Point::new(360.0, 60.0),
                Point::new(810.0, 60.0),
            ],
        },
        EdgeSpec {
            identifier: "edge-001".into(),
            source: "node-000".into(),
            target: "node-002".into(),
            initial_waypoints: Vec::new(),
        },
    ];
    (nodes, edges)
}

/// Replay the interactions a user would perform, in screen coordinates.
fn script_session(controller: &mut DiagramController<PreviewOwner>) {
    let routed: EdgeId = "edge-000".into();
    let direct: EdgeId = "edge-001".into();
    controller.select_edge(&routed);
    controller.select_edge(&direct);

    // Drag the top-right corner of the routed edge upwards
    let start = to_screen(controller, 810.0, 60.0);
    let end = to_screen(controller, 810.0, 30.0);
    controller.handle_pointer_event(down(start));
    controller.handle_pointer_event(PointerEvent::Move { position: end });
    controller.handle_pointer_event(up(end));

    // Click the first waypoint without moving
    let first = to_screen(controller, 360.0, 170.0);
    controller.handle_pointer_event(down(first));
    controller.handle_pointer_event(up(first));

    // Bend the direct edge by pressing its candidate
    match controller.diagram().edge_path(&direct) {
        Ok(path) => {
            if let Some(candidate) = path.candidates().first() {
                let at = to_screen(controller, candidate.position.x, candidate.position.y);
                controller.handle_pointer_event(down(at));
                controller.handle_pointer_event(up(at));
            }
        }
        Err(err) => log::warn!("No path for {}: {}", direct, err),
    }

    // Drag the lower node close to the column of the first one
    let dragged: NodeId = "node-002".into();
    controller.on_node_drag_start(&dragged);
    let change = NodePositionChange::new(dragged.clone(), Point::new(117.0, 356.0));
    let stored = controller.on_nodes_change(vec![change]);
    for change in &stored {
        log::info!("Stored {} at ({}, {})", change.id, change.position.x, change.position.y);
    }
    for guide in controller.alignment_guides().iter() {
        log::info!("Guide {:?} at {}", guide.axis, guide.coordinate());
    }
    controller.on_node_drag_stop(&dragged);
}

fn to_screen(controller: &DiagramController<PreviewOwner>, x: f64, y: f64) -> Point {
    controller.camera().canvas_to_screen(Point::new(x, y))
}

fn down(position: Point) -> PointerEvent {
    PointerEvent::Down {
        position,
        button: MouseButton::Left,
    }
}

fn up(position: Point) -> PointerEvent {
    PointerEvent::Up {
        position,
        button: MouseButton::Left,
    }
}
