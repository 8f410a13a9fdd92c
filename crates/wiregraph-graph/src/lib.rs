pub mod dragdrop;
pub mod geometry;
pub mod grid;
pub mod hit;
pub mod interaction;
pub mod layers;
pub mod pan;
pub mod ports;
pub mod scene;
pub mod selection;
pub mod style;
pub mod tracking;
pub mod viewport;

pub use dragdrop::{AcceptedDrag, DragEvent, DragProtocol};
pub use geometry::{Rect, Vec2, ViewTransform, fit_transform, pan_speed};
pub use grid::{GridLine, MarqueeShape, grid_lines, marquee_shape, snap_to_grid};
pub use hit::{CubicBezier, HitResult, HitTester, edge_curve};
pub use interaction::EditorController;
pub use layers::LayerRegistry;
pub use pan::AutoPanner;
pub use scene::{
    EdgeData, EdgeEnd, Element, ElementKind, LAYER_EDGES, LAYER_NODES, LAYER_PORTS, NodeData,
    PortData, Scene,
};
pub use style::{Color, Theme};
pub use tracking::GeometryTracker;
pub use viewport::{ViewState, Viewport, content_bounds};
