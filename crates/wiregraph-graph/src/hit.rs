//! Hit testing over the scene, with explicit priority ordering:
//! Port > Node > Edge > None. Nodes resolve in pick order (topmost layer
//! first, latest-raised first within a bucket); edges resolve by sampled
//! distance to their cubic curve.

use crate::geometry::Vec2;
use crate::scene::{EdgeEnd, Scene};
use wiregraph_core::{ElementId, EngineConfig, PortDirection, PortOrientation};

/// Result of a hit test at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Nothing was hit at the tested position.
    None,
    Port(ElementId),
    Node(ElementId),
    Edge(ElementId),
}

/// A cubic bezier through an edge's two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.start * (u * u * u)
            + self.control1 * (3.0 * u * u * t)
            + self.control2 * (3.0 * u * t * t)
            + self.end * (t * t * t)
    }

    /// Minimum distance from `pos` to the sampled curve.
    pub fn distance_to(&self, pos: Vec2, samples: usize) -> f32 {
        let samples = samples.max(2);
        let mut best = f32::MAX;
        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            best = best.min(self.point_at(t).distance(pos));
        }
        best
    }
}

fn tangent_offset(start: Vec2, end: Vec2) -> f32 {
    (start.distance(end) * 0.5).clamp(20.0, 150.0)
}

fn endpoint_tangent(
    scene: &Scene,
    port: Option<ElementId>,
    own: Vec2,
    other: Vec2,
    offset: f32,
) -> Vec2 {
    match port.and_then(|p| scene.port(p).ok()) {
        Some(data) => {
            let sign = match data.direction {
                PortDirection::Output => 1.0,
                PortDirection::Input => -1.0,
            };
            match data.orientation {
                PortOrientation::Horizontal => own + Vec2::new(sign * offset, 0.0),
                PortOrientation::Vertical => own + Vec2::new(0.0, sign * offset),
            }
        }
        // Detached end (candidate): bend gently toward the far endpoint.
        None => own + (other - own) * (1.0 / 3.0),
    }
}

/// The render/pick curve for an edge, in world space. Respects endpoint
/// overrides.
pub fn edge_curve(scene: &Scene, edge: ElementId) -> Option<CubicBezier> {
    let data = scene.edge(edge).ok()?;
    let start = data.endpoint(EdgeEnd::Output);
    let end = data.endpoint(EdgeEnd::Input);
    let offset = tangent_offset(start, end);
    Some(CubicBezier {
        start,
        control1: endpoint_tangent(scene, data.output, start, end, offset),
        control2: endpoint_tangent(scene, data.input, end, start, offset),
        end,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct HitTester {
    /// Pick radius around a port center, in screen pixels.
    pub port_radius: f32,
    /// Distance tolerance for edge curves, in screen pixels.
    pub edge_tolerance: f32,
    /// Samples along each curve for distance testing.
    pub samples: usize,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            port_radius: 8.0,
            edge_tolerance: 8.0,
            samples: 48,
        }
    }
}

impl HitTester {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            edge_tolerance: config.edge_pick_tolerance,
            samples: config.edge_pick_samples,
            ..Self::default()
        }
    }

    /// Hit test at a world-space position. `scale` is the current uniform
    /// viewport zoom, used to keep pick tolerances constant on screen.
    pub fn hit_test(&self, scene: &Scene, world: Vec2, scale: f32) -> HitResult {
        if let Some(port) = self.pick_port(scene, world, scale, None) {
            return HitResult::Port(port);
        }
        if let Some(node) = self.pick_node(scene, world, None) {
            return HitResult::Node(node);
        }
        if let Some(edge) = self.pick_edge(scene, world, scale) {
            return HitResult::Edge(edge);
        }
        HitResult::None
    }

    pub fn pick_port(
        &self,
        scene: &Scene,
        world: Vec2,
        scale: f32,
        exclude: Option<ElementId>,
    ) -> Option<ElementId> {
        let radius = self.port_radius / scale.max(f32::EPSILON);
        let mut best = radius;
        let mut best_port = None;
        for id in scene.pick_order() {
            if Some(id) == exclude {
                continue;
            }
            let Some(element) = scene.get(id) else {
                continue;
            };
            if !element.is_port() {
                continue;
            }
            let Some(pos) = scene.world_position(id) else {
                continue;
            };
            let dist = pos.distance(world);
            if dist <= best {
                best = dist;
                best_port = Some(id);
            }
        }
        best_port
    }

    pub fn pick_node(
        &self,
        scene: &Scene,
        world: Vec2,
        exclude: Option<ElementId>,
    ) -> Option<ElementId> {
        for id in scene.pick_order() {
            if Some(id) == exclude {
                continue;
            }
            let Some(element) = scene.get(id) else {
                continue;
            };
            if !element.is_node() {
                continue;
            }
            if let Some(rect) = scene.world_rect(id) {
                if rect.contains(world) {
                    return Some(id);
                }
            }
        }
        None
    }

    pub fn pick_edge(&self, scene: &Scene, world: Vec2, scale: f32) -> Option<ElementId> {
        let tolerance = self.edge_tolerance / scale.max(f32::EPSILON);
        let mut best = tolerance;
        let mut best_edge = None;
        for id in scene.pick_order() {
            let Some(element) = scene.get(id) else {
                continue;
            };
            let Some(data) = element.as_edge() else {
                continue;
            };
            if data.ghost || !data.is_real() {
                continue;
            }
            let Some(curve) = edge_curve(scene, id) else {
                continue;
            };
            let dist = curve.distance_to(world, self.samples);
            if dist <= best {
                best = dist;
                best_edge = Some(id);
            }
        }
        best_edge
    }

    /// Topmost droppable element under the cursor, excluding the dragged
    /// element. Used by the drag protocol's drop-target tracking.
    pub fn pick_drop_target(
        &self,
        scene: &Scene,
        world: Vec2,
        scale: f32,
        exclude: Option<ElementId>,
    ) -> Option<ElementId> {
        if let Some(port) = self.pick_port(scene, world, scale, exclude) {
            if scene
                .get(port)
                .map(|e| e.capabilities.droppable)
                .unwrap_or(false)
            {
                return Some(port);
            }
        }
        for id in scene.pick_order() {
            if Some(id) == exclude {
                continue;
            }
            let Some(element) = scene.get(id) else {
                continue;
            };
            if !element.is_node() || !element.capabilities.droppable {
                continue;
            }
            if let Some(rect) = scene.world_rect(id) {
                if rect.contains(world) {
                    return Some(id);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports;
    use crate::style::Color;
    use wiregraph_core::{Capabilities, PortCapacity};

    fn rigged_scene() -> (Scene, ElementId, ElementId, ElementId, ElementId) {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Vec2::ZERO, Vec2::new(100.0, 60.0));
        let out = scene
            .add_port(
                a,
                PortDirection::Output,
                PortOrientation::Horizontal,
                PortCapacity::Multi,
                Vec2::new(100.0, 30.0),
                Color::rgb(128, 128, 128),
            )
            .unwrap();
        let b = scene.add_node("b", Vec2::new(300.0, 0.0), Vec2::new(100.0, 60.0));
        let inp = scene
            .add_port(
                b,
                PortDirection::Input,
                PortOrientation::Horizontal,
                PortCapacity::Multi,
                Vec2::new(0.0, 30.0),
                Color::rgb(128, 128, 128),
            )
            .unwrap();
        (scene, a, out, b, inp)
    }

    #[test]
    fn port_wins_over_node() {
        let (scene, a, out, _b, _inp) = rigged_scene();
        let tester = HitTester::default();
        // The port sits on node a's right border.
        assert_eq!(
            tester.hit_test(&scene, Vec2::new(99.0, 30.0), 1.0),
            HitResult::Port(out)
        );
        assert_eq!(
            tester.hit_test(&scene, Vec2::new(50.0, 30.0), 1.0),
            HitResult::Node(a)
        );
    }

    #[test]
    fn edge_hit_within_tolerance() {
        let (mut scene, _a, out, _b, inp) = rigged_scene();
        let edge = ports::connect_ports(&mut scene, out, inp).unwrap();
        scene.flush_geometry();
        let tester = HitTester::default();

        // Midpoint between the two ports lies on the curve.
        assert_eq!(
            tester.hit_test(&scene, Vec2::new(200.0, 30.0), 1.0),
            HitResult::Edge(edge)
        );
        assert_eq!(
            tester.hit_test(&scene, Vec2::new(200.0, 300.0), 1.0),
            HitResult::None
        );
    }

    #[test]
    fn topmost_node_wins_in_overlap() {
        let mut scene = Scene::new();
        let below = scene.add_node("below", Vec2::ZERO, Vec2::new(100.0, 100.0));
        let above = scene.add_node("above", Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0));
        let tester = HitTester::default();

        let overlap = Vec2::new(75.0, 75.0);
        assert_eq!(tester.pick_node(&scene, overlap, None), Some(above));

        // Raising the lower node flips the pick.
        scene.bring_to_front(below);
        assert_eq!(tester.pick_node(&scene, overlap, None), Some(below));
    }

    #[test]
    fn drop_target_skips_dragged_and_non_droppable() {
        let (mut scene, _a, out, b, inp) = rigged_scene();
        let tester = HitTester::default();
        let inp_pos = scene.world_position(inp).unwrap();

        assert_eq!(
            tester.pick_drop_target(&scene, inp_pos, 1.0, Some(out)),
            Some(inp)
        );
        assert_eq!(tester.pick_drop_target(&scene, inp_pos, 1.0, Some(inp)), None);

        // Nodes are not droppable by default; opting one in makes it a
        // target for body hits.
        let body = Vec2::new(350.0, 30.0);
        assert_eq!(tester.pick_drop_target(&scene, body, 1.0, None), None);
        if let Some(element) = scene.get_mut(b) {
            element.capabilities = Capabilities::node().with_droppable(true);
        }
        assert_eq!(tester.pick_drop_target(&scene, body, 1.0, None), Some(b));
    }

    #[test]
    fn zoom_scales_pick_tolerance() {
        let (scene, _a, out, _b, _inp) = rigged_scene();
        let tester = HitTester::default();
        let near = Vec2::new(112.0, 30.0); // 12 world px from the port

        assert_eq!(tester.pick_port(&scene, near, 1.0, None), None);
        // Zoomed out 2x, 12 world px is 6 screen px: inside the radius.
        assert_eq!(tester.pick_port(&scene, near, 0.5, None), Some(out));
    }
}
