//! The viewport/framing controller: owns the pan/zoom transform, clamps
//! scale on every mutation, rejects non-finite updates wholesale, and
//! computes fit-to-view framing over the scene.

use crate::geometry::{fit_transform, Rect, Vec2, ViewTransform};
use crate::scene::Scene;
use crate::selection;
use serde::{Deserialize, Serialize};
use wiregraph_core::{ElementId, EngineConfig};
use wiregraph_events::{Event, EventBus};

/// Serializable pan/zoom snapshot for host-side persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

pub struct Viewport {
    transform: ViewTransform,
    view_rect: Rect,
    min_scale: f32,
    max_scale: f32,
    frame_border: f32,
    zoom_step: f32,
    grid_dirty: bool,
    events: EventBus,
}

impl Viewport {
    pub fn new(config: &EngineConfig, events: EventBus) -> Self {
        Self {
            transform: ViewTransform::default(),
            view_rect: Rect::default(),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            frame_border: config.frame_border,
            zoom_step: config.zoom_step,
            grid_dirty: true,
            events,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn view_rect(&self) -> Rect {
        self.view_rect
    }

    /// Screen-space rect the widget occupies. Grid geometry depends on it.
    pub fn set_view_rect(&mut self, rect: Rect) {
        if self.view_rect != rect {
            self.view_rect = rect;
            self.grid_dirty = true;
        }
    }

    /// Commits a new transform. Non-finite updates are rejected wholesale:
    /// no partial write, previous transform retained. Scale is clamped to
    /// the configured range before committing. Returns whether the
    /// transform changed.
    pub fn update_view_transform(&mut self, pan: Vec2, scale: Vec2) -> bool {
        if !pan.is_finite() || !scale.is_finite() {
            tracing::warn!(?pan, ?scale, "rejecting non-finite view transform update");
            return false;
        }
        let clamped = Vec2::new(
            scale.x.clamp(self.min_scale, self.max_scale),
            scale.y.clamp(self.min_scale, self.max_scale),
        );
        let next = ViewTransform::new(pan, clamped);
        if next == self.transform {
            return false;
        }
        self.transform = next;
        self.grid_dirty = true;
        self.events.publish(Event::ViewportChanged {
            pan_x: next.pan.x,
            pan_y: next.pan.y,
            scale_x: next.scale.x,
            scale_y: next.scale.y,
        });
        true
    }

    pub fn translate(&mut self, delta: Vec2) -> bool {
        self.update_view_transform(self.transform.pan + delta, self.transform.scale)
    }

    /// Multiplies the zoom, keeping the world point under `pivot` (screen
    /// space) fixed.
    pub fn zoom_by(&mut self, factor: f32, pivot: Vec2) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!(factor, "rejecting invalid zoom factor");
            return false;
        }
        let current = self.transform.scale.x;
        let next = (current * factor).clamp(self.min_scale, self.max_scale);
        if (next - current).abs() <= f32::EPSILON {
            return false;
        }
        let world_at_pivot = self.transform.screen_to_world(pivot);
        let pan = pivot - world_at_pivot * next;
        self.update_view_transform(pan, Vec2::splat(next))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.zoom_step, self.view_rect.center())
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(1.0 / self.zoom_step, self.view_rect.center())
    }

    /// Back to 100%, keeping the viewport center fixed.
    pub fn zoom_reset(&mut self) -> bool {
        let current = self.transform.scale.x;
        if current == 0.0 {
            return false;
        }
        self.zoom_by(1.0 / current, self.view_rect.center())
    }

    /// Frames the selection if there is one, else everything unselected,
    /// else the empty-content rectangle (origin at default zoom).
    pub fn frame_content(&mut self, scene: &Scene) -> bool {
        let selected = selection::selected(scene);
        let candidates = if selected.is_empty() {
            selection::unselected(scene)
        } else {
            selected
        };
        let bounds = content_bounds(scene, &candidates).unwrap_or_default();
        let fitted = fit_transform(
            bounds,
            self.view_rect,
            self.frame_border,
            self.min_scale,
            self.max_scale,
        );
        self.update_view_transform(fitted.pan, fitted.scale)
    }

    /// True once per grid invalidation; the embedding recomputes grid
    /// geometry when it sees it.
    pub fn take_grid_dirty(&mut self) -> bool {
        std::mem::take(&mut self.grid_dirty)
    }

    pub fn invalidate_grid(&mut self) {
        self.grid_dirty = true;
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            pan: self.transform.pan,
            zoom: self.transform.scale.x,
        }
    }

    pub fn apply_view_state(&mut self, state: ViewState) -> bool {
        self.update_view_transform(state.pan, Vec2::splat(state.zoom))
    }
}

/// Union of the world rects of `ids` plus settled edge endpoints. `None`
/// when nothing contributes geometry.
pub fn content_bounds(scene: &Scene, ids: &[ElementId]) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    let mut merge = |rect: Rect| {
        bounds = Some(match bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    };
    for id in ids {
        if let Some(rect) = scene.world_rect(*id) {
            merge(rect);
        } else if let Ok(edge) = scene.edge(*id) {
            if edge.is_real() {
                merge(Rect::from_two_points(
                    edge.endpoint(crate::scene::EdgeEnd::Output),
                    edge.endpoint(crate::scene::EdgeEnd::Input),
                ));
            }
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(&EngineConfig::default(), EventBus::new());
        vp.set_view_rect(Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0)));
        vp
    }

    #[test]
    fn rejects_nan_and_infinity_wholesale() {
        let mut vp = viewport();
        vp.update_view_transform(Vec2::new(10.0, 10.0), Vec2::splat(2.0));
        let before = vp.transform();

        assert!(!vp.update_view_transform(Vec2::new(f32::NAN, 0.0), Vec2::splat(1.0)));
        assert!(!vp.update_view_transform(Vec2::ZERO, Vec2::new(1.0, f32::INFINITY)));
        assert!(!vp.update_view_transform(
            Vec2::new(0.0, f32::NEG_INFINITY),
            Vec2::new(f32::NAN, 1.0)
        ));
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn scale_clamped_on_every_mutation() {
        let mut vp = viewport();
        vp.update_view_transform(Vec2::ZERO, Vec2::splat(99.0));
        assert_eq!(vp.transform().scale, Vec2::splat(4.0));
        vp.update_view_transform(Vec2::ZERO, Vec2::splat(0.0001));
        assert_eq!(vp.transform().scale, Vec2::splat(0.1));
    }

    #[test]
    fn zoom_by_keeps_pivot_fixed() {
        let mut vp = viewport();
        let pivot = Vec2::new(200.0, 150.0);
        let world_before = vp.transform().screen_to_world(pivot);
        vp.zoom_by(1.5, pivot);
        let world_after = vp.transform().screen_to_world(pivot);
        assert!(world_before.distance(world_after) < 1e-3);
    }

    #[test]
    fn frame_prefers_selection() {
        let mut vp = viewport();
        let mut scene = Scene::new();
        let a = scene.add_node("a", Vec2::ZERO, Vec2::new(100.0, 100.0));
        let _b = scene.add_node("b", Vec2::new(5000.0, 0.0), Vec2::new(100.0, 100.0));
        crate::selection::select(&mut scene, a);

        vp.frame_content(&scene);
        // Node a's center lands on the view center.
        let mapped = vp
            .transform()
            .world_to_screen(scene.world_rect(a).unwrap().center());
        assert!(mapped.distance(vp.view_rect().center()) < 1e-2);
    }

    #[test]
    fn frame_empty_scene_centers_origin() {
        let mut vp = viewport();
        let scene = Scene::new();
        vp.frame_content(&scene);
        let mapped = vp.transform().world_to_screen(Vec2::ZERO);
        assert!(mapped.distance(vp.view_rect().center()) < 1e-3);
        assert_eq!(vp.transform().scale, Vec2::splat(1.0));
    }

    #[test]
    fn publishes_viewport_changed() {
        let bus = EventBus::new();
        let mut vp = Viewport::new(&EngineConfig::default(), bus.clone());
        vp.set_view_rect(Rect::from_min_max(Vec2::ZERO, Vec2::new(100.0, 100.0)));
        vp.update_view_transform(Vec2::new(3.0, 4.0), Vec2::splat(1.0));

        let rx = bus.receiver();
        match rx.try_recv().unwrap() {
            Event::ViewportChanged { pan_x, pan_y, .. } => {
                assert_eq!((pan_x, pan_y), (3.0, 4.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn view_state_roundtrip() {
        let mut vp = viewport();
        vp.update_view_transform(Vec2::new(-40.0, 12.0), Vec2::splat(2.0));
        let state = vp.view_state();

        let mut other = viewport();
        other.apply_view_state(state);
        assert_eq!(other.transform(), vp.transform());

        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
