//! Auto-pan while dragging. A tick-driven task that nudges the viewport
//! when the tracked element nears the visible edge and applies the
//! compensating local-space delta to the element itself, so its screen
//! position stays put under the cursor while the world scrolls beneath it.
//! Runs only while a drag has registered a tracked element.

use crate::geometry::{pan_speed, Vec2};
use crate::scene::Scene;
use crate::viewport::Viewport;
use wiregraph_core::{ElementId, EngineConfig};

#[derive(Debug)]
pub struct AutoPanner {
    border: f32,
    max_speed: f32,
    tracked: Option<ElementId>,
    accumulated: Vec2,
}

impl AutoPanner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            border: config.pan_border,
            max_speed: config.pan_max_speed,
            tracked: None,
            accumulated: Vec2::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.tracked.is_some()
    }

    pub fn tracked(&self) -> Option<ElementId> {
        self.tracked
    }

    /// Registers the element the scheduler follows. Resets accumulation;
    /// the previous registration, if any, is discarded.
    pub fn track(&mut self, id: ElementId) {
        self.tracked = Some(id);
        self.accumulated = Vec2::ZERO;
    }

    /// Stops panning and returns the total pan displacement applied while
    /// tracking. Callers re-apply it to the viewport to roll back (cancel)
    /// or keep the viewport where it is (successful drop).
    pub fn untrack(&mut self) -> Vec2 {
        self.tracked = None;
        std::mem::take(&mut self.accumulated)
    }

    /// One scheduler step. Returns the local-space delta applied to the
    /// tracked element so the caller can mirror it onto the rest of a
    /// multi-element drag. `None` when idle, outside the pan band, or when
    /// the tracked element went stale.
    pub fn tick(&mut self, scene: &mut Scene, viewport: &mut Viewport) -> Option<Vec2> {
        let id = self.tracked?;
        let Some(rect) = scene.world_rect(id) else {
            // Element removed mid-gesture: stop quietly.
            tracing::debug!(id = id.0, "auto-pan target left the scene; untracking");
            self.tracked = None;
            self.accumulated = Vec2::ZERO;
            return None;
        };
        let transform = viewport.transform();
        let center_screen = transform.world_to_screen(rect.center());
        let speed = pan_speed(center_screen, viewport.view_rect(), self.border, self.max_speed);
        if speed == Vec2::ZERO {
            return None;
        }

        self.accumulated += speed;
        // Content scrolls toward the cursor.
        viewport.translate(-speed);
        let local_delta = Vec2::new(speed.x / transform.scale.x, speed.y / transform.scale.y);
        scene.translate(id, local_delta);
        Some(local_delta)
    }
}
