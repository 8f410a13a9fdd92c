use serde::{Deserialize, Serialize};

/// Tunables for the interaction engine. Passed at construction; there are no
/// module-level defaults to mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Distance in screen pixels the pointer must travel before an offered
    /// drag becomes real. Acceptors may override per gesture.
    pub drag_threshold: f32,
    /// Minimum uniform scale the viewport clamps to.
    pub min_scale: f32,
    /// Maximum uniform scale the viewport clamps to.
    pub max_scale: f32,
    /// Width of the auto-pan activation band along each viewport edge, in
    /// screen pixels.
    pub pan_border: f32,
    /// Pan speed cap in screen pixels per tick.
    pub pan_max_speed: f32,
    /// Nominal auto-pan tick interval in milliseconds. The engine itself is
    /// tick-driven; this is what the embedding schedules repaints at.
    pub pan_tick_ms: u64,
    /// Border in screen pixels kept around framed content by zoom-to-fit.
    pub frame_border: f32,
    /// Distance tolerance in screen pixels for picking an edge curve.
    pub edge_pick_tolerance: f32,
    /// Samples per edge curve used for distance testing.
    pub edge_pick_samples: usize,
    /// Multiplier applied per zoom step.
    pub zoom_step: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            min_scale: 0.1,
            max_scale: 4.0,
            pan_border: 50.0,
            pan_max_speed: 20.0,
            pan_tick_ms: 10,
            frame_border: 40.0,
            edge_pick_tolerance: 8.0,
            edge_pick_samples: 48,
            zoom_step: 1.2,
        }
    }
}
