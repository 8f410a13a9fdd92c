//! The embeddable egui widget. Translates egui input into the engine's
//! abstract input stream, runs the pan scheduler off the repaint clock, and
//! paints through the drawing module. All editor semantics live in the
//! engine; this file is glue.

use crate::{draw, keymap};
use eframe::egui;
use std::time::{Duration, Instant};
use wiregraph_core::{EngineConfig, InputEvent, PointerButton};
use wiregraph_events::{Event, EventBus};
use wiregraph_graph::geometry::{Rect as WorldRect, Vec2 as WorldVec};
use wiregraph_graph::interaction::EditorController;
use wiregraph_graph::viewport::ViewState;
use wiregraph_graph::{GridLine, Theme};

const MAX_TICKS_PER_FRAME: u32 = 10;

pub struct GraphEditorView {
    controller: EditorController,
    tick_interval: Duration,
    last_tick: Instant,
    last_pointer: Option<egui::Pos2>,
    cached_grid: Vec<GridLine>,
    pending_frame_content: bool,
    pending_zoom_steps: i32,
    pending_zoom_reset: bool,
}

impl GraphEditorView {
    pub fn new(config: EngineConfig, theme: Theme, event_bus: EventBus) -> Self {
        let tick_interval = Duration::from_millis(config.pan_tick_ms.max(1));
        Self {
            controller: EditorController::new(config, theme, event_bus),
            tick_interval,
            last_tick: Instant::now(),
            last_pointer: None,
            cached_grid: Vec::new(),
            pending_frame_content: false,
            pending_zoom_steps: 0,
            pending_zoom_reset: false,
        }
    }

    pub fn controller(&self) -> &EditorController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EditorController {
        &mut self.controller
    }

    pub fn view_state(&self) -> ViewState {
        self.controller.viewport().view_state()
    }

    /// Restores a persisted pan/zoom snapshot. Ignored while a drag is
    /// live; the gesture owns the transform until it resolves.
    pub fn apply_view_state(&mut self, state: ViewState) {
        if !self.controller.is_dragging() {
            self.controller.viewport_mut().apply_view_state(state);
        }
    }

    /// Host commands arriving on the bus; viewport operations are deferred
    /// to the next `show` so they use the final widget rect.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::FrameContent => self.pending_frame_content = true,
            Event::ZoomIn => self.pending_zoom_steps += 1,
            Event::ZoomOut => self.pending_zoom_steps -= 1,
            Event::ZoomReset => self.pending_zoom_reset = true,
            _ => {}
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        self.controller
            .viewport_mut()
            .set_view_rect(world_rect(rect));

        self.apply_pending_ops();

        // Pinch/ctrl-wheel zoom about the pointer, wheel scroll pans.
        let (zoom_delta, scroll_delta, hover_pos) = ui.input(|i| {
            (
                i.zoom_delta(),
                i.raw_scroll_delta,
                i.pointer.hover_pos(),
            )
        });
        if response.hovered() && (zoom_delta - 1.0).abs() > f32::EPSILON {
            let pivot = hover_pos
                .map(|p| WorldVec::new(p.x, p.y))
                .unwrap_or_else(|| world_rect(rect).center());
            self.controller.viewport_mut().zoom_by(zoom_delta, pivot);
        }
        if response.hovered() && scroll_delta != egui::Vec2::ZERO {
            self.controller
                .viewport_mut()
                .translate(WorldVec::new(scroll_delta.x, scroll_delta.y));
        }

        for event in self.collect_input(ui, rect, response.hovered()) {
            self.controller.handle_input(event);
        }

        self.run_ticks(ui.ctx());

        if self.controller.viewport_mut().take_grid_dirty() {
            self.cached_grid = self.controller.grid_lines();
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, draw::color32(self.controller.theme().background));
        draw::draw_grid(&painter, &self.cached_grid);
        draw::draw_scene(&painter, &self.controller);
    }

    fn apply_pending_ops(&mut self) {
        if std::mem::take(&mut self.pending_frame_content) {
            self.controller.handle_event(&Event::FrameContent);
        }
        if std::mem::take(&mut self.pending_zoom_reset) {
            self.controller.handle_event(&Event::ZoomReset);
        }
        let steps = std::mem::take(&mut self.pending_zoom_steps);
        for _ in 0..steps.abs() {
            let event = if steps > 0 {
                Event::ZoomIn
            } else {
                Event::ZoomOut
            };
            self.controller.handle_event(&event);
        }
    }

    fn collect_input(
        &mut self,
        ui: &egui::Ui,
        rect: egui::Rect,
        hovered: bool,
    ) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let dragging = self.controller.is_dragging();
        ui.input(|i| {
            let mods = keymap::modifiers(&i.modifiers);
            let pos = i.pointer.latest_pos();

            if i.pointer.primary_pressed() {
                if let Some(p) = pos.filter(|p| rect.contains(*p)) {
                    out.push(InputEvent::PointerDown {
                        x: p.x,
                        y: p.y,
                        button: PointerButton::Primary,
                        modifiers: mods,
                    });
                }
            }
            if let Some(p) = pos {
                if self.last_pointer != Some(p) {
                    out.push(InputEvent::PointerMove {
                        x: p.x,
                        y: p.y,
                        modifiers: mods,
                    });
                    self.last_pointer = Some(p);
                }
            }
            if i.pointer.primary_released() {
                if let Some(p) = pos.or(self.last_pointer) {
                    out.push(InputEvent::PointerUp {
                        x: p.x,
                        y: p.y,
                        button: PointerButton::Primary,
                        modifiers: mods,
                    });
                }
            }
            if dragging && !i.pointer.has_pointer() {
                out.push(InputEvent::CaptureLost);
            }

            if hovered || dragging {
                for event in &i.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                    {
                        if let Some(resolved) = keymap::resolve(*key, modifiers) {
                            out.push(InputEvent::KeyDown {
                                key: resolved,
                                modifiers: keymap::modifiers(modifiers),
                            });
                        }
                    }
                }
            }
        });
        out
    }

    /// Pan scheduler clock. While a drag is live the engine ticks at the
    /// configured interval and the widget keeps repaints coming; otherwise
    /// geometry settles once per frame.
    fn run_ticks(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.controller.is_dragging() {
            let mut ran = 0;
            while now.duration_since(self.last_tick) >= self.tick_interval
                && ran < MAX_TICKS_PER_FRAME
            {
                self.controller.tick();
                self.last_tick += self.tick_interval;
                ran += 1;
            }
            if ran == MAX_TICKS_PER_FRAME {
                self.last_tick = now;
            }
            ctx.request_repaint_after(self.tick_interval);
        } else {
            self.last_tick = now;
            self.controller.tick();
        }
    }
}

fn world_rect(rect: egui::Rect) -> WorldRect {
    WorldRect::from_min_max(
        WorldVec::new(rect.min.x, rect.min.y),
        WorldVec::new(rect.max.x, rect.max.y),
    )
}
