//! The interaction controller: consumes the abstract input stream, resolves
//! drag offers against the scene, and turns protocol transitions into
//! scene mutations and bus events. The draggable entities (node drags,
//! connection drags, the marquee) live here.

use crate::dragdrop::{AcceptedDrag, DragEvent, DragProtocol};
use crate::geometry::{Rect, Vec2};
use crate::grid::{self, snap_to_grid, GridLine, MarqueeShape};
use crate::hit::{HitResult, HitTester};
use crate::pan::AutoPanner;
use crate::ports;
use crate::scene::{EdgeEnd, Scene};
use crate::selection;
use crate::style::Theme;
use crate::viewport::Viewport;
use wiregraph_core::{
    CandidateMode, ElementId, EngineConfig, InputEvent, Key, Modifiers, PointerButton,
};
use wiregraph_events::{Event, EventBus, SelectionOrigin};

/// The canvas itself accepts the marquee gesture. Arena ids start at 1, so
/// the sentinel never collides with a real element.
const CANVAS: ElementId = ElementId(0);

#[derive(Debug, Clone)]
enum DragKind {
    Nodes {
        primary: ElementId,
        /// Dragged members with their start local positions, filled at
        /// begin and held only for the drag's duration. Nested members
        /// whose ancestor is also dragged are filtered out.
        roster: Vec<(ElementId, Vec2)>,
    },
    Connection {
        from_port: ElementId,
        free_end: EdgeEnd,
        /// The candidate edge, created at begin. `None` again once a drop
        /// settled it into a real connection.
        edge: Option<ElementId>,
    },
    Marquee {
        origin: Vec2,
        current: Vec2,
        additive: bool,
    },
}

pub struct EditorController {
    config: EngineConfig,
    theme: Theme,
    scene: Scene,
    viewport: Viewport,
    drag: DragProtocol<DragKind>,
    panner: AutoPanner,
    hit: HitTester,
    events: EventBus,
    /// Press on empty canvas arms a click-clear; it fires only if the
    /// gesture never becomes a marquee.
    pending_click_clear: bool,
}

impl EditorController {
    pub fn new(config: EngineConfig, theme: Theme, events: EventBus) -> Self {
        Self {
            drag: DragProtocol::new(config.drag_threshold),
            panner: AutoPanner::new(&config),
            hit: HitTester::from_config(&config),
            viewport: Viewport::new(&config, events.clone()),
            scene: Scene::new(),
            theme,
            events,
            config,
            pending_click_clear: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The style-resolved notification: the host pushes a freshly resolved
    /// theme and dependent geometry (grid) is invalidated.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.viewport.invalidate_grid();
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Current marquee rect in world space, while a marquee drag is live.
    pub fn marquee_world(&self) -> Option<Rect> {
        if !self.drag.is_dragging() {
            return None;
        }
        match self.drag.payload() {
            DragKind::Marquee {
                origin, current, ..
            } => Some(Rect::from_two_points(*origin, *current)),
            _ => None,
        }
    }

    /// Marquee drawing-contract shape in screen space.
    pub fn marquee_shape(&self) -> Option<MarqueeShape> {
        let rect = self.marquee_world()?;
        let transform = self.viewport.transform();
        Some(grid::marquee_shape(
            transform.world_to_screen(rect.min),
            transform.world_to_screen(rect.max),
            &self.theme,
        ))
    }

    /// Grid drawing-contract geometry for the current transform and rect.
    pub fn grid_lines(&self) -> Vec<GridLine> {
        grid::grid_lines(
            self.viewport.transform(),
            self.viewport.view_rect(),
            &self.theme,
        )
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button: PointerButton::Primary,
                modifiers,
            } => self.on_primary_down(Vec2::new(x, y), modifiers),
            InputEvent::PointerDown { .. } => {}
            InputEvent::PointerMove { x, y, .. } => self.on_pointer_move(Vec2::new(x, y)),
            InputEvent::PointerUp {
                x,
                y,
                button: PointerButton::Primary,
                ..
            } => self.on_primary_up(Vec2::new(x, y)),
            InputEvent::PointerUp { .. } => {}
            InputEvent::KeyDown { key, modifiers } => self.on_key(key, modifiers),
            InputEvent::CaptureLost => {
                let events = self.drag.cancel();
                self.pump(events);
            }
        }
    }

    /// Host command hooks the widget reacts to directly.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::FrameContent => {
                self.viewport.frame_content(&self.scene);
            }
            Event::ZoomIn => {
                self.viewport.zoom_in();
            }
            Event::ZoomOut => {
                self.viewport.zoom_out();
            }
            Event::ZoomReset => {
                self.viewport.zoom_reset();
            }
            _ => {}
        }
    }

    /// One scheduler step: auto-pan while a node drag is near the viewport
    /// edge, then settle edge geometry. The embedding calls this at the
    /// configured tick interval while a drag is active, and once per frame
    /// otherwise.
    pub fn tick(&mut self) {
        if let Some(delta) = self.panner.tick(&mut self.scene, &mut self.viewport) {
            // Mirror the compensation onto the rest of the roster so the
            // whole selection stays put under the cursor.
            if self.drag.is_dragging() {
                if let DragKind::Nodes { primary, roster } = self.drag.payload() {
                    let primary = *primary;
                    let others: Vec<ElementId> = roster
                        .iter()
                        .map(|(id, _)| *id)
                        .filter(|id| *id != primary)
                        .collect();
                    for id in others {
                        self.scene.translate(id, delta);
                    }
                }
            }
        }
        self.scene.flush_geometry();
    }

    fn on_primary_down(&mut self, screen: Vec2, modifiers: Modifiers) {
        let transform = self.viewport.transform();
        let world = transform.screen_to_world(screen);
        let scale = transform.scale.x;
        self.pending_click_clear = false;

        let accepted = match self.hit.hit_test(&self.scene, world, scale) {
            HitResult::Port(port) => {
                let direction = match self.scene.port(port) {
                    Ok(data) => data.direction,
                    Err(_) => return,
                };
                Some(AcceptedDrag {
                    dragged: port,
                    threshold: None,
                    payload: DragKind::Connection {
                        from_port: port,
                        free_end: EdgeEnd::for_direction(direction.opposite()),
                        edge: None,
                    },
                })
            }
            HitResult::Node(node) => {
                self.click_select(node, modifiers);
                let movable = self
                    .scene
                    .get(node)
                    .map(|e| e.capabilities.movable)
                    .unwrap_or(false);
                movable.then(|| AcceptedDrag {
                    dragged: node,
                    threshold: None,
                    payload: DragKind::Nodes {
                        primary: node,
                        roster: Vec::new(),
                    },
                })
            }
            HitResult::Edge(edge) => {
                self.click_select(edge, modifiers);
                None
            }
            HitResult::None => {
                self.pending_click_clear = modifiers.is_none();
                Some(AcceptedDrag {
                    dragged: CANVAS,
                    threshold: None,
                    payload: DragKind::Marquee {
                        origin: world,
                        current: world,
                        additive: modifiers.shift,
                    },
                })
            }
        };

        let events = self.drag.offer(screen, accepted);
        self.pump(events);
    }

    fn on_pointer_move(&mut self, screen: Vec2) {
        let transform = self.viewport.transform();
        let world = transform.screen_to_world(screen);
        let pick = if self.drag.is_dragging() {
            let wants_targets = !matches!(self.drag.payload(), DragKind::Marquee { .. });
            wants_targets
                .then(|| {
                    self.hit.pick_drop_target(
                        &self.scene,
                        world,
                        transform.scale.x,
                        self.drag.dragged(),
                    )
                })
                .flatten()
        } else {
            None
        };
        let events = self.drag.pointer_moved(screen, pick);
        self.pump(events);
    }

    fn on_primary_up(&mut self, screen: Vec2) {
        let was_offered = self.drag.is_offered();
        let events = self.drag.pointer_released(screen);
        self.pump(events);
        // A press on empty canvas that never grew into a marquee is a
        // click: exclusive mode clears the selection.
        if was_offered && self.pending_click_clear {
            if !selection::clear(&mut self.scene).is_empty() {
                self.publish_selection(SelectionOrigin::Pointer);
            }
        }
        self.pending_click_clear = false;
    }

    fn on_key(&mut self, key: Key, _modifiers: Modifiers) {
        match key {
            Key::Escape => {
                let events = self.drag.cancel();
                self.pump(events);
            }
            Key::Delete => {
                let doomed: Vec<ElementId> = selection::selected(&self.scene)
                    .into_iter()
                    .filter(|id| {
                        self.scene
                            .get(*id)
                            .map(|e| e.capabilities.deletable)
                            .unwrap_or(false)
                    })
                    .collect();
                if !doomed.is_empty() {
                    self.events.publish(Event::DeleteRequested { elements: doomed });
                }
            }
            Key::Copy => self.events.publish(Event::Copy),
            Key::Cut => self.events.publish(Event::Cut),
            Key::Paste => self.events.publish(Event::Paste),
            Key::Duplicate => self.events.publish(Event::Duplicate),
            Key::Undo => self.events.publish(Event::Undo),
            Key::Redo => self.events.publish(Event::Redo),
            Key::FrameSelection => {
                self.viewport.frame_content(&self.scene);
            }
            Key::Rename => {
                // One renamable element selected: ask the host to open its
                // rename affordance.
                let selected = selection::selected(&self.scene);
                if let [element] = selected.as_slice() {
                    let renamable = self
                        .scene
                        .get(*element)
                        .map(|e| e.capabilities.renamable)
                        .unwrap_or(false);
                    if renamable {
                        self.events
                            .publish(Event::RenameRequested { element: *element });
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Drag transitions
    // ------------------------------------------------------------------

    fn pump(&mut self, queue: Vec<DragEvent<DragKind>>) {
        let mut queue: std::collections::VecDeque<_> = queue.into();
        // A Dropped notification always precedes the Ended that carries the
        // gesture payload out of the protocol; hold the target until then.
        let mut pending_drop = None;
        while let Some(event) = queue.pop_front() {
            match event {
                DragEvent::Begun { position, .. } => {
                    if let Some(cancel) = self.on_begun(position) {
                        queue.extend(cancel);
                    }
                }
                DragEvent::Moved {
                    position, delta, ..
                } => self.on_moved(position, delta),
                DragEvent::DropEntered { target } => self.on_drop_entered(target),
                DragEvent::DropExited { .. } => {}
                DragEvent::Dropped { target, .. } => pending_drop = Some(target),
                DragEvent::Ended { payload, .. } => {
                    self.on_ended(payload, pending_drop.take());
                }
                DragEvent::Cancelled { payload, .. } => self.on_cancelled(payload),
            }
        }
    }

    /// Returns cancellation events when the gesture must not proceed.
    fn on_begun(&mut self, position: Vec2) -> Option<Vec<DragEvent<DragKind>>> {
        let kind = self.drag.payload().clone();
        match kind {
            DragKind::Nodes { primary, .. } => {
                let movable = self
                    .scene
                    .get(primary)
                    .map(|e| e.capabilities.movable)
                    .unwrap_or(false);
                if !movable {
                    tracing::debug!(id = primary.0, "drag target gone or immovable; cancelling");
                    return Some(self.drag.cancel());
                }
                let mut members: Vec<ElementId> = selection::selected_nodes(&self.scene)
                    .into_iter()
                    .filter(|id| {
                        self.scene
                            .get(*id)
                            .map(|e| e.capabilities.movable)
                            .unwrap_or(false)
                    })
                    .collect();
                if !members.contains(&primary) {
                    members.push(primary);
                }
                // Drop members nested inside another member; the ancestor's
                // translation already carries them.
                let member_set: std::collections::HashSet<ElementId> =
                    members.iter().copied().collect();
                members.retain(|id| {
                    !self
                        .scene
                        .ancestors(*id)
                        .iter()
                        .any(|a| member_set.contains(a))
                });
                let roster: Vec<(ElementId, Vec2)> = members
                    .into_iter()
                    .filter_map(|id| self.scene.get(id).map(|e| (id, e.position)))
                    .collect();
                self.panner.track(primary);
                if let DragKind::Nodes { roster: slot, .. } = self.drag.payload_mut() {
                    *slot = roster;
                }
                None
            }
            DragKind::Connection {
                from_port,
                free_end,
                ..
            } => {
                if !self.scene.contains(from_port) {
                    tracing::debug!(id = from_port.0, "source port left the scene; cancelling");
                    return Some(self.drag.cancel());
                }
                let edge = self.scene.add_edge();
                if let Ok(data) = self.scene.edge_mut(edge) {
                    data.ghost = true;
                }
                if ports::connect(&mut self.scene, edge, from_port).is_err() {
                    let _ = self.scene.remove(edge);
                    return Some(self.drag.cancel());
                }
                let world = self.viewport.transform().screen_to_world(position);
                self.scene.set_endpoint_override(edge, free_end, world);
                ports::illuminate_candidates(&mut self.scene, from_port, CandidateMode::Ignore);
                if let DragKind::Connection { edge: slot, .. } = self.drag.payload_mut() {
                    *slot = Some(edge);
                }
                None
            }
            DragKind::Marquee { .. } => {
                // The displacement between press and begin belongs to the
                // rubber band.
                let world = self.viewport.transform().screen_to_world(position);
                if let DragKind::Marquee { current, .. } = self.drag.payload_mut() {
                    *current = world;
                }
                None
            }
        }
    }

    fn on_moved(&mut self, position: Vec2, delta: Vec2) {
        let transform = self.viewport.transform();
        let kind = self.drag.payload().clone();
        match kind {
            DragKind::Nodes { roster, .. } => {
                let world_delta = Vec2::new(delta.x / transform.scale.x, delta.y / transform.scale.y);
                for (id, _) in roster {
                    self.scene.translate(id, world_delta);
                }
            }
            DragKind::Connection {
                edge: Some(edge),
                free_end,
                ..
            } => {
                let world = transform.screen_to_world(position);
                self.scene.set_endpoint_override(edge, free_end, world);
            }
            DragKind::Connection { edge: None, .. } => {}
            DragKind::Marquee { .. } => {
                let world = transform.screen_to_world(position);
                if let DragKind::Marquee { current, .. } = self.drag.payload_mut() {
                    *current = world;
                }
            }
        }
    }

    fn on_drop_entered(&mut self, target: ElementId) {
        // Advisory. Connection drags already illuminate compatible ports;
        // entering one is just a breadcrumb for now.
        tracing::debug!(target = target.0, "drop target entered");
    }

    fn on_ended(&mut self, payload: DragKind, drop_target: Option<ElementId>) {
        match payload {
            DragKind::Nodes { roster, .. } => {
                // Successful end commits the auto-pan displacement.
                let _ = self.panner.untrack();
                // Dropping onto a droppable container re-parents the
                // dragged roots into it first.
                if let Some(target) = drop_target {
                    let droppable_node = self
                        .scene
                        .get(target)
                        .map(|e| e.is_node() && e.capabilities.droppable)
                        .unwrap_or(false);
                    if droppable_node {
                        for (id, _) in &roster {
                            if *id != target
                                && self.scene.set_parent(*id, Some(target)).is_err()
                            {
                                tracing::debug!(id = id.0, "re-parent on drop failed");
                            }
                        }
                    }
                }
                for (id, _) in &roster {
                    if let Some(world) = self.scene.world_position(*id) {
                        let snappable = self
                            .scene
                            .get(*id)
                            .map(|e| e.capabilities.snappable)
                            .unwrap_or(false);
                        let final_world = if snappable {
                            let snapped = snap_to_grid(world, self.theme.grid_spacing);
                            self.scene.translate(*id, snapped - world);
                            snapped
                        } else {
                            world
                        };
                        self.events.publish(Event::NodeMoved {
                            id: *id,
                            x: final_world.x,
                            y: final_world.y,
                        });
                    }
                }
            }
            DragKind::Connection {
                from_port,
                edge: Some(edge),
                ..
            } => {
                if let Some(target) = drop_target {
                    if self.settle_connection(from_port, edge, target) {
                        ports::clear_highlights(&mut self.scene);
                        return;
                    }
                }
                // No settle happened: the candidate dissolves.
                let _ = self.scene.remove(edge);
                ports::clear_highlights(&mut self.scene);
            }
            DragKind::Connection { edge: None, .. } => {
                ports::clear_highlights(&mut self.scene);
            }
            DragKind::Marquee {
                origin,
                current,
                additive,
            } => {
                self.apply_marquee(Rect::from_two_points(origin, current), additive);
            }
        }
    }

    /// Turns the candidate into a real connection when the drop target is a
    /// compatible port. Returns whether it settled.
    fn settle_connection(
        &mut self,
        from_port: ElementId,
        edge: ElementId,
        target: ElementId,
    ) -> bool {
        let compatible = self
            .scene
            .get(target)
            .map(|e| e.is_port())
            .unwrap_or(false)
            && ports::can_connect(&self.scene, from_port, target, CandidateMode::Strict);
        if !compatible {
            return false;
        }
        self.scene.clear_endpoint_overrides(edge);
        if let Ok(data) = self.scene.edge_mut(edge) {
            data.ghost = false;
        }
        if ports::connect(&mut self.scene, edge, target).is_err() {
            return false;
        }
        if let Ok(data) = self.scene.edge(edge) {
            if let (Some(output), Some(input)) = (data.output, data.input) {
                self.events.publish(Event::EdgeCreated {
                    edge,
                    output,
                    input,
                });
            }
        }
        true
    }

    fn on_cancelled(&mut self, payload: DragKind) {
        match payload {
            DragKind::Nodes { roster, .. } => {
                // Roll the viewport back by the accumulated auto-pan and
                // restore start positions.
                let accumulated = self.panner.untrack();
                if accumulated != Vec2::ZERO {
                    self.viewport.translate(accumulated);
                }
                for (id, start) in roster {
                    self.scene.set_position(id, start);
                }
            }
            DragKind::Connection { edge, .. } => {
                if let Some(edge) = edge {
                    let _ = self.scene.remove(edge);
                }
                ports::clear_highlights(&mut self.scene);
            }
            DragKind::Marquee { .. } => {}
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn click_select(&mut self, id: ElementId, modifiers: Modifiers) {
        let changed = if modifiers.shift || modifiers.ctrl {
            selection::toggle(&mut self.scene, id)
        } else if !selection::is_selected(&self.scene, id) {
            let cleared = !selection::clear(&mut self.scene).is_empty();
            selection::select(&mut self.scene, id) || cleared
        } else {
            false
        };
        if changed {
            self.publish_selection(SelectionOrigin::Pointer);
        }
    }

    fn apply_marquee(&mut self, rect: Rect, additive: bool) {
        let inside: Vec<ElementId> = selection::nodes(&self.scene)
            .into_iter()
            .filter(|id| {
                self.scene
                    .world_rect(*id)
                    .map(|r| rect.contains_rect(r))
                    .unwrap_or(false)
            })
            .collect();

        let mut changed = false;
        if !additive {
            for id in selection::selected(&self.scene) {
                if !inside.contains(&id) {
                    changed |= selection::deselect(&mut self.scene, id);
                }
            }
        }
        for id in &inside {
            changed |= selection::select(&mut self.scene, *id);
        }
        if changed {
            self.publish_selection(SelectionOrigin::Marquee);
        }
    }

    fn publish_selection(&mut self, origin: SelectionOrigin) {
        self.events.publish(Event::SelectionChanged {
            selected: selection::selected(&self.scene),
            origin,
        });
    }
}
