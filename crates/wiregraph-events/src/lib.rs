use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use wiregraph_core::ElementId;

/// Where a selection change originated. Hosts use this to avoid feedback
/// loops when they mirror selection into their own panels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionOrigin {
    Pointer,
    Marquee,
    Host,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Host command hooks. The engine publishes these at well-defined points
    // and implements none of their semantics.
    Copy,
    Cut,
    Paste,
    Duplicate,
    Undo,
    Redo,

    // Structure
    /// A drop resolved into a real connection.
    EdgeCreated {
        edge: ElementId,
        output: ElementId,
        input: ElementId,
    },
    EdgeDeleted {
        edge: ElementId,
    },
    /// Deletable selected elements the host should remove.
    DeleteRequested {
        elements: Vec<ElementId>,
    },
    RenameRequested {
        element: ElementId,
    },

    // Geometry
    /// Final position of a node after a completed drag, in world space.
    NodeMoved {
        id: ElementId,
        x: f32,
        y: f32,
    },
    ViewportChanged {
        pan_x: f32,
        pan_y: f32,
        scale_x: f32,
        scale_y: f32,
    },

    // Selection
    SelectionChanged {
        selected: Vec<ElementId>,
        origin: SelectionOrigin,
    },

    // Viewport commands (host -> widget)
    /// Frame selected elements, or everything when nothing is selected.
    FrameContent,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
