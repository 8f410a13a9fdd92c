use serde::{Deserialize, Serialize};

/// Pointer button identifier as delivered by the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn is_none(self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// Keys the engine reacts to directly. Everything else stays in the
/// embedding's keymap glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Delete,
    Copy,
    Cut,
    Paste,
    Duplicate,
    Undo,
    Redo,
    FrameSelection,
    Rename,
}

/// The abstract input stream the engine consumes. Positions are in screen
/// space; the viewport transform maps them into world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    /// The host lost pointer capture (window deactivated, pointer grabbed by
    /// another widget). Treated as a gesture cancel.
    CaptureLost,
}
