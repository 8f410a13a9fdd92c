use serde::{Deserialize, Serialize};

/// What a scene element is allowed to participate in. Replaces the deep
/// override hierarchy of classic widget trees with a plain flag set checked
/// at the interaction seams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub selectable: bool,
    pub movable: bool,
    pub deletable: bool,
    /// Raised to the top of its layer bucket when selected.
    pub ascendable: bool,
    /// May receive drop-enter/exit/drop notifications as a drop target.
    pub droppable: bool,
    /// Position quantized to the grid spacing at drag end.
    pub snappable: bool,
    pub copiable: bool,
    pub renamable: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::none()
    }
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            selectable: false,
            movable: false,
            deletable: false,
            ascendable: false,
            droppable: false,
            snappable: false,
            copiable: false,
            renamable: false,
        }
    }

    /// Default flag set for a node: full interactive participation.
    pub const fn node() -> Self {
        Self {
            selectable: true,
            movable: true,
            deletable: true,
            ascendable: true,
            droppable: false,
            snappable: true,
            copiable: true,
            renamable: true,
        }
    }

    /// Ports are drag sources and drop targets but are never moved or
    /// selected on their own.
    pub const fn port() -> Self {
        Self {
            selectable: false,
            movable: false,
            deletable: false,
            ascendable: false,
            droppable: true,
            snappable: false,
            copiable: false,
            renamable: false,
        }
    }

    pub const fn edge() -> Self {
        Self {
            selectable: true,
            movable: false,
            deletable: true,
            ascendable: false,
            droppable: false,
            snappable: false,
            copiable: false,
            renamable: false,
        }
    }

    pub fn with_selectable(mut self, value: bool) -> Self {
        self.selectable = value;
        self
    }

    pub fn with_movable(mut self, value: bool) -> Self {
        self.movable = value;
        self
    }

    pub fn with_droppable(mut self, value: bool) -> Self {
        self.droppable = value;
        self
    }

    pub fn with_snappable(mut self, value: bool) -> Self {
        self.snappable = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_presets() {
        let caps = Capabilities::node().with_movable(false);
        assert!(caps.selectable);
        assert!(!caps.movable);

        let caps = Capabilities::none().with_droppable(true);
        assert!(caps.droppable);
        assert!(!caps.selectable);
    }
}
