use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod capability;
pub mod config;
pub mod error;
pub mod input;

pub use capability::Capabilities;
pub use config::EngineConfig;
pub use error::GraphError;
pub use input::{InputEvent, Key, Modifiers, PointerButton};

/// Stable handle into the scene arena. Handles are never reused within the
/// lifetime of a scene, so a dangling `ElementId` is detectable rather than
/// silently aliasing a newer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn opposite(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PortOrientation {
    Horizontal,
    Vertical,
}

/// How many non-candidate connections a port accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum PortCapacity {
    Single,
    Multi,
}

/// Whether candidate (mouse-following) edges count as connections when
/// checking port compatibility. The interactive connect path ignores them;
/// drop validation checks strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CandidateMode {
    #[default]
    Ignore,
    Strict,
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone)]
pub enum EnumConversionError {
    #[error("Invalid PortDirection value: {0}")]
    InvalidPortDirection(i32),
    #[error("Invalid PortOrientation value: {0}")]
    InvalidPortOrientation(i32),
    #[error("Invalid PortCapacity value: {0}")]
    InvalidPortCapacity(i32),
}

impl TryFrom<i32> for PortDirection {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PortDirection::Input),
            1 => Ok(PortDirection::Output),
            _ => Err(EnumConversionError::InvalidPortDirection(value)),
        }
    }
}

impl TryFrom<i32> for PortOrientation {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PortOrientation::Horizontal),
            1 => Ok(PortOrientation::Vertical),
            _ => Err(EnumConversionError::InvalidPortOrientation(value)),
        }
    }
}

impl TryFrom<i32> for PortCapacity {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PortCapacity::Single),
            1 => Ok(PortCapacity::Multi),
            _ => Err(EnumConversionError::InvalidPortCapacity(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_opposite_roundtrip() {
        assert_eq!(PortDirection::Input.opposite(), PortDirection::Output);
        assert_eq!(
            PortDirection::Output.opposite().opposite(),
            PortDirection::Output
        );
    }

    #[test]
    fn enum_conversion_rejects_out_of_range() {
        assert!(PortDirection::try_from(2).is_err());
        assert!(PortCapacity::try_from(-1).is_err());
        assert_eq!(PortCapacity::try_from(1).unwrap(), PortCapacity::Multi);
    }

    #[test]
    fn element_id_serde_roundtrip() {
        let id = ElementId(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: ElementId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
