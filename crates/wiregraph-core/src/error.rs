use crate::ElementId;
use thiserror::Error;

/// Runtime failures the engine reports to callers. Programming-error class
/// faults (protocol contract violations) panic instead; see the drag/drop
/// protocol documentation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("element {0} is not part of the scene")]
    ElementNotFound(ElementId),
    #[error("element {0} is not a {1}")]
    WrongKind(ElementId, &'static str),
    #[error("ports {0} and {1} cannot be connected")]
    IncompatiblePorts(ElementId, ElementId),
    #[error("edge {0} has no free endpoint for port {1}")]
    NoFreeEndpoint(ElementId, ElementId),
}
