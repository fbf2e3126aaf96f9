//! Error and diagnostic types for the region engine

use std::fmt;

use thiserror::Error;

use crate::region::NodeId;

/// Errors returned by engine commands. The command that fails leaves the
/// graph untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegionError {
    /// The id is no longer present in the host graph
    #[error("no node or region with id {0}")]
    StaleReference(NodeId),

    /// The id names a plain node where a region was required
    #[error("{0} is not a comment region")]
    NotARegion(NodeId),

    /// A region cannot be created around nothing
    #[error("cannot create a region from an empty selection")]
    EmptySelection,

    /// A gesture tick arrived with no gesture in progress
    #[error("no drag or resize gesture is in progress")]
    NoActiveGesture,
}

impl RegionError {
    /// The id involved in the failure, if any
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Self::StaleReference(id) | Self::NotARegion(id) => Some(*id),
            _ => None,
        }
    }
}

/// Conditions the engine corrects on its own. They are logged and kept for
/// inspection but never fail a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A region had zero or negative area and was resized to the minimum
    DegenerateGeometry { region: NodeId },

    /// Two regions enclosed each other; the older one was kept as outer
    CycleDetected { outer: NodeId, inner: NodeId },

    /// A command or gesture referred to an id the host no longer has
    StaleReference { id: NodeId },

    /// Change notifications arrived while a pass was running and were
    /// deferred to the next tick
    ReentrantResolution { deferred: u32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateGeometry { region } => {
                write!(f, "degenerate geometry on region {}", region)
            }
            Diagnostic::CycleDetected { outer, inner } => {
                write!(f, "containment tie: {} kept outside {}", outer, inner)
            }
            Diagnostic::StaleReference { id } => write!(f, "stale reference to {}", id),
            Diagnostic::ReentrantResolution { deferred } => {
                write!(f, "{} change notification(s) deferred to next tick", deferred)
            }
        }
    }
}
