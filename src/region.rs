//! Graph element records exchanged with the host editor

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Padding, Rect};

/// Identity of a graph node. Comment regions live in the same id space.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of plain node the host reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Node,
    /// Reroute point on a wire; can be excluded from membership
    Knot,
}

impl NodeKind {
    pub fn is_knot(&self) -> bool {
        matches!(self, NodeKind::Knot)
    }
}

/// A plain (non-region) graph node as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    pub id: NodeId,
    pub rect: Rect,
    pub kind: NodeKind,
}

impl NodeRect {
    pub fn new(id: NodeId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            kind: NodeKind::Node,
        }
    }

    pub fn knot(id: NodeId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            kind: NodeKind::Knot,
        }
    }
}

/// Whether a region follows its members or keeps a user-set rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    #[default]
    Auto,
    Manual,
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeMode::Auto => write!(f, "auto"),
            SizeMode::Manual => write!(f, "manual"),
        }
    }
}

/// Margin around a region's members plus the title strip reserved on top
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionPadding {
    pub margin: Padding,
    /// Height of the title bar. Not part of the content rectangle.
    pub header: f64,
}

impl RegionPadding {
    pub fn new(margin: Padding, header: f64) -> Self {
        Self { margin, header }
    }

    /// Same margin on all sides, no title strip
    pub fn uniform(amount: f64) -> Self {
        Self::new(Padding::uniform(amount), 0.0)
    }

    /// Total inflation applied around the union of the members
    pub fn outer(&self) -> Padding {
        Padding {
            top: self.margin.top + self.header,
            ..self.margin
        }
    }

    /// The rectangle inside `rect` that members must fall into
    pub fn content_rect(&self, rect: &Rect) -> Rect {
        Rect::new(rect.x, rect.y + self.header, rect.width, rect.height - self.header)
    }
}

/// Persistent description of a comment region, owned by the host
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub id: NodeId,
    pub rect: Rect,
    pub mode: SizeMode,
    pub padding: RegionPadding,
    /// Opaque handle to externally-owned style data
    pub color_preset: Option<String>,
    /// Creation order; lower is older
    pub created: u64,
    /// Title-only region: owns no members and never auto-sizes
    pub header: bool,
}

impl RegionRecord {
    pub fn new(id: NodeId, rect: Rect, padding: RegionPadding, created: u64) -> Self {
        Self {
            id,
            rect,
            mode: SizeMode::Auto,
            padding,
            color_preset: None,
            created,
            header: false,
        }
    }

    pub fn with_mode(mut self, mode: SizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_color_preset(mut self, preset: impl Into<String>) -> Self {
        self.color_preset = Some(preset.into());
        self
    }

    pub fn as_header(mut self) -> Self {
        self.header = true;
        self
    }

    pub fn content_rect(&self) -> Rect {
        self.padding.content_rect(&self.rect)
    }
}

/// A region that has not been handed to the host yet
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDraft {
    pub rect: Rect,
    pub mode: SizeMode,
    pub padding: RegionPadding,
    pub color_preset: Option<String>,
    pub created: u64,
}
