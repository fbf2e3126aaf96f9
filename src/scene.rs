//! Scene files: the persisted part of a graph in TOML
//!
//! Only what the host would save is stored. Membership and nesting are
//! derived again after loading.
//!
//! ```toml
//! [[node]]
//! id = 1
//! rect = { x = 0.0, y = 0.0, width = 50.0, height = 50.0 }
//!
//! [[region]]
//! id = 10
//! rect = { x = -30.0, y = -74.0, width = 110.0, height = 170.0 }
//! mode = "auto"
//! color_preset = "note"
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Padding, Rect};
use crate::host::{GraphHost, MemoryGraph};
use crate::region::{NodeId, NodeKind, NodeRect, RegionPadding, RegionRecord, SizeMode};
use crate::settings::Settings;

/// Errors that can occur when loading or saving scenes
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write scene TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("id {0} is used more than once")]
    DuplicateId(NodeId),
}

/// Nodes and regions as stored on disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeRect>,
    pub regions: Vec<RegionRecord>,
}

/// TOML structure for scenes
#[derive(Serialize, Deserialize)]
struct TomlScene {
    #[serde(default, rename = "node", skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<TomlNode>,
    #[serde(default, rename = "region", skip_serializing_if = "Vec::is_empty")]
    regions: Vec<TomlRegion>,
}

#[derive(Serialize, Deserialize)]
struct TomlNode {
    id: NodeId,
    rect: Rect,
    #[serde(default)]
    kind: NodeKind,
}

#[derive(Serialize, Deserialize)]
struct TomlRegion {
    id: NodeId,
    rect: Rect,
    #[serde(default)]
    mode: SizeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    padding: Option<TomlPadding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color_preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<u64>,
    #[serde(default)]
    header: bool,
}

#[derive(Serialize, Deserialize)]
struct TomlPadding {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    #[serde(default)]
    header: f64,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path, settings: &Settings) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, settings)
    }

    /// Load a scene from a TOML string.
    ///
    /// Regions without a `padding` table get the settings' default padding.
    /// Regions without `created` are ordered after the stamped ones, in file
    /// order.
    pub fn from_toml(content: &str, settings: &Settings) -> Result<Self, SceneError> {
        let parsed: TomlScene = toml::from_str(content)?;

        let mut seen = BTreeSet::new();
        let ids = parsed
            .nodes
            .iter()
            .map(|n| n.id)
            .chain(parsed.regions.iter().map(|r| r.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(SceneError::DuplicateId(id));
            }
        }

        let nodes = parsed
            .nodes
            .into_iter()
            .map(|n| NodeRect {
                id: n.id,
                rect: n.rect,
                kind: n.kind,
            })
            .collect();

        let first_free = parsed
            .regions
            .iter()
            .filter_map(|r| r.created)
            .map(|c| c + 1)
            .max()
            .unwrap_or(0);
        let default_padding = settings.default_padding();
        let regions = parsed
            .regions
            .into_iter()
            .enumerate()
            .map(|(index, r)| RegionRecord {
                id: r.id,
                rect: r.rect,
                mode: r.mode,
                padding: r.padding.map_or(default_padding, |p| {
                    RegionPadding::new(Padding::new(p.left, p.top, p.right, p.bottom), p.header)
                }),
                color_preset: r.color_preset,
                created: r.created.unwrap_or(first_free + index as u64),
                header: r.header,
            })
            .collect();

        Ok(Scene { nodes, regions })
    }

    /// Serialize to TOML. Every region is written with its padding and
    /// creation stamp so a reload reproduces it exactly.
    pub fn to_toml(&self) -> Result<String, SceneError> {
        let scene = TomlScene {
            nodes: self
                .nodes
                .iter()
                .map(|n| TomlNode {
                    id: n.id,
                    rect: n.rect,
                    kind: n.kind,
                })
                .collect(),
            regions: self
                .regions
                .iter()
                .map(|r| TomlRegion {
                    id: r.id,
                    rect: r.rect,
                    mode: r.mode,
                    padding: Some(TomlPadding {
                        left: r.padding.margin.left,
                        top: r.padding.margin.top,
                        right: r.padding.margin.right,
                        bottom: r.padding.margin.bottom,
                        header: r.padding.header,
                    }),
                    color_preset: r.color_preset.clone(),
                    created: Some(r.created),
                    header: r.header,
                })
                .collect(),
        };
        Ok(toml::to_string_pretty(&scene)?)
    }

    /// Write the scene to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Capture the persisted state of any host
    pub fn from_host<H: GraphHost + ?Sized>(host: &H) -> Self {
        Scene {
            nodes: host.node_rects(),
            regions: host.regions(),
        }
    }

    /// Build an in-memory graph holding this scene
    pub fn into_graph(self) -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        for node in self.nodes {
            graph.insert_node(node);
        }
        for region in self.regions {
            graph.insert_region_record(region);
        }
        graph
    }
}
