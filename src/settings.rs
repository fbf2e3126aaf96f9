//! Engine configuration
//!
//! Settings can be built in code with the `with_*` methods or loaded from a
//! TOML file. Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! padding = [30.0, 30.0]
//! header_height = 28.0
//! collision = "contained"
//! alt_collision = "intersect"
//! ignore_knot_nodes = true
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Padding;
use crate::region::RegionPadding;

/// Errors that can occur when loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// How a node is tested against a region's content rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMethod {
    /// Node rectangle must lie fully inside (edges inclusive)
    #[default]
    Contained,
    /// Any overlap counts
    Intersect,
    /// Node's top-left corner must be inside
    Point,
}

impl fmt::Display for CollisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionMethod::Contained => write!(f, "contained"),
            CollisionMethod::Intersect => write!(f, "intersect"),
            CollisionMethod::Point => write!(f, "point"),
        }
    }
}

/// Configuration options for region resolution and interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Horizontal and vertical margin around a region's members
    pub padding: (f64, f64),

    /// Reserve room above and below the members for the region's controls
    pub show_controls: bool,

    /// Height of the title strip at the top of every region
    pub header_height: f64,

    /// Smallest size a region can be resized to (width, height below the header)
    pub min_size: (f64, f64),

    /// Size given to an auto region with no members
    pub empty_size: (f64, f64),

    /// Membership test used by the resolver
    pub collision: CollisionMethod,

    /// Membership test for the pass that runs when the alternate-collision
    /// modifier is released
    pub alt_collision: CollisionMethod,

    /// Never count knot nodes as members
    pub ignore_knot_nodes: bool,

    /// Grid used to snap drag deltas and resize handles; 0 disables snapping
    pub grid_snap: f64,

    /// Keep a region manual after a handle resize instead of returning to auto
    pub resize_locks_manual: bool,

    /// Push empty regions out of other regions on every tick
    pub move_empty_regions: bool,

    /// Distance an empty region moves per tick
    pub empty_region_speed: f64,

    /// Rect changes smaller than this are not written back to the host
    pub tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            padding: (30.0, 30.0),
            show_controls: true,
            header_height: 28.0,
            min_size: (125.0, 80.0),
            empty_size: (225.0, 150.0),
            collision: CollisionMethod::Contained,
            alt_collision: CollisionMethod::Intersect,
            ignore_knot_nodes: false,
            grid_snap: 0.0,
            resize_locks_manual: false,
            move_empty_regions: true,
            empty_region_speed: 10.0,
            tolerance: 0.1,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let non_negative = [
            ("padding", self.padding.0.min(self.padding.1)),
            ("header_height", self.header_height),
            ("grid_snap", self.grid_snap),
            ("empty_region_speed", self.empty_region_speed),
            ("tolerance", self.tolerance),
        ];
        for (key, value) in non_negative {
            if !(value >= 0.0) {
                return Err(SettingsError::Invalid {
                    key,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }

        let positive = [
            ("min_size", self.min_size.0.min(self.min_size.1)),
            ("empty_size", self.empty_size.0.min(self.empty_size.1)),
        ];
        for (key, value) in positive {
            if !(value > 0.0) {
                return Err(SettingsError::Invalid {
                    key,
                    reason: format!("both dimensions must be positive, got {}", value),
                });
            }
        }
        Ok(())
    }

    /// Padding given to newly created regions.
    ///
    /// With controls shown, the vertical margin grows so the buttons above and
    /// below the members stay visible.
    pub fn default_padding(&self) -> RegionPadding {
        let (horizontal, vertical) = self.padding;
        let controls = if self.show_controls {
            (vertical + 16.0).max(30.0)
        } else {
            vertical
        };
        RegionPadding::new(
            Padding::new(horizontal, controls, horizontal, controls),
            self.header_height,
        )
    }

    /// Minimum outer size of a region with the given header strip
    pub fn min_region_size(&self, header: f64) -> (f64, f64) {
        (self.min_size.0, self.min_size.1 + header)
    }

    /// Set the member margin
    pub fn with_padding(mut self, horizontal: f64, vertical: f64) -> Self {
        self.padding = (horizontal, vertical);
        self
    }

    /// Show or hide the region controls
    pub fn with_controls(mut self, show: bool) -> Self {
        self.show_controls = show;
        self
    }

    /// Set the title strip height
    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    /// Set the membership test
    pub fn with_collision(mut self, method: CollisionMethod) -> Self {
        self.collision = method;
        self
    }

    /// Set the membership test used when the alternate modifier is released
    pub fn with_alt_collision(mut self, method: CollisionMethod) -> Self {
        self.alt_collision = method;
        self
    }

    /// Exclude knot nodes from membership
    pub fn with_ignore_knots(mut self, ignore: bool) -> Self {
        self.ignore_knot_nodes = ignore;
        self
    }

    /// Snap drag deltas and resize handles to a grid
    pub fn with_grid_snap(mut self, grid: f64) -> Self {
        self.grid_snap = grid;
        self
    }

    /// Keep regions manual after a handle resize
    pub fn with_resize_locks_manual(mut self, lock: bool) -> Self {
        self.resize_locks_manual = lock;
        self
    }

    /// Enable or disable empty-region nudging
    pub fn with_move_empty_regions(mut self, enabled: bool) -> Self {
        self.move_empty_regions = enabled;
        self
    }

    /// Set the size given to empty auto regions
    pub fn with_empty_size(mut self, width: f64, height: f64) -> Self {
        self.empty_size = (width, height);
        self
    }
}
