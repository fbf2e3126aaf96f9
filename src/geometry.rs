//! Rectangle algebra used by containment, bounds and interaction.
//!
//! All coordinates are graph-space `f64`. Nothing here holds state.

use serde::{Deserialize, Serialize};

/// A 2D point in graph space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A translation applied to a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Round both components to the nearest multiple of `grid`.
    ///
    /// A non-positive grid leaves the delta untouched.
    pub fn snap_to_grid(self, grid: f64) -> Delta {
        if grid <= 0.0 {
            return self;
        }
        Delta {
            dx: grid * (self.dx / grid).round(),
            dy: grid * (self.dy / grid).round(),
        }
    }
}

/// Per-side inflation amounts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Padding {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same amount on every side
    pub fn uniform(amount: f64) -> Self {
        Self::new(amount, amount, amount, amount)
    }
}

/// An axis-aligned rectangle: top-left corner plus extent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its four edges
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Zero or negative extent on either axis, or non-finite coordinates
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Boundary-inclusive point test
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// True iff `inner` lies entirely within `self`; touching edges count as inside
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// The overlapping area of two rectangles, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grow every side by the matching padding amount
    pub fn inflate(&self, padding: Padding) -> Rect {
        Rect::from_edges(
            self.x - padding.left,
            self.y - padding.top,
            self.right() + padding.right,
            self.bottom() + padding.bottom,
        )
    }

    /// Shrink every side by the matching padding amount
    pub fn deflate(&self, padding: Padding) -> Rect {
        Rect::from_edges(
            self.x + padding.left,
            self.y + padding.top,
            self.right() - padding.right,
            self.bottom() - padding.bottom,
        )
    }

    pub fn translate(&self, delta: Delta) -> Rect {
        Rect::new(self.x + delta.dx, self.y + delta.dy, self.width, self.height)
    }

    /// Same origin, extent raised to at least `min_width` x `min_height`
    pub fn with_min_size(&self, min_width: f64, min_height: f64) -> Rect {
        let width = if self.width.is_finite() {
            self.width.max(min_width)
        } else {
            min_width
        };
        let height = if self.height.is_finite() {
            self.height.max(min_height)
        } else {
            min_height
        };
        Rect::new(self.x, self.y, width, height)
    }

    /// Component-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Minimal rectangle enclosing every input, `None` for an empty input
pub fn union<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects
        .into_iter()
        .fold(None, |acc: Option<Rect>, rect| match acc {
            Some(bounds) => Some(bounds.union(rect)),
            None => Some(*rect),
        })
}
