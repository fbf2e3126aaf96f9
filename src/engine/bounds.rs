//! Bounds calculation for auto-sized regions
//!
//! Runs after containment resolution and walks regions from the innermost
//! outwards, so an outer region is always fitted around the already-updated
//! rectangles of the regions nested inside it.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{self, Rect};
use crate::region::{NodeId, RegionRecord, SizeMode};
use crate::settings::Settings;

use super::containment::{Containment, Snapshot};

/// A region rectangle the engine wants written back to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsUpdate {
    pub id: NodeId,
    pub rect: Rect,
}

/// Rectangle for `region` fitted around `member_rects`.
///
/// With no members the region keeps its top-left corner and takes the
/// configured empty size.
pub fn fit_rect(region: &RegionRecord, member_rects: &[Rect], settings: &Settings) -> Rect {
    if region.header {
        return header_rect(region, settings);
    }
    match geometry::union(member_rects) {
        Some(bounds) => bounds.inflate(region.padding.outer()),
        None => Rect::new(
            region.rect.x,
            region.rect.y,
            settings.empty_size.0,
            settings.empty_size.1,
        ),
    }
}

/// A header region keeps its width and is pinned to the title strip height
pub fn header_rect(region: &RegionRecord, settings: &Settings) -> Rect {
    let height = [region.padding.header, settings.header_height, settings.min_size.1]
        .into_iter()
        .find(|h| *h > 0.0)
        .unwrap_or(1.0);
    let width = if region.rect.width.is_finite() {
        region.rect.width.max(settings.min_size.0)
    } else {
        settings.min_size.0
    };
    Rect::new(region.rect.x, region.rect.y, width, height)
}

/// Replace a zero/negative/non-finite rectangle with the minimum region size
pub fn correct_degenerate(rect: Rect, header: f64, settings: &Settings) -> Rect {
    let (min_width, min_height) = settings.min_region_size(header);
    let x = if rect.x.is_finite() { rect.x } else { 0.0 };
    let y = if rect.y.is_finite() { rect.y } else { 0.0 };
    Rect::new(x, y, rect.width, rect.height).with_min_size(min_width, min_height)
}

/// Clamp a user-chosen rectangle to the minimum region size, keeping the
/// edge opposite to the one being dragged fixed.
pub fn clamp_to_min(
    rect: Rect,
    header: f64,
    settings: &Settings,
    keep_right: bool,
    keep_bottom: bool,
) -> Rect {
    let (min_width, min_height) = settings.min_region_size(header);
    let sized = rect.with_min_size(min_width, min_height);
    let x = if keep_right {
        rect.right() - sized.width
    } else {
        rect.x
    };
    let y = if keep_bottom {
        rect.bottom() - sized.height
    } else {
        rect.y
    };
    Rect::new(x, y, sized.width, sized.height)
}

/// Rectangles of the direct members of `id`, looked up in `current`
fn member_rects(
    id: NodeId,
    containment: &Containment,
    current: &BTreeMap<NodeId, Rect>,
) -> Vec<Rect> {
    containment
        .direct_members(id)
        .map(|members| members.iter().filter_map(|m| current.get(m).copied()).collect())
        .unwrap_or_default()
}

/// Current rectangle of every node and region in the snapshot
pub(crate) fn rect_table(snapshot: &Snapshot) -> BTreeMap<NodeId, Rect> {
    snapshot
        .elements()
        .map(|element| (element.id(), element.rect()))
        .collect()
}

/// Fit a single region to its current direct members, ignoring its mode
pub fn fit_region(
    id: NodeId,
    snapshot: &Snapshot,
    containment: &Containment,
    settings: &Settings,
) -> Option<Rect> {
    let region = snapshot.region(id)?;
    let current = rect_table(snapshot);
    Some(fit_rect(
        region,
        &member_rects(id, containment, &current),
        settings,
    ))
}

/// Compute new rectangles for every auto region, innermost first.
///
/// Manual regions keep their rectangle. Degenerate regions, whatever their
/// mode, are raised to the minimum size. Regions in `skip` are left alone.
pub fn compute_auto_bounds(
    snapshot: &Snapshot,
    containment: &Containment,
    settings: &Settings,
    skip: &BTreeSet<NodeId>,
) -> Vec<BoundsUpdate> {
    let mut current = rect_table(snapshot);
    let mut updates = Vec::new();

    for id in containment.inner_to_outer() {
        if skip.contains(&id) {
            continue;
        }
        let (Some(region), Some(state)) = (snapshot.region(id), containment.region(id)) else {
            continue;
        };
        let Some(existing) = current.get(&id).copied() else {
            continue;
        };

        let target = if state.degenerate {
            correct_degenerate(existing, region.padding.header, settings)
        } else if region.header {
            header_rect(region, settings)
        } else if region.mode == SizeMode::Manual {
            continue;
        } else {
            fit_rect(region, &member_rects(id, containment, &current), settings)
        };

        if !target.approx_eq(&existing, settings.tolerance) {
            current.insert(id, target);
            updates.push(BoundsUpdate { id, rect: target });
        }
    }
    updates
}
