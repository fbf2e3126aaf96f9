//! Pushing empty regions out of each other's way
//!
//! An empty auto region dropped on top of another region would otherwise sit
//! there and swallow it on the next pass. Each tick moves such regions a few
//! units along the axis where they overlap the least.

use std::collections::BTreeSet;

use tracing::debug;

use crate::geometry::{Delta, Rect};
use crate::host::GraphHost;
use crate::region::{NodeId, RegionRecord, SizeMode};
use crate::settings::Settings;

use super::bounds::BoundsUpdate;
use super::containment::{resolve, Containment, Snapshot};
use super::interaction::InteractionContext;
use super::CommentEngine;

fn signum(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Unit push that moves `rect` out of `other` along the shallower axis
fn push_away(rect: &Rect, other: &Rect) -> (f64, f64) {
    let overlap_x = (rect.right() - other.x).min(other.right() - rect.x);
    let overlap_y = (rect.bottom() - other.y).min(other.bottom() - rect.y);
    let from = other.center();
    let to = rect.center();
    if overlap_x <= overlap_y {
        (signum(to.x - from.x), 0.0)
    } else {
        (0.0, signum(to.y - from.y))
    }
}

fn can_nudge(
    region: &RegionRecord,
    containment: &Containment,
    selection: &BTreeSet<NodeId>,
) -> bool {
    let empty = containment
        .members(region.id)
        .map_or(true, |members| members.is_empty());
    region.mode == SizeMode::Auto
        && !region.header
        && !region.rect.is_degenerate()
        && empty
        && !selection.contains(&region.id)
        && !containment.is_contained(region.id)
}

/// New rectangles for every empty region that overlaps another region
pub fn nudge_updates(
    snapshot: &Snapshot,
    containment: &Containment,
    settings: &Settings,
    selection: &BTreeSet<NodeId>,
) -> Vec<BoundsUpdate> {
    let speed = settings.empty_region_speed;
    if speed <= 0.0 {
        return Vec::new();
    }

    let mut updates = Vec::new();
    for region in &snapshot.regions {
        if !can_nudge(region, containment, selection) {
            continue;
        }
        let mut overlapped = false;
        let (mut push_x, mut push_y) = (0.0, 0.0);
        for other in &snapshot.regions {
            if other.id == region.id || other.header || !region.rect.intersects(&other.rect) {
                continue;
            }
            overlapped = true;
            let (x, y) = push_away(&region.rect, &other.rect);
            push_x += x;
            push_y += y;
        }
        if !overlapped {
            continue;
        }

        let mut delta = Delta::new(signum(push_x) * speed, signum(push_y) * speed);
        if delta.is_zero() {
            // Pushes cancelled out
            delta = Delta::new(speed, speed);
        }
        updates.push(BoundsUpdate {
            id: region.id,
            rect: region.rect.translate(delta),
        });
    }
    updates
}

impl CommentEngine {
    /// Move overlapping empty regions one step apart. The writes go through
    /// the host as ordinary edits, so the next tick resolves them.
    pub(crate) fn nudge_empty_regions<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &InteractionContext,
    ) -> Vec<NodeId> {
        let snapshot = Snapshot::capture(host);
        if snapshot.regions.len() < 2 {
            return Vec::new();
        }
        let (containment, _) = resolve(&snapshot, &self.settings);
        let updates = nudge_updates(&snapshot, &containment, &self.settings, &ctx.selection);

        let mut nudged = Vec::with_capacity(updates.len());
        for update in updates {
            if host.set_region_rect(update.id, update.rect) {
                nudged.push(update.id);
            }
        }
        if !nudged.is_empty() {
            debug!(count = nudged.len(), "empty regions nudged");
            self.notifier.rects_changed();
        }
        nudged
    }
}
