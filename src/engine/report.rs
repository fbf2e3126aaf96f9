//! Plain-text dump of regions, their members and the last diagnostics

use crate::geometry::Rect;
use crate::region::{NodeId, NodeKind};

use super::containment::{Containment, Snapshot};
use super::error::Diagnostic;

fn bounds(rect: &Rect) -> String {
    format!(
        "x={:.1} y={:.1} w={:.1} h={:.1}",
        rect.x, rect.y, rect.width, rect.height
    )
}

fn print_member(
    out: &mut String,
    id: NodeId,
    depth: usize,
    snapshot: &Snapshot,
    containment: &Containment,
) {
    let indent = "  ".repeat(depth);
    if let Some(region) = snapshot.region(id) {
        let mut tags = region.mode.to_string();
        if region.header {
            tags.push_str(" header");
        }
        if let Some(preset) = &region.color_preset {
            tags.push_str(&format!(" color={}", preset));
        }
        out.push_str(&format!("{}[{}] {} {}\n", indent, id, tags, bounds(&region.rect)));
        if let Some(members) = containment.direct_members(id) {
            for member in members {
                print_member(out, *member, depth + 1, snapshot, containment);
            }
        }
    } else if let Some(node) = snapshot.node(id) {
        let kind = match node.kind {
            NodeKind::Knot => " knot",
            NodeKind::Node => "",
        };
        out.push_str(&format!("{}{}{} {}\n", indent, id, kind, bounds(&node.rect)));
    }
}

/// Render the region tree: top-level regions with their direct members
/// nested below, then nodes outside every region, then diagnostics.
pub fn render_report(
    snapshot: &Snapshot,
    containment: &Containment,
    diagnostics: &[Diagnostic],
) -> String {
    let mut out = String::new();

    out.push_str("=== Regions ===\n");
    for region in &snapshot.regions {
        if containment.parent_of(region.id).is_none() {
            print_member(&mut out, region.id, 0, snapshot, containment);
        }
    }

    let ungrouped: Vec<NodeId> = snapshot
        .nodes
        .iter()
        .map(|node| node.id)
        .filter(|id| containment.parent_of(*id).is_none())
        .collect();
    if !ungrouped.is_empty() {
        out.push_str("=== Ungrouped ===\n");
        for id in ungrouped {
            print_member(&mut out, id, 0, snapshot, containment);
        }
    }

    if !diagnostics.is_empty() {
        out.push_str("=== Diagnostics ===\n");
        for diagnostic in diagnostics {
            out.push_str(&format!("{}\n", diagnostic));
        }
    }
    out
}
