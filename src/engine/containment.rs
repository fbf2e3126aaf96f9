//! Containment resolution
//!
//! Membership is purely geometric: a node or region belongs to region R when
//! its rectangle passes the collision test against R's content rectangle (R's
//! rectangle minus the title strip). Regions that enclose each other are
//! ordered by creation, older outside, so the region graph is always acyclic.
//!
//! The result of a pass is a [`Containment`]: per-region member sets, direct
//! members, parents and depth, plus the outer-to-inner evaluation order.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::geometry::Rect;
use crate::host::{GraphHost, Spatial};
use crate::region::{NodeId, NodeRect, RegionRecord};
use crate::settings::{CollisionMethod, Settings};

use super::error::Diagnostic;

/// Node and region rectangles captured from the host at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<NodeRect>,
    pub regions: Vec<RegionRecord>,
}

impl Snapshot {
    pub fn new(nodes: Vec<NodeRect>, mut regions: Vec<RegionRecord>) -> Self {
        regions.sort_by_key(|r| (r.created, r.id));
        Self { nodes, regions }
    }

    /// Read the current state of the host
    pub fn capture<H: GraphHost + ?Sized>(host: &H) -> Self {
        Self::new(host.node_rects(), host.regions())
    }

    pub fn region(&self, id: NodeId) -> Option<&RegionRecord> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRect> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn rect_of(&self, id: NodeId) -> Option<Rect> {
        self.node(id)
            .map(Spatial::rect)
            .or_else(|| self.region(id).map(Spatial::rect))
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        self.rect_of(id).is_some()
    }

    /// Every node and region, as capability objects
    pub fn elements(&self) -> impl Iterator<Item = &dyn Spatial> {
        self.nodes
            .iter()
            .map(|n| n as &dyn Spatial)
            .chain(self.regions.iter().map(|r| r as &dyn Spatial))
    }
}

/// Derived per-region state from one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionState {
    pub id: NodeId,
    /// Every node and region inside the content rectangle
    pub members: BTreeSet<NodeId>,
    /// Members not already inside another member region
    pub direct_members: BTreeSet<NodeId>,
    /// Regions that have this region as a member
    pub parents: BTreeSet<NodeId>,
    /// 0 for outermost regions
    pub depth: usize,
    /// Zero or negative area at the time of the pass
    pub degenerate: bool,
}

impl RegionState {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Membership and nesting for every region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Containment {
    states: BTreeMap<NodeId, RegionState>,
    order: Vec<NodeId>,
}

impl Containment {
    pub fn region(&self, id: NodeId) -> Option<&RegionState> {
        self.states.get(&id)
    }

    pub fn members(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.states.get(&id).map(|s| &s.members)
    }

    pub fn direct_members(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.states.get(&id).map(|s| &s.direct_members)
    }

    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.states.get(&id).map(|s| s.depth)
    }

    /// Regions from outermost to innermost
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Regions from innermost to outermost
    pub fn inner_to_outer(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().rev().copied()
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionState> {
        self.order.iter().filter_map(|id| self.states.get(id))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every region whose member set includes `id`
    pub fn containing_regions(&self, id: NodeId) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|region| {
                self.states
                    .get(region)
                    .is_some_and(|s| s.members.contains(&id))
            })
            .collect()
    }

    pub fn is_contained(&self, id: NodeId) -> bool {
        self.states.values().any(|s| s.members.contains(&id))
    }

    /// The innermost region directly holding `id`, if any
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|region| {
                self.states
                    .get(region)
                    .is_some_and(|s| s.direct_members.contains(&id))
            })
    }

    /// Direct and transitive members of `id`
    pub fn descendants(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut found = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(state) = self.states.get(&current) else {
                continue;
            };
            for member in &state.members {
                if *member != id && found.insert(*member) {
                    queue.push_back(*member);
                }
            }
        }
        found
    }

    /// True if `inner` is a direct or transitive member of `outer`
    pub fn encloses(&self, outer: NodeId, inner: NodeId) -> bool {
        self.descendants(outer).contains(&inner)
    }
}

fn collides(method: CollisionMethod, content: &Rect, candidate: &Rect) -> bool {
    match method {
        CollisionMethod::Contained => content.contains_rect(candidate),
        CollisionMethod::Intersect => content.intersects(candidate),
        CollisionMethod::Point => content.contains_point(candidate.origin()),
    }
}

/// Older region first; ids break ties between equal creation stamps
fn is_older(a: &RegionRecord, b: &RegionRecord) -> bool {
    (a.created, a.id) < (b.created, b.id)
}

/// Compute membership and nesting for a snapshot.
///
/// Re-running on an unchanged snapshot yields an identical result.
pub fn resolve(snapshot: &Snapshot, settings: &Settings) -> (Containment, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut states: BTreeMap<NodeId, RegionState> = BTreeMap::new();

    for region in &snapshot.regions {
        let mut state = RegionState {
            id: region.id,
            ..Default::default()
        };

        if region.rect.is_degenerate() {
            warn!(
                region = %region.id,
                rect = ?region.rect,
                "region has no area; flagged for correction"
            );
            state.degenerate = true;
            diagnostics.push(Diagnostic::DegenerateGeometry { region: region.id });
            states.insert(region.id, state);
            continue;
        }

        let content = region.content_rect();
        if !region.header && !content.is_degenerate() {
            for node in &snapshot.nodes {
                if settings.ignore_knot_nodes && node.kind.is_knot() {
                    continue;
                }
                if collides(settings.collision, &content, &node.rect) {
                    state.members.insert(node.id);
                }
            }
            for other in &snapshot.regions {
                if other.id == region.id || other.rect.is_degenerate() {
                    continue;
                }
                if collides(settings.collision, &content, &other.rect) {
                    state.members.insert(other.id);
                }
            }
        }
        states.insert(region.id, state);
    }

    break_mutual_containment(snapshot, &mut states, &mut diagnostics);
    let order = layer_regions(snapshot, &mut states, &mut diagnostics);
    compute_direct_members(snapshot, &mut states);

    debug!(
        regions = states.len(),
        nodes = snapshot.nodes.len(),
        "containment resolved"
    );

    (Containment { states, order }, diagnostics)
}

/// Two regions holding each other: the younger one lets go of the older one
fn break_mutual_containment(
    snapshot: &Snapshot,
    states: &mut BTreeMap<NodeId, RegionState>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (i, a) in snapshot.regions.iter().enumerate() {
        for b in &snapshot.regions[i + 1..] {
            let a_holds_b = states.get(&a.id).is_some_and(|s| s.members.contains(&b.id));
            let b_holds_a = states.get(&b.id).is_some_and(|s| s.members.contains(&a.id));
            if !(a_holds_b && b_holds_a) {
                continue;
            }
            let (outer, inner) = if is_older(a, b) { (a, b) } else { (b, a) };
            if let Some(state) = states.get_mut(&inner.id) {
                state.members.remove(&outer.id);
            }
            debug!(
                outer = %outer.id,
                inner = %inner.id,
                "mutual containment broken by creation order"
            );
            diagnostics.push(Diagnostic::CycleDetected {
                outer: outer.id,
                inner: inner.id,
            });
        }
    }
}

/// Assign depths by topological layering and return the outer-to-inner order.
///
/// Longer cycles can only appear with non-default collision methods; any
/// left over after mutual ties are broken lose their younger-to-older edges.
fn layer_regions(
    snapshot: &Snapshot,
    states: &mut BTreeMap<NodeId, RegionState>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NodeId> {
    let region_ids: BTreeSet<NodeId> = snapshot.regions.iter().map(|r| r.id).collect();

    let mut layered = kahn_layers(&region_ids, states);
    if layered.len() < region_ids.len() {
        let placed: BTreeSet<NodeId> = layered.iter().map(|(id, _)| *id).collect();
        let stuck: Vec<&RegionRecord> = snapshot
            .regions
            .iter()
            .filter(|r| !placed.contains(&r.id))
            .collect();
        for younger in &stuck {
            for older in &stuck {
                if !is_older(older, younger) {
                    continue;
                }
                let removed = states
                    .get_mut(&younger.id)
                    .is_some_and(|s| s.members.remove(&older.id));
                if removed {
                    debug!(
                        outer = %older.id,
                        inner = %younger.id,
                        "containment cycle broken by creation order"
                    );
                    diagnostics.push(Diagnostic::CycleDetected {
                        outer: older.id,
                        inner: younger.id,
                    });
                }
            }
        }
        layered = kahn_layers(&region_ids, states);
    }

    let created: BTreeMap<NodeId, u64> =
        snapshot.regions.iter().map(|r| (r.id, r.created)).collect();
    for (id, depth) in &layered {
        if let Some(state) = states.get_mut(id) {
            state.depth = *depth;
        }
    }

    let mut order: Vec<NodeId> = layered.iter().map(|(id, _)| *id).collect();
    order.sort_by_key(|id| {
        (
            states.get(id).map_or(0, |s| s.depth),
            created.get(id).copied().unwrap_or(0),
            *id,
        )
    });
    order
}

/// Longest-path layering over the region containment graph. Also fills in
/// each region's `parents`.
fn kahn_layers(
    region_ids: &BTreeSet<NodeId>,
    states: &mut BTreeMap<NodeId, RegionState>,
) -> Vec<(NodeId, usize)> {
    let mut parents: BTreeMap<NodeId, BTreeSet<NodeId>> =
        region_ids.iter().map(|id| (*id, BTreeSet::new())).collect();
    for (outer, state) in states.iter() {
        for member in state.members.iter().filter(|m| region_ids.contains(m)) {
            if let Some(set) = parents.get_mut(member) {
                set.insert(*outer);
            }
        }
    }

    let mut indegree: BTreeMap<NodeId, usize> =
        parents.iter().map(|(id, p)| (*id, p.len())).collect();
    let mut depth: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut queue: VecDeque<NodeId> = indegree
        .iter()
        .filter(|(_, n)| **n == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut layered = Vec::with_capacity(region_ids.len());

    while let Some(id) = queue.pop_front() {
        let current = depth.get(&id).copied().unwrap_or(0);
        layered.push((id, current));
        let inner: Vec<NodeId> = states
            .get(&id)
            .map(|s| {
                s.members
                    .iter()
                    .filter(|m| region_ids.contains(m))
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        for member in inner {
            let entry = depth.entry(member).or_insert(0);
            *entry = (*entry).max(current + 1);
            if let Some(n) = indegree.get_mut(&member) {
                *n -= 1;
                if *n == 0 {
                    queue.push_back(member);
                }
            }
        }
    }

    for (id, set) in parents {
        if let Some(state) = states.get_mut(&id) {
            state.parents = set;
        }
    }
    layered
}

fn compute_direct_members(snapshot: &Snapshot, states: &mut BTreeMap<NodeId, RegionState>) {
    let region_ids: BTreeSet<NodeId> = snapshot.regions.iter().map(|r| r.id).collect();
    let direct: Vec<(NodeId, BTreeSet<NodeId>)> = states
        .iter()
        .map(|(id, state)| {
            let nested: Vec<&BTreeSet<NodeId>> = state
                .members
                .iter()
                .filter(|m| region_ids.contains(m))
                .filter_map(|m| states.get(m).map(|s| &s.members))
                .collect();
            let direct = state
                .members
                .iter()
                .copied()
                .filter(|m| !nested.iter().any(|inner| inner.contains(m)))
                .collect();
            (*id, direct)
        })
        .collect();
    for (id, set) in direct {
        if let Some(state) = states.get_mut(&id) {
            state.direct_members = set;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::region::RegionPadding;

    fn node(id: u64, x: f64, y: f64, w: f64, h: f64) -> NodeRect {
        NodeRect::new(NodeId(id), Rect::new(x, y, w, h))
    }

    fn region(id: u64, created: u64, x: f64, y: f64, w: f64, h: f64) -> RegionRecord {
        RegionRecord::new(
            NodeId(id),
            Rect::new(x, y, w, h),
            RegionPadding::uniform(10.0),
            created,
        )
    }

    fn ids(list: &[u64]) -> BTreeSet<NodeId> {
        list.iter().map(|i| NodeId(*i)).collect()
    }

    #[test]
    fn test_default_region_state_is_empty() {
        let state = RegionState::default();
        assert_eq!(state.id, NodeId(0));
        assert!(state.is_empty());
        assert_eq!(state.depth, 0);
    }

    #[test]
    fn test_node_fully_inside_is_member() {
        let snapshot = Snapshot::new(
            vec![node(1, 20.0, 20.0, 40.0, 40.0), node(2, 300.0, 0.0, 10.0, 10.0)],
            vec![region(10, 0, 0.0, 0.0, 200.0, 200.0)],
        );
        let (containment, diagnostics) = resolve(&snapshot, &Settings::default());
        assert_eq!(containment.members(NodeId(10)), Some(&ids(&[1])));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_boundary_touching_node_is_member() {
        let snapshot = Snapshot::new(
            vec![node(1, 0.0, 0.0, 200.0, 200.0)],
            vec![region(10, 0, 0.0, 0.0, 200.0, 200.0)],
        );
        let (containment, _) = resolve(&snapshot, &Settings::default());
        assert!(containment.members(NodeId(10)).unwrap().contains(&NodeId(1)));
    }

    #[test]
    fn test_header_strip_excluded_from_content() {
        let mut outer = region(10, 0, 0.0, 0.0, 200.0, 200.0);
        outer.padding.header = 30.0;
        let snapshot = Snapshot::new(vec![node(1, 20.0, 10.0, 40.0, 40.0)], vec![outer]);
        let (containment, _) = resolve(&snapshot, &Settings::default());
        assert!(containment.members(NodeId(10)).unwrap().is_empty());
    }

    #[test]
    fn test_nested_regions_depth_and_direct_members() {
        let snapshot = Snapshot::new(
            vec![node(1, 60.0, 60.0, 20.0, 20.0), node(2, 250.0, 250.0, 20.0, 20.0)],
            vec![
                region(10, 0, 0.0, 0.0, 400.0, 400.0),
                region(11, 1, 50.0, 50.0, 100.0, 100.0),
            ],
        );
        let (containment, _) = resolve(&snapshot, &Settings::default());
        assert_eq!(containment.depth(NodeId(10)), Some(0));
        assert_eq!(containment.depth(NodeId(11)), Some(1));
        assert_eq!(containment.members(NodeId(10)), Some(&ids(&[1, 2, 11])));
        assert_eq!(containment.direct_members(NodeId(10)), Some(&ids(&[2, 11])));
        assert_eq!(containment.order(), &[NodeId(10), NodeId(11)]);
        assert_eq!(containment.parent_of(NodeId(1)), Some(NodeId(11)));
        assert_eq!(containment.parent_of(NodeId(2)), Some(NodeId(10)));
    }

    #[test]
    fn test_identical_rects_older_is_outer() {
        let snapshot = Snapshot::new(
            vec![],
            vec![
                region(21, 5, 0.0, 0.0, 100.0, 100.0),
                region(20, 2, 0.0, 0.0, 100.0, 100.0),
            ],
        );
        let (containment, diagnostics) = resolve(&snapshot, &Settings::default());
        assert_eq!(containment.members(NodeId(20)), Some(&ids(&[21])));
        assert!(containment.members(NodeId(21)).unwrap().is_empty());
        assert_eq!(containment.order(), &[NodeId(20), NodeId(21)]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::CycleDetected {
                outer: NodeId(20),
                inner: NodeId(21),
            }]
        );
    }

    #[test]
    fn test_degenerate_region_has_no_members() {
        let snapshot = Snapshot::new(
            vec![node(1, 0.0, 0.0, 0.0, 0.0)],
            vec![region(10, 0, 0.0, 0.0, 0.0, 100.0)],
        );
        let (containment, diagnostics) = resolve(&snapshot, &Settings::default());
        let state = containment.region(NodeId(10)).unwrap();
        assert!(state.degenerate);
        assert!(state.members.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DegenerateGeometry { region: NodeId(10) }]
        );
    }

    #[test]
    fn test_knots_ignored_when_configured() {
        let snapshot = Snapshot::new(
            vec![NodeRect::knot(NodeId(1), Rect::new(10.0, 10.0, 8.0, 8.0))],
            vec![region(10, 0, 0.0, 0.0, 100.0, 100.0)],
        );
        let (with_knots, _) = resolve(&snapshot, &Settings::default());
        assert_eq!(with_knots.members(NodeId(10)), Some(&ids(&[1])));

        let (without, _) = resolve(&snapshot, &Settings::default().with_ignore_knots(true));
        assert!(without.members(NodeId(10)).unwrap().is_empty());
    }

    #[test]
    fn test_header_region_owns_nothing_but_can_be_member() {
        let header = region(11, 1, 10.0, 10.0, 150.0, 30.0).as_header();
        let snapshot = Snapshot::new(
            vec![node(1, 20.0, 20.0, 5.0, 5.0)],
            vec![region(10, 0, 0.0, 0.0, 300.0, 300.0), header],
        );
        let (containment, _) = resolve(&snapshot, &Settings::default());
        assert!(containment.members(NodeId(11)).unwrap().is_empty());
        assert_eq!(containment.members(NodeId(10)), Some(&ids(&[1, 11])));
    }

    #[test]
    fn test_intersect_method_cycle_is_broken() {
        // Three overlapping regions where each intersects the others
        let snapshot = Snapshot::new(
            vec![],
            vec![
                region(1, 0, 0.0, 0.0, 100.0, 100.0),
                region(2, 1, 50.0, 0.0, 100.0, 100.0),
                region(3, 2, 25.0, 50.0, 100.0, 100.0),
            ],
        );
        let settings = Settings::default().with_collision(CollisionMethod::Intersect);
        let (containment, diagnostics) = resolve(&snapshot, &settings);
        assert_eq!(containment.order().len(), 3);
        assert_eq!(containment.depth(NodeId(1)), Some(0));
        assert!(!diagnostics.is_empty());
        for state in containment.regions() {
            assert!(!containment.descendants(state.id).contains(&state.id));
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let snapshot = Snapshot::new(
            vec![node(1, 60.0, 60.0, 20.0, 20.0)],
            vec![
                region(10, 0, 0.0, 0.0, 400.0, 400.0),
                region(11, 1, 50.0, 50.0, 100.0, 100.0),
            ],
        );
        let first = resolve(&snapshot, &Settings::default());
        let second = resolve(&snapshot, &Settings::default());
        assert_eq!(first, second);
    }
}
