//! The boundary between the engine and the host graph editor
//!
//! The host owns every node and region record. The engine reads snapshots
//! through [`GraphHost`], writes rectangles back through it, and learns about
//! user edits through a [`ChangeNotifier`] the host fires from its own
//! "rects changed" hook.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::geometry::Rect;
use crate::region::{NodeId, NodeRect, RegionDraft, RegionRecord, SizeMode};

/// Anything with an identity and a rectangle.
///
/// Plain nodes and comment regions both implement this, so the resolver can
/// treat them uniformly.
pub trait Spatial {
    fn id(&self) -> NodeId;
    fn rect(&self) -> Rect;
    fn set_rect(&mut self, rect: Rect);
}

impl Spatial for NodeRect {
    fn id(&self) -> NodeId {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

impl Spatial for RegionRecord {
    fn id(&self) -> NodeId {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

/// Operations the engine consumes from the host editor.
///
/// Setters return `false` when the id is unknown to the host; the engine
/// turns that into a stale-reference no-op.
pub trait GraphHost {
    /// Every non-region node
    fn node_rects(&self) -> Vec<NodeRect>;

    /// Every comment region
    fn regions(&self) -> Vec<RegionRecord>;

    fn set_node_rect(&mut self, id: NodeId, rect: Rect) -> bool;

    fn set_region_rect(&mut self, id: NodeId, rect: Rect) -> bool;

    fn set_region_mode(&mut self, id: NodeId, mode: SizeMode) -> bool;

    /// Create a region and return the id the host assigned to it
    fn insert_region(&mut self, draft: RegionDraft) -> NodeId;

    fn remove_region(&mut self, id: NodeId) -> bool;
}

#[derive(Debug, Default)]
struct NotifierState {
    pending: Cell<bool>,
    in_pass: Cell<bool>,
    deferred: Cell<u32>,
}

/// Handle the host fires after any node or region moves or resizes.
///
/// Cloning shares the same flag. The handle is `!Send` on purpose: the engine
/// has a single writer on the UI thread.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    state: Rc<NotifierState>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that some rectangle changed. Never runs a pass inline.
    pub fn rects_changed(&self) {
        self.state.pending.set(true);
        if self.state.in_pass.get() {
            self.state.deferred.set(self.state.deferred.get() + 1);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    pub(crate) fn take_pending(&self) -> bool {
        self.state.pending.replace(false)
    }

    pub(crate) fn is_in_pass(&self) -> bool {
        self.state.in_pass.get()
    }

    pub(crate) fn enter_pass(&self) {
        self.state.in_pass.set(true);
        self.state.deferred.set(0);
    }

    /// Leave the pass and report how many notifications arrived during it
    pub(crate) fn exit_pass(&self) -> u32 {
        self.state.in_pass.set(false);
        self.state.deferred.replace(0)
    }
}

/// In-memory host used by the CLI, tests and embedders without their own
/// object model.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    nodes: BTreeMap<NodeId, NodeRect>,
    regions: BTreeMap<NodeId, RegionRecord>,
    next_id: u64,
    notifier: Option<ChangeNotifier>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `notifier` on every rectangle change, as an editor would
    pub fn with_notifier(mut self, notifier: ChangeNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn attach_notifier(&mut self, notifier: ChangeNotifier) {
        self.notifier = Some(notifier);
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn reserve_id(&mut self, id: NodeId) {
        self.next_id = self.next_id.max(id.0 + 1);
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.rects_changed();
        }
    }

    /// Add a plain node and return its id
    pub fn add_node(&mut self, rect: Rect) -> NodeId {
        let id = self.allocate_id();
        self.nodes.insert(id, NodeRect::new(id, rect));
        self.notify();
        id
    }

    /// Add a knot (reroute) node and return its id
    pub fn add_knot(&mut self, rect: Rect) -> NodeId {
        let id = self.allocate_id();
        self.nodes.insert(id, NodeRect::knot(id, rect));
        self.notify();
        id
    }

    /// Insert a node under a caller-chosen id, replacing any previous one
    pub fn insert_node(&mut self, node: NodeRect) {
        self.reserve_id(node.id);
        self.nodes.insert(node.id, node);
        self.notify();
    }

    /// Insert a fully-formed region record, e.g. when loading a scene
    pub fn insert_region_record(&mut self, record: RegionRecord) {
        self.reserve_id(record.id);
        self.regions.insert(record.id, record);
        self.notify();
    }

    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let removed = self.nodes.remove(&id).is_some();
        if removed {
            self.notify();
        }
        removed
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRect> {
        self.nodes.get(&id)
    }

    pub fn region(&self, id: NodeId) -> Option<&RegionRecord> {
        self.regions.get(&id)
    }

    /// Rectangle of a node or region
    pub fn rect_of(&self, id: NodeId) -> Option<Rect> {
        self.nodes
            .get(&id)
            .map(Spatial::rect)
            .or_else(|| self.regions.get(&id).map(Spatial::rect))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeRect> {
        self.nodes.values()
    }

    pub fn region_records(&self) -> impl Iterator<Item = &RegionRecord> {
        self.regions.values()
    }
}

fn write_rect<S: Spatial>(items: &mut BTreeMap<NodeId, S>, id: NodeId, rect: Rect) -> bool {
    match items.get_mut(&id) {
        Some(item) => {
            item.set_rect(rect);
            true
        }
        None => false,
    }
}

impl GraphHost for MemoryGraph {
    fn node_rects(&self) -> Vec<NodeRect> {
        self.nodes.values().copied().collect()
    }

    fn regions(&self) -> Vec<RegionRecord> {
        self.regions.values().cloned().collect()
    }

    fn set_node_rect(&mut self, id: NodeId, rect: Rect) -> bool {
        let found = write_rect(&mut self.nodes, id, rect);
        if found {
            self.notify();
        }
        found
    }

    fn set_region_rect(&mut self, id: NodeId, rect: Rect) -> bool {
        let found = write_rect(&mut self.regions, id, rect);
        if found {
            self.notify();
        }
        found
    }

    fn set_region_mode(&mut self, id: NodeId, mode: SizeMode) -> bool {
        match self.regions.get_mut(&id) {
            Some(region) => {
                region.mode = mode;
                true
            }
            None => false,
        }
    }

    fn insert_region(&mut self, draft: RegionDraft) -> NodeId {
        let id = self.allocate_id();
        self.regions.insert(
            id,
            RegionRecord {
                id,
                rect: draft.rect,
                mode: draft.mode,
                padding: draft.padding,
                color_preset: draft.color_preset,
                created: draft.created,
                header: false,
            },
        );
        self.notify();
        id
    }

    fn remove_region(&mut self, id: NodeId) -> bool {
        let removed = self.regions.remove(&id).is_some();
        if removed {
            self.notify();
        }
        removed
    }
}
