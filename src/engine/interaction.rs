//! User gestures and editor commands
//!
//! Drags and handle resizes arrive as a begin call, any number of ticks, and
//! an end call. Each tick is applied completely before it returns. Ending a
//! gesture keeps whatever the last tick produced.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::geometry::{self, Delta, Point, Rect};
use crate::host::GraphHost;
use crate::region::{NodeId, RegionDraft, SizeMode};

use super::bounds::{clamp_to_min, fit_region};
use super::containment::{resolve, Snapshot};
use super::error::{Diagnostic, RegionError};
use super::{CommentEngine, PassReport};

/// Editor state the controller needs but does not own
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionContext {
    /// Nodes the host itself moves as part of a selection drag
    pub selection: BTreeSet<NodeId>,
    /// Move a region without carrying its members along
    pub free_move: bool,
    /// The alternate-collision modifier was just released; the next pending
    /// pass resolves membership with `Settings::alt_collision`
    pub alt_collision: bool,
}

impl InteractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: impl IntoIterator<Item = NodeId>) -> Self {
        self.selection = selection.into_iter().collect();
        self
    }

    pub fn with_free_move(mut self, free_move: bool) -> Self {
        self.free_move = free_move;
        self
    }

    pub fn with_alt_collision(mut self, alt_collision: bool) -> Self {
        self.alt_collision = alt_collision;
        self
    }
}

/// Which edge or corner of a region a resize handle drags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeAnchor {
    pub fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// New rectangle after dragging this handle to `pointer`
    pub fn drag(self, start: Rect, pointer: Point) -> Rect {
        let left = if self.moves_left() { pointer.x } else { start.x };
        let right = if self.moves_right() {
            pointer.x
        } else {
            start.right()
        };
        let top = if self.moves_top() { pointer.y } else { start.y };
        let bottom = if self.moves_bottom() {
            pointer.y
        } else {
            start.bottom()
        };
        Rect::from_edges(left, top, right, bottom)
    }
}

/// A drag or resize in progress
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Drag {
        region: NodeId,
        /// Members carried along, captured when the drag began
        carried: BTreeSet<NodeId>,
        /// Sum of all applied deltas
        total: Delta,
    },
    Resize {
        region: NodeId,
        anchor: ResizeAnchor,
        start: Rect,
        /// Mode to restore when the gesture ends
        previous_mode: SizeMode,
    },
}

impl Gesture {
    pub fn region(&self) -> NodeId {
        match self {
            Gesture::Drag { region, .. } | Gesture::Resize { region, .. } => *region,
        }
    }
}

impl CommentEngine {
    /// Look up a region, distinguishing plain nodes from missing ids
    fn require_region(&mut self, snapshot: &Snapshot, id: NodeId) -> Result<(), RegionError> {
        if snapshot.region(id).is_some() {
            Ok(())
        } else if snapshot.node(id).is_some() {
            Err(RegionError::NotARegion(id))
        } else {
            Err(self.note_stale(id))
        }
    }

    /// Drop the current gesture if it targets `id`
    fn cancel_gesture_on(&mut self, id: NodeId) {
        if self.gesture.as_ref().is_some_and(|g| g.region() == id) {
            debug!(%id, "gesture target removed; gesture ended");
            self.gesture = None;
        }
    }

    /// Release whatever gesture is active so a new one can start from a
    /// settled region
    fn finish_active_gesture<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<(), RegionError> {
        match &self.gesture {
            None => Ok(()),
            Some(Gesture::Drag { region, .. }) => {
                debug!(%region, "drag ended by a new gesture");
                self.end_drag()
            }
            Some(Gesture::Resize { region, .. }) => {
                debug!(%region, "resize ended by a new gesture");
                self.end_resize(host).map(|_| ())
            }
        }
    }

    /// Create an auto region around the given nodes and regions
    pub fn create_region<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        members: &[NodeId],
    ) -> Result<NodeId, RegionError> {
        if members.is_empty() {
            return Err(RegionError::EmptySelection);
        }
        let snapshot = Snapshot::capture(host);
        let mut rects = Vec::with_capacity(members.len());
        for id in members {
            match snapshot.rect_of(*id) {
                Some(rect) => rects.push(rect),
                None => return Err(self.note_stale(*id)),
            }
        }
        let padding = self.settings.default_padding();
        let rect = geometry::union(&rects)
            .map(|bounds| bounds.inflate(padding.outer()))
            .ok_or(RegionError::EmptySelection)?;

        let id = host.insert_region(RegionDraft {
            rect,
            mode: SizeMode::Auto,
            padding,
            color_preset: None,
            created: next_created(&snapshot),
        });
        info!(%id, members = members.len(), "region created");
        self.run_pass(host, &BTreeSet::new());
        Ok(id)
    }

    /// Create an empty auto region with its top-left corner at `at`
    pub fn create_empty_region<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        at: Point,
    ) -> NodeId {
        let snapshot = Snapshot::capture(host);
        let (width, height) = self.settings.empty_size;
        let id = host.insert_region(RegionDraft {
            rect: Rect::new(at.x, at.y, width, height),
            mode: SizeMode::Auto,
            padding: self.settings.default_padding(),
            color_preset: None,
            created: next_created(&snapshot),
        });
        info!(%id, "empty region created");
        self.run_pass(host, &BTreeSet::new());
        id
    }

    /// Remove a region. Its members stay where they are and fall to whatever
    /// region encloses them now.
    pub fn delete_region<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: NodeId,
    ) -> Result<(), RegionError> {
        let snapshot = Snapshot::capture(host);
        self.require_region(&snapshot, id)?;
        self.cancel_gesture_on(id);
        if !host.remove_region(id) {
            return Err(self.note_stale(id));
        }
        info!(%id, "region deleted");
        self.run_pass(host, &BTreeSet::new());
        Ok(())
    }

    /// Switch a region between auto and manual sizing.
    ///
    /// Going back to auto refits immediately; going manual freezes the
    /// current rectangle.
    pub fn set_mode<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: NodeId,
        mode: SizeMode,
    ) -> Result<(), RegionError> {
        let snapshot = Snapshot::capture(host);
        self.require_region(&snapshot, id)?;
        let previous = snapshot.region(id).map(|r| r.mode);
        if !host.set_region_mode(id, mode) {
            return Err(self.note_stale(id));
        }
        debug!(%id, %mode, "size mode changed");
        if previous == Some(SizeMode::Manual) && mode == SizeMode::Auto {
            self.run_pass(host, &BTreeSet::new());
        }
        Ok(())
    }

    /// Fit a region to its members once, leaving its mode unchanged
    pub fn fit_now<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: NodeId,
    ) -> Result<Rect, RegionError> {
        let snapshot = Snapshot::capture(host);
        self.require_region(&snapshot, id)?;

        let (containment, diagnostics) = resolve(&snapshot, &self.settings);
        self.containment = containment;
        self.diagnostics = diagnostics;
        let rect = fit_region(id, &snapshot, &self.containment, &self.settings)
            .ok_or(RegionError::StaleReference(id))?;

        if !host.set_region_rect(id, rect) {
            return Err(self.note_stale(id));
        }
        debug!(%id, ?rect, "region fitted");
        self.run_pass(host, &BTreeSet::new());
        Ok(rect)
    }

    /// Move a region and everything inside it by `delta` in one step
    pub fn drag_region<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &InteractionContext,
        id: NodeId,
        delta: Delta,
    ) -> Result<PassReport, RegionError> {
        self.begin_drag(host, ctx, id)?;
        let report = self.drag_tick(host, delta)?;
        self.end_drag()?;
        Ok(report)
    }

    /// Start dragging a region. The set of members that travel with it is
    /// fixed here. An active gesture is released first.
    pub fn begin_drag<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &InteractionContext,
        id: NodeId,
    ) -> Result<(), RegionError> {
        self.require_region(&Snapshot::capture(host), id)?;
        self.finish_active_gesture(host)?;

        let snapshot = Snapshot::capture(host);
        let (containment, diagnostics) = resolve(&snapshot, &self.settings);
        self.containment = containment;
        self.diagnostics = diagnostics;

        let carried = if ctx.free_move {
            BTreeSet::new()
        } else {
            self.containment
                .descendants(id)
                .into_iter()
                .filter(|m| !ctx.selection.contains(m))
                .collect()
        };
        debug!(%id, carried = carried.len(), "drag started");
        self.gesture = Some(Gesture::Drag {
            region: id,
            carried,
            total: Delta::default(),
        });
        Ok(())
    }

    /// Apply one drag step
    pub fn drag_tick<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        delta: Delta,
    ) -> Result<PassReport, RegionError> {
        let Some(Gesture::Drag {
            region, carried, ..
        }) = self.gesture.clone()
        else {
            return Err(RegionError::NoActiveGesture);
        };

        let snapshot = Snapshot::capture(host);
        let Some(start) = snapshot.region(region).map(|r| r.rect) else {
            self.gesture = None;
            return Err(self.note_stale(region));
        };

        let delta = delta.snap_to_grid(self.settings.grid_snap);
        if delta.is_zero() {
            return Ok(PassReport::default());
        }

        host.set_region_rect(region, start.translate(delta));
        for member in &carried {
            let written = if let Some(node) = snapshot.node(*member) {
                host.set_node_rect(*member, node.rect.translate(delta))
            } else if let Some(inner) = snapshot.region(*member) {
                host.set_region_rect(*member, inner.rect.translate(delta))
            } else {
                false
            };
            if !written {
                self.diagnostics
                    .push(Diagnostic::StaleReference { id: *member });
            }
        }

        if let Some(Gesture::Drag { total, .. }) = self.gesture.as_mut() {
            total.dx += delta.dx;
            total.dy += delta.dy;
        }

        let mut moving = carried;
        moving.insert(region);
        Ok(self.run_pass(host, &moving))
    }

    /// Start a handle resize. The region is manual until the gesture ends.
    /// An active gesture is released first.
    pub fn begin_resize<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: NodeId,
        anchor: ResizeAnchor,
    ) -> Result<(), RegionError> {
        self.require_region(&Snapshot::capture(host), id)?;
        self.finish_active_gesture(host)?;

        let snapshot = Snapshot::capture(host);
        let Some(record) = snapshot.region(id) else {
            return Err(self.note_stale(id));
        };
        host.set_region_mode(id, SizeMode::Manual);
        debug!(%id, ?anchor, "resize started");
        self.gesture = Some(Gesture::Resize {
            region: id,
            anchor,
            start: record.rect,
            previous_mode: record.mode,
        });
        Ok(())
    }

    /// Move the active resize handle to `pointer`
    pub fn resize_tick<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        pointer: Point,
    ) -> Result<PassReport, RegionError> {
        let Some(Gesture::Resize {
            region,
            anchor,
            start,
            ..
        }) = self.gesture.clone()
        else {
            return Err(RegionError::NoActiveGesture);
        };

        let snapshot = Snapshot::capture(host);
        let Some(record) = snapshot.region(region) else {
            self.gesture = None;
            return Err(self.note_stale(region));
        };

        let grid = self.settings.grid_snap;
        let pointer = if grid > 0.0 {
            Point::new(
                grid * (pointer.x / grid).round(),
                grid * (pointer.y / grid).round(),
            )
        } else {
            pointer
        };
        let rect = clamp_to_min(
            anchor.drag(start, pointer),
            record.padding.header,
            &self.settings,
            anchor.moves_left(),
            anchor.moves_top(),
        );
        host.set_region_rect(region, rect);
        Ok(self.run_pass(host, &BTreeSet::new()))
    }

    /// Release a drag. The moved rectangles stay as the last tick left them
    /// and the next tick settles everything else.
    pub fn end_drag(&mut self) -> Result<(), RegionError> {
        match self.gesture.take() {
            Some(Gesture::Drag { region, total, .. }) => {
                debug!(%region, dx = total.dx, dy = total.dy, "drag released");
                self.notifier.rects_changed();
                Ok(())
            }
            other => {
                self.gesture = other;
                Err(RegionError::NoActiveGesture)
            }
        }
    }

    /// Release a resize handle. The region goes back to auto unless it was
    /// manual before or `resize_locks_manual` is set.
    pub fn end_resize<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<PassReport, RegionError> {
        match self.gesture.take() {
            Some(Gesture::Resize {
                region,
                previous_mode,
                ..
            }) => {
                if previous_mode == SizeMode::Auto && !self.settings.resize_locks_manual {
                    host.set_region_mode(region, SizeMode::Auto);
                }
                debug!(%region, "resize released");
                Ok(self.run_pass(host, &BTreeSet::new()))
            }
            other => {
                self.gesture = other;
                Err(RegionError::NoActiveGesture)
            }
        }
    }

    /// Set a region's rectangle directly, as one complete handle resize
    pub fn resize_region<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: NodeId,
        rect: Rect,
    ) -> Result<PassReport, RegionError> {
        self.begin_resize(host, id, ResizeAnchor::BottomRight)?;
        let header = Snapshot::capture(host)
            .region(id)
            .map_or(0.0, |r| r.padding.header);
        let rect = clamp_to_min(rect, header, &self.settings, false, false);
        host.set_region_rect(id, rect);
        self.end_resize(host)
    }
}

fn next_created(snapshot: &Snapshot) -> u64 {
    snapshot
        .regions
        .iter()
        .map(|r| r.created + 1)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::MemoryGraph;
    use crate::settings::Settings;

    fn plain_settings() -> Settings {
        Settings::default()
            .with_padding(10.0, 10.0)
            .with_controls(false)
            .with_header_height(0.0)
            .with_move_empty_regions(false)
    }

    fn fixture(settings: Settings) -> (CommentEngine, MemoryGraph) {
        let engine = CommentEngine::new(settings);
        let graph = MemoryGraph::new().with_notifier(engine.notifier());
        (engine, graph)
    }

    #[test]
    fn test_create_region_wraps_selection() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let a = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = graph.add_node(Rect::new(100.0, 100.0, 50.0, 50.0));

        let region = engine.create_region(&mut graph, &[a, b]).unwrap();

        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(-10.0, -10.0, 170.0, 170.0))
        );
        let members = engine.containment().members(region).unwrap();
        assert!(members.contains(&a) && members.contains(&b));
    }

    #[test]
    fn test_create_region_rejects_bad_selection() {
        let (mut engine, mut graph) = fixture(plain_settings());
        assert_eq!(
            engine.create_region(&mut graph, &[]),
            Err(RegionError::EmptySelection)
        );
        assert_eq!(
            engine.create_region(&mut graph, &[NodeId(99)]),
            Err(RegionError::StaleReference(NodeId(99)))
        );
        assert_eq!(graph.region_count(), 0);
        assert!(engine
            .diagnostics()
            .contains(&Diagnostic::StaleReference { id: NodeId(99) }));
    }

    #[test]
    fn test_create_empty_region_uses_empty_size() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let region = engine.create_empty_region(&mut graph, Point::new(5.0, 5.0));
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(5.0, 5.0, 225.0, 150.0))
        );
        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Auto));
    }

    #[test]
    fn test_drag_moves_members_rigidly() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();

        engine
            .drag_region(
                &mut graph,
                &InteractionContext::default(),
                region,
                Delta::new(25.0, 5.0),
            )
            .unwrap();

        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(15.0, -5.0, 70.0, 70.0))
        );
        assert_eq!(graph.rect_of(node), Some(Rect::new(25.0, 5.0, 50.0, 50.0)));
        assert!(engine.gesture().is_none());
    }

    #[test]
    fn test_drag_leaves_selected_nodes_to_host() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        let ctx = InteractionContext::new().with_selection([node]);

        engine
            .drag_region(&mut graph, &ctx, region, Delta::new(25.0, 5.0))
            .unwrap();

        assert_eq!(graph.rect_of(node), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(15.0, -5.0, 70.0, 70.0))
        );
    }

    #[test]
    fn test_free_move_drags_region_alone() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        let ctx = InteractionContext::new().with_free_move(true);

        engine.begin_drag(&mut graph, &ctx, region).unwrap();
        engine.drag_tick(&mut graph, Delta::new(5.0, 0.0)).unwrap();
        engine.drag_tick(&mut graph, Delta::new(5.0, 0.0)).unwrap();
        match engine.gesture() {
            Some(Gesture::Drag { total, carried, .. }) => {
                assert_eq!(*total, Delta::new(10.0, 0.0));
                assert!(carried.is_empty());
            }
            other => panic!("expected a drag, got {:?}", other),
        }
        engine.end_drag().unwrap();

        assert_eq!(graph.rect_of(node), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(0.0, -10.0, 70.0, 70.0))
        );
    }

    #[test]
    fn test_ticks_without_gesture_fail() {
        let (mut engine, mut graph) = fixture(plain_settings());
        assert_eq!(
            engine.drag_tick(&mut graph, Delta::new(1.0, 1.0)),
            Err(RegionError::NoActiveGesture)
        );
        assert_eq!(
            engine.resize_tick(&mut graph, Point::new(1.0, 1.0)),
            Err(RegionError::NoActiveGesture)
        );
        assert_eq!(engine.end_drag(), Err(RegionError::NoActiveGesture));
    }

    #[test]
    fn test_delete_region_reparents_members() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let inner = engine.create_region(&mut graph, &[node]).unwrap();
        let outer = engine.create_region(&mut graph, &[inner]).unwrap();
        assert_eq!(
            graph.rect_of(outer),
            Some(Rect::new(-20.0, -20.0, 90.0, 90.0))
        );

        engine.delete_region(&mut graph, inner).unwrap();

        assert!(graph.region(inner).is_none());
        assert!(graph.node(node).is_some());
        assert_eq!(
            graph.rect_of(outer),
            Some(Rect::new(-10.0, -10.0, 70.0, 70.0))
        );
        assert_eq!(engine.containment().parent_of(node), Some(outer));
    }

    #[test]
    fn test_delete_rejects_plain_nodes_and_unknown_ids() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(
            engine.delete_region(&mut graph, node),
            Err(RegionError::NotARegion(node))
        );
        assert_eq!(
            engine.delete_region(&mut graph, NodeId(42)),
            Err(RegionError::StaleReference(NodeId(42)))
        );
    }

    #[test]
    fn test_delete_ends_gesture_on_region() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .begin_drag(&mut graph, &InteractionContext::default(), region)
            .unwrap();

        engine.delete_region(&mut graph, region).unwrap();
        assert!(engine.gesture().is_none());
    }

    #[test]
    fn test_drag_tick_after_host_removes_region() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .begin_drag(&mut graph, &InteractionContext::default(), region)
            .unwrap();

        assert!(graph.remove_region(region));
        assert_eq!(
            engine.drag_tick(&mut graph, Delta::new(10.0, 10.0)),
            Err(RegionError::StaleReference(region))
        );

        assert!(engine.gesture().is_none());
        assert_eq!(graph.rect_of(node), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert!(engine
            .diagnostics()
            .contains(&Diagnostic::StaleReference { id: region }));
    }

    #[test]
    fn test_resize_tick_after_host_removes_region() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .begin_resize(&mut graph, region, ResizeAnchor::BottomRight)
            .unwrap();

        assert!(graph.remove_region(region));
        assert_eq!(
            engine.resize_tick(&mut graph, Point::new(300.0, 300.0)),
            Err(RegionError::StaleReference(region))
        );

        assert!(engine.gesture().is_none());
        assert_eq!(graph.rect_of(node), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert_eq!(
            engine.end_resize(&mut graph),
            Err(RegionError::NoActiveGesture)
        );
    }

    #[test]
    fn test_repeated_begin_resize_restores_auto() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();

        engine
            .begin_resize(&mut graph, region, ResizeAnchor::BottomRight)
            .unwrap();
        engine
            .begin_resize(&mut graph, region, ResizeAnchor::TopLeft)
            .unwrap();
        match engine.gesture() {
            Some(Gesture::Resize {
                anchor,
                previous_mode,
                ..
            }) => {
                assert_eq!(*anchor, ResizeAnchor::TopLeft);
                assert_eq!(*previous_mode, SizeMode::Auto);
            }
            other => panic!("expected a resize, got {:?}", other),
        }
        engine.end_resize(&mut graph).unwrap();

        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Auto));
        assert!(engine.gesture().is_none());
    }

    #[test]
    fn test_drag_during_resize_releases_resize() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .begin_resize(&mut graph, region, ResizeAnchor::BottomRight)
            .unwrap();

        engine
            .drag_region(
                &mut graph,
                &InteractionContext::default(),
                region,
                Delta::new(10.0, 0.0),
            )
            .unwrap();

        assert!(engine.gesture().is_none());
        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Auto));
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(0.0, -10.0, 70.0, 70.0))
        );
        assert_eq!(graph.rect_of(node), Some(Rect::new(10.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_resize_during_drag_releases_drag() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .begin_drag(&mut graph, &InteractionContext::default(), region)
            .unwrap();

        engine
            .begin_resize(&mut graph, region, ResizeAnchor::Right)
            .unwrap();

        assert!(matches!(engine.gesture(), Some(Gesture::Resize { .. })));
        assert_eq!(
            engine.drag_tick(&mut graph, Delta::new(1.0, 0.0)),
            Err(RegionError::NoActiveGesture)
        );
    }

    #[test]
    fn test_resize_can_lock_manual() {
        let (mut engine, mut graph) = fixture(plain_settings().with_resize_locks_manual(true));
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();

        engine
            .resize_region(&mut graph, region, Rect::new(-10.0, -10.0, 300.0, 300.0))
            .unwrap();

        let record = graph.region(region).unwrap();
        assert_eq!(record.mode, SizeMode::Manual);
        assert_eq!(record.rect, Rect::new(-10.0, -10.0, 300.0, 300.0));
        assert_eq!(graph.rect_of(node), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_resize_captures_nodes_then_refits() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        let stray = graph.add_node(Rect::new(200.0, 200.0, 20.0, 20.0));

        engine
            .resize_region(&mut graph, region, Rect::new(-10.0, -10.0, 300.0, 300.0))
            .unwrap();

        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Auto));
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(-10.0, -10.0, 240.0, 240.0))
        );
        assert!(engine.containment().members(region).unwrap().contains(&stray));
    }

    #[test]
    fn test_resize_clamps_to_min_size() {
        let (mut engine, mut graph) = fixture(plain_settings().with_resize_locks_manual(true));
        let region = engine.create_empty_region(&mut graph, Point::new(0.0, 0.0));

        engine
            .resize_region(&mut graph, region, Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();

        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(0.0, 0.0, 125.0, 80.0))
        );
    }

    #[test]
    fn test_resize_handle_keeps_opposite_corner() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();

        engine
            .begin_resize(&mut graph, region, ResizeAnchor::TopLeft)
            .unwrap();
        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Manual));
        engine
            .resize_tick(&mut graph, Point::new(-50.0, -50.0))
            .unwrap();

        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(-65.0, -50.0, 125.0, 110.0))
        );
        engine.end_resize(&mut graph).unwrap();
        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Auto));
    }

    #[test]
    fn test_manual_mode_freezes_until_auto() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .set_mode(&mut graph, region, SizeMode::Manual)
            .unwrap();

        graph.set_node_rect(node, Rect::new(5.0, 5.0, 50.0, 50.0));
        engine.settle(&mut graph, &InteractionContext::default(), 8);
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(-10.0, -10.0, 70.0, 70.0))
        );

        engine.set_mode(&mut graph, region, SizeMode::Auto).unwrap();
        assert_eq!(
            graph.rect_of(region),
            Some(Rect::new(-5.0, -5.0, 70.0, 70.0))
        );
    }

    #[test]
    fn test_fit_now_keeps_mode() {
        let (mut engine, mut graph) = fixture(plain_settings());
        let node = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
        let region = engine.create_region(&mut graph, &[node]).unwrap();
        engine
            .set_mode(&mut graph, region, SizeMode::Manual)
            .unwrap();
        graph.set_node_rect(node, Rect::new(5.0, 5.0, 50.0, 50.0));

        let rect = engine.fit_now(&mut graph, region).unwrap();

        assert_eq!(rect, Rect::new(-5.0, -5.0, 70.0, 70.0));
        assert_eq!(graph.region(region).map(|r| r.mode), Some(SizeMode::Manual));
    }

    #[test]
    fn test_anchor_drag_edges() {
        let start = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            ResizeAnchor::Right.drag(start, Point::new(150.0, 999.0)),
            Rect::new(0.0, 0.0, 150.0, 100.0)
        );
        assert_eq!(
            ResizeAnchor::Top.drag(start, Point::new(999.0, -20.0)),
            Rect::new(0.0, -20.0, 100.0, 120.0)
        );
    }
}
