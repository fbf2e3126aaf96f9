//! The region engine: containment resolution, auto bounds and interaction
//!
//! [`CommentEngine`] keeps the derived state (membership, nesting, the active
//! gesture) and drives the host through [`GraphHost`]. Every command runs a
//! full resolution-then-recompute pass before returning. Change notifications
//! that the host fires while a pass is writing rectangles are not acted on
//! inline; they leave the notifier pending and the next [`CommentEngine::tick`]
//! picks them up.

pub mod bounds;
pub mod collision;
pub mod containment;
pub mod error;
pub mod interaction;
pub mod report;

pub use bounds::{compute_auto_bounds, fit_rect, BoundsUpdate};
pub use containment::{resolve, Containment, RegionState, Snapshot};
pub use error::{Diagnostic, RegionError};
pub use interaction::{Gesture, InteractionContext, ResizeAnchor};
pub use report::render_report;

use std::collections::BTreeSet;

use tracing::debug;

use crate::host::{ChangeNotifier, GraphHost};
use crate::region::NodeId;
use crate::settings::{CollisionMethod, Settings};

/// What a single resolution pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Regions whose rectangle was rewritten by the bounds step
    pub updated: Vec<NodeId>,
    /// Notifications received while the pass was writing
    pub deferred: u32,
}

/// What a frame tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// The deferred pass, if one was pending
    pub pass: Option<PassReport>,
    /// Empty regions pushed away from others this tick
    pub nudged: Vec<NodeId>,
}

impl TickReport {
    /// Nothing happened: no pass ran and nothing moved
    pub fn is_idle(&self) -> bool {
        self.pass.is_none() && self.nudged.is_empty()
    }
}

/// Keeps comment regions sized and grouped around their members
#[derive(Debug)]
pub struct CommentEngine {
    settings: Settings,
    containment: Containment,
    diagnostics: Vec<Diagnostic>,
    notifier: ChangeNotifier,
    gesture: Option<Gesture>,
}

impl Default for CommentEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl CommentEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            containment: Containment::default(),
            diagnostics: Vec::new(),
            notifier: ChangeNotifier::new(),
            gesture: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle for the host's "rects changed" hook
    pub fn notifier(&self) -> ChangeNotifier {
        self.notifier.clone()
    }

    /// Membership and nesting from the last pass
    pub fn containment(&self) -> &Containment {
        &self.containment
    }

    /// Conditions corrected during the last pass or command
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Recompute membership and nesting without touching any rectangle
    pub fn resolve_containment<H: GraphHost + ?Sized>(&mut self, host: &H) -> &Containment {
        let snapshot = Snapshot::capture(host);
        let (containment, diagnostics) = resolve(&snapshot, &self.settings);
        self.containment = containment;
        self.diagnostics = diagnostics;
        &self.containment
    }

    /// Refit every auto region using the membership from the last resolution
    pub fn recompute_auto_bounds<H: GraphHost + ?Sized>(&mut self, host: &mut H) -> PassReport {
        let snapshot = Snapshot::capture(host);
        self.notifier.enter_pass();
        let updates =
            compute_auto_bounds(&snapshot, &self.containment, &self.settings, &BTreeSet::new());
        let updated = self.apply_updates(host, &updates);
        self.finish_pass(updated)
    }

    /// Entry point for the host's change hook when it wants a synchronous pass
    pub fn on_rects_changed<H: GraphHost + ?Sized>(&mut self, host: &mut H) -> PassReport {
        if self.notifier.is_in_pass() {
            self.notifier.rects_changed();
            self.diagnostics
                .push(Diagnostic::ReentrantResolution { deferred: 1 });
            return PassReport {
                updated: Vec::new(),
                deferred: 1,
            };
        }
        self.run_pass(host, &BTreeSet::new())
    }

    /// One host frame: run the deferred pass if changes are pending, then push
    /// empty regions out of the way. With `ctx.alt_collision` set the pass
    /// resolves membership with `Settings::alt_collision`.
    pub fn tick<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &InteractionContext,
    ) -> TickReport {
        let mut report = TickReport::default();
        if self.notifier.is_pending() {
            let collision = if ctx.alt_collision {
                self.settings.alt_collision
            } else {
                self.settings.collision
            };
            report.pass = Some(self.run_pass_with(host, &BTreeSet::new(), collision));
        }
        if self.settings.move_empty_regions && self.gesture.is_none() {
            report.nudged = self.nudge_empty_regions(host, ctx);
        }
        report
    }

    /// Tick until nothing is pending, at most `max_ticks` times. Returns the
    /// number of ticks that did any work.
    pub fn settle<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &InteractionContext,
        max_ticks: usize,
    ) -> usize {
        let mut busy = 0;
        for _ in 0..max_ticks {
            if self.tick(host, ctx).is_idle() {
                break;
            }
            busy += 1;
        }
        busy
    }

    /// Resolution followed by the bounds step. Regions in `skip` keep their
    /// rectangle.
    pub(crate) fn run_pass<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        skip: &BTreeSet<NodeId>,
    ) -> PassReport {
        self.run_pass_with(host, skip, self.settings.collision)
    }

    fn run_pass_with<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        skip: &BTreeSet<NodeId>,
        collision: CollisionMethod,
    ) -> PassReport {
        self.notifier.take_pending();
        self.notifier.enter_pass();

        let snapshot = Snapshot::capture(host);
        let alternate;
        let settings = if collision == self.settings.collision {
            &self.settings
        } else {
            debug!(?collision, "pass with alternate collision");
            alternate = self.settings.clone().with_collision(collision);
            &alternate
        };
        let (containment, diagnostics) = resolve(&snapshot, settings);
        self.containment = containment;
        self.diagnostics = diagnostics;

        let updates = compute_auto_bounds(&snapshot, &self.containment, settings, skip);
        let updated = self.apply_updates(host, &updates);
        self.finish_pass(updated)
    }

    fn apply_updates<H: GraphHost + ?Sized>(
        &mut self,
        host: &mut H,
        updates: &[BoundsUpdate],
    ) -> Vec<NodeId> {
        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            if host.set_region_rect(update.id, update.rect) {
                updated.push(update.id);
            } else {
                self.diagnostics
                    .push(Diagnostic::StaleReference { id: update.id });
            }
        }
        updated
    }

    fn finish_pass(&mut self, updated: Vec<NodeId>) -> PassReport {
        let deferred = self.notifier.exit_pass();
        if deferred > 0 {
            debug!(deferred, "change notifications deferred to next tick");
            self.diagnostics
                .push(Diagnostic::ReentrantResolution { deferred });
        }
        // Moving regions can change membership; settle on the next tick even
        // when the host does not fire the notifier itself.
        if !updated.is_empty() {
            self.notifier.rects_changed();
        }
        debug!(updated = updated.len(), "pass complete");
        PassReport { updated, deferred }
    }

    fn note_stale(&mut self, id: NodeId) -> RegionError {
        debug!(%id, "command targets an id the host no longer has");
        self.diagnostics.push(Diagnostic::StaleReference { id });
        RegionError::StaleReference(id)
    }
}
