//! Autosize Comments - comment regions that follow the nodes they enclose
//!
//! This library keeps rectangular comment regions in a node-graph editor
//! sized around their members. It works out which nodes and regions each
//! region encloses, refits auto-sized regions after every edit, and carries
//! members along when a region is dragged.
//!
//! # Example
//!
//! ```rust
//! use autosize_comments::{CommentEngine, MemoryGraph, Rect, Settings};
//!
//! let mut engine = CommentEngine::new(Settings::default().with_controls(false));
//! let mut graph = MemoryGraph::new().with_notifier(engine.notifier());
//! let a = graph.add_node(Rect::new(0.0, 0.0, 50.0, 50.0));
//! let b = graph.add_node(Rect::new(100.0, 100.0, 50.0, 50.0));
//!
//! let region = engine.create_region(&mut graph, &[a, b]).unwrap();
//! assert!(engine.containment().members(region).unwrap().contains(&a));
//! ```

pub mod engine;
pub mod geometry;
pub mod host;
pub mod region;
pub mod scene;
pub mod settings;

pub use engine::{
    render_report, CommentEngine, Containment, Diagnostic, Gesture, InteractionContext,
    PassReport, RegionError, ResizeAnchor, Snapshot, TickReport,
};
pub use geometry::{Delta, Padding, Point, Rect};
pub use host::{ChangeNotifier, GraphHost, MemoryGraph, Spatial};
pub use region::{NodeId, NodeKind, NodeRect, RegionDraft, RegionPadding, RegionRecord, SizeMode};
pub use scene::{Scene, SceneError};
pub use settings::{CollisionMethod, Settings, SettingsError};

/// Load a scene, let the engine settle it and return the resulting report
///
/// The returned graph holds the settled rectangles.
pub fn settle_scene(
    scene: Scene,
    settings: Settings,
    max_ticks: usize,
) -> (MemoryGraph, CommentEngine, String) {
    let mut engine = CommentEngine::new(settings);
    let mut graph = scene.into_graph();
    graph.attach_notifier(engine.notifier());
    engine.notifier().rects_changed();
    engine.settle(&mut graph, &InteractionContext::default(), max_ticks);

    let snapshot = Snapshot::capture(&graph);
    let report = render_report(&snapshot, engine.containment(), engine.diagnostics());
    (graph, engine, report)
}
