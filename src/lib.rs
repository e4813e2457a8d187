#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod highlight;
pub mod ir;
pub mod observer;
pub mod palette;
pub mod path_dump;
pub mod render;
pub mod routing;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, RoutingConfig, load_config};
pub use diagram::{Diagram, DiagramDocument, RoutedEdge, parse_document};
pub use drag::{DragController, DragEvent, DragSession};
pub use error::RouteError;
pub use geometry::{Anchor, Point, Side, Vector};
pub use highlight::{
    Emphasis, GroupSelection, HighlightState, HoverTracker, SelectionSnapshot, SelectionSource,
    highlight_state,
};
pub use ir::{Edge, MergeDescriptor, NodeBox, RoutingStyle};
pub use observer::RouteObserver;
pub use palette::PairPalette;
pub use routing::{
    AnchorResolver, EdgeAnchors, EdgePath, MergeGroups, PathSegment, PathStrategy, RouteContext,
    compute_path,
};
pub use theme::Theme;
pub use viewport::{CoordinateTransform, Viewport};

/// Routes and renders a document in one call, with no drag in progress.
pub fn render_document(input: &str, config: &Config) -> anyhow::Result<String> {
    let document = parse_document(input)?;
    let diagram = Diagram::from_document(&document);
    let routed = diagram.frame(
        &config.routing,
        &DragController::new(),
        &document.selection,
        document.hovered_group.as_deref(),
    );
    let palette = PairPalette::for_edges(diagram.edges());
    Ok(render::render_svg(&diagram, &routed, &config.theme, &palette, &config.render))
}
