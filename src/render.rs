use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::config::RenderConfig;
use crate::diagram::{Diagram, RoutedEdge};
use crate::geometry::Point;
use crate::highlight::Emphasis;
use crate::palette::PairPalette;
use crate::routing::PathStrategy;
use crate::theme::Theme;

const MIN_CANVAS: f32 = 200.0;
const CHAR_WIDTH_RATIO: f32 = 0.6;

struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    fn include(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }
}

fn canvas_bounds(diagram: &Diagram, routed: &[RoutedEdge], padding: f32) -> (f32, f32, f32, f32) {
    let mut bounds = Bounds::empty();
    for node in diagram.nodes() {
        bounds.include(Point::new(node.x, node.y));
        bounds.include(Point::new(node.x + node.width, node.y + node.height));
    }
    for edge in routed {
        for p in edge.path.points() {
            bounds.include(p);
        }
        if let Some(trunk) = &edge.path.trunk {
            bounds.include(trunk.end);
        }
    }
    if bounds.is_empty() {
        return (0.0, 0.0, MIN_CANVAS, MIN_CANVAS);
    }
    let x = bounds.min_x - padding;
    let y = bounds.min_y - padding;
    let width = (bounds.max_x - bounds.min_x + padding * 2.0).max(MIN_CANVAS);
    let height = (bounds.max_y - bounds.min_y + padding * 2.0).max(MIN_CANVAS);
    (x, y, width, height)
}

fn emphasis_color<'a>(emphasis: Emphasis, base: &'a str, theme: &'a Theme) -> &'a str {
    match emphasis {
        Emphasis::Selected => &theme.selected_color,
        Emphasis::Hovered => &theme.hover_color,
        Emphasis::None => base,
    }
}

/// Renders one frame: edges first, then trunks and merge dots, labels and
/// finally the nodes on top.
pub fn render_svg(
    diagram: &Diagram,
    routed: &[RoutedEdge],
    theme: &Theme,
    palette: &PairPalette,
    config: &RenderConfig,
) -> String {
    let (vx, vy, width, height) = canvas_bounds(diagram, routed, config.padding);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{vx:.2} {vy:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{vx:.2}\" y=\"{vy:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
        config.background
    ));

    svg.push_str("<defs>");
    svg.push_str(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"context-stroke\"/></marker>",
    );
    svg.push_str("</defs>");

    for routed_edge in routed {
        let path = &routed_edge.path;
        let Some(edge) = diagram.edge(&path.edge_id) else {
            continue;
        };
        let base = palette
            .get(&edge.source, &edge.target)
            .unwrap_or(&theme.line_color);
        let (stroke, stroke_width) = if routed_edge.highlight.edge {
            (
                emphasis_color(routed_edge.highlight.emphasis, base, theme),
                theme.emphasized_stroke_width,
            )
        } else {
            (base, theme.stroke_width)
        };
        let marker = if path.strategy == PathStrategy::Merged {
            ""
        } else {
            " marker-end=\"url(#arrow)\""
        };
        svg.push_str(&format!(
            "<path data-edge=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"{marker}/>",
            escape_xml(&edge.id),
            path.to_svg_path(),
        ));
    }

    let mut dotted: HashSet<&str> = HashSet::new();
    for routed_edge in routed {
        let path = &routed_edge.path;
        let highlight = routed_edge.highlight;
        if let Some(trunk) = &path.trunk {
            let stroke = if highlight.shared_trunk {
                emphasis_color(highlight.emphasis, &theme.line_color, theme)
            } else {
                theme.line_color.as_str()
            };
            let stroke_width = if highlight.shared_trunk {
                theme.emphasized_stroke_width
            } else {
                theme.stroke_width
            };
            svg.push_str(&format!(
                "<path data-trunk=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" marker-end=\"url(#arrow)\"/>",
                escape_xml(&trunk.group_id),
                trunk.to_svg_path(),
            ));
        }
        let (Some(merge_point), Some(group)) = (
            path.merge_point,
            diagram.merge_groups().group_of(&path.edge_id),
        ) else {
            continue;
        };
        if !dotted.insert(group.id.as_str()) {
            continue;
        }
        let (fill, radius) = if highlight.merge_dot {
            (
                emphasis_color(highlight.emphasis, &theme.merge_dot_color, theme),
                theme.merge_dot_radius * 1.5,
            )
        } else {
            (theme.merge_dot_color.as_str(), theme.merge_dot_radius)
        };
        svg.push_str(&format!(
            "<circle data-group=\"{}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius:.2}\" fill=\"{fill}\"/>",
            escape_xml(&group.id),
            merge_point.x,
            merge_point.y,
        ));
    }

    for routed_edge in routed {
        let Some(edge) = diagram.edge(&routed_edge.path.edge_id) else {
            continue;
        };
        if let Some(label) = &edge.label {
            svg.push_str(&edge_label_svg(routed_edge.path.label_anchor, label, theme));
        }
        let anchors = routed_edge.multiplicity;
        for (text, at) in [
            (&edge.source_label, anchors.source),
            (&edge.target_label, anchors.target),
        ] {
            if let (Some(text), Some(at)) = (text, at) {
                svg.push_str(&text_svg(at, text, theme, theme.font_size * 0.85));
            }
        }
    }

    for node in diagram.nodes() {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            node.x, node.y, node.width, node.height, theme.node_fill, theme.node_border
        ));
        let label = node.label.as_deref().unwrap_or(&node.id);
        svg.push_str(&text_svg(node.center(), label, theme, theme.font_size));
    }

    svg.push_str("</svg>");
    svg
}

fn text_svg(at: Point, text: &str, theme: &Theme, font_size: f32) -> String {
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{}\">{}</text>",
        at.x,
        at.y,
        escape_xml(&theme.font_family),
        theme.text_color,
        escape_xml(text)
    )
}

fn edge_label_svg(at: Point, label: &str, theme: &Theme) -> String {
    let width = label.chars().count() as f32 * theme.font_size * CHAR_WIDTH_RATIO + 12.0;
    let height = theme.font_size + 8.0;
    let mut out = format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\"/>",
        at.x - width / 2.0,
        at.y - height / 2.0,
        theme.edge_label_background
    );
    out.push_str(&text_svg(at, label, theme, theme.font_size));
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid render size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
