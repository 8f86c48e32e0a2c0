//! Call graph rendering: circular layout, SVG and Graphviz DOT
//!
//! The SVG drawing places nodes on a circle in insertion order, pulls every
//! position toward the centre by a fixed factor so edges read shorter, and
//! keeps a fixed square canvas spanning [-1, 1] × [-1, 1]. The factor changes
//! only edge length on screen, never the layout order.

use crate::call_graph::CallGraph;
use std::f64::consts::PI;
use std::fmt::Write;

/// Default shrink factor applied to the unit-circle layout
pub const LAYOUT_SCALE: f64 = 0.25;

/// Position of a node in layout coordinates (y grows upward)
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Place nodes on a circle of radius `scale`, node `i` of `n` at angle 2πi/n
///
/// A single node sits at the origin.
pub fn circular_layout(graph: &CallGraph, scale: f64) -> Vec<NodePosition> {
    let n = graph.node_count();

    graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let (x, y) = if n == 1 {
                (0.0, 0.0)
            } else {
                let theta = 2.0 * PI * i as f64 / n as f64;
                (theta.cos() * scale, theta.sin() * scale)
            };
            NodePosition {
                label: label.clone(),
                x,
                y,
            }
        })
        .collect()
}

/// SVG renderer for call graphs
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    /// Shrink factor toward the centre
    pub scale: f64,
    /// Side of the square canvas in pixels
    pub canvas_px: u32,
    /// Node radius in layout units
    pub node_radius: f64,
    pub node_color: String,
    /// Label size in layout units
    pub font_size: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            scale: LAYOUT_SCALE,
            canvas_px: 350,
            node_radius: 0.14,
            node_color: "#fff9c4".to_string(),
            font_size: 0.055,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Render the graph as a standalone SVG document
    pub fn render(&self, graph: &CallGraph) -> String {
        let layout = circular_layout(graph, self.scale);
        let position = |label: &str| {
            layout
                .iter()
                .find(|p| p.label == label)
                .map(|p| (p.x, -p.y))
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{px}" height="{px}" viewBox="-1 -1 2 2" preserveAspectRatio="xMidYMid meet">"#,
            px = self.canvas_px
        );
        svg.push_str(
            r#"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10" fill="none" stroke="black"/></marker></defs>"#,
        );
        svg.push('\n');

        for edge in graph.edges() {
            let (Some(from), Some(to)) = (position(&edge.caller), position(&edge.receiver)) else {
                continue;
            };
            let title = format!(
                "{} → {} ({} calls)",
                escape_xml(&edge.caller),
                escape_xml(&edge.receiver),
                edge.weight
            );

            if edge.caller == edge.receiver {
                let r = self.node_radius;
                let _ = writeln!(
                    svg,
                    r#"<path d="M {:.4} {:.4} C {:.4} {:.4} {:.4} {:.4} {:.4} {:.4}" fill="none" stroke="black" stroke-width="0.006" marker-end="url(#arrow)"><title>{}</title></path>"#,
                    from.0 - r * 0.5,
                    from.1 - r * 0.85,
                    from.0 - r * 1.5,
                    from.1 - r * 2.5,
                    from.0 + r * 1.5,
                    from.1 - r * 2.5,
                    from.0 + r * 0.5,
                    from.1 - r * 0.85,
                    title
                );
                continue;
            }

            let (dx, dy) = (to.0 - from.0, to.1 - from.1);
            let len = (dx * dx + dy * dy).sqrt();
            // Overlapping circles: draw centre to centre
            let trim = if len > 2.0 * self.node_radius {
                self.node_radius
            } else {
                0.0
            };
            let (ux, uy) = if len > 0.0 {
                (dx / len, dy / len)
            } else {
                (0.0, 0.0)
            };

            let _ = writeln!(
                svg,
                r#"<line x1="{:.4}" y1="{:.4}" x2="{:.4}" y2="{:.4}" stroke="black" stroke-width="0.006" marker-end="url(#arrow)"><title>{}</title></line>"#,
                from.0 + ux * trim,
                from.1 + uy * trim,
                to.0 - ux * trim,
                to.1 - uy * trim,
                title
            );
        }

        for node in &layout {
            let _ = writeln!(
                svg,
                r#"<circle cx="{:.4}" cy="{:.4}" r="{:.4}" fill="{}"/>"#,
                node.x,
                -node.y,
                self.node_radius,
                self.node_color
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.4}" y="{:.4}" font-size="{:.4}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif">{}</text>"#,
                node.x,
                -node.y,
                self.font_size,
                escape_xml(&node.label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Graphviz DOT document with call counts as edge weights and labels
pub fn to_dot(graph: &CallGraph) -> String {
    let mut dot = String::from("digraph calls {\n");

    for node in graph.nodes() {
        let _ = writeln!(dot, "    \"{}\";", escape_dot(node));
    }

    for edge in graph.edges() {
        let _ = writeln!(
            dot,
            "    \"{}\" -> \"{}\" [weight={}, label=\"{}\"];",
            escape_dot(&edge.caller),
            escape_dot(&edge.receiver),
            edge.weight,
            edge.weight
        );
    }

    dot.push_str("}\n");
    dot
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> CallGraph {
        CallGraph::from_dyads(vec![("A", "B"), ("A", "B"), ("B", "C")]).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_layout_empty_and_single() {
        assert!(circular_layout(&CallGraph::empty(), LAYOUT_SCALE).is_empty());

        let single = CallGraph::from_dyads(vec![("A", "A")]).unwrap();
        let layout = circular_layout(&single, LAYOUT_SCALE);
        assert_eq!(layout.len(), 1);
        assert_eq!((layout[0].x, layout[0].y), (0.0, 0.0));
    }

    #[test]
    fn test_layout_circle_order_and_scale() {
        let layout = circular_layout(&triangle(), LAYOUT_SCALE);
        let labels: Vec<&str> = layout.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);

        assert!(close(layout[0].x, 0.25));
        assert!(close(layout[0].y, 0.0));
        assert!(close(layout[1].x, -0.125));
        assert!(close(layout[1].y, 0.25 * (3f64).sqrt() / 2.0));

        for p in &layout {
            assert!(close((p.x * p.x + p.y * p.y).sqrt(), 0.25));
        }
    }

    #[test]
    fn test_layout_scale_preserves_angles() {
        let full = circular_layout(&triangle(), 1.0);
        let shrunk = circular_layout(&triangle(), LAYOUT_SCALE);
        for (a, b) in full.iter().zip(shrunk.iter()) {
            assert!(close(a.x * LAYOUT_SCALE, b.x));
            assert!(close(a.y * LAYOUT_SCALE, b.y));
        }
    }

    #[test]
    fn test_svg_fixed_canvas() {
        let svg = SvgRenderer::new().render(&triangle());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="-1 -1 2 2""#));
        assert!(svg.contains(r#"width="350" height="350""#));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains("marker-end=\"url(#arrow)\""));
        assert!(svg.contains("#fff9c4"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_escapes_labels() {
        let graph = CallGraph::from_dyads(vec![("<A&B>", "C")]).unwrap();
        let svg = SvgRenderer::new().render(&graph);
        assert!(svg.contains("&lt;A&amp;B&gt;"));
        assert!(!svg.contains("<A&B>"));
    }

    #[test]
    fn test_svg_self_loop_is_path() {
        let graph = CallGraph::from_dyads(vec![("A", "A"), ("A", "B")]).unwrap();
        let svg = SvgRenderer::new().render(&graph);
        assert_eq!(svg.matches("<path d=\"M ").count(), 1);
        assert_eq!(svg.matches("<line").count(), 1);
    }

    #[test]
    fn test_svg_draws_every_edge_on_crowded_circle() {
        let ring = vec![
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("D", "E"),
            ("E", "F"),
            ("F", "A"),
        ];
        let graph = CallGraph::from_dyads(ring).unwrap();
        assert_eq!(graph.edge_count(), 6);

        let svg = SvgRenderer::new().render(&graph);
        assert_eq!(svg.matches("<line").count(), 6);
        assert_eq!(svg.matches("marker-end=\"url(#arrow)\"").count(), 6);
    }

    #[test]
    fn test_svg_overlapping_nodes_join_centres() {
        let graph = CallGraph::from_dyads(vec![("A", "B")]).unwrap();
        let svg = SvgRenderer::new().with_scale(0.1).render(&graph);

        // A sits at (0.1, 0) and B at (-0.1, 0), closer than two radii
        let line = svg.lines().find(|l| l.starts_with("<line")).unwrap();
        assert!(line.contains(r#"x1="0.1000""#));
        assert!(line.contains(r#"x2="-0.1000""#));
    }

    #[test]
    fn test_dot_output() {
        let dot = to_dot(&triangle());
        assert!(dot.starts_with("digraph calls {"));
        assert!(dot.contains("\"A\" -> \"B\" [weight=2, label=\"2\"];"));
        assert!(dot.contains("\"B\" -> \"C\" [weight=1, label=\"1\"];"));
        assert!(dot.contains("    \"C\";"));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let graph = CallGraph::from_dyads(vec![("say \"hi\"", "B")]).unwrap();
        assert!(to_dot(&graph).contains("\"say \\\"hi\\\"\""));
    }
}
