//! SVG snapshot of the current controller state.

use std::fmt::{self, Write as _};

use edgeway_core::path::{CANDIDATE_HANDLE_RADIUS, WAYPOINT_HANDLE_RADIUS};
use edgeway_core::{DiagramController, DiagramOwner, GuideAxis, RenderedEdge};
use kurbo::Rect;

const MARGIN: f64 = 40.0;
const STROKE: &str = "#2d3748";
const SELECTED_STROKE: &str = "#3182ce";
const GUIDE_STROKE: &str = "#e53e3e";

/// Render nodes, edges, handles of selected edges and alignment guides.
pub fn render<O: DiagramOwner>(controller: &DiagramController<O>) -> Result<String, fmt::Error> {
    let edges = controller.render_edges();
    let bounds = content_bounds(controller, &edges).inflate(MARGIN, MARGIN);

    let mut svg = String::new();
    writeln!(
        svg,
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" "#,
            r#"viewBox="{:.0} {:.0} {:.0} {:.0}" font-family="sans-serif">"#,
        ),
        bounds.x0,
        bounds.y0,
        bounds.width(),
        bounds.height()
    )?;

    for node in controller.diagram().nodes_ordered() {
        let rect = node.geometry().bounds();
        writeln!(
            svg,
            concat!(
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" "#,
                r##"rx="6" fill="#f7fafc" stroke="{}" />"##,
            ),
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            STROKE
        )?;
        let center = rect.center();
        writeln!(
            svg,
            concat!(
                r#"  <text x="{:.1}" y="{:.1}" font-size="13" "#,
                r#"text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            ),
            center.x,
            center.y,
            escape_xml(&node.label)
        )?;
    }

    for edge in &edges {
        write_edge(&mut svg, edge)?;
    }

    for guide in controller.alignment_guides().iter() {
        // Clipped to the drawing
        let (x0, y0, x1, y1) = match guide.axis {
            GuideAxis::Horizontal => (bounds.x0, guide.coordinate(), bounds.x1, guide.coordinate()),
            GuideAxis::Vertical => (guide.coordinate(), bounds.y0, guide.coordinate(), bounds.y1),
        };
        writeln!(
            svg,
            concat!(
                r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" "#,
                r#"stroke="{}" stroke-dasharray="4 4" />"#,
            ),
            x0, y0, x1, y1, GUIDE_STROKE
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn write_edge(svg: &mut String, edge: &RenderedEdge) -> fmt::Result {
    let stroke = if edge.selected { SELECTED_STROKE } else { STROKE };
    writeln!(
        svg,
        r#"  <path d="{}" fill="none" stroke="{}" stroke-width="2" />"#,
        edge.svg_path, stroke
    )?;
    writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
        edge.label_position.x,
        edge.label_position.y - 6.0,
        escape_xml(edge.id.as_str())
    )?;

    for handle in &edge.handles {
        writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{:.0}" fill="white" stroke="{}" />"#,
            handle.position.x, handle.position.y, WAYPOINT_HANDLE_RADIUS, SELECTED_STROKE
        )?;
    }
    for candidate in &edge.candidates {
        writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{:.0}" fill="{}" opacity="0.4" />"#,
            candidate.position.x, candidate.position.y, CANDIDATE_HANDLE_RADIUS, SELECTED_STROKE
        )?;
    }
    Ok(())
}

fn content_bounds<O: DiagramOwner>(
    controller: &DiagramController<O>,
    edges: &[RenderedEdge],
) -> Rect {
    let node_rects = controller.diagram().nodes_ordered().map(|node| node.geometry().bounds());
    let edge_rects = edges
        .iter()
        .flat_map(|edge| edge.path.points().iter())
        .map(|point| Rect::from_points(*point, *point));
    node_rects
        .chain(edge_rects)
        .reduce(|acc, rect| acc.union(rect))
        .unwrap_or(Rect::ZERO)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use edgeway_core::{
        Configuration, EdgeId, EdgeSpec, NodePositionChange, NodeSpec, PointerCapture,
    };
    use kurbo::{Point, Size};

    struct NoCapture;

    impl PointerCapture for NoCapture {
        fn capture(&self, _edge: &EdgeId) {}
        fn release(&self, _edge: &EdgeId) {}
    }

    struct NoOwner;

    impl DiagramOwner for NoOwner {
        fn on_open_edge_context_menu(
            &mut self,
            _edge_id: &EdgeId,
            _index: Option<usize>,
            _x: f64,
            _y: f64,
        ) {
        }
    }

    fn controller() -> DiagramController<NoOwner> {
        let mut controller =
            DiagramController::new(NoOwner, Configuration::default(), Rc::new(NoCapture));
        controller.set_content(
            vec![
                NodeSpec {
                    identifier: "a".into(),
                    initial_position: Point::new(0.0, 0.0),
                    label: "dcat:Catalog".to_string(),
                },
                NodeSpec {
                    identifier: "b".into(),
                    initial_position: Point::new(300.0, 0.0),
                    label: "<b>".to_string(),
                },
            ],
            vec![EdgeSpec {
                identifier: "e".into(),
                source: "a".into(),
                target: "b".into(),
                initial_waypoints: vec![Point::new(200.0, 100.0)],
            }],
        );
        controller.set_node_measured(&"a".into(), Size::new(100.0, 40.0));
        controller.set_node_measured(&"b".into(), Size::new(100.0, 40.0));
        controller
    }

    #[test]
    fn test_render_nodes_and_edges() {
        let svg = render(&controller()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(r#"d="M 50,20 L 200,100 L 350,20""#));
        assert!(svg.contains("&lt;b&gt;"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_render_selected_edge_handles() {
        let mut controller = controller();
        controller.select_edge(&"e".into());
        let svg = render(&controller).unwrap();
        // One waypoint handle and two candidates
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn test_render_guides_while_dragging() {
        let mut controller = controller();
        controller.on_node_drag_start(&"b".into());
        controller.on_nodes_change(vec![NodePositionChange::new("b", Point::new(0.0, 300.0))]);
        let svg = render(&controller).unwrap();
        assert!(svg.contains("stroke-dasharray"));
    }
}
