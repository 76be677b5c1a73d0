use eframe::egui::{self, Color32, Shape, Stroke};

use super::CanvasTransform;
use crate::board::edges::{EdgeGeometry, EdgeMarker, GLYPH_SIZE, STROKE_WIDTH};
use crate::board::geometry::Point;
use crate::theme::Theme;

/// Dash pattern for the rubber-band line while connecting.
const CONNECTING_DASH: (f32, f32) = (6.0, 4.0);

pub fn draw_edges(
    painter: &egui::Painter,
    routes: &[EdgeGeometry],
    selected: Option<&str>,
    transform: &CanvasTransform,
    theme: &Theme,
) {
    for route in routes {
        let is_selected = selected == Some(route.edge_id.as_str());
        draw_edge(painter, route, is_selected, transform, theme);
    }
}

fn draw_edge(
    painter: &egui::Painter,
    route: &EdgeGeometry,
    selected: bool,
    transform: &CanvasTransform,
    theme: &Theme,
) {
    let scale = transform.scale();
    let color = if selected {
        theme.accent
    } else {
        theme.edge_color(&route.color)
    };
    let width = (STROKE_WIDTH as f32 * scale).max(1.0) * if selected { 1.5 } else { 1.0 };
    let stroke = Stroke::new(width, color);
    let start = transform.to_screen(route.start);
    let end = transform.to_screen(route.end);

    match route.dash {
        Some((dash, gap)) => painter.extend(Shape::dashed_line(
            &[start, end],
            stroke,
            dash as f32 * scale,
            gap as f32 * scale,
        )),
        None => {
            painter.line_segment([start, end], stroke);
        }
    }

    painter.add(Shape::convex_polygon(
        vec![
            transform.to_screen(route.arrow.tip),
            transform.to_screen(route.arrow.left),
            transform.to_screen(route.arrow.right),
        ],
        color,
        Stroke::NONE,
    ));

    match &route.marker {
        EdgeMarker::Label { rect, text } => {
            let screen = transform.rect_to_screen(*rect);
            painter.rect_filled(screen, 8.0 * scale, theme.toolbar_background);
            painter.rect_stroke(
                screen,
                8.0 * scale,
                Stroke::new(1.5 * scale.max(0.5), color),
                egui::StrokeKind::Inside,
            );
            painter.text(
                screen.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(13.0 * scale),
                theme.foreground,
            );
        }
        EdgeMarker::Glyph { center, angle } => {
            draw_chevron(painter, *center, *angle, stroke, transform);
        }
    }
}

/// A `>` pointing along `angle`, centered on the midpoint.
fn draw_chevron(
    painter: &egui::Painter,
    center: Point,
    angle: f64,
    stroke: Stroke,
    transform: &CanvasTransform,
) {
    let half = GLYPH_SIZE / 4.0;
    let (sin, cos) = angle.sin_cos();
    let rotate = |dx: f64, dy: f64| {
        transform.to_screen(Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        ))
    };
    let tip = rotate(half, 0.0);
    painter.add(Shape::line(
        vec![rotate(-half, -half), tip, rotate(-half, half)],
        stroke,
    ));
}

/// The virtual edge from the source card to the pointer while connecting.
pub fn draw_connecting_line(
    painter: &egui::Painter,
    from: Point,
    to: Point,
    transform: &CanvasTransform,
    theme: &Theme,
) {
    let scale = transform.scale();
    let stroke = Stroke::new((STROKE_WIDTH as f32 * scale).max(1.0), theme.accent);
    let start = transform.to_screen(from);
    let end = transform.to_screen(to);
    painter.extend(Shape::dashed_line(
        &[start, end],
        stroke,
        CONNECTING_DASH.0 * scale.max(0.5),
        CONNECTING_DASH.1 * scale.max(0.5),
    ));
    painter.circle_filled(end, 4.0, Theme::with_opacity(theme.accent, 0.8));
    painter.circle_stroke(start, 6.0 * scale, Stroke::new(1.5, Color32::WHITE));
}
