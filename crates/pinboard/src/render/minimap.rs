use eframe::egui::{self, Stroke};

use crate::board::Board;
use crate::board::geometry::{Point, Rect, Viewport};
use crate::board::minimap::MinimapProjection;
use crate::theme::Theme;

const MARGIN: f32 = 24.0;

fn to_egui(origin: egui::Pos2, rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

/// Overview in the bottom-left corner of the canvas. Returns the viewport to switch to
/// when the map was clicked.
pub fn show(
    ctx: &egui::Context,
    canvas: egui::Rect,
    board: &Board,
    projection: &MinimapProjection,
    theme: &Theme,
) -> Option<Viewport> {
    let size = egui::vec2(
        projection.map_size.width as f32,
        projection.map_size.height as f32,
    );
    let pos = egui::pos2(canvas.left() + MARGIN, canvas.bottom() - MARGIN - size.y);

    egui::Area::new(egui::Id::new("minimap"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
            let painter = ui.painter_at(rect);
            let origin = rect.min;

            painter.rect_filled(rect, 8.0, theme.minimap_background);
            let cross = Stroke::new(1.0, Theme::with_opacity(theme.muted, 0.3));
            painter.line_segment(
                [rect.center_top(), rect.center_bottom()],
                cross,
            );
            painter.line_segment(
                [rect.left_center(), rect.right_center()],
                cross,
            );

            for node in projection.project_nodes(board) {
                let node_rect = to_egui(origin, node.rect);
                painter.rect_filled(node_rect, 1.0, Theme::card_fill(node.color.as_deref()));
                painter.rect_stroke(
                    node_rect,
                    1.0,
                    Stroke::new(0.5, Theme::with_opacity(theme.muted, 0.5)),
                    egui::StrokeKind::Inside,
                );
            }

            let viewport = board.viewport();
            let indicator = to_egui(
                origin,
                projection.viewport_indicator(&viewport, board.canvas_size()),
            );
            painter.rect_filled(indicator, 2.0, Theme::with_opacity(theme.accent, 0.1));
            painter.rect_stroke(
                indicator,
                2.0,
                Stroke::new(2.0, theme.accent),
                egui::StrokeKind::Inside,
            );
            painter.rect_stroke(
                rect,
                8.0,
                Stroke::new(1.0, theme.panel_border),
                egui::StrokeKind::Inside,
            );

            let response = response.on_hover_cursor(egui::CursorIcon::Crosshair);
            if !response.clicked() {
                return None;
            }
            let click = response.interact_pointer_pos()?;
            let map_point = Point::new((click.x - origin.x) as f64, (click.y - origin.y) as f64);
            Some(projection.recenter(&viewport, map_point, board.canvas_size()))
        })
        .inner
}
