use eframe::egui::{self, Color32, Stroke};

use super::image_cache::ImageCache;
use super::{CanvasTransform, CardLayout, RESIZE_HANDLE};
use crate::board::Board;
use crate::board::geometry::{Point, Rect, Size};
use crate::board::graph::{Node, NodeId, NodeKind};
use crate::theme::Theme;

/// World distance between grid dots.
const GRID_SPACING: f64 = 24.0;
/// Smallest on-screen gap between grid dots, in pixels.
const MIN_DOT_GAP: f64 = 12.0;
const COMPLETED_OPACITY: f32 = 0.6;
const IMAGE_PADDING: f64 = 8.0;

/// A text field inside a card that changed this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CardEdit {
    Title(NodeId, String),
    Content(NodeId, String),
}

pub fn draw_grid(painter: &egui::Painter, rect: egui::Rect, transform: &CanvasTransform, theme: &Theme) {
    // Thin the grid out when zoomed out instead of painting thousands of dots.
    let mut spacing = GRID_SPACING;
    while spacing * transform.viewport.scale < MIN_DOT_GAP {
        spacing *= 2.0;
    }
    let step = spacing * transform.viewport.scale;
    let radius = (1.2 * transform.scale()).max(0.6);
    let visible = transform
        .viewport
        .visible_world_rect(Size::new(rect.width() as f64, rect.height() as f64));
    let first_x = (visible.x / spacing).floor() * spacing;
    let first_y = (visible.y / spacing).floor() * spacing;
    let start = transform.to_screen(Point::new(first_x, first_y));

    let mut y = start.y;
    while y <= rect.bottom() {
        let mut x = start.x;
        while x <= rect.right() {
            painter.circle_filled(egui::pos2(x, y), radius, theme.grid_dot);
            x += step as f32;
        }
        y += step as f32;
    }
}

/// Paint every card and lay out its text fields. Edits are returned rather than applied so
/// the board is not borrowed while drawing.
pub fn draw_cards(
    ui: &mut egui::Ui,
    board: &Board,
    transform: &CanvasTransform,
    theme: &Theme,
    images: &ImageCache,
) -> Vec<CardEdit> {
    let clip = ui.clip_rect();
    let scale = transform.scale();
    let connecting_source = board.session().connecting_source();
    let mut edits = Vec::new();

    for node in board.graph().nodes() {
        let Some(world) = board.live_node_rect(&node.id) else {
            continue;
        };
        let rect = transform.rect_to_screen(world);
        if !rect.intersects(clip) {
            continue;
        }

        let completed = board.task(&node.id).is_some_and(|t| t.completed);
        let opacity = if completed { COMPLETED_OPACITY } else { 1.0 };
        let corner_radius = 12.0 * scale;
        let painter = ui.painter();

        let shadow = Theme::with_opacity(Color32::BLACK, 0.08 * opacity);
        painter.rect_filled(rect.translate(egui::vec2(0.0, 3.0 * scale)), corner_radius, shadow);

        let fill = match node.kind {
            NodeKind::Text => Theme::card_fill(node.color.as_deref()),
            NodeKind::Image => Color32::WHITE,
        };
        painter.rect_filled(rect, corner_radius, Theme::with_opacity(fill, opacity));

        let selected = board.selected() == Some(node.id.as_str())
            || connecting_source == Some(node.id.as_str());
        let border = if selected {
            Stroke::new(2.5 * scale.max(0.5), theme.accent)
        } else if completed {
            Stroke::new(2.0 * scale, theme.completed)
        } else {
            Stroke::new(1.0, theme.card_border)
        };
        painter.rect_stroke(rect, corner_radius, border, egui::StrokeKind::Outside);

        let layout = CardLayout::for_card(world);
        match node.kind {
            NodeKind::Text => {
                draw_text_fields(ui, node, &layout, transform, theme, opacity, &mut edits)
            }
            NodeKind::Image => draw_image(ui, node, world, transform, images, opacity),
        }

        if completed {
            draw_completed_badge(ui.painter(), rect, scale, theme);
        }
        draw_resize_grip(ui.painter(), transform.rect_to_screen(layout.handle), scale, theme);
    }
    edits
}

fn draw_text_fields(
    ui: &mut egui::Ui,
    node: &Node,
    layout: &CardLayout,
    transform: &CanvasTransform,
    theme: &Theme,
    opacity: f32,
    edits: &mut Vec<CardEdit>,
) {
    let scale = transform.scale();
    let text_color = Theme::with_opacity(theme.card_text, opacity);
    let clip = ui.clip_rect();

    let title_rect = transform.rect_to_screen(layout.title);
    let mut title = node.title.clone().unwrap_or_default();
    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(title_rect));
    child.set_clip_rect(title_rect.intersect(clip));
    let response = child.add_sized(
        title_rect.size(),
        egui::TextEdit::singleline(&mut title)
            .id(egui::Id::new(("card-title", &node.id)))
            .font(egui::FontId::proportional(17.0 * scale))
            .text_color(text_color)
            .hint_text("Untitled")
            .frame(false)
            .margin(egui::Margin::ZERO),
    );
    if response.changed() {
        edits.push(CardEdit::Title(node.id.clone(), title));
    }

    let content_rect = transform.rect_to_screen(layout.content);
    if content_rect.height() < 4.0 {
        return;
    }
    let mut content = node.content.clone();
    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(content_rect));
    child.set_clip_rect(content_rect.intersect(clip));
    let response = child.add_sized(
        content_rect.size(),
        egui::TextEdit::multiline(&mut content)
            .id(egui::Id::new(("card-content", &node.id)))
            .font(egui::FontId::proportional(14.0 * scale))
            .text_color(Theme::with_opacity(theme.card_text, 0.8 * opacity))
            .hint_text("Type something...")
            .frame(false)
            .margin(egui::Margin::ZERO),
    );
    if response.changed() {
        edits.push(CardEdit::Content(node.id.clone(), content));
    }
}

fn draw_image(
    ui: &egui::Ui,
    node: &Node,
    world: Rect,
    transform: &CanvasTransform,
    images: &ImageCache,
    opacity: f32,
) {
    let inner = transform.rect_to_screen(world).shrink(IMAGE_PADDING as f32 * transform.scale());
    let tint = Theme::with_opacity(Color32::WHITE, opacity);
    match images.get_or_load(ui.ctx(), &node.id, &node.content) {
        Some(texture) => {
            // Fit inside the card, keeping the aspect ratio.
            let size = texture.size_vec2();
            let fit = (inner.width() / size.x).min(inner.height() / size.y);
            let draw_rect = egui::Rect::from_center_size(inner.center(), size * fit);
            ui.painter().image(
                texture.id(),
                draw_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                tint,
            );
        }
        None => {
            let galley = ui.painter().layout_no_wrap(
                "Image unavailable".to_string(),
                egui::FontId::proportional(14.0 * transform.scale()),
                Color32::GRAY,
            );
            let pos = inner.center() - galley.rect.size() / 2.0;
            ui.painter().galley(pos, galley, Color32::GRAY);
        }
    }
}

fn draw_completed_badge(painter: &egui::Painter, card: egui::Rect, scale: f32, theme: &Theme) {
    let radius = 11.0 * scale;
    let center = egui::pos2(card.right() - 4.0 * scale, card.top() + 4.0 * scale);
    painter.circle_filled(center, radius, theme.completed);
    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        "✓",
        egui::FontId::proportional(13.0 * scale),
        Color32::WHITE,
    );
}

/// Three short diagonal strokes in the corner.
fn draw_resize_grip(painter: &egui::Painter, handle: egui::Rect, scale: f32, theme: &Theme) {
    let stroke = Stroke::new(1.5 * scale.max(0.5), Theme::with_opacity(theme.muted, 0.6));
    let corner = handle.right_bottom() - egui::vec2(5.0, 5.0) * scale;
    let unit = (RESIZE_HANDLE as f32 * scale) / 4.0;
    for i in 1..=3 {
        let d = unit * i as f32;
        painter.line_segment(
            [corner - egui::vec2(d, 0.0), corner - egui::vec2(0.0, d)],
            stroke,
        );
    }
}
