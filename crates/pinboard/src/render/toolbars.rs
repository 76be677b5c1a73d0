//! Floating toolbars drawn over the canvas. They report what was clicked and leave the
//! board untouched; the app applies the actions after the frame is laid out.

use eframe::egui::{self, Color32, Stroke};

use super::CanvasTransform;
use crate::board::Board;
use crate::board::edges::{DEFAULT_EDGE_COLOR, EdgeGeometry};
use crate::board::graph::{EdgeId, EdgePatch, EdgeStyle, MAX_LABEL_LEN, NodeId, NodeKind};
use crate::board::interaction::ZoomCommand;
use crate::theme::{EDGE_COLORS, NODE_COLORS, Theme, parse_hex};

const TOOLBAR_GAP: f32 = 8.0;
const SWATCH_SIZE: f32 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    Zoom(ZoomCommand),
    PasteImage,
    StartConnecting(NodeId),
    ResetSize(NodeId),
    DeleteNode(NodeId),
    SetColor(NodeId, String),
    UpdateEdge(EdgeId, EdgePatch),
    DeleteEdge(EdgeId),
    CloseEdgeToolbar,
}

fn toolbar_frame(ui: &egui::Ui, theme: &Theme) -> egui::Frame {
    egui::Frame::popup(ui.style())
        .fill(theme.toolbar_background)
        .stroke(Stroke::new(1.0, theme.panel_border))
        .corner_radius(egui::CornerRadius::same(10))
        .inner_margin(egui::Margin::symmetric(8, 6))
}

/// `−  85%  +  Reset`, centered along the top edge of the canvas.
pub fn zoom_toolbar(
    ctx: &egui::Context,
    canvas: egui::Rect,
    scale: f64,
    theme: &Theme,
    actions: &mut Vec<ToolbarAction>,
) {
    egui::Area::new(egui::Id::new("zoom-toolbar"))
        .order(egui::Order::Foreground)
        .pivot(egui::Align2::CENTER_TOP)
        .fixed_pos(egui::pos2(canvas.center().x, canvas.top() + 16.0))
        .show(ctx, |ui| {
            toolbar_frame(ui, theme).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("−").on_hover_text("Zoom out (Alt -)").clicked() {
                        actions.push(ToolbarAction::Zoom(ZoomCommand::Out));
                    }
                    ui.label(
                        egui::RichText::new(format!("{}%", (scale * 100.0).round()))
                            .color(theme.foreground)
                            .strong(),
                    );
                    if ui.button("+").on_hover_text("Zoom in (Alt +)").clicked() {
                        actions.push(ToolbarAction::Zoom(ZoomCommand::In));
                    }
                    if ui.button("Reset").on_hover_text("Reset zoom (Alt 0)").clicked() {
                        actions.push(ToolbarAction::Zoom(ZoomCommand::Reset));
                    }
                    ui.separator();
                    if ui
                        .button("Paste image")
                        .on_hover_text("Add the image on the clipboard as a card")
                        .clicked()
                    {
                        actions.push(ToolbarAction::PasteImage);
                    }
                });
            });
        });
}

/// Card actions, docked to the left of the selected card.
pub fn node_toolbar(
    ctx: &egui::Context,
    board: &Board,
    transform: &CanvasTransform,
    theme: &Theme,
    actions: &mut Vec<ToolbarAction>,
) {
    let Some(id) = board.selected() else {
        return;
    };
    if !board.session().is_idle() {
        return;
    }
    let (Some(node), Some(world)) = (board.graph().node(id), board.live_node_rect(id)) else {
        return;
    };
    let card = transform.rect_to_screen(world);

    egui::Area::new(egui::Id::new("node-toolbar"))
        .order(egui::Order::Foreground)
        .pivot(egui::Align2::RIGHT_TOP)
        .fixed_pos(egui::pos2(card.left() - TOOLBAR_GAP, card.top()))
        .show(ctx, |ui| {
            toolbar_frame(ui, theme).show(ui, |ui| {
                ui.vertical(|ui| {
                    if ui
                        .button("Connect")
                        .on_hover_text("Click another card to connect to it")
                        .clicked()
                    {
                        actions.push(ToolbarAction::StartConnecting(node.id.clone()));
                    }
                    if ui.button("Reset size").clicked() {
                        actions.push(ToolbarAction::ResetSize(node.id.clone()));
                    }
                    let delete = egui::Button::new(egui::RichText::new("Delete").color(theme.danger));
                    if ui.add(delete).on_hover_text("Delete card (Del)").clicked() {
                        actions.push(ToolbarAction::DeleteNode(node.id.clone()));
                    }

                    if node.kind == NodeKind::Text {
                        ui.separator();
                        let current = node.color.as_deref().unwrap_or(NODE_COLORS[0]);
                        egui::Grid::new("node-colors")
                            .spacing([4.0, 4.0])
                            .show(ui, |ui| {
                                for (i, color) in NODE_COLORS.iter().enumerate() {
                                    if swatch(ui, color, current.eq_ignore_ascii_case(color), theme)
                                        .clicked()
                                    {
                                        actions.push(ToolbarAction::SetColor(
                                            node.id.clone(),
                                            color.to_string(),
                                        ));
                                    }
                                    if i % 2 == 1 {
                                        ui.end_row();
                                    }
                                }
                            });
                    }
                });
            });
        });
}

/// Settings for the selected connection, floating above its midpoint.
pub fn edge_toolbar(
    ctx: &egui::Context,
    board: &Board,
    routes: &[EdgeGeometry],
    transform: &CanvasTransform,
    theme: &Theme,
    actions: &mut Vec<ToolbarAction>,
) {
    let Some(edge_id) = board.selected_edge() else {
        return;
    };
    let Some(edge) = board.graph().edge(edge_id) else {
        return;
    };
    let Some(route) = routes.iter().find(|r| r.edge_id == edge_id) else {
        return;
    };
    let anchor = transform.to_screen(route.midpoint()) - egui::vec2(0.0, TOOLBAR_GAP);
    let id = edge.id.clone();

    egui::Area::new(egui::Id::new("edge-toolbar"))
        .order(egui::Order::Foreground)
        .pivot(egui::Align2::CENTER_BOTTOM)
        .fixed_pos(anchor)
        .show(ctx, |ui| {
            toolbar_frame(ui, theme).show(ui, |ui| {
                ui.set_width(200.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Connection").strong().color(theme.foreground));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            actions.push(ToolbarAction::CloseEdgeToolbar);
                        }
                    });
                });

                ui.label(
                    egui::RichText::new(format!("Label (max {MAX_LABEL_LEN} characters)"))
                        .small()
                        .color(theme.muted),
                );
                let mut label = edge.label.clone().unwrap_or_default();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut label)
                        .id(egui::Id::new(("edge-label", &id)))
                        .char_limit(MAX_LABEL_LEN)
                        .hint_text("Add a label...")
                        .desired_width(f32::INFINITY),
                );
                if response.changed() {
                    actions.push(ToolbarAction::UpdateEdge(
                        id.clone(),
                        EdgePatch {
                            label: Some(label),
                            ..EdgePatch::default()
                        },
                    ));
                }

                ui.label(egui::RichText::new("Color").small().color(theme.muted));
                let current = edge.color.as_deref().unwrap_or(DEFAULT_EDGE_COLOR);
                ui.horizontal_wrapped(|ui| {
                    for color in EDGE_COLORS {
                        if swatch(ui, color, current.eq_ignore_ascii_case(color), theme).clicked() {
                            actions.push(ToolbarAction::UpdateEdge(
                                id.clone(),
                                EdgePatch {
                                    color: Some(color.to_string()),
                                    ..EdgePatch::default()
                                },
                            ));
                        }
                    }
                });

                ui.label(egui::RichText::new("Style").small().color(theme.muted));
                ui.horizontal(|ui| {
                    for style in EdgeStyle::ALL {
                        if ui
                            .selectable_label(edge.style() == style, style.display_name())
                            .clicked()
                        {
                            actions.push(ToolbarAction::UpdateEdge(
                                id.clone(),
                                EdgePatch {
                                    style: Some(style),
                                    ..EdgePatch::default()
                                },
                            ));
                        }
                    }
                });

                ui.add_space(4.0);
                let delete = egui::Button::new(egui::RichText::new("Delete").color(theme.danger))
                    .min_size(egui::vec2(ui.available_width(), 0.0));
                if ui.add(delete).clicked() {
                    actions.push(ToolbarAction::DeleteEdge(id.clone()));
                }
            });
        });
}

fn swatch(ui: &mut egui::Ui, color: &str, selected: bool, theme: &Theme) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::click());
    let fill = parse_hex(color).unwrap_or(Color32::WHITE);
    let radius = SWATCH_SIZE / 2.0 - 1.0;
    let painter = ui.painter();
    painter.circle_filled(rect.center(), radius, fill);
    let ring = if selected {
        Stroke::new(2.0, theme.accent)
    } else if response.hovered() {
        Stroke::new(1.0, theme.muted)
    } else {
        Stroke::new(1.0, theme.panel_border)
    };
    painter.circle_stroke(rect.center(), radius, ring);
    response.on_hover_text(color)
}
