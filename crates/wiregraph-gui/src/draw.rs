//! Painting for the editor widget: grid, edges, nodes, ports, marquee.
//! Everything here consumes the engine's drawing contract and geometry;
//! nothing feeds back into it.

use eframe::egui;
use wiregraph_graph::interaction::EditorController;
use wiregraph_graph::scene::{EdgeEnd, Element, ElementKind};
use wiregraph_graph::{Color, GridLine, Vec2, edge_curve};

pub fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn pos2(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

pub fn draw_grid(painter: &egui::Painter, lines: &[GridLine]) {
    for line in lines {
        painter.line_segment(
            [pos2(line.start), pos2(line.end)],
            egui::Stroke::new(line.width, color32(line.color)),
        );
    }
}

pub fn draw_scene(painter: &egui::Painter, controller: &EditorController) {
    let scene = controller.scene();
    let theme = controller.theme();
    let transform = controller.viewport().transform();
    let zoom = transform.scale.x;

    for id in scene.paint_order() {
        let Some(element) = scene.get(id) else {
            continue;
        };
        match &element.kind {
            ElementKind::Edge(data) => {
                let Some(curve) = edge_curve(scene, id) else {
                    continue;
                };
                let color = if data.ghost || data.is_candidate() {
                    theme.edge_ghost
                } else if element.selected {
                    theme.edge_selected
                } else {
                    theme.edge_color
                };
                let shape = egui::epaint::CubicBezierShape::from_points_stroke(
                    [
                        pos2(transform.world_to_screen(curve.start)),
                        pos2(transform.world_to_screen(curve.control1)),
                        pos2(transform.world_to_screen(curve.control2)),
                        pos2(transform.world_to_screen(curve.end)),
                    ],
                    false,
                    egui::Color32::TRANSPARENT,
                    egui::Stroke::new(theme.edge_width * zoom, color32(color)),
                );
                painter.add(shape);
                // Endpoint caps help locate a detached candidate end.
                if data.is_candidate() {
                    for end in [EdgeEnd::Output, EdgeEnd::Input] {
                        painter.circle_filled(
                            pos2(transform.world_to_screen(data.endpoint(end))),
                            2.5 * zoom,
                            color32(color),
                        );
                    }
                }
            }
            ElementKind::Node(node) => {
                let Some(rect) = scene.world_rect(id) else {
                    continue;
                };
                let screen = egui::Rect::from_min_max(
                    pos2(transform.world_to_screen(rect.min)),
                    pos2(transform.world_to_screen(rect.max)),
                );
                draw_node_card(painter, element, &node.label, screen, controller, zoom);
            }
            ElementKind::Port(port) => {
                let Some(center) = scene.world_position(id) else {
                    continue;
                };
                let center = pos2(transform.world_to_screen(center));
                let radius = theme.port_radius * zoom;
                painter.circle_filled(center, radius, color32(port.color));
                if port.highlighted {
                    painter.circle_stroke(
                        center,
                        radius + 2.0 * zoom,
                        egui::Stroke::new(1.5 * zoom, color32(theme.port_highlight)),
                    );
                }
            }
        }
    }

    if let Some(marquee) = controller.marquee_shape() {
        let rect = egui::Rect::from_min_max(pos2(marquee.rect.min), pos2(marquee.rect.max));
        painter.rect_filled(rect, 0.0, color32(marquee.fill));
        painter.rect_stroke(
            rect,
            0.0,
            egui::Stroke::new(marquee.stroke_width, color32(marquee.stroke)),
            egui::StrokeKind::Middle,
        );
    }
}

fn draw_node_card(
    painter: &egui::Painter,
    element: &Element,
    label: &str,
    rect: egui::Rect,
    controller: &EditorController,
    zoom: f32,
) {
    let theme = controller.theme();
    let radius = 6.0 * zoom;
    painter.rect_filled(rect, radius, color32(theme.node_fill));
    let border = if element.selected {
        theme.node_border_selected
    } else {
        theme.node_border
    };
    let border_width = if element.selected { 2.0 } else { 1.0 };
    painter.rect_stroke(
        rect,
        radius,
        egui::Stroke::new(border_width * zoom, color32(border)),
        egui::StrokeKind::Middle,
    );
    painter.text(
        egui::pos2(rect.min.x + 8.0 * zoom, rect.min.y + 4.0 * zoom),
        egui::Align2::LEFT_TOP,
        label,
        egui::FontId::proportional(13.0 * zoom),
        color32(theme.node_text),
    );
}
