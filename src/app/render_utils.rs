use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::case::NodeKind;

use super::graph::interaction::Camera;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Case => Color32::from_rgb(236, 92, 92),
        NodeKind::Person => Color32::from_rgb(84, 160, 255),
        NodeKind::Evidence => Color32::from_rgb(246, 190, 72),
        NodeKind::Location => Color32::from_rgb(96, 200, 132),
        NodeKind::Event => Color32::from_rgb(178, 124, 240),
        NodeKind::Statute => Color32::from_rgb(150, 160, 172),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, camera: Camera) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * camera.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + camera.pan;

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Cheap bounding-box test; long edges crossing the canvas still pass.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, camera: Camera, world: Vec2) -> Pos2 {
    rect.min + camera.to_screen(world)
}

pub(super) fn screen_to_local(rect: Rect, screen: Pos2) -> Vec2 {
    screen - rect.min
}

/// Labels are a legibility policy only: always for the focused node and its
/// neighbourhood, otherwise once zoomed in far enough.
pub(super) fn labels_visible(zoom: f32, label_min_zoom: f32, focused: bool) -> bool {
    focused || zoom >= label_min_zoom
}

pub(super) fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut truncated = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn world_to_screen_applies_zoom_then_pan() {
        let rect = Rect::from_min_size(Pos2::new(200.0, 40.0), vec2(800.0, 600.0));
        let camera = Camera {
            pan: vec2(15.0, -5.0),
            zoom: 2.0,
        };

        let screen = world_to_screen(rect, camera, vec2(10.0, 20.0));
        assert_eq!(screen, Pos2::new(200.0 + 20.0 + 15.0, 40.0 + 40.0 - 5.0));
        assert_eq!(
            camera.to_world(screen_to_local(rect, screen)),
            vec2(10.0, 20.0)
        );
    }

    #[test]
    fn labels_follow_zoom_unless_focused() {
        assert!(!labels_visible(0.5, 0.9, false));
        assert!(labels_visible(0.5, 0.9, true));
        assert!(labels_visible(1.2, 0.9, false));
    }

    #[test]
    fn truncate_label_marks_cut_text() {
        assert_eq!(truncate_label("Short", 10), "Short");
        assert_eq!(truncate_label("Evidence locker 12", 8), "Evidenc…");
    }

    #[test]
    fn edge_outside_canvas_is_culled() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0));
        assert!(!edge_visible(rect, Pos2::new(200.0, 0.0), Pos2::new(300.0, 50.0), 2.0));
        assert!(edge_visible(rect, Pos2::new(-50.0, 50.0), Pos2::new(150.0, 50.0), 2.0));
    }
}
