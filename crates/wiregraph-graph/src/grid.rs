//! The drawing contract for the background grid and the marquee: plain
//! geometry an external renderer can paint without knowing anything about
//! the engine. Grid lines are recomputed whenever the viewport transform or
//! the widget rect changes; the marquee is a filled+stroked rectangle
//! spanning two corner points.

use crate::geometry::{Rect, Vec2, ViewTransform};
use crate::style::{Color, Theme};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Vec2,
    pub end: Vec2,
    pub color: Color,
    pub width: f32,
}

/// Screen-space line segments covering `view_rect` for the current
/// transform. One segment per visible grid line; every
/// `theme.grid_thick_every`-th world line uses the thick color.
pub fn grid_lines(transform: ViewTransform, view_rect: Rect, theme: &Theme) -> Vec<GridLine> {
    let mut lines = Vec::new();
    let spacing = theme.grid_spacing;
    if spacing <= 0.0 || view_rect.width() <= 0.0 || view_rect.height() <= 0.0 {
        return lines;
    }
    // Skip sub-pixel grids instead of emitting thousands of segments.
    if spacing * transform.scale.x.min(transform.scale.y) < 2.0 {
        return lines;
    }

    let world = transform.screen_to_world_rect(view_rect);
    let thick_every = theme.grid_thick_every.max(1) as i64;

    let first_col = (world.min.x / spacing).floor() as i64;
    let last_col = (world.max.x / spacing).ceil() as i64;
    for col in first_col..=last_col {
        let x = transform.world_to_screen(Vec2::new(col as f32 * spacing, 0.0)).x;
        let thick = col.rem_euclid(thick_every) == 0;
        lines.push(GridLine {
            start: Vec2::new(x, view_rect.min.y),
            end: Vec2::new(x, view_rect.max.y),
            color: if thick { theme.grid_thick_line } else { theme.grid_line },
            width: 1.0,
        });
    }

    let first_row = (world.min.y / spacing).floor() as i64;
    let last_row = (world.max.y / spacing).ceil() as i64;
    for row in first_row..=last_row {
        let y = transform.world_to_screen(Vec2::new(0.0, row as f32 * spacing)).y;
        let thick = row.rem_euclid(thick_every) == 0;
        lines.push(GridLine {
            start: Vec2::new(view_rect.min.x, y),
            end: Vec2::new(view_rect.max.x, y),
            color: if thick { theme.grid_thick_line } else { theme.grid_line },
            width: 1.0,
        });
    }

    lines
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeShape {
    pub rect: Rect,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

/// Marquee geometry from two corner points in screen space.
pub fn marquee_shape(a: Vec2, b: Vec2, theme: &Theme) -> MarqueeShape {
    MarqueeShape {
        rect: Rect::from_two_points(a, b),
        fill: theme.marquee_fill,
        stroke: theme.marquee_stroke,
        stroke_width: theme.marquee_stroke_width,
    }
}

/// Quantizes a world position to the nearest grid intersection.
pub fn snap_to_grid(position: Vec2, spacing: f32) -> Vec2 {
    if spacing <= 0.0 {
        return position;
    }
    Vec2::new(
        (position.x / spacing).round() * spacing,
        (position.y / spacing).round() * spacing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_cover_view_rect() {
        let theme = Theme::dark();
        let transform = ViewTransform::default();
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(200.0, 100.0));
        let lines = grid_lines(transform, view, &theme);

        // 20px spacing: 11 columns (0..=200) and 6 rows (0..=100), give or
        // take the edge-rounding column.
        let verticals = lines.iter().filter(|l| l.start.x == l.end.x).count();
        let horizontals = lines.iter().filter(|l| l.start.y == l.end.y).count();
        assert!((11..=12).contains(&verticals));
        assert!((6..=7).contains(&horizontals));
        for line in &lines {
            assert!(view.expand(1.0).contains(line.start));
            assert!(view.expand(1.0).contains(line.end));
        }
    }

    #[test]
    fn thick_lines_follow_interval() {
        let theme = Theme::dark();
        let transform = ViewTransform::default();
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(200.0, 20.0));
        let lines = grid_lines(transform, view, &theme);

        let thick: Vec<f32> = lines
            .iter()
            .filter(|l| l.start.x == l.end.x && l.color == theme.grid_thick_line)
            .map(|l| l.start.x)
            .collect();
        // Thick verticals at multiples of 100 (every 5th of 20).
        assert!(thick.contains(&0.0));
        assert!(thick.contains(&100.0));
        assert!(thick.contains(&200.0));
        assert_eq!(thick.len(), 3);
    }

    #[test]
    fn tiny_zoom_emits_nothing() {
        let theme = Theme::dark();
        let transform = ViewTransform::new(Vec2::ZERO, Vec2::splat(0.01));
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert!(grid_lines(transform, view, &theme).is_empty());
    }

    #[test]
    fn marquee_normalizes_corners() {
        let theme = Theme::dark();
        let shape = marquee_shape(Vec2::new(50.0, 10.0), Vec2::new(10.0, 40.0), &theme);
        assert_eq!(shape.rect.min, Vec2::new(10.0, 10.0));
        assert_eq!(shape.rect.max, Vec2::new(50.0, 40.0));
    }

    #[test]
    fn snap_rounds_to_nearest_intersection() {
        assert_eq!(
            snap_to_grid(Vec2::new(27.0, -14.0), 20.0),
            Vec2::new(20.0, -20.0)
        );
        assert_eq!(snap_to_grid(Vec2::new(3.0, 4.0), 0.0), Vec2::new(3.0, 4.0));
    }
}
