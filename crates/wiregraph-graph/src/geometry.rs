//! Pure geometry: vectors, rectangles, the viewport transform math, and the
//! edge-proximity pan falloff. No state lives here.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    pub fn clamp_length(self, max: f32) -> Self {
        let len = self.length();
        if len <= max || len == 0.0 {
            self
        } else {
            self * (max / len)
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A rectangle defined by min and max corners
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create a new rectangle from min and max corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a new rectangle from position and size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: Vec2::new(pos.x + size.x, pos.y + size.y),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            max: center + size * 0.5,
        }
    }

    /// Normalized rectangle spanning two arbitrary corner points.
    pub fn from_two_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.min.x + self.width() * 0.5,
            self.min.y + self.height() * 0.5,
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn contains_rect(&self, other: Rect) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn intersects(&self, other: Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn shrink(&self, amount: f32) -> Self {
        self.expand(-amount)
    }

    pub fn union(&self, other: Rect) -> Self {
        Self {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// The viewport transform: `screen = world * scale + pan`. Scale is
/// non-uniform in principle; interactive zoom keeps it uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub scale: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: Vec2::splat(1.0),
        }
    }
}

impl ViewTransform {
    pub fn new(pan: Vec2, scale: Vec2) -> Self {
        Self { pan, scale }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            world.x * self.scale.x + self.pan.x,
            world.y * self.scale.y + self.pan.y,
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.pan.x) / self.scale.x,
            (screen.y - self.pan.y) / self.scale.y,
        )
    }

    pub fn world_to_screen_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.world_to_screen(rect.min),
            self.world_to_screen(rect.max),
        )
    }

    pub fn screen_to_world_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.screen_to_world(rect.min),
            self.screen_to_world(rect.max),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.pan.is_finite() && self.scale.is_finite()
    }
}

/// Edge-proximity pan speed. Zero while `center` stays inside `view` shrunk
/// by `border`; ramps linearly through the border band; clamped to
/// `max_speed` per axis at and beyond the viewport edge. The sign points
/// toward the edge being approached.
pub fn pan_speed(center: Vec2, view: Rect, border: f32, max_speed: f32) -> Vec2 {
    if border <= 0.0 {
        return Vec2::ZERO;
    }
    let axis = |pos: f32, lo: f32, hi: f32| -> f32 {
        if pos < lo + border {
            -(((lo + border) - pos) / border).min(1.0) * max_speed
        } else if pos > hi - border {
            ((pos - (hi - border)) / border).min(1.0) * max_speed
        } else {
            0.0
        }
    };
    Vec2::new(
        axis(center.x, view.min.x, view.max.x),
        axis(center.y, view.min.y, view.max.y),
    )
}

/// Uniform zoom and translation that fit `bounds` inside `view` with
/// `border` pixels kept free on every side, clamped to the scale range.
/// Degenerate bounds frame at the clamped maximum around their center.
pub fn fit_transform(
    bounds: Rect,
    view: Rect,
    border: f32,
    min_scale: f32,
    max_scale: f32,
) -> ViewTransform {
    let available = view.shrink(border);
    let zoom = if bounds.width() > 0.0 && bounds.height() > 0.0 {
        (available.width() / bounds.width())
            .min(available.height() / bounds.height())
            .clamp(min_scale, max_scale)
    } else {
        1.0f32.clamp(min_scale, max_scale)
    };
    let pan = view.center() - bounds.center() * zoom;
    ViewTransform::new(pan, Vec2::splat(zoom))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_roundtrip() {
        let t = ViewTransform::new(Vec2::new(100.0, -40.0), Vec2::splat(2.5));
        let world = Vec2::new(13.0, 7.5);
        let back = t.screen_to_world(t.world_to_screen(world));
        assert!(world.distance(back) < 1e-4);
    }

    #[test]
    fn pan_speed_zero_in_dead_zone() {
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(
            pan_speed(Vec2::new(400.0, 300.0), view, 50.0, 20.0),
            Vec2::ZERO
        );
    }

    #[test]
    fn pan_speed_ramps_and_clamps() {
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0));
        // 20px into a 50px band: 40% of max.
        let s = pan_speed(Vec2::new(770.0, 300.0), view, 50.0, 20.0);
        assert!((s.x - 8.0).abs() < 1e-4);
        assert_eq!(s.y, 0.0);
        // Past the edge: clamped.
        let s = pan_speed(Vec2::new(900.0, 300.0), view, 50.0, 20.0);
        assert_eq!(s.x, 20.0);
        // Left edge has negative sign.
        let s = pan_speed(Vec2::new(10.0, 300.0), view, 50.0, 20.0);
        assert!(s.x < 0.0);
    }

    #[test]
    fn fit_centers_bounds() {
        let bounds = Rect::from_min_max(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0));
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(500.0, 400.0));
        let t = fit_transform(bounds, view, 40.0, 0.1, 4.0);
        let mapped_center = t.world_to_screen(bounds.center());
        assert!(mapped_center.distance(view.center()) < 1e-3);
        // 400 - 2*40 = 320 available height for 100 world units.
        assert!((t.scale.x - 3.2).abs() < 1e-4);
    }

    #[test]
    fn fit_clamps_zoom() {
        let bounds = Rect::from_min_max(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(1000.0, 1000.0));
        let t = fit_transform(bounds, view, 0.0, 0.1, 4.0);
        assert_eq!(t.scale.x, 4.0);
    }

    #[test]
    fn rect_from_two_points_normalizes() {
        let r = Rect::from_two_points(Vec2::new(10.0, -5.0), Vec2::new(-2.0, 8.0));
        assert_eq!(r.min, Vec2::new(-2.0, -5.0));
        assert_eq!(r.max, Vec2::new(10.0, 8.0));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn finite_vec() -> impl Strategy<Value = Vec2> {
        (-1e4f32..1e4, -1e4f32..1e4).prop_map(|(x, y)| Vec2::new(x, y))
    }

    proptest! {
        #[test]
        fn roundtrip_world_screen(
            world in finite_vec(),
            pan in finite_vec(),
            zoom in 0.1f32..4.0,
        ) {
            let t = ViewTransform::new(pan, Vec2::splat(zoom));
            let back = t.screen_to_world(t.world_to_screen(world));
            prop_assert!(world.distance(back) < 1e-1);
        }

        #[test]
        fn pan_speed_bounded(
            center in finite_vec(),
            border in 1.0f32..200.0,
            max_speed in 0.1f32..50.0,
        ) {
            let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0));
            let s = pan_speed(center, view, border, max_speed);
            prop_assert!(s.x.abs() <= max_speed + 1e-4);
            prop_assert!(s.y.abs() <= max_speed + 1e-4);
        }

        #[test]
        fn fit_keeps_bounds_visible(
            cx in -1e3f32..1e3,
            cy in -1e3f32..1e3,
            w in 1.0f32..2e3,
            h in 1.0f32..2e3,
        ) {
            let bounds = Rect::from_center_size(Vec2::new(cx, cy), Vec2::new(w, h));
            let view = Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0));
            let t = fit_transform(bounds, view, 20.0, 0.01, 10.0);
            let mapped = t.world_to_screen_rect(bounds);
            // Tolerance covers the clamped-zoom case where the content
            // genuinely cannot fit.
            if t.scale.x > 0.01 + 1e-6 && t.scale.x < 10.0 - 1e-6 {
                prop_assert!(view.expand(1e-2).contains_rect(mapped));
            }
        }
    }
}
