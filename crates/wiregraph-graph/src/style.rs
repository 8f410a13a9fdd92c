//! Editor Style System
//!
//! Color primitives and the theme struct the embedding resolves and pushes
//! into the engine. There are no global style singletons; a widget gets its
//! `Theme` at construction and a new one through the style-resolved
//! notification.

use serde::{Deserialize, Serialize};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_tuple(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

/// Named style parameters the engine consumes. Resolved externally (host
/// style sheet, user settings) and pushed in whole; unset hosts just use
/// one of the built-in palettes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Grid cell size in world units.
    pub grid_spacing: f32,
    /// Every n-th grid line paints with the thick color.
    pub grid_thick_every: u32,
    pub grid_line: Color,
    pub grid_thick_line: Color,
    pub background: Color,

    pub node_fill: Color,
    pub node_border: Color,
    pub node_border_selected: Color,
    pub node_text: Color,

    pub port_input: Color,
    pub port_output: Color,
    pub port_highlight: Color,
    pub port_radius: f32,

    pub edge_width: f32,
    pub edge_color: Color,
    pub edge_selected: Color,
    pub edge_ghost: Color,

    pub marquee_fill: Color,
    pub marquee_stroke: Color,
    pub marquee_stroke_width: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn bright() -> Self {
        Self {
            grid_spacing: 20.0,
            grid_thick_every: 5,
            grid_line: Color::rgb(225, 225, 225),
            grid_thick_line: Color::rgb(205, 205, 205),
            background: Color::rgb(250, 250, 250),
            node_fill: Color::rgb(235, 235, 235),
            node_border: Color::rgb(60, 60, 60),
            node_border_selected: Color::rgb(255, 160, 40),
            node_text: Color::rgb(20, 20, 20),
            port_input: Color::rgb(80, 130, 180),
            port_output: Color::rgb(200, 160, 80),
            port_highlight: Color::rgb(120, 210, 120),
            port_radius: 6.0,
            edge_width: 2.0,
            edge_color: Color::rgb(120, 120, 120),
            edge_selected: Color::rgb(255, 160, 40),
            edge_ghost: Color::rgba(120, 120, 120, 140),
            marquee_fill: Color::rgba(80, 130, 180, 40),
            marquee_stroke: Color::rgb(80, 130, 180),
            marquee_stroke_width: 1.0,
        }
    }

    pub fn dark() -> Self {
        Self {
            grid_spacing: 20.0,
            grid_thick_every: 5,
            grid_line: Color::rgb(48, 48, 50),
            grid_thick_line: Color::rgb(62, 62, 66),
            background: Color::rgb(32, 32, 34),
            node_fill: Color::rgb(58, 58, 62),
            node_border: Color::rgb(180, 180, 184),
            node_border_selected: Color::rgb(255, 190, 90),
            node_text: Color::rgb(235, 235, 235),
            port_input: Color::rgb(100, 160, 210),
            port_output: Color::rgb(220, 180, 100),
            port_highlight: Color::rgb(140, 230, 140),
            port_radius: 6.0,
            edge_width: 2.0,
            edge_color: Color::rgb(160, 160, 164),
            edge_selected: Color::rgb(255, 190, 90),
            edge_ghost: Color::rgba(160, 160, 164, 140),
            marquee_fill: Color::rgba(100, 160, 210, 40),
            marquee_stroke: Color::rgb(100, 160, 210),
            marquee_stroke_width: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darken_and_lighten_stay_in_range() {
        let c = Color::rgb(100, 150, 200);
        let darker = c.darken(0.5);
        assert_eq!(darker, Color::rgb(50, 75, 100));
        let lighter = c.lighten(1.0);
        assert_eq!((lighter.r, lighter.g, lighter.b), (255, 255, 255));
        assert_eq!(lighter.a, 255);
    }

    #[test]
    fn theme_serde_roundtrip() {
        let theme = Theme::bright();
        let json = serde_json::to_string(&theme).unwrap();
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, theme);
    }
}
