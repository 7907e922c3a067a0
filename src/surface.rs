//! Collaborator boundary between the simulation and whatever draws it.

use fastrand::Rng;
use glam::DVec2;

/// RGB color of a rocket or particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

// Realistic firework colors based on chemical compounds
const PALETTE: [Color; 10] = [
    Color(255, 30, 30),   // Strontium (intense red)
    Color(220, 50, 50),   // Lithium (medium red)
    Color(255, 140, 0),   // Calcium (orange)
    Color(255, 220, 0),   // Sodium (yellow)
    Color(0, 255, 100),   // Barium (green)
    Color(60, 120, 255),  // Copper halides (blue)
    Color(100, 100, 255), // Caesium (indigo)
    Color(180, 50, 255),  // Potassium/Rubidium (violet)
    Color(255, 200, 50),  // Charcoal/Iron (gold)
    Color(255, 255, 255), // Titanium/Magnesium (white)
];

impl Color {
    /// Picks a palette color and nudges its brightness so bursts don't look flat.
    pub fn vibrant(rng: &mut Rng) -> Self {
        let base = PALETTE[rng.usize(0..PALETTE.len())];
        let gain = 0.85 + rng.f32() * 0.15;
        Color(
            (base.0 as f32 * gain) as u8,
            (base.1 as f32 * gain) as u8,
            (base.2 as f32 * gain) as u8,
        )
    }
}

/// Bounds of the drawing area, in pixels with Y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Anything the simulation can paint onto.
pub trait Surface {
    /// Fill a circle of diameter `size` centred at `center`. `opacity` is in `[0, 1]`.
    fn fill_circle(&mut self, center: DVec2, size: f64, color: Color, opacity: f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_edges_are_inside() {
        let viewport = Viewport::new(800.0, 600.0);
        assert!(viewport.contains(DVec2::new(0.0, 0.0)));
        assert!(viewport.contains(DVec2::new(800.0, 600.0)));
        assert!(!viewport.contains(DVec2::new(800.1, 10.0)));
        assert!(!viewport.contains(DVec2::new(10.0, -0.1)));
    }

    #[test]
    fn vibrant_colors_are_not_black() {
        let mut rng = Rng::with_seed(3);
        for _ in 0..100 {
            let Color(r, g, b) = Color::vibrant(&mut rng);
            assert!(r.max(g).max(b) > 100);
        }
    }
}
