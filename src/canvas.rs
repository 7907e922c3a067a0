use fireworks::{Color, Surface, Viewport};
use glam::DVec2;
use noise::{NoiseFn, Perlin};
use std::io::Write;

const SKYLINE_WINDOW: Color = Color(255, 200, 90);

/// Paints the simulation onto a grid of half-block terminal cells. Each cell
/// holds two vertically stacked pixels, so the pixel grid is `cols x rows*2`.
pub struct TerminalCanvas {
    width: usize,
    height: usize,
    scale: DVec2,
    glow: Vec<(f32, Color)>,
    backdrop: Vec<Color>,
    output_buf: Vec<u8>,
}

impl TerminalCanvas {
    pub fn new(cols: usize, rows: usize, viewport: &Viewport, bg: Color) -> Self {
        let width = cols.max(1);
        let height = (rows * 2).max(2);
        Self {
            width,
            height,
            scale: DVec2::new(
                width as f64 / viewport.width,
                height as f64 / viewport.height,
            ),
            glow: vec![(0.0, bg); width * height],
            backdrop: skyline(width, height, bg),
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    pub fn clear(&mut self) {
        self.glow.fill((0.0, Color(0, 0, 0)));
    }

    fn plot(&mut self, x: i64, y: i64, intensity: f32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if intensity > self.glow[idx].0 {
            self.glow[idx] = (intensity, color);
        }
    }

    pub fn render(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top = Color(255, 255, 255);
        let mut prev_bot = Color(255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top = self.shade(top_idx);
                let bot = self.shade(bot_idx);

                if top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = Color(255, 255, 255);
            prev_bot = Color(255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }

    // Blend the glow at a pixel over the backdrop.
    fn shade(&self, idx: usize) -> Color {
        let (intensity, color) = self.glow[idx];
        let base = self.backdrop[idx];
        if intensity <= 0.05 {
            return base;
        }
        let blend = (intensity / 3.0).min(1.0);
        let mix = |b: u8, c: u8| (b as f32 * (1.0 - blend) + c as f32 * blend) as u8;
        Color(mix(base.0, color.0), mix(base.1, color.1), mix(base.2, color.2))
    }
}

impl Surface for TerminalCanvas {
    fn fill_circle(&mut self, center: DVec2, size: f64, color: Color, opacity: f64) {
        let px = center * self.scale;
        let (cx, cy) = (px.x.floor() as i64, px.y.floor() as i64);
        let radius = (size * 0.5 * self.scale.x).max(0.5);
        let reach = radius.ceil() as i64;
        let core = opacity as f32 * 2.5;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if d <= radius {
                    self.plot(cx + dx, cy + dy, core, color);
                } else if d <= radius + 1.0 {
                    // Soft halo just outside the body
                    self.plot(cx + dx, cy + dy, opacity as f32 * 0.8, color);
                }
            }
        }
    }
}

/// City silhouette along the bottom edge with a scatter of lit windows.
fn skyline(width: usize, height: usize, bg: Color) -> Vec<Color> {
    let mut backdrop = vec![bg; width * height];
    let perlin = Perlin::new(fastrand::u32(..));
    let body = Color(
        bg.0.saturating_add(14),
        bg.1.saturating_add(14),
        bg.2.saturating_add(22),
    );
    let max_rise = (height as f64 * 0.22).max(2.0);

    let mut x = 0;
    while x < width {
        let span = fastrand::usize(3..9).min(width - x);
        let n = perlin.get([x as f64 * 0.07, 0.5]);
        let rise = ((n * 0.5 + 0.5) * max_rise).round() as usize;
        let top = height.saturating_sub(rise.max(1));

        for col in x..x + span {
            for row in top..height {
                let lit = col > x && row > top && (col - x) % 2 == 1 && fastrand::f32() < 0.12;
                backdrop[row * width + col] = if lit { SKYLINE_WINDOW } else { body };
            }
        }
        x += span;
    }
    backdrop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_lands_on_scaled_cell() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut canvas = TerminalCanvas::new(80, 30, &viewport, Color(0, 0, 0));
        canvas.clear();
        canvas.fill_circle(DVec2::new(400.0, 300.0), 1.0, Color(255, 0, 0), 1.0);
        let idx = 30 * 80 + 40;
        assert_eq!(canvas.glow[idx].1, Color(255, 0, 0));
        assert!(canvas.glow[idx].0 > 2.0);
    }

    #[test]
    fn off_screen_circles_are_ignored() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut canvas = TerminalCanvas::new(80, 30, &viewport, Color(0, 0, 0));
        canvas.clear();
        canvas.fill_circle(DVec2::new(-500.0, -500.0), 4.0, Color(255, 0, 0), 1.0);
        assert!(canvas.glow.iter().all(|(i, _)| *i == 0.0));
    }

    #[test]
    fn render_emits_one_line_per_cell_row() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut canvas = TerminalCanvas::new(10, 4, &viewport, Color(0, 0, 0));
        let mut out = Vec::new();
        canvas.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 3);
        assert_eq!(text.matches('▄').count(), 40);
    }
}
