//! Drawing target for the visualizer.
//!
//! The visualizer only ever talks to a [`Surface`]. [`DisplayList`] is the
//! implementation the session uses: it records the calls as [`DrawOp`]s so a
//! frame can be built on the visualizer task and replayed by whatever host
//! owns the real screen.

/// Colour in hue/saturation/lightness with alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    /// Degrees, `[0, 360)`
    pub hue: f32,
    /// `[0, 1]`
    pub saturation: f32,
    /// `[0, 1]`
    pub lightness: f32,
    /// `[0, 1]`
    pub alpha: f32,
}

impl Hsla {
    pub fn new(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation: saturation.clamp(0.0, 1.0),
            lightness: lightness.clamp(0.0, 1.0),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn white(alpha: f32) -> Self {
        Self::new(0.0, 0.0, 1.0, alpha)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Convert to 8-bit RGB, ignoring alpha.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let c = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
        let h = self.hue / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = self.lightness - c / 2.0;
        let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_byte(r), to_byte(g), to_byte(b))
    }
}

/// Something the visualizer can draw into. Coordinates are in surface units
/// with the origin top-left and y pointing down.
pub trait Surface {
    fn size(&self) -> (f32, f32);

    /// Cover the whole surface; with alpha < 1 this leaves a trail.
    fn fill_background(&mut self, color: Hsla);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Hsla);

    fn polyline(&mut self, points: &[(f32, f32)], width: f32, color: Hsla);

    /// Soft disc fading from `color` at the centre to transparent at `radius`.
    fn radial_glow(&mut self, center: (f32, f32), radius: f32, color: Hsla);

    fn circle(&mut self, center: (f32, f32), radius: f32, color: Hsla);

    /// Offset every following draw call.
    fn translate(&mut self, dx: f32, dy: f32);

    /// Back to the identity transform.
    fn reset_transform(&mut self);

    /// Erase everything, including trails.
    fn clear(&mut self);
}

/// One recorded draw call, with the transform already applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Background(Hsla),
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Hsla,
    },
    Polyline {
        points: Vec<(f32, f32)>,
        width: f32,
        color: Hsla,
    },
    Glow {
        center: (f32, f32),
        radius: f32,
        color: Hsla,
    },
    Circle {
        center: (f32, f32),
        radius: f32,
        color: Hsla,
    },
    Clear,
}

/// Recording surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    width: f32,
    height: f32,
    offset: (f32, f32),
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: (0.0, 0.0),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Current translation (zero after `reset_transform`).
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    fn shift(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (x + self.offset.0, y + self.offset.1)
    }
}

impl Surface for DisplayList {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_background(&mut self, color: Hsla) {
        self.ops.push(DrawOp::Background(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Hsla) {
        let (x, y) = self.shift((x, y));
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn polyline(&mut self, points: &[(f32, f32)], width: f32, color: Hsla) {
        let points = points.iter().map(|&p| self.shift(p)).collect();
        self.ops.push(DrawOp::Polyline {
            points,
            width,
            color,
        });
    }

    fn radial_glow(&mut self, center: (f32, f32), radius: f32, color: Hsla) {
        let center = self.shift(center);
        self.ops.push(DrawOp::Glow {
            center,
            radius,
            color,
        });
    }

    fn circle(&mut self, center: (f32, f32), radius: f32, color: Hsla) {
        let center = self.shift(center);
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    fn reset_transform(&mut self) {
        self.offset = (0.0, 0.0);
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.offset = (0.0, 0.0);
        self.ops.push(DrawOp::Clear);
    }
}
