//! High-dynamic-range color with `f64` channels.

use crate::packed::{PackedColor, to_byte};

/// Clamps to `[0, 1]`, mapping NaN to 0.
#[inline]
pub fn sanitize01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Four `f64` channels, each kept in `[0, 1]`.
///
/// Every constructor and setter clamps, so intermediate math that leaves the
/// unit range (kernel sums, gains) has to be done on
/// plain floats and folded back with [`LinearColor::new`] or
/// [`LinearColor::from_channels`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LinearColor {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl LinearColor {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: sanitize01(r),
            g: sanitize01(g),
            b: sanitize01(b),
            a: sanitize01(a),
        }
    }

    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_channels([r, g, b, a]: [f64; 4]) -> Self {
        Self::new(r, g, b, a)
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn set_r(&mut self, value: f64) {
        self.r = sanitize01(value);
    }

    pub fn set_g(&mut self, value: f64) {
        self.g = sanitize01(value);
    }

    pub fn set_b(&mut self, value: f64) {
        self.b = sanitize01(value);
    }

    pub fn set_a(&mut self, value: f64) {
        self.a = sanitize01(value);
    }

    pub fn with_alpha(mut self, a: f64) -> Self {
        self.set_a(a);
        self
    }

    pub fn rgb(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    pub fn channels(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channel-wise interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = sanitize01(t);
        let [r0, g0, b0, a0] = self.channels();
        let [r1, g1, b1, a1] = other.channels();
        Self::new(
            r0 + (r1 - r0) * t,
            g0 + (g1 - g0) * t,
            b0 + (b1 - b0) * t,
            a0 + (a1 - a0) * t,
        )
    }

    /// Multiplies the color channels by `factor`; alpha is kept.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }
}

impl From<PackedColor> for LinearColor {
    fn from(c: PackedColor) -> Self {
        Self::from_channels(c.normalized())
    }
}

impl From<LinearColor> for PackedColor {
    fn from(c: LinearColor) -> Self {
        PackedColor::new(to_byte(c.r), to_byte(c.g), to_byte(c.b), to_byte(c.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_on_write() {
        let mut c = LinearColor::new(1.5, -0.2, f64::NAN, 0.25);
        assert_eq!(c.channels(), [1.0, 0.0, 0.0, 0.25]);
        c.set_g(3.0);
        assert_eq!(c.g(), 1.0);
        c.set_a(f64::INFINITY);
        assert_eq!(c.a(), 1.0);
    }

    #[test]
    fn packed_round_trip_is_exact() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            let packed = PackedColor::new(v, 255 - v, v / 2, v);
            assert_eq!(PackedColor::from(LinearColor::from(packed)), packed);
        }
    }

    #[test]
    fn lerp_midpoint() {
        let mid = LinearColor::BLACK.lerp(LinearColor::WHITE, 0.5);
        assert_eq!(mid.rgb(), [0.5, 0.5, 0.5]);
        assert_eq!(mid.a(), 1.0);
    }

    #[test]
    fn scale_saturates() {
        let c = LinearColor::opaque(0.4, 0.6, 0.1).scale(2.0);
        assert_eq!(c.rgb(), [0.8, 1.0, 0.2]);
    }
}
