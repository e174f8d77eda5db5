//! Colorspace representations and their conversions from/to normalized RGB.
//!
//! All functions here take and return plain `[r, g, b]` triples in `[0, 1]`;
//! clamping back into a color value is left to [`crate::ColorModel`].

use std::f64::consts::TAU;
use std::sync::LazyLock;

use nalgebra::{Matrix3, Vector3};
use palette::white_point::D65;
use palette::{FromColor, LinSrgb, Srgb};

type CieLab = palette::Lab<D65, f64>;

const EPSILON: f64 = 1.0e-12;

#[inline]
fn wrap_hue(h: f64) -> f64 {
    let h = h.rem_euclid(TAU);
    if h.is_finite() && h < TAU { h } else { 0.0 }
}

/// Shared hue computation of HSL and HSV, in radians `[0, 2π)`.
fn hue_of(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    let sector = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    wrap_hue(sector / 6.0 * TAU)
}

/// Hue (radians), saturation and lightness.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    pub fn from_rgb([r, g, b]: [f64; 3]) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) * 0.5;
        let delta = max - min;
        if delta < EPSILON {
            return Self::new(0.0, 0.0, l);
        }
        let s = delta / (1.0 - (2.0 * l - 1.0).abs()).max(EPSILON);
        Self::new(hue_of(r, g, b, max, delta), s.min(1.0), l)
    }

    pub fn to_rgb(&self) -> [f64; 3] {
        let (s, l) = (self.s.clamp(0.0, 1.0), self.l.clamp(0.0, 1.0));
        if s < EPSILON {
            return [l, l, l];
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hk = wrap_hue(self.h) / TAU;
        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        [channel(hk + 1.0 / 3.0), channel(hk), channel(hk - 1.0 / 3.0)]
    }
}

/// Hue (radians), saturation and value.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    pub fn from_rgb([r, g, b]: [f64; 3]) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let s = if max < EPSILON { 0.0 } else { delta / max };
        if delta < EPSILON {
            return Self::new(0.0, s, max);
        }
        Self::new(hue_of(r, g, b, max, delta), s, max)
    }

    pub fn to_rgb(&self) -> [f64; 3] {
        let (s, v) = (self.s.clamp(0.0, 1.0), self.v.clamp(0.0, 1.0));
        if s < EPSILON {
            return [v, v, v];
        }
        let hh = (wrap_hue(self.h) / TAU * 6.0).clamp(0.0, 6.0 - EPSILON);
        let i = hh.floor();
        let f = hh - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match i as u8 {
            0 => [v, t, p],
            1 => [q, v, p],
            2 => [p, v, t],
            3 => [p, q, v],
            4 => [t, p, v],
            _ => [v, p, q],
        }
    }
}

/// Subtractive cyan, magenta, yellow and key (black), all in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Cmyk {
    pub c: f64,
    pub m: f64,
    pub y: f64,
    pub k: f64,
}

impl Cmyk {
    pub fn new(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self { c, m, y, k }
    }

    pub fn from_rgb([r, g, b]: [f64; 3]) -> Self {
        let k = 1.0 - r.max(g).max(b);
        let ink = 1.0 - k;
        if ink < EPSILON {
            return Self::new(0.0, 0.0, 0.0, 1.0);
        }
        Self::new((ink - r) / ink, (ink - g) / ink, (ink - b) / ink, k)
    }

    pub fn to_rgb(&self) -> [f64; 3] {
        let ink = 1.0 - self.k;
        [
            (1.0 - self.c) * ink,
            (1.0 - self.m) * ink,
            (1.0 - self.y) * ink,
        ]
    }
}

/// A linear RGB transform with its precomputed inverse.
pub struct ColorMatrix {
    forward: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl ColorMatrix {
    fn new(forward: Matrix3<f64>) -> Self {
        // All matrices below are non-singular.
        let inverse = forward.try_inverse().unwrap_or_else(Matrix3::identity);
        Self { forward, inverse }
    }

    pub fn forward(&self) -> &Matrix3<f64> {
        &self.forward
    }

    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.inverse
    }

    pub fn apply([a, b, c]: [f64; 3], m: &Matrix3<f64>) -> [f64; 3] {
        let v = m * Vector3::new(a, b, c);
        [v.x, v.y, v.z]
    }
}

/// BT.601 luma weights shared by YUV, YIQ and YCbCr.
const LUMA: [f64; 3] = [0.299, 0.587, 0.114];

/// YUV (BT.601 analog).
pub static YUV_MATRIX: LazyLock<ColorMatrix> = LazyLock::new(|| {
    #[rustfmt::skip]
    let m = Matrix3::new(
        LUMA[0], LUMA[1], LUMA[2],
        -0.147_13, -0.288_86, 0.436,
        0.615, -0.514_99, -0.100_01,
    );
    ColorMatrix::new(m)
});

/// YIQ (NTSC).
pub static YIQ_MATRIX: LazyLock<ColorMatrix> = LazyLock::new(|| {
    #[rustfmt::skip]
    let m = Matrix3::new(
        LUMA[0], LUMA[1], LUMA[2],
        0.595_716, -0.274_453, -0.321_263,
        0.211_456, -0.522_591, 0.311_135,
    );
    ColorMatrix::new(m)
});

/// YCbCr (full-range BT.601 / JFIF) with chroma centered on 0, so the
/// transform stays linear: `Cb, Cr` lie in `[-0.5, 0.5]`.
pub static YCBCR_MATRIX: LazyLock<ColorMatrix> = LazyLock::new(|| {
    #[rustfmt::skip]
    let m = Matrix3::new(
        LUMA[0], LUMA[1], LUMA[2],
        -0.168_736, -0.331_264, 0.5,
        0.5, -0.418_688, -0.081_312,
    );
    ColorMatrix::new(m)
});

macro_rules! matrix_space {
    ($(#[$doc:meta])* $name:ident, $matrix:ident, $y:ident, $c1:ident, $c2:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Default)]
        pub struct $name {
            pub $y: f64,
            pub $c1: f64,
            pub $c2: f64,
        }

        impl $name {
            pub fn new($y: f64, $c1: f64, $c2: f64) -> Self {
                Self { $y, $c1, $c2 }
            }

            pub fn from_rgb(rgb: [f64; 3]) -> Self {
                let [$y, $c1, $c2] = ColorMatrix::apply(rgb, $matrix.forward());
                Self { $y, $c1, $c2 }
            }

            pub fn to_rgb(&self) -> [f64; 3] {
                ColorMatrix::apply([self.$y, self.$c1, self.$c2], $matrix.inverse())
            }
        }
    };
}

matrix_space!(
    /// Luma plus `U`/`V` color differences.
    Yuv, YUV_MATRIX, y, u, v
);
matrix_space!(
    /// Luma plus in-phase/quadrature chroma.
    Yiq, YIQ_MATRIX, y, i, q
);
matrix_space!(
    /// Luma plus blue/red difference chroma.
    YCbCr, YCBCR_MATRIX, y, cb, cr
);

/// CIE L*a*b* under the D65 reference white, from sRGB-encoded channels.
/// `l` is in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    pub fn from_rgb([r, g, b]: [f64; 3]) -> Self {
        let lin: LinSrgb<f64> = Srgb::new(r, g, b).into_linear();
        let lab = CieLab::from_color(lin);
        Self::new(lab.l, lab.a, lab.b)
    }

    pub fn to_rgb(&self) -> [f64; 3] {
        let lin = LinSrgb::<f64>::from_color(CieLab::new(self.l, self.a, self.b));
        let srgb: Srgb<f64> = Srgb::from_linear(lin);
        [srgb.red, srgb.green, srgb.blue]
    }

    /// Euclidean distance of the `(L, a, b)` triples.
    pub fn distance(&self, other: &Lab) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: [f64; 3], b: [f64; 3], tol: f64) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn hsl_primaries() {
        let red = Hsl::from_rgb([1.0, 0.0, 0.0]);
        assert_eq!((red.h, red.s, red.l), (0.0, 1.0, 0.5));
        let blue = Hsl::from_rgb([0.0, 0.0, 1.0]);
        assert!((blue.h - 4.0 * PI / 3.0).abs() < 1e-12);
        assert!(close(blue.to_rgb(), [0.0, 0.0, 1.0], 1e-12));
    }

    #[test]
    fn achromatic_has_no_saturation() {
        let gray = Hsl::from_rgb([0.3, 0.3, 0.3]);
        assert_eq!(gray.s, 0.0);
        assert_eq!(gray.to_rgb(), [0.3, 0.3, 0.3]);
        let hsv = Hsv::from_rgb([0.0, 0.0, 0.0]);
        assert_eq!(hsv.s, 0.0);
        assert_eq!(hsv.to_rgb(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn hsv_round_trip() {
        let rgb = [0.2, 0.7, 0.4];
        assert!(close(Hsv::from_rgb(rgb).to_rgb(), rgb, 1e-12));
    }

    #[test]
    fn cmyk_black_has_no_ink() {
        let k = Cmyk::from_rgb([0.0, 0.0, 0.0]);
        assert_eq!(k, Cmyk::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(k.to_rgb(), [0.0, 0.0, 0.0]);
        let c = Cmyk::from_rgb([0.0, 1.0, 1.0]);
        assert_eq!(c, Cmyk::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn matrix_spaces_round_trip_tightly() {
        let rgb = [0.9, 0.15, 0.42];
        assert!(close(Yuv::from_rgb(rgb).to_rgb(), rgb, 1e-9));
        assert!(close(Yiq::from_rgb(rgb).to_rgb(), rgb, 1e-9));
        assert!(close(YCbCr::from_rgb(rgb).to_rgb(), rgb, 1e-9));
    }

    #[test]
    fn ycbcr_white_has_no_chroma() {
        let white = YCbCr::from_rgb([1.0, 1.0, 1.0]);
        assert!((white.y - 1.0).abs() < 1e-9);
        assert!(white.cb.abs() < 1e-9 && white.cr.abs() < 1e-9);
    }

    #[test]
    fn lab_reference_values() {
        let white = Lab::from_rgb([1.0, 1.0, 1.0]);
        assert!((white.l - 100.0).abs() < 1e-3);
        assert!(white.a.abs() < 1e-3 && white.b.abs() < 1e-3);
        let red = Lab::from_rgb([1.0, 0.0, 0.0]);
        assert!((red.l - 53.24).abs() < 0.05, "L = {}", red.l);
        assert!(close(red.to_rgb(), [1.0, 0.0, 0.0], 1e-4));
    }
}
