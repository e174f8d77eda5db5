//! The `ColorModel` trait and its colorspace conversions.

use crate::linear::{LinearColor, sanitize01};
use crate::packed::PackedColor;
use crate::space::{Cmyk, Hsl, Hsv, Lab, YCbCr, Yiq, Yuv};

/// Conversions shared by every concrete color representation.
///
/// Implementors only provide the bridge to [`LinearColor`]; every colorspace
/// pair (`to_*` / `from_*`) is derived from it. The `from_*` constructors take
/// the alpha to attach, since none of the target spaces carries one.
pub trait ColorModel: Copy {
    fn to_linear(self) -> LinearColor;
    fn from_linear(color: LinearColor) -> Self;

    fn from_rgb(rgb: [f64; 3], alpha: f64) -> Self {
        let [r, g, b] = rgb;
        Self::from_linear(LinearColor::new(r, g, b, alpha))
    }

    fn alpha(self) -> f64 {
        self.to_linear().a()
    }

    fn to_hsl(self) -> Hsl {
        Hsl::from_rgb(self.to_linear().rgb())
    }

    fn from_hsl(hsl: Hsl, alpha: f64) -> Self {
        Self::from_rgb(hsl.to_rgb(), alpha)
    }

    fn to_hsv(self) -> Hsv {
        Hsv::from_rgb(self.to_linear().rgb())
    }

    fn from_hsv(hsv: Hsv, alpha: f64) -> Self {
        Self::from_rgb(hsv.to_rgb(), alpha)
    }

    fn to_cmyk(self) -> Cmyk {
        Cmyk::from_rgb(self.to_linear().rgb())
    }

    fn from_cmyk(cmyk: Cmyk, alpha: f64) -> Self {
        Self::from_rgb(cmyk.to_rgb(), alpha)
    }

    fn to_yuv(self) -> Yuv {
        Yuv::from_rgb(self.to_linear().rgb())
    }

    fn from_yuv(yuv: Yuv, alpha: f64) -> Self {
        Self::from_rgb(yuv.to_rgb(), alpha)
    }

    fn to_yiq(self) -> Yiq {
        Yiq::from_rgb(self.to_linear().rgb())
    }

    fn from_yiq(yiq: Yiq, alpha: f64) -> Self {
        Self::from_rgb(yiq.to_rgb(), alpha)
    }

    fn to_ycbcr(self) -> YCbCr {
        YCbCr::from_rgb(self.to_linear().rgb())
    }

    fn from_ycbcr(ycbcr: YCbCr, alpha: f64) -> Self {
        Self::from_rgb(ycbcr.to_rgb(), alpha)
    }

    fn to_lab(self) -> Lab {
        Lab::from_rgb(self.to_linear().rgb())
    }

    fn from_lab(lab: Lab, alpha: f64) -> Self {
        Self::from_rgb(lab.to_rgb(), alpha)
    }

    /// Perceptual distance: Euclidean distance in CIE L*a*b*.
    fn lab_distance(self, other: Self) -> f64 {
        self.to_lab().distance(&other.to_lab())
    }

    /// Arithmetic mean of R, G and B.
    fn average(self) -> f64 {
        let [r, g, b] = self.to_linear().rgb();
        (r + g + b) / 3.0
    }

    /// Perceptual gray level: CIE L* scaled to `[0, 1]`.
    fn cie_gray(self) -> f64 {
        sanitize01(self.to_lab().l / 100.0)
    }

    /// BT.601 weighted luma.
    fn luma(self) -> f64 {
        let [r, g, b] = self.to_linear().rgb();
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// Raises each color channel to `gamma`; alpha is untouched.
    fn gamma(self, gamma: f64) -> Self {
        let c = self.to_linear();
        let [r, g, b] = c.rgb();
        Self::from_linear(LinearColor::new(
            r.powf(gamma),
            g.powf(gamma),
            b.powf(gamma),
            c.a(),
        ))
    }

    /// Raises each color channel to `1 / gamma`; alpha is untouched.
    fn inverse_gamma(self, gamma: f64) -> Self {
        self.gamma(1.0 / gamma)
    }
}

impl ColorModel for LinearColor {
    fn to_linear(self) -> LinearColor {
        self
    }

    fn from_linear(color: LinearColor) -> Self {
        color
    }
}

impl ColorModel for PackedColor {
    fn to_linear(self) -> LinearColor {
        LinearColor::from(self)
    }

    fn from_linear(color: LinearColor) -> Self {
        PackedColor::from(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn within_one(a: PackedColor, b: PackedColor) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 1;
        d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b) && a.a == b.a
    }

    fn packed() -> impl Strategy<Value = PackedColor> {
        any::<u32>().prop_map(PackedColor::from_argb)
    }

    proptest! {
        #[test]
        fn hsl_round_trip(c in packed()) {
            let back = PackedColor::from_hsl(c.to_hsl(), c.alpha());
            prop_assert!(within_one(back, c), "{c} -> {back}");
        }

        #[test]
        fn hsv_round_trip(c in packed()) {
            let back = PackedColor::from_hsv(c.to_hsv(), c.alpha());
            prop_assert!(within_one(back, c), "{c} -> {back}");
        }

        #[test]
        fn cmyk_round_trip(c in packed()) {
            let back = PackedColor::from_cmyk(c.to_cmyk(), c.alpha());
            prop_assert!(within_one(back, c), "{c} -> {back}");
        }

        #[test]
        fn matrix_round_trips(c in packed()) {
            let a = c.alpha();
            prop_assert!(within_one(PackedColor::from_yuv(c.to_yuv(), a), c));
            prop_assert!(within_one(PackedColor::from_yiq(c.to_yiq(), a), c));
            prop_assert!(within_one(PackedColor::from_ycbcr(c.to_ycbcr(), a), c));
        }

        #[test]
        fn hue_stays_in_range(c in packed()) {
            let h = c.to_hsl().h;
            prop_assert!((0.0..std::f64::consts::TAU).contains(&h));
        }
    }

    #[test]
    fn average_and_cie_gray_diverge_on_saturated_colors() {
        for c in [PackedColor::RED, PackedColor::GREEN, PackedColor::YELLOW] {
            assert!(
                (c.average() - c.cie_gray()).abs() > 0.05,
                "{c}: average {} cie gray {}",
                c.average(),
                c.cie_gray()
            );
        }
        assert!((PackedColor::RED.average() - 1.0 / 3.0).abs() < 1e-12);
        assert!(PackedColor::GREEN.cie_gray() > 0.85);
    }

    #[test]
    fn gamma_keeps_alpha() {
        let c = LinearColor::new(0.25, 0.5, 1.0, 0.3);
        let g = c.gamma(2.0);
        assert_eq!(g.rgb(), [0.0625, 0.25, 1.0]);
        assert_eq!(g.a(), 0.3);
        let back = g.inverse_gamma(2.0);
        assert!((back.r() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn lab_distance_is_zero_for_identical() {
        assert_eq!(PackedColor::CYAN.lab_distance(PackedColor::CYAN), 0.0);
        assert!(PackedColor::BLACK.lab_distance(PackedColor::WHITE) > 99.0);
    }
}
