//! 32-bit RGBA color, the wire format shared with external codecs.

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};

use crate::error::{ColorError, Result};

/// Four 8-bit channels laid out in memory as `R, G, B, A`.
///
/// The layout is `#[repr(C)]` and must stay byte-for-byte stable: buffers of
/// `PackedColor` are reinterpreted as raw RGBA bytes by codecs.
/// The 32-bit integer form ([`PackedColor::to_argb`]) is `0xAARRGGBB`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// One of the four stored channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];
}

impl TryFrom<u8> for Channel {
    type Error = ColorError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Channel::R),
            1 => Ok(Channel::G),
            2 => Ok(Channel::B),
            3 => Ok(Channel::A),
            other => Err(ColorError::UnknownChannel(other.to_string())),
        }
    }
}

impl FromStr for Channel {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "red" => Ok(Channel::R),
            "g" | "green" => Ok(Channel::G),
            "b" | "blue" => Ok(Channel::B),
            "a" | "alpha" => Ok(Channel::A),
            _ => Err(ColorError::UnknownChannel(s.to_string())),
        }
    }
}

#[inline]
const fn expand_nibble(v: u32) -> u8 {
    ((v & 0xF) * 0x11) as u8
}

impl PackedColor {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Unpacks `0xAARRGGBB` verbatim.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Interprets an integer literal the way hex color notation does:
    ///
    /// - `<= 0xFFF`: short `RGB`, each nibble replicated (`0xF80` -> `#FF8800`), opaque
    /// - `<= 0xFFFF`: short `ARGB`, each nibble replicated
    /// - `<= 0xFFFFFF`: opaque `RRGGBB`
    /// - otherwise: `AARRGGBB`
    ///
    /// Small values are therefore never read as 24-bit colors; use
    /// [`PackedColor::from_argb`] when the exact packed value is known.
    pub const fn from_hex(value: u32) -> Self {
        if value <= 0xFFF {
            Self::rgb(
                expand_nibble(value >> 8),
                expand_nibble(value >> 4),
                expand_nibble(value),
            )
        } else if value <= 0xFFFF {
            Self::new(
                expand_nibble(value >> 8),
                expand_nibble(value >> 4),
                expand_nibble(value),
                expand_nibble(value >> 12),
            )
        } else if value <= 0xFF_FFFF {
            Self::from_argb(0xFF00_0000 | value)
        } else {
            Self::from_argb(value)
        }
    }

    /// Builds a color from normalized channels, clamping to `[0, 1]` and
    /// rounding to the nearest 8-bit step. NaN maps to 0.
    pub fn from_normalized(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::new(to_byte(r), to_byte(g), to_byte(b), to_byte(a))
    }

    /// Channels as `[r, g, b, a]` in `[0, 1]`.
    pub fn normalized(self) -> [f64; 4] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.a as f64 / 255.0,
        ]
    }

    pub const fn channel(self, channel: Channel) -> u8 {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::A => self.a,
        }
    }

    pub const fn with_channel(mut self, channel: Channel, value: u8) -> Self {
        match channel {
            Channel::R => self.r = value,
            Channel::G => self.g = value,
            Channel::B => self.b = value,
            Channel::A => self.a = value,
        }
        self
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Raw `R, G, B, A` bytes of a pixel slice.
    pub fn as_bytes(pixels: &[PackedColor]) -> &[u8] {
        bytemuck::cast_slice(pixels)
    }

    /// Reinterprets a byte stream as pixels without copying. Fails when the
    /// length is not a multiple of 4.
    pub fn cast_slice(bytes: &[u8]) -> Result<&[PackedColor]> {
        bytemuck::try_cast_slice(bytes).map_err(ColorError::ByteCast)
    }

    pub fn cast_slice_mut(bytes: &mut [u8]) -> Result<&mut [PackedColor]> {
        bytemuck::try_cast_slice_mut(bytes).map_err(ColorError::ByteCast)
    }
}

#[inline]
pub(crate) fn to_byte(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Debug for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedColor({self})")
    }
}

impl fmt::Display for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}

impl FromStr for PackedColor {
    type Err = ColorError;

    /// Parses `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB`; the `#` is optional.
    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        let value = u32::from_str_radix(digits, 16)
            .ok()
            .filter(|_| digits.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ColorError::InvalidHex(s.to_string()))?;

        match digits.len() {
            3 => Ok(Self::rgb(
                expand_nibble(value >> 8),
                expand_nibble(value >> 4),
                expand_nibble(value),
            )),
            4 => Ok(Self::new(
                expand_nibble(value >> 8),
                expand_nibble(value >> 4),
                expand_nibble(value),
                expand_nibble(value >> 12),
            )),
            6 => Ok(Self::from_argb(0xFF00_0000 | value)),
            8 => Ok(Self::from_argb(value)),
            _ => Err(ColorError::InvalidHex(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rgba_bytes() {
        assert_eq!(std::mem::size_of::<PackedColor>(), 4);
        let pixels = [PackedColor::new(1, 2, 3, 4), PackedColor::new(5, 6, 7, 8)];
        assert_eq!(PackedColor::as_bytes(&pixels), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn argb_packing() {
        let c = PackedColor::from_argb(0x80FF_1020);
        assert_eq!(c, PackedColor::new(0xFF, 0x10, 0x20, 0x80));
        assert_eq!(c.to_argb(), 0x80FF_1020);
    }

    #[test]
    fn short_hex_rules() {
        assert_eq!(PackedColor::from_hex(0xF80), PackedColor::rgb(0xFF, 0x88, 0x00));
        assert_eq!(
            PackedColor::from_hex(0x8F00),
            PackedColor::new(0xFF, 0x00, 0x00, 0x88)
        );
        assert_eq!(PackedColor::from_hex(0x12_3456), PackedColor::rgb(0x12, 0x34, 0x56));
        assert_eq!(
            PackedColor::from_hex(0x0112_3456),
            PackedColor::new(0x12, 0x34, 0x56, 0x01)
        );
    }

    #[test]
    fn parse_and_display() -> anyhow::Result<()> {
        assert_eq!("#fff".parse::<PackedColor>()?, PackedColor::WHITE);
        assert_eq!("#00ff00".parse::<PackedColor>()?, PackedColor::GREEN);
        assert_eq!("80FF0000".parse::<PackedColor>()?, PackedColor::new(255, 0, 0, 0x80));
        assert!("#12345".parse::<PackedColor>().is_err());
        assert!("#+12".parse::<PackedColor>().is_err());
        assert_eq!(PackedColor::RED.to_string(), "#FFFF0000");
        Ok(())
    }

    #[test]
    fn byte_cast_requires_whole_pixels() {
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let pixels = PackedColor::cast_slice(&bytes).unwrap();
        assert_eq!(pixels[1], PackedColor::new(4, 5, 6, 7));
        assert!(PackedColor::cast_slice(&bytes[..6]).is_err());
    }

    #[test]
    fn channel_tags() {
        assert_eq!(Channel::try_from(2).unwrap(), Channel::B);
        assert!(matches!(Channel::try_from(4), Err(ColorError::UnknownChannel(_))));
        assert_eq!("Alpha".parse::<Channel>().unwrap(), Channel::A);
        assert!("luma".parse::<Channel>().is_err());
        assert_eq!(PackedColor::RED.with_channel(Channel::G, 9).g, 9);
    }

    #[test]
    fn normalized_rounding() {
        let c = PackedColor::from_normalized(0.5, 1.5, -1.0, f64::NAN);
        assert_eq!(c, PackedColor::new(128, 255, 0, 0));
    }
}
