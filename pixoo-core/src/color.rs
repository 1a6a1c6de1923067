/*!
24-bit RGB colors and the stock palette.

Colors travel as `#rrggbb` strings on the wire and in the archive payload.
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{PixooError, Result};

/// An opaque 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// The empty cell color (opaque black)
    pub const EMPTY: Color = Color::rgb(0, 0, 0);

    /// Color selected when a fresh paint session starts
    pub const DEFAULT_PAINT: Color = Color::rgb(0xff, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string (hex digits are case-insensitive)
    ///
    /// # Example
    /// ```rust
    /// use pixoo_core::Color;
    ///
    /// let red = Color::from_hex("#FF0000")?;
    /// assert_eq!(red, Color::rgb(255, 0, 0));
    /// assert_eq!(red.to_hex(), "#ff0000");
    /// # Ok::<(), pixoo_core::PixooError>(())
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| PixooError::validation(format!("Color must start with '#': {hex}")))?;

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PixooError::validation(format!(
                "Color must be #RRGGBB: {hex}"
            )));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| PixooError::validation(format!("Invalid color {hex}: {e}")))
        };

        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb` representation
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = PixooError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Stock palette offered by the editor, six rows of four
pub const PALETTE: [Color; 24] = [
    // primary
    Color::rgb(0xff, 0x00, 0x00),
    Color::rgb(0x00, 0xff, 0x00),
    Color::rgb(0x00, 0x00, 0xff),
    Color::rgb(0xff, 0xff, 0x00),
    Color::rgb(0xff, 0x00, 0xff),
    Color::rgb(0x00, 0xff, 0xff),
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0x00, 0x00, 0x00),
    // pastels
    Color::rgb(0xff, 0xb3, 0xba),
    Color::rgb(0xba, 0xff, 0xc9),
    Color::rgb(0xba, 0xe1, 0xff),
    Color::rgb(0xff, 0xff, 0xba),
    // dark shades
    Color::rgb(0x80, 0x00, 0x00),
    Color::rgb(0x00, 0x80, 0x00),
    Color::rgb(0x00, 0x00, 0x80),
    Color::rgb(0x80, 0x80, 0x00),
    // vibrant
    Color::rgb(0xff, 0x45, 0x00),
    Color::rgb(0x32, 0xcd, 0x32),
    Color::rgb(0x41, 0x69, 0xe1),
    Color::rgb(0xff, 0xd7, 0x00),
    // soft
    Color::rgb(0xff, 0xa0, 0x7a),
    Color::rgb(0x98, 0xfb, 0x98),
    Color::rgb(0x87, 0xce, 0xeb),
    Color::rgb(0xdd, 0xa0, 0xdd),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let color = Color::from_hex("#FFB3BA").unwrap();
        assert_eq!(color, Color::rgb(0xff, 0xb3, 0xba));
        assert_eq!(color.to_string(), "#ffb3ba");
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!(Color::from_hex("ff0000").is_err());
        assert!(Color::from_hex("#ff00").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#ff00000").is_err());
        assert!("#+f0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_empty_is_black() {
        assert_eq!(Color::default(), Color::EMPTY);
        assert_eq!(Color::EMPTY.to_hex(), "#000000");
        assert!(Color::EMPTY.is_empty());
        assert!(!Color::DEFAULT_PAINT.is_empty());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(0, 0, 0xff)).unwrap();
        assert_eq!(json, "\"#0000ff\"");

        let color: Color = serde_json::from_str("\"#00FF00\"").unwrap();
        assert_eq!(color, Color::rgb(0, 0xff, 0));

        assert!(serde_json::from_str::<Color>("\"green\"").is_err());
    }

    #[test]
    fn test_palette_has_no_duplicates() {
        let unique: std::collections::HashSet<_> = PALETTE.iter().collect();
        assert_eq!(unique.len(), PALETTE.len());
        assert!(PALETTE.contains(&Color::DEFAULT_PAINT));
    }
}
