//! Color lookup for deviation bars

use crate::cost_deviation::ColorBucket;
use serde::Serialize;

/// Renderable color of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorToken {
    /// CSS hex color, e.g. `#22c55e`
    pub hex: &'static str,
    /// RGB components for terminals
    #[serde(skip)]
    pub rgb: (u8, u8, u8),
}

impl ColorToken {
    const fn new(hex: &'static str, rgb: (u8, u8, u8)) -> Self {
        Self { hex, rgb }
    }
}

/// Lookup table from [`ColorBucket`] to [`ColorToken`]
///
/// # Examples
/// ```
/// use costline_deviation::{ColorBucket, ColorPalette};
///
/// let palette = ColorPalette::default();
/// assert_eq!(palette.token(ColorBucket::Below).hex, "#22c55e");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    below: ColorToken,
    moderate: ColorToken,
    elevated: ColorToken,
    extreme: ColorToken,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            below: ColorToken::new("#22c55e", (34, 197, 94)),
            moderate: ColorToken::new("#eab308", (234, 179, 8)),
            elevated: ColorToken::new("#f97316", (249, 115, 22)),
            extreme: ColorToken::new("#ef4444", (239, 68, 68)),
        }
    }
}

impl ColorPalette {
    /// Token for `bucket`
    pub fn token(&self, bucket: ColorBucket) -> ColorToken {
        match bucket {
            ColorBucket::Below => self.below,
            ColorBucket::Moderate => self.moderate,
            ColorBucket::Elevated => self.elevated,
            ColorBucket::Extreme => self.extreme,
        }
    }

    /// Replace the token of one bucket
    pub fn with_token(mut self, bucket: ColorBucket, hex: &'static str, rgb: (u8, u8, u8)) -> Self {
        let token = ColorToken::new(hex, rgb);
        match bucket {
            ColorBucket::Below => self.below = token,
            ColorBucket::Moderate => self.moderate = token,
            ColorBucket::Elevated => self.elevated = token,
            ColorBucket::Extreme => self.extreme = token,
        }
        self
    }
}
