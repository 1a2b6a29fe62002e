use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::de::{self, Visitor};

/// One edge inset of a [`Region`]: either a percentage of the page
/// dimension or an absolute pixel count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dim {
    Percent(f32),
    Absolute(f32),
}

impl Dim {
    /// Resolve against the actual dimension, in pixels.
    pub fn resolve(self, dimension: u32) -> f32 {
        match self {
            Dim::Percent(p) => dimension as f32 * p / 100.0,
            Dim::Absolute(v) => v,
        }
    }
}

impl FromStr for Dim {
    type Err = String;

    /// `"3%"` is a percentage, `"87"` is absolute.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(pct) = trimmed.strip_suffix('%') {
            let value: f32 = pct
                .trim()
                .parse()
                .map_err(|_| format!("invalid percentage: '{s}'"))?;
            Ok(Dim::Percent(value))
        } else {
            let value: f32 = trimmed
                .parse()
                .map_err(|_| format!("invalid dimension: '{s}'"))?;
            Ok(Dim::Absolute(value))
        }
    }
}

impl<'de> Deserialize<'de> for Dim {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DimVisitor;

        impl Visitor<'_> for DimVisitor {
            type Value = Dim;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a dimension string like \"3%\" or \"87\", or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Dim, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Dim, E> {
                Ok(Dim::Absolute(v as f32))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Dim, E> {
                Ok(Dim::Absolute(v as f32))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Dim, E> {
                Ok(Dim::Absolute(v as f32))
            }
        }

        deserializer.deserialize_any(DimVisitor)
    }
}

/// A rectangular sub-area of a page, given as edge insets. Immutable,
/// supplied by configuration; evaluated in configured order during
/// classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    pub top: Dim,
    pub right: Dim,
    pub bottom: Dim,
    pub left: Dim,
}

impl Default for Region {
    /// The top strip of the page where split markers are printed. The
    /// bottom inset is absolute, the others are percentages.
    fn default() -> Self {
        Region {
            top: Dim::Percent(3.0),
            right: Dim::Percent(2.0),
            bottom: Dim::Absolute(87.0),
            left: Dim::Percent(2.0),
        }
    }
}

/// Pixel rectangle produced by resolving a [`Region`] against an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Resolve the edge insets against actual image dimensions.
    ///
    /// Returns `None` when the resolved rectangle is degenerate (zero or
    /// negative width/height); callers treat that as "no marker found",
    /// never as an error.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x0 = self.left.resolve(width).max(0.0);
        let x1 = width as f32 - self.right.resolve(width);
        let y0 = self.top.resolve(height).max(0.0);
        let y1 = height as f32 - self.bottom.resolve(height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let x = x0.floor() as u32;
        let y = y0.floor() as u32;
        let w = (x1.ceil() as u32).min(width).saturating_sub(x);
        let h = (y1.ceil() as u32).min(height).saturating_sub(y);

        if w == 0 || h == 0 {
            return None;
        }

        Some(PixelRect {
            x,
            y,
            width: w,
            height: h,
        })
    }
}
