use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::{Error, Result};

/// An sRGB color with channels in `[0, 255]` and an alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0.0, 0.0, 0.0);

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Returns the color channels without the alpha.
    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Parses a css color string.
    ///
    /// Supported are named colors, `#rgb`, `#rrggbb`, `rgb(r, g, b)` and
    /// `rgba(r, g, b, a)`.
    pub fn parse_css(css: &str) -> Result<Self> {
        let css = css.trim();
        let lower = css.to_ascii_lowercase();

        if let Some(color) = Self::resolve_named(&lower) {
            Ok(color)
        } else if let Some(hex) = lower.strip_prefix('#') {
            Self::resolve_hex(hex).ok_or_else(|| Error::InvalidColor(css.into()))
        } else if lower.starts_with("rgb") {
            Self::resolve_rgb(&lower).ok_or_else(|| Error::InvalidColor(css.into()))
        } else {
            Err(Error::InvalidColor(css.into()))
        }
    }

    fn resolve_hex(hex: &str) -> Option<Self> {
        let digits = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as f64))
            .collect::<Option<Vec<_>>>()?;

        match digits.as_slice() {
            [r, g, b] => Some(Self::opaque(r * 17.0, g * 17.0, b * 17.0)),
            [r1, r0, g1, g0, b1, b0] => Some(Self::opaque(
                r1 * 16.0 + r0,
                g1 * 16.0 + g0,
                b1 * 16.0 + b0,
            )),
            _ => None,
        }
    }

    fn resolve_rgb(rgb: &str) -> Option<Self> {
        static MATCHER: OnceCell<Regex> = OnceCell::new();
        let matcher = MATCHER.get_or_init(|| {
            Regex::new(
                r"^rgba?\(\s*(?<R>[0-9]*\.?[0-9]+)\s*,\s*(?<G>[0-9]*\.?[0-9]+)\s*,\s*(?<B>[0-9]*\.?[0-9]+)\s*(,\s*(?<A>[0-9]*\.?[0-9]+)\s*)?\)$",
            )
            .expect("the rgb pattern is valid")
        });
        let captures = matcher.captures(rgb)?;

        let channel = |name: &str| -> Option<f64> {
            let value = captures.name(name)?.as_str().parse::<f64>().ok()?;
            Some(value.clamp(0.0, 255.0))
        };
        let alpha = match captures.name("A") {
            Some(a) => a.as_str().parse::<f64>().ok()?.clamp(0.0, 1.0),
            None => 1.0,
        };

        Some(Self {
            r: channel("R")?,
            g: channel("G")?,
            b: channel("B")?,
            a: alpha,
        })
    }

    fn resolve_named(name: &str) -> Option<Self> {
        let [r, g, b] = match name {
            "black" => [0, 0, 0],
            "white" => [255, 255, 255],
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "lime" => [0, 255, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "cyan" | "aqua" => [0, 255, 255],
            "magenta" | "fuchsia" => [255, 0, 255],
            "orange" => [255, 165, 0],
            "purple" => [128, 0, 128],
            "navy" => [0, 0, 128],
            "teal" => [0, 128, 128],
            "maroon" => [128, 0, 0],
            "olive" => [128, 128, 0],
            "silver" => [192, 192, 192],
            "gray" | "grey" => [128, 128, 128],
            "darkgray" | "darkgrey" => [169, 169, 169],
            "lightgray" | "lightgrey" => [211, 211, 211],
            "steelblue" => [70, 130, 180],
            "tomato" => [255, 99, 71],
            "gold" => [255, 215, 0],
            "transparent" => {
                return Some(Self {
                    a: 0.0,
                    ..Self::BLACK
                })
            }
            _ => return None,
        };

        Some(Self::opaque(r as f64, g as f64, b as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            Rgba::parse_css("#444").unwrap(),
            Rgba::opaque(68.0, 68.0, 68.0)
        );
        assert_eq!(
            Rgba::parse_css("#FF8000").unwrap(),
            Rgba::opaque(255.0, 128.0, 0.0)
        );
        assert!(Rgba::parse_css("#12345").is_err());
    }

    #[test]
    fn parses_rgb_functions() {
        assert_eq!(
            Rgba::parse_css("rgb(5, 10, 172)").unwrap(),
            Rgba::opaque(5.0, 10.0, 172.0)
        );
        let c = Rgba::parse_css("rgba(0,0,0,0.25)").unwrap();
        assert_eq!(c.a, 0.25);
        assert!(Rgba::parse_css("rgb(1, 2)").is_err());
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(Rgba::parse_css("Magenta").unwrap(), Rgba::opaque(255.0, 0.0, 255.0));
        assert!(matches!(
            Rgba::parse_css("no-such-color"),
            Err(Error::InvalidColor(_))
        ));
    }
}
