//! Color values with format-preserving parsing and OkLCH-space operations.
//!
//! A parsed color remembers the textual format it arrived in (hex, rgb,
//! hsl, oklch, named) so that derivative outputs from `darken`/`lighten`/
//! `contrast`/`shade` round-trip in the author's chosen space. Named
//! colors have no derivative textual form and fall back to hex.

use crate::dimension::Dimension;
use crate::error::BuildError;

/// Original textual format of a parsed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Hex,
    Rgb,
    Hsl,
    Oklch,
    Named,
}

/// An immutable color: sRGB components in 0..=1 plus the source format tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub format: ColorFormat,
}

impl Color {
    pub fn from_rgb8(r: u8, g: u8, b: u8, format: ColorFormat) -> Self {
        Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            format,
        }
    }

    /// Parse any supported color syntax: `#rgb`/`#rrggbb` (hash optional),
    /// `rgb(...)`, `hsl(...)`, `oklch(l% c h)`, or a CSS named color.
    pub fn parse(input: &str) -> Result<Color, BuildError> {
        let s = input.trim();
        let err = |message: String| BuildError::Color {
            input: input.to_string(),
            message,
        };
        if let Some(rest) = s.strip_prefix('#') {
            return parse_hex(rest).ok_or_else(|| err("invalid hex color".to_string()));
        }
        let lower = s.to_ascii_lowercase();
        if let Some(inner) = func_body(&lower, "rgb") {
            return parse_rgb(inner).ok_or_else(|| err("invalid rgb() color".to_string()));
        }
        if let Some(inner) = func_body(&lower, "hsl") {
            return parse_hsl(inner).ok_or_else(|| err("invalid hsl() color".to_string()));
        }
        if let Some(inner) = func_body(&lower, "oklch") {
            return parse_oklch(inner).ok_or_else(|| err("invalid oklch() color".to_string()));
        }
        if let Some((r, g, b)) = named_color(&lower) {
            return Ok(Color::from_rgb8(r, g, b, ColorFormat::Named));
        }
        // Bare hex without '#'
        if s.len() == 3 || s.len() == 6 {
            if let Some(c) = parse_hex(s) {
                return Ok(c);
            }
        }
        Err(err("unrecognized color syntax".to_string()))
    }

    pub fn is_color(input: &str) -> bool {
        Color::parse(input).is_ok()
    }

    /// Format in the color's source space. Named colors emit hex.
    pub fn format(&self) -> String {
        self.format_as(self.format)
    }

    pub fn format_as(&self, format: ColorFormat) -> String {
        let r8 = (self.r.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g8 = (self.g.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b8 = (self.b.clamp(0.0, 1.0) * 255.0).round() as u8;
        match format {
            ColorFormat::Hex | ColorFormat::Named => format!("#{:02x}{:02x}{:02x}", r8, g8, b8),
            ColorFormat::Rgb => format!("rgb({}, {}, {})", r8, g8, b8),
            ColorFormat::Hsl => {
                let (h, s, l) = self.to_hsl();
                format!(
                    "hsl({}, {}%, {}%)",
                    Dimension::format_value(h),
                    Dimension::format_value(s * 100.0),
                    Dimension::format_value(l * 100.0)
                )
            }
            ColorFormat::Oklch => {
                let (l, c, h) = self.to_oklch();
                format!(
                    "oklch({}% {} {})",
                    Dimension::format_value(l * 100.0),
                    Dimension::format_value(c),
                    Dimension::format_value(h)
                )
            }
        }
    }

    // ── Color-space conversions ──────────────────────────────────────

    /// OkLCH components: lightness 0..1, chroma, hue in degrees 0..360.
    pub fn to_oklch(&self) -> (f64, f64, f64) {
        let (l, a, b) = self.to_oklab();
        let c = (a * a + b * b).sqrt();
        let mut h = b.atan2(a).to_degrees();
        if h < 0.0 {
            h += 360.0;
        }
        // Hue of an achromatic color is meaningless noise
        if c < 1e-6 {
            h = 0.0;
        }
        (l, c, h)
    }

    pub fn from_oklch(l: f64, c: f64, h: f64, format: ColorFormat) -> Color {
        let hr = h.to_radians();
        Color::from_oklab(l, c * hr.cos(), c * hr.sin(), format)
    }

    fn to_oklab(&self) -> (f64, f64, f64) {
        let r = srgb_to_linear(self.r);
        let g = srgb_to_linear(self.g);
        let b = srgb_to_linear(self.b);
        let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
        let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
        let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;
        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();
        (
            0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_,
            1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_,
            0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_,
        )
    }

    fn from_oklab(l: f64, a: f64, b: f64, format: ColorFormat) -> Color {
        let l_ = l + 0.3963377774 * a + 0.2158037573 * b;
        let m_ = l - 0.1055613458 * a - 0.0638541728 * b;
        let s_ = l - 0.0894841775 * a - 1.2914855480 * b;
        let lin_l = l_ * l_ * l_;
        let lin_m = m_ * m_ * m_;
        let lin_s = s_ * s_ * s_;
        let r = 4.0767416621 * lin_l - 3.3077115913 * lin_m + 0.2309699292 * lin_s;
        let g = -1.2684380046 * lin_l + 2.6097574011 * lin_m - 0.3413193965 * lin_s;
        let bb = -0.0041960863 * lin_l - 0.7034186147 * lin_m + 1.7076147010 * lin_s;
        Color {
            r: linear_to_srgb(r).clamp(0.0, 1.0),
            g: linear_to_srgb(g).clamp(0.0, 1.0),
            b: linear_to_srgb(bb).clamp(0.0, 1.0),
            format,
        }
    }

    fn to_hsl(&self) -> (f64, f64, f64) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) / 2.0;
        if (max - min).abs() < 1e-9 {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == self.r {
            ((self.g - self.b) / d).rem_euclid(6.0)
        } else if max == self.g {
            (self.b - self.r) / d + 2.0
        } else {
            (self.r - self.g) / d + 4.0
        };
        ((h * 60.0).rem_euclid(360.0), s, l)
    }

    // ── OkLCH operations ─────────────────────────────────────────────

    /// `L' = L * (1 - amount)`, clamped to >= 0.
    pub fn darken(&self, amount: f64) -> Color {
        let (l, c, h) = self.to_oklch();
        Color::from_oklch((l * (1.0 - amount)).max(0.0), c, h, self.format)
    }

    /// `L' = L + (1 - L) * amount`, clamped to <= 1.
    pub fn lighten(&self, amount: f64) -> Color {
        let (l, c, h) = self.to_oklch();
        Color::from_oklch((l + (1.0 - l) * amount).min(1.0), c, h, self.format)
    }

    /// WCAG relative luminance.
    pub fn relative_luminance(&self) -> f64 {
        0.2126 * srgb_to_linear(self.r)
            + 0.7152 * srgb_to_linear(self.g)
            + 0.0722 * srgb_to_linear(self.b)
    }

    /// WCAG contrast ratio, always >= 1.
    pub fn contrast_ratio(&self, other: &Color) -> f64 {
        let la = self.relative_luminance();
        let lb = other.relative_luminance();
        let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
        (hi + 0.05) / (lo + 0.05)
    }

    /// WCAG-AA content color for this background: white, then black, each
    /// against a 4.5:1 threshold; otherwise a near-neutral synthesized in
    /// OkLCH (L=0.15 over light backgrounds, L=0.95 over dark, chroma cut
    /// to 15% of the background's); if still below threshold, whichever of
    /// black/white has the higher ratio.
    pub fn content_color(&self) -> Color {
        const AA: f64 = 4.5;
        let white = Color {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            format: self.format,
        };
        let black = Color {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            format: self.format,
        };
        if self.contrast_ratio(&white) >= AA {
            return white;
        }
        if self.contrast_ratio(&black) >= AA {
            return black;
        }
        let (l, c, h) = self.to_oklch();
        let target_l = if l >= 0.5 { 0.15 } else { 0.95 };
        let neutral = Color::from_oklch(target_l, c * 0.15, h, self.format);
        if self.contrast_ratio(&neutral) >= AA {
            return neutral;
        }
        if self.contrast_ratio(&black) >= self.contrast_ratio(&white) {
            black
        } else {
            white
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Extract the body of `name(...)`, or None if `s` is not that call.
fn func_body<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?;
    // Tolerate rgba()/hsla() spellings
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('(')?;
    let rest = rest.strip_suffix(')')?;
    Some(rest)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let (r, g, b) = match hex.len() {
        3 => {
            let v: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).unwrap_or(0) as u8)
                .collect();
            (v[0] * 17, v[1] * 17, v[2] * 17)
        }
        6 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    Some(Color::from_rgb8(r, g, b, ColorFormat::Hex))
}

/// Split a function body on commas or whitespace, dropping a `/ alpha` tail.
fn split_components(body: &str) -> Vec<&str> {
    let body = body.split('/').next().unwrap_or(body);
    body.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_rgb(body: &str) -> Option<Color> {
    let parts = split_components(body);
    if parts.len() < 3 {
        return None;
    }
    let mut vals = [0.0f64; 3];
    for (i, p) in parts.iter().take(3).enumerate() {
        vals[i] = if let Some(pct) = p.strip_suffix('%') {
            pct.parse::<f64>().ok()? * 255.0 / 100.0
        } else {
            p.parse::<f64>().ok()?
        };
    }
    Some(Color {
        r: (vals[0] / 255.0).clamp(0.0, 1.0),
        g: (vals[1] / 255.0).clamp(0.0, 1.0),
        b: (vals[2] / 255.0).clamp(0.0, 1.0),
        format: ColorFormat::Rgb,
    })
}

fn parse_hsl(body: &str) -> Option<Color> {
    let parts = split_components(body);
    if parts.len() < 3 {
        return None;
    }
    let h = parts[0]
        .strip_suffix("deg")
        .unwrap_or(parts[0])
        .parse::<f64>()
        .ok()?;
    let s = parts[1].strip_suffix('%')?.parse::<f64>().ok()? / 100.0;
    let l = parts[2].strip_suffix('%')?.parse::<f64>().ok()? / 100.0;
    let (r, g, b) = hsl_to_rgb(h.rem_euclid(360.0), s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    Some(Color {
        r,
        g,
        b,
        format: ColorFormat::Hsl,
    })
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (r1 + m, g1 + m, b1 + m)
}

/// `oklch(l% c h)` with lightness as a percentage or a 0..1 number.
fn parse_oklch(body: &str) -> Option<Color> {
    let parts = split_components(body);
    if parts.len() < 3 {
        return None;
    }
    let l = if let Some(pct) = parts[0].strip_suffix('%') {
        pct.parse::<f64>().ok()? / 100.0
    } else {
        parts[0].parse::<f64>().ok()?
    };
    let c = parts[1].parse::<f64>().ok()?;
    let h = parts[2]
        .strip_suffix("deg")
        .unwrap_or(parts[2])
        .parse::<f64>()
        .ok()?;
    Some(Color::from_oklch(
        l.clamp(0.0, 1.0),
        c.max(0.0),
        h,
        ColorFormat::Oklch,
    ))
}

/// CSS named colors (CSS Color Module Level 4 keyword table).
fn named_color(name: &str) -> Option<(u8, u8, u8)> {
    let rgb = match name {
        "aliceblue" => (240, 248, 255),
        "antiquewhite" => (250, 235, 215),
        "aqua" | "cyan" => (0, 255, 255),
        "aquamarine" => (127, 255, 212),
        "azure" => (240, 255, 255),
        "beige" => (245, 245, 220),
        "bisque" => (255, 228, 196),
        "black" => (0, 0, 0),
        "blanchedalmond" => (255, 235, 205),
        "blue" => (0, 0, 255),
        "blueviolet" => (138, 43, 226),
        "brown" => (165, 42, 42),
        "burlywood" => (222, 184, 135),
        "cadetblue" => (95, 158, 160),
        "chartreuse" => (127, 255, 0),
        "chocolate" => (210, 105, 30),
        "coral" => (255, 127, 80),
        "cornflowerblue" => (100, 149, 237),
        "cornsilk" => (255, 248, 220),
        "crimson" => (220, 20, 60),
        "darkblue" => (0, 0, 139),
        "darkcyan" => (0, 139, 139),
        "darkgoldenrod" => (184, 134, 11),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "darkgreen" => (0, 100, 0),
        "darkkhaki" => (189, 183, 107),
        "darkmagenta" => (139, 0, 139),
        "darkolivegreen" => (85, 107, 47),
        "darkorange" => (255, 140, 0),
        "darkorchid" => (153, 50, 204),
        "darkred" => (139, 0, 0),
        "darksalmon" => (233, 150, 122),
        "darkseagreen" => (143, 188, 143),
        "darkslateblue" => (72, 61, 139),
        "darkslategray" | "darkslategrey" => (47, 79, 79),
        "darkturquoise" => (0, 206, 209),
        "darkviolet" => (148, 0, 211),
        "deeppink" => (255, 20, 147),
        "deepskyblue" => (0, 191, 255),
        "dimgray" | "dimgrey" => (105, 105, 105),
        "dodgerblue" => (30, 144, 255),
        "firebrick" => (178, 34, 34),
        "floralwhite" => (255, 250, 240),
        "forestgreen" => (34, 139, 34),
        "fuchsia" | "magenta" => (255, 0, 255),
        "gainsboro" => (220, 220, 220),
        "ghostwhite" => (248, 248, 255),
        "gold" => (255, 215, 0),
        "goldenrod" => (218, 165, 32),
        "gray" | "grey" => (128, 128, 128),
        "green" => (0, 128, 0),
        "greenyellow" => (173, 255, 47),
        "honeydew" => (240, 255, 240),
        "hotpink" => (255, 105, 180),
        "indianred" => (205, 92, 92),
        "indigo" => (75, 0, 130),
        "ivory" => (255, 255, 240),
        "khaki" => (240, 230, 140),
        "lavender" => (230, 230, 250),
        "lavenderblush" => (255, 240, 245),
        "lawngreen" => (124, 252, 0),
        "lemonchiffon" => (255, 250, 205),
        "lightblue" => (173, 216, 230),
        "lightcoral" => (240, 128, 128),
        "lightcyan" => (224, 255, 255),
        "lightgoldenrodyellow" => (250, 250, 210),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "lightgreen" => (144, 238, 144),
        "lightpink" => (255, 182, 193),
        "lightsalmon" => (255, 160, 122),
        "lightseagreen" => (32, 178, 170),
        "lightskyblue" => (135, 206, 250),
        "lightslategray" | "lightslategrey" => (119, 136, 153),
        "lightsteelblue" => (176, 196, 222),
        "lightyellow" => (255, 255, 224),
        "lime" => (0, 255, 0),
        "limegreen" => (50, 205, 50),
        "linen" => (250, 240, 230),
        "maroon" => (128, 0, 0),
        "mediumaquamarine" => (102, 205, 170),
        "mediumblue" => (0, 0, 205),
        "mediumorchid" => (186, 85, 211),
        "mediumpurple" => (147, 112, 219),
        "mediumseagreen" => (60, 179, 113),
        "mediumslateblue" => (123, 104, 238),
        "mediumspringgreen" => (0, 250, 154),
        "mediumturquoise" => (72, 209, 204),
        "mediumvioletred" => (199, 21, 133),
        "midnightblue" => (25, 25, 112),
        "mintcream" => (245, 255, 250),
        "mistyrose" => (255, 228, 225),
        "moccasin" => (255, 228, 181),
        "navajowhite" => (255, 222, 173),
        "navy" => (0, 0, 128),
        "oldlace" => (253, 245, 230),
        "olive" => (128, 128, 0),
        "olivedrab" => (107, 142, 35),
        "orange" => (255, 165, 0),
        "orangered" => (255, 69, 0),
        "orchid" => (218, 112, 214),
        "palegoldenrod" => (238, 232, 170),
        "palegreen" => (152, 251, 152),
        "paleturquoise" => (175, 238, 238),
        "palevioletred" => (219, 112, 147),
        "papayawhip" => (255, 239, 213),
        "peachpuff" => (255, 218, 185),
        "peru" => (205, 133, 63),
        "pink" => (255, 192, 203),
        "plum" => (221, 160, 221),
        "powderblue" => (176, 224, 230),
        "purple" => (128, 0, 128),
        "rebeccapurple" => (102, 51, 153),
        "red" => (255, 0, 0),
        "rosybrown" => (188, 143, 143),
        "royalblue" => (65, 105, 225),
        "saddlebrown" => (139, 69, 19),
        "salmon" => (250, 128, 114),
        "sandybrown" => (244, 164, 96),
        "seagreen" => (46, 139, 87),
        "seashell" => (255, 245, 238),
        "sienna" => (160, 82, 45),
        "silver" => (192, 192, 192),
        "skyblue" => (135, 206, 235),
        "slateblue" => (106, 90, 205),
        "slategray" | "slategrey" => (112, 128, 144),
        "snow" => (255, 250, 250),
        "springgreen" => (0, 255, 127),
        "steelblue" => (70, 130, 180),
        "tan" => (210, 180, 140),
        "teal" => (0, 128, 128),
        "thistle" => (216, 191, 216),
        "tomato" => (255, 99, 71),
        "turquoise" => (64, 224, 208),
        "violet" => (238, 130, 238),
        "wheat" => (245, 222, 179),
        "white" => (255, 255, 255),
        "whitesmoke" => (245, 245, 245),
        "yellow" => (255, 255, 0),
        "yellowgreen" => (154, 205, 50),
        _ => return None,
    };
    Some(rgb)
}
