//! RGB text colors and HSV conversion.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("'{0}' is not a named color or #rrggbb hex code")]
    Unknown(String),
    #[error("HSV component {name} = {value} is outside [0, 1]")]
    OutOfRange { name: &'static str, value: String },
}

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextColor(u32);

/// The sixteen legacy chat colors.
pub const NAMED_COLORS: [(&str, TextColor); 16] = [
    ("black", TextColor(0x000000)),
    ("dark_blue", TextColor(0x0000aa)),
    ("dark_green", TextColor(0x00aa00)),
    ("dark_aqua", TextColor(0x00aaaa)),
    ("dark_red", TextColor(0xaa0000)),
    ("dark_purple", TextColor(0xaa00aa)),
    ("gold", TextColor(0xffaa00)),
    ("gray", TextColor(0xaaaaaa)),
    ("dark_gray", TextColor(0x555555)),
    ("blue", TextColor(0x5555ff)),
    ("green", TextColor(0x55ff55)),
    ("aqua", TextColor(0x55ffff)),
    ("red", TextColor(0xff5555)),
    ("light_purple", TextColor(0xff55ff)),
    ("yellow", TextColor(0xffff55)),
    ("white", TextColor(0xffffff)),
];

impl TextColor {
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0xffffff)
    }

    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn red(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn blue(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        // "grey" spellings are accepted as well
        let name = name.replace("grey", "gray");
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, color)| *color)
    }

    /// Name of this color if it is one of the legacy colors.
    pub fn name(self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, color)| *color == self)
            .map(|(n, _)| *n)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::new)
    }

    /// Converts from float channels in [0, 1], truncating like the client does.
    fn from_float_rgb(red: f32, green: f32, blue: f32) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Self::from_rgb(channel(red), channel(green), channel(blue))
    }

    pub fn from_hsv(hsv: Hsv) -> Self {
        let Hsv { h, s, v } = hsv;
        if s == 0.0 {
            return Self::from_float_rgb(v, v, v);
        }

        let h = h * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        // A hue of exactly 1.0 wraps around to red
        match (sector as i32).rem_euclid(6) {
            0 => Self::from_float_rgb(v, t, p),
            1 => Self::from_float_rgb(q, v, p),
            2 => Self::from_float_rgb(p, v, t),
            3 => Self::from_float_rgb(p, q, v),
            4 => Self::from_float_rgb(t, p, v),
            _ => Self::from_float_rgb(v, p, q),
        }
    }

    pub fn as_hsv(self) -> Hsv {
        let r = self.red() as f32 / 255.0;
        let g = self.green() as f32 / 255.0;
        let b = self.blue() as f32 / 255.0;

        let min = r.min(g.min(b));
        let max = r.max(g.max(b));
        let delta = max - min;

        let s = if max != 0.0 { delta / max } else { 0.0 };
        if s == 0.0 {
            return Hsv { h: 0.0, s, v: max };
        }

        let mut h = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        h *= 60.0;
        if h < 0.0 {
            h += 360.0;
        }

        Hsv {
            h: h / 360.0,
            s,
            v: max,
        }
    }

    /// Scales each HSV component by its ratio, clamping the results to [0, 1].
    pub fn modify_hsv(self, h_ratio: f32, s_ratio: f32, v_ratio: f32) -> Self {
        let Hsv { h, s, v } = self.as_hsv();
        Self::from_hsv(Hsv {
            h: clamp_unit(h * h_ratio),
            s: clamp_unit(s * s_ratio),
            v: clamp_unit(v * v_ratio),
        })
    }

    /// Random hue with saturation and value kept in the upper half so the
    /// color stays readable on the dark chat background.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_hsv(Hsv {
            h: rng.r#gen::<f32>(),
            s: rng.gen_range(0.5..1.0),
            v: rng.gen_range(0.5..1.0),
        })
    }
}

/// NaN counts as 0.
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "#{:06x}", self.0),
        }
    }
}

impl FromStr for TextColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::named(s)
            .or_else(|| Self::from_hex(s))
            .ok_or_else(|| ColorError::Unknown(s.to_string()))
    }
}

/// Hue, saturation and value, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn new(h: f32, s: f32, v: f32) -> Result<Self, ColorError> {
        for (name, value) in [("h", h), ("s", s), ("v", v)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ColorError::OutOfRange {
                    name,
                    value: value.to_string(),
                });
            }
        }
        Ok(Self { h, s, v })
    }
}
