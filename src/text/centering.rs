//! Approximate centering of chat lines.
//!
//! Widths come from the client's default font. Every glyph is followed by a
//! one pixel gap and bold glyphs are one pixel wider.

use super::component::{Component, Style};
use super::flatten::{ComponentFlattener, FlattenerListener};

/// Horizontal center of the chat box in pixels.
pub const CENTER_PX: i32 = 154;

/// Width of a space including the trailing gap.
const SPACE_ADVANCE: i32 = 4;

pub fn glyph_width(c: char) -> i32 {
    match c {
        'i' | 'l' | '!' | ',' | '.' | ':' | ';' | '|' | '\'' => 1,
        '`' => 2,
        'I' | '[' | ']' | ' ' | '"' => 3,
        'f' | 'k' | 't' | '(' | ')' | '{' | '}' | '<' | '>' => 4,
        '@' | '~' => 6,
        c if c.is_ascii_alphanumeric() => 5,
        '#' | '$' | '%' | '^' | '&' | '*' | '-' | '_' | '+' | '=' | '?' | '/' | '\\' => 5,
        _ => 4,
    }
}

fn glyph_advance(c: char, bold: bool) -> i32 {
    let width = glyph_width(c);
    let width = if bold && c != ' ' { width + 1 } else { width };
    width + 1
}

/// Tracks the effective bold flag while summing glyph advances.
struct PixelWidth {
    bold: Vec<bool>,
    pixels: i32,
}

impl FlattenerListener for PixelWidth {
    fn push_style(&mut self, style: &Style) {
        let inherited = self.bold.last().copied().unwrap_or(false);
        self.bold.push(style.bold.unwrap_or(inherited));
    }

    fn component(&mut self, text: &str) {
        let bold = self.bold.last().copied().unwrap_or(false);
        self.pixels += text.chars().map(|c| glyph_advance(c, bold)).sum::<i32>();
    }

    fn pop_style(&mut self, _style: &Style) {
        self.bold.pop();
    }
}

/// Rendered width of the component in pixels.
pub fn pixel_width(component: &Component) -> i32 {
    let mut width = PixelWidth {
        bold: Vec::new(),
        pixels: 0,
    };
    ComponentFlattener::basic().flatten(component, &mut width);
    width.pixels
}

/// Spaces that push the component towards the middle of the chat box.
pub fn space_prefix(component: &Component) -> String {
    let to_compensate = CENTER_PX - pixel_width(component) / 2;

    let mut prefix = String::new();
    let mut compensated = 0;
    while compensated < to_compensate {
        prefix.push(' ');
        compensated += SPACE_ADVANCE;
    }
    prefix
}

pub fn center(component: Component) -> Component {
    let prefix = space_prefix(&component);
    Component::of_children([Component::text(prefix), component])
}
