//! Rich chat text.
//!
//! - `component` - styled text trees and their JSON form
//! - `color` - RGB colors and HSV adjustments
//! - `flatten` - depth-first visitor over components
//! - `centering` - pixel based centering for chat lines
//! - `mini` - tag markup parser

pub mod centering;
mod color;
mod component;
mod flatten;
pub mod mini;

pub use centering::center;
pub use color::{ColorError, Hsv, NAMED_COLORS, TextColor};
pub use component::{ClickEvent, Component, Content, HoverEvent, Style};
pub use flatten::{ComponentFlattener, FlattenerListener, measure_plain};
pub use mini::{MarkupError, MiniMessage};
