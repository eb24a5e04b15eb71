//! Timed broadcasts and join/quit messages.
//!
//! Templates are MiniMessage markup. Before parsing, `{player}` becomes the
//! recipient's (escaped) name and `{online}` the number of players online; a
//! line starting with `<center>` is padded to the middle of the chat box.

mod broadcaster;
mod join_quit;
mod render;

pub use broadcaster::{MessageBroadcaster, message_permission};
pub use join_quit::JoinQuitHandler;
pub use render::{Placeholders, render_line, render_lines, render_title};

pub use crate::config::{MessageConfig, MessageEntry};
