//! Seams to the host game server.
//!
//! The add-on never talks to a server directly; everything goes through
//! these traits so the logic runs the same under tests and the console host.
//!
//! # Structure
//!
//! - `scheduler` - tick based sync/async task scheduling
//! - `permission` - permission registrations and defaults
//! - `descriptor` - name and version of the running build
//! - `console` - headless host printing deliveries to stdout

mod console;
mod descriptor;
mod permission;
mod scheduler;

use std::sync::Arc;

use crate::audience::Audience;

pub use console::{ConsolePlayer, ConsoleServer, OutputSink};
pub use descriptor::PluginDescriptor;
pub use permission::{
    Permission, PermissionDefault, PermissionError, PermissionManager, PermissionRegistry,
    add_default_permission,
};
pub use scheduler::{
    RepeatingTask, Scheduler, Task, TaskHandle, TickScheduler, get_on_main, ticks,
};

/// A connected player.
pub trait Player: Audience {
    fn name(&self) -> &str;

    fn has_permission(&self, permission: &str) -> bool;
}

#[cfg_attr(test, mockall::automock)]
pub trait Server: Send + Sync {
    fn online_players(&self) -> Vec<Arc<dyn Player>>;

    /// The server console, used for log-style deliveries.
    fn console(&self) -> Arc<dyn Audience>;

    /// Runs a command with console privileges. Returns whether a command handled it.
    fn dispatch_command_as_console(&self, command: &str) -> bool;
}
