//! A host without a game: players are names, deliveries are printed lines.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use super::permission::PermissionManager;
use super::{Player, Server};
use crate::audience::{Audience, Sound, Title};
use crate::text::{Component, ComponentFlattener};

/// Receives every printed line.
pub type OutputSink = Arc<dyn Fn(String) + Send + Sync>;

fn plain(component: &Component) -> String {
    ComponentFlattener::basic().plain_text(component)
}

/// Writes deliveries as `[name] ...` lines.
struct ConsoleAudience {
    label: String,
    sink: OutputSink,
}

impl ConsoleAudience {
    fn print(&self, kind: Option<&str>, body: String) {
        let line = match kind {
            Some(kind) => format!("[{}] ({}) {}", self.label, kind, body),
            None => format!("[{}] {}", self.label, body),
        };
        (self.sink)(line);
    }
}

impl Audience for ConsoleAudience {
    fn send_message(&self, message: &Component) {
        self.print(None, plain(message));
    }

    fn send_action_bar(&self, message: &Component) {
        self.print(Some("action bar"), plain(message));
    }

    fn show_title(&self, title: &Title) {
        self.print(
            Some("title"),
            format!("{} | {}", plain(&title.title), plain(&title.subtitle)),
        );
    }

    fn play_sound(&self, sound: &Sound) {
        self.print(Some("sound"), sound.to_string());
    }
}

pub struct ConsolePlayer {
    audience: ConsoleAudience,
    op: bool,
    granted: HashSet<String>,
    permissions: Arc<PermissionManager>,
}

impl ConsolePlayer {
    /// Explicit grants win; everything else falls back to the registered default.
    pub fn has_grant(&self, permission: &str) -> bool {
        self.granted.contains(permission)
    }
}

impl Audience for ConsolePlayer {
    fn send_message(&self, message: &Component) {
        self.audience.send_message(message);
    }

    fn send_action_bar(&self, message: &Component) {
        self.audience.send_action_bar(message);
    }

    fn show_title(&self, title: &Title) {
        self.audience.show_title(title);
    }

    fn play_sound(&self, sound: &Sound) {
        self.audience.play_sound(sound);
    }
}

impl Player for ConsolePlayer {
    fn name(&self) -> &str {
        &self.audience.label
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.has_grant(permission) || self.permissions.resolve(permission, self.op)
    }
}

pub struct ConsoleServer {
    players: RwLock<Vec<Arc<ConsolePlayer>>>,
    permissions: Arc<PermissionManager>,
    console: Arc<ConsoleAudience>,
    sink: OutputSink,
}

impl ConsoleServer {
    pub fn new(permissions: Arc<PermissionManager>, sink: OutputSink) -> Self {
        Self {
            players: RwLock::new(Vec::new()),
            permissions,
            console: Arc::new(ConsoleAudience {
                label: "console".to_string(),
                sink: sink.clone(),
            }),
            sink,
        }
    }

    /// Prints to stdout.
    pub fn stdout(permissions: Arc<PermissionManager>) -> Self {
        Self::new(permissions, Arc::new(|line: String| println!("{}", line)))
    }

    pub fn join(&self, name: &str, op: bool, granted: &[String]) -> Arc<ConsolePlayer> {
        let player = Arc::new(ConsolePlayer {
            audience: ConsoleAudience {
                label: name.to_string(),
                sink: self.sink.clone(),
            },
            op,
            granted: granted.iter().cloned().collect(),
            permissions: self.permissions.clone(),
        });
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(player.clone());
        player
    }

    pub fn quit(&self, name: &str) -> Option<Arc<ConsolePlayer>> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let index = players.iter().position(|p| p.name() == name)?;
        Some(players.remove(index))
    }
}

impl Server for ConsoleServer {
    fn online_players(&self) -> Vec<Arc<dyn Player>> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.clone() as Arc<dyn Player>)
            .collect()
    }

    fn console(&self) -> Arc<dyn Audience> {
        self.console.clone()
    }

    fn dispatch_command_as_console(&self, command: &str) -> bool {
        info!("Console issued command: /{}", command.trim_start_matches('/'));
        (self.sink)(format!("[console] /{}", command.trim_start_matches('/')));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PermissionDefault, add_default_permission};
    use std::sync::Mutex;

    fn server() -> (ConsoleServer, Arc<Mutex<Vec<String>>>, Arc<PermissionManager>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink_lines = lines.clone();
        let permissions = Arc::new(PermissionManager::new());
        let server = ConsoleServer::new(
            permissions.clone(),
            Arc::new(move |line: String| sink_lines.lock().unwrap().push(line)),
        );
        (server, lines, permissions)
    }

    #[test]
    fn test_players_print_deliveries() {
        let (server, lines, _) = server();
        let steve = server.join("Steve", false, &[]);

        steve.send_message(&Component::text("Hello"));
        steve.send_action_bar(&Component::text("Bar"));
        steve.play_sound(&Sound::new("minecraft:ui.button.click"));

        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "[Steve] Hello",
                "[Steve] (action bar) Bar",
                "[Steve] (sound) minecraft:ui.button.click",
            ]
        );
    }

    #[test]
    fn test_join_and_quit() {
        let (server, _, _) = server();
        server.join("Steve", false, &[]);
        server.join("Alex", true, &[]);

        assert_eq!(server.online_players().len(), 2);
        assert!(server.quit("Steve").is_some());
        assert!(server.quit("Steve").is_none());

        let names: Vec<String> = server
            .online_players()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["Alex"]);
    }

    #[test]
    fn test_permission_resolution() {
        let (server, _, permissions) = server();
        add_default_permission(permissions.as_ref(), "a.op", PermissionDefault::Op).unwrap();
        add_default_permission(permissions.as_ref(), "a.all", PermissionDefault::True).unwrap();

        let steve = server.join("Steve", false, &["a.special".to_string()]);
        let alex = server.join("Alex", true, &[]);

        assert!(steve.has_permission("a.all"));
        assert!(!steve.has_permission("a.op"));
        assert!(steve.has_permission("a.special"));
        assert!(alex.has_permission("a.op"));
        assert!(alex.has_permission("unregistered"));
        assert!(!steve.has_permission("unregistered"));
    }

    #[test]
    fn test_dispatch_command_prints() {
        let (server, lines, _) = server();
        assert!(server.dispatch_command_as_console("/say hi"));
        assert_eq!(*lines.lock().unwrap(), vec!["[console] /say hi"]);
    }
}
