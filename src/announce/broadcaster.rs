use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use rand::Rng;

use super::render::{Placeholders, render_line, render_lines, render_title};
use crate::audience::play_sounds;
use crate::config::{MessageConfig, MessageEntry};
use crate::host::{Player, Server};

/// Permission a player needs to receive the messages of config `name`.
pub fn message_permission(name: &str) -> String {
    format!("announcer.messages.{}", name)
}

/// Delivers the messages of one config to the players allowed to see them.
pub struct MessageBroadcaster {
    name: String,
    permission: String,
    config: MessageConfig,
    server: Arc<dyn Server>,
    cursor: AtomicUsize,
}

impl MessageBroadcaster {
    pub fn new(name: impl Into<String>, config: MessageConfig, server: Arc<dyn Server>) -> Self {
        let name = name.into();
        Self {
            permission: message_permission(&name),
            name,
            config,
            server,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }

    pub fn config(&self) -> &MessageConfig {
        &self.config
    }

    pub fn recipients(&self) -> Vec<Arc<dyn Player>> {
        self.server
            .online_players()
            .into_iter()
            .filter(|player| player.has_permission(&self.permission))
            .collect()
    }

    /// Index of the next message: uniformly random, or round robin in file order.
    pub fn next_index(&self) -> Option<usize> {
        let count = self.config.messages.len();
        if count == 0 {
            return None;
        }

        if self.config.random_order {
            Some(rand::thread_rng().gen_range(0..count))
        } else {
            Some(self.cursor.fetch_add(1, Ordering::SeqCst) % count)
        }
    }

    /// Broadcasts the next message and returns its index.
    pub fn broadcast_next(&self) -> Option<usize> {
        let index = self.next_index()?;
        self.broadcast(&self.config.messages[index]);
        Some(index)
    }

    /// Returns how many players received the message.
    pub fn broadcast(&self, message: &MessageEntry) -> usize {
        let online = self.server.online_players().len();
        let recipients = self.recipients();
        debug!(
            "Broadcasting '{}' message to {} of {} players",
            self.name,
            recipients.len(),
            online
        );

        let sounds = if message.sounds.is_empty() {
            &self.config.sounds
        } else {
            &message.sounds
        };

        for player in &recipients {
            let placeholders = Placeholders::new(Some(player.name()), online);

            for line in render_lines(&message.lines, &placeholders) {
                player.send_message(&line);
            }
            if let Some(bar) = &message.action_bar {
                player.send_action_bar(&render_line(bar, &placeholders));
            }
            if let Some(title) = &message.title {
                player.show_title(&render_title(title, &placeholders));
            }
            play_sounds(player.as_ref(), sounds, self.config.randomize_sounds);

            for command in &message.per_player_commands {
                self.dispatch(&placeholders.apply_raw(command));
            }
        }

        let placeholders = Placeholders::new(None, online);
        for command in &message.commands {
            self.dispatch(&placeholders.apply_raw(command));
        }

        recipients.len()
    }

    fn dispatch(&self, command: &str) {
        if !self.server.dispatch_command_as_console(command) {
            debug!("Command '{}' was not handled", command);
        }
    }
}
