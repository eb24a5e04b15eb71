use std::sync::Arc;

use log::debug;

use super::render::{Placeholders, render_line, render_lines, render_title};
use crate::audience::play_sounds;
use crate::config::{JoinQuitConfig, JoinSection};
use crate::host::{Player, Server};

/// Greets joining players and reports leaving ones.
pub struct JoinQuitHandler {
    config: JoinQuitConfig,
    server: Arc<dyn Server>,
}

impl JoinQuitHandler {
    pub fn new(config: JoinQuitConfig, server: Arc<dyn Server>) -> Self {
        Self { config, server }
    }

    fn applies_to(&self, player: &dyn Player) -> bool {
        if !self.config.enabled {
            return false;
        }
        match &self.config.permission {
            Some(permission) => player.has_permission(permission),
            None => true,
        }
    }

    /// Call after `player` is online. Returns whether anything was sent.
    pub fn on_join(&self, player: &dyn Player) -> bool {
        if !self.applies_to(player) {
            debug!("Skipping join messages for {}", player.name());
            return false;
        }

        let online = self.server.online_players();
        let section = &self.config.join;
        let placeholders = Placeholders::new(Some(player.name()), online.len());

        self.announce(section, &online, &placeholders);

        if let Some(bar) = &section.action_bar {
            player.send_action_bar(&render_line(bar, &placeholders));
        }
        if let Some(title) = &section.title {
            player.show_title(&render_title(title, &placeholders));
        }
        play_sounds(player, &section.sounds, section.randomize_sounds);

        self.run_commands(section, &placeholders);
        true
    }

    /// Call after `player` has left; the message goes to everyone still online.
    pub fn on_quit(&self, player: &dyn Player) -> bool {
        if !self.applies_to(player) {
            debug!("Skipping quit messages for {}", player.name());
            return false;
        }

        let online = self.server.online_players();
        let section = &self.config.quit;
        let placeholders = Placeholders::new(Some(player.name()), online.len());

        self.announce(section, &online, &placeholders);
        for listener in &online {
            play_sounds(listener.as_ref(), &section.sounds, section.randomize_sounds);
        }

        self.run_commands(section, &placeholders);
        true
    }

    fn announce(
        &self,
        section: &JoinSection,
        online: &[Arc<dyn Player>],
        placeholders: &Placeholders<'_>,
    ) {
        if section.messages.is_empty() {
            return;
        }
        let lines = render_lines(&section.messages, placeholders);
        for line in &lines {
            self.server.console().send_message(line);
            for listener in online {
                listener.send_message(line);
            }
        }
    }

    fn run_commands(&self, section: &JoinSection, placeholders: &Placeholders<'_>) {
        for command in &section.commands {
            self.server
                .dispatch_command_as_console(&placeholders.apply_raw(command));
        }
    }
}
