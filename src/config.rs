//! Configuration loaded from a TOML file.
//!
//! Every key is optional; a missing file yields [`PluginConfig::default`].
//!
//! ```toml
//! update-checker = true
//!
//! [message-configs.tips]
//! interval-seconds = 120
//! random-order = true
//! permission-default = "true"
//!
//! [[message-configs.tips.messages]]
//! lines = ["<center><gold>Tip", "<gray>Use <yellow>/spawn</yellow> to go home"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

use crate::audience::Sound;
use crate::host::PermissionDefault;
use crate::text::MiniMessage;

fn default_true() -> bool {
    true
}

fn default_update_repo() -> String {
    "jpenilla/AnnouncerPlus".to_string()
}

fn default_interval_seconds() -> u64 {
    60
}

fn default_fade_in() -> f64 {
    0.5
}

fn default_stay() -> f64 {
    3.5
}

fn default_fade_out() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    /// Look for a newer release on enable
    #[serde(default = "default_true")]
    pub update_checker: bool,
    /// Release feed to compare against, "owner/repo"
    #[serde(default = "default_update_repo")]
    pub update_checker_repo: String,
    #[serde(default)]
    pub join_quit: JoinQuitConfig,
    /// Announcement groups by name, in file order
    #[serde(default)]
    pub message_configs: IndexMap<String, MessageConfig>,
}

/// A group of announcements broadcast on one timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessageConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Pick messages at random instead of in order
    #[serde(default)]
    pub random_order: bool,
    /// Default for `announcer.messages.<name>`
    #[serde(default)]
    pub permission_default: PermissionDefault,
    /// Played with every message that has no sounds of its own
    #[serde(default)]
    pub sounds: Vec<Sound>,
    #[serde(default)]
    pub randomize_sounds: bool,
    #[serde(default)]
    pub messages: Vec<MessageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MessageEntry {
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub sounds: Vec<Sound>,
    #[serde(default)]
    pub action_bar: Option<String>,
    #[serde(default)]
    pub title: Option<TitleConfig>,
    /// Run once per broadcast as console
    #[serde(default)]
    pub commands: Vec<String>,
    /// Run as console once for each recipient, with `{player}` substituted
    #[serde(default)]
    pub per_player_commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TitleConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_fade_in")]
    pub fade_in_seconds: f64,
    #[serde(default = "default_stay")]
    pub stay_seconds: f64,
    #[serde(default = "default_fade_out")]
    pub fade_out_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JoinQuitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Players without this permission join and leave silently
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub join: JoinSection,
    #[serde(default)]
    pub quit: JoinSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JoinSection {
    /// Sent to everyone online
    #[serde(default)]
    pub messages: Vec<String>,
    /// Played to the joining player on join, to everyone still online on quit
    #[serde(default)]
    pub sounds: Vec<Sound>,
    #[serde(default)]
    pub randomize_sounds: bool,
    #[serde(default)]
    pub action_bar: Option<String>,
    #[serde(default)]
    pub title: Option<TitleConfig>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Default for JoinQuitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permission: None,
            join: JoinSection {
                messages: vec!["<gray>[<green>+</green>] <white>{player}".to_string()],
                ..JoinSection::default()
            },
            quit: JoinSection {
                messages: vec!["<gray>[<red>-</red>] <white>{player}".to_string()],
                ..JoinSection::default()
            },
        }
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            random_order: false,
            permission_default: PermissionDefault::default(),
            sounds: Vec::new(),
            randomize_sounds: false,
            messages: Vec::new(),
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        let demo = MessageConfig {
            permission_default: PermissionDefault::True,
            sounds: vec![Sound::new("minecraft:entity.experience_orb.pickup")],
            messages: vec![
                MessageEntry {
                    lines: vec![
                        "<center><gold><bold>Announcer".to_string(),
                        "<gray>There are <yellow>{online}</yellow> players online, {player}."
                            .to_string(),
                    ],
                    ..MessageEntry::default()
                },
                MessageEntry {
                    lines: vec![
                        "<hover:show_text:'<green>Opens the project page'><click:open_url:'https://github.com/jpenilla/AnnouncerPlus'><aqua><underlined>Click here</underlined></aqua></click></hover><gray> to learn more."
                            .to_string(),
                    ],
                    action_bar: Some("<yellow>Enjoy your stay!".to_string()),
                    ..MessageEntry::default()
                },
            ],
            ..MessageConfig::default()
        };

        let mut message_configs = IndexMap::new();
        message_configs.insert("demo".to_string(), demo);

        Self {
            update_checker: true,
            update_checker_repo: default_update_repo(),
            join_quit: JoinQuitConfig::default(),
            message_configs,
        }
    }
}

impl PluginConfig {
    /// `<config dir>/announcer/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("announcer").join("config.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "No configuration at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Problems that do not prevent loading: bad markup and empty groups.
    pub fn validate(&self) -> Vec<String> {
        let strict = MiniMessage::strict();
        let mut problems = Vec::new();

        let mut check = |location: String, markup: &str| {
            let markup = markup.strip_prefix("<center>").unwrap_or(markup);
            if let Err(e) = strict.parse(markup) {
                problems.push(format!("{}: {}", location, e));
            }
        };

        for (name, group) in &self.message_configs {
            for (i, message) in group.messages.iter().enumerate() {
                for line in &message.lines {
                    check(format!("message-configs.{}.messages[{}]", name, i), line);
                }
                if let Some(bar) = &message.action_bar {
                    check(format!("message-configs.{}.messages[{}].action-bar", name, i), bar);
                }
                if let Some(title) = &message.title {
                    check(format!("message-configs.{}.messages[{}].title", name, i), &title.title);
                    check(
                        format!("message-configs.{}.messages[{}].title.subtitle", name, i),
                        &title.subtitle,
                    );
                }
            }
        }

        for (section, join) in [("join", &self.join_quit.join), ("quit", &self.join_quit.quit)] {
            for line in &join.messages {
                check(format!("join-quit.{}.messages", section), line);
            }
        }

        for (name, group) in &self.message_configs {
            if group.messages.is_empty() {
                problems.push(format!("message-configs.{}: no messages", name));
            }
            if group.interval_seconds == 0 {
                problems.push(format!(
                    "message-configs.{}: interval-seconds must be at least 1",
                    name
                ));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_field_defaults() {
        let config = PluginConfig::from_toml("").unwrap();
        assert!(config.update_checker);
        assert_eq!(config.update_checker_repo, "jpenilla/AnnouncerPlus");
        assert!(config.message_configs.is_empty());
        assert!(config.join_quit.enabled);
    }

    #[test]
    fn test_parse_message_configs_in_order() {
        let config = PluginConfig::from_toml(
            r#"
            update-checker = false

            [message-configs.zeta]
            interval-seconds = 30
            random-order = true
            permission-default = "op"

            [[message-configs.zeta.messages]]
            lines = ["<red>First"]
            sounds = [{ name = "minecraft:ui.button.click", volume = 0.5 }]

            [[message-configs.zeta.messages]]
            lines = ["Second"]
            per-player-commands = ["give {player} diamond 1"]
            title = { title = "<gold>Hi", stay-seconds = 2.0 }

            [message-configs.alpha]
            [[message-configs.alpha.messages]]
            lines = ["Third"]
            "#,
        )
        .unwrap();

        assert!(!config.update_checker);
        let names: Vec<&str> = config.message_configs.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);

        let zeta = &config.message_configs["zeta"];
        assert_eq!(zeta.interval_seconds, 30);
        assert!(zeta.random_order);
        assert_eq!(zeta.permission_default, PermissionDefault::Op);
        assert_eq!(zeta.messages[0].sounds[0].volume, 0.5);
        assert_eq!(zeta.messages[1].per_player_commands, ["give {player} diamond 1"]);

        let title = zeta.messages[1].title.as_ref().unwrap();
        assert_eq!(title.stay_seconds, 2.0);
        assert_eq!(title.fade_in_seconds, 0.5);

        assert_eq!(config.message_configs["alpha"].interval_seconds, 60);
    }

    #[test]
    fn test_unknown_permission_default_is_rejected() {
        let result = PluginConfig::from_toml(
            r#"
            [message-configs.a]
            permission-default = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PluginConfig::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, PluginConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [join-quit]
            enabled = false
            "#
        )
        .unwrap();

        let config = PluginConfig::load(file.path()).unwrap();
        assert!(!config.join_quit.enabled);
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "update-checker = \"maybe\"").unwrap();

        let err = PluginConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_default_config_round_trips_and_is_valid() {
        let config = PluginConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(PluginConfig::from_toml(&text).unwrap(), config);
        assert_eq!(config.validate(), Vec::<String>::new());
    }

    #[test]
    fn test_validate_names_subtitle_location() {
        let config = PluginConfig::from_toml(
            r#"
            [[message-configs.a.messages]]
            lines = ["fine"]
            title = { title = "<gold>ok", subtitle = "<sparkle>bad" }
            "#,
        )
        .unwrap();

        assert_eq!(config.validate().len(), 1);
        assert!(config.validate()[0].starts_with("message-configs.a.messages[0].title.subtitle:"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let config = PluginConfig::from_toml(
            r#"
            [message-configs.bad]
            interval-seconds = 0
            [[message-configs.bad.messages]]
            lines = ["<sparkle>hi"]

            [message-configs.empty]
            "#,
        )
        .unwrap();

        let problems = config.validate();
        assert_eq!(problems.len(), 3, "{:?}", problems);
        assert!(problems[0].contains("message-configs.bad.messages[0]"));
        assert!(problems.iter().any(|p| p.contains("interval-seconds")));
        assert!(problems.iter().any(|p| p.contains("empty: no messages")));
    }
}
