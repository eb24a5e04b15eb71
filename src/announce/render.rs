use std::time::Duration;

use crate::audience::{Title, TitleTimes};
use crate::config::TitleConfig;
use crate::text::{Component, center, mini};

const CENTER_PREFIX: &str = "<center>";

/// Values substituted into templates before they are parsed.
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    pub player: Option<&'a str>,
    pub online: usize,
}

impl<'a> Placeholders<'a> {
    pub fn new(player: Option<&'a str>, online: usize) -> Self {
        Self { player, online }
    }

    /// For markup: the player name is escaped so it can't inject tags.
    pub fn apply(&self, template: &str) -> String {
        let player = self.player.map(mini::escape).unwrap_or_default();
        self.substitute(template, &player)
    }

    /// For commands, where the name is used verbatim.
    pub fn apply_raw(&self, template: &str) -> String {
        self.substitute(template, self.player.unwrap_or_default())
    }

    fn substitute(&self, template: &str, player: &str) -> String {
        template
            .replace("{online}", &self.online.to_string())
            .replace("{player}", player)
    }
}

/// Parses one line, centering it when it starts with `<center>`.
pub fn render_line(template: &str, placeholders: &Placeholders<'_>) -> Component {
    match template.strip_prefix(CENTER_PREFIX) {
        Some(rest) => center(mini::parse(&placeholders.apply(rest))),
        None => mini::parse(&placeholders.apply(template)),
    }
}

pub fn render_lines(lines: &[String], placeholders: &Placeholders<'_>) -> Vec<Component> {
    lines
        .iter()
        .map(|line| render_line(line, placeholders))
        .collect()
}

fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

pub fn render_title(config: &TitleConfig, placeholders: &Placeholders<'_>) -> Title {
    Title {
        title: render_line(&config.title, placeholders),
        subtitle: render_line(&config.subtitle, placeholders),
        times: TitleTimes {
            fade_in: seconds(config.fade_in_seconds),
            stay: seconds(config.stay_seconds),
            fade_out: seconds(config.fade_out_seconds),
        },
    }
}
