//! Tag based markup for styled messages.
//!
//! ```text
//! <gold>Welcome <bold>{player}</bold>!</gold> <click:open_url:'https://example.com'>Website</click>
//! ```
//!
//! Supported tags: color names, `<#rrggbb>`, `<color:..>` (`colour`, `c`),
//! `bold`/`b`, `italic`/`em`/`i`, `underlined`/`u`, `strikethrough`/`st`,
//! `obfuscated`/`obf`, `<!tag>` to switch a decoration off,
//! `<hover:show_text:..>`, `<click:action:..>`, `<reset>` and
//! `<newline>`/`<br>`. Arguments may be quoted with `'` or `"`, and `\<`
//! produces a literal `<`.

use thiserror::Error;

use super::color::{ColorError, TextColor};
use super::component::{ClickEvent, Component, HoverEvent, Style};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("unknown tag <{0}>")]
    UnknownTag(String),
    #[error("tag <{0}> is missing an argument")]
    MissingArgument(String),
    #[error("unknown click action '{0}'")]
    UnknownClickAction(String),
    #[error("unknown hover action '{0}'")]
    UnknownHoverAction(String),
    #[error("'{0}' is not a page number")]
    InvalidPage(String),
    #[error("closing tag </{0}> has no matching opening tag")]
    UnmatchedClose(String),
    #[error(transparent)]
    Color(#[from] ColorError),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Open {
        name: String,
        args: Vec<String>,
        raw: String,
    },
    Close {
        name: String,
        raw: String,
    },
}

enum TagAction {
    Push(&'static str, Style),
    Reset,
    Newline,
}

/// Markup parser.
///
/// The lenient parser keeps unknown or malformed tags as literal text; the
/// strict one reports them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniMessage {
    strict: bool,
}

impl MiniMessage {
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn parse(&self, input: &str) -> Result<Component, MarkupError> {
        let mut stack: Vec<(&'static str, Style)> = Vec::new();
        let mut parts: Vec<Component> = Vec::new();

        for token in tokenize(input) {
            match token {
                Token::Text(text) => push_text(&mut parts, &stack, text),
                Token::Open { name, args, raw } => match self.resolve(&name, &args) {
                    Ok(TagAction::Push(key, style)) => stack.push((key, style)),
                    Ok(TagAction::Reset) => stack.clear(),
                    Ok(TagAction::Newline) => push_text(&mut parts, &stack, "\n".to_string()),
                    Err(e) if self.strict => return Err(e),
                    Err(_) => push_text(&mut parts, &stack, raw),
                },
                Token::Close { name, raw } => {
                    let key = stack_key(&name);
                    match key.and_then(|key| stack.iter().rposition(|(k, _)| *k == key)) {
                        Some(index) => {
                            stack.remove(index);
                        }
                        None if self.strict => return Err(MarkupError::UnmatchedClose(name)),
                        None if key.is_none() => push_text(&mut parts, &stack, raw),
                        None => {}
                    }
                }
            }
        }

        Ok(match parts.len() {
            0 => Component::empty(),
            1 => parts.remove(0),
            _ => Component::of_children(parts),
        })
    }

    fn resolve(&self, name: &str, args: &[String]) -> Result<TagAction, MarkupError> {
        let lower = name.to_ascii_lowercase();

        if let Some(negated) = lower.strip_prefix('!') {
            let key = decoration_key(negated).ok_or_else(|| MarkupError::UnknownTag(name.to_string()))?;
            return Ok(TagAction::Push(key, decoration_style(key, false)));
        }

        if let Some(key) = decoration_key(&lower) {
            return Ok(TagAction::Push(key, decoration_style(key, true)));
        }

        match lower.as_str() {
            "reset" => return Ok(TagAction::Reset),
            "newline" | "br" => return Ok(TagAction::Newline),
            "color" | "colour" | "c" => {
                let arg = args
                    .first()
                    .ok_or_else(|| MarkupError::MissingArgument(name.to_string()))?;
                return Ok(TagAction::Push("color", color_style(arg.parse()?)));
            }
            "click" => return Ok(TagAction::Push("click", click_style(name, args)?)),
            "hover" => {
                let style = self.hover_style(name, args)?;
                return Ok(TagAction::Push("hover", style));
            }
            _ => {}
        }

        match TextColor::named(&lower).or_else(|| TextColor::from_hex(&lower)) {
            Some(color) => Ok(TagAction::Push("color", color_style(color))),
            None => Err(MarkupError::UnknownTag(name.to_string())),
        }
    }

    fn hover_style(&self, name: &str, args: &[String]) -> Result<Style, MarkupError> {
        let (action, value) = action_and_value(name, args)?;

        if !action.eq_ignore_ascii_case("show_text") {
            return Err(MarkupError::UnknownHoverAction(action.to_string()));
        }

        Ok(Style {
            hover_event: Some(HoverEvent::ShowText(Box::new(self.parse(&value)?))),
            ..Style::default()
        })
    }
}

/// Parses with the lenient parser.
pub fn parse(input: &str) -> Component {
    match MiniMessage::lenient().parse(input) {
        Ok(component) => component,
        // Only strict parsing can fail
        Err(_) => Component::text(input),
    }
}

/// Escapes text so it is never interpreted as markup.
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('<', "\\<")
}

fn push_text(parts: &mut Vec<Component>, stack: &[(&'static str, Style)], text: String) {
    if text.is_empty() {
        return;
    }
    let mut style = Style::default();
    for (_, tag_style) in stack {
        style.merge(tag_style);
    }
    parts.push(Component::text(text).style(style));
}

fn decoration_key(name: &str) -> Option<&'static str> {
    match name {
        "bold" | "b" => Some("bold"),
        "italic" | "em" | "i" => Some("italic"),
        "underlined" | "u" => Some("underlined"),
        "strikethrough" | "st" => Some("strikethrough"),
        "obfuscated" | "obf" => Some("obfuscated"),
        _ => None,
    }
}

fn decoration_style(key: &str, value: bool) -> Style {
    let mut style = Style::default();
    match key {
        "bold" => style.bold = Some(value),
        "italic" => style.italic = Some(value),
        "underlined" => style.underlined = Some(value),
        "strikethrough" => style.strikethrough = Some(value),
        _ => style.obfuscated = Some(value),
    }
    style
}

fn color_style(color: TextColor) -> Style {
    Style {
        color: Some(color),
        ..Style::default()
    }
}

/// Splits `action:value`. The value keeps any further `:` so unquoted URLs survive.
fn action_and_value<'a>(name: &str, args: &'a [String]) -> Result<(&'a str, String), MarkupError> {
    match args {
        [action, value @ ..] if !value.is_empty() => Ok((action.as_str(), value.join(":"))),
        _ => Err(MarkupError::MissingArgument(name.to_string())),
    }
}

fn click_style(name: &str, args: &[String]) -> Result<Style, MarkupError> {
    let (action, value) = action_and_value(name, args)?;
    let action = action.to_ascii_lowercase();

    let event = match action.as_str() {
        "open_url" => ClickEvent::OpenUrl(value),
        "run_command" => ClickEvent::RunCommand(value),
        "suggest_command" => ClickEvent::SuggestCommand(value),
        "copy_to_clipboard" => ClickEvent::CopyToClipboard(value),
        "change_page" => ClickEvent::ChangePage(
            value
                .parse()
                .map_err(|_| MarkupError::InvalidPage(value.clone()))?,
        ),
        _ => return Err(MarkupError::UnknownClickAction(action)),
    };

    Ok(Style {
        click_event: Some(event),
        ..Style::default()
    })
}

/// Which stack entry a closing tag removes.
fn stack_key(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    if let Some(key) = decoration_key(lower.trim_start_matches('!')) {
        return Some(key);
    }
    match lower.as_str() {
        "color" | "colour" | "c" => Some("color"),
        "click" => Some("click"),
        "hover" => Some("hover"),
        other if TextColor::named(other).is_some() || TextColor::from_hex(other).is_some() => {
            Some("color")
        }
        _ => None,
    }
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && matches!(chars.get(i + 1), Some('<') | Some('\\')) {
            text.push(chars[i + 1]);
            i += 2;
            continue;
        }

        if c == '<' {
            if let Some(end) = find_tag_end(&chars, i + 1) {
                let body: String = chars[i + 1..end].iter().collect();
                let raw: String = chars[i..=end].iter().collect();
                if let Some(token) = parse_tag(&body, raw) {
                    if !text.is_empty() {
                        tokens.push(Token::Text(std::mem::take(&mut text)));
                    }
                    tokens.push(token);
                    i = end + 1;
                    continue;
                }
            }
        }

        text.push(c);
        i += 1;
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// Index of the `>` closing a tag opened just before `start`, skipping quoted sections.
fn find_tag_end(chars: &[char], start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, &c) in chars[start..].iter().enumerate() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '>') => return Some(start + offset),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

fn parse_tag(body: &str, raw: String) -> Option<Token> {
    if body.is_empty() || body.starts_with(char::is_whitespace) {
        return None;
    }

    if let Some(rest) = body.strip_prefix('/') {
        let name = split_args(rest).into_iter().next()?;
        if name.is_empty() {
            return None;
        }
        return Some(Token::Close { name, raw });
    }

    let mut parts = split_args(body).into_iter();
    let name = parts.next()?;
    Some(Token::Open {
        name,
        args: parts.collect(),
        raw,
    })
}

/// Splits on `:` outside quotes and unwraps quoted parts.
fn split_args(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, ':') => parts.push(std::mem::take(&mut current)),
            (None, c) => current.push(c),
        }
    }
    parts.push(current);
    parts
}
