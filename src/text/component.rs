//! Styled text trees.

use serde_json::{Map, Value, json};

use super::color::TextColor;
use crate::nbt::CompoundBinaryTag;

/// What a single node renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    /// A key binding, rendered by the client as the bound key.
    Keybind(String),
    /// A translation key, rendered by the client in its own language.
    Translatable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickEvent {
    OpenUrl(String),
    RunCommand(String),
    SuggestCommand(String),
    CopyToClipboard(String),
    ChangePage(u32),
}

impl ClickEvent {
    pub fn action(&self) -> &'static str {
        match self {
            ClickEvent::OpenUrl(_) => "open_url",
            ClickEvent::RunCommand(_) => "run_command",
            ClickEvent::SuggestCommand(_) => "suggest_command",
            ClickEvent::CopyToClipboard(_) => "copy_to_clipboard",
            ClickEvent::ChangePage(_) => "change_page",
        }
    }

    fn value(&self) -> String {
        match self {
            ClickEvent::OpenUrl(v)
            | ClickEvent::RunCommand(v)
            | ClickEvent::SuggestCommand(v)
            | ClickEvent::CopyToClipboard(v) => v.clone(),
            ClickEvent::ChangePage(page) => page.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverEvent {
    ShowText(Box<Component>),
    ShowItem {
        id: String,
        count: u8,
        tag: Option<CompoundBinaryTag>,
    },
}

/// Formatting applied to a node and inherited by its children.
///
/// Unset fields inherit from the parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub color: Option<TextColor>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underlined: Option<bool>,
    pub strikethrough: Option<bool>,
    pub obfuscated: Option<bool>,
    pub click_event: Option<ClickEvent>,
    pub hover_event: Option<HoverEvent>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// Fields set on `other` replace those on `self`.
    pub fn merge(&mut self, other: &Style) {
        if other.color.is_some() {
            self.color = other.color;
        }
        for (mine, theirs) in [
            (&mut self.bold, other.bold),
            (&mut self.italic, other.italic),
            (&mut self.underlined, other.underlined),
            (&mut self.strikethrough, other.strikethrough),
            (&mut self.obfuscated, other.obfuscated),
        ] {
            if theirs.is_some() {
                *mine = theirs;
            }
        }
        if other.click_event.is_some() {
            self.click_event = other.click_event.clone();
        }
        if other.hover_event.is_some() {
            self.hover_event = other.hover_event.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub content: Content,
    pub style: Style,
    pub children: Vec<Component>,
}

impl Default for Component {
    fn default() -> Self {
        Self::empty()
    }
}

impl Component {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Content::Text(text.into()),
            style: Style::default(),
            children: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::text("")
    }

    pub fn keybind(key: impl Into<String>) -> Self {
        Self {
            content: Content::Keybind(key.into()),
            ..Self::empty()
        }
    }

    pub fn translatable(key: impl Into<String>) -> Self {
        Self {
            content: Content::Translatable(key.into()),
            ..Self::empty()
        }
    }

    /// An empty parent holding the given components in order.
    pub fn of_children(children: impl IntoIterator<Item = Component>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::empty()
        }
    }

    pub fn color(mut self, color: TextColor) -> Self {
        self.style.color = Some(color);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.style.bold = Some(bold);
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.style.italic = Some(italic);
        self
    }

    pub fn click_event(mut self, event: ClickEvent) -> Self {
        self.style.click_event = Some(event);
        self
    }

    pub fn hover_event(mut self, event: HoverEvent) -> Self {
        self.style.hover_event = Some(event);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn append(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    /// Serializes to the JSON chat format understood by the client.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();

        match &self.content {
            Content::Text(text) => {
                object.insert("text".to_string(), json!(text));
            }
            Content::Keybind(key) => {
                object.insert("keybind".to_string(), json!(key));
            }
            Content::Translatable(key) => {
                object.insert("translate".to_string(), json!(key));
            }
        }

        let style = &self.style;
        if let Some(color) = style.color {
            object.insert("color".to_string(), json!(color.to_string()));
        }
        for (key, value) in [
            ("bold", style.bold),
            ("italic", style.italic),
            ("underlined", style.underlined),
            ("strikethrough", style.strikethrough),
            ("obfuscated", style.obfuscated),
        ] {
            if let Some(value) = value {
                object.insert(key.to_string(), json!(value));
            }
        }
        if let Some(click) = &style.click_event {
            object.insert(
                "clickEvent".to_string(),
                json!({ "action": click.action(), "value": click.value() }),
            );
        }
        if let Some(hover) = &style.hover_event {
            let hover = match hover {
                HoverEvent::ShowText(text) => {
                    json!({ "action": "show_text", "contents": text.to_json() })
                }
                HoverEvent::ShowItem { id, count, tag } => {
                    let mut contents = Map::new();
                    contents.insert("id".to_string(), json!(id));
                    contents.insert("count".to_string(), json!(count));
                    if let Some(tag) = tag {
                        contents.insert("tag".to_string(), json!(tag.to_string()));
                    }
                    json!({ "action": "show_item", "contents": contents })
                }
            };
            object.insert("hoverEvent".to_string(), hover);
        }

        if !self.children.is_empty() {
            let extra: Vec<Value> = self.children.iter().map(Component::to_json).collect();
            object.insert("extra".to_string(), Value::Array(extra));
        }

        Value::Object(object)
    }
}

impl From<&str> for Component {
    fn from(text: &str) -> Self {
        Component::text(text)
    }
}

impl From<String> for Component {
    fn from(text: String) -> Self {
        Component::text(text)
    }
}
