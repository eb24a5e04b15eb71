//! Depth-first walk over a component tree.

use super::component::{Component, Content, Style};

/// Receives the segments of a flattened component.
pub trait FlattenerListener {
    fn push_style(&mut self, _style: &Style) {}

    /// One rendered text segment.
    fn component(&mut self, text: &str);

    fn pop_style(&mut self, _style: &Style) {}
}

type Mapper = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Turns components into plain text segments.
///
/// Keybinds and translation keys cannot be resolved server side; the basic
/// flattener emits the raw key for both.
pub struct ComponentFlattener {
    keybind: Mapper,
    translatable: Mapper,
}

impl Default for ComponentFlattener {
    fn default() -> Self {
        Self::basic()
    }
}

impl ComponentFlattener {
    pub fn basic() -> Self {
        Self {
            keybind: Box::new(|key: &str| key.to_string()),
            translatable: Box::new(|key: &str| key.to_string()),
        }
    }

    pub fn with_keybind_mapper(
        mut self,
        mapper: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.keybind = Box::new(mapper);
        self
    }

    pub fn with_translatable_mapper(
        mut self,
        mapper: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.translatable = Box::new(mapper);
        self
    }

    pub fn flatten(&self, component: &Component, listener: &mut dyn FlattenerListener) {
        listener.push_style(&component.style);

        match &component.content {
            Content::Text(text) => {
                if !text.is_empty() {
                    listener.component(text);
                }
            }
            Content::Keybind(key) => listener.component(&(self.keybind)(key)),
            Content::Translatable(key) => listener.component(&(self.translatable)(key)),
        }

        for child in &component.children {
            self.flatten(child, listener);
        }

        listener.pop_style(&component.style);
    }

    /// Concatenation of every segment.
    pub fn plain_text(&self, component: &Component) -> String {
        struct Collect(String);
        impl FlattenerListener for Collect {
            fn component(&mut self, text: &str) {
                self.0.push_str(text);
            }
        }

        let mut collect = Collect(String::new());
        self.flatten(component, &mut collect);
        collect.0
    }
}

/// Approximate rendered length: the number of characters in every flattened
/// segment. Formatting never counts.
pub fn measure_plain(component: &Component, flattener: &ComponentFlattener) -> usize {
    struct Measure(usize);
    impl FlattenerListener for Measure {
        fn component(&mut self, text: &str) {
            self.0 += text.chars().count();
        }
    }

    let mut measure = Measure(0);
    flattener.flatten(component, &mut measure);
    measure.0
}
