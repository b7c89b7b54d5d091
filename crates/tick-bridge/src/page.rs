use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// The document the bridge and its module talk to.
///
/// Elements are addressed by id. The bridge itself only ever writes text;
/// reading input values is left to the module through the `dom` imports.
pub trait Page: 'static {
    /// Current value of an input-like element, `None` if no such element exists.
    fn element_value(&self, id: &str) -> Option<String>;

    /// Replace the text content of an element.
    fn set_element_text(&mut self, id: &str, text: &str);

    /// Current text content of an element, `None` if it was never written.
    fn element_text(&self, id: &str) -> Option<String>;

    /// Wall-clock time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> f64;
}

/// A page held entirely in memory.
///
/// Used by the headless runner and by tests. Writing text to an id creates
/// the element if it did not exist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryPage {
    values: BTreeMap<String, String>,
    texts: BTreeMap<String, String>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MemoryPage::set_value`].
    pub fn with_value(mut self, id: &str, value: impl Into<String>) -> Self {
        self.set_value(id, value);
        self
    }

    /// Set the value of an input element, as if the user typed it.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) {
        self.values.insert(id.to_string(), value.into());
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }
}

impl Page for MemoryPage {
    fn element_value(&self, id: &str) -> Option<String> {
        self.values.get(id).cloned()
    }

    fn set_element_text(&mut self, id: &str, text: &str) {
        self.texts.insert(id.to_string(), text.to_string());
    }

    fn element_text(&self, id: &str) -> Option<String> {
        self.texts.get(id).cloned()
    }

    fn now_millis(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_and_texts_are_separate() {
        let mut page = MemoryPage::new().with_value("number1", "3");
        page.set_element_text("number1", "label");

        assert_eq!(page.element_value("number1").as_deref(), Some("3"));
        assert_eq!(page.text("number1"), Some("label"));
        assert_eq!(page.element_value("missing"), None);
        assert_eq!(page.element_text("missing"), None);
    }

    #[test]
    fn test_set_element_text_replaces() {
        let mut page = MemoryPage::new();
        page.set_element_text("result", "2");
        page.set_element_text("result", "3");
        assert_eq!(page.text("result"), Some("3"));
    }
}
