use std::collections::BTreeMap;

use dioxus::prelude::*;
use tick_bridge::Page;

/// The rendered page as seen by the bridge.
///
/// Input values and element texts live in signals, so writes from the module
/// or the bridge re-render the affected elements.
#[derive(Clone, Copy)]
pub struct DomPage {
    values: Signal<BTreeMap<String, String>>,
    texts: Signal<BTreeMap<String, String>>,
}

impl DomPage {
    pub fn new(
        values: Signal<BTreeMap<String, String>>,
        texts: Signal<BTreeMap<String, String>>,
    ) -> Self {
        Self { values, texts }
    }
}

impl Page for DomPage {
    fn element_value(&self, id: &str) -> Option<String> {
        self.values.peek().get(id).cloned()
    }

    fn set_element_text(&mut self, id: &str, text: &str) {
        self.texts.write().insert(id.to_string(), text.to_string());
    }

    fn element_text(&self, id: &str) -> Option<String> {
        self.texts.peek().get(id).cloned()
    }

    fn now_millis(&self) -> f64 {
        js_sys::Date::now()
    }
}
