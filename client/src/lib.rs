use std::collections::BTreeMap;

use dioxus::prelude::*;
use tick_bridge::{
    initialize, BridgeState, ReadyBridge, ADD_BUTTON_ID, MODULE_LOCATOR, NUMBER1_ID, NUMBER2_ID,
    RESULT_ID,
};
use wasm_bindgen::prelude::*;

mod dom_page;
mod loader;
use dom_page::DomPage;
use loader::FetchLoader;

// WASM entry point for the page
// This function is called from JavaScript in the browser
#[wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
    dioxus_web::launch::launch(App, vec![], Default::default());
}

#[component]
fn App() -> Element {
    let mut values = use_signal(|| {
        BTreeMap::from([
            (NUMBER1_ID.to_string(), String::new()),
            (NUMBER2_ID.to_string(), String::new()),
        ])
    });
    let texts = use_signal(BTreeMap::<String, String>::new);
    let mut bridge = use_signal(|| None::<ReadyBridge<DomPage>>);

    // Instantiate the module once on mount; the add handler only exists after this succeeds
    use_effect(move || {
        spawn(async move {
            let page = DomPage::new(values, texts);
            match initialize(&FetchLoader, MODULE_LOCATOR, page).await {
                Ok(ready) => {
                    log::info!("{} ready", MODULE_LOCATOR);
                    bridge.set(Some(ready));
                }
                Err(err) => {
                    log::error!("{}", err);
                }
            }
        });
    });

    let on_add = move |_| {
        let mut slot = bridge.write();
        if let Some(ready) = slot.as_mut() {
            if let Err(err) = ready.on_add_clicked() {
                log::error!("{}", err);
            }
        }
    };

    let state = BridgeState::of(bridge.read().as_ref());
    let value_of = |id: &str| values.read().get(id).cloned().unwrap_or_default();
    let number1 = value_of(NUMBER1_ID);
    let number2 = value_of(NUMBER2_ID);
    let result = texts.read().get(RESULT_ID).cloned().unwrap_or_default();

    rsx! {
        div { class: "bridge-container",
            h1 { "tick bridge" }

            div { class: "inputs",
                input {
                    id: NUMBER1_ID,
                    class: "number-input",
                    r#type: "number",
                    value: "{number1}",
                    oninput: move |evt| {
                        values.write().insert(NUMBER1_ID.to_string(), evt.value());
                    },
                }
                input {
                    id: NUMBER2_ID,
                    class: "number-input",
                    r#type: "number",
                    value: "{number2}",
                    oninput: move |evt| {
                        values.write().insert(NUMBER2_ID.to_string(), evt.value());
                    },
                }
            }

            if state == BridgeState::Ready {
                button {
                    id: ADD_BUTTON_ID,
                    class: "add-button",
                    "data-state": "ready",
                    onclick: on_add,
                    "Add"
                }
            } else {
                button {
                    id: ADD_BUTTON_ID,
                    class: "add-button",
                    "data-state": "uninitialized",
                    "Add"
                }
            }

            p { id: RESULT_ID, class: "result-display", "{result}" }
        }
    }
}
