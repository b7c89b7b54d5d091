//! # tick-bridge - Wiring a WebAssembly module into a page
//!
//! This crate instantiates a WebAssembly module against a host-side memory
//! interface and turns one of its exports into a click handler.
//!
//! ## How It Works
//!
//! 1. **Memory interface**: [`MemoryInterface`] owns the `wasmi` engine and
//!    store, and links the host imports the module may call (`env` for
//!    console output and the clock, `dom` for reading inputs and writing
//!    element text on a [`Page`]).
//!
//! 2. **Instantiation**: [`initialize`] loads the module bytes through a
//!    [`ModuleLoader`], instantiates them, and collects every exported
//!    function into an [`Exports`] map. This is the only suspension point.
//!
//! 3. **Click handling**: the resulting [`ReadyBridge`] calls `tick` on each
//!    click, bumps a counter that starts at 1, and writes the new value into
//!    the `result` element.
//!
//! A [`ReadyBridge`] only exists once instantiation succeeded, so a handler
//! built on it cannot observe a half-initialized module. If instantiation
//! fails there is simply no bridge, and therefore no handler.
//!
//! ## Example
//!
//! ```
//! use tick_bridge::{initialize, BytesLoader, MemoryPage, MODULE_LOCATOR, RESULT_ID};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let wasm = wat::parse_str(r#"(module (func (export "tick")))"#).unwrap();
//! let loader = BytesLoader::new().with_module(MODULE_LOCATOR, wasm);
//!
//! let mut bridge = initialize(&loader, MODULE_LOCATOR, MemoryPage::new())
//!     .await
//!     .unwrap();
//! bridge.on_add_clicked().unwrap();
//!
//! assert_eq!(bridge.page().text(RESULT_ID), Some("2"));
//! # });
//! ```
//!
//! ## Host imports
//!
//! | Import | Signature | Behavior |
//! |--------|-----------|----------|
//! | `env.write` | `(fd, ptr, len)` | stdout/stderr to the log or a console element |
//! | `env.trap`, `env.abort` | `()` | trap the current call |
//! | `env.time_now` | `() -> i64` | nanoseconds since the Unix epoch |
//! | `dom.get_element_value_f64` | `(id_ptr, id_len) -> f64` | input value as a number |
//! | `dom.get_element_value_string_length` | `(id_ptr, id_len) -> i32` | input value length in bytes |
//! | `dom.get_element_value_string` | `(id_ptr, id_len, buf_ptr, buf_len) -> i32` | copy input value into memory |
//! | `dom.set_element_text_string` | `(id_ptr, id_len, text_ptr, text_len)` | set element text |

mod bridge;
mod error;
mod exports;
mod imports;
mod loader;
mod memory;
mod page;

pub use bridge::{initialize, initialize_with, BridgeState, ReadyBridge};
pub use error::BridgeError;
pub use exports::Exports;
pub use imports::HostState;
pub use loader::{run_wasm, BytesLoader, ModuleLoader};
pub use memory::{ExtraImports, MemoryInterface, RunOptions, START_EXPORT};
pub use page::{MemoryPage, Page};

/// Locator the page fetches its module from.
pub const MODULE_LOCATOR: &str = "index.wasm";

/// Export invoked on every click.
pub const TICK_EXPORT: &str = "tick";

/// Counter value before the first click.
pub const INITIAL_COUNT: u64 = 1;

pub const ADD_BUTTON_ID: &str = "add";
pub const NUMBER1_ID: &str = "number1";
pub const NUMBER2_ID: &str = "number2";
pub const RESULT_ID: &str = "result";
