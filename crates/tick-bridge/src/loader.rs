use std::collections::HashMap;

use crate::error::BridgeError;
use crate::memory::{MemoryInterface, RunOptions};
use crate::page::Page;

/// Produces module bytes for a locator.
///
/// The browser fetches relative to the page, the headless runner reads from
/// disk, tests serve bytes from memory.
#[allow(async_fn_in_trait)]
pub trait ModuleLoader {
    async fn load(&self, locator: &str) -> Result<Vec<u8>, BridgeError>;
}

/// Serves modules from an in-memory table.
#[derive(Clone, Debug, Default)]
pub struct BytesLoader {
    modules: HashMap<String, Vec<u8>>,
}

impl BytesLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, locator: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.modules.insert(locator.to_string(), bytes.into());
        self
    }
}

impl ModuleLoader for BytesLoader {
    async fn load(&self, locator: &str) -> Result<Vec<u8>, BridgeError> {
        self.modules
            .get(locator)
            .cloned()
            .ok_or_else(|| BridgeError::load(locator, "not found"))
    }
}

/// Load the module at `locator` and instantiate it into `memory`.
///
/// Suspends until the loader has produced the bytes. On success the export
/// mapping of `memory` is populated; on failure it stays empty.
pub async fn run_wasm<L, P>(
    loader: &L,
    locator: &str,
    options: RunOptions<P>,
    memory: &mut MemoryInterface<P>,
) -> Result<(), BridgeError>
where
    L: ModuleLoader,
    P: Page,
{
    let bytes = loader.load(locator).await?;
    log::info!("loaded {} ({} bytes)", locator, bytes.len());
    memory.instantiate(&bytes, options)?;
    log::info!("instantiated {}", locator);
    Ok(())
}
