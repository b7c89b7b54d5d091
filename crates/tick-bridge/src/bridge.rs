use crate::error::BridgeError;
use crate::exports::Exports;
use crate::loader::{run_wasm, ModuleLoader};
use crate::memory::{MemoryInterface, RunOptions};
use crate::page::Page;
use crate::{INITIAL_COUNT, RESULT_ID, TICK_EXPORT};

/// Where the bridge is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Ready,
}

impl BridgeState {
    /// State of a page slot that may or may not hold a bridge.
    pub fn of<P: Page>(bridge: Option<&ReadyBridge<P>>) -> Self {
        bridge.map_or(Self::Uninitialized, ReadyBridge::state)
    }
}

/// A bridge whose module has been instantiated.
///
/// The only way to obtain one is [`initialize`], so a click handler built on
/// top of it can never run before the exports exist.
pub struct ReadyBridge<P: Page> {
    memory: MemoryInterface<P>,
    count: u64,
}

/// Create a memory interface over `page`, load the module at `locator` and
/// instantiate it.
///
/// No options are passed to the module. Any failure is returned as is; the
/// caller is expected to leave the page without a handler.
pub async fn initialize<L, P>(
    loader: &L,
    locator: &str,
    page: P,
) -> Result<ReadyBridge<P>, BridgeError>
where
    L: ModuleLoader,
    P: Page,
{
    initialize_with(loader, locator, page, RunOptions::default()).await
}

/// [`initialize`] with explicit instantiation options.
pub async fn initialize_with<L, P>(
    loader: &L,
    locator: &str,
    page: P,
    options: RunOptions<P>,
) -> Result<ReadyBridge<P>, BridgeError>
where
    L: ModuleLoader,
    P: Page,
{
    let mut memory = MemoryInterface::new(page)?;
    run_wasm(loader, locator, options, &mut memory).await?;
    Ok(ReadyBridge {
        memory,
        count: INITIAL_COUNT,
    })
}

impl<P: Page> ReadyBridge<P> {
    pub fn state(&self) -> BridgeState {
        BridgeState::Ready
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// The export mapping of the instantiated module.
    pub fn exports(&self) -> Option<&Exports> {
        self.memory.exports()
    }

    pub fn memory(&self) -> &MemoryInterface<P> {
        &self.memory
    }

    pub fn page(&self) -> &P {
        self.memory.page()
    }

    pub fn page_mut(&mut self) -> &mut P {
        self.memory.page_mut()
    }

    /// Handle a click on the add button.
    ///
    /// Calls `tick`, then bumps the counter and writes it into the result
    /// element. If `tick` fails nothing is updated.
    pub fn on_add_clicked(&mut self) -> Result<(), BridgeError> {
        self.memory.call(TICK_EXPORT)?;
        self.count += 1;
        let text = self.count.to_string();
        self.memory.page_mut().set_element_text(RESULT_ID, &text);
        Ok(())
    }
}
