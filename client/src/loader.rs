use gloo_net::http::Request;
use tick_bridge::{BridgeError, ModuleLoader};

/// Fetches modules over HTTP, relative to the page.
pub struct FetchLoader;

impl ModuleLoader for FetchLoader {
    async fn load(&self, locator: &str) -> Result<Vec<u8>, BridgeError> {
        let response = Request::get(locator)
            .send()
            .await
            .map_err(|e| BridgeError::load(locator, format!("Error sending request: {}", e)))?;

        if !response.ok() {
            return Err(BridgeError::load(
                locator,
                format!("Server error: {}", response.status()),
            ));
        }

        response
            .binary()
            .await
            .map_err(|e| BridgeError::load(locator, format!("Error reading body: {}", e)))
    }
}
