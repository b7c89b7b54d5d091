//! Error types for the bridge.

use thiserror::Error;

/// Everything that can go wrong between fetching a module and clicking the button.
///
/// Load and instantiation errors are fatal for a page: there is no retry and
/// the click handler is never registered. Export errors surface on the first
/// click.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The loader could not produce bytes for the locator.
    #[error("failed to load module {locator}: {reason}")]
    Load { locator: String, reason: String },

    /// The bytes are not a WASM binary, or the binary failed to compile.
    #[error("invalid module: {0}")]
    InvalidModule(String),

    /// Linking, the start section, or `_start` failed.
    #[error("failed to instantiate module: {0}")]
    Instantiate(String),

    /// A memory interface only ever hosts one instantiation attempt that got
    /// past compilation, successful or not.
    #[error("memory interface has already been used to instantiate a module")]
    AlreadyInstantiated,

    /// Registering a host import failed.
    #[error("failed to define host import: {0}")]
    Link(String),

    #[error("module does not export a function named `{0}`")]
    MissingExport(String),

    #[error("export `{name}` has an unexpected signature: {reason}")]
    ExportSignature { name: String, reason: String },

    /// The export trapped while running.
    #[error("export `{name}` trapped: {reason}")]
    Trap { name: String, reason: String },
}

impl BridgeError {
    pub fn load(locator: &str, reason: impl Into<String>) -> Self {
        Self::Load {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn trap(name: &str, err: wasmi::Error) -> Self {
        Self::Trap {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }
}
