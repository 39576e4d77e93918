//! Progress events emitted while converting.

use std::path::Path;

/// Receives the user-facing events of a conversion run.
///
/// Both methods default to doing nothing, so implementors only override
/// what they display.
pub trait ConversionObserver {
    /// A rename from `from` to `to` was attempted.
    fn on_move(&mut self, _from: &Path, _to: &Path, _succeeded: bool) {}

    /// The tagging program was not found while tagging `path`.
    fn on_tool_missing(&mut self, _program: &str, _path: &Path) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl ConversionObserver for NullObserver {}
