//! Destination naming and the move into the output directory.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

use super::observer::ConversionObserver;

/// Build `<output_directory><hash>.<extension>`.
///
/// `output_directory` must already end with a separator; see
/// [`ConversionRequest`](super::ConversionRequest).
pub fn destination(output_directory: &str, hash: &str, extension: &str) -> PathBuf {
    PathBuf::from(format!("{output_directory}{hash}.{extension}"))
}

/// Reports the attempted move when dropped, whichever way `relocate` exits.
struct MoveReport<'a> {
    observer: &'a mut dyn ConversionObserver,
    from: &'a Path,
    to: &'a Path,
    succeeded: bool,
}

impl Drop for MoveReport<'_> {
    fn drop(&mut self) {
        self.observer.on_move(self.from, self.to, self.succeeded);
    }
}

/// Rename `from` to `to`, replacing anything already at `to`.
pub fn relocate(
    from: &Path,
    to: &Path,
    observer: &mut dyn ConversionObserver,
) -> PipelineResult<()> {
    let mut report = MoveReport {
        observer,
        from,
        to,
        succeeded: false,
    };

    std::fs::rename(from, to).map_err(|source| PipelineError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;

    report.succeeded = true;
    tracing::trace!("  Renamed {:?} -> {:?}", from, to);
    Ok(())
}
