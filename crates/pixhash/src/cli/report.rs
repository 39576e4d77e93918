//! Console status lines for a conversion run.

use std::io::Write;
use std::path::Path;

use pixhash_core::ConversionObserver;

/// Prints one status line per move attempt and a notice per file when the
/// tagger is missing.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(line).and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write status line: {e}");
        }
    }
}

impl<W: Write> ConversionObserver for ConsoleReporter<W> {
    fn on_move(&mut self, from: &Path, to: &Path, _succeeded: bool) {
        self.emit(format_args!(
            "Moved {}\n to: {}\n",
            from.display(),
            to.display()
        ));
    }

    fn on_tool_missing(&mut self, program: &str, _path: &Path) {
        self.emit(format_args!("{program} not found in $PATH, ignoring...\n"));
    }
}
