//! Core data types for the pixhash conversion pipeline.

use std::path::PathBuf;

/// What happened when tagging a converted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// Tagging was not requested
    Skipped,
    /// The tagger ran to completion (`exit_code` is `None` if killed by a signal)
    Completed { exit_code: Option<i32> },
    /// The tagger is not installed; the image was left untagged
    ToolMissing,
}

impl TagOutcome {
    /// Whether the external program actually ran.
    pub fn tool_invoked(&self) -> bool {
        matches!(self, TagOutcome::Completed { .. })
    }
}

/// The outcome of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Where the file was before the move
    pub original_path: PathBuf,

    /// Where the file is now
    pub new_path: PathBuf,

    /// MD5 of the decoded pixels, lowercase hex
    pub hash: String,

    /// Extension detected from the file's signature
    pub extension: &'static str,

    /// Tagging outcome
    pub tagging: TagOutcome,
}

impl ConversionResult {
    /// Whether the external tagger ran on this file.
    pub fn tool_invoked(&self) -> bool {
        self.tagging.tool_invoked()
    }
}
