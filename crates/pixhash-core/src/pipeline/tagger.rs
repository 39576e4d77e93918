//! External tagging program invocation.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::config::TaggerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::TagOutcome;

/// Something that tags a converted image.
pub trait Tagger {
    /// Program name, used in messages.
    fn program(&self) -> &str;

    /// Tag the image at `path`, blocking until done.
    ///
    /// Returns [`PipelineError::ToolNotFound`] when the program is not
    /// installed; callers treat that as recoverable.
    fn tag(&self, path: &Path) -> PipelineResult<TagOutcome>;
}

/// Runs `<program> <args...> <path>` as a child process.
#[derive(Debug, Clone)]
pub struct CommandTagger {
    program: String,
    args: Vec<String>,
}

impl Default for CommandTagger {
    fn default() -> Self {
        Self::new(&TaggerConfig::default())
    }
}

impl CommandTagger {
    pub fn new(config: &TaggerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl Tagger for CommandTagger {
    fn program(&self) -> &str {
        &self.program
    }

    fn tag(&self, path: &Path) -> PipelineResult<TagOutcome> {
        let start = std::time::Instant::now();
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => PipelineError::ToolNotFound {
                    program: self.program.clone(),
                    path: path.to_path_buf(),
                },
                _ => PipelineError::Tagger {
                    program: self.program.clone(),
                    path: path.to_path_buf(),
                    source,
                },
            })?;
        tracing::trace!("  {}: {:?}", self.program, start.elapsed());

        if !status.success() {
            tracing::warn!("{} exited with {} for {:?}", self.program, status, path);
        }
        Ok(TagOutcome::Completed {
            exit_code: status.code(),
        })
    }
}
