//! pixhash core - rename images after the MD5 of their pixels.
//!
//! Every input image is decoded, its raw pixel buffer is hashed, its real
//! type is sniffed from the file's magic bytes, and the file is moved to
//! `<output dir>/<md5>.<ext>`. An external tagging program (`wpg -a` by
//! default) can be run on each result.
//!
//! ```text
//! File → Decode → MD5(pixels) → Sniff type → Rename → [Tag]
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixhash_core::{ConversionRequest, Converter, NullObserver};
//!
//! fn main() -> pixhash_core::Result<()> {
//!     let request = ConversionRequest::new("wallpapers", false, vec!["in/cat.png".into()]);
//!     let results = Converter::new(request).run(&mut NullObserver)?;
//!     println!("{}", results[0].new_path.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, PixhashError, Result};
pub use pipeline::{
    CommandTagger, ConversionObserver, ConversionRequest, Converter, NullObserver, Tagger,
};
pub use types::{ConversionResult, TagOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
