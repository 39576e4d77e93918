//! Conversion pipeline stages.
//!
//! Each input file passes through these stages in order:
//! - **decode**: Load and decode the image into raw pixels
//! - **hash**: MD5 over the decoded pixels
//! - **sniff**: Detect the file type from its magic bytes
//! - **relocate**: Build the destination name and move the file
//! - **tagger**: Optionally run the external tagging program
//!
//! The **converter** drives the stages; the **observer** receives the
//! events shown to the user.

pub mod converter;
pub mod decode;
pub mod hash;
pub mod observer;
pub mod relocate;
pub mod sniff;
pub mod tagger;

// Re-exports for convenient access
pub use converter::{ConversionRequest, Conversions, Converter};
pub use decode::{DecodedImage, ImageDecoder};
pub use hash::Hasher;
pub use observer::{ConversionObserver, NullObserver};
pub use relocate::{destination, relocate};
pub use sniff::{FileKind, FileSniffer};
pub use tagger::{CommandTagger, Tagger};
