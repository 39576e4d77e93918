//! Conversion orchestration - runs every stage for each input file in order.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Instant;

use crate::error::PipelineResult;
use crate::types::{ConversionResult, TagOutcome};

use super::decode::ImageDecoder;
use super::hash::Hasher;
use super::observer::ConversionObserver;
use super::relocate::{destination, relocate};
use super::sniff::FileSniffer;
use super::tagger::{CommandTagger, Tagger};

/// What to convert and where to put it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    output_directory: String,
    run_external_tool: bool,
    input_paths: Vec<PathBuf>,
}

impl ConversionRequest {
    /// Build a request, making sure `output_directory` ends with exactly one
    /// separator. An empty directory means the current one.
    pub fn new(
        output_directory: impl Into<String>,
        run_external_tool: bool,
        input_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            output_directory: normalize_directory(output_directory.into()),
            run_external_tool,
            input_paths,
        }
    }

    /// Output directory, always ending with a separator.
    pub fn output_directory(&self) -> &str {
        &self.output_directory
    }

    /// Whether the tagger runs after each move.
    pub fn run_external_tool(&self) -> bool {
        self.run_external_tool
    }

    /// Files to convert, in processing order.
    pub fn input_paths(&self) -> &[PathBuf] {
        &self.input_paths
    }
}

fn normalize_directory(mut directory: String) -> String {
    if directory.is_empty() {
        return format!(".{MAIN_SEPARATOR}");
    }
    if !directory.ends_with('/') && !directory.ends_with(MAIN_SEPARATOR) {
        directory.push(MAIN_SEPARATOR);
    }
    directory
}

/// Renames images after the MD5 of their pixels and moves them into the
/// output directory, one file at a time.
pub struct Converter {
    request: ConversionRequest,
    decoder: ImageDecoder,
    sniffer: FileSniffer,
    tagger: Box<dyn Tagger>,
}

impl Converter {
    /// Create a converter that tags with the default `wpg -a`.
    pub fn new(request: ConversionRequest) -> Self {
        Self::with_tagger(request, Box::new(CommandTagger::default()))
    }

    /// Create a converter with a specific tagger.
    pub fn with_tagger(request: ConversionRequest, tagger: Box<dyn Tagger>) -> Self {
        Self {
            request,
            decoder: ImageDecoder::new(),
            sniffer: FileSniffer::new(),
            tagger,
        }
    }

    /// Lazily convert the requested files in order.
    ///
    /// Each call to `next()` converts one file. After the first fatal error
    /// the iterator yields that error and then stops.
    pub fn conversions<'a>(
        &'a self,
        observer: &'a mut dyn ConversionObserver,
    ) -> Conversions<'a> {
        Conversions {
            converter: self,
            observer,
            paths: self.request.input_paths.iter(),
            failed: false,
        }
    }

    /// Convert every requested file, stopping at the first fatal error.
    ///
    /// Files converted before the error stay where they were moved.
    pub fn run(
        &self,
        observer: &mut dyn ConversionObserver,
    ) -> PipelineResult<Vec<ConversionResult>> {
        let start = Instant::now();
        let results = self
            .conversions(observer)
            .collect::<PipelineResult<Vec<_>>>()?;
        tracing::info!(
            "Converted {} image(s) in {:?}",
            results.len(),
            start.elapsed()
        );
        Ok(results)
    }

    /// Decode, hash, sniff, move and optionally tag a single file.
    pub fn convert_one(
        &self,
        path: &Path,
        observer: &mut dyn ConversionObserver,
    ) -> PipelineResult<ConversionResult> {
        let start = Instant::now();
        tracing::debug!("Converting: {:?}", path);

        let decoded = self.decoder.decode(path)?;
        tracing::trace!("  Decode: {:?}", start.elapsed());

        let hash_start = Instant::now();
        let hash = Hasher::image_hash(&decoded);
        tracing::trace!("  Pixel hash: {:?}", hash_start.elapsed());
        let (width, height) = (decoded.width, decoded.height);
        drop(decoded);

        let kind = self.sniffer.detect(path)?;
        tracing::trace!("  Detected {} ({})", kind.extension, kind.mime);

        let new_path = destination(&self.request.output_directory, &hash, kind.extension);
        relocate(path, &new_path, observer)?;

        let tagging = if self.request.run_external_tool {
            match self.tagger.tag(&new_path) {
                Ok(outcome) => outcome,
                Err(e) if e.is_recoverable() => {
                    tracing::debug!("{e}");
                    observer.on_tool_missing(self.tagger.program(), &new_path);
                    TagOutcome::ToolMissing
                }
                Err(e) => return Err(e),
            }
        } else {
            TagOutcome::Skipped
        };

        tracing::debug!(
            "Converted {:?} in {:?} ({}x{})",
            new_path,
            start.elapsed(),
            width,
            height
        );

        Ok(ConversionResult {
            original_path: path.to_path_buf(),
            new_path,
            hash,
            extension: kind.extension,
            tagging,
        })
    }
}

/// Iterator returned by [`Converter::conversions`].
pub struct Conversions<'a> {
    converter: &'a Converter,
    observer: &'a mut dyn ConversionObserver,
    paths: std::slice::Iter<'a, PathBuf>,
    failed: bool,
}

impl Iterator for Conversions<'_> {
    type Item = PipelineResult<ConversionResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let path = self.paths.next()?;
        let result = self.converter.convert_one(path, &mut *self.observer);
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.paths.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
    use image::{Rgb, RgbImage};
    use std::cell::Cell;
    use std::fs::File;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Counts calls and reports success.
    struct CountingTagger(Rc<Cell<usize>>);

    impl Tagger for CountingTagger {
        fn program(&self) -> &str {
            "counting"
        }

        fn tag(&self, _path: &Path) -> PipelineResult<TagOutcome> {
            self.0.set(self.0.get() + 1);
            Ok(TagOutcome::Completed { exit_code: Some(0) })
        }
    }

    /// Behaves like an uninstalled program.
    struct MissingTagger;

    impl Tagger for MissingTagger {
        fn program(&self) -> &str {
            "wpg"
        }

        fn tag(&self, path: &Path) -> PipelineResult<TagOutcome> {
            Err(PipelineError::ToolNotFound {
                program: "wpg".into(),
                path: path.to_path_buf(),
            })
        }
    }

    /// Exists but cannot be run.
    struct FailingTagger;

    impl Tagger for FailingTagger {
        fn program(&self) -> &str {
            "wpg"
        }

        fn tag(&self, path: &Path) -> PipelineResult<TagOutcome> {
            Err(PipelineError::Tagger {
                program: "wpg".into(),
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        moves: Vec<(PathBuf, PathBuf, bool)>,
        missing: Vec<PathBuf>,
    }

    impl ConversionObserver for Recorder {
        fn on_move(&mut self, from: &Path, to: &Path, succeeded: bool) {
            self.moves
                .push((from.to_path_buf(), to.to_path_buf(), succeeded));
        }

        fn on_tool_missing(&mut self, _program: &str, path: &Path) {
            self.missing.push(path.to_path_buf());
        }
    }

    struct Workspace {
        input: TempDir,
        output: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                input: tempfile::tempdir().unwrap(),
                output: tempfile::tempdir().unwrap(),
            }
        }

        fn image(&self, name: &str, color: [u8; 3]) -> PathBuf {
            let path = self.input.path().join(name);
            RgbImage::from_pixel(8, 8, Rgb(color)).save(&path).unwrap();
            path
        }

        fn png_with(&self, name: &str, color: [u8; 3], compression: CompressionType) -> PathBuf {
            let path = self.input.path().join(name);
            let encoder =
                PngEncoder::new_with_quality(File::create(&path).unwrap(), compression, FilterType::Sub);
            RgbImage::from_pixel(8, 8, Rgb(color))
                .write_with_encoder(encoder)
                .unwrap();
            path
        }

        fn out(&self) -> String {
            self.output.path().display().to_string()
        }

        fn output_files(&self) -> Vec<PathBuf> {
            let mut files: Vec<_> = std::fs::read_dir(self.output.path())
                .unwrap()
                .map(|entry| entry.unwrap().path())
                .collect();
            files.sort();
            files
        }
    }

    fn converter(request: ConversionRequest) -> (Converter, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let tagger = Box::new(CountingTagger(Rc::clone(&calls)));
        (Converter::with_tagger(request, tagger), calls)
    }

    #[test]
    fn test_request_appends_separator_once() {
        let bare = ConversionRequest::new("out", false, vec![]);
        let slashed = ConversionRequest::new("out/", false, vec![]);
        assert_eq!(bare.output_directory(), format!("out{MAIN_SEPARATOR}"));
        assert_eq!(slashed.output_directory(), "out/");
    }

    #[test]
    fn test_request_empty_directory_is_current() {
        let request = ConversionRequest::new("", false, vec![]);
        assert_eq!(request.output_directory(), format!(".{MAIN_SEPARATOR}"));
    }

    #[test]
    fn test_hash_is_digest_of_decoded_pixels() {
        let ws = Workspace::new();
        let input = ws.image("holiday-photo.png", [12, 34, 56]);
        let expected = Hasher::pixel_hash(&[12u8, 34, 56].repeat(64));

        let (converter, _) = converter(ConversionRequest::new(ws.out(), false, vec![input.clone()]));
        let results = converter.run(&mut Recorder::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hash, expected);
        assert_eq!(results[0].extension, "png");
        assert_eq!(
            results[0].new_path.file_name().unwrap().to_str().unwrap(),
            format!("{expected}.png")
        );
        assert!(!input.exists());
        assert!(results[0].new_path.exists());
    }

    #[test]
    fn test_destination_same_with_or_without_trailing_separator() {
        let ws = Workspace::new();
        let a = ws.image("a.png", [1, 1, 1]);
        let b = ws.image("b.png", [1, 1, 1]);

        let (bare, _) = converter(ConversionRequest::new(ws.out(), false, vec![a]));
        let (slashed, _) = converter(ConversionRequest::new(
            format!("{}/", ws.out()),
            false,
            vec![b],
        ));
        let first = bare.run(&mut Recorder::default()).unwrap();
        let second = slashed.run(&mut Recorder::default()).unwrap();

        assert_eq!(first[0].new_path, second[0].new_path);
        assert_eq!(
            first[0].new_path,
            ws.output.path().join(format!("{}.png", first[0].hash))
        );
    }

    #[test]
    fn test_identical_pixels_collide_and_overwrite() {
        let ws = Workspace::new();
        let fast = ws.png_with("fast.png", [200, 100, 0], CompressionType::Fast);
        let best = ws.png_with("best.png", [200, 100, 0], CompressionType::Best);
        let best_bytes = std::fs::read(&best).unwrap();

        let (converter, _) = converter(ConversionRequest::new(ws.out(), false, vec![fast, best]));
        let results = converter.run(&mut Recorder::default()).unwrap();

        assert_eq!(results[0].new_path, results[1].new_path);
        assert_eq!(ws.output_files(), vec![results[1].new_path.clone()]);
        assert_eq!(std::fs::read(&results[1].new_path).unwrap(), best_bytes);
    }

    #[test]
    fn test_tagger_never_runs_without_flag() {
        let ws = Workspace::new();
        let inputs = vec![
            ws.image("a.png", [1, 0, 0]),
            ws.image("b.png", [0, 1, 0]),
            ws.image("c.png", [0, 0, 1]),
        ];

        let (converter, calls) = converter(ConversionRequest::new(ws.out(), false, inputs));
        let results = converter.run(&mut Recorder::default()).unwrap();

        assert_eq!(calls.get(), 0);
        assert!(results.iter().all(|r| r.tagging == TagOutcome::Skipped));
    }

    #[test]
    fn test_tagger_runs_once_per_file_with_flag() {
        let ws = Workspace::new();
        let inputs = vec![ws.image("a.png", [1, 0, 0]), ws.image("b.png", [0, 1, 0])];

        let (converter, calls) = converter(ConversionRequest::new(ws.out(), true, inputs));
        let results = converter.run(&mut Recorder::default()).unwrap();

        assert_eq!(calls.get(), 2);
        assert!(results.iter().all(ConversionResult::tool_invoked));
    }

    #[test]
    fn test_missing_tagger_warns_per_file_and_completes() {
        let ws = Workspace::new();
        let inputs = vec![ws.image("a.png", [9, 9, 9]), ws.image("b.png", [8, 8, 8])];

        let converter = Converter::with_tagger(
            ConversionRequest::new(ws.out(), true, inputs),
            Box::new(MissingTagger),
        );
        let mut recorder = Recorder::default();
        let results = converter.run(&mut recorder).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.tagging == TagOutcome::ToolMissing));
        let moved: Vec<_> = results.iter().map(|r| r.new_path.clone()).collect();
        assert_eq!(recorder.missing, moved);
    }

    #[test]
    fn test_tagger_failure_aborts_remaining_files() {
        let ws = Workspace::new();
        let first = ws.image("1.png", [10, 0, 0]);
        let second = ws.image("2.png", [0, 10, 0]);

        let converter = Converter::with_tagger(
            ConversionRequest::new(ws.out(), true, vec![first.clone(), second.clone()]),
            Box::new(FailingTagger),
        );
        let mut recorder = Recorder::default();
        let err = converter.run(&mut recorder).unwrap_err();

        assert!(matches!(err, PipelineError::Tagger { .. }));
        assert!(!err.is_recoverable());
        assert!(!first.exists());
        assert_eq!(ws.output_files().len(), 1);
        assert!(second.exists());
        assert_eq!(recorder.moves.len(), 1);
        assert!(recorder.missing.is_empty());
    }

    #[test]
    fn test_pnm_gets_its_own_extension() {
        let ws = Workspace::new();
        let path = ws.input.path().join("scan.pnm");
        let encoder = PnmEncoder::new(File::create(&path).unwrap())
            .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
        RgbImage::from_pixel(8, 8, Rgb([60, 70, 80]))
            .write_with_encoder(encoder)
            .unwrap();

        let (converter, _) = converter(ConversionRequest::new(ws.out(), false, vec![path]));
        let results = converter.run(&mut Recorder::default()).unwrap();

        assert_eq!(results[0].extension, "ppm");
        assert_eq!(
            results[0].new_path,
            ws.output.path().join(format!("{}.ppm", results[0].hash))
        );
    }

    #[test]
    fn test_decode_failure_aborts_remaining_files() {
        let ws = Workspace::new();
        let first = ws.image("1.png", [1, 2, 3]);
        let broken = ws.input.path().join("2.png");
        std::fs::write(&broken, b"not an image").unwrap();
        let third = ws.image("3.png", [4, 5, 6]);

        let (converter, _) = converter(ConversionRequest::new(
            ws.out(),
            false,
            vec![first.clone(), broken.clone(), third.clone()],
        ));
        let mut recorder = Recorder::default();
        let err = converter.run(&mut recorder).unwrap_err();

        assert!(matches!(err, PipelineError::Decode { ref path, .. } if *path == broken));
        assert!(!first.exists());
        assert_eq!(ws.output_files().len(), 1);
        assert!(broken.exists());
        assert!(third.exists());
        assert_eq!(recorder.moves.len(), 1);
    }

    #[test]
    fn test_conversions_is_lazy_and_fuses_after_error() {
        let ws = Workspace::new();
        let broken = ws.input.path().join("broken.png");
        std::fs::write(&broken, b"garbage").unwrap();
        let after = ws.image("after.png", [7, 7, 7]);

        let (converter, _) =
            converter(ConversionRequest::new(ws.out(), false, vec![broken, after.clone()]));
        let mut recorder = Recorder::default();
        let mut conversions = converter.conversions(&mut recorder);

        assert!(conversions.next().unwrap().is_err());
        assert!(conversions.next().is_none());
        assert!(after.exists());
    }

    #[test]
    fn test_undetectable_type_is_fatal_and_file_stays() {
        // TGA decodes via its extension but has no magic number to sniff
        let ws = Workspace::new();
        let tga = ws.image("banner.tga", [3, 3, 3]);

        let (converter, _) = converter(ConversionRequest::new(ws.out(), false, vec![tga.clone()]));
        let err = converter.run(&mut Recorder::default()).unwrap_err();

        assert!(matches!(err, PipelineError::UnknownType { .. }));
        assert!(tga.exists());
        assert!(ws.output_files().is_empty());
    }

    #[test]
    fn test_move_failure_still_reports_attempt() {
        let ws = Workspace::new();
        let input = ws.image("a.png", [5, 5, 5]);
        let missing_dir = ws.output.path().join("does-not-exist");

        let (converter, calls) = converter(ConversionRequest::new(
            missing_dir.display().to_string(),
            true,
            vec![input.clone()],
        ));
        let mut recorder = Recorder::default();
        let err = converter.run(&mut recorder).unwrap_err();

        assert!(matches!(err, PipelineError::Move { .. }));
        assert_eq!(recorder.moves.len(), 1);
        assert_eq!(recorder.moves[0].0, input);
        assert!(!recorder.moves[0].2);
        assert_eq!(calls.get(), 0);
        assert!(input.exists());
    }
}
