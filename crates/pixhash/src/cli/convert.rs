//! Converting the files named on the command line.

use clap::Args;
use pixhash_core::{CommandTagger, Config, ConversionObserver, ConversionRequest, Converter};
use std::path::PathBuf;

use super::report::ConsoleReporter;

/// Arguments for converting images.
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Files to be converted
    #[arg(value_name = "FILES", required_unless_present = "print_config")]
    pub files: Vec<PathBuf>,

    /// Directory where converted images are put [default: ./]
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<String>,

    /// Run wpg on the converted images
    #[arg(short, long)]
    pub wpg: bool,

    /// Tagging program to run instead of wpg
    #[arg(long, value_name = "PROGRAM", env = "PIXHASH_TAGGER")]
    pub tagger: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Execute a conversion run, printing status lines to stdout.
pub fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    let mut reporter = ConsoleReporter::stdout();
    run(args, config, &mut reporter)
}

/// Apply CLI overrides, then either print the config or convert.
fn run(
    args: ConvertArgs,
    mut config: Config,
    observer: &mut dyn ConversionObserver,
) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let request = ConversionRequest::new(config.output_dir(), config.tagger.enabled, args.files);
    tracing::info!(
        "Converting {} file(s) into {}",
        request.input_paths().len(),
        request.output_directory()
    );
    if request.run_external_tool() {
        tracing::debug!(
            "Tagging with: {} {}",
            config.tagger.program,
            config.tagger.args.join(" ")
        );
    }

    let converter = Converter::with_tagger(request, Box::new(CommandTagger::new(&config.tagger)));
    converter.run(observer)?;
    Ok(())
}

/// CLI flags take precedence over the config file.
fn apply_overrides(args: &ConvertArgs, config: &mut Config) {
    if let Some(out) = &args.out {
        config.output.directory = out.clone();
    }
    if args.wpg {
        config.tagger.enabled = true;
    }
    if let Some(program) = &args.tagger {
        config.tagger.program = program.clone();
    }
}
