//! The `picmeta analyze` command for extracting image metadata.

mod batch;
mod setup;
pub mod types;

pub use types::{Labels, OutputFormat};

use clap::Args;
use picmeta_core::{
    Config, ImageProcessor, KeyStyle, OutputFormat as CoreOutputFormat, OutputRecord,
    OutputWriter, ProcessOptions, ProcessingStats,
};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use batch::analyze_batch;
use setup::setup_analyzer;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file or directory to analyze
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format [default: from config, "json"]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of dominant colours to report
    #[arg(long)]
    pub colors: Option<usize>,

    /// Longest side of the colour sample in pixels
    #[arg(long)]
    pub sample_size: Option<u32>,

    /// Disable dominant colour analysis
    #[arg(long)]
    pub no_colors: bool,

    /// Key names in the output [default: from config, "machine"]
    #[arg(long, value_enum)]
    pub labels: Option<Labels>,

    /// Skip already-analyzed images (checks output file for existing hashes)
    #[arg(long)]
    pub skip_existing: bool,

    /// Compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Manual Default impl for constructing AnalyzeArgs outside of clap.
///
/// Used by the interactive module to build AnalyzeArgs field-by-field.
impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            format: None,
            colors: None,
            sample_size: None,
            no_colors: false,
            labels: None,
            skip_existing: false,
            compact: false,
        }
    }
}

/// Everything needed to analyze and write records, assembled by setup_analyzer().
pub(crate) struct AnalyzeContext {
    pub processor: ImageProcessor,
    pub options: ProcessOptions,
    pub output_format: CoreOutputFormat,
    pub labels: KeyStyle,
    pub pretty: bool,
}

impl AnalyzeContext {
    /// Open the output destination: the `-o` file, or stdout.
    ///
    /// With `append`, an existing file is extended instead of truncated.
    pub(crate) fn writer(
        &self,
        output: Option<&Path>,
        append: bool,
    ) -> anyhow::Result<OutputWriter<Box<dyn Write>>> {
        let sink: Box<dyn Write> = match output {
            Some(path) if append && path.exists() => {
                Box::new(BufWriter::new(OpenOptions::new().append(true).open(path)?))
            }
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(std::io::stdout().lock()),
        };
        Ok(OutputWriter::new(sink, self.output_format, self.pretty).with_labels(self.labels))
    }
}

/// Execute the analyze command.
///
/// Returns batch statistics for directory input, `None` for a single file.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<Option<ProcessingStats>> {
    let ctx = setup_analyzer(&args, config)?;

    if args.input.is_file() {
        analyze_single(&ctx, &args).await?;
        return Ok(None);
    }

    let files = ctx.processor.discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(Some(ProcessingStats::default()));
    }
    tracing::info!("Found {} image(s) to analyze", files.len());

    let stats = analyze_batch(&ctx, &args, files).await?;
    Ok(Some(stats))
}

/// Analyze one file and write its record.
///
/// Rejected files still produce an error record, so callers always get output.
async fn analyze_single(ctx: &AnalyzeContext, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let record = ctx
        .processor
        .analyze_with_options(&args.input, &ctx.options)
        .await;

    let mut writer = ctx.writer(args.output.as_deref(), false)?;
    writer.write(&record)?;
    writer.flush()?;

    if let Some(ref output_path) = args.output {
        tracing::info!("Output written to {:?}", output_path);
    }
    if let OutputRecord::Error { error, .. } = &record {
        tracing::error!("Analysis failed: {error}");
    }

    Ok(())
}
