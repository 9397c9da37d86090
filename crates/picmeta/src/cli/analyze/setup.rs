//! Analyzer setup: config overrides and output settings.

use picmeta_core::{Config, ImageProcessor, KeyStyle, OutputFormat as CoreOutputFormat, ProcessOptions};

use super::{AnalyzeArgs, AnalyzeContext};

/// Validate input, apply CLI overrides to the config and build the processor.
pub fn setup_analyzer(args: &AnalyzeArgs, mut config: Config) -> anyhow::Result<AnalyzeContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    if let Some(colors) = args.colors {
        if colors == 0 {
            anyhow::bail!("--colors must be at least 1");
        }
        config.palette.colors = colors;
    }

    if let Some(size) = args.sample_size {
        if size == 0 {
            anyhow::bail!("--sample-size must be at least 1");
        }
        config.palette.sample_size = size;
    }

    if args.no_colors {
        config.palette.enabled = false;
    }

    let output_format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };
    let labels: KeyStyle = args.labels.map(Into::into).unwrap_or(config.output.labels);
    let pretty = config.output.pretty && !args.compact;

    tracing::debug!(
        "Palette: {} colours from a {}px sample (enabled: {})",
        config.palette.colors,
        config.palette.sample_size,
        config.palette.enabled
    );

    Ok(AnalyzeContext {
        processor: ImageProcessor::new(&config),
        options: ProcessOptions {
            skip_colors: args.no_colors,
        },
        output_format,
        labels,
        pretty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::analyze::{Labels, OutputFormat};

    fn args_for(dir: &std::path::Path) -> AnalyzeArgs {
        AnalyzeArgs {
            input: dir.to_path_buf(),
            ..AnalyzeArgs::default()
        }
    }

    #[test]
    fn missing_input_is_rejected() {
        let args = AnalyzeArgs {
            input: "/nonexistent/photos".into(),
            ..AnalyzeArgs::default()
        };
        let err = setup_analyzer(&args, Config::default()).err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn config_defaults_apply_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output.format = "jsonl".to_string();
        config.output.labels = KeyStyle::Human;

        let ctx = setup_analyzer(&args_for(dir.path()), config).unwrap();
        assert_eq!(ctx.output_format, CoreOutputFormat::JsonLines);
        assert_eq!(ctx.labels, KeyStyle::Human);
        assert!(ctx.pretty);
        assert!(ctx.processor.colors_enabled());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            format: Some(OutputFormat::Json),
            labels: Some(Labels::Machine),
            compact: true,
            no_colors: true,
            ..args_for(dir.path())
        };

        let ctx = setup_analyzer(&args, Config::default()).unwrap();
        assert_eq!(ctx.output_format, CoreOutputFormat::Json);
        assert_eq!(ctx.labels, KeyStyle::Machine);
        assert!(!ctx.pretty);
        assert!(ctx.options.skip_colors);
        assert!(!ctx.processor.colors_enabled());
    }

    #[test]
    fn zero_colors_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            colors: Some(0),
            ..args_for(dir.path())
        };
        assert!(setup_analyzer(&args, Config::default()).is_err());
    }
}
