//! Guided analysis flows.
//!
//! A single image is analyzed in-process and summarised on stderr, with an
//! offer to save the JSON. A folder builds `AnalyzeArgs` and delegates to
//! `cli::analyze::execute()`.

use dialoguer::{Confirm, Input, Select};
use picmeta_core::pipeline::FileDiscovery;
use picmeta_core::{
    ColorPalette, Config, ExifSection, ImageProcessor, ImageReport, ImageSection, OutputFormat,
    OutputRecord, OutputWriter,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::theme::{self, picmeta_theme};
use crate::cli::analyze::{self as analyze_cmd, AnalyzeArgs};

/// EXIF tags shown in the on-screen summary; the saved JSON has all of them.
const SUMMARY_TAG_LIMIT: usize = 20;

/// Analyze one image and print a readable summary.
pub async fn guided_analyze_image(config: &Config) -> anyhow::Result<()> {
    let theme = picmeta_theme();

    let path = loop {
        let Some(path) = prompt_path(&theme, "Path to image")? else {
            return Ok(());
        };
        if path.is_file() {
            break path;
        }
        eprintln!(
            "  {}",
            theme::warn().apply_to(format!("Not a file: {}", path.display()))
        );
    };

    let processor = ImageProcessor::new(config);
    let record = processor.analyze(&path).await;

    match &record {
        OutputRecord::Report(report) => print_report(report),
        OutputRecord::Error { error, .. } => {
            eprintln!();
            eprintln!("  {} {error}", theme::warn().apply_to("✗"));
            eprintln!();
            return Ok(());
        }
    }

    let save = Confirm::with_theme(&theme)
        .with_prompt("Save results as JSON?")
        .default(false)
        .interact_opt()?;
    if !matches!(save, Some(true)) {
        return Ok(());
    }

    let Some(output) = prompt_output_path(&theme, &default_output_name(&path))? else {
        return Ok(());
    };

    let sink = BufWriter::new(File::create(&output)?);
    let mut writer =
        OutputWriter::new(sink, OutputFormat::Json, true).with_labels(config.output.labels);
    writer.write(&record)?;
    writer.flush()?;

    eprintln!(
        "  {}",
        theme::dim().apply_to(format!("Saved to {}", output.display()))
    );
    eprintln!();

    Ok(())
}

/// Analyze every supported image under a folder.
pub async fn guided_analyze_folder(config: &Config) -> anyhow::Result<()> {
    let theme = picmeta_theme();

    // Re-prompts on both "not a directory" and "no images found".
    let (input, count) = loop {
        let Some(path) = prompt_path(&theme, "Path to folder")? else {
            return Ok(());
        };

        if !path.is_dir() {
            eprintln!(
                "  {}",
                theme::warn().apply_to(format!("Not a directory: {}", path.display()))
            );
            continue;
        }

        let files = FileDiscovery::new(config.processing.clone()).discover(&path);
        if files.is_empty() {
            eprintln!(
                "  {}",
                theme::warn().apply_to("No supported images found in that folder.")
            );
            continue;
        }

        eprintln!(
            "  {}",
            theme::dim().apply_to(format!(
                "Found {} image(s) ({:.1} MB)",
                files.len(),
                FileDiscovery::total_size(&files) as f64 / (1024.0 * 1024.0)
            ))
        );
        break (path, files.len());
    };

    let output_items = &[
        "JSONL file (recommended for folders)",
        "JSON array file",
        "Stream to stdout",
    ];
    let Some(choice) = Select::with_theme(&theme)
        .with_prompt("Output")
        .items(output_items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    let (output, format) = match choice {
        0 => (
            prompt_output_path(&theme, "./results.jsonl")?,
            analyze_cmd::OutputFormat::Jsonl,
        ),
        1 => (
            prompt_output_path(&theme, "./results.json")?,
            analyze_cmd::OutputFormat::Json,
        ),
        _ => (None, analyze_cmd::OutputFormat::Jsonl),
    };
    // An interrupted path prompt means back to the menu, not stdout.
    if choice < 2 && output.is_none() {
        return Ok(());
    }

    let confirm = Confirm::with_theme(&theme)
        .with_prompt(format!("Analyze {count} image(s)?"))
        .default(true)
        .interact_opt()?;
    if !matches!(confirm, Some(true)) {
        return Ok(());
    }

    let args = AnalyzeArgs {
        input,
        output,
        format: Some(format),
        ..AnalyzeArgs::default()
    };
    analyze_cmd::execute(args, config.clone()).await?;

    Ok(())
}

fn prompt_path(
    theme: &dialoguer::theme::ColorfulTheme,
    prompt: &str,
) -> anyhow::Result<Option<PathBuf>> {
    let raw = super::handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .interact_text(),
    )?;
    Ok(raw.map(|raw| expand_path(&raw)))
}

/// Prompt for an output file path with a default.
/// Returns `Ok(None)` if the user interrupts (Ctrl+C).
fn prompt_output_path(
    theme: &dialoguer::theme::ColorfulTheme,
    default: &str,
) -> anyhow::Result<Option<PathBuf>> {
    let raw = super::handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Output file path")
            .default(default.to_string())
            .interact_text(),
    )?;
    Ok(raw.map(|raw| expand_path(&raw)))
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

/// `./<stem>_metadata.json` next to the working directory.
fn default_output_name(image: &Path) -> String {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("./{stem}_metadata.json")
}

fn print_report(report: &ImageReport) {
    let heading = theme::heading();
    let label = theme::label();
    let dim = theme::dim();
    let file = &report.file_metadata;

    eprintln!();
    eprintln!("  {}", heading.apply_to("File"));
    eprintln!("    {:<18} {}", label.apply_to("Name:"), file.filename);
    eprintln!(
        "    {:<18} {} bytes ({} MB)",
        label.apply_to("Size:"),
        file.file_size_bytes,
        file.file_size_mb
    );
    if let Some(modified) = &file.modification_time {
        eprintln!("    {:<18} {modified}", label.apply_to("Modified:"));
    }
    eprintln!("    {:<18} {}", label.apply_to("BLAKE3:"), file.content_hash);

    eprintln!();
    eprintln!("  {}", heading.apply_to("Image"));
    match &report.image_metadata {
        ImageSection::Properties(props) => {
            eprintln!(
                "    {:<18} {}x{} {} {}",
                label.apply_to("Dimensions:"),
                props.width,
                props.height,
                props.format,
                props.color_mode
            );
            if props.is_animated {
                eprintln!("    {:<18} {}", label.apply_to("Frames:"), props.n_frames);
            }
            if let Some((x, y)) = props.dpi {
                eprintln!("    {:<18} {x} x {y}", label.apply_to("DPI:"));
            }
            match &props.color_palette {
                Some(ColorPalette::Colors(colors)) => {
                    for color in colors {
                        eprintln!(
                            "    {:<18} {:>6.2}%",
                            label.apply_to(&color.color),
                            color.percentage
                        );
                    }
                }
                Some(ColorPalette::Unavailable { error }) => {
                    eprintln!("    {}", dim.apply_to(format!("Colours unavailable: {error}")));
                }
                None => {}
            }
        }
        ImageSection::Unavailable { error } => {
            eprintln!("    {}", dim.apply_to(error));
        }
    }

    eprintln!();
    eprintln!("  {}", heading.apply_to("EXIF"));
    match &report.exif_metadata {
        ExifSection::Decoded(exif) if exif.is_empty() => {
            eprintln!("    {}", dim.apply_to("No EXIF data"));
        }
        ExifSection::Decoded(exif) => {
            for (tag, value) in exif.tags.iter().take(SUMMARY_TAG_LIMIT) {
                eprintln!("    {:<28} {value}", label.apply_to(tag));
            }
            if exif.tags.len() > SUMMARY_TAG_LIMIT {
                eprintln!(
                    "    {}",
                    dim.apply_to(format!(
                        "... and {} more",
                        exif.tags.len() - SUMMARY_TAG_LIMIT
                    ))
                );
            }
            if let Some(gps) = &exif.gps {
                eprintln!(
                    "    {:<28} {:.6}, {:.6}",
                    label.apply_to("GPS:"),
                    gps.latitude,
                    gps.longitude
                );
                if let Some(altitude) = &gps.altitude {
                    eprintln!("    {:<28} {altitude}", label.apply_to("GPS altitude:"));
                }
            }
        }
        ExifSection::Unavailable { error } => {
            eprintln!("    {}", dim.apply_to(error));
        }
    }
    eprintln!();
}
