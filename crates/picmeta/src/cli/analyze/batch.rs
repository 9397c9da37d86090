//! Batch analysis: directory traversal with progress, skip-existing, and streaming output.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use picmeta_core::pipeline::{DiscoveredFile, Hasher};
use picmeta_core::{OutputFormat as CoreOutputFormat, OutputRecord, ProcessingStats};

use super::{AnalyzeArgs, AnalyzeContext};

/// Analyze a directory of images with progress tracking.
///
/// JSONL output is streamed record by record; JSON output is collected and
/// written as one array at the end.
pub async fn analyze_batch(
    ctx: &AnalyzeContext,
    args: &AnalyzeArgs,
    files: Vec<DiscoveredFile>,
) -> anyhow::Result<ProcessingStats> {
    let existing_hashes = if args.skip_existing {
        load_existing_hashes(args.output.as_deref())?
    } else {
        HashSet::new()
    };
    if !existing_hashes.is_empty() {
        tracing::info!(
            "Loaded {} existing hashes from output file",
            existing_hashes.len()
        );
    }

    let streaming = ctx.output_format == CoreOutputFormat::JsonLines;
    let mut stream_writer = if streaming {
        Some(ctx.writer(args.output.as_deref(), args.skip_existing)?)
    } else {
        None
    };
    // Appending to a JSON array is invalid, so earlier records are merged in.
    let mut collected: Vec<OutputRecord> = match (&args.output, args.skip_existing) {
        (Some(path), true) if !streaming => load_existing_records(path)?,
        _ => Vec::new(),
    };

    let progress = create_progress_bar(files.len() as u64);
    let mut stats = ProcessingStats::default();
    let start_time = Instant::now();

    for file in &files {
        if !existing_hashes.is_empty() {
            if let Ok(hash) = Hasher::content_hash(&file.path) {
                if existing_hashes.contains(&hash) {
                    stats.skipped += 1;
                    progress.inc(1);
                    continue;
                }
            }
        }

        let record = ctx
            .processor
            .analyze_with_options(&file.path, &ctx.options)
            .await;

        match &record {
            OutputRecord::Report(report) => {
                stats.succeeded += 1;
                stats.total_bytes += report.file_metadata.file_size_bytes;
            }
            OutputRecord::Error { error, .. } => {
                stats.failed += 1;
                tracing::error!("Failed: {:?} - {}", file.path, error);
            }
        }

        if let Some(writer) = &mut stream_writer {
            writer.write(&record)?;
        } else {
            collected.push(record);
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (stats.succeeded + stats.failed) as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    }

    if let Some(mut writer) = stream_writer {
        writer.flush()?;
    } else {
        let mut writer = ctx.writer(args.output.as_deref(), false)?;
        writer.write_all(&collected)?;
        writer.flush()?;
    }
    if let Some(output_path) = &args.output {
        tracing::info!("Output written to {:?}", output_path);
    }

    stats.total_seconds = start_time.elapsed().as_secs_f64();
    progress.finish_and_clear();
    print_summary(&stats);

    Ok(stats)
}

/// Load content hashes from an earlier JSON or JSONL output file for --skip-existing.
///
/// Only machine-labelled records can be read back.
fn load_existing_hashes(output_path: Option<&Path>) -> anyhow::Result<HashSet<String>> {
    let mut hashes = HashSet::new();

    let Some(path) = output_path else {
        return Ok(hashes);
    };
    if !path.exists() {
        return Ok(hashes);
    }

    let content = std::fs::read_to_string(path)?;

    // Try JSON array first (handles --format json output)
    if let Ok(records) = serde_json::from_str::<Vec<OutputRecord>>(&content) {
        hashes.extend(records.iter().filter_map(|r| r.content_hash().map(String::from)));
        return Ok(hashes);
    }

    // Fall back to line-by-line JSONL parsing
    tracing::debug!("Output file is not a JSON array, trying JSONL line-by-line");
    let mut skipped_lines = 0u64;
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<OutputRecord>(line) {
            Ok(record) => hashes.extend(record.content_hash().map(String::from)),
            Err(_) => skipped_lines += 1,
        }
    }
    if skipped_lines > 0 {
        tracing::warn!(
            "--skip-existing: {skipped_lines} lines in output file could not be parsed; \
             those images will be analyzed again"
        );
    }

    Ok(hashes)
}

/// Records of an existing JSON array output, for merging.
///
/// An output file that cannot be read back is an error: rewriting it would
/// drop its records.
fn load_existing_records(path: &Path) -> anyhow::Result<Vec<OutputRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<OutputRecord>>(&content).map_err(|e| {
        anyhow::anyhow!(
            "--skip-existing: cannot merge into {:?} ({e}).\n  \
             Only machine-labelled JSON arrays can be extended; \
             choose another output file.",
            path
        )
    })
}

/// Create a progress bar for batch analysis.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.magenta} [{elapsed_precise}] [{bar:40.magenta/white}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch analysis.
fn print_summary(stats: &ProcessingStats) {
    let total = stats.succeeded + stats.failed + stats.skipped;
    let mb_read = stats.total_bytes as f64 / (1024.0 * 1024.0);

    eprintln!();
    eprintln!("  ------------------------------------");
    eprintln!("    Analyzed:     {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", stats.skipped);
    }
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Read:         {:>7.1} MB", mb_read);
    eprintln!("    Duration:     {:>7.1}s", stats.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", stats.images_per_second());
    eprintln!("  ------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use picmeta_core::{Config, ImageProcessor, KeyStyle, ProcessOptions};
    use std::io::Write;
    use std::path::PathBuf;

    fn error_record(path: &str) -> OutputRecord {
        OutputRecord::Error {
            file_path: PathBuf::from(path),
            error: "Unsupported format".to_string(),
        }
    }

    /// A real report for a generated image, so the hash is a real BLAKE3 hash.
    async fn report_for(path: &Path) -> OutputRecord {
        ImageProcessor::new(&Config::default()).analyze(path).await
    }

    fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(3, 3, image::Rgb([shade, shade, shade]))
            .save(&path)
            .unwrap();
        path
    }

    fn context(format: CoreOutputFormat) -> AnalyzeContext {
        AnalyzeContext {
            processor: ImageProcessor::new(&Config::default()),
            options: ProcessOptions::default(),
            output_format: format,
            labels: KeyStyle::Machine,
            pretty: false,
        }
    }

    #[tokio::test]
    async fn test_load_existing_hashes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "a.png", 10);
        let report = report_for(&image).await;
        let hash = report.content_hash().unwrap().to_string();

        let path = dir.path().join("output.json");
        let records = vec![report, error_record("/x/notes.txt")];
        std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();

        let hashes = load_existing_hashes(Some(&path)).unwrap();
        assert_eq!(hashes.len(), 1);
        assert!(hashes.contains(&hash));
    }

    #[tokio::test]
    async fn test_load_existing_hashes_jsonl_with_corrupt_line() {
        let dir = tempfile::tempdir().unwrap();
        let a = report_for(&write_png(dir.path(), "a.png", 10)).await;
        let b = report_for(&write_png(dir.path(), "b.png", 200)).await;

        let path = dir.path().join("output.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "{}", serde_json::to_string(&a).unwrap()).unwrap();
        writeln!(f, "this is not valid json at all").unwrap();
        writeln!(f, "{}", serde_json::to_string(&b).unwrap()).unwrap();

        let hashes = load_existing_hashes(Some(&path)).unwrap();
        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains(a.content_hash().unwrap()));
        assert!(hashes.contains(b.content_hash().unwrap()));
    }

    #[test]
    fn test_load_existing_hashes_missing_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nonexistent.json");
        assert!(load_existing_hashes(Some(&missing)).unwrap().is_empty());

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "").unwrap();
        assert!(load_existing_hashes(Some(&empty)).unwrap().is_empty());

        assert!(load_existing_hashes(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_jsonl_counts_and_streams() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("photos");
        std::fs::create_dir(&photos).unwrap();
        write_png(&photos, "a.png", 10);
        write_png(&photos, "b.png", 20);
        std::fs::write(photos.join("c.jpg"), b"not a jpeg").unwrap();

        let output = dir.path().join("out.jsonl");
        let args = AnalyzeArgs {
            input: photos.clone(),
            output: Some(output.clone()),
            ..AnalyzeArgs::default()
        };
        let ctx = context(CoreOutputFormat::JsonLines);
        let files = ctx.processor.discover(&photos);

        let stats = analyze_batch(&ctx, &args, files).await.unwrap();
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 0);

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_batch_json_skip_existing_merges() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("photos");
        std::fs::create_dir(&photos).unwrap();
        write_png(&photos, "a.png", 10);

        let output = dir.path().join("out.json");
        let args = AnalyzeArgs {
            input: photos.clone(),
            output: Some(output.clone()),
            skip_existing: true,
            ..AnalyzeArgs::default()
        };
        let ctx = context(CoreOutputFormat::Json);

        let first = analyze_batch(&ctx, &args, ctx.processor.discover(&photos))
            .await
            .unwrap();
        assert_eq!(first.succeeded, 1);

        write_png(&photos, "b.png", 20);
        let second = analyze_batch(&ctx, &args, ctx.processor.discover(&photos))
            .await
            .unwrap();
        assert_eq!(second.succeeded, 1);
        assert_eq!(second.skipped, 1);

        let records: Vec<OutputRecord> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_json_skip_existing_keeps_unreadable_output() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("photos");
        std::fs::create_dir(&photos).unwrap();
        write_png(&photos, "a.png", 10);

        let output = dir.path().join("out.json");
        let human = r#"[{"type":"report","File information":{"File name":"old.png"}}]"#;
        std::fs::write(&output, human).unwrap();

        let args = AnalyzeArgs {
            input: photos.clone(),
            output: Some(output.clone()),
            skip_existing: true,
            ..AnalyzeArgs::default()
        };
        let ctx = context(CoreOutputFormat::Json);

        let err = analyze_batch(&ctx, &args, ctx.processor.discover(&photos))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot merge"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), human);
    }
}
