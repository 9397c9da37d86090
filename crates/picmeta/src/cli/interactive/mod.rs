//! Interactive CLI mode, the guided experience for bare `picmeta` invocation.
//!
//! When `picmeta` is invoked with no subcommand on a TTY, this module provides
//! a menu-driven interface that delegates to the same analysis logic as the
//! flag-based CLI.

pub mod analyze;
pub mod theme;

use dialoguer::Select;
use picmeta_core::{Config, KeyStyle};
use std::path::Path;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Wraps `interact_text()` calls that lack an `_opt` variant.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Analyze an image",
    "Analyze a folder",
    "Show configuration",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: &Config, config_path: &Path) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::picmeta_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => analyze::guided_analyze_image(config).await?,
            Some(1) => analyze::guided_analyze_folder(config).await?,
            Some(2) => show_config(config, config_path)?,
            // Exit, Esc or Ctrl+C
            _ => break,
        }
    }

    Ok(())
}

/// Summary of the effective settings, with options to print the TOML or the path.
fn show_config(config: &Config, config_path: &Path) -> anyhow::Result<()> {
    let theme = theme::picmeta_theme();
    let dim = theme::dim();
    let label = theme::label();

    loop {
        eprintln!();
        eprintln!("  {}", theme::heading().apply_to("Current configuration:"));
        eprintln!();

        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Formats:"),
            config.processing.supported_formats.join(", ")
        );
        eprintln!(
            "    {:<20} {} MB, {}px, {} ms decode",
            label.apply_to("Limits:"),
            config.limits.max_file_size_mb,
            config.limits.max_image_dimension,
            config.limits.decode_timeout_ms
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Colours:"),
            palette_summary(config)
        );
        eprintln!(
            "    {:<20} {} ({} keys{})",
            label.apply_to("Output:"),
            config.output.format,
            key_style_name(config.output.labels),
            if config.output.pretty { ", pretty" } else { "" }
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    eprintln!(
                        "  {} Failed to serialize config: {e}",
                        theme::warn().apply_to("✗")
                    );
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", config_path.display());
                eprintln!();
            }
            _ => break,
        }
    }

    Ok(())
}

fn palette_summary(config: &Config) -> String {
    if config.palette.enabled {
        format!(
            "top {} from a {}px sample",
            config.palette.colors, config.palette.sample_size
        )
    } else {
        "disabled".to_string()
    }
}

fn key_style_name(style: KeyStyle) -> &'static str {
    match style {
        KeyStyle::Machine => "machine",
        KeyStyle::Human => "human",
    }
}
