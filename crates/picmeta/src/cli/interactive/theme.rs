//! Dialoguer theme, banner and shared output styles for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` in picmeta's colours: magenta prompts, green confirmations.
pub fn picmeta_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("◆".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Section heading style.
pub fn heading() -> Style {
    Style::new().for_stderr().magenta().bold()
}

/// Field label style.
pub fn label() -> Style {
    Style::new().for_stderr().bold()
}

/// Secondary text style.
pub fn dim() -> Style {
    Style::new().for_stderr().dim()
}

/// Warning text style.
pub fn warn() -> Style {
    Style::new().for_stderr().yellow()
}

/// Prints the picmeta banner to stderr, keeping stdout free for data.
pub fn print_banner() {
    let title = format!("picmeta v{}", picmeta_core::VERSION);
    let tagline = "file facts · EXIF · GPS · dominant colours";

    let width = title.chars().count().max(tagline.chars().count()) + 4;
    let rule = "─".repeat(width);
    let magenta = Style::new().for_stderr().magenta();

    eprintln!();
    eprintln!("  {}", magenta.apply_to(format!("┌{rule}┐")));
    eprintln!("  {}", magenta.apply_to(format!("│{title:^width$}│")));
    eprintln!("  {}", magenta.apply_to(format!("│{tagline:^width$}│")));
    eprintln!("  {}", magenta.apply_to(format!("└{rule}┘")));
    eprintln!();
}
