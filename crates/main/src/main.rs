use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;
use tipus_reports::{generate, GenerateOptions, ReportKind};

/// Renders the TipUs PDF reports.
///
/// Fonts are looked up in `--fonts-dir`, then `TIPUS_REPORTS_FONTS_DIR`, then `assets/fonts`
/// next to the binary or in the crate checkout. Set `TIPUS_REPORTS_LOG=debug` for progress logs.
#[derive(Parser)]
#[command(author, version, about = "Render the TipUs status reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory the PDF files are written to.
    #[arg(short, long, default_value = ".", global = true)]
    output_dir: PathBuf,

    /// Directory holding the Roboto font files.
    #[arg(long, global = true)]
    fonts_dir: Option<PathBuf>,

    /// Embed a section outline in each PDF.
    #[cfg(feature = "bookmarks")]
    #[arg(long, global = true)]
    bookmarks: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Render `TipUs_Status_Report.pdf`.
    #[command(name = "status-report", aliases = ["status"])]
    StatusReport,

    /// Render `TipUs_System_Overview_Next_Steps.pdf`.
    #[command(name = "system-overview", aliases = ["overview"])]
    SystemOverview,

    /// Render every report (the default).
    #[command(name = "all")]
    All,
}

impl Commands {
    fn reports(self) -> &'static [ReportKind] {
        match self {
            Commands::StatusReport => &[ReportKind::StatusReport],
            Commands::SystemOverview => &[ReportKind::SystemOverview],
            Commands::All => &ReportKind::ALL,
        }
    }
}

fn init_logging() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(Env::default().filter_or("TIPUS_REPORTS_LOG", "warn"))
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let options = GenerateOptions {
        output_dir: cli.output_dir.clone(),
        fonts_dir: cli.fonts_dir.clone(),
        #[cfg(feature = "bookmarks")]
        bookmarks: cli.bookmarks,
        #[cfg(not(feature = "bookmarks"))]
        bookmarks: false,
    };

    for kind in cli.command.unwrap_or(Commands::All).reports() {
        let report = generate(*kind, &options)?;
        println!("PDF saved to {}", report.path.display());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_renders_everything() {
        let cli = Cli::parse_from(["tipus-reports"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(
            cli.command.unwrap_or(Commands::All).reports(),
            &ReportKind::ALL
        );
    }

    #[test]
    fn subcommand_selects_one_report() {
        let cli = Cli::parse_from(["tipus-reports", "system-overview", "--output-dir", "out"]);
        assert_eq!(
            cli.command.map(Commands::reports),
            Some(&[ReportKind::SystemOverview][..])
        );
        assert_eq!(cli.output_dir, PathBuf::from("out"));
    }
}
