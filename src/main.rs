mod analysis;
mod config;
mod error;
mod heuristics;
mod output;
mod pdf_extract;

use clap::{Parser, Subcommand};
use heuristics::classify;
use heuristics::lines::LineBuffer;
use std::path::PathBuf;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = ".config/budget_extract.toml";

#[derive(Parser, Debug)]
#[command(name = "budget_extract", about = "Extract demands and allocations from budget PDFs")]
struct Cli {
    /// TOML config file; defaults apply if it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Source document (.pdf, or .txt with form-feed page breaks)
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse the per-demand detail pages
    Demands,
    /// Parse the summary table and build the allocation analysis
    Summary,
    /// Run both pipelines
    All,
    /// Print the classification of every line on one page
    Inspect { page: u32 },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_or_default(&cli.config)?.with_overrides(cli.input, cli.output_dir);

    // init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    let pages = pdf_extract::load_pages(&cfg.input)?;

    match cli.command {
        Command::Demands => run_demands(&cfg, &pages)?,
        Command::Summary => run_summary(&cfg, &pages)?,
        Command::All => {
            run_demands(&cfg, &pages)?;
            run_summary(&cfg, &pages)?;
        }
        Command::Inspect { page } => inspect_page(&pages, page)?,
    }

    Ok(())
}

fn run_demands(
    cfg: &config::Config,
    pages: &[pdf_extract::PageText],
) -> Result<(), Box<dyn std::error::Error>> {
    let span = info_span!("demands");
    let _guard = span.enter();

    let demands = heuristics::extract_demands(pages);
    output::write_demands(&cfg.output_dir, &cfg.output, &demands)?;
    Ok(())
}

fn run_summary(
    cfg: &config::Config,
    pages: &[pdf_extract::PageText],
) -> Result<(), Box<dyn std::error::Error>> {
    let span = info_span!("summary");
    let _guard = span.enter();

    let region = heuristics::locate_summary(pages)?;
    let table = heuristics::parse_summary(&region);
    let report = analysis::analyze(&table);
    output::write_summary(&cfg.output_dir, &cfg.output, &table, &report)?;

    info!(
        ministries = report.ministries.len(),
        departments = table.department_count(),
        overall_total = report.overall_total,
        "Summary complete"
    );
    Ok(())
}

fn inspect_page(pages: &[pdf_extract::PageText], number: u32) -> Result<(), Box<dyn std::error::Error>> {
    let page = pages
        .iter()
        .find(|p| p.number == number)
        .ok_or_else(|| format!("No page {number} (document has {} pages)", pages.len()))?;

    let Some(text) = page.text.as_deref() else {
        println!("page {number}: no text (blank or image-only)");
        return Ok(());
    };

    let lines = LineBuffer::new(text);
    println!("page {number}: {} lines", lines.len());
    for (idx, line) in lines.iter() {
        println!("{idx:>4} {:<40} | {line}", format!("{:?}", classify::classify(line)));
    }
    Ok(())
}
