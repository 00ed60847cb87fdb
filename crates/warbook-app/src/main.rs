// warbook entry point.
//
// Run sequence:
// 1. Initialize tracing (log to file)
// 2. Load config (copying defaults on first run)
// 3. Open database
// 4. Import the stats-feed CSVs (unless --skip-import)
// 5. Value every matching player and rank them
// 6. Write one page of the report and print a short summary

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use warbook_app::{build_report, valuate_all, write_report};
use warbook_core::{config, import_all, Database, PlayerFilter};

#[derive(Parser, Clone, Debug)]
#[command(
    name = "warbook",
    about = "Values players from their season history and writes a ranked report"
)]
struct Args {
    /// Report page to write (1-based).
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Only value players at this position; overrides `[report] position`.
    #[arg(long)]
    position: Option<String>,

    /// Only value players on this team.
    #[arg(long)]
    team: Option<String>,

    /// Value what is already stored without re-reading the CSV exports.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    skip_import: bool,

    /// Write the report here instead of `[report] path`.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Initialize tracing
    init_tracing()?;
    info!("warbook starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: db={}, page_size={}",
        config.db_path, config.report.page_size
    );

    // 3. Open database
    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Import
    if args.skip_import {
        info!("Skipping import; using stored players");
    } else {
        import_all(&db, &config.data_paths).context("failed to import stats feed")?;
    }

    // 5. Value and rank
    let filter = PlayerFilter {
        position: args.position.or(config.report.position.clone()),
        team: args.team,
    };
    let ranked = valuate_all(&db, &filter, &config.valuation)
        .context("failed to compute valuations")?;

    // 6. Report
    let report = build_report(
        &ranked,
        args.page,
        config.report.page_size,
        chrono::Utc::now(),
    );
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.report.path));
    write_report(&report, &path).context("failed to write report")?;
    info!(
        "Wrote page {}/{} ({} entries) to {}",
        report.page,
        report.total_pages,
        report.entries.len(),
        path.display()
    );

    println!(
        "Valued {} players; wrote page {} of {} to {}",
        report.total_players,
        report.page,
        report.total_pages,
        path.display()
    );
    for entry in report.entries.iter().take(10) {
        println!(
            "{:>4}. {:<24} {:<4} {:>5.1}  ${:>12.0}",
            entry.rank, entry.name, entry.position, entry.index, entry.dollar_value
        );
    }

    Ok(())
}

/// Initialize tracing to log to `logs/warbook.log`; stdout carries the summary.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("warbook.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warbook=info,warbook_app=info,warbook_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
