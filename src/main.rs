use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use free_room::ingest::DEFAULT_SAMPLE_LIMIT;
use free_room::server::Notices;
use free_room::{build_report, conflict, roster, server, validate};

#[derive(Parser)]
#[command(name = "free_room")]
#[command(version)]
#[command(about = "Classroom free/busy grids from scraped timetables")]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the per-room schedule report
    Build {
        /// Room roster (.json or .xlsx)
        #[arg(long)]
        rooms: PathBuf,

        /// Scraped timetable records (.json)
        #[arg(long)]
        schedule: PathBuf,

        /// Where to write the report
        #[arg(long, default_value = "roomBase_with_schedule.json")]
        output: PathBuf,

        /// Export the full per-record diagnostic trail here
        #[arg(long = "log")]
        log_path: Option<PathBuf>,

        /// Number of failure examples to print
        #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT)]
        sample: usize,
    },

    /// Check timetable records for duplicates and parsing problems
    Conflicts {
        /// Scraped timetable records (.json)
        #[arg(long)]
        schedule: PathBuf,

        /// Number of examples to print per check
        #[arg(long, default_value = "3")]
        limit: usize,

        /// Where to export records with placeholder weeks or locations
        #[arg(long, default_value = "parsing_problems.json")]
        problems: PathBuf,
    },

    /// Serve free-room lookups over a built report
    Serve {
        #[arg(long, env = "FREE_ROOM_REPORT", default_value = "roomBase_with_schedule.json")]
        report: PathBuf,

        #[arg(long, env = "FREE_ROOM_ADDR", default_value = "127.0.0.1:5050")]
        addr: String,

        /// Text file shown by /api/announcement, one line per entry
        #[arg(long, env = "FREE_ROOM_ANNOUNCEMENT")]
        announcement: Option<PathBuf>,

        /// Text file shown by /api/info, one line per entry
        #[arg(long, env = "FREE_ROOM_INFO")]
        info: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Build {
            rooms,
            schedule,
            output,
            log_path,
            sample,
        } => {
            let roster = roster::load_roster(&rooms).context("loading room roster")?;
            let occurrences = roster::load_occurrences(&schedule).context("loading timetable records")?;

            let built = build_report(roster, &occurrences);
            built.diagnostics.log_summary(sample);
            info!("occupancy: {}", built.occupancy);

            roster::write_json(&output, &built.reports).context("writing report")?;
            info!("report written to {}", output.display());
            if let Some(path) = log_path {
                roster::write_json(&path, &built.diagnostics).context("writing diagnostics")?;
                info!("diagnostics written to {}", path.display());
            }
        }
        Commands::Conflicts {
            schedule,
            limit,
            problems,
        } => {
            let occurrences = roster::load_occurrences(&schedule).context("loading timetable records")?;
            let conflicts = conflict::detect(&occurrences);
            conflict::report(&conflicts, limit);

            let parsing = validate::validate_parsing(&occurrences);
            parsing.log_summary(limit);
            validate::validate_patterns(&occurrences).log_summary(limit);
            if !parsing.problems.is_empty() {
                roster::write_json(&problems, &parsing.problems).context("writing parsing problems")?;
                info!("{} problem records written to {}", parsing.problems.len(), problems.display());
            }
        }
        Commands::Serve {
            report,
            addr,
            announcement,
            info: info_path,
        } => {
            let report = roster::load_report(&report).context("loading schedule report")?;
            let notices = Notices {
                announcement: load_notice(announcement.as_deref())?,
                info: load_notice(info_path.as_deref())?,
            };
            info!("serving {} rooms", report.len());
            server::run_server(&addr, report, notices)
                .await
                .with_context(|| format!("serving on {}", addr))?;
        }
    }
    Ok(())
}

fn load_notice(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => roster::load_lines(path).with_context(|| format!("loading notice {}", path.display())),
        None => Ok(Vec::new()),
    }
}
