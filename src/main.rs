//! CLI entry point for the GPA rater.
//!
//! Provides subcommands for reporting on a transcript, listing ranked
//! courses, and running what-if simulations with edited scores.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gpa_rater::analyzers::normalize::ScoreNormalizer;
use gpa_rater::analyzers::types::TranscriptReport;
use gpa_rater::{
    config::RaterConfig,
    output::{append_summary, format_number, print_json, print_pretty, render, score_display, write_json},
    parser::{InputFormat, read_transcript},
    simulation::SimulationController,
    transcript::{CourseId, RawScore},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gpa_rater")]
#[command(about = "Weighted GPA analytics for course transcripts", long_about = None)]
struct Cli {
    /// JSON config file (falls back to $GPA_RATER_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Measure presentation ratios on the 4-point scale
    #[arg(long, global = true, default_value_t = false)]
    gpa_scale: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every metric for a transcript
    Report {
        /// Transcript file (.json or .csv)
        #[arg(value_name = "FILE")]
        source: String,

        /// Input format, when the extension does not tell
        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,

        /// Write the rendered report as JSON to this path
        #[arg(short, long)]
        output: Option<String>,

        /// CSV file to append period summaries to
        #[arg(long)]
        csv: Option<String>,
    },
    /// List each period's courses in rank order
    Rank {
        #[arg(value_name = "FILE")]
        source: String,

        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,
    },
    /// Recompute metrics with some scores replaced
    Simulate {
        #[arg(value_name = "FILE")]
        source: String,

        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,

        /// Score edit as PERIOD:INDEX=VALUE, e.g. 0:2=95 (repeatable)
        #[arg(short, long = "edit", value_name = "EDIT", value_parser = parse_edit)]
        edits: Vec<(CourseId, RawScore)>,

        /// Write the simulated report as JSON to this path
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/gpa_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gpa_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = RaterConfig::resolve(cli.config.as_deref())?;
    if cli.gpa_scale {
        config.use_gpa_scale = true;
    }

    match cli.command {
        Commands::Report {
            source,
            format,
            output,
            csv,
        } => {
            let transcript = read_transcript(&source, format, &config)?;
            let sim = SimulationController::new(transcript, config, ScoreNormalizer::default());
            let doc = render(sim.report(), sim.transcript(), sim.config());

            print_pretty(&doc);
            match output {
                Some(path) => write_json(&path, &doc)?,
                None => print_json(&doc)?,
            }
            if let Some(path) = csv {
                append_summary(&path, &doc)?;
            }
        }
        Commands::Rank { source, format } => {
            let transcript = read_transcript(&source, format, &config)?;
            let sim = SimulationController::new(transcript, config, ScoreNormalizer::default());
            log_ranking(sim.report(), &sim.config().placeholder);
        }
        Commands::Simulate {
            source,
            format,
            edits,
            output,
        } => {
            let transcript = read_transcript(&source, format, &config)?;
            let mut sim = SimulationController::new(transcript, config, ScoreNormalizer::default());
            let before = sim.report().clone();

            sim.enter_simulation()?;
            for (course, value) in edits {
                if let Err(e) = sim.apply_edit(course, value) {
                    warn!(%course, error = %e, "Edit rejected");
                }
            }

            log_changes(&before, sim.report());
            let doc = render(sim.report(), sim.transcript(), sim.config());
            match output {
                Some(path) => write_json(&path, &doc)?,
                None => print_json(&doc)?,
            }

            sim.exit_simulation()?;
        }
    }

    Ok(())
}

/// Parses `PERIOD:INDEX=VALUE`.
fn parse_edit(s: &str) -> Result<(CourseId, RawScore), String> {
    let (target, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PERIOD:INDEX=VALUE, got '{s}'"))?;
    let (period, index) = target
        .split_once(':')
        .ok_or_else(|| format!("expected PERIOD:INDEX before '=', got '{target}'"))?;
    let period = period
        .trim()
        .parse()
        .map_err(|e| format!("bad period '{period}': {e}"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad index '{index}': {e}"))?;

    Ok((CourseId::new(period, index), RawScore::Text(value.to_string())))
}

fn log_ranking(report: &TranscriptReport, placeholder: &str) {
    for period in &report.periods {
        info!(
            period = %period.label,
            courses = period.aggregate.course_count,
            "Ranking"
        );
        for (rank, course) in period.ranked.iter().enumerate() {
            info!(
                rank = rank + 1,
                index = course.original_index,
                name = course.name.as_deref().unwrap_or(""),
                score = %score_display(&course.score, placeholder),
                credit = course.credit,
                "Course"
            );
        }
    }
}

fn log_changes(before: &TranscriptReport, after: &TranscriptReport) {
    for (old, new) in before.periods.iter().zip(&after.periods) {
        if old.aggregate != new.aggregate {
            info!(
                period = %new.label,
                gpa_before = ?old.aggregate.weighted_gpa,
                gpa_after = ?new.aggregate.weighted_gpa,
                credit = %format_number(new.aggregate.total_credit, 1),
                "Period changed"
            );
        }
    }
    if before.overall != after.overall {
        info!(
            gpa_before = ?before.overall.weighted_gpa,
            gpa_after = ?after.overall.weighted_gpa,
            "Overall changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        let (id, value) = parse_edit("1:3=95.5").unwrap();
        assert_eq!(id, CourseId::new(1, 3));
        assert_eq!(value, RawScore::Text("95.5".into()));

        let (_, value) = parse_edit("0:0=通过").unwrap();
        assert_eq!(value, RawScore::Text("通过".into()));
    }

    #[test]
    fn test_parse_edit_rejects_malformed() {
        assert!(parse_edit("1:3").is_err());
        assert!(parse_edit("13=90").is_err());
        assert!(parse_edit("a:3=90").is_err());
    }
}
