//! Transcript readers for JSON and CSV documents.

use crate::config::RaterConfig;
use crate::transcript::{RawCourse, RawCredit, RawPeriod, RawScore, Transcript};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Guesses the format from a file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        match Path::new(path).extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(InputFormat::Json),
            "csv" => Some(InputFormat::Csv),
            _ => None,
        }
    }
}

/// One CSV row: `period,name,credit,score[,teacher][,details]`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    period: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    credit: Option<String>,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    teacher: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Decodes a JSON transcript document.
///
/// # Errors
///
/// Returns an error if the text is not a valid transcript document.
pub fn parse_json(text: &str, config: &RaterConfig) -> Result<Transcript> {
    let mut transcript: Transcript =
        serde_json::from_str(text).context("invalid transcript JSON")?;
    mark_overall(&mut transcript, config);
    Ok(transcript)
}

/// Decodes a CSV transcript, grouping rows into periods by first appearance.
///
/// # Errors
///
/// Returns an error on malformed CSV or a missing `period` column.
pub fn parse_csv(text: &str, config: &RaterConfig) -> Result<Transcript> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().context("failed to read CSV header")?;
    if !headers.iter().any(|h| h == "period") {
        bail!("CSV header has no 'period' column");
    }

    let mut periods: Vec<RawPeriod> = Vec::new();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad CSV row {}", line + 1))?;

        let slot = *by_label.entry(row.period.clone()).or_insert_with(|| {
            periods.push(RawPeriod::semester(&row.period, Vec::new()));
            periods.len() - 1
        });

        periods[slot].courses.push(RawCourse {
            name: row.name.filter(|n| !n.is_empty()),
            score: RawScore::Text(row.score.unwrap_or_default()),
            credit: RawCredit::Text(row.credit.unwrap_or_default()),
            teacher: row.teacher.filter(|t| !t.is_empty()),
            details: row.details.filter(|d| !d.is_empty()),
        });
    }

    let mut transcript = Transcript::new(periods);
    mark_overall(&mut transcript, config);
    Ok(transcript)
}

pub fn parse_transcript(text: &str, format: InputFormat, config: &RaterConfig) -> Result<Transcript> {
    let transcript = match format {
        InputFormat::Json => parse_json(text, config)?,
        InputFormat::Csv => parse_csv(text, config)?,
    };
    debug!(
        periods = transcript.periods.len(),
        courses = transcript.course_ids().count(),
        "Transcript parsed"
    );
    Ok(transcript)
}

/// Reads a transcript file, inferring the format from its extension when not given.
pub fn read_transcript(
    path: &str,
    format: Option<InputFormat>,
    config: &RaterConfig,
) -> Result<Transcript> {
    let format = match format.or_else(|| InputFormat::from_path(path)) {
        Some(f) => f,
        None => bail!("cannot tell the format of '{path}'; pass --format"),
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
    parse_transcript(&text, format, config).with_context(|| format!("failed to parse '{path}'"))
}

fn mark_overall(transcript: &mut Transcript, config: &RaterConfig) {
    for period in &mut transcript.periods {
        if config.is_overall_label(&period.label) {
            period.is_overall = true;
        }
    }
}
