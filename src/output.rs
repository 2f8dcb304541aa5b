//! Display formatting and persistence for transcript reports.
//!
//! Everything numeric is already settled in the report; this module only turns
//! it into display strings, pretty-prints it, writes JSON, and appends CSV.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::grade::{ScaleMode, fill_ratio, gpa_ratio, score_to_gpa};
use crate::analyzers::types::{
    CourseRecord, DistributionBins, PeriodAggregate, ScoreValue, TranscriptReport, TrendSeries,
};
use crate::config::RaterConfig;
use crate::transcript::{CourseId, Transcript};

/// Scores above this display as perfect.
pub const PERFECT_SCORE: f64 = 99.995;

/// Fixed-point text, rounding halves away from zero.
pub fn fixed(n: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (n * factor).round() / factor;
    format!("{rounded:.decimals$}")
}

/// Fixed-point text with trailing zeros, and a dangling point, removed.
pub fn format_number(n: f64, decimals: usize) -> String {
    let s = fixed(n, decimals);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// GPA column: two decimals, else a status label, else the placeholder.
pub fn gpa_display(score: &ScoreValue, placeholder: &str) -> String {
    if let Some(gpa) = score_to_gpa(score) {
        return fixed(gpa, 2);
    }
    match score {
        ScoreValue::Special(code) => code.display_text().unwrap_or(placeholder).to_string(),
        _ => placeholder.to_string(),
    }
}

/// Score column: trimmed one-decimal percentage, or the token itself.
pub fn score_display(score: &ScoreValue, placeholder: &str) -> String {
    match score {
        ScoreValue::Numeric(n) => format_number(*n, 1),
        ScoreValue::Special(code) => code.as_str().to_string(),
        ScoreValue::Opaque(text) if text.is_empty() => placeholder.to_string(),
        ScoreValue::Opaque(text) => text.clone(),
    }
}

pub fn is_perfect(score: &ScoreValue) -> bool {
    matches!(score, ScoreValue::Numeric(n) if *n > PERFECT_SCORE)
}

fn optional_gpa(gpa: Option<f64>, placeholder: &str) -> String {
    gpa.map_or_else(|| placeholder.to_string(), |g| fixed(g, 2))
}

fn optional_percentage(pct: Option<f64>, placeholder: &str) -> String {
    pct.map_or_else(|| placeholder.to_string(), |p| format_number(p, 1))
}

/// Condenses a raw instructor list such as `"0001-张三$数学学院$教授,0002-李四$$"`.
///
/// The first entry becomes `张三（数学学院）`, with `等N人` appended when the
/// list has more than one entry.
pub fn format_teacher(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return "（无教师信息）".to_string();
    };

    let parts: Vec<&str> = raw.split(',').collect();
    let first = parts[0];

    let parsed = first.split_once('-').and_then(|(id, rest)| {
        if id.is_empty() {
            return None;
        }
        let fields: Vec<&str> = rest.split('$').collect();
        match fields.as_slice() {
            [name, org, _] if !name.is_empty() => Some((*name, *org)),
            _ => None,
        }
    });

    match parsed {
        Some((name, org)) => {
            let suffix = if parts.len() > 1 {
                format!("等{}人", parts.len())
            } else {
                String::new()
            };
            format!("{name}（{org}）{suffix}")
        }
        None if parts.len() > 1 => format!("{first} 等{}人", parts.len()),
        None => first.to_string(),
    }
}

/// One course line, ready to display.
#[derive(Debug, Clone, Serialize)]
pub struct CourseView {
    pub id: CourseId,
    pub name: Option<String>,
    pub details: String,
    pub credit: f64,
    pub score: String,
    pub gpa: String,
    pub fill_ratio: f64,
    pub perfect: bool,
}

/// One period header plus its ranked courses.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    pub label: String,
    pub total_credit: String,
    pub gpa: String,
    pub percentage: String,
    pub course_count: usize,
    pub title_ratio: f64,
    pub aggregate: PeriodAggregate,
    pub courses: Vec<CourseView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallView {
    pub label: Option<String>,
    pub total_credit: String,
    pub gpa: String,
    pub percentage: String,
    pub title_ratio: f64,
    pub aggregate: PeriodAggregate,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionView {
    pub labels: [&'static str; 5],
    pub counts: [u32; 5],
}

impl From<DistributionBins> for DistributionView {
    fn from(bins: DistributionBins) -> Self {
        Self {
            labels: DistributionBins::LABELS,
            counts: bins.counts(),
        }
    }
}

/// Complete rendered report, written out as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub scale: ScaleMode,
    pub periods: Vec<PeriodView>,
    pub overall: OverallView,
    pub trend: TrendSeries,
    pub distribution: DistributionView,
}

fn course_view(
    period_index: usize,
    record: &CourseRecord,
    transcript: &Transcript,
    config: &RaterConfig,
) -> CourseView {
    let id = CourseId::new(period_index, record.original_index);
    let raw = transcript.course(id);
    let kind = raw.and_then(|c| c.details.as_deref()).unwrap_or("");
    let teacher = format_teacher(raw.and_then(|c| c.teacher.as_deref()));

    CourseView {
        id,
        name: record.name.clone(),
        details: format!("{kind} - {teacher}"),
        credit: record.credit,
        score: score_display(&record.score, &config.placeholder),
        gpa: gpa_display(&record.score, &config.placeholder),
        fill_ratio: fill_ratio(&record.score, config.scale_mode()),
        perfect: is_perfect(&record.score),
    }
}

/// Builds display views for a report.
pub fn render(report: &TranscriptReport, transcript: &Transcript, config: &RaterConfig) -> ReportDocument {
    let placeholder = config.placeholder.as_str();
    let mode = config.scale_mode();

    let periods = report
        .periods
        .iter()
        .map(|p| PeriodView {
            label: p.label.clone(),
            total_credit: format_number(p.aggregate.total_credit, 1),
            gpa: optional_gpa(p.aggregate.weighted_gpa, placeholder),
            percentage: optional_percentage(p.aggregate.average_percentage, placeholder),
            course_count: p.aggregate.course_count,
            title_ratio: gpa_ratio(p.aggregate.weighted_gpa, mode),
            aggregate: p.aggregate,
            courses: p
                .ranked
                .iter()
                .map(|r| course_view(p.period_index, r, transcript, config))
                .collect(),
        })
        .collect();

    let overall = OverallView {
        label: report.overall_label.clone(),
        total_credit: format_number(report.overall.total_credit, 1),
        gpa: optional_gpa(report.overall.weighted_gpa, placeholder),
        percentage: optional_percentage(report.overall.average_percentage, placeholder),
        title_ratio: gpa_ratio(report.overall.weighted_gpa, mode),
        aggregate: report.overall,
    };

    ReportDocument {
        schema_version: 1,
        generated_at: Utc::now(),
        scale: mode,
        periods,
        overall,
        trend: report.trend.clone(),
        distribution: report.distribution.into(),
    }
}

/// Logs a report document using Rust's debug pretty-print format.
pub fn print_pretty(doc: &ReportDocument) {
    debug!("{:#?}", doc);
}

/// Logs a report document as pretty-printed JSON.
pub fn print_json(doc: &ReportDocument) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(doc)?);
    Ok(())
}

/// Writes a report document as JSON, replacing any existing file.
pub fn write_json(path: &str, doc: &ReportDocument) -> Result<()> {
    let body = serde_json::to_vec_pretty(doc)?;
    std::fs::write(path, body).with_context(|| format!("failed to write '{path}'"))?;
    info!(path, "Report written");
    Ok(())
}

/// One period's figures as a CSV row.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    generated_at: DateTime<Utc>,
    period: &'a str,
    total_credit: f64,
    weighted_gpa: Option<f64>,
    average_percentage: Option<f64>,
    course_count: usize,
}

/// Appends one row per period, then one for the overall figures.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &str, doc: &ReportDocument) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV summary");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    let overall_label = doc.overall.label.as_deref().unwrap_or("overall");
    let rows = doc
        .periods
        .iter()
        .map(|p| (p.label.as_str(), &p.aggregate))
        .chain(std::iter::once((overall_label, &doc.overall.aggregate)));

    for (period, agg) in rows {
        writer.serialize(SummaryRow {
            generated_at: doc.generated_at,
            period,
            total_credit: agg.total_credit,
            weighted_gpa: agg.weighted_gpa,
            average_percentage: agg.average_percentage,
            course_count: agg.course_count,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::{Overrides, analyze};
    use crate::analyzers::normalize::ScoreNormalizer;
    use crate::analyzers::types::SpecialCode;
    use crate::transcript::{RawCourse, RawPeriod};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_doc() -> ReportDocument {
        let transcript = Transcript::new(vec![
            RawPeriod::semester(
                "2024春",
                vec![RawCourse::new(95.0, 3.0), RawCourse::new("EX", 2.0)],
            ),
            RawPeriod::overall("总成绩"),
        ]);
        let config = RaterConfig::default();
        let report = analyze(&transcript, &Overrides::new(), &ScoreNormalizer::default(), &config);
        render(&report, &transcript, &config)
    }

    #[test]
    fn test_format_number_trims() {
        assert_eq!(format_number(90.0, 1), "90");
        assert_eq!(format_number(87.24, 1), "87.2");
        assert_eq!(format_number(0.0, 1), "0");
        assert_eq!(format_number(100.0, 1), "100");
        assert_eq!(format_number(2.5, 1), "2.5");
        assert_eq!(format_number(12.0, 0), "12");
    }

    #[test]
    fn test_halves_round_away_from_zero() {
        assert_eq!(format_number(85.25, 1), "85.3");
        assert_eq!(format_number(72.75, 1), "72.8");
        assert_eq!(fixed(2.5, 0), "3");
        assert_eq!(fixed(3.125, 2), "3.13");
        assert_eq!(score_display(&ScoreValue::Numeric(85.25), "-.--"), "85.3");
    }

    #[test]
    fn test_perfect_scores() {
        assert!(is_perfect(&ScoreValue::Numeric(100.0)));
        assert!(is_perfect(&ScoreValue::Numeric(99.996)));
        assert!(is_perfect(&ScoreValue::Numeric(103.0)));
        assert!(!is_perfect(&ScoreValue::Numeric(99.99)));
        assert!(!is_perfect(&ScoreValue::Special(SpecialCode::APlus)));
    }

    #[test]
    fn test_gpa_display() {
        assert_eq!(gpa_display(&ScoreValue::Numeric(100.0), "-.--"), "4.00");
        assert_eq!(gpa_display(&ScoreValue::Special(SpecialCode::BPlus), "-.--"), "3.30");
        assert_eq!(gpa_display(&ScoreValue::Special(SpecialCode::Pass), "-.--"), "通过");
        assert_eq!(gpa_display(&ScoreValue::Special(SpecialCode::Fail), "-.--"), "-.--");
        assert_eq!(gpa_display(&ScoreValue::Numeric(30.0), "-.--"), "-.--");
        assert_eq!(gpa_display(&ScoreValue::Opaque("x".into()), "-.--"), "-.--");
    }

    #[test]
    fn test_score_display() {
        assert_eq!(score_display(&ScoreValue::Numeric(85.0), "-.--"), "85");
        assert_eq!(score_display(&ScoreValue::Numeric(85.55), "-.--"), "85.5");
        assert_eq!(score_display(&ScoreValue::Special(SpecialCode::NoPass), "-.--"), "NP");
        assert_eq!(score_display(&ScoreValue::Opaque("缺考".into()), "-.--"), "缺考");
        assert_eq!(score_display(&ScoreValue::Opaque(String::new()), "-.--"), "-.--");
    }

    #[test]
    fn test_format_teacher() {
        assert_eq!(format_teacher(None), "（无教师信息）");
        assert_eq!(format_teacher(Some("0001-张三$数学学院$教授")), "张三（数学学院）");
        assert_eq!(
            format_teacher(Some("0001-张三$数学学院$教授,0002-李四$物理学院$")),
            "张三（数学学院）等2人"
        );
        assert_eq!(format_teacher(Some("王五")), "王五");
        assert_eq!(format_teacher(Some("王五,赵六")), "王五 等2人");
    }

    #[test]
    fn test_render_views() {
        let doc = sample_doc();

        assert_eq!(doc.periods.len(), 1);
        let period = &doc.periods[0];
        assert_eq!(period.total_credit, "5");
        assert_eq!(period.course_count, 2);
        assert_eq!(period.courses[0].score, "95");
        assert!(!period.courses[0].perfect);
        assert_eq!(period.courses[1].gpa, "免修");
        assert_eq!(period.courses[1].details, " - （无教师信息）");
        assert_eq!(doc.overall.label.as_deref(), Some("总成绩"));
        assert_eq!(doc.distribution.counts, [0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let doc = sample_doc();
        print_pretty(&doc);
        print_json(&doc).unwrap();
    }

    #[test]
    fn test_write_json() {
        let path = temp_path("gpa_rater_test_report.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &sample_doc()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["scale"], "percentage");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_summary_writes_header_once() {
        let path = temp_path("gpa_rater_test_summary.csv");
        let _ = fs::remove_file(&path);

        let doc = sample_doc();
        append_summary(&path, &doc).unwrap();
        append_summary(&path, &doc).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("generated_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 x (one period + overall)
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }
}
