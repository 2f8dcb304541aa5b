//! Data types used by the grade pipeline.

use serde::Serialize;
use std::fmt;

/// Non-numeric status and letter-grade tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpecialCode {
    #[serde(rename = "P")]
    Pass,
    #[serde(rename = "NP")]
    NoPass,
    #[serde(rename = "EX")]
    Exempt,
    #[serde(rename = "IP")]
    InProgress,
    #[serde(rename = "I")]
    Incomplete,
    #[serde(rename = "W")]
    Withdrawn,
    #[serde(rename = "F")]
    Fail,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
}

impl SpecialCode {
    pub const ALL: [SpecialCode; 18] = [
        SpecialCode::Pass,
        SpecialCode::NoPass,
        SpecialCode::Exempt,
        SpecialCode::InProgress,
        SpecialCode::Incomplete,
        SpecialCode::Withdrawn,
        SpecialCode::Fail,
        SpecialCode::APlus,
        SpecialCode::A,
        SpecialCode::AMinus,
        SpecialCode::BPlus,
        SpecialCode::B,
        SpecialCode::BMinus,
        SpecialCode::CPlus,
        SpecialCode::C,
        SpecialCode::CMinus,
        SpecialCode::DPlus,
        SpecialCode::D,
    ];

    /// The token as it appears on a transcript.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecialCode::Pass => "P",
            SpecialCode::NoPass => "NP",
            SpecialCode::Exempt => "EX",
            SpecialCode::InProgress => "IP",
            SpecialCode::Incomplete => "I",
            SpecialCode::Withdrawn => "W",
            SpecialCode::Fail => "F",
            SpecialCode::APlus => "A+",
            SpecialCode::A => "A",
            SpecialCode::AMinus => "A-",
            SpecialCode::BPlus => "B+",
            SpecialCode::B => "B",
            SpecialCode::BMinus => "B-",
            SpecialCode::CPlus => "C+",
            SpecialCode::C => "C",
            SpecialCode::CMinus => "C-",
            SpecialCode::DPlus => "D+",
            SpecialCode::D => "D",
        }
    }

    /// Human-readable label shown in place of a GPA, for status codes only.
    pub fn display_text(self) -> Option<&'static str> {
        match self {
            SpecialCode::Pass => Some("通过"),
            SpecialCode::NoPass => Some("未通过"),
            SpecialCode::Exempt => Some("免修"),
            SpecialCode::InProgress => Some("跨学期"),
            SpecialCode::Incomplete => Some("缓考"),
            SpecialCode::Withdrawn => Some("退课"),
            _ => None,
        }
    }
}

impl fmt::Display for SpecialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScoreValue {
    /// Percentage; may exceed 100 for bonus scores.
    Numeric(f64),
    Special(SpecialCode),
    /// Unrecognized token, kept verbatim.
    Opaque(String),
}

impl ScoreValue {
    pub fn is_code(&self, code: SpecialCode) -> bool {
        matches!(self, ScoreValue::Special(c) if *c == code)
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ScoreValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

/// A course as seen by one pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRecord {
    pub name: Option<String>,
    pub score: ScoreValue,
    pub credit: f64,
    /// Position in the source period before any reordering.
    pub original_index: usize,
}

impl CourseRecord {
    pub fn new(score: ScoreValue, credit: f64, original_index: usize) -> Self {
        Self {
            name: None,
            score,
            credit,
            original_index,
        }
    }
}

/// Weighted figures for one period or for the whole transcript.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodAggregate {
    /// Credit counted under the level's inclusion policy.
    pub total_credit: f64,
    /// Credit that carried a grade point (the weighted-GPA denominator).
    pub gpa_credit: f64,
    pub weighted_gpa: Option<f64>,
    pub average_percentage: Option<f64>,
    pub course_count: usize,
}

/// Course counts per score band: `<60`, `60-70`, `70-80`, `80-90`, `>=90`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DistributionBins(pub [u32; 5]);

impl DistributionBins {
    pub const LABELS: [&'static str; 5] = ["<60", "60-70", "70-80", "80-90", "90-100"];

    pub fn counts(&self) -> [u32; 5] {
        self.0
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Chronological series for trend charts. All vectors have equal length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub period_gpa: Vec<f64>,
    pub cumulative_gpa: Vec<f64>,
    pub period_credit: Vec<f64>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Results for one semester period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    /// Position of the period in the transcript as supplied.
    pub period_index: usize,
    pub label: String,
    pub aggregate: PeriodAggregate,
    /// Courses in rank order.
    pub ranked: Vec<CourseRecord>,
}

/// Everything one pipeline pass produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TranscriptReport {
    /// Semester periods, in the order they were supplied.
    pub periods: Vec<PeriodReport>,
    pub overall_label: Option<String>,
    pub overall: PeriodAggregate,
    pub trend: TrendSeries,
    pub distribution: DistributionBins,
}

impl TranscriptReport {
    pub fn period(&self, period_index: usize) -> Option<&PeriodReport> {
        self.periods.iter().find(|p| p.period_index == period_index)
    }
}
