//! Raw transcript data as supplied by the input collaborator.
//!
//! Nothing here is interpreted yet: scores and credits stay in the shape they
//! were read in, and are only normalized when a pipeline pass runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A score cell exactly as it was read: a bare number or a text token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
}

impl From<f64> for RawScore {
    fn from(value: f64) -> Self {
        RawScore::Number(value)
    }
}

impl From<&str> for RawScore {
    fn from(value: &str) -> Self {
        RawScore::Text(value.to_string())
    }
}

impl From<String> for RawScore {
    fn from(value: String) -> Self {
        RawScore::Text(value)
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScore::Number(n) => write!(f, "{n}"),
            RawScore::Text(s) => f.write_str(s),
        }
    }
}

/// A credit cell exactly as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCredit {
    Number(f64),
    Text(String),
}

impl Default for RawCredit {
    fn default() -> Self {
        RawCredit::Number(0.0)
    }
}

impl From<f64> for RawCredit {
    fn from(value: f64) -> Self {
        RawCredit::Number(value)
    }
}

impl RawCredit {
    /// Interprets the cell as a credit weight.
    ///
    /// Text is read up to the end of its leading number, so `"3学分"` is 3.
    /// Anything without a leading number is 0. Negative values are kept.
    pub fn value(&self) -> f64 {
        match self {
            RawCredit::Number(n) if n.is_finite() => *n,
            RawCredit::Number(_) => 0.0,
            RawCredit::Text(s) => leading_number(s).unwrap_or(0.0),
        }
    }
}

/// Parses the longest numeric prefix of `text` (after leading whitespace).
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }

    text[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Identifies one course: its period's position in the transcript and its
/// position inside that period as read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CourseId {
    pub period: usize,
    pub index: usize,
}

impl CourseId {
    pub fn new(period: usize, index: usize) -> Self {
        Self { period, index }
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.period, self.index)
    }
}

/// One course row of a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCourse {
    #[serde(default)]
    pub name: Option<String>,
    pub score: RawScore,
    #[serde(default)]
    pub credit: RawCredit,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl RawCourse {
    pub fn new(score: impl Into<RawScore>, credit: f64) -> Self {
        Self {
            name: None,
            score: score.into(),
            credit: RawCredit::Number(credit),
            teacher: None,
            details: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// A labelled group of courses, usually one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPeriod {
    pub label: String,
    #[serde(default, rename = "overall")]
    pub is_overall: bool,
    #[serde(default)]
    pub courses: Vec<RawCourse>,
}

impl RawPeriod {
    pub fn semester(label: &str, courses: Vec<RawCourse>) -> Self {
        Self {
            label: label.to_string(),
            is_overall: false,
            courses,
        }
    }

    pub fn overall(label: &str) -> Self {
        Self {
            label: label.to_string(),
            is_overall: true,
            courses: Vec::new(),
        }
    }
}

/// All periods in the order the collaborator supplied them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub periods: Vec<RawPeriod>,
}

impl Transcript {
    pub fn new(periods: Vec<RawPeriod>) -> Self {
        Self { periods }
    }

    /// Looks up a course row by id; the overall period never has addressable courses.
    pub fn course(&self, id: CourseId) -> Option<&RawCourse> {
        self.periods
            .get(id.period)
            .filter(|p| !p.is_overall)
            .and_then(|p| p.courses.get(id.index))
    }

    /// Iterates over the ids of every course that takes part in computation.
    pub fn course_ids(&self) -> impl Iterator<Item = CourseId> + '_ {
        self.periods
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_overall)
            .flat_map(|(pi, p)| (0..p.courses.len()).map(move |ci| CourseId::new(pi, ci)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_leading_number() {
        assert_eq!(RawCredit::Text("3学分".into()).value(), 3.0);
        assert_eq!(RawCredit::Text(" 2.5 ".into()).value(), 2.5);
        assert_eq!(RawCredit::Text("4.".into()).value(), 4.0);
        assert_eq!(RawCredit::Text("-1".into()).value(), -1.0);
    }

    #[test]
    fn test_credit_without_number_is_zero() {
        assert_eq!(RawCredit::Text("abc".into()).value(), 0.0);
        assert_eq!(RawCredit::Text("".into()).value(), 0.0);
        assert_eq!(RawCredit::Text(".".into()).value(), 0.0);
        assert_eq!(RawCredit::Number(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_course_lookup_skips_overall() {
        let transcript = Transcript::new(vec![
            RawPeriod::semester("2023秋", vec![RawCourse::new(90.0, 3.0)]),
            RawPeriod::overall("总成绩"),
        ]);

        assert!(transcript.course(CourseId::new(0, 0)).is_some());
        assert!(transcript.course(CourseId::new(0, 1)).is_none());
        assert!(transcript.course(CourseId::new(1, 0)).is_none());
        assert_eq!(transcript.course_ids().count(), 1);
    }

    #[test]
    fn test_raw_score_deserializes_untagged() {
        let n: RawScore = serde_json::from_str("85.5").unwrap();
        let t: RawScore = serde_json::from_str("\"A-\"").unwrap();
        assert_eq!(n, RawScore::Number(85.5));
        assert_eq!(t, RawScore::Text("A-".into()));
    }
}
