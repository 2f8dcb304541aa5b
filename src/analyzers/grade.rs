use crate::analyzers::types::{ScoreValue, SpecialCode};
use serde::{Deserialize, Serialize};

/// Lowest passing percentage.
pub const PASS_LINE: f64 = 60.0;

/// Grade points of letter grades; status codes carry none.
///
/// | Code   | GPA |
/// |--------|-----|
/// | A+, A  | 4.0 |
/// | A-     | 3.7 |
/// | B+     | 3.3 |
/// | B      | 3.0 |
/// | B-     | 2.7 |
/// | C+     | 2.3 |
/// | C      | 2.0 |
/// | C-     | 1.7 |
/// | D+     | 1.3 |
/// | D      | 1.0 |
pub fn code_gpa(code: SpecialCode) -> Option<f64> {
    match code {
        SpecialCode::APlus | SpecialCode::A => Some(4.0),
        SpecialCode::AMinus => Some(3.7),
        SpecialCode::BPlus => Some(3.3),
        SpecialCode::B => Some(3.0),
        SpecialCode::BMinus => Some(2.7),
        SpecialCode::CPlus => Some(2.3),
        SpecialCode::C => Some(2.0),
        SpecialCode::CMinus => Some(1.7),
        SpecialCode::DPlus => Some(1.3),
        SpecialCode::D => Some(1.0),
        SpecialCode::Pass
        | SpecialCode::NoPass
        | SpecialCode::Exempt
        | SpecialCode::InProgress
        | SpecialCode::Incomplete
        | SpecialCode::Withdrawn
        | SpecialCode::Fail => None,
    }
}

/// Converts a score to grade points.
///
/// Percentages follow `GPA(x) = 4 - 3(100 - x)^2 / 1600` from 60 upward. The
/// curve bends back down past 100, so bonus scores earn slightly less than 4;
/// beyond 140 it would leave `[1, 4]` and is held at 1.
pub fn score_to_gpa(score: &ScoreValue) -> Option<f64> {
    match score {
        ScoreValue::Numeric(s) if *s >= PASS_LINE => {
            Some((4.0 - 3.0 * (100.0 - s).powi(2) / 1600.0).max(1.0))
        }
        ScoreValue::Numeric(_) => None,
        ScoreValue::Special(code) => code_gpa(*code),
        ScoreValue::Opaque(_) => None,
    }
}

/// Inverse of the percentage curve on `[1, 4]`. Clamps at 100 above 4.
pub fn gpa_to_100(gpa: Option<f64>) -> Option<f64> {
    match gpa? {
        g if g >= 4.0 => Some(100.0),
        g if g >= 1.0 => Some((300.0 - 40.0 * 3f64.sqrt() * (4.0 - g).sqrt()) / 3.0),
        _ => None,
    }
}

pub fn is_failing(score: &ScoreValue) -> bool {
    match score {
        ScoreValue::Special(SpecialCode::NoPass) | ScoreValue::Special(SpecialCode::Fail) => true,
        ScoreValue::Numeric(s) => *s < PASS_LINE,
        _ => false,
    }
}

/// Which scale presentation ratios are measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    #[default]
    Percentage,
    Gpa,
}

impl ScaleMode {
    pub fn from_flag(use_gpa_scale: bool) -> Self {
        if use_gpa_scale {
            ScaleMode::Gpa
        } else {
            ScaleMode::Percentage
        }
    }
}

/// Position of a grade point between the pass line (0) and the top (1).
///
/// Only feeds presentation; nothing numeric downstream depends on it.
pub fn gpa_ratio(gpa: Option<f64>, mode: ScaleMode) -> f64 {
    let Some(g) = gpa else {
        return 0.0;
    };
    match mode {
        ScaleMode::Gpa => (g - 1.0) / 3.0,
        ScaleMode::Percentage => gpa_to_100(Some(g)).map_or(0.0, |p| (p - PASS_LINE) / 40.0),
    }
}

pub fn presentation_ratio(score: &ScoreValue, mode: ScaleMode) -> f64 {
    gpa_ratio(score_to_gpa(score), mode)
}

/// Fill fraction for a course bar: failing and ungraded scores are all-or-nothing.
pub fn fill_ratio(score: &ScoreValue, mode: ScaleMode) -> f64 {
    let below_pass = matches!(score, ScoreValue::Numeric(s) if *s < PASS_LINE);
    if score_to_gpa(score).is_none() || below_pass {
        return if is_failing(score) { 0.0 } else { 1.0 };
    }
    presentation_ratio(score, mode)
}
