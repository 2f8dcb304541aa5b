use crate::analyzers::aggregate::{CreditPolicy, WeightedSum, cumulative_gpa, weighted_aggregate};
use crate::analyzers::distribution::bin;
use crate::analyzers::normalize::ScoreNormalizer;
use crate::analyzers::rank::rank;
use crate::analyzers::types::{CourseRecord, PeriodReport, TranscriptReport, TrendSeries};
use crate::config::{PeriodOrder, RaterConfig};
use crate::transcript::{CourseId, RawScore, Transcript};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Replacement raw scores keyed by course, applied before normalization.
pub type Overrides = HashMap<CourseId, RawScore>;

/// A semester's records before ranking.
struct SemesterRecords {
    period_index: usize,
    label: String,
    records: Vec<CourseRecord>,
}

/// Runs one full pass over the transcript and returns every derived figure.
///
/// Courses with an entry in `overrides` use that raw score instead of their
/// own. The pass is pure: the same inputs always give an identical report.
#[tracing::instrument(
    skip_all,
    fields(periods = transcript.periods.len(), overrides = overrides.len())
)]
pub fn analyze(
    transcript: &Transcript,
    overrides: &Overrides,
    normalizer: &ScoreNormalizer<'_>,
    config: &RaterConfig,
) -> TranscriptReport {
    let mut overall_label = None;
    let mut semesters = Vec::new();

    for (period_index, period) in transcript.periods.iter().enumerate() {
        if period.is_overall {
            overall_label = Some(period.label.clone());
            continue;
        }

        let records = period
            .courses
            .iter()
            .enumerate()
            .map(|(index, course)| {
                let raw = overrides
                    .get(&CourseId::new(period_index, index))
                    .unwrap_or(&course.score);
                let credit = course.credit.value();
                if credit < 0.0 {
                    warn!(period = %period.label, index, credit, "Negative credit");
                }
                CourseRecord {
                    name: course.name.clone(),
                    score: normalizer.normalize(raw),
                    credit,
                    original_index: index,
                }
            })
            .collect();

        semesters.push(SemesterRecords {
            period_index,
            label: period.label.clone(),
            records,
        });
    }

    let periods: Vec<PeriodReport> = semesters
        .iter()
        .map(|s| {
            let aggregate = weighted_aggregate(&s.records, CreditPolicy::Semester);
            debug!(
                period = %s.label,
                courses = aggregate.course_count,
                total_credit = aggregate.total_credit,
                gpa = ?aggregate.weighted_gpa,
                "Period aggregated"
            );
            PeriodReport {
                period_index: s.period_index,
                label: s.label.clone(),
                aggregate,
                ranked: Vec::new(),
            }
        })
        .collect();

    let trend = trend_series(&semesters, config.period_order);

    let all_records = || semesters.iter().flat_map(|s| s.records.iter());
    let overall = weighted_aggregate(all_records(), CreditPolicy::Overall);

    let periods = periods
        .into_iter()
        .zip(&semesters)
        .map(|(mut report, s)| {
            report.ranked = rank(&s.records);
            report
        })
        .collect();

    let distribution = bin(all_records());

    debug!(
        overall_gpa = ?overall.weighted_gpa,
        overall_credit = overall.total_credit,
        trend_points = trend.len(),
        "Transcript analyzed"
    );

    TranscriptReport {
        periods,
        overall_label,
        overall,
        trend,
        distribution,
    }
}

/// Builds the chronological trend over periods that carry graded credit.
fn trend_series(semesters: &[SemesterRecords], order: PeriodOrder) -> TrendSeries {
    let chronological: Vec<&SemesterRecords> = match order {
        PeriodOrder::OldestFirst => semesters.iter().collect(),
        PeriodOrder::NewestFirst => semesters.iter().rev().collect(),
    };

    let included: Vec<(&SemesterRecords, WeightedSum)> = chronological
        .into_iter()
        .map(|s| (s, s.records.iter().collect::<WeightedSum>()))
        .filter(|(_, sum)| sum.credit > 0.0)
        .collect();

    let cumulative = cumulative_gpa(included.iter().map(|(_, sum)| *sum));

    let mut trend = TrendSeries::default();
    for ((s, sum), running) in included.iter().zip(cumulative) {
        if let (Some(gpa), Some(running)) = (sum.gpa(), running) {
            trend.labels.push(s.label.clone());
            trend.period_gpa.push(gpa);
            trend.cumulative_gpa.push(running);
            trend.period_credit.push(sum.credit);
        }
    }
    trend
}
