use crate::analyzers::grade::{gpa_to_100, score_to_gpa};
use crate::analyzers::types::{CourseRecord, PeriodAggregate, ScoreValue, SpecialCode};

/// Rule deciding which courses count toward a reported total credit.
///
/// Independent of GPA eligibility, and deliberately different per level:
///
/// | Policy   | Counted                                        |
/// |----------|------------------------------------------------|
/// | Semester | every course except `W` and `I`                |
/// | Overall  | GPA-bearing, `P` or `EX` courses, except `W`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditPolicy {
    Semester,
    Overall,
}

impl CreditPolicy {
    pub fn counts(self, score: &ScoreValue) -> bool {
        match self {
            CreditPolicy::Semester => {
                !score.is_code(SpecialCode::Withdrawn) && !score.is_code(SpecialCode::Incomplete)
            }
            CreditPolicy::Overall => {
                let eligible = score_to_gpa(score).is_some()
                    || score.is_code(SpecialCode::Pass)
                    || score.is_code(SpecialCode::Exempt);
                eligible && !score.is_code(SpecialCode::Withdrawn)
            }
        }
    }
}

/// Running numerator/denominator of a credit-weighted GPA.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedSum {
    pub weighted: f64,
    pub credit: f64,
}

impl WeightedSum {
    /// Adds a course if it bears a GPA and has positive credit.
    pub fn add(&mut self, record: &CourseRecord) {
        if record.credit > 0.0 {
            if let Some(gpa) = score_to_gpa(&record.score) {
                self.weighted += record.credit * gpa;
                self.credit += record.credit;
            }
        }
    }

    pub fn merge(&mut self, other: WeightedSum) {
        self.weighted += other.weighted;
        self.credit += other.credit;
    }

    pub fn gpa(&self) -> Option<f64> {
        if self.credit > 0.0 {
            Some(self.weighted / self.credit)
        } else {
            None
        }
    }
}

impl<'a> FromIterator<&'a CourseRecord> for WeightedSum {
    fn from_iter<I: IntoIterator<Item = &'a CourseRecord>>(iter: I) -> Self {
        let mut sum = WeightedSum::default();
        for record in iter {
            sum.add(record);
        }
        sum
    }
}

/// Aggregates a set of courses into a [`PeriodAggregate`].
pub fn weighted_aggregate<'a, I>(records: I, policy: CreditPolicy) -> PeriodAggregate
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    let mut sum = WeightedSum::default();
    let mut total_credit = 0.0;
    let mut course_count = 0;

    for record in records {
        sum.add(record);
        if policy.counts(&record.score) {
            total_credit += record.credit;
        }
        course_count += 1;
    }

    let weighted_gpa = sum.gpa();

    PeriodAggregate {
        total_credit,
        gpa_credit: sum.credit,
        weighted_gpa,
        average_percentage: gpa_to_100(weighted_gpa),
        course_count,
    }
}

/// Folds per-period sums in chronological order into cumulative GPAs.
///
/// Each point covers every course seen so far, not an average of period GPAs.
pub fn cumulative_gpa<I>(periods: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = WeightedSum>,
{
    periods
        .into_iter()
        .scan(WeightedSum::default(), |running, period| {
            running.merge(period);
            Some(running.gpa())
        })
        .collect()
}
