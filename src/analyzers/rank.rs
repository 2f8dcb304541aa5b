use crate::analyzers::grade::{is_failing, score_to_gpa};
use crate::analyzers::types::CourseRecord;
use std::cmp::Ordering;

/// Merit order between two courses.
///
/// 1. GPA descending, GPA-bearing before ungraded.
/// 2. Non-failing before failing.
/// 3. Later original position first.
pub fn compare(a: &CourseRecord, b: &CourseRecord) -> Ordering {
    let by_gpa = match (score_to_gpa(&a.score), score_to_gpa(&b.score)) {
        (Some(ga), Some(gb)) => gb.total_cmp(&ga),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_gpa
        .then_with(|| is_failing(&a.score).cmp(&is_failing(&b.score)))
        .then_with(|| b.original_index.cmp(&a.original_index))
}

/// Returns a ranked copy of `records`; the input is left untouched.
pub fn rank(records: &[CourseRecord]) -> Vec<CourseRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(compare);
    ranked
}
