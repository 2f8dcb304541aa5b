use crate::analyzers::types::{CourseRecord, DistributionBins};

/// Bucket index for a percentage: `<60`, `[60,70)`, `[70,80)`, `[80,90)`, `>=90`.
pub fn bucket(score: f64) -> usize {
    match score {
        s if s < 60.0 => 0,
        s if s < 70.0 => 1,
        s if s < 80.0 => 2,
        s if s < 90.0 => 3,
        _ => 4,
    }
}

/// Counts numeric scores per band. Credit is ignored; non-numeric scores are skipped.
pub fn bin<'a, I>(records: I) -> DistributionBins
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    let mut counts = [0u32; 5];
    for score in records.into_iter().filter_map(|r| r.score.as_numeric()) {
        counts[bucket(score)] += 1;
    }
    DistributionBins(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::ScoreValue::{Numeric, Opaque, Special};
    use crate::analyzers::types::SpecialCode;

    #[test]
    fn test_one_per_band() {
        let records: Vec<_> = [55.0, 65.0, 75.0, 85.0, 95.0]
            .iter()
            .enumerate()
            .map(|(i, s)| CourseRecord::new(Numeric(*s), 1.0, i))
            .collect();
        assert_eq!(bin(&records).counts(), [1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(bucket(59.99), 0);
        assert_eq!(bucket(60.0), 1);
        assert_eq!(bucket(70.0), 2);
        assert_eq!(bucket(80.0), 3);
        assert_eq!(bucket(90.0), 4);
        assert_eq!(bucket(104.0), 4);
    }

    #[test]
    fn test_non_numeric_excluded() {
        let records = vec![
            CourseRecord::new(Special(SpecialCode::A), 3.0, 0),
            CourseRecord::new(Special(SpecialCode::Pass), 3.0, 1),
            CourseRecord::new(Opaque("?".into()), 3.0, 2),
            CourseRecord::new(Numeric(88.0), 0.0, 3),
        ];
        let bins = bin(&records);
        assert_eq!(bins.counts(), [0, 0, 0, 1, 0]);
        assert_eq!(bins.total(), 1);
    }
}
