use gpa_rater::analyzers::grade::score_to_gpa;
use gpa_rater::analyzers::normalize::ScoreNormalizer;
use gpa_rater::analyzers::types::ScoreValue;
use gpa_rater::config::RaterConfig;
use gpa_rater::output::render;
use gpa_rater::parser::{InputFormat, parse_transcript};
use gpa_rater::simulation::SimulationController;
use gpa_rater::transcript::{CourseId, Transcript};

fn load_sample() -> Transcript {
    let text = include_str!("fixtures/sample_transcript.json");
    parse_transcript(text, InputFormat::Json, &RaterConfig::default())
        .expect("Failed to parse transcript")
}

fn controller() -> SimulationController<'static> {
    SimulationController::new(load_sample(), RaterConfig::default(), ScoreNormalizer::default())
}

fn ranked_indices(sim: &SimulationController<'_>, period: usize) -> Vec<usize> {
    sim.report()
        .period(period)
        .unwrap()
        .ranked
        .iter()
        .map(|r| r.original_index)
        .collect()
}

#[test]
fn test_full_pipeline() {
    let sim = controller();
    let report = sim.report();

    assert_eq!(report.periods.len(), 3);
    assert_eq!(report.overall_label.as_deref(), Some("总成绩"));

    let credits: Vec<f64> = report.periods.iter().map(|p| p.aggregate.total_credit).collect();
    assert_eq!(credits, vec![7.0, 9.0, 10.0]);

    let g88 = score_to_gpa(&ScoreValue::Numeric(88.0)).unwrap();
    let expected = (4.0 * g88 + 2.0 * 3.7) / 6.0;
    assert_eq!(report.period(1).unwrap().aggregate.weighted_gpa, Some(expected));

    assert_eq!(report.overall.total_credit, 23.0);
    assert_eq!(report.overall.course_count, 12);
    assert_eq!(report.distribution.counts(), [1, 1, 1, 1, 2]);
}

#[test]
fn test_ranking_per_period() {
    let sim = controller();
    assert_eq!(ranked_indices(&sim, 0), vec![0, 1, 3, 2]);
    assert_eq!(ranked_indices(&sim, 1), vec![0, 1, 2, 3]);
    assert_eq!(ranked_indices(&sim, 2), vec![0, 1, 2, 3]);
}

#[test]
fn test_trend_runs_oldest_to_newest() {
    let sim = controller();
    let trend = &sim.report().trend;

    assert_eq!(
        trend.labels,
        vec!["2023-2024学年 第1学期", "2023-2024学年 第2学期", "2024-2025学年 第1学期"]
    );
    assert_eq!(trend.period_credit, vec![8.0, 6.0, 6.0]);
    assert_eq!(trend.period_gpa.len(), 3);
    assert_eq!(trend.cumulative_gpa[0], trend.period_gpa[0]);

    let overall = sim.report().overall.weighted_gpa.unwrap();
    assert!((trend.cumulative_gpa[2] - overall).abs() < 1e-12);
}

#[test]
fn test_simulation_round_trip() {
    let mut sim = controller();
    let before = sim.report().clone();

    sim.enter_simulation().unwrap();
    let course = CourseId::new(1, 3);
    let original = sim.baseline(course).cloned().unwrap();

    let edited = sim.apply_edit(course, "95").unwrap().clone();
    assert_eq!(edited.period(0).unwrap().aggregate, before.period(0).unwrap().aggregate);
    assert_eq!(edited.period(2).unwrap().aggregate, before.period(2).unwrap().aggregate);
    assert_ne!(edited.period(1).unwrap().aggregate, before.period(1).unwrap().aggregate);
    assert_ne!(edited.overall, before.overall);
    assert_eq!(edited.distribution.counts(), [0, 1, 1, 1, 3]);

    sim.apply_edit(course, original).unwrap();
    let after = sim.exit_simulation().unwrap();
    assert_eq!(after, &before);
}

#[test]
fn test_rendered_document() {
    let sim = controller();
    let doc = render(sim.report(), sim.transcript(), sim.config());

    let first = &doc.periods[0];
    assert_eq!(first.total_credit, "7");
    assert_eq!(first.courses[1].score, "78.5");
    assert_eq!(first.courses[1].details, "专业必修 - 李强（数学科学学院）等2人");
    assert_eq!(first.courses[2].gpa, "退课");

    let second = &doc.periods[1];
    assert_eq!(second.courses[2].gpa, "缓考");
    assert_eq!(second.courses[3].gpa, "-.--");
    assert_eq!(doc.overall.total_credit, "23");
}

#[test]
fn test_csv_and_json_agree() {
    let csv = "period,name,credit,score\n\
               2024春,A,3,90\n\
               2024春,B,2,P\n\
               2023秋,C,2,B+\n\
               总成绩,,,\n";
    let json = r#"{ "periods": [
        { "label": "2024春", "courses": [
            { "name": "A", "score": 90, "credit": 3 },
            { "name": "B", "score": "P", "credit": 2 } ] },
        { "label": "2023秋", "courses": [ { "name": "C", "score": "B+", "credit": 2 } ] },
        { "label": "总成绩" } ] }"#;

    let config = RaterConfig::default();
    let from_csv = parse_transcript(csv, InputFormat::Csv, &config).unwrap();
    let from_json = parse_transcript(json, InputFormat::Json, &config).unwrap();

    let a = SimulationController::new(from_csv, config.clone(), ScoreNormalizer::default());
    let b = SimulationController::new(from_json, config, ScoreNormalizer::default());
    assert_eq!(a.report(), b.report());
}
