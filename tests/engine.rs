use scoreline::grid::{Scoreline, ScorelineGrid};
use scoreline::outcome::{MatchOutcomes, PARTITION_TOLERANCE, over_threshold, under_threshold};
use scoreline::poisson::poisson_probability;
use scoreline::{EngineError, GoalDistribution};

fn grid(home: f64, away: f64, max_goals: u32) -> ScorelineGrid {
    let h = GoalDistribution::build(home, max_goals).expect("valid home rate");
    let a = GoalDistribution::build(away, max_goals).expect("valid away rate");
    ScorelineGrid::from_distributions(&h, &a)
}

fn assert_6dp(got: f64, want: f64) {
    assert!((got - want).abs() < 5e-7, "got {got}, want {want}");
}

#[test]
fn distribution_sum_grows_towards_one() {
    for mean in [0.0, 0.5, 1.21, 3.0, 6.5] {
        let mut prev = -1.0;
        for max_goals in [0, 1, 3, 6, 12, 25, 50] {
            let total = GoalDistribution::build(mean, max_goals).unwrap().total();
            assert!(total <= 1.0, "mean={mean} max={max_goals} total={total}");
            assert!(total >= prev - 1e-15);
            prev = total;
        }
        assert!((1.0 - prev).abs() < 1e-9, "mean={mean}");
    }
}

#[test]
fn truncated_sums_never_exceed_one() {
    for step in 1..=200 {
        let mean = step as f64 * 0.05;
        for max_goals in [10, 20, 30, 40, 50] {
            let d = GoalDistribution::build(mean, max_goals).unwrap();
            assert!(d.total() <= 1.0, "mean={mean} max={max_goals} total={}", d.total());
            assert!(d.truncation_error() >= 0.0);
            let g = ScorelineGrid::from_distributions(&d, &d);
            assert!(g.total() <= 1.0, "mean={mean} max={max_goals} grid={}", g.total());
        }
    }
}

#[test]
fn pmf_at_zero_is_closed_form() {
    for mean in [0.1, 1.0, 1.64, 9.9] {
        assert_eq!(poisson_probability(mean, 0).unwrap(), (-mean).exp());
    }
}

#[test]
fn reference_fixture_matches_direct_pmf() {
    let g = grid(1.2, 1.1, 5);
    assert_6dp(g.get(0, 0).unwrap(), 0.100259);
    assert_6dp(g.get(0, 1).unwrap(), 0.110285);
    assert_6dp(g.get(1, 0).unwrap(), 0.120311);
    assert_6dp(g.get(1, 1).unwrap(), 0.132342);
    assert_6dp(g.get(2, 1).unwrap(), 0.079405);

    let best = g.most_likely();
    assert_eq!(best.score, Scoreline::new(1, 1));
    assert_6dp(best.probability, 0.132342);

    let o = MatchOutcomes::from_grid(&g, 2.5).unwrap();
    assert_6dp(o.home_win, 0.381573);
    assert_6dp(o.draw, 0.283235);
    assert_6dp(o.away_win, 0.332726);
    assert_6dp(o.over, 0.401495);
    assert_6dp(o.btts_yes, 0.464518);
    assert_6dp(o.total, 0.997533);
}

#[test]
fn outcomes_partition_the_grid() {
    for (h, a, n) in [(1.2, 1.1, 5), (0.3, 2.9, 10), (4.0, 4.0, 3), (0.0, 1.0, 6)] {
        let g = grid(h, a, n);
        let o = MatchOutcomes::from_grid(&g, 2.5).unwrap();
        assert!(o.partition_residual() < PARTITION_TOLERANCE);
        assert!((o.total - g.total()).abs() < 1e-12);
        let over = over_threshold(&g, 2.5).unwrap();
        let under = under_threshold(&g, 2.5).unwrap();
        assert!((over + under - g.total()).abs() < 1e-12);
    }
}

#[test]
fn grid_total_is_product_of_marginals() {
    let h = GoalDistribution::build(1.7, 4).unwrap();
    let a = GoalDistribution::build(0.9, 7).unwrap();
    let g = ScorelineGrid::from_distributions(&h, &a);
    assert!((g.total() - h.total() * a.total()).abs() < 1e-12);
}

#[test]
fn caller_supplied_grid_aggregates() {
    let g = ScorelineGrid::from_rows(&[vec![0.2, 0.1], vec![0.3, 0.4]]).unwrap();
    let o = MatchOutcomes::from_grid(&g, 1.5).unwrap();
    assert!((o.home_win - 0.3).abs() < 1e-12);
    assert!((o.away_win - 0.1).abs() < 1e-12);
    assert!((o.draw - 0.6).abs() < 1e-12);
    assert!((o.btts_yes - 0.4).abs() < 1e-12);
    assert!((o.over - 0.4).abs() < 1e-12);
}

#[test]
fn invalid_inputs_are_reported() {
    assert!(matches!(
        poisson_probability(-1.0, 2),
        Err(EngineError::InvalidArgument { name: "mean", .. })
    ));
    assert!(GoalDistribution::build(f64::NAN, 3).is_err());
    assert!(matches!(
        MatchOutcomes::from_grid(&grid(1.2, 1.1, 5), f64::NAN),
        Err(EngineError::InvalidArgument { name: "goal_line", .. })
    ));
}
