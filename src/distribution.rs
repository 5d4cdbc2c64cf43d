use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result, ensure_non_negative};
use crate::poisson::poisson_probability;

/// Poisson means for the two sides of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExpectedGoals")]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

#[derive(Deserialize)]
struct RawExpectedGoals {
    home: f64,
    away: f64,
}

impl TryFrom<RawExpectedGoals> for ExpectedGoals {
    type Error = EngineError;

    fn try_from(raw: RawExpectedGoals) -> Result<Self> {
        Self::new(raw.home, raw.away)
    }
}

impl ExpectedGoals {
    pub fn new(home: f64, away: f64) -> Result<Self> {
        Ok(Self {
            home: ensure_non_negative("home_rate", home)?,
            away: ensure_non_negative("away_rate", away)?,
        })
    }

    /// A zero rate collapses that side to "certainly zero goals". It is valid
    /// input, but callers expecting a spread of scorelines should surface it.
    pub fn is_degenerate(&self) -> bool {
        self.home == 0.0 || self.away == 0.0
    }
}

/// Probabilities for goal counts `0..=max_goals` of one side.
///
/// The tail beyond `max_goals` is dropped, not redistributed, so a cell's value
/// never depends on where the distribution was cut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDistribution {
    rate: f64,
    probs: Vec<f64>,
}

impl GoalDistribution {
    pub fn build(rate: f64, max_goals: u32) -> Result<Self> {
        let rate = ensure_non_negative("rate", rate)?;
        let probs = (0..=max_goals)
            .map(|goal| poisson_probability(rate, goal))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rate, probs })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn max_goals(&self) -> u32 {
        (self.probs.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probs
    }

    pub fn get(&self, goals: u32) -> Option<f64> {
        self.probs.get(goals as usize).copied()
    }

    /// Sum of the buckets, never above 1.
    pub fn total(&self) -> f64 {
        probability_sum(&self.probs)
    }

    /// Probability mass lost by cutting at `max_goals`.
    pub fn truncation_error(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }

    /// Copy whose last bucket absorbs the truncated tail ("max_goals or more").
    pub fn with_tail_folded(&self) -> Self {
        let mut probs = self.probs.clone();
        let missing = self.truncation_error();
        if let Some(last) = probs.last_mut() {
            *last += missing;
        }
        Self {
            rate: self.rate,
            probs,
        }
    }
}

/// Neumaier-compensated sum of probabilities, capped at 1.
///
/// Each PMF value carries its own rounding, so even a compensated sum can land
/// an ulp or two above 1 when the truncated tail is smaller than that.
pub(crate) fn probability_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut comp = 0.0_f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            comp += (sum - t) + v;
        } else {
            comp += (v - t) + sum;
        }
        sum = t;
    }
    (sum + comp).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_max_goals_plus_one_buckets() {
        let d = GoalDistribution::build(1.21, 4).unwrap();
        assert_eq!(d.len(), 5);
        assert_eq!(d.max_goals(), 4);
        assert_eq!(GoalDistribution::build(1.0, 0).unwrap().len(), 1);
    }

    #[test]
    fn truncated_sum_stays_below_one() {
        let mut prev = 0.0;
        for max_goals in [0, 2, 5, 10, 20] {
            let total = GoalDistribution::build(1.64, max_goals).unwrap().total();
            assert!(total <= 1.0);
            assert!(total >= prev - 1e-15);
            prev = total;
        }
        assert!((1.0 - prev).abs() < 1e-12);
    }

    #[test]
    fn cells_do_not_depend_on_cut() {
        let short = GoalDistribution::build(1.3, 3).unwrap();
        let long = GoalDistribution::build(1.3, 9).unwrap();
        assert_eq!(short.probabilities(), &long.probabilities()[..4]);
    }

    #[test]
    fn total_never_exceeds_one() {
        for step in 1..=200 {
            let mean = step as f64 * 0.05;
            for max_goals in [10, 20, 30, 40, 50] {
                let total = GoalDistribution::build(mean, max_goals).unwrap().total();
                assert!(total <= 1.0, "mean={mean} max_goals={max_goals} total={total}");
            }
        }
    }

    #[test]
    fn probability_sum_is_capped() {
        assert_eq!(probability_sum(&[0.5, 0.5, 1e-16]), 1.0);
        assert_eq!(probability_sum(&[]), 0.0);
        assert_eq!(probability_sum(&[0.25, 0.5]), 0.75);
    }

    #[test]
    fn folded_tail_sums_to_one() {
        let d = GoalDistribution::build(2.2, 4).unwrap();
        let folded = d.with_tail_folded();
        assert!((folded.total() - 1.0).abs() < 1e-12);
        assert_eq!(folded.get(0), d.get(0));
        assert!(folded.get(4).unwrap() > d.get(4).unwrap());
    }

    #[test]
    fn zero_rate_is_flagged_not_rejected() {
        let xg = ExpectedGoals::new(0.0, 1.1).unwrap();
        assert!(xg.is_degenerate());
        assert!(!ExpectedGoals::new(1.2, 1.1).unwrap().is_degenerate());
        assert!(ExpectedGoals::new(-0.1, 1.1).is_err());
    }

    #[test]
    fn expected_goals_deserialize_through_validation() {
        let xg: ExpectedGoals = serde_json::from_str(r#"{"home": 1.4, "away": 0.9}"#).unwrap();
        assert_eq!(xg, ExpectedGoals::new(1.4, 0.9).unwrap());
        assert!(serde_json::from_str::<ExpectedGoals>(r#"{"home": -1.0, "away": 0.9}"#).is_err());
        assert!(serde_json::from_str::<ExpectedGoals>(r#"{"home": 1.0}"#).is_err());
    }
}
