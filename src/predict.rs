use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::distribution::{ExpectedGoals, GoalDistribution};
use crate::error::Result;
use crate::grid::{ScorelineGrid, ScorelineProb};
use crate::market::{MarketBook, ValueReport};
use crate::outcome::MatchOutcomes;

/// Above this much dropped tail mass the grid cut is probably too small.
const TRUNCATION_WARN: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(default = "default_home_team")]
    pub home_team: String,
    #[serde(default = "default_away_team")]
    pub away_team: String,
    pub home_xg: f64,
    pub away_xg: f64,
    #[serde(default)]
    pub odds: MarketBook,
}

fn default_home_team() -> String {
    "Home".to_string()
}

fn default_away_team() -> String {
    "Away".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub expected_goals: ExpectedGoals,
    pub max_goals: u32,
    pub outcomes: MatchOutcomes,
    pub most_likely: ScorelineProb,
    /// Mass the grid misses because both sides were cut at `max_goals`.
    pub truncation_error: f64,
    /// Scorelines up to `display_goals` per side, in enumeration order.
    pub correct_scores: Vec<ScorelineProb>,
    pub value: ValueReport,
}

impl Prediction {
    pub fn has_odds(&self) -> bool {
        !self.value.selections.is_empty()
    }
}

pub fn predict(request: &MatchRequest, cfg: &EngineConfig) -> Result<Prediction> {
    let xg = ExpectedGoals::new(request.home_xg, request.away_xg)?;
    if xg.is_degenerate() {
        warn!(
            home = %request.home_team,
            away = %request.away_team,
            home_xg = xg.home,
            away_xg = xg.away,
            "zero expected goals: that side can only score 0"
        );
    }

    let home = GoalDistribution::build(xg.home, cfg.max_goals)?;
    let away = GoalDistribution::build(xg.away, cfg.max_goals)?;
    let grid = ScorelineGrid::from_distributions(&home, &away);
    let truncation_error = (1.0 - grid.total()).max(0.0);
    if truncation_error > TRUNCATION_WARN {
        warn!(
            max_goals = cfg.max_goals,
            truncation_error, "scoreline grid drops noticeable tail mass"
        );
    }
    debug!(
        home_xg = xg.home,
        away_xg = xg.away,
        cells = grid.home_len() * grid.away_len(),
        "built scoreline grid"
    );

    let outcomes = MatchOutcomes::from_grid(&grid, cfg.goal_line)?;
    let value = ValueReport::evaluate(
        &outcomes,
        &grid,
        &request.odds,
        cfg.value_rule,
        &cfg.correct_score,
    )?;
    debug!(
        selections = value.selections.len(),
        value_bets = value.value_selections().count(),
        "evaluated market prices"
    );

    let display = cfg.display_goals.min(cfg.max_goals);
    let correct_scores = grid
        .iter()
        .filter(|c| c.score.home <= display && c.score.away <= display)
        .collect();

    Ok(Prediction {
        home_team: request.home_team.clone(),
        away_team: request.away_team.clone(),
        expected_goals: xg,
        max_goals: cfg.max_goals,
        most_likely: grid.most_likely(),
        outcomes,
        truncation_error,
        correct_scores,
        value,
    })
}

/// Evaluates independent requests in parallel; output order matches input.
pub fn predict_batch(requests: &[MatchRequest], cfg: &EngineConfig) -> Vec<Result<Prediction>> {
    requests.par_iter().map(|req| predict(req, cfg)).collect()
}
