use serde::Serialize;

use crate::error::{Result, ensure_non_negative};
use crate::grid::ScorelineGrid;

pub const DEFAULT_GOAL_LINE: f64 = 2.5;
pub const PARTITION_TOLERANCE: f64 = 1e-9;

/// Market probabilities aggregated from a scoreline grid.
///
/// All values are sums of grid cells, so they share the grid's truncation: the
/// 1X2 triple sums to `total`, not to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchOutcomes {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub goal_line: f64,
    pub over: f64,
    pub under: f64,
    pub btts_yes: f64,
    pub btts_no: f64,
    pub total: f64,
}

impl MatchOutcomes {
    /// Aggregates `grid`. `goal_line` must be finite and non-negative.
    pub fn from_grid(grid: &ScorelineGrid, goal_line: f64) -> Result<Self> {
        let goal_line = ensure_non_negative("goal_line", goal_line)?;
        let mut home_win = 0.0;
        let mut draw = 0.0;
        let mut away_win = 0.0;
        let mut over = 0.0;
        let mut btts_yes = 0.0;

        for cell in grid.iter() {
            let (h, a) = (cell.score.home, cell.score.away);
            let p = cell.probability;
            if h > a {
                home_win += p;
            } else if h < a {
                away_win += p;
            } else {
                draw += p;
            }
            if cell.score.total_goals() as f64 > goal_line {
                over += p;
            }
            if h >= 1 && a >= 1 {
                btts_yes += p;
            }
        }

        let total = grid.total();
        let out = Self {
            home_win,
            draw,
            away_win,
            goal_line,
            over,
            under: (total - over).max(0.0),
            btts_yes,
            btts_no: (total - btts_yes).max(0.0),
            total,
        };
        debug_assert!(out.partition_residual() < PARTITION_TOLERANCE);
        Ok(out)
    }

    pub fn home_or_draw(&self) -> f64 {
        self.home_win + self.draw
    }

    pub fn away_or_draw(&self) -> f64 {
        self.away_win + self.draw
    }

    pub fn home_or_away(&self) -> f64 {
        self.home_win + self.away_win
    }

    /// Gap between the 1X2 triple and the grid total; zero up to float error.
    pub fn partition_residual(&self) -> f64 {
        (self.home_win + self.draw + self.away_win - self.total).abs()
    }
}

/// Mass on scorelines whose total goals exceed `goal_line`.
pub fn over_threshold(grid: &ScorelineGrid, goal_line: f64) -> Result<f64> {
    let goal_line = ensure_non_negative("goal_line", goal_line)?;
    Ok(grid
        .iter()
        .filter(|c| c.score.total_goals() as f64 > goal_line)
        .map(|c| c.probability)
        .sum())
}

pub fn under_threshold(grid: &ScorelineGrid, goal_line: f64) -> Result<f64> {
    Ok((grid.total() - over_threshold(grid, goal_line)?).max(0.0))
}
