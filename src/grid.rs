use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::distribution::{GoalDistribution, probability_sum};
use crate::error::{EngineError, Result, ensure_probability};

/// A final score, home goals first. Serialized as `"H:A"` so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
}

impl Scoreline {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn total_goals(&self) -> u32 {
        self.home + self.away
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

impl FromStr for Scoreline {
    type Err = EngineError;

    /// Accepts `2:1` or `2-1`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((h, a)) = s.split_once(':').or_else(|| s.split_once('-')) else {
            return Err(EngineError::invalid("scoreline", format!("expected H:A, got {s:?}")));
        };
        let parse = |raw: &str| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| EngineError::invalid("scoreline", format!("bad goal count in {s:?}")))
        };
        Ok(Self::new(parse(h)?, parse(a)?))
    }
}

impl Serialize for Scoreline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scoreline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One enumerated grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorelineProb {
    pub score: Scoreline,
    pub probability: f64,
}

/// Joint scoreline probabilities, rows indexed by home goals.
///
/// Built from two independent distributions, so the grid total is the product of
/// the two truncated marginal sums rather than exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorelineGrid {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl ScorelineGrid {
    pub fn from_distributions(home: &GoalDistribution, away: &GoalDistribution) -> Self {
        let rows = home.len();
        let cols = away.len();
        let mut cells = Vec::with_capacity(rows * cols);
        for p_h in home.probabilities() {
            for p_a in away.probabilities() {
                cells.push(p_h * p_a);
            }
        }
        Self { rows, cols, cells }
    }

    /// Grid from a caller-supplied matrix. Rows must be non-empty and of equal
    /// length, and every cell a probability.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(EngineError::invalid("grid", "must have at least one row"));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(EngineError::invalid("grid", "rows must not be empty"));
        }
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(EngineError::invalid(
                    "grid",
                    format!("row {i} has {} cells, expected {cols}", row.len()),
                ));
            }
            for &p in row {
                cells.push(ensure_probability("grid cell", p)?);
            }
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    /// Number of home goal rows (`home max_goals + 1`).
    pub fn home_len(&self) -> usize {
        self.rows
    }

    pub fn away_len(&self) -> usize {
        self.cols
    }

    pub fn get(&self, home: u32, away: u32) -> Option<f64> {
        let (h, a) = (home as usize, away as usize);
        if h >= self.rows || a >= self.cols {
            return None;
        }
        Some(self.cells[h * self.cols + a])
    }

    pub fn contains(&self, score: Scoreline) -> bool {
        (score.home as usize) < self.rows && (score.away as usize) < self.cols
    }

    /// Cells in ascending `(home, away)` order.
    pub fn iter(&self) -> impl Iterator<Item = ScorelineProb> + '_ {
        self.cells.iter().enumerate().map(|(idx, &probability)| ScorelineProb {
            score: Scoreline::new((idx / self.cols) as u32, (idx % self.cols) as u32),
            probability,
        })
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.cells.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }

    /// Sum of all cells, never above 1.
    pub fn total(&self) -> f64 {
        probability_sum(&self.cells)
    }

    /// Highest-probability scoreline; on ties, the first in enumeration order.
    pub fn most_likely(&self) -> ScorelineProb {
        let mut best = ScorelineProb {
            score: Scoreline::new(0, 0),
            probability: self.cells[0],
        };
        for cell in self.iter().skip(1) {
            if cell.probability > best.probability {
                best = cell;
            }
        }
        best
    }

    /// Cells sorted by descending probability, ties kept in enumeration order.
    pub fn top(&self, n: usize) -> Vec<ScorelineProb> {
        let mut cells: Vec<ScorelineProb> = self.iter().collect();
        cells.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        cells.truncate(n);
        cells
    }
}
