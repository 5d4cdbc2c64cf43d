//! Decimal odds, implied probabilities and value margins.
//!
//! Margins are kept in raw probability units throughout; percentage points are
//! only produced on request via [`MarginResult::percentage_points`].

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result, ensure_probability};

/// A decimal price. Always finite and strictly greater than 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct OddsQuote(f64);

impl OddsQuote {
    pub fn new(odds: f64) -> Result<Self> {
        if !odds.is_finite() || odds <= 1.0 {
            return Err(EngineError::invalid(
                "odds",
                format!("decimal odds must be finite and > 1, got {odds}"),
            ));
        }
        Ok(Self(odds))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn implied(self) -> f64 {
        1.0 / self.0
    }
}

impl TryFrom<f64> for OddsQuote {
    type Error = EngineError;

    fn try_from(odds: f64) -> Result<Self> {
        Self::new(odds)
    }
}

impl From<OddsQuote> for f64 {
    fn from(q: OddsQuote) -> f64 {
        q.0
    }
}

pub fn implied_probability(odds: f64) -> Result<f64> {
    Ok(OddsQuote::new(odds)?.implied())
}

/// `predicted - 1/odds`, in probability units.
pub fn value_margin(predicted: f64, odds: f64) -> Result<f64> {
    Ok(MarginResult::compute(predicted, odds)?.margin)
}

/// Decimal odds that would pay exactly break-even at `probability`.
pub fn fair_odds(probability: f64) -> Result<f64> {
    let p = ensure_probability("probability", probability)?;
    if p == 0.0 {
        return Err(EngineError::invalid("probability", "fair odds undefined for p = 0"));
    }
    Ok(1.0 / p)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarginResult {
    pub predicted: f64,
    pub implied: f64,
    pub margin: f64,
}

impl MarginResult {
    pub fn compute(predicted: f64, odds: f64) -> Result<Self> {
        let predicted = ensure_probability("predicted", predicted)?;
        let implied = implied_probability(odds)?;
        Ok(Self {
            predicted,
            implied,
            margin: predicted - implied,
        })
    }

    pub fn percentage_points(&self) -> f64 {
        self.margin * 100.0
    }
}

/// Value iff `margin > threshold`, both in probability units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValueRule")]
pub struct ValueRule {
    pub threshold: f64,
}

#[derive(Deserialize)]
struct RawValueRule {
    threshold: f64,
}

impl TryFrom<RawValueRule> for ValueRule {
    type Error = EngineError;

    fn try_from(raw: RawValueRule) -> Result<Self> {
        Self::new(raw.threshold)
    }
}

impl ValueRule {
    /// Strictly positive margin.
    pub const STRICT: Self = Self { threshold: 0.0 };

    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold.abs() > 1.0 {
            return Err(EngineError::invalid(
                "threshold",
                format!("must be within [-1, 1], got {threshold}"),
            ));
        }
        Ok(Self { threshold })
    }

    pub fn is_value(&self, margin: &MarginResult) -> bool {
        margin.margin > self.threshold
    }
}

impl Default for ValueRule {
    fn default() -> Self {
        Self::STRICT
    }
}

/// Sum of implied probabilities minus one.
pub fn overround(quotes: &[OddsQuote]) -> f64 {
    quotes.iter().map(|q| q.implied()).sum::<f64>() - 1.0
}

/// Overround-free probabilities for a mutually exclusive home/draw/away triple.
pub fn normalize_three(home: f64, draw: f64, away: f64) -> Result<[f64; 3]> {
    let ih = implied_probability(home)?;
    let id = implied_probability(draw)?;
    let ia = implied_probability(away)?;
    let sum = ih + id + ia;
    Ok([ih / sum, id / sum, ia / sum])
}
