use std::env;

use tracing::warn;

use crate::market::CorrectScorePick;
use crate::odds::ValueRule;
use crate::outcome::DEFAULT_GOAL_LINE;

const DEFAULT_MAX_GOALS: u32 = 10;
const MAX_MAX_GOALS: u32 = 50;
const MAX_GOAL_LINE: f64 = 20.0;
const DEFAULT_DISPLAY_GOALS: u32 = 4;
const DEFAULT_CS_BAND_MIN_PP: f64 = 2.0;
const DEFAULT_CS_BAND_MAX_PP: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Per-side cut for goal distributions.
    pub max_goals: u32,
    pub goal_line: f64,
    pub value_rule: ValueRule,
    pub correct_score: CorrectScorePick,
    /// Per-side size of the correct-score table in a prediction.
    pub display_goals: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_goals: DEFAULT_MAX_GOALS,
            goal_line: DEFAULT_GOAL_LINE,
            value_rule: ValueRule::STRICT,
            correct_score: CorrectScorePick::default(),
            display_goals: DEFAULT_DISPLAY_GOALS,
        }
    }
}

impl EngineConfig {
    /// Reads `SCORELINE_*` variables; anything missing or unparseable keeps its default.
    ///
    /// | Variable | Effect |
    /// |---|---|
    /// | `SCORELINE_MAX_GOALS` | per-side grid cut, capped at 50 |
    /// | `SCORELINE_GOAL_LINE` | over/under line, clamped to `0..=20` |
    /// | `SCORELINE_VALUE_THRESHOLD` | value rule threshold, within `[-1, 1]` |
    /// | `SCORELINE_CS_BAND_MIN` / `_MAX` | correct-score band in pp; ignored when inverted |
    /// | `SCORELINE_CS_CANDIDATES` | comma-separated `H:A` list for the correct-score pick |
    /// | `SCORELINE_DISPLAY_GOALS` | per-side size of the correct-score table |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_f64 = |key: &str| parse::<f64>(&lookup, key).filter(|v| v.is_finite());
        let mut cfg = Self::default();

        if let Some(v) = parse::<u32>(&lookup, "SCORELINE_MAX_GOALS") {
            cfg.max_goals = v.min(MAX_MAX_GOALS);
        }
        if let Some(v) = parse_f64("SCORELINE_GOAL_LINE") {
            cfg.goal_line = v.clamp(0.0, MAX_GOAL_LINE);
        }
        let threshold = parse_f64("SCORELINE_VALUE_THRESHOLD");
        if let Some(rule) = threshold.and_then(|v| ValueRule::new(v).ok()) {
            cfg.value_rule = rule;
        }

        let lo = parse_f64("SCORELINE_CS_BAND_MIN").unwrap_or(DEFAULT_CS_BAND_MIN_PP);
        let hi = parse_f64("SCORELINE_CS_BAND_MAX").unwrap_or(DEFAULT_CS_BAND_MAX_PP);
        if lo <= hi {
            cfg.correct_score.band_pp = lo..=hi;
        } else {
            warn!(min = lo, max = hi, "inverted correct-score band ignored");
        }
        if let Some(raw) = lookup("SCORELINE_CS_CANDIDATES") {
            match CorrectScorePick::parse_candidates(&raw) {
                Ok(candidates) => cfg.correct_score.candidates = candidates,
                Err(err) => warn!(error = %err, "SCORELINE_CS_CANDIDATES ignored"),
            }
        }

        if let Some(v) = parse::<u32>(&lookup, "SCORELINE_DISPLAY_GOALS") {
            cfg.display_goals = v;
        }
        cfg.display_goals = cfg.display_goals.min(cfg.max_goals);
        cfg
    }

    pub fn with_max_goals(mut self, max_goals: u32) -> Self {
        self.max_goals = max_goals.min(MAX_MAX_GOALS);
        self.display_goals = self.display_goals.min(self.max_goals);
        self
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}
