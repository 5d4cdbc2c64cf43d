use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, Result};
use crate::grid::{Scoreline, ScorelineGrid};
use crate::odds::{MarginResult, OddsQuote, ValueRule, normalize_three};
use crate::outcome::MatchOutcomes;

/// Bookmaker prices for one fixture. Every market is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketBook {
    #[serde(default)]
    pub home: Option<OddsQuote>,
    #[serde(default)]
    pub draw: Option<OddsQuote>,
    #[serde(default)]
    pub away: Option<OddsQuote>,
    /// Price for "over the goal line".
    #[serde(default)]
    pub over: Option<OddsQuote>,
    #[serde(default)]
    pub btts_yes: Option<OddsQuote>,
    #[serde(default)]
    pub home_or_draw: Option<OddsQuote>,
    /// Keyed by scoreline; "2:1" and "2-1" in the same book are rejected as duplicates.
    #[serde(default, deserialize_with = "unique_scorelines")]
    pub correct_score: BTreeMap<Scoreline, OddsQuote>,
}

fn unique_scorelines<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<Scoreline, OddsQuote>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScorelineMap;

    impl<'de> Visitor<'de> for ScorelineMap {
        type Value = BTreeMap<Scoreline, OddsQuote>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of \"H:A\" scorelines to decimal odds")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = BTreeMap::new();
            while let Some((score, quote)) = map.next_entry::<Scoreline, OddsQuote>()? {
                if out.insert(score, quote).is_some() {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate correct-score price for {score}"
                    )));
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(ScorelineMap)
}

impl MarketBook {
    pub fn is_empty(&self) -> bool {
        self.home.is_none()
            && self.draw.is_none()
            && self.away.is_none()
            && self.over.is_none()
            && self.btts_yes.is_none()
            && self.home_or_draw.is_none()
            && self.correct_score.is_empty()
    }

    /// Overround-free 1X2 probabilities, when all three prices are present.
    pub fn fair_1x2(&self) -> Option<[f64; 3]> {
        let (h, d, a) = (self.home?, self.draw?, self.away?);
        normalize_three(h.value(), d.value(), a.value()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    MatchResult,
    TotalGoals,
    BothTeamsToScore,
    DoubleChance,
    CorrectScore,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Market::MatchResult => "1X2",
            Market::TotalGoals => "Total goals",
            Market::BothTeamsToScore => "BTTS",
            Market::DoubleChance => "Double chance",
            Market::CorrectScore => "Correct score",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionValue {
    pub market: Market,
    pub selection: String,
    pub odds: f64,
    #[serde(flatten)]
    pub margin: MarginResult,
    pub is_value: bool,
}

/// Which priced scorelines may be recommended as the correct-score pick.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectScorePick {
    /// Restrict to these scorelines; empty means every priced scoreline.
    pub candidates: Vec<Scoreline>,
    /// Inclusive margin band, in percentage points.
    pub band_pp: RangeInclusive<f64>,
}

impl CorrectScorePick {
    /// Parses a comma-separated candidate list such as `1:1,2:1`. Blank means no restriction.
    pub fn parse_candidates(raw: &str) -> Result<Vec<Scoreline>> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<Scoreline>)
            .collect()
    }
}

impl Default for CorrectScorePick {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            band_pp: 2.0..=5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueReport {
    pub rule: ValueRule,
    pub selections: Vec<SelectionValue>,
    /// Home/draw/away with the bookmaker overround removed.
    pub fair_1x2: Option<[f64; 3]>,
    pub best_correct_score: Option<SelectionValue>,
}

impl ValueReport {
    pub fn evaluate(
        outcomes: &MatchOutcomes,
        grid: &ScorelineGrid,
        book: &MarketBook,
        rule: ValueRule,
        pick: &CorrectScorePick,
    ) -> Result<Self> {
        let mut selections = Vec::new();
        let over_label = format!("Over {}", outcomes.goal_line);

        let priced = [
            (Market::MatchResult, "Home", book.home, outcomes.home_win),
            (Market::MatchResult, "Draw", book.draw, outcomes.draw),
            (Market::MatchResult, "Away", book.away, outcomes.away_win),
            (Market::TotalGoals, over_label.as_str(), book.over, outcomes.over),
            (Market::BothTeamsToScore, "Yes", book.btts_yes, outcomes.btts_yes),
            (
                Market::DoubleChance,
                "Home/Draw",
                book.home_or_draw,
                outcomes.home_or_draw(),
            ),
        ];
        for (market, selection, quote, predicted) in priced {
            let Some(quote) = quote else { continue };
            let sel = selection_value(market, selection.to_string(), quote, predicted, rule)?;
            selections.push(sel);
        }

        let mut best_correct_score: Option<SelectionValue> = None;
        for (&score, &quote) in &book.correct_score {
            let Some(predicted) = grid.get(score.home, score.away) else {
                return Err(EngineError::invalid(
                    "correct_score",
                    format!(
                        "{score} is outside the {}x{} scoreline grid",
                        grid.home_len(),
                        grid.away_len()
                    ),
                ));
            };
            let sel = selection_value(
                Market::CorrectScore,
                score.to_string(),
                quote,
                predicted,
                rule,
            )?;

            let eligible = (pick.candidates.is_empty() || pick.candidates.contains(&score))
                && pick.band_pp.contains(&sel.margin.percentage_points());
            // BTreeMap iterates in (home, away) order, so strict > keeps the first on ties.
            if eligible
                && best_correct_score
                    .as_ref()
                    .is_none_or(|best| sel.margin.margin > best.margin.margin)
            {
                best_correct_score = Some(sel.clone());
            }
            selections.push(sel);
        }

        Ok(Self {
            rule,
            selections,
            fair_1x2: book.fair_1x2(),
            best_correct_score,
        })
    }

    pub fn value_selections(&self) -> impl Iterator<Item = &SelectionValue> {
        self.selections.iter().filter(|s| s.is_value)
    }
}

fn selection_value(
    market: Market,
    selection: String,
    quote: OddsQuote,
    predicted: f64,
    rule: ValueRule,
) -> Result<SelectionValue> {
    // Aggregates can exceed 1 by a few ulps after summation.
    let margin = MarginResult::compute(predicted.clamp(0.0, 1.0), quote.value())?;
    Ok(SelectionValue {
        market,
        selection,
        odds: quote.value(),
        is_value: rule.is_value(&margin),
        margin,
    })
}
