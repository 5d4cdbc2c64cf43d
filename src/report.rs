use std::fmt::Write;

use crate::grid::ScorelineGrid;
use crate::predict::Prediction;

fn pct(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

pub fn render_prediction(pred: &Prediction) -> String {
    let mut out = String::new();
    let o = &pred.outcomes;

    let _ = writeln!(out, "Match: {} vs {}", pred.home_team, pred.away_team);
    let _ = writeln!(
        out,
        "Expected goals: {:.2} - {:.2}",
        pred.expected_goals.home, pred.expected_goals.away
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Home win: {}", pct(o.home_win));
    let _ = writeln!(out, "Draw:     {}", pct(o.draw));
    let _ = writeln!(out, "Away win: {}", pct(o.away_win));
    let _ = writeln!(out, "Over {}:  {}", o.goal_line, pct(o.over));
    let _ = writeln!(out, "Under {}: {}", o.goal_line, pct(o.under));
    let _ = writeln!(out, "BTTS yes: {}", pct(o.btts_yes));
    let _ = writeln!(
        out,
        "Most likely score: {} ({})",
        pred.most_likely.score,
        pct(pred.most_likely.probability)
    );
    if pred.truncation_error > 0.0 {
        let _ = writeln!(
            out,
            "Grid cut at {} goals drops {:.4}% of mass",
            pred.max_goals,
            pred.truncation_error * 100.0
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Correct scores:");
    for cell in &pred.correct_scores {
        let _ = writeln!(out, "  {}  {}", cell.score, pct(cell.probability));
    }

    if pred.has_odds() {
        let v = &pred.value;
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Value analysis (value when margin > {:.2}pp):",
            v.rule.threshold * 100.0
        );
        for sel in &v.selections {
            let flag = if sel.is_value { "  VALUE" } else { "" };
            let _ = writeln!(
                out,
                "  {:<14} {:<10} @ {:>6.2}  model {:>7}  implied {:>7}  margin {:+.2}pp{}",
                sel.market.to_string(),
                sel.selection,
                sel.odds,
                pct(sel.margin.predicted),
                pct(sel.margin.implied),
                sel.margin.percentage_points(),
                flag
            );
        }
        if let Some([h, d, a]) = v.fair_1x2 {
            let _ = writeln!(
                out,
                "  Bookmaker fair 1X2: {} / {} / {}",
                pct(h),
                pct(d),
                pct(a)
            );
        }
        if let Some(best) = &v.best_correct_score {
            let _ = writeln!(
                out,
                "  Best correct score: {} with margin {:+.2}pp",
                best.selection,
                best.margin.percentage_points()
            );
        }
    }

    out
}

/// Matrix view, home goals down the side and away goals across.
pub fn render_grid(grid: &ScorelineGrid) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:>5}", "H\\A");
    for a in 0..grid.away_len() {
        let _ = write!(out, "{a:>8}");
    }
    let _ = writeln!(out);
    for (h, row) in grid.rows().iter().enumerate() {
        let _ = write!(out, "{h:>5}");
        for p in row {
            let _ = write!(out, "{:>8.2}", p * 100.0);
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::market::MarketBook;
    use crate::odds::OddsQuote;
    use crate::predict::{MatchRequest, predict};

    #[test]
    fn text_report_lists_markets_and_value_flags() {
        let req = MatchRequest {
            home_team: "Team A".to_string(),
            away_team: "Team B".to_string(),
            home_xg: 1.21,
            away_xg: 1.64,
            odds: MarketBook {
                away: Some(OddsQuote::new(7.0).unwrap()),
                ..Default::default()
            },
        };
        let pred = predict(&req, &EngineConfig::default()).unwrap();
        let text = render_prediction(&pred);
        assert!(text.starts_with("Match: Team A vs Team B"));
        assert!(text.contains("Most likely score: 1:1"));
        assert!(text.contains("VALUE"));
        assert!(!text.contains("Bookmaker fair 1X2"));
    }

    #[test]
    fn grid_has_header_and_one_line_per_row() {
        let grid = ScorelineGrid::from_rows(&[vec![0.5, 0.1], vec![0.2, 0.2]]).unwrap();
        let text = render_grid(&grid);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().contains("50.00"));
    }
}
