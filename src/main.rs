use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use scoreline::grid::Scoreline;
use scoreline::logging::LoggingConfig;
use scoreline::market::{CorrectScorePick, MarketBook};
use scoreline::odds::{OddsQuote, ValueRule};
use scoreline::report::{render_grid, render_prediction};
use scoreline::{
    EngineConfig, GoalDistribution, MatchRequest, ScorelineGrid, predict, predict_batch,
};

/// Poisson scoreline probabilities and value checks against bookmaker odds.
#[derive(Parser, Debug)]
#[command(name = "scoreline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Per-side goal cut for the scoreline grid [env: SCORELINE_MAX_GOALS]
    #[arg(long, global = true)]
    max_goals: Option<u32>,

    /// Over/under line [env: SCORELINE_GOAL_LINE]
    #[arg(long, global = true)]
    goal_line: Option<f64>,

    /// Flag value when (model - implied) probability exceeds this [env: SCORELINE_VALUE_THRESHOLD]
    #[arg(long, global = true, allow_hyphen_values = true)]
    value_threshold: Option<f64>,

    /// Scorelines eligible for the correct-score pick [env: SCORELINE_CS_CANDIDATES]
    #[arg(long, global = true, value_name = "H:A,...")]
    cs_candidates: Option<String>,

    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// `pretty` or `json`
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict one fixture from flags
    Predict(PredictArgs),
    /// Predict every fixture in a JSON array of requests
    Batch {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the scoreline probability matrix
    Grid(RatesArgs),
}

#[derive(Args, Debug)]
struct RatesArgs {
    #[arg(long)]
    home_xg: f64,
    #[arg(long)]
    away_xg: f64,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    rates: RatesArgs,
    #[arg(long, default_value = "Home")]
    home_team: String,
    #[arg(long, default_value = "Away")]
    away_team: String,
    #[arg(long)]
    odds_home: Option<f64>,
    #[arg(long)]
    odds_draw: Option<f64>,
    #[arg(long)]
    odds_away: Option<f64>,
    /// Price for over the goal line
    #[arg(long)]
    odds_over: Option<f64>,
    #[arg(long)]
    odds_btts: Option<f64>,
    /// Double chance home/draw
    #[arg(long)]
    odds_home_draw: Option<f64>,
    /// Correct-score price as H:A=ODDS, repeatable
    #[arg(long = "score-odds", value_parser = parse_score_odds)]
    score_odds: Vec<(Scoreline, f64)>,
    #[arg(long)]
    json: bool,
}

fn parse_score_odds(raw: &str) -> std::result::Result<(Scoreline, f64), String> {
    let (score, odds) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected H:A=ODDS, got {raw:?}"))?;
    let score = score.parse::<Scoreline>().map_err(|e| e.to_string())?;
    let odds = odds
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("bad odds in {raw:?}"))?;
    Ok((score, odds))
}

fn quote(odds: Option<f64>) -> Result<Option<OddsQuote>> {
    odds.map(OddsQuote::new).transpose().map_err(Into::into)
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.clone(),
    };
    if let Err(err) = logging.init() {
        eprintln!("error: {err:#}");
    }

    if let Err(err) = run(cli) {
        error!(error = %err, "command failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = engine_config(&cli)?;
    info!(
        max_goals = cfg.max_goals,
        goal_line = cfg.goal_line,
        threshold = cfg.value_rule.threshold,
        cs_candidates = cfg.correct_score.candidates.len(),
        "engine configured"
    );

    match cli.command {
        Command::Predict(args) => {
            let mut odds = MarketBook {
                home: quote(args.odds_home).context("--odds-home")?,
                draw: quote(args.odds_draw).context("--odds-draw")?,
                away: quote(args.odds_away).context("--odds-away")?,
                over: quote(args.odds_over).context("--odds-over")?,
                btts_yes: quote(args.odds_btts).context("--odds-btts")?,
                home_or_draw: quote(args.odds_home_draw).context("--odds-home-draw")?,
                ..Default::default()
            };
            for (score, price) in args.score_odds {
                let q = OddsQuote::new(price).with_context(|| format!("--score-odds {score}"))?;
                odds.correct_score.insert(score, q);
            }
            let request = MatchRequest {
                home_team: args.home_team,
                away_team: args.away_team,
                home_xg: args.rates.home_xg,
                away_xg: args.rates.away_xg,
                odds,
            };
            let pred = predict(&request, &cfg)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&pred)?);
            } else {
                print!("{}", render_prediction(&pred));
            }
        }
        Command::Batch { file, json } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let requests: Vec<MatchRequest> =
                serde_json::from_str(&raw).context("parse match requests")?;
            let results = predict_batch(&requests, &cfg);

            let mut failed = 0usize;
            let mut ok = Vec::with_capacity(results.len());
            for (idx, res) in results.into_iter().enumerate() {
                match res {
                    Ok(pred) => ok.push(pred),
                    Err(err) => {
                        failed += 1;
                        error!(index = idx, error = %err, "request rejected");
                        eprintln!("request {idx}: {err}");
                    }
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&ok)?);
            } else {
                for pred in &ok {
                    println!("{}", render_prediction(pred));
                }
            }
            if failed > 0 {
                return Err(anyhow!("{failed} of {} requests failed", requests.len()));
            }
        }
        Command::Grid(rates) => {
            let home = GoalDistribution::build(rates.home_xg, cfg.max_goals)?;
            let away = GoalDistribution::build(rates.away_xg, cfg.max_goals)?;
            let grid = ScorelineGrid::from_distributions(&home, &away);
            print!("{}", render_grid(&grid));
        }
    }
    Ok(())
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut cfg = EngineConfig::from_env();
    if let Some(max_goals) = cli.max_goals {
        cfg = cfg.with_max_goals(max_goals);
    }
    if let Some(line) = cli.goal_line {
        if !line.is_finite() || line < 0.0 {
            return Err(anyhow!("--goal-line must be a non-negative number, got {line}"));
        }
        cfg.goal_line = line;
    }
    if let Some(threshold) = cli.value_threshold {
        cfg.value_rule = ValueRule::new(threshold).context("--value-threshold")?;
    }
    if let Some(raw) = &cli.cs_candidates {
        cfg.correct_score.candidates =
            CorrectScorePick::parse_candidates(raw).context("--cs-candidates")?;
    }
    Ok(cfg)
}
