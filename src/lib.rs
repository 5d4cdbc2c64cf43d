pub mod config;
pub mod distribution;
pub mod error;
pub mod grid;
pub mod logging;
pub mod market;
pub mod odds;
pub mod outcome;
pub mod poisson;
pub mod predict;
pub mod report;

pub use config::EngineConfig;
pub use distribution::{ExpectedGoals, GoalDistribution};
pub use error::{EngineError, Result};
pub use grid::{Scoreline, ScorelineGrid, ScorelineProb};
pub use market::{MarketBook, ValueReport};
pub use odds::{MarginResult, OddsQuote, ValueRule};
pub use outcome::MatchOutcomes;
pub use predict::{MatchRequest, Prediction, predict, predict_batch};
