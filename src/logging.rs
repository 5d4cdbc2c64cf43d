use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Log level and output format. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Installs the global subscriber. Logs go to stderr so stdout stays clean
    /// for `--json` output.
    pub fn init(&self) -> Result<()> {
        let filter =
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.level))?;

        let res = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        res.map_err(|e| anyhow!("failed to install log subscriber: {e}"))
    }
}
