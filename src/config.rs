use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::metrics::Measure;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ask: AskConfig,
    #[serde(default)]
    pub evaluate: EvaluateConfig,
    #[serde(default)]
    pub serve: ServeConfig,
}

/// Answer collection settings (`ask`)
#[derive(Debug, Clone, Deserialize)]
pub struct AskConfig {
    /// Per-attempt request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the initial attempt for transient failures.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_sleep_secs")]
    pub retry_sleep_secs: u64,
    #[serde(default = "default_answers_db")]
    pub answers_db: PathBuf,
    /// Where retry/skip events are appended; `-` for stderr.
    #[serde(default = "default_retries_log")]
    pub retries_log: String,
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_sleep_secs: default_retry_sleep_secs(),
            answers_db: default_answers_db(),
            retries_log: default_retries_log(),
            cache: default_cache(),
        }
    }
}

/// Scoring settings (`query`, `evaluate`)
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateConfig {
    /// SPARQL endpoint holding the benchmark dataset.
    #[serde(default = "default_sparql_endpoint")]
    pub sparql_endpoint: String,
    #[serde(default = "default_sparql_timeout_secs")]
    pub sparql_timeout_secs: u64,
    /// Metric re-computed for questions flagged RESULT_ORDER_MATTERS.
    #[serde(default = "default_order_metric")]
    pub order_metric: String,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            sparql_endpoint: default_sparql_endpoint(),
            sparql_timeout_secs: default_sparql_timeout_secs(),
            order_metric: default_order_metric(),
            metrics: default_metrics(),
        }
    }
}

/// Demonstration endpoint settings (`serve`)
#[derive(Debug, Clone, Deserialize)]
pub struct ServeConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_retries() -> u32 {
    5
}

fn default_retry_sleep_secs() -> u64 {
    15
}

fn default_answers_db() -> PathBuf {
    PathBuf::from("responses.db")
}

fn default_retries_log() -> String {
    "retries.log".to_string()
}

fn default_cache() -> bool {
    true
}

fn default_sparql_endpoint() -> String {
    "http://localhost:8890/sparql".to_string()
}

fn default_sparql_timeout_secs() -> u64 {
    180
}

fn default_order_metric() -> String {
    "ndcg".to_string()
}

fn default_metrics() -> Vec<String> {
    vec!["set_P".to_string(), "set_recall".to_string(), "set_F".to_string()]
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in SPARQLBENCH_CONFIG environment variable (must exist)
    /// 2. ./sparqlbench.toml in current directory (defaults are used if absent)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var("SPARQLBENCH_CONFIG") {
            Ok(path) => Self::from_file(&PathBuf::from(path))?,
            Err(_) => {
                let path = PathBuf::from("sparqlbench.toml");
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &PathBuf) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ask.timeout_secs == 0 {
            anyhow::bail!("ask.timeout_secs must be greater than 0");
        }

        if self.evaluate.sparql_timeout_secs == 0 {
            anyhow::bail!("evaluate.sparql_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.evaluate.sparql_endpoint).with_context(|| {
            format!(
                "evaluate.sparql_endpoint is not a valid URL: {}",
                self.evaluate.sparql_endpoint
            )
        })?;

        Measure::parse(&self.evaluate.order_metric)?;
        if self.evaluate.metrics.is_empty() {
            anyhow::bail!("evaluate.metrics must name at least one metric");
        }
        for name in &self.evaluate.metrics {
            Measure::parse(name)?;
        }

        Ok(())
    }

    /// Parsed base metrics, in configured order
    pub fn measures(&self) -> Result<Vec<Measure>> {
        self.evaluate
            .metrics
            .iter()
            .map(|name| Measure::parse(name).map_err(anyhow::Error::from))
            .collect()
    }
}
