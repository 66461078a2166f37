//! Configuration for inventory runs and scoring policy

use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for an inventory run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Weights for the health score components
    pub health_weights: HealthWeights,
    /// Bus factor threshold and risk cut points
    pub bus_factor: BusFactorPolicy,
    /// Maturity level thresholds
    pub maturity: MaturityThresholds,
    /// Network configuration
    pub network: NetworkConfig,
}

/// Weights for the components of the health score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    /// Weight for commit activity over the last year (0.0-1.0)
    pub activity: f32,
    /// Weight for issue responsiveness (0.0-1.0)
    pub responsiveness: f32,
    /// Weight for contributor diversity (0.0-1.0)
    pub diversity: f32,
}

/// Bus factor policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusFactorPolicy {
    /// Share of total commits the top contributors must reach (0.0-1.0]
    pub majority_threshold: f64,
    /// Bus factor at or below this is high risk
    pub high_risk_max: u32,
    /// Bus factor at or below this (and above `high_risk_max`) is medium risk
    pub medium_risk_max: u32,
}

/// Lower bounds of each maturity level (0-100)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaturityThresholds {
    pub growing: u8,
    pub established: u8,
    pub mature: u8,
}

/// Network configuration for API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// GitHub REST API root
    pub api_base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of retries for metadata requests
    pub max_retries: u32,
    /// Initial backoff between retries (milliseconds)
    pub retry_delay_ms: u64,
    /// Manifest fetches in flight at once
    pub max_concurrent_fetches: usize,
    /// Deadline for all manifest fetches of one run (seconds)
    pub analysis_timeout_secs: Option<u64>,
    /// Maximum pages of 100 commits to fetch
    pub commit_page_limit: u32,
    /// Maximum pages of 100 contributors to fetch
    pub contributor_page_limit: u32,
    /// GitHub API token (optional, for higher rate limits)
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            activity: 0.40,
            responsiveness: 0.30,
            diversity: 0.30,
        }
    }
}

impl HealthWeights {
    /// Validate that weights sum to approximately 1.0
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.activity < 0.0 || self.responsiveness < 0.0 || self.diversity < 0.0 {
            return Err("Health weights must not be negative".to_string());
        }
        let sum = self.activity + self.responsiveness + self.diversity;
        if (sum - 1.0).abs() > 0.01 {
            return Err(format!("Health weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.activity + self.responsiveness + self.diversity;
        if sum > 0.0 {
            self.activity /= sum;
            self.responsiveness /= sum;
            self.diversity /= sum;
        }
    }
}

impl Default for BusFactorPolicy {
    fn default() -> Self {
        Self {
            majority_threshold: 0.5,
            high_risk_max: 1,
            medium_risk_max: 3,
        }
    }
}

impl Default for MaturityThresholds {
    fn default() -> Self {
        Self {
            growing: 25,
            established: 50,
            mature: 75,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 250,
            max_concurrent_fetches: 8,
            analysis_timeout_secs: None,
            commit_page_limit: 10,
            contributor_page_limit: 10,
            github_token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get initial retry delay as Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get the manifest fetch deadline, if any
    pub fn analysis_timeout(&self) -> Option<Duration> {
        self.analysis_timeout_secs.map(Duration::from_secs)
    }
}

impl InventoryConfig {
    /// Create a new builder for InventoryConfig
    pub fn builder() -> InventoryConfigBuilder {
        InventoryConfigBuilder::default()
    }

    /// Parse a TOML configuration document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: InventoryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the scoring engine cannot work with
    pub fn validate(&self) -> Result<()> {
        self.health_weights.validate().map_err(InventoryError::config)?;

        let threshold = self.bus_factor.majority_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(InventoryError::config(format!(
                "Bus factor majority threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        if self.bus_factor.medium_risk_max < self.bus_factor.high_risk_max {
            return Err(InventoryError::config(
                "medium_risk_max must not be below high_risk_max",
            ));
        }

        let m = &self.maturity;
        if !(m.growing <= m.established && m.established <= m.mature && m.mature <= 100) {
            return Err(InventoryError::config(
                "Maturity thresholds must be ascending and at most 100",
            ));
        }

        if self.network.max_concurrent_fetches == 0 {
            return Err(InventoryError::config("max_concurrent_fetches must be at least 1"));
        }

        Ok(())
    }
}

/// Builder for InventoryConfig
#[derive(Default)]
pub struct InventoryConfigBuilder {
    health_weights: Option<HealthWeights>,
    bus_factor: Option<BusFactorPolicy>,
    maturity: Option<MaturityThresholds>,
    network: Option<NetworkConfig>,
}

impl InventoryConfigBuilder {
    pub fn health_weights(mut self, weights: HealthWeights) -> Self {
        self.health_weights = Some(weights);
        self
    }

    pub fn bus_factor(mut self, policy: BusFactorPolicy) -> Self {
        self.bus_factor = Some(policy);
        self
    }

    pub fn maturity(mut self, thresholds: MaturityThresholds) -> Self {
        self.maturity = Some(thresholds);
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn build(self) -> InventoryConfig {
        InventoryConfig {
            health_weights: self.health_weights.unwrap_or_default(),
            bus_factor: self.bus_factor.unwrap_or_default(),
            maturity: self.maturity.unwrap_or_default(),
            network: self.network.unwrap_or_default(),
        }
    }
}
