//! PlanMyTrip configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use itinerary::{DEFAULT_CANDIDATE_LIMIT, DEFAULT_MAX_DAYS};

/// Main PlanMyTrip configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative service configuration
    pub llm: LlmConfig,

    /// Tourism place-data service configuration
    pub places: PlacesConfig,

    /// Planner limits
    pub planner: PlannerConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that both credential environment variables are set.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key()?;
        self.places.get_service_key()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .planmytrip.yml
        let local_config = PathBuf::from(".planmytrip.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/planmytrip/planmytrip.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("planmytrip").join("planmytrip.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only `log-level`, before logging is set up; any failure yields `None`
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        match config_path {
            Some(path) => candidates.push(path.clone()),
            None => {
                candidates.push(PathBuf::from(".planmytrip.yml"));
                if let Some(config_dir) = dirs::config_dir() {
                    candidates.push(config_dir.join("planmytrip").join("planmytrip.yml"));
                }
            }
        }

        candidates
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generative service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Extra attempts when the response holds no usable itinerary
    pub retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            temperature: 0.35,
            timeout_ms: 60_000,
            retries: 1,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        read_credential(&self.api_key_env, "LLM API key")
    }
}

/// Tourism place-data service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Service base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the service key
    #[serde(rename = "service-key-env")]
    pub service_key_env: String,

    /// Application name reported to the service
    #[serde(rename = "mobile-app")]
    pub mobile_app: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Rows requested per content type
    #[serde(rename = "rows-per-type")]
    pub rows_per_type: u32,

    /// Rows requested when no content type is given
    #[serde(rename = "rows-broad")]
    pub rows_broad: u32,

    /// Rows requested when widening a thin result
    #[serde(rename = "rows-widen")]
    pub rows_widen: u32,

    /// Widen the search when fewer candidates than this are found
    #[serde(rename = "min-candidates")]
    pub min_candidates: usize,

    /// Area code used for unknown regions
    #[serde(rename = "default-area-code")]
    pub default_area_code: u32,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apis.data.go.kr/B551011/KorService2".to_string(),
            service_key_env: "TOURAPI_SERVICE_KEY".to_string(),
            mobile_app: "PlanMyTrip".to_string(),
            timeout_ms: 15_000,
            rows_per_type: 25,
            rows_broad: 50,
            rows_widen: 80,
            min_candidates: 10,
            default_area_code: 6,
        }
    }
}

impl PlacesConfig {
    /// Read the service key from the configured environment variable
    pub fn get_service_key(&self) -> Result<String> {
        read_credential(&self.service_key_env, "Tourism service key")
    }
}

/// Planner limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum candidates offered to the generative service
    #[serde(rename = "candidate-limit")]
    pub candidate_limit: usize,

    /// Maximum trip length in days
    #[serde(rename = "max-days")]
    pub max_days: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            max_days: DEFAULT_MAX_DAYS,
        }
    }
}

fn read_credential(env_var: &str, what: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(eyre::eyre!("{} not found. Set the {} environment variable.", what, env_var)),
    }
}
