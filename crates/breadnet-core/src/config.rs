use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Match tolerance used when neither the request nor a config file sets one,
/// in the same units as the detection coordinates.
pub const DEFAULT_MATCH_TOLERANCE: f64 = 10.0;

pub const DEFAULT_PLACEHOLDER_VALUE: &str = "1";
pub const DEFAULT_PLACEHOLDER_MODEL: &str = "UNKNOWN";

/// Resolver settings. Read from a `breadnet.toml` file, from the `config`
/// object of a JSON request, or built in code.
///
/// TOML keys are snake_case; the camelCase names of the JSON request are
/// accepted as aliases so the same struct serves both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Maximum distance between a wire endpoint and the terminal it binds to.
    #[serde(alias = "matchToleranceDistance")]
    pub match_tolerance_distance: f64,

    /// Maximum distance at which two terminals count as touching.
    /// Falls back to `match_tolerance_distance`.
    #[serde(
        alias = "coincidenceToleranceDistance",
        skip_serializing_if = "Option::is_none"
    )]
    pub coincidence_tolerance_distance: Option<f64>,

    /// Treat a component-level marker as naming every terminal of the component.
    #[serde(alias = "componentMarkersCoverAllTerminals")]
    pub component_markers_cover_all_terminals: bool,

    /// Emitted as a leading `* title` comment card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Terminate the netlist with `.end`.
    #[serde(alias = "endCard")]
    pub end_card: bool,

    /// Substituted for unparsable R/C/L/V values.
    #[serde(alias = "placeholderValue")]
    pub placeholder_value: String,

    /// Substituted for unusable D/Q/X model names.
    #[serde(alias = "placeholderModel")]
    pub placeholder_model: String,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            match_tolerance_distance: DEFAULT_MATCH_TOLERANCE,
            coincidence_tolerance_distance: None,
            component_markers_cover_all_terminals: false,
            title: None,
            end_card: true,
            placeholder_value: DEFAULT_PLACEHOLDER_VALUE.to_string(),
            placeholder_model: DEFAULT_PLACEHOLDER_MODEL.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite, non-negative distance, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
    #[error("{name} must be a single non-empty token")]
    InvalidPlaceholder { name: &'static str },
}

impl ResolveConfig {
    pub fn new(match_tolerance_distance: f64) -> Self {
        Self {
            match_tolerance_distance,
            ..Self::default()
        }
    }

    pub fn with_coincidence_tolerance(mut self, distance: f64) -> Self {
        self.coincidence_tolerance_distance = Some(distance);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_end_card(mut self, end_card: bool) -> Self {
        self.end_card = end_card;
        self
    }

    pub fn coincidence_tolerance(&self) -> f64 {
        self.coincidence_tolerance_distance
            .unwrap_or(self.match_tolerance_distance)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_distance("match_tolerance_distance", self.match_tolerance_distance)?;
        if let Some(distance) = self.coincidence_tolerance_distance {
            check_distance("coincidence_tolerance_distance", distance)?;
        }
        check_token("placeholder_value", &self.placeholder_value)?;
        check_token("placeholder_model", &self.placeholder_model)?;
        Ok(())
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse breadnet config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }
}

fn check_distance(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTolerance { name, value })
    }
}

fn check_token(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        Err(ConfigError::InvalidPlaceholder { name })
    } else {
        Ok(())
    }
}
