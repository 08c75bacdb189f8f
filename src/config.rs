use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level `kca.toml` configuration. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KcaConfig {
    /// Model seeds and forecast settings.
    #[serde(default)]
    pub model: ModelToml,

    /// EM estimation settings.
    #[serde(default)]
    pub em: EmToml,

    /// Price-file and preparation settings.
    #[serde(default)]
    pub prep: PrepToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_q")]
    pub q: f64,
    #[serde(default)]
    pub forecast: i64,
    #[serde(default = "default_observation_variance")]
    pub observation_variance: f64,
    #[serde(default = "default_prior_variance")]
    pub prior_variance: f64,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            q: default_q(),
            forecast: 0,
            observation_variance: default_observation_variance(),
            prior_variance: default_prior_variance(),
        }
    }
}

fn default_q() -> f64 {
    0.1
}
fn default_observation_variance() -> f64 {
    kca_kalman::DEFAULT_OBSERVATION_VARIANCE
}
fn default_prior_variance() -> f64 {
    kca_kalman::DEFAULT_PRIOR_VARIANCE
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmToml {
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_min_variance")]
    pub min_variance: f64,
    #[serde(default = "default_learn")]
    pub learn: Vec<String>,
    #[serde(default = "default_on_non_convergence")]
    pub on_non_convergence: String,
}

impl Default for EmToml {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            min_variance: default_min_variance(),
            learn: default_learn(),
            on_non_convergence: default_on_non_convergence(),
        }
    }
}

fn default_max_iter() -> usize {
    100
}
fn default_tolerance() -> f64 {
    1e-4
}
fn default_min_variance() -> f64 {
    1e-9
}
fn default_learn() -> Vec<String> {
    vec![
        "process".to_string(),
        "observation".to_string(),
        "initial_state".to_string(),
    ]
}
fn default_on_non_convergence() -> String {
    "warn".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrepToml {
    #[serde(default = "default_span")]
    pub span: f64,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
    #[serde(default = "default_symbol_column")]
    pub symbol_column: String,
}

impl Default for PrepToml {
    fn default() -> Self {
        Self {
            span: default_span(),
            date_column: default_date_column(),
            value_column: default_value_column(),
            symbol_column: default_symbol_column(),
        }
    }
}

fn default_span() -> f64 {
    kca_prep::DEFAULT_TIME_SPAN
}
fn default_date_column() -> String {
    "Date".to_string()
}
fn default_value_column() -> String {
    "Close".to_string()
}
fn default_symbol_column() -> String {
    "Symbol".to_string()
}

/// Reads `path` if given, otherwise returns the defaults.
pub fn load(path: Option<&Path>) -> Result<KcaConfig> {
    let Some(path) = path else {
        return Ok(KcaConfig::default());
    };
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}
