//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::config::{EmToml, KcaConfig, PrepToml};

use kca_io::PriceQuery;
use kca_kalman::{EmConfig, KcaSpec, Learned, OnNonConvergence};

/// Parses a non-convergence policy name.
pub fn parse_policy(s: &str) -> Result<OnNonConvergence> {
    match s.to_lowercase().as_str() {
        "warn" => Ok(OnNonConvergence::Warn),
        "fail" => Ok(OnNonConvergence::Fail),
        other => bail!("unknown on_non_convergence policy: {other:?}"),
    }
}

/// Parses the list of parameter groups EM should learn.
pub fn parse_learned(names: &[String]) -> Result<Learned> {
    let mut learned = Learned {
        process: false,
        observation: false,
        initial_state: false,
    };
    for name in names {
        match name.to_lowercase().as_str() {
            "process" => learned.process = true,
            "observation" => learned.observation = true,
            "initial_state" => learned.initial_state = true,
            other => bail!("unknown EM parameter group: {other:?}"),
        }
    }
    Ok(learned)
}

/// Builds an [`EmConfig`] from the TOML EM section.
pub fn build_em_config(em: &EmToml) -> Result<EmConfig> {
    let cfg = EmConfig::new()
        .with_max_iter(em.max_iter)
        .with_tolerance(em.tolerance)
        .with_min_variance(em.min_variance)
        .with_learned(parse_learned(&em.learn)?)
        .with_on_non_convergence(parse_policy(&em.on_non_convergence)?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`KcaSpec`] for seed `q` and a validated horizon.
pub fn build_spec(config: &KcaConfig, q: f64, horizon: usize) -> Result<KcaSpec> {
    Ok(KcaSpec::new(q)
        .with_forecast_horizon(horizon)
        .with_observation_variance(config.model.observation_variance)
        .with_prior_variance(config.model.prior_variance)
        .with_em(build_em_config(&config.em)?))
}

/// Builds a [`PriceQuery`] from the TOML prep section and CLI filters.
pub fn build_price_query(
    prep: &PrepToml,
    symbol: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> PriceQuery {
    PriceQuery::default()
        .with_date_column(&prep.date_column)
        .with_value_column(&prep.value_column)
        .with_symbol_column(&prep.symbol_column)
        .with_symbol(symbol)
        .with_start(start)
        .with_end(end)
}
