//! JSON request and response bodies.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use kca_io::IoError;
use kca_kalman::{EmStatus, KcaError, KcaFit};
use kca_prep::{PrepError, Standardizer};

/// A fit request as posted by the dashboard.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FitRequest {
    pub t: Vec<f64>,
    pub z: Vec<f64>,
    pub q: f64,
    /// Forecast horizon; signed so a negative value can be reported.
    #[serde(default)]
    pub fwd: i64,
}

/// Successful fit.
#[derive(Debug, Serialize)]
pub struct FitResponse {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub position_sd: Vec<f64>,
    pub velocity_sd: Vec<f64>,
    pub acceleration_sd: Vec<f64>,
    pub n_observed: usize,
    pub forecast_horizon: usize,
    pub log_likelihood: f64,
    pub em: EmReport,
    pub noise: NoiseReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Trading days of the observed steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Vec<String>>,
    /// Standardized observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerReport>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EmReport {
    pub status: &'static str,
    pub iterations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f64>,
}

impl From<EmStatus> for EmReport {
    fn from(status: EmStatus) -> Self {
        let (name, improvement) = match status {
            EmStatus::Disabled => ("disabled", None),
            EmStatus::Converged { .. } => ("converged", None),
            EmStatus::NotConverged { improvement, .. } => ("not_converged", Some(improvement)),
        };
        Self {
            status: name,
            iterations: status.iterations(),
            improvement,
        }
    }
}

/// Learned noise parameters.
#[derive(Debug, Serialize)]
pub struct NoiseReport {
    pub observation_variance: f64,
    pub process_covariance: [[f64; 3]; 3],
}

/// Mapping from standardized units back to prices: `x = z * scale + mean`.
#[derive(Debug, Serialize)]
pub struct ScalerReport {
    pub mean: f64,
    pub scale: f64,
}

impl From<&Standardizer> for ScalerReport {
    fn from(s: &Standardizer) -> Self {
        Self {
            mean: s.mean(),
            scale: s.scale(),
        }
    }
}

impl FitResponse {
    pub fn from_fit(fit: &KcaFit) -> Self {
        let sd = fit.stdevs();
        let column = |k: usize| sd.column(k).to_vec();
        Self {
            position: fit.positions(),
            velocity: fit.velocities(),
            acceleration: fit.accelerations(),
            position_sd: column(0),
            velocity_sd: column(1),
            acceleration_sd: column(2),
            n_observed: fit.n_observed(),
            forecast_horizon: fit.forecast_horizon(),
            log_likelihood: fit.log_likelihood(),
            em: fit.em_status().into(),
            noise: NoiseReport {
                observation_variance: fit.model().observation_variance(),
                process_covariance: fit.model().process_covariance().to_rows(),
            },
            symbol: None,
            date: None,
            measurements: None,
            scaler: None,
        }
    }
}

/// Which side of the pipeline failed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Kernel,
    Data,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub source: Source,
    pub kind: &'static str,
    pub detail: String,
}

/// Failure response: `{"error": {source, kind, detail}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn kernel(e: &KcaError) -> Self {
        Self {
            error: ErrorBody {
                source: Source::Kernel,
                kind: e.kind().as_str(),
                detail: e.to_string(),
            },
        }
    }

    pub fn data(kind: &'static str, detail: String) -> Self {
        Self {
            error: ErrorBody {
                source: Source::Data,
                kind,
                detail,
            },
        }
    }

    pub fn io(e: &IoError) -> Self {
        let kind = match e {
            IoError::FileNotFound { .. } => "file_not_found",
            IoError::Csv { .. } => "csv_format",
            IoError::MissingColumn { .. } => "missing_column",
            IoError::InvalidDate { .. } | IoError::InvalidValue { .. } => "invalid_cell",
            IoError::DuplicateDate { .. } => "duplicate_date",
            IoError::InvalidRange { .. } => "invalid_range",
            IoError::Empty { .. } => "empty",
        };
        Self::data(kind, e.to_string())
    }

    pub fn prep(e: &PrepError) -> Self {
        let kind = match e {
            PrepError::InsufficientData { .. } => "insufficient_data",
            PrepError::InvalidSpan { .. } => "invalid_span",
            PrepError::NonFinite { .. } => "non_finite",
        };
        Self::data(kind, e.to_string())
    }
}

/// Writes `body` to `output` and returns `err` as the command's failure.
pub fn fail<E>(output: Option<&Path>, body: ErrorResponse, err: E, context: &'static str) -> Result<()>
where
    E: std::error::Error + Send + Sync + 'static,
{
    emit(output, &body)?;
    Err(anyhow::Error::new(err).context(context))
}

/// Reads and parses a JSON request.
pub fn read_request(path: &Path) -> Result<FitRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse request: {}", path.display()))
}

/// Writes pretty JSON to `output`, or stdout when `None`.
pub fn emit<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize response")?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write response: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write response to stdout")
        }
    }
}
