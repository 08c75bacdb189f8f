//! Sweep command: one request fitted under several process-noise seeds.

use anyhow::{Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, info_span, warn};

use kca_kalman::{KcaSpec, checked_horizon};

use crate::cli::SweepArgs;
use crate::config;
use crate::convert;
use crate::response::{self, ErrorResponse, FitResponse};

#[derive(Serialize)]
struct SweepEntry {
    q: f64,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Fit(Box<FitResponse>),
    Failed(ErrorResponse),
}

/// Fit every seed in parallel and report each result in input order.
pub fn run(args: SweepArgs) -> Result<()> {
    let _cmd = info_span!("sweep").entered();
    let config = config::load(args.config.as_deref())?;
    let request = response::read_request(&args.request)?;
    let output = args.output.as_deref();

    let horizon = match checked_horizon(request.fwd) {
        Ok(h) => h,
        Err(e) => return response::fail(output, ErrorResponse::kernel(&e), e, "invalid request"),
    };
    let specs = args
        .q
        .iter()
        .map(|&q| convert::build_spec(&config, q, horizon))
        .collect::<Result<Vec<KcaSpec>>>()?;

    info!(n = request.z.len(), seeds = specs.len(), "sweeping process-noise seeds");
    let entries: Vec<SweepEntry> = specs
        .par_iter()
        .map(|spec| {
            let outcome = match spec.fit(&request.t, &request.z) {
                Ok(fit) => Outcome::Fit(Box::new(FitResponse::from_fit(&fit))),
                Err(e) => {
                    warn!(q = spec.q(), error = %e, "fit failed");
                    Outcome::Failed(ErrorResponse::kernel(&e))
                }
            };
            SweepEntry {
                q: spec.q(),
                outcome,
            }
        })
        .collect();

    response::emit(output, &entries)?;

    let failed = entries
        .iter()
        .filter(|e| matches!(e.outcome, Outcome::Failed(_)))
        .count();
    if failed > 0 {
        bail!("{failed} of {} fits failed", entries.len());
    }
    Ok(())
}
