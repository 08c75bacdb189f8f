//! Fit command: JSON request in, JSON response out.

use anyhow::Result;
use tracing::{info, info_span};

use kca_kalman::checked_horizon;

use crate::cli::FitArgs;
use crate::config;
use crate::convert;
use crate::response::{self, ErrorResponse, FitResponse};

/// Run a single fit from a request file.
pub fn run(args: FitArgs) -> Result<()> {
    let _cmd = info_span!("fit").entered();
    let config = config::load(args.config.as_deref())?;
    let request = response::read_request(&args.request)?;
    let output = args.output.as_deref();

    let horizon = match checked_horizon(request.fwd) {
        Ok(h) => h,
        Err(e) => return response::fail(output, ErrorResponse::kernel(&e), e, "invalid request"),
    };
    let spec = convert::build_spec(&config, request.q, horizon)?;

    info!(n = request.z.len(), q = request.q, horizon, "fitting request");
    match spec.fit(&request.t, &request.z) {
        Ok(fit) => {
            info!(
                em = ?fit.em_status(),
                log_likelihood = fit.log_likelihood(),
                "fit complete"
            );
            response::emit(output, &FitResponse::from_fit(&fit))
        }
        Err(e) => response::fail(output, ErrorResponse::kernel(&e), e, "KCA fit failed"),
    }
}
