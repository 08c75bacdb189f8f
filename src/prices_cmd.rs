//! Prices command: price history CSV -> standardized series -> fit.

use anyhow::Result;
use tracing::{info, info_span};

use kca_io::read_prices;
use kca_kalman::checked_horizon;
use kca_prep::prepare;

use crate::cli::PricesArgs;
use crate::config;
use crate::convert;
use crate::response::{self, ErrorResponse, FitResponse};

/// Read, prepare and fit one price history.
pub fn run(args: PricesArgs) -> Result<()> {
    let _cmd = info_span!("prices").entered();
    let config = config::load(args.config.as_deref())?;
    let output = args.output.as_deref();

    // 1. Data acquisition
    let query =
        convert::build_price_query(&config.prep, args.symbol.as_deref(), args.start, args.end);
    let prices = match read_prices(&args.input, &query) {
        Ok(p) => p,
        Err(e) => {
            return response::fail(output, ErrorResponse::io(&e), e, "failed to read prices");
        }
    };

    // 2. Preparation
    let prepared = match prepare(&prices.closes, config.prep.span) {
        Ok(p) => p,
        Err(e) => {
            return response::fail(output, ErrorResponse::prep(&e), e, "failed to prepare prices");
        }
    };

    // 3. Fit
    let q = args.q.unwrap_or(config.model.q);
    let horizon = match checked_horizon(args.forecast.unwrap_or(config.model.forecast)) {
        Ok(h) => h,
        Err(e) => return response::fail(output, ErrorResponse::kernel(&e), e, "invalid horizon"),
    };
    let spec = convert::build_spec(&config, q, horizon)?;

    info!(n = prepared.z.len(), q, horizon, "fitting price series");
    let fit = match spec.fit(&prepared.t, &prepared.z) {
        Ok(fit) => fit,
        Err(e) => return response::fail(output, ErrorResponse::kernel(&e), e, "KCA fit failed"),
    };

    // 4. Response
    let mut resp = FitResponse::from_fit(&fit);
    resp.symbol = args.symbol;
    resp.date = Some(prices.dates.iter().map(ToString::to_string).collect());
    resp.scaler = Some((&prepared.scaler).into());
    resp.measurements = Some(prepared.z);
    response::emit(output, &resp)
}
