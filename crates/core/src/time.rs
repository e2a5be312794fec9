// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Time-string parsing used by the Submit-with-recovery path (§4.8 step 2)
//! to compute a reduced per-request timeout from a percentage of the
//! remaining request budget.
//!
//! Grammar (§8 property 7):
//!   - a bare non-negative integer is a duration in seconds ("3600" -> 3600s)
//!   - `<n>s` is explicit seconds ("10s" -> 10s)
//!   - `<n>%` is a percentage of a caller-supplied `base` duration
//!     ("50%" with base 60s -> 30s)
//!   - anything else (empty, non-numeric, negative, trailing garbage, a
//!     percentage with no base, percentage syntax in the wrong position)
//!     is rejected

use crate::error::{ErrorCode, OdcError};
use std::time::Duration;

pub fn parse_time_string(s: &str, base: Option<Duration>) -> Result<Duration, OdcError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(s));
    }

    if let Some(pct_str) = s.strip_suffix('%') {
        let pct: f64 = pct_str.parse().map_err(|_| invalid(s))?;
        if pct < 0.0 || !pct.is_finite() {
            return Err(invalid(s));
        }
        let base = base.ok_or_else(|| invalid(s))?;
        if base.is_zero() {
            return Err(invalid(s));
        }
        let secs = base.as_secs_f64() * (pct / 100.0);
        return Ok(Duration::from_secs_f64(secs));
    }

    if let Some(secs_str) = s.strip_suffix('s') {
        let secs: u64 = secs_str.parse().map_err(|_| invalid(s))?;
        return Ok(Duration::from_secs(secs));
    }

    let secs: u64 = s.parse().map_err(|_| invalid(s))?;
    Ok(Duration::from_secs(secs))
}

fn invalid(s: &str) -> OdcError {
    OdcError::new(
        ErrorCode::RequestNotSupported,
        format!("invalid time string: {:?}", s),
    )
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
