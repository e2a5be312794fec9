// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Request timeout accounting (§5 "Timeout inheritance").
//!
//! Every request carries an initial budget. Internal waits and sub-operation
//! hand-offs compute the *remaining* budget from a single [`RequestTimer`]
//! created when the request entered the orchestrator; a negative remaining
//! budget is a hard `RequestTimeout` error, checked before any network call.

use crate::clock::Clock;
use crate::error::{ErrorCode, OdcError};
use std::time::{Duration, Instant};

/// Tracks elapsed time since a request was admitted, against a configured
/// total budget.
#[derive(Debug, Clone)]
pub struct RequestTimer {
    start: Instant,
    budget: Duration,
}

impl RequestTimer {
    /// Start a new timer with the given total budget.
    pub fn start(clock: &impl Clock, budget: Duration) -> Self {
        Self {
            start: clock.now(),
            budget,
        }
    }

    /// Time elapsed since the timer started.
    pub fn elapsed(&self, clock: &impl Clock) -> Duration {
        clock.now().saturating_duration_since(self.start)
    }

    /// Remaining budget, or `RequestTimeout` if the budget is exhausted.
    ///
    /// A sub-operation that would receive a non-positive remaining budget
    /// fails immediately without contacting the network (§5).
    pub fn remaining(&self, clock: &impl Clock) -> Result<Duration, OdcError> {
        let elapsed = self.elapsed(clock);
        if elapsed >= self.budget {
            return Err(OdcError::new(
                ErrorCode::RequestTimeout,
                format!(
                    "request budget of {:?} exhausted after {:?}",
                    self.budget, elapsed
                ),
            ));
        }
        Ok(self.budget - elapsed)
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
