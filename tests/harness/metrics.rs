// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for flood simulations.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::fmt;

/// Classified response of one simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    RateLimited,
    Invalid,
    Other(u16),
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Outcome::Accepted,
            StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
            StatusCode::BAD_REQUEST => Outcome::Invalid,
            other => Outcome::Other(other.as_u16()),
        }
    }
}

/// Per-outcome and per-client counts.
#[derive(Debug, Default)]
pub struct FloodMetrics {
    outcomes: HashMap<Outcome, usize>,
    accepted_by_client: HashMap<String, usize>,
    total: usize,
}

impl FloodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, client: &str, outcome: Outcome) {
        self.total += 1;
        *self.outcomes.entry(outcome).or_default() += 1;
        if outcome == Outcome::Accepted {
            *self
                .accepted_by_client
                .entry(client.to_string())
                .or_default() += 1;
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Highest number of accepted requests seen for a single client.
    pub fn max_accepted_per_client(&self) -> usize {
        self.accepted_by_client.values().copied().max().unwrap_or(0)
    }

    pub fn clients_accepted(&self) -> usize {
        self.accepted_by_client.len()
    }
}

impl fmt::Display for FloodMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Flood Report ===")?;
        writeln!(f, "Total requests:  {}", self.total)?;
        writeln!(f, "Accepted:        {}", self.count(Outcome::Accepted))?;
        writeln!(f, "Rate limited:    {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Invalid:         {}", self.count(Outcome::Invalid))?;
        write!(f, "Max per client:  {}", self.max_accepted_per_client())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let mut m = FloodMetrics::new();
        m.record("a", Outcome::Accepted);
        m.record("a", Outcome::Accepted);
        m.record("b", Outcome::Accepted);
        m.record("a", Outcome::RateLimited);

        assert_eq!(m.total(), 4);
        assert_eq!(m.count(Outcome::Accepted), 3);
        assert_eq!(m.max_accepted_per_client(), 2);
        assert_eq!(m.clients_accepted(), 2);
    }
}
