use std::collections::HashMap;
use std::time::Instant;

use crate::server::domain::attendance_service::TransportError;
use crate::shared::constants::UNREACHABLE_THRESHOLD;

/// Cross-cutting logger for flow request events.
///
/// Lets the CLI report round-trip timings and connectivity trouble while
/// tests stay silent, without the flows knowing where output goes.
pub trait FlowLogger: Send {
    /// A request finished and its response decoded.
    fn request_completed(&mut self, endpoint: &str, round_trip_ms: f64);

    fn request_failed(&mut self, endpoint: &str, error: &TransportError);

    /// A response arrived after a newer one had already been applied.
    fn stale_response(&mut self, sequence: u64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-flow summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullFlowLogger;

impl FlowLogger for NullFlowLogger {
    fn request_completed(&mut self, _endpoint: &str, _round_trip_ms: f64) {}
    fn request_failed(&mut self, _endpoint: &str, _error: &TransportError) {}
    fn stale_response(&mut self, _sequence: u64) {}
    fn info(&mut self, _message: &str) {}
}

/// Collects per-endpoint round trips and failure counts and reports a
/// summary when the flow ends.
///
/// Failed requests are retried by the next tick, indefinitely. After
/// `unreachable_threshold` consecutive failures one warning is logged;
/// a successful request re-arms it.
pub struct StatsFlowLogger {
    unreachable_threshold: usize,
    round_trips: HashMap<String, Vec<f64>>,
    failures: usize,
    consecutive_failures: usize,
    warned_unreachable: bool,
    stale: usize,
    start_time: Instant,
    messages: Vec<String>,
}

impl StatsFlowLogger {
    pub fn new(unreachable_threshold: usize) -> Self {
        Self {
            unreachable_threshold: unreachable_threshold.max(1),
            round_trips: HashMap::new(),
            failures: 0,
            consecutive_failures: 0,
            warned_unreachable: false,
            stale: 0,
            start_time: Instant::now(),
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        if self.round_trips.is_empty() && self.failures == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!("Flow summary ({elapsed_s:.1}s):")];

        let mut endpoints: Vec<_> = self.round_trips.keys().collect();
        endpoints.sort();
        for endpoint in endpoints {
            let samples = &self.round_trips[endpoint];
            let avg = samples.iter().sum::<f64>() / samples.len() as f64;
            let max = samples.iter().cloned().fold(0.0, f64::max);
            lines.push(format!(
                "  {endpoint:20}: {} ok, avg {avg:6.1}ms, max {max:6.1}ms",
                samples.len()
            ));
        }

        lines.push(format!("  failed requests: {}", self.failures));
        lines.push(format!("  stale responses dropped: {}", self.stale));
        Some(lines.join("\n"))
    }

    pub fn round_trips_for(&self, endpoint: &str) -> Option<&[f64]> {
        self.round_trips.get(endpoint).map(|v| v.as_slice())
    }

    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }
}

impl Default for StatsFlowLogger {
    fn default() -> Self {
        Self::new(UNREACHABLE_THRESHOLD)
    }
}

impl FlowLogger for StatsFlowLogger {
    fn request_completed(&mut self, endpoint: &str, round_trip_ms: f64) {
        self.consecutive_failures = 0;
        self.warned_unreachable = false;
        self.round_trips
            .entry(endpoint.to_string())
            .or_default()
            .push(round_trip_ms);
    }

    fn request_failed(&mut self, endpoint: &str, error: &TransportError) {
        self.failures += 1;
        self.consecutive_failures += 1;
        log::debug!("{endpoint}: {error}");
        if self.consecutive_failures >= self.unreachable_threshold && !self.warned_unreachable {
            self.warned_unreachable = true;
            log::warn!(
                "{endpoint} failed {} times in a row; server may be unreachable (still retrying)",
                self.consecutive_failures
            );
        }
    }

    fn stale_response(&mut self, sequence: u64) {
        self.stale += 1;
        log::debug!("Dropped stale response for frame {sequence}");
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
