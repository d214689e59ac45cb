//! Metric declarations for the RIL client.
//!
//! All counters are declared here as [`Metric`] constants so names stay in
//! one place. Call [`describe_metrics`] once at startup, after installing a
//! recorder.
//!
//! ```rust,ignore
//! use ril_client::metric_defs;
//!
//! metrics::counter!(metric_defs::RECOVERY_STARTED.name).increment(1);
//! ```

use metrics::{describe_counter, Unit};

/// A counter declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "ril.recovery.started").
    pub name: &'static str,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            unit: None,
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Registers this metric's description with the metrics recorder.
    pub fn describe(&self) {
        match self.unit {
            Some(unit) => describe_counter!(self.name, unit, self.description),
            None => describe_counter!(self.name, self.description),
        }
    }

    /// Increment the counter by one.
    pub fn increment(&self) {
        metrics::counter!(self.name).increment(1);
    }
}

/// Metric definitions.
pub mod metric_defs {
    use super::Metric;
    use metrics::Unit;

    /// Radio power cycles started after a spurious setup failure.
    pub const RECOVERY_STARTED: Metric = Metric::counter("ril.recovery.started")
        .with_description("Data call recovery power cycles started")
        .with_unit(Unit::Count);

    /// Radio power cycles that reached the done state.
    pub const RECOVERY_COMPLETED: Metric = Metric::counter("ril.recovery.completed")
        .with_description("Data call recovery power cycles completed")
        .with_unit(Unit::Count);

    /// Tracked setup requests evicted by the watchdog.
    pub const REQUESTS_EVICTED: Metric = Metric::counter("ril.requests.evicted")
        .with_description("Stale SETUP_DATA_CALL requests evicted on timeout")
        .with_unit(Unit::Count);

    /// Solicited responses that failed to decode.
    pub const RESPONSES_MALFORMED: Metric = Metric::counter("ril.responses.malformed")
        .with_description("Responses that could not be decoded")
        .with_unit(Unit::Count);

    /// Teardowns answered locally because no data call was up.
    pub const DEACTIVATE_SHORT_CIRCUITED: Metric = Metric::counter("ril.deactivate.short_circuited")
        .with_description("DEACTIVATE_DATA_CALL requests answered without the modem")
        .with_unit(Unit::Count);

    /// Every metric declared by this crate.
    pub const ALL: &[Metric] = &[
        RECOVERY_STARTED,
        RECOVERY_COMPLETED,
        REQUESTS_EVICTED,
        RESPONSES_MALFORMED,
        DEACTIVATE_SHORT_CIRCUITED,
    ];
}

/// Describe every metric to the installed recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_unique() {
        let mut names: Vec<_> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
        assert!(names.iter().all(|n| n.starts_with("ril.")));
    }

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: describing and incrementing are no-ops.
        describe_metrics();
        metric_defs::RECOVERY_STARTED.increment();
    }
}
