//! ## kassavakt-telemetry::metrics
//! **Prometheus counters and histograms**

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub safety_checks: IntCounter,
    pub unsafe_states: IntCounter,
    pub requests: IntCounterVec,
    pub safety_check_duration: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let safety_checks =
            IntCounter::new("kassavakt_safety_checks_total", "Safety checks performed")?;
        let unsafe_states = IntCounter::new(
            "kassavakt_unsafe_states_total",
            "Safety checks that found no safe sequence",
        )?;
        let requests = IntCounterVec::new(
            Opts::new("kassavakt_requests_total", "Evaluated requests by outcome"),
            &["outcome"],
        )?;
        let safety_check_duration = Histogram::with_opts(
            HistogramOpts::new(
                "kassavakt_safety_check_duration_seconds",
                "Time spent in the safety check",
            )
            .buckets(vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2]),
        )?;

        registry.register(Box::new(safety_checks.clone()))?;
        registry.register(Box::new(unsafe_states.clone()))?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(safety_check_duration.clone()))?;

        Ok(Self {
            registry,
            safety_checks,
            unsafe_states,
            requests,
            safety_check_duration,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record_safety_check(&self, safe: bool, seconds: f64) {
        self.safety_checks.inc();
        if !safe {
            self.unsafe_states.inc();
        }
        self.safety_check_duration.observe(seconds);
    }

    pub fn record_request(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }
}
