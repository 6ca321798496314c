//! Prometheus metrics for LYNX ledger services.
//!
//! All metrics follow the naming convention: `lynx_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CORRELATION METRICS
    // =========================================================================

    /// Topic messages successfully decoded as JSON objects
    pub static ref MESSAGES_DECODED: Counter = Counter::new(
        "lynx_correlation_messages_decoded_total",
        "Topic messages decoded as JSON objects"
    ).expect("metric creation failed");

    /// Topic messages excluded from correlation
    pub static ref MESSAGES_DROPPED: CounterVec = CounterVec::new(
        Opts::new("lynx_correlation_messages_dropped_total", "Topic messages excluded from correlation"),
        &["reason"]  // reason: undecodable/replayed/no_request_id/unrecognized_kind
    ).expect("metric creation failed");

    /// Complete rebalance transactions produced
    pub static ref TRANSACTIONS_CORRELATED: Counter = Counter::new(
        "lynx_correlation_transactions_total",
        "Rebalance transactions produced by correlation"
    ).expect("metric creation failed");

    /// Groups with recommendations or executions but no request
    pub static ref ORPHANED_GROUPS: Counter = Counter::new(
        "lynx_correlation_orphaned_groups_total",
        "Correlation groups without a rebalance request"
    ).expect("metric creation failed");

    /// Repeated requests for an already seen request id
    pub static ref DUPLICATE_REQUESTS: Counter = Counter::new(
        "lynx_correlation_duplicate_requests_total",
        "Rebalance requests dropped as duplicates"
    ).expect("metric creation failed");

    // =========================================================================
    // TOPIC METRICS
    // =========================================================================

    /// Topic read duration
    pub static ref TOPIC_READ_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "lynx_topic_read_duration_seconds",
            "Time spent reading a ledger topic"
        ).buckets(exponential_buckets(0.005, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Topic read failures by kind
    pub static ref TOPIC_READ_FAILURES: CounterVec = CounterVec::new(
        Opts::new("lynx_topic_read_failures_total", "Failed ledger topic reads"),
        &["kind"]  // kind: not_found/unauthorized/timeout/transport/invalid_response/rejected/too_large
    ).expect("metric creation failed");

    /// Messages submitted to a topic
    pub static ref TOPIC_SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("lynx_topic_submissions_total", "Messages submitted to a ledger topic"),
        &["outcome"]  // outcome: accepted/rejected
    ).expect("metric creation failed");

    // =========================================================================
    // HTTP METRICS
    // =========================================================================

    /// Requests served by the gateway
    pub static ref HTTP_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("lynx_http_requests_total", "HTTP requests served"),
        &["route", "status"]
    ).expect("metric creation failed");

    /// Request latency by route
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "lynx_http_request_duration_seconds",
            "HTTP request latency"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets")),
        &["route"]
    ).expect("metric creation failed");
}

/// Handle proving the global registry has been populated.
pub struct MetricsHandle {
    _private: (),
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors already present are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Correlation
        Box::new(MESSAGES_DECODED.clone()),
        Box::new(MESSAGES_DROPPED.clone()),
        Box::new(TRANSACTIONS_CORRELATED.clone()),
        Box::new(ORPHANED_GROUPS.clone()),
        Box::new(DUPLICATE_REQUESTS.clone()),
        // Topic
        Box::new(TOPIC_READ_DURATION.clone()),
        Box::new(TOPIC_READ_FAILURES.clone()),
        Box::new(TOPIC_SUBMISSIONS.clone()),
        // HTTP
        Box::new(HTTP_REQUESTS.clone()),
        Box::new(HTTP_REQUEST_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _private: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
