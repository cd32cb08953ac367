use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .unwrap();

    // LLM gateway metrics
    pub static ref LLM_ENDPOINT_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "llm_endpoint_attempts_total",
        "Chat-completion requests per candidate endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .unwrap();

    pub static ref LLM_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "llm_request_duration_seconds",
        "Chat-completion request duration in seconds",
        &["endpoint"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref QUESTION_GENERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "question_generations_total",
        "Completed question generations by source of the questions",
        &["source"]
    )
    .unwrap();

    pub static ref CONNECTION_TESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "llm_connection_tests_total",
        "LLM connection tests by result",
        &["result"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

pub fn record_endpoint_attempt(endpoint: &str, outcome: &str, duration_secs: f64) {
    LLM_ENDPOINT_ATTEMPTS_TOTAL
        .with_label_values(&[endpoint, outcome])
        .inc();
    LLM_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

pub fn record_generation(source: &str) {
    QUESTION_GENERATIONS_TOTAL
        .with_label_values(&[source])
        .inc();
}

pub fn record_connection_test(success: bool) {
    let result = if success { "success" } else { "failure" };
    CONNECTION_TESTS_TOTAL.with_label_values(&[result]).inc();
}
