use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder,
};

static DISPATCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "chat_notification_dispatch_total",
            "New-message trigger invocations by outcome",
        ),
        &["outcome"],
    )
    .expect("failed to create chat_notification_dispatch_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register chat_notification_dispatch_total");
    counter
});

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "chat_notification_http_requests_total",
            "Total HTTP requests handled by chat-notification-service",
        ),
        &["method", "path", "status"],
    )
    .expect("failed to create chat_notification_http_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register chat_notification_http_requests_total");
    counter
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "chat_notification_http_request_duration_seconds",
            "HTTP request latency for chat-notification-service",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path", "status"],
    )
    .expect("failed to create chat_notification_http_request_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register chat_notification_http_request_duration_seconds");
    histogram
});

/// Count one dispatcher invocation (`sent`, `failed` or a skip reason).
pub fn record_dispatch(outcome: &str) {
    DISPATCH_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn dispatch_count(outcome: &str) -> u64 {
    DISPATCH_TOTAL.with_label_values(&[outcome]).get()
}

pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status_label = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status_label])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status_label])
        .observe(elapsed.as_secs_f64());
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dispatch_increments() {
        let before = dispatch_count("metrics_test_outcome");
        record_dispatch("metrics_test_outcome");
        record_dispatch("metrics_test_outcome");
        assert_eq!(dispatch_count("metrics_test_outcome"), before + 2);
    }

    #[test]
    fn test_observe_http_request_labels() {
        let labels = ["POST", "/metrics-test/{id}", "200"];
        let before = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();
        observe_http_request("POST", "/metrics-test/{id}", 200, Duration::from_millis(12));
        assert_eq!(HTTP_REQUESTS_TOTAL.with_label_values(&labels).get(), before + 1);
        assert!(
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&labels)
                .get_sample_count()
                >= 1
        );
    }

    #[actix_web::test]
    async fn test_serve_metrics_exposes_dispatch_counter() {
        record_dispatch("sent");
        let response = serve_metrics().await;
        assert!(response.status().is_success());
    }
}
