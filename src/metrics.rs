//! Prometheus metrics.
//!
//! HTTP traffic is recorded per route and per resource service; the
//! `track_*` helpers count domain events. Everything is a no-op when
//! `OBSERVABILITY_ENABLED=false`.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

const HTTP_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];
const STORE_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0, 60.0];

pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0"))
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and its upkeep task.
///
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            HTTP_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("store_request_duration_seconds".to_string()),
            STORE_BUCKETS,
        )?
        .install_recorder()?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(5));
        loop {
            ticker.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Resource service a path belongs to: `/api/grades/upload` is `grades`.
fn service_label(path: &str) -> String {
    path.strip_prefix("/api/")
        .and_then(|rest| rest.split('/').next())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("root")
        .to_string()
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let service = service_label(&route);

    gauge!("http_requests_active", "service" => service.clone()).increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active", "service" => service.clone()).decrement(1.0);

    let status = response.status().as_u16();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string(),
        "class" => status_class(status),
        "service" => service,
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_token_validation(success: bool) {
    if is_observability_enabled() {
        let outcome = if success { "valid" } else { "invalid" };
        counter!("token_validations_total", "outcome" => outcome).increment(1);
    }
}

pub fn track_user_created(role: &str) {
    if is_observability_enabled() {
        counter!("users_created_total", "role" => role.to_string()).increment(1);
    }
}

pub fn track_user_deleted(role: &str) {
    if is_observability_enabled() {
        counter!("users_deleted_total", "role" => role.to_string()).increment(1);
    }
}

pub fn track_role_changed(new_role: &str) {
    if is_observability_enabled() {
        counter!("user_role_changes_total", "new_role" => new_role.to_string()).increment(1);
    }
}

pub fn track_course_created() {
    if is_observability_enabled() {
        counter!("courses_created_total").increment(1);
    }
}

pub fn track_enrollment_created() {
    if is_observability_enabled() {
        counter!("enrollments_created_total").increment(1);
    }
}

/// `source` is `json` for API submissions and `file` for imports.
pub fn track_grades_recorded(source: &'static str, count: usize) {
    if is_observability_enabled() {
        counter!("grades_recorded_total", "source" => source).increment(count as u64);
    }
}

pub fn track_grade_import(inserted: usize, skipped: usize) {
    if is_observability_enabled() {
        counter!("grades_imported_total").increment(1);
        counter!("grades_recorded_total", "source" => "file").increment(inserted as u64);
        counter!("grade_rows_skipped_total").increment(skipped as u64);
    }
}

pub fn track_attendance_recorded(count: usize) {
    if is_observability_enabled() {
        counter!("attendance_records_total").increment(count as u64);
    }
}

pub fn track_excuse_reviewed(decision: &str) {
    if is_observability_enabled() {
        counter!("excuses_reviewed_total", "decision" => decision.to_string()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_is_first_api_segment() {
        assert_eq!(service_label("/api/grades/upload"), "grades");
        assert_eq!(service_label("/api/students/{id}"), "students");
        assert_eq!(service_label("/health"), "root");
        assert_eq!(service_label("/api/"), "root");
    }

    #[test]
    fn status_classes() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(422), "4xx");
        assert_eq!(status_class(503), "5xx");
    }
}
