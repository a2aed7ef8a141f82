use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::MethodRouter;
use axum::{Router, middleware};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{CorsConfig, Service};
use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::attendance::{attendance_collection, init_attendance_router};
use crate::modules::courses::{courses_collection, init_courses_router};
use crate::modules::directors::{directors_collection, init_directors_router};
use crate::modules::grades::{grades_collection, init_grades_router};
use crate::modules::health::init_health_router;
use crate::modules::students::{students_collection, init_students_router};
use crate::modules::teachers::{teachers_collection, init_teachers_router};
use crate::state::AppState;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
}

/// Nests a service under `/{name}` and serves its collection handlers at
/// both `/{name}` and `/{name}/`.
fn mount(
    api: Router<AppState>,
    name: &str,
    routes: Router<AppState>,
    collection: MethodRouter<AppState>,
) -> Router<AppState> {
    api.nest(&format!("/{name}"), routes)
        .route(&format!("/{name}/"), collection)
}

/// Mounts the resource services enabled in `ENABLED_SERVICES` under `/api`.
fn api_router(state: &AppState) -> Router<AppState> {
    let server = &state.server_config;
    let mut api = Router::new();

    if server.is_enabled(Service::Students) {
        api = mount(api, "students", init_students_router(), students_collection());
    }
    if server.is_enabled(Service::Teachers) {
        api = mount(api, "teachers", init_teachers_router(), teachers_collection());
    }
    if server.is_enabled(Service::Directors) {
        api = mount(api, "directors", init_directors_router(), directors_collection());
    }
    if server.is_enabled(Service::Courses) {
        api = mount(api, "courses", init_courses_router(), courses_collection());
    }
    if server.is_enabled(Service::Grades) {
        api = mount(
            api,
            "grades",
            init_grades_router(&state.rate_limit_config),
            grades_collection(),
        );
    }
    if server.is_enabled(Service::Attendance) {
        api = mount(
            api,
            "attendance",
            init_attendance_router(),
            attendance_collection(),
        );
    }

    info!(
        services = ?server.enabled_services,
        "Resource services mounted"
    );
    api
}

pub fn init_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .merge(init_health_router())
        .nest("/api", api_router(&state))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(state.server_config.max_upload_bytes))
        .layer(cors_layer(&state.cors_config))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware));

    let rate_limit = &state.rate_limit_config;
    match rate_limit.general_governor_config() {
        Some(config) if rate_limit.enabled => {
            router.layer(GovernorLayer::new(Arc::new(config)))
        }
        _ => router,
    }
}
