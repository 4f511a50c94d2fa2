use crate::handlers::{
    applications::{create_application, get_application, get_applications, update_application},
    companies::{
        create_company, get_companies, get_company, get_company_jobs, login_company,
        update_company,
    },
    connections::{
        get_connection_requests, get_connections, respond_to_connection_request,
        send_connection_request,
    },
    health::{health_check, root},
    jobs::{create_job, delete_job, get_job, get_jobs, update_job},
    users::{create_user, get_user, get_users, login_user, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Developer accounts
        .route("/api/users", post(create_user).get(get_users))
        .route("/api/users/login", post(login_user))
        .route("/api/users/:user_id", get(get_user).put(update_user))
        // Company accounts
        .route("/api/companies", post(create_company).get(get_companies))
        .route("/api/companies/login", post(login_company))
        .route(
            "/api/companies/:company_id",
            get(get_company).put(update_company),
        )
        .route("/api/companies/:company_id/jobs", get(get_company_jobs))
        // Job postings
        .route("/api/jobs", post(create_job).get(get_jobs))
        .route(
            "/api/jobs/:job_id",
            get(get_job).put(update_job).delete(delete_job),
        )
        // Connections
        .route("/api/connections/requests", post(send_connection_request))
        .route(
            "/api/connections/requests/:request_id",
            put(respond_to_connection_request),
        )
        .route("/api/connections/:user_id", get(get_connections))
        .route(
            "/api/connections/:user_id/requests",
            get(get_connection_requests),
        )
        // Applications
        .route(
            "/api/applications",
            post(create_application).get(get_applications),
        )
        .route(
            "/api/applications/:application_id",
            get(get_application).put(update_application),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The Prometheus recorder is process-global; tests build many routers
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route(
                "/metrics",
                get(move || async move { metric_handle.render() }),
            )
            .layer(prometheus_layer)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
