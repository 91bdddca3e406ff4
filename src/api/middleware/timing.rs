//! HTTP timing middleware
//!
//! Records request count, request duration, and in-flight request gauge
//! through the injected `MetricsRecorder`. Wired once per `App` with the
//! process-wide aggregator.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

use crate::metrics::MetricsRecorder;

/// Drop guard that decrements the in-flight gauge when dropped.
/// Ensures the gauge goes back down even if the handler panics.
struct ActiveConnectionGuard {
    metrics: Arc<dyn MetricsRecorder>,
    active: Arc<AtomicI64>,
}

impl Drop for ActiveConnectionGuard {
    fn drop(&mut self) {
        let now = self.active.fetch_sub(1, Ordering::AcqRel) - 1;
        self.metrics.set_active_connections(now as f64);
    }
}

/// HTTP timing middleware factory
#[derive(Clone)]
pub struct TimingMiddleware {
    metrics: Arc<dyn MetricsRecorder>,
    active: Arc<AtomicI64>,
}

impl TimingMiddleware {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            metrics,
            active: Arc::new(AtomicI64::new(0)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingService {
            service: Rc::new(service),
            metrics: self.metrics.clone(),
            active: self.active.clone(),
        }))
    }
}

pub struct TimingService<S> {
    service: Rc<S>,
    metrics: Arc<dyn MetricsRecorder>,
    active: Arc<AtomicI64>,
}

impl<S, B> Service<ServiceRequest> for TimingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let metrics = self.metrics.clone();
        let active = self.active.clone();
        let start = Instant::now();

        // Extract method and endpoint for labels (avoid String allocation)
        let method = method_str(req.method());
        let endpoint = classify_endpoint(req.path());

        Box::pin(async move {
            let now = active.fetch_add(1, Ordering::AcqRel) + 1;
            metrics.set_active_connections(now as f64);
            let _guard = ActiveConnectionGuard {
                metrics: metrics.clone(),
                active: active.clone(),
            };

            let result = srv.call(req).await;

            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            let status = match &result {
                Ok(response) => status_str(response.status()),
                Err(_) => "500",
            };

            metrics.observe_http_request(method, endpoint, status, duration_ms);
            metrics.inc_http_request(method, endpoint, status);

            result
        })
    }
}

/// Map HTTP method to a static string (avoids allocation).
fn method_str(method: &actix_web::http::Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "PATCH" => "PATCH",
        _ => "OTHER",
    }
}

/// Map HTTP status code to a static string (avoids allocation for common codes).
fn status_str(status: actix_web::http::StatusCode) -> &'static str {
    match status.as_u16() {
        200 => "200",
        201 => "201",
        204 => "204",
        304 => "304",
        400 => "400",
        401 => "401",
        403 => "403",
        404 => "404",
        405 => "405",
        500 => "500",
        502 => "502",
        503 => "503",
        _ => "other",
    }
}

/// Cached route prefixes for endpoint classification.
/// Initialized once from config (these keys require restart to change).
struct RoutePrefixes {
    api: String,
    admin: String,
    health: String,
}

static ROUTE_PREFIXES: std::sync::OnceLock<RoutePrefixes> = std::sync::OnceLock::new();

fn get_route_prefixes() -> &'static RoutePrefixes {
    ROUTE_PREFIXES.get_or_init(|| {
        let routes = &crate::config::get_config().routes;
        RoutePrefixes {
            api: routes.api_prefix.clone(),
            admin: routes.admin_prefix.clone(),
            health: routes.health_prefix.clone(),
        }
    })
}

/// Classify request path into endpoint category
///
/// This prevents label cardinality explosion by grouping paths.
fn classify_endpoint(path: &str) -> &'static str {
    let prefixes = get_route_prefixes();
    if path.starts_with(&prefixes.health) {
        "health"
    } else if path.starts_with(&prefixes.admin) {
        "admin"
    } else if path.starts_with(&prefixes.api) {
        "api"
    } else {
        "other"
    }
}
