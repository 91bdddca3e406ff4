//! HTTP service handlers

pub mod health;
pub mod metrics;

pub use health::{AppStartTime, HealthService, health_routes};
pub use metrics::MetricsService;
