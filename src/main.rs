use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use tracing::info;

use tripmetrics::api::middleware::TimingMiddleware;
use tripmetrics::api::services::{AppStartTime, health_routes};
use tripmetrics::config::{get_config, init_config};
use tripmetrics::metrics::{MetricsAggregator, MetricsRecorder};
use tripmetrics::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    init_config();
    let config = get_config();

    // Guard must outlive the server so buffered log lines get flushed
    let _log_guard = init_logging(&config.logging);

    if let Err(e) = config.validate() {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    // The one aggregator for this process; every collaborator gets a clone
    // of the Arc, nothing reaches for a global.
    let metrics = Arc::new(MetricsAggregator::with_max_samples(
        config.metrics.max_samples_per_series,
    ));

    if config.metrics.max_samples_per_series > 0 {
        info!(
            "Histogram retention capped at {} samples per series (reservoir)",
            config.metrics.max_samples_per_series
        );
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);
    info!(
        "Metrics available at {}/metrics",
        config.routes.health_prefix
    );

    let recorder: Arc<dyn MetricsRecorder> = metrics.clone();
    // Built once so every worker shares the same in-flight counter
    let timing = TimingMiddleware::new(recorder);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .wrap(timing.clone())
            .service(health_routes(&config.routes.health_prefix))
    })
    .workers(config.server.cpu_count)
    .bind(bind_address)?
    .run()
    .await
}
