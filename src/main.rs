use std::sync::Arc;

use actix_web::{HttpServer, web};
use connection_control::{
    ConnectionControl, ControlMetrics, ConnectionControlConfig, InProcessHost, LoggingConfig,
    MetricsConfig, ServerConfig, create_base_app,
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = LoggingConfig::from_env().init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let server_config = ServerConfig::from_env();
    let metrics_config = MetricsConfig::from_env();
    let control_config = ConnectionControlConfig::from_env();

    let control = ConnectionControl::init(Arc::new(InProcessHost::new()), control_config)
        .map_err(|e| std::io::Error::other(format!("Failed to load connection control: {}", e)))?;
    let control = web::Data::new(control);
    let metrics = web::Data::new(
        ControlMetrics::new()
            .map_err(|e| std::io::Error::other(format!("Failed to create metrics: {}", e)))?,
    );

    info!(bind = %server_config.bind, "Connection control admin server starting");

    let app_control = control.clone();
    HttpServer::new(move || {
        create_base_app(app_control.clone(), metrics.clone(), metrics_config.clone())
    })
    .bind(&server_config.bind)?
    .run()
    .await?;

    match Arc::try_unwrap(control.into_inner()) {
        Ok(control) => control.deinit(),
        Err(_) => error!("Connection control still in use at shutdown; skipping deinit"),
    }
    Ok(())
}
