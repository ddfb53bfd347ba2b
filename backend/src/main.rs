use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dfscan::routes::{configure_routes, UploadSettings};
use dfscan::{Analyzer, AppConfig};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    std::fs::create_dir_all(&config.server.upload_dir)?;

    let analyzer = Analyzer::from_config(&config).map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let analyzer = web::Data::new(analyzer);
    log::info!("Analyzer ready in {} mode", analyzer.mode());

    let settings = web::Data::new(UploadSettings {
        upload_dir: config.server.upload_dir.clone(),
        static_dir: config.server.static_dir.clone(),
        max_upload_bytes: config.server.max_upload_bytes,
        model_path: config.model.path.clone(),
    });
    let static_dir = config.server.static_dir.clone();

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(analyzer.clone())
            .app_data(settings.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
