use std::env;
use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};

use backend::config::AppConfig;
use backend::db;
use backend::db::detection_repository::{DetectionStore, PgDetectionRepository};
use backend::ml::detection_service::FakeDetectionService;
use backend::routes::configure_routes;
use backend::storage::staging::StagingArea;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("Configuration error: {}", e))
    })?;

    let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    };

    let pool = db::create_pool(&config.database_url).await.map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Database connection failed: {}", e),
        )
    })?;
    log::info!("Database connection pool created");

    db::run_migrations(&pool).await.map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("Migration failed: {}", e))
    })?;
    log::info!("Database migrations applied");

    let staging = StagingArea::new(
        config.upload_dir.clone(),
        config.max_upload_size,
        config.allowed_extensions.clone(),
    );
    staging.ensure_dir()?;
    log::info!("Staging uploads under {}", config.upload_dir.display());

    let detector = FakeDetectionService::new(config.confidence_threshold);
    let store: Arc<dyn DetectionStore> = Arc::new(PgDetectionRepository::new(pool));

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::new(staging.clone()))
            .app_data(web::Data::new(detector.clone()))
            .configure(configure_routes);

        // Serve the built SPA when present; the backend runs fine without it.
        if Path::new(&frontend_dir).is_dir() {
            app.service(Files::new("/static", frontend_dir.clone()).index_file("index.html"))
        } else {
            app
        }
    })
    .bind(&bind_address)?
    .run()
    .await
}
