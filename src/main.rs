mod api;
mod config;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::image_service::{CloudinaryClient, DisabledImageStore, ImageStore};
use crate::state::AppState;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("❌ {}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("🚀 Starting HandiGO Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| startup_error("Failed to connect to MongoDB", e))?;

    log::info!("✅ MongoDB connected successfully");

    // 👑 Seed the admin account when ADMIN_* is set
    if let Some(seed) = &config.admin_seed {
        seeds::admin_seed::seed_admin(&db, seed, config.bcrypt_cost).await;
    }

    let images: Arc<dyn ImageStore> = match &config.cloudinary {
        Some(cloudinary) => {
            log::info!("🖼️  Image uploads go to Cloudinary cloud '{}'", cloudinary.cloud_name);
            Arc::new(
                CloudinaryClient::new(cloudinary.clone(), config.upload_timeout_secs)
                    .map_err(|e| startup_error("Failed to build upload client", e))?,
            )
        }
        None => {
            log::warn!("⚠️  Cloudinary is not configured: worker creation and avatars are disabled");
            Arc::new(DisabledImageStore)
        }
    };

    let state = web::Data::new(AppState::new(&config, db, images));
    let allowed_origins = config.allowed_origins.clone();

    if allowed_origins.is_empty() {
        log::warn!("⚠️  ALLOWED_ORIGINS is empty: CORS accepts any origin, handoff redirects are disabled");
    }

    let (host, port) = (config.host.clone(), config.port);
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(build_cors(&allowed_origins))
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
