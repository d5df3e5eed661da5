//! NGO Portal Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpServer, Result as ActixResult, http::header, web};
use tokio::sync::Semaphore;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ngo_portal_lib::api::{self, ApiDoc};
use ngo_portal_lib::auth::{self, AuthService};
use ngo_portal_lib::config::Config;
use ngo_portal_lib::db::DbPool;
use ngo_portal_lib::middleware::RequestLogger;
use ngo_portal_lib::migration::{Migrator, MigratorTrait};
use ngo_portal_lib::services::{self, IngestRunner, SweeperConfig};

/// SPA fallback handler - serves index.html for client-side routing.
async fn spa_fallback(req: HttpRequest) -> ActixResult<NamedFile> {
    let static_dir: &PathBuf = req
        .app_data::<web::Data<PathBuf>>()
        .expect("Static dir not configured")
        .get_ref();
    Ok(NamedFile::open(static_dir.join("index.html"))?)
}

/// Perform health check (for Docker healthcheck).
async fn health_check() -> bool {
    // Simple check - just verify we can load config
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        if health_check().await {
            std::process::exit(0);
        } else {
            std::process::exit(1);
        }
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, NGO_JWT_SECRET and NGO_ADMIN_PASSWORD must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  NGO Portal Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and secrets");
    }

    // Connect to PostgreSQL
    let pool = DbPool::connect(&config)
        .await
        .expect("Failed to connect to database");
    info!("Database connection established");

    // Run migrations
    Migrator::up(pool.connection(), None)
        .await
        .expect("Failed to run migrations");
    info!("Database migrations complete");

    // Seed the admin account on first start
    auth::ensure_default_admin(&pool, &config)
        .await
        .expect("Failed to ensure admin user");

    // Start the stale-job sweeper
    let sweeper_config = SweeperConfig {
        stale_hours: config.job_stale_hours,
        interval_secs: if config.is_development() { 60 } else { 3600 }, // 1 min dev, 1 hour prod
    };
    services::start_sweeper_task(Arc::new(pool.clone()), sweeper_config);
    info!(
        "Stale-job sweeper started (threshold: {} hours)",
        config.job_stale_hours
    );

    // Prepare shared state
    let bind_address = config.bind_address();
    let auth_service = AuthService::new(config.jwt_secret.clone(), config.token_expiry_hours);
    let ingest_runner = IngestRunner::new(config.ingest_deadline_secs.map(Duration::from_secs));
    let max_upload_size = config.max_upload_size;
    let max_concurrent_ingestions = config.max_concurrent_ingestions;
    let static_dir = config.static_dir.clone();
    let is_development = config.is_development();

    if let Some(deadline) = config.ingest_deadline_secs {
        info!("Ingestion deadline: {}s per run", deadline);
    }

    // Bound concurrent ingestions; each permit is held until its run reaches
    // a terminal state, capping resident CSV buffers
    let ingest_semaphore = Arc::new(Semaphore::new(max_concurrent_ingestions));
    info!(
        "Upload limits: {}MB max size, {} concurrent ingestions",
        max_upload_size / 1024 / 1024,
        max_concurrent_ingestions
    );

    if static_dir.is_some() {
        info!("Static file serving enabled from {:?}", static_dir);
    }

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                ])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                ])
                .max_age(3600)
        };

        let mut app = App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(ingest_runner.clone()))
            .app_data(web::Data::new(max_upload_size))
            .app_data(web::Data::new(ingest_semaphore.clone()))
            // Allow headroom at the HTTP layer - the actual CSV limit is
            // enforced in the streaming upload handler
            .app_data(web::PayloadConfig::new(max_upload_size * 2))
            // Configure API routes
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_report_routes)
                    .configure(api::configure_upload_routes)
                    .configure(api::configure_contact_routes)
                    .configure(services::configure_auth_routes),
            )
            // Swagger UI
            .service(
                SwaggerUi::new("/api-docs/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );

        // Serve static files in production (when NGO_STATIC_DIR is set)
        if let Some(ref dir) = static_dir {
            app = app
                .app_data(web::Data::new(dir.clone()))
                // Serve static assets (js, css, images)
                .service(Files::new("/assets", dir.join("assets")).prefer_utf8(true))
                // Serve favicon
                .service(Files::new("/favicon", dir.clone()).index_file("favicon.ico"))
                // SPA fallback - serve index.html for all other routes
                .default_service(web::route().to(spa_fallback));
        }

        app
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
