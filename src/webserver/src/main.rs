// Declare our modules
mod api;
mod config;
mod error;
mod response;
mod storage;

use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::HostConfig;
use crate::response::StatusMode;
use crate::storage::Storage;

// State shared by every worker: one store for the whole process
pub struct AppState {
    pub storage: Storage,
    pub status_mode: StatusMode,
}

// RUST_LOG takes precedence over the configured level
fn init_logging(config: &HostConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// Main function to start the Actix web server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = HostConfig::parse();
    init_logging(&config);

    let state = web::Data::new(AppState {
        storage: Storage::new(),
        status_mode: config.status_mode(),
    });
    let max_body_bytes = config.max_body_bytes;

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .configure(api::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(usize::from(workers));
    }

    let server = server.bind((config.hostname.as_str(), config.port))?;
    info!(
        addr = %config.label(),
        workers = ?config.workers,
        status_mode = ?config.status_mode(),
        "keystore listening"
    );
    server.run().await
}
