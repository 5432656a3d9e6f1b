mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::email::{BrevoEmailSender, EmailSender, LogEmailSender};
use crate::services::password_reset::PasswordResetService;
use crate::services::verification_store::InMemoryVerificationStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Ignoré si un subscriber est déjà installé
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("database connection failed: {}", e)))?;
    tracing::info!("database connected");

    let mailer: Arc<dyn EmailSender> = match config.brevo.clone() {
        Some(brevo) => Arc::new(BrevoEmailSender::new(brevo)),
        None => {
            tracing::warn!("BREVO_API_KEY not set, verification emails will only be logged");
            Arc::new(LogEmailSender)
        }
    };
    let store = Arc::new(InMemoryVerificationStore::new(Arc::new(mockable::DefaultClock)));
    let resets = web::Data::new(PasswordResetService::new(store, mailer));

    tracing::info!(addr = %config.bind_addr, port = config.port, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(resets.clone())
            .configure(routes::configure_routes)
    })
        .bind((config.bind_addr.as_str(), config.port))?
        .run()
        .await
}
