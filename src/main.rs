//! # hasty - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor. Registra un par de rutas de demostración
//! y arranca el accept loop.

use hasty::config::Config;
use hasty::server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::new();
    info!(host = %config.host, port = config.port, "configuración cargada");

    let mut server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "no se pudo hacer bind");
            std::process::exit(1);
        }
    };

    // Rutas de demostración
    server.get("/ping", |_req, res| res.send_status(200));

    server.get("/health", |_req, res| {
        res.send_json(&serde_json::json!({"status": "ok"}))
    });

    server.post("/echo", |req, res| {
        res.set_header("Content-Type", "text/plain");
        res.send(req.body())
    });

    // Arranca el accept loop (bloquea el thread para siempre)
    if let Err(e) = server.run() {
        error!(error = %e, "error fatal del servidor");
        std::process::exit(1);
    }
}
