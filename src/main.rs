//! # Session Gateway main program
//!
//! Fronts a browser-facing application: validates sessions against the
//! authentication provider, mints bearer tokens for the backend, and
//! proxies API traffic with cookie-domain rewriting.

use session_gateway::{config, logging, server};

#[tokio::main]
async fn main() {
    logging::init_logging(None);

    let config = match config::load_config() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(error = %error, "configuration is invalid, refusing to start");
            std::process::exit(1);
        }
    };

    if let Err(error) = server::run(config).await {
        tracing::error!(error = %error, "gateway terminated");
        std::process::exit(1);
    }
}
