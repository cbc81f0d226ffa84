//! Onboarding API server.
//!
//! Serves the theme preference endpoints and the frontend runtime configuration.
//!
//! Environment:
//!   APP_ENV      - development | staging | production | test (default: development)
//!   API_URL      - public API base URL (required in production)
//!   SERVER_ADDR  - bind address (default: 127.0.0.1:8000)
//!   CONFIG_FILE  - optional TOML file layered under the environment
//!   RUST_LOG     - log filter (default: info, debug when DEBUG=true)

use std::process::ExitCode;
use std::sync::Arc;

use onboard_fnd::preference::{create_router, AppState};
use onboard_fnd::{context, logging, Error};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let log = match logging::init() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // An invalid configuration must stop the process before it binds a socket.
    let ctx = match context::global() {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "refusing to start with invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let config = ctx.config();
    if let Err(e) = log.apply(&config) {
        warn!(error = %e, "could not apply configured log level");
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: Arc<onboard_fnd::Configuration>) -> Result<(), Error> {
    let addr = config.server_addr;
    let app = create_router(Arc::new(AppState::new(Arc::clone(&config))));

    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        environment = %config.environment,
        version = %config.app_version,
        "{} listening",
        config.app_name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
            info!("shutting down");
        })
        .await?;
    Ok(())
}
