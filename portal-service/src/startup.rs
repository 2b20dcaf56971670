//! Application startup and lifecycle management.

use axum::Router;
use service_core::error::AppError;
use service_core::middleware::rate_limit::spawn_limiter_housekeeping;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::{PortalConfig, StoreBackend};
use crate::services::{AccountStore, MemoryStore, MongoStore, PaymentStore};
use crate::{build_router, AppState};

const LIMITER_HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect the store, seed the bootstrap admin and bind the listener.
    ///
    /// Port 0 in the config binds a random free port.
    pub async fn build(config: PortalConfig) -> Result<Self, AppError> {
        let (accounts, payments): (Arc<dyn AccountStore>, Arc<dyn PaymentStore>) =
            match config.store {
                StoreBackend::Mongo => {
                    let store = MongoStore::connect(&config.mongodb, &config.service_name)
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to create MongoDB client: {}", e);
                            AppError::DatabaseError(e)
                        })?;
                    store.init_indexes().await.map_err(|e| {
                        tracing::error!("Failed to initialize database indexes: {}", e);
                        AppError::DatabaseError(e)
                    })?;
                    let store = Arc::new(store);
                    (store.clone(), store)
                }
                StoreBackend::Memory => {
                    tracing::warn!("Using in-memory store; data will not survive a restart");
                    let store = Arc::new(MemoryStore::new());
                    (store.clone(), store)
                }
            };

        let state = AppState::new(config.clone(), accounts, payments);

        if let Some(admin) = &config.bootstrap_admin {
            state.account_service.bootstrap_admin(admin).await?;
        }

        spawn_limiter_housekeeping(state.login_rate_limiter.limiter.clone(), LIMITER_HOUSEKEEPING_INTERVAL);
        spawn_limiter_housekeeping(state.ip_rate_limiter.limiter.clone(), LIMITER_HOUSEKEEPING_INTERVAL);

        let router = build_router(state);

        let addr = config.common.bind_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Portal service listening");

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
