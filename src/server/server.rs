use axum::{
    routing::get,
    Router
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::configuration::{
    Configuration,
    ServerConfiguration
};
use crate::server::corspolicy::cors_layer;
use crate::server::handler;
use crate::server::servererror::ServerError;
use crate::server::state::AppState;

/// 建立路由：`/fourier_coefficients` 與 `/health`。
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/fourier_coefficients", get(handler::fourier_coefficients))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// 明確建構的 HTTP 伺服器，不依賴任何全域狀態。
pub struct Server {
    configuration: ServerConfiguration,
    router: Router
}

impl Server {
    pub fn new(configuration: &Configuration) -> Result<Server, ServerError> {
        let state = AppState::from_configuration(configuration)?;
        let router = create_router(state, configuration.server().allowed_origins());
        Ok(Server { configuration: configuration.server().clone(), router })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 綁定位址並服務，直到收到 Ctrl-C。
    pub async fn serve(self) -> Result<(), ServerError> {
        let address = self.configuration.address();
        let listener = tokio::net::TcpListener::bind(&address).await?;
        info!(
            address = %address,
            allowed_origins = ?self.configuration.allowed_origins(),
            "fourier coefficient server listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
