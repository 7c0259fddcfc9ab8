use crate::api::{create_router, AppState};
use crate::config::ServerConfig;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use gitedit_core::{Editor, GitRepository, ModifyOptions, OpenAiRewriter, Rewriter};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

pub struct GitEditServer {
    config: ServerConfig,
    rewriter_name: &'static str,
    editor: Arc<Editor>,
}

impl GitEditServer {
    /// Builds a server around an explicitly provided rewriter. The repository
    /// root is checked once here so a bad root fails at startup.
    pub fn new(config: ServerConfig, rewriter: Arc<dyn Rewriter>) -> anyhow::Result<Self> {
        let root = std::fs::canonicalize(&config.root)?;
        GitRepository::open(&root)?;

        let rewriter_name = rewriter.name();
        let editor = Editor::new(root, rewriter).with_options(ModifyOptions {
            explain: config.explain,
        });

        Ok(Self {
            config,
            rewriter_name,
            editor: Arc::new(editor),
        })
    }

    /// Builds a server that talks to the configured OpenAI endpoint.
    pub fn with_openai(config: ServerConfig, api_key: String) -> anyhow::Result<Self> {
        let rewriter = OpenAiRewriter::new(config.openai.clone(), api_key)?;
        Self::new(config, Arc::new(rewriter))
    }

    pub fn root(&self) -> &Path {
        self.editor.root()
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            editor: Arc::clone(&self.editor),
        };

        create_router(state)
            .layer(TimeoutLayer::new(self.config.request_timeout()))
            .layer(CorsLayer::permissive())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        id = %Uuid::new_v4(),
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        self.serve_on(self.config.bind).await
    }

    pub async fn serve_on(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let app = self.router();

        info!("Server listening on {}", addr);
        info!("Serving repository: {:?}", self.root());
        info!(
            "Rewriter: {} (explanations {})",
            self.rewriter_name,
            if self.config.explain { "on" } else { "off" }
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
