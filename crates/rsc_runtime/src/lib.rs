//! # RSC Runtime
//!
//! Wires both halves of the protocol together around the demo application.
//!
//! ## Architecture
//!
//! ```text
//! path ──► ResponseRenderer<AppRouter> ──► RenderedResponse
//!                                               │ (hydrate)
//!                                               ▼
//!              BootstrapSlot ──► Resolver<ModuleRegistry> ──► presentable tree
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let runtime = Runtime::new(RuntimeConfig::load()?);
//! let response = runtime.respond("/", Props::new()).await?;
//! let tree = runtime.hydrate(&response).await?;
//! ```

pub mod app;
pub mod config;

pub use app::{client_modules, AppRouter};
pub use config::{ClientConfig, ConfigError, ConfigResult, RuntimeConfig};

use rsc_client::{hydrate, BootstrapError, BootstrapSlot, ModuleRegistry, Resolver};
use rsc_core::{Node, Props};
use rsc_server::{RenderedResponse, ResponseError, ResponseRenderer};
use thiserror::Error;

/// Runtime errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Response failed: {0}")]
    Response(#[from] ResponseError),

    #[error("Hydration failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Invalid request props: {0}")]
    InvalidProps(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Server renderer and client resolver for the demo application
pub struct Runtime {
    config: RuntimeConfig,
    renderer: ResponseRenderer<AppRouter>,
    resolver: Resolver<ModuleRegistry>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let router = AppRouter::new(config.greeting_delay())
            .with_boundary_prop(config.server.evaluator.boundary_prop.clone());
        let renderer = ResponseRenderer::new(router, config.server.clone());
        Self {
            config,
            renderer,
            resolver: Resolver::new(client_modules()),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver<ModuleRegistry> {
        &self.resolver
    }

    /// Render the response for `path`
    pub async fn respond(&self, path: &str, props: Props) -> RuntimeResult<RenderedResponse> {
        Ok(self.renderer.respond(path, props).await?)
    }

    /// Run the client half over a rendered response
    ///
    /// Documents hand over their embedded payload; bare payloads are used as is.
    pub async fn hydrate(&self, response: &RenderedResponse) -> RuntimeResult<Node> {
        let slot = if response.is_document() {
            BootstrapSlot::from_document(&response.body)?
        } else {
            BootstrapSlot::filled(response.body.clone())
        };
        if self.config.client.log_payload {
            log::info!("Payload: {}", response.body);
        }
        Ok(hydrate(&slot, &self.resolver).await?)
    }
}

/// Parse request props from JSON object text
pub fn parse_props(text: &str) -> RuntimeResult<Props> {
    let node = rsc_wire::decode(text)
        .map_err(|err| RuntimeError::InvalidProps(err.to_string()))?;
    match node {
        Node::Object(props) => Ok(props),
        other => Err(RuntimeError::InvalidProps(format!(
            "expected an object, got {}",
            other.type_name()
        ))),
    }
}
