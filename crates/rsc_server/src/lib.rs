//! # RSC Server
//!
//! The server half of the server-component protocol.
//!
//! ## Architecture
//!
//! ```text
//! path ──► Router ──► root node ──► Evaluator ──► rsc_wire::encode
//!                                                       │
//!                         document (path == "/") ◄──────┼──► application/json
//! ```
//!
//! The [`Evaluator`] invokes every composite it meets, concurrently across
//! siblings, and stops at client boundaries: a composite carrying the
//! boundary prop is replaced by a reference to its client module and its
//! implementation is never run here.
//!
//! ## Usage
//!
//! ```ignore
//! let renderer = ResponseRenderer::new(my_router, ResponderConfig::default());
//! let response = renderer.respond("/", Props::new()).await?;
//! println!("{}: {}", response.content_type, response.body);
//! ```

pub mod evaluator;
pub mod response;
pub mod router;

pub use evaluator::{Evaluator, EvaluatorConfig};
pub use response::{RenderedResponse, ResponderConfig, ResponseRenderer, DOCUMENT_CONTENT_TYPE};
pub use rsc_wire::BOOTSTRAP_GLOBAL;
pub use router::{RouteRequest, Router};

use rsc_core::{ComponentError, StructuralError};
use rsc_wire::WireError;
use thiserror::Error;

/// Evaluation errors
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Component `{component}` failed: {source}")]
    Implementation {
        component: String,
        source: ComponentError,
    },
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Response rendering errors
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error("Encoding failed: {0}")]
    Wire(#[from] WireError),
}

pub type ResponseResult<T> = Result<T, ResponseError>;
