//! # RSC Wire
//!
//! Text encoding of evaluated element trees.
//!
//! The codec maps a serializable tree onto JSON and back. Element kinds are
//! told apart by the reserved [`ELEMENT_MARKER`] field; array order and prop
//! order survive the trip, and `decode(encode(t)) == t` for every tree the
//! server evaluator produces. Module paths are carried as opaque strings.
//!
//! ## Usage
//!
//! ```ignore
//! let text = rsc_wire::encode(&evaluated)?;
//! // ... transport ...
//! let tree = rsc_wire::decode(&text)?;
//! ```

pub mod codec;

pub use codec::{
    decode, encode, encode_pretty, from_value, script_safe, to_value, ELEMENT_MARKER, MAX_DEPTH,
};

use thiserror::Error;

/// Content type of a bare payload response
pub const CONTENT_TYPE: &str = "application/json";

/// Global a document assigns its embedded payload to
pub const BOOTSTRAP_GLOBAL: &str = "__INITIAL_CLIENT_JSX_STRING__";

/// Wire codec errors
#[derive(Debug, Error)]
pub enum WireError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Cannot serialize {0}")]
    Unserializable(String),
}

pub type WireResult<T> = Result<T, WireError>;
