//! Bootstrap payload hand-off
//!
//! The server document embeds the first payload as
//! `window.__INITIAL_CLIENT_JSX_STRING__ = <payload>;`. A [`BootstrapSlot`]
//! carries that text to client start-up: it is filled once, read once, and
//! stays consumed afterwards.

use parking_lot::Mutex;
use rsc_core::Node;
use rsc_wire::{WireError, BOOTSTRAP_GLOBAL};
use thiserror::Error;

use crate::loader::ModuleLoader;
use crate::resolver::{ResolveError, Resolver};

/// Bootstrap errors
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Bootstrap slot already filled")]
    AlreadyFilled,

    #[error("Bootstrap payload already consumed")]
    AlreadyConsumed,

    #[error("Bootstrap slot is empty")]
    Empty,

    #[error("Document carries no bootstrap payload")]
    MissingPayload,

    #[error("Bootstrap payload is malformed: {0}")]
    Decode(#[from] WireError),

    #[error("Bootstrap tree failed to resolve: {0}")]
    Resolve(#[from] ResolveError),
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[derive(Debug)]
enum SlotState {
    Empty,
    Filled(String),
    Consumed,
}

/// Write-once, read-once holder of the bootstrap payload
#[derive(Debug)]
pub struct BootstrapSlot {
    state: Mutex<SlotState>,
}

impl Default for BootstrapSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Empty),
        }
    }

    /// Create a slot already holding `payload`
    pub fn filled(payload: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SlotState::Filled(payload.into())),
        }
    }

    /// Create a slot from the payload embedded in a server document
    pub fn from_document(html: &str) -> BootstrapResult<Self> {
        extract_payload(html)
            .map(Self::filled)
            .ok_or(BootstrapError::MissingPayload)
    }

    /// Store the payload
    pub fn fill(&self, payload: impl Into<String>) -> BootstrapResult<()> {
        let mut state = self.state.lock();
        if !matches!(*state, SlotState::Empty) {
            return Err(BootstrapError::AlreadyFilled);
        }
        *state = SlotState::Filled(payload.into());
        Ok(())
    }

    /// Take the payload out, leaving the slot consumed
    pub fn take(&self) -> BootstrapResult<String> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, SlotState::Consumed) {
            SlotState::Filled(payload) => Ok(payload),
            SlotState::Empty => {
                *state = SlotState::Empty;
                Err(BootstrapError::Empty)
            }
            SlotState::Consumed => Err(BootstrapError::AlreadyConsumed),
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Filled(_))
    }

    pub fn is_consumed(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Consumed)
    }
}

/// Find the payload a server document assigns to the bootstrap global
pub fn extract_payload(html: &str) -> Option<&str> {
    let assignment = format!("window.{} = ", BOOTSTRAP_GLOBAL);
    let start = html.find(&assignment)? + assignment.len();
    let rest = &html[start..];
    let end = rest.find(";</script>")?;
    Some(&rest[..end])
}

/// Take the bootstrap payload, decode it and resolve its client modules
pub async fn hydrate<L: ModuleLoader>(
    slot: &BootstrapSlot,
    resolver: &Resolver<L>,
) -> BootstrapResult<Node> {
    let payload = slot.take()?;
    log::debug!("Hydrating from {} bytes of bootstrap payload", payload.len());
    let tree = rsc_wire::decode(&payload)?;
    Ok(resolver.resolve(tree).await?)
}
