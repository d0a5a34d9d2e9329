//! Host Shell Abstraction
//!
//! The host shell is an external event bus: the client emits an event and later receives
//! a response on the same event name. [`ShellSdk`] is the seam an embedding application
//! implements over its actual bridge; [`InProcessShell`] is an in-memory implementation.

use crate::error::ShellError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

pub mod bus;
pub mod events;
pub mod handshake;

pub use bus::InProcessShell;
pub use events::{AuthRequest, ContextRequest};
pub use handshake::{request_context, HandshakeOptions};

/// Handler invoked with the raw (JSON text) payload of a shell event
pub type ShellHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Identifies one registered listener so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Event bus exposed by the host shell
#[async_trait]
pub trait ShellSdk: Send + Sync {
    /// Emit an event with a JSON payload
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ShellError>;

    /// Register a handler for an event
    fn on(&self, event: &str, handler: ShellHandler) -> Result<ListenerId, ShellError>;

    /// Remove a previously registered handler. Unknown ids are ignored.
    fn off(&self, event: &str, listener: ListenerId);
}

/// Holds the shell handle, which can be installed exactly once
#[derive(Default)]
pub struct ShellSlot {
    inner: OnceLock<Arc<dyn ShellSdk>>,
}

impl ShellSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, sdk: Arc<dyn ShellSdk>) -> Result<(), ShellError> {
        self.inner
            .set(sdk)
            .map_err(|_| ShellError::AlreadyInitialized)
    }

    pub fn get(&self) -> Result<Arc<dyn ShellSdk>, ShellError> {
        self.inner.get().cloned().ok_or(ShellError::NotInitialized)
    }

    pub fn is_set(&self) -> bool {
        self.inner.get().is_some()
    }
}

impl std::fmt::Debug for ShellSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSlot")
            .field("initialized", &self.is_set())
            .finish()
    }
}
