//! In-process shell event bus.
//!
//! Dispatch is synchronous: `emit` serializes the payload once and calls every handler
//! registered for the event, outside the registry lock, so a handler may register or
//! remove listeners itself.

use super::events::is_context_request;
use super::{ListenerId, ShellHandler, ShellSdk};
use crate::error::ShellError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct InProcessShell {
    listeners: Mutex<HashMap<String, Vec<(ListenerId, ShellHandler)>>>,
    next_id: AtomicU64,
    emitted: AtomicU64,
}

impl InProcessShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a raw payload to every listener of `event`
    pub fn deliver(&self, event: &str, payload: &str) {
        let handlers: Vec<ShellHandler> = self
            .listeners
            .lock()
            .get(event)
            .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        for handler in handlers {
            handler(payload);
        }
    }

    /// Shell side of the handshake: a stream of the context requests emitted on `event`.
    ///
    /// The forwarding listener stays registered for the lifetime of the bus.
    pub fn requests(&self, event: &str) -> mpsc::UnboundedReceiver<Value> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handler: ShellHandler = Arc::new(move |payload: &str| {
            if let Ok(value) = serde_json::from_str::<Value>(payload) {
                if is_context_request(&value) {
                    let _ = sender.send(value);
                }
            }
        });
        self.register(event, handler);
        receiver
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }

    /// Number of `emit` calls so far
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::SeqCst)
    }

    fn register(&self, event: &str, handler: ShellHandler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        id
    }
}

#[async_trait]
impl ShellSdk for InProcessShell {
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ShellError> {
        let text = serde_json::to_string(&payload).map_err(|e| ShellError::EmitFailed {
            event: event.to_string(),
            message: e.to_string(),
        })?;
        self.emitted.fetch_add(1, Ordering::SeqCst);
        self.deliver(event, &text);
        Ok(())
    }

    fn on(&self, event: &str, handler: ShellHandler) -> Result<ListenerId, ShellError> {
        Ok(self.register(event, handler))
    }

    fn off(&self, event: &str, listener: ListenerId) {
        let mut listeners = self.listeners.lock();
        if let Some(entries) = listeners.get_mut(event) {
            entries.retain(|(id, _)| *id != listener);
            if entries.is_empty() {
                listeners.remove(event);
            }
        }
    }
}

impl std::fmt::Debug for InProcessShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(event, entries)| (event.as_str(), entries.len()))
            .collect();
        f.debug_struct("InProcessShell")
            .field("listeners", &counts)
            .field("emitted", &self.emitted_count())
            .finish()
    }
}
