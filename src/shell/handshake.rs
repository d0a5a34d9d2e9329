//! Correlated context handshake.
//!
//! One request, one listener, one answer: the listener is registered before the request
//! is emitted, only accepts the response carrying this request's correlation id, and is
//! removed again however the wait ends (answer, timeout, cancellation or error).

use super::events::{correlation_id, is_context_request, ContextRequest};
use super::{ListenerId, ShellHandler, ShellSdk};
use crate::config::PartnerConfig;
use crate::context::AuthContext;
use crate::error::ShellError;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Settings for a single context request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeOptions {
    pub event: String,
    pub client_id: String,
    pub timeout: Duration,
    pub accept_uncorrelated: bool,
}

impl HandshakeOptions {
    pub fn from_config(config: &PartnerConfig) -> Self {
        Self {
            event: config.shell.context_event.clone(),
            client_id: config.client.id.clone(),
            timeout: config.shell.handshake_timeout(),
            accept_uncorrelated: config.shell.accept_uncorrelated,
        }
    }
}

type Reply = Result<AuthContext, ShellError>;

/// What a listener makes of one payload on the context event
#[derive(Debug)]
enum Received {
    Ignored(&'static str),
    Answer(Reply),
}

fn classify(payload: &str, expected: &str, accept_uncorrelated: bool) -> Received {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => return Received::Ignored("payload is not JSON"),
    };

    if is_context_request(&value) {
        return Received::Ignored("context request");
    }

    match correlation_id(&value) {
        Some(id) if id != expected => return Received::Ignored("correlation id mismatch"),
        None if !accept_uncorrelated => return Received::Ignored("missing correlation id"),
        _ => {}
    }

    Received::Answer(
        serde_json::from_value::<AuthContext>(value)
            .map_err(|e| ShellError::MalformedContext(e.to_string())),
    )
}

/// Removes the listener when the wait ends, however it ends.
struct ListenerGuard<'a> {
    sdk: &'a dyn ShellSdk,
    event: &'a str,
    listener: ListenerId,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.sdk.off(self.event, self.listener);
    }
}

/// Ask the shell for a fresh context and wait for the matching answer.
pub async fn request_context(
    sdk: &dyn ShellSdk,
    options: &HandshakeOptions,
    cancel: &CancellationToken,
) -> Result<AuthContext, ShellError> {
    let correlation = Uuid::new_v4().to_string();
    let (sender, receiver) = oneshot::channel::<Reply>();
    let pending = Arc::new(Mutex::new(Some(sender)));

    let handler: ShellHandler = {
        let pending = Arc::clone(&pending);
        let expected = correlation.clone();
        let accept_uncorrelated = options.accept_uncorrelated;
        Arc::new(move |payload: &str| {
            match classify(payload, &expected, accept_uncorrelated) {
                Received::Ignored(reason) => {
                    trace!(correlation_id = %expected, reason, "Ignoring shell payload");
                }
                Received::Answer(reply) => {
                    if let Err(ref e) = reply {
                        warn!(correlation_id = %expected, error = %e, "Shell answered with a malformed context");
                    }
                    if let Some(sender) = pending.lock().take() {
                        let _ = sender.send(reply);
                    }
                }
            }
        })
    };

    let listener = sdk.on(&options.event, handler)?;
    let _guard = ListenerGuard {
        sdk,
        event: &options.event,
        listener,
    };

    debug!(event = %options.event, correlation_id = %correlation, "Requesting context");
    let request = ContextRequest::new(options.client_id.clone(), correlation.clone());
    let payload = serde_json::to_value(&request).map_err(|e| ShellError::EmitFailed {
        event: options.event.clone(),
        message: e.to_string(),
    })?;
    // the deadline covers the emit as well as the wait for the answer
    let exchange = async {
        sdk.emit(&options.event, payload).await?;
        receiver.await.map_err(|_| ShellError::ListenerClosed)?
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ShellError::Cancelled),
        outcome = tokio::time::timeout(options.timeout, exchange) => match outcome {
            Ok(reply) => {
                if reply.is_ok() {
                    debug!(correlation_id = %correlation, "Received context");
                }
                reply
            }
            Err(_) => Err(ShellError::Timeout {
                event: options.event.clone(),
                timeout_ms: options.timeout.as_millis() as u64,
            }),
        },
    }
}
