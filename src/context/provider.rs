//! Keeps a valid context at hand, refreshing it from the shell when it goes stale.

use super::{AuthContext, CachedContext, Clock};
use crate::config::PartnerConfig;
use crate::error::ShellError;
use crate::shell::{request_context, HandshakeOptions, ShellSdk, ShellSlot};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct ContextProvider {
    shell: ShellSlot,
    options: HandshakeOptions,
    margin_ms: i64,
    clock: Arc<dyn Clock>,
    /// Replaced wholesale on every refresh
    current: RwLock<Option<CachedContext>>,
    /// Serializes refreshes so concurrent callers share one handshake
    refresh: tokio::sync::Mutex<()>,
    refreshes: AtomicU64,
}

impl ContextProvider {
    pub fn new(config: &PartnerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shell: ShellSlot::new(),
            options: HandshakeOptions::from_config(config),
            margin_ms: config.shell.expiry_margin_ms,
            clock,
            current: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(()),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Install the shell handle. Allowed once.
    pub fn set_shell_sdk(&self, sdk: Arc<dyn ShellSdk>) -> Result<(), ShellError> {
        self.shell.set(sdk)
    }

    pub fn shell_sdk(&self) -> Result<Arc<dyn ShellSdk>, ShellError> {
        self.shell.get()
    }

    /// The cached context, valid or not
    pub fn cached(&self) -> Option<CachedContext> {
        self.current.read().clone()
    }

    /// Number of completed handshakes
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub async fn context(&self) -> Result<Arc<AuthContext>, ShellError> {
        self.context_with_cancel(&CancellationToken::new()).await
    }

    /// Return the cached context if still valid, otherwise run the handshake.
    pub async fn context_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<AuthContext>, ShellError> {
        if let Some(context) = self.fresh() {
            return Ok(context);
        }

        let sdk = self.shell.get()?;
        let _refresh = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ShellError::Cancelled),
            guard = self.refresh.lock() => guard,
        };

        // another caller may have refreshed while we waited
        if let Some(context) = self.fresh() {
            return Ok(context);
        }

        let context = request_context(sdk.as_ref(), &self.options, cancel).await?;
        let cached = CachedContext::new(context, self.clock.now_ms(), self.margin_ms);
        info!(
            account = %cached.context().account,
            company = %cached.context().company,
            valid_until_ms = cached.valid_until_ms(),
            "Context refreshed"
        );

        let context = cached.context();
        *self.current.write() = Some(cached);
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(context)
    }

    fn fresh(&self) -> Option<Arc<AuthContext>> {
        let now = self.clock.now_ms();
        self.current
            .read()
            .as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(CachedContext::context)
    }
}

impl std::fmt::Debug for ContextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextProvider")
            .field("shell", &self.shell)
            .field("options", &self.options)
            .field("margin_ms", &self.margin_ms)
            .field("cached", &self.current.read().is_some())
            .finish()
    }
}
