//! Integration tests for context acquisition through the shell

use super::test_utils::{harness, harness_with, ScriptedShell, EVENT, START_MS};
use partner_link::{ApiError, CancellationToken, PartnerConfig, ShellError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use wiremock::MockServer;

#[tokio::test]
async fn test_context_is_reused_until_expiry_then_refreshed() {
    let server = MockServer::start().await;
    let h = harness(&server);

    let first = h.client.context().await.unwrap();
    assert_eq!(first.auth.access_token, "token-1");

    let cached = h.client.context_provider().cached().unwrap();
    assert_eq!(cached.acquired_at_ms(), START_MS);
    assert_eq!(cached.valid_until_ms(), START_MS + 3600 * 1000 - 3000);

    h.clock.set(cached.valid_until_ms() - 1);
    let reused = h.client.context().await.unwrap();
    assert_eq!(reused.auth.access_token, "token-1");
    assert_eq!(h.shell.handshake_count(), 1);

    h.clock.set(cached.valid_until_ms() + 1);
    let refreshed = h.client.context().await.unwrap();
    assert_eq!(refreshed.auth.access_token, "token-2");
    assert_eq!(h.shell.handshake_count(), 2);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_handshake() {
    let server = MockServer::start().await;
    let h = harness(&server);

    let a = Arc::clone(&h.client);
    let b = Arc::clone(&h.client);
    let (first, second) = tokio::join!(
        async move { a.context().await },
        async move { b.context().await }
    );

    assert_eq!(first.unwrap().auth.access_token, "token-1");
    assert_eq!(second.unwrap().auth.access_token, "token-1");
    assert_eq!(h.shell.handshake_count(), 1);
    assert_eq!(h.client.context_provider().refresh_count(), 1);
}

#[tokio::test]
async fn test_listener_is_removed_after_each_handshake() {
    let server = MockServer::start().await;
    let h = harness(&server);

    h.client.context().await.unwrap();
    h.clock.advance(3600 * 1000);
    h.client.context().await.unwrap();

    // only the scripted shell's own request listener is left
    assert_eq!(h.shell.shell.listener_count(EVENT), 1);
}

#[tokio::test]
async fn test_silent_shell_times_out() {
    let mut config = PartnerConfig::default();
    config.shell.handshake_timeout_ms = 50;
    let h = harness_with(config, ScriptedShell::silent());

    let err = h.client.context().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Shell(ShellError::Timeout { timeout_ms: 50, .. })
    ));
    assert!(h.client.context_provider().cached().is_none());
    assert_eq!(h.shell.shell.listener_count(EVENT), 0);
}

#[tokio::test]
async fn test_pending_request_can_be_cancelled() {
    let h = harness_with(PartnerConfig::default(), ScriptedShell::silent());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = h.client.context_with_cancel(&cancel).await.unwrap_err();
    assert!(matches!(err, ApiError::Shell(ShellError::Cancelled)));
}

#[tokio::test]
async fn test_shell_can_only_be_set_once() {
    let server = MockServer::start().await;
    let h = harness(&server);

    let again = h.client.set_shell_sdk(ScriptedShell::silent().shell);
    assert!(matches!(
        again,
        Err(ApiError::Shell(ShellError::AlreadyInitialized))
    ));
}

#[tokio::test]
async fn test_derived_headers_and_search_params() {
    let server = MockServer::start().await;
    let h = harness(&server);

    let headers = h.client.headers().await.unwrap();
    assert_eq!(headers[AUTHORIZATION], "Bearer token-1");
    assert_eq!(headers[CONTENT_TYPE], "application/json");

    let org = h.client.org_level_headers().await.unwrap();
    assert_eq!(org["x-account-id"], "101");
    assert_eq!(org["x-company-id"], "202");
    assert!(!org.contains_key(CONTENT_TYPE));

    let params = h.client.search_params().await.unwrap();
    assert_eq!(params.account, "acme");
    assert_eq!(params.company, "acme-pl");

    // all derived from one cached context
    assert_eq!(h.shell.handshake_count(), 1);
}
