//! Properties of the cached context validity window

use partner_link::context::CachedContext;
use partner_link::{AuthContext, AuthToken};
use proptest::prelude::*;

fn context(expires_in: u64) -> AuthContext {
    AuthContext {
        auth: AuthToken {
            access_token: "token".to_string(),
            expires_in,
            token_type: None,
        },
        account: "acme".to_string(),
        account_id: "101".to_string(),
        company: "acme-pl".to_string(),
        company_id: "202".to_string(),
        user: "jan.kowalski".to_string(),
    }
}

/// A context is valid strictly before `acquired + expires_in * 1000 - margin`
#[test]
fn test_validity_window_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                0i64..4_000_000_000_000,
                0u64..1_000_000,
                0i64..60_000,
            ),
            |(acquired, expires_in, margin)| {
                let cached = CachedContext::new(context(expires_in), acquired, margin);
                let valid_until = acquired + expires_in as i64 * 1000 - margin;

                prop_assert_eq!(cached.acquired_at_ms(), acquired);
                prop_assert_eq!(cached.valid_until_ms(), valid_until);
                prop_assert!(cached.is_valid_at(valid_until - 1));
                prop_assert!(!cached.is_valid_at(valid_until));
                prop_assert!(!cached.is_valid_at(valid_until + 1));
                Ok(())
            },
        )
        .unwrap();
}

/// Absurd lifetimes saturate instead of overflowing
#[test]
fn test_huge_lifetime_does_not_overflow() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(u64::MAX / 2..=u64::MAX), |expires_in| {
            let cached = CachedContext::new(context(expires_in), 1_700_000_000_000, 3000);
            prop_assert!(cached.is_valid_at(i64::MAX - 3001));
            Ok(())
        })
        .unwrap();
}
