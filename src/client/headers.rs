//! Header sets derived from a context.

use crate::config::ClientIdentity;
use crate::context::AuthContext;
use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

pub const X_CLIENT_ID: &str = "x-client-id";
pub const X_CLIENT_VERSION: &str = "x-client-version";
pub const X_ACCOUNT_ID: &str = "x-account-id";
pub const X_COMPANY_ID: &str = "x-company-id";

const APPLICATION_JSON: &str = "application/json";

fn value(name: &'static str, raw: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(raw).map_err(|e| ApiError::InvalidHeader {
        name,
        message: e.to_string(),
    })
}

fn with_auth_and_client(
    context: &AuthContext,
    identity: &ClientIdentity,
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let mut bearer = value("Authorization", &context.bearer())?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(
        HeaderName::from_static(X_CLIENT_ID),
        value("X-Client-ID", &identity.id)?,
    );
    headers.insert(
        HeaderName::from_static(X_CLIENT_VERSION),
        value("X-Client-Version", &identity.version)?,
    );
    Ok(headers)
}

/// Headers for the query API
pub fn standard(context: &AuthContext, identity: &ClientIdentity) -> Result<HeaderMap, ApiError> {
    let mut headers = with_auth_and_client(context, identity)?;
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    Ok(headers)
}

/// Headers for the org-level service, which rejects the JSON content type header and
/// wants the tenant ids instead.
pub fn org_level(context: &AuthContext, identity: &ClientIdentity) -> Result<HeaderMap, ApiError> {
    let mut headers = with_auth_and_client(context, identity)?;
    headers.insert(
        HeaderName::from_static(X_ACCOUNT_ID),
        value("X-Account-ID", &context.account_id)?,
    );
    headers.insert(
        HeaderName::from_static(X_COMPANY_ID),
        value("X-Company-ID", &context.company_id)?,
    );
    Ok(headers)
}
