//! Partner Link: shell-negotiated context and query client
//!
//! Obtains an authentication context from the host shell over its event bus, keeps it
//! for its validity window, and issues typed read-only queries (custom field metadata,
//! business partners, persons) plus a feature access probe against the remote query API.
//!
//! ```no_run
//! use partner_link::{InProcessShell, PartnerClient, PartnerConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), partner_link::ApiError> {
//! let client = PartnerClient::new(PartnerConfig::default())?;
//! client.set_shell_sdk(Arc::new(InProcessShell::new()))?;
//! let fields = client.fetch_udf_meta("Cennik_part").await?;
//! # let _ = fields;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod query;
pub mod records;
pub mod shell;

pub use client::{PartnerClient, PermissionState};
pub use config::{ConfigLoader, PartnerConfig};
pub use context::{AuthContext, AuthToken, ManualClock, SearchParams, SystemClock};
pub use error::{ApiError, ShellError};
pub use records::{
    business_partner_map, dashed_uuid, BusinessPartner, BusinessPartnerFilter, Person, UdfMeta,
    UdfMetaSummary,
};
pub use shell::{InProcessShell, ShellSdk};
pub use tokio_util::sync::CancellationToken;
