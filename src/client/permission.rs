//! Price list access probe.
//!
//! Access is granted when the price list object metadata record is readable. The first
//! conclusive answer is kept for the life of the client; a session restart picks up
//! grant or revoke changes.

use super::{headers, map_http_error, PartnerClient};
use crate::context::AuthContext;
use crate::error::ApiError;
use crate::query::{Dto, Query, QueryRequest};
use crate::records::{dashed_uuid, UnifiedPersonRow};
use tracing::{debug, info, warn};

const ORG_LEVEL_ALLOCATIONS_PATH: &str = "/cloud-org-level-service/api/v1/levels/allocations";

/// Memoized outcome of the access probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PartnerClient {
    /// Whether the current user may use the price list feature.
    ///
    /// Errors are not memoized; the next call probes again.
    pub async fn can_access_price_list(&self) -> Result<bool, ApiError> {
        let mut state = self.permission.lock().await;
        match *state {
            PermissionState::Granted => return Ok(true),
            PermissionState::Denied => return Ok(false),
            PermissionState::Unknown => {}
        }

        let context = self.context().await?;
        let unified_person_id = self.resolve_unified_person_id(&context).await?;
        let dashed = dashed_uuid(&unified_person_id)?;
        self.log_org_level_allocations(&dashed).await;

        let query = Query::new("SELECT um.id AS id FROM UdoMeta um WHERE um.name = :name")
            .bind_text("name", self.config.permissions.price_list_udo_meta_name.as_str())?;
        let request = QueryRequest::new(vec![Dto::UdoMeta], query).with_page(1, 1);
        let response = self.send_query(&request).await?;

        let granted = response.status().is_success();
        *state = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        info!(
            granted,
            status = response.status().as_u16(),
            "Price list access evaluated"
        );
        Ok(granted)
    }

    pub async fn permission_state(&self) -> PermissionState {
        *self.permission.lock().await
    }

    async fn resolve_unified_person_id(&self, context: &AuthContext) -> Result<String, ApiError> {
        let query = Query::new(
            "SELECT up.id AS unifiedPersonId FROM UnifiedPerson up \
             WHERE up.userName = :userName LIMIT 1",
        )
        .bind_text("userName", context.user.as_str())?;

        self.query_rows::<UnifiedPersonRow>(
            "UnifiedPerson",
            &QueryRequest::new(vec![Dto::UnifiedPerson], query),
        )
        .await?
        .into_iter()
        .next()
        .map(|row| row.unified_person_id)
        .ok_or_else(|| ApiError::PersonNotResolvable(context.user.clone()))
    }

    /// Org-level allocations of the user. Diagnostic only: logged, never part of the
    /// access decision, and its failures are not propagated.
    async fn log_org_level_allocations(&self, dashed_unified_person_id: &str) {
        let result = async {
            let context = self.context().await?;
            let headers = headers::org_level(&context, &self.config.client)?;
            let url = format!("{}{}", self.config.api.base(), ORG_LEVEL_ALLOCATIONS_PATH);
            let response = self
                .http
                .get(&url)
                .headers(headers)
                .query(&[
                    ("unifiedPersonId", dashed_unified_person_id),
                    ("includeSubLevels", "false"),
                ])
                .send()
                .await
                .map_err(map_http_error)?;
            let status = response.status();
            let body = response.text().await.map_err(map_http_error)?;
            Ok::<_, ApiError>((status, body))
        }
        .await;

        match result {
            Ok((status, body)) if status.is_success() => {
                debug!(status = status.as_u16(), body = %body, "Org-level allocations");
            }
            Ok((status, _)) => {
                warn!(status = status.as_u16(), "Org-level allocation lookup failed");
            }
            Err(e) => {
                warn!(error = %e, "Org-level allocation lookup failed");
            }
        }
    }
}
