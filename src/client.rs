//! Query Client Facade
//!
//! [`PartnerClient`] owns the context provider, the HTTP client and the per-client caches.
//! Every operation obtains a currently valid context first, so callers never deal with
//! expiry or the shell handshake. Share one client per session behind an `Arc`.

use crate::config::PartnerConfig;
use crate::context::{AuthContext, Clock, ContextProvider, SearchParams, SystemClock};
use crate::error::ApiError;
use crate::query::{dto_list, Dto, Query, QueryRequest};
use crate::records::{
    business_partner_map, BusinessPartner, BusinessPartnerFilter, Person, QueryResponse, UdfMeta,
    UdfMetaSummary,
};
use crate::shell::ShellSdk;
use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub mod headers;
mod permission;

pub use permission::PermissionState;

const QUERY_PATH: &str = "/api/query/v1";

fn map_http_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Http(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::Http(format!("Connection error: {}", error))
    } else {
        ApiError::Http(format!("HTTP error: {}", error))
    }
}

fn build_http_client(config: &PartnerConfig) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(config.api.connect_timeout())
        .timeout(config.api.request_timeout())
        .build()
        .map_err(|e| ApiError::Http(format!("Failed to create HTTP client: {}", e)))
}

pub struct PartnerClient {
    http: Client,
    config: PartnerConfig,
    context: ContextProvider,
    /// Person records are immutable reference data; entries are never evicted
    persons: RwLock<HashMap<String, Person>>,
    permission: tokio::sync::Mutex<PermissionState>,
}

impl PartnerClient {
    pub fn new(config: PartnerConfig) -> Result<Self, ApiError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: PartnerConfig, clock: Arc<dyn Clock>) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        Ok(Self {
            http: build_http_client(&config)?,
            context: ContextProvider::new(&config, clock),
            config,
            persons: RwLock::new(HashMap::new()),
            permission: tokio::sync::Mutex::new(PermissionState::Unknown),
        })
    }

    pub fn config(&self) -> &PartnerConfig {
        &self.config
    }

    /// Install the shell handle. Must happen once, before anything needs a context.
    pub fn set_shell_sdk(&self, sdk: Arc<dyn ShellSdk>) -> Result<(), ApiError> {
        Ok(self.context.set_shell_sdk(sdk)?)
    }

    pub fn shell_sdk(&self) -> Result<Arc<dyn ShellSdk>, ApiError> {
        Ok(self.context.shell_sdk()?)
    }

    pub fn context_provider(&self) -> &ContextProvider {
        &self.context
    }

    pub async fn context(&self) -> Result<Arc<AuthContext>, ApiError> {
        Ok(self.context.context().await?)
    }

    /// Like [`PartnerClient::context`], abandoning a pending handshake when `cancel` fires
    pub async fn context_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<AuthContext>, ApiError> {
        Ok(self.context.context_with_cancel(cancel).await?)
    }

    /// Headers for the query API
    pub async fn headers(&self) -> Result<HeaderMap, ApiError> {
        let context = self.context().await?;
        headers::standard(&context, &self.config.client)
    }

    /// Headers for the org-level service
    pub async fn org_level_headers(&self) -> Result<HeaderMap, ApiError> {
        let context = self.context().await?;
        headers::org_level(&context, &self.config.client)
    }

    pub async fn search_params(&self) -> Result<SearchParams, ApiError> {
        Ok(self.context().await?.search_params())
    }

    /// Field metadata of the object metadata record named `udo_meta_name`
    pub async fn fetch_udf_meta(&self, udo_meta_name: &str) -> Result<Vec<UdfMeta>, ApiError> {
        let query = Query::new(
            "SELECT udf_meta.id AS id, udf_meta.description AS description, \
             udf_meta.name AS name, udo_meta.id AS udoMetaId \
             FROM UdoMeta udo_meta \
             JOIN UdfMeta udf_meta ON udf_meta.id IN udo_meta.udfMetas \
             WHERE udo_meta.name = :udoMetaName",
        )
        .bind_text("udoMetaName", udo_meta_name)?;

        self.query_rows(
            "UdfMeta",
            &QueryRequest::new(vec![Dto::UdfMeta, Dto::UdoMeta], query),
        )
        .await
    }

    /// Field metadata for the given field names. The list must not be empty.
    pub async fn fetch_udf_meta_by_field_names<S: AsRef<str>>(
        &self,
        field_names: &[S],
    ) -> Result<Vec<UdfMetaSummary>, ApiError> {
        let query = Query::new(
            "SELECT udf_meta.id AS id, udf_meta.description AS description, \
             udf_meta.name AS name \
             FROM UdfMeta udf_meta \
             WHERE udf_meta.name IN (:fieldNames)",
        )
        .bind_list("fieldNames", field_names)?;

        self.query_rows("UdfMeta", &QueryRequest::new(vec![Dto::UdfMeta], query))
            .await
    }

    pub async fn fetch_business_partners(
        &self,
        filter: &BusinessPartnerFilter,
    ) -> Result<Vec<BusinessPartner>, ApiError> {
        let mut template =
            String::from("SELECT bp.id AS id, bp.name AS name FROM BusinessPartner bp");
        let mut conditions = Vec::new();
        if filter.person_id.is_some() {
            template.push_str(" JOIN Person p ON bp.id = p.businessPartner");
            conditions.push("p.id = :personId");
        }
        if filter.crowd_type.is_some() {
            conditions.push("bp.crowdType = :crowdType");
        }
        if !conditions.is_empty() {
            template.push_str(" WHERE ");
            template.push_str(&conditions.join(" AND "));
        }

        let mut query = Query::new(template);
        if let Some(ref person_id) = filter.person_id {
            query = query.bind_text("personId", person_id.as_str())?;
        }
        if let Some(ref crowd_type) = filter.crowd_type {
            query = query.bind_text("crowdType", crowd_type.as_str())?;
        }

        self.query_rows(
            "BusinessPartners",
            &QueryRequest::new(vec![Dto::BusinessPartner, Dto::Person], query),
        )
        .await
    }

    /// All business partners as `name -> id`
    pub async fn fetch_business_partner_map(&self) -> Result<HashMap<String, String>, ApiError> {
        let partners = self
            .fetch_business_partners(&BusinessPartnerFilter::all())
            .await?;
        Ok(business_partner_map(&partners))
    }

    /// Person by id, served from the cache after the first successful fetch
    pub async fn fetch_person(&self, person_id: &str) -> Result<Person, ApiError> {
        let cached = self.persons.read().get(person_id).cloned();
        if let Some(person) = cached {
            return Ok(person);
        }

        let query = Query::new(
            "SELECT p.id AS id, p.crowdType AS crowdType, \
             p.firstName AS firstName, p.lastName AS lastName \
             FROM Person p WHERE p.id = :personId",
        )
        .bind_text("personId", person_id)?;

        let person = self
            .query_rows::<Person>("person", &QueryRequest::new(vec![Dto::Person], query))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::PersonNotFound(person_id.to_string()))?;

        self.persons
            .write()
            .insert(person_id.to_string(), person.clone());
        Ok(person)
    }

    pub fn cached_person_count(&self) -> usize {
        self.persons.read().len()
    }

    /// POST a query and hand back the raw response, whatever its status
    async fn send_query(&self, request: &QueryRequest) -> Result<reqwest::Response, ApiError> {
        let text = request.render()?;
        let context = self.context().await?;
        let headers = headers::standard(&context, &self.config.client)?;

        let search = context.search_params();
        let mut params = vec![("account", search.account), ("company", search.company)];
        params.extend(request.params());

        let url = format!("{}{}", self.config.api.base(), QUERY_PATH);
        debug!(dtos = %dto_list(&request.dtos), "Posting query");
        self.http
            .post(&url)
            .headers(headers)
            .query(&params)
            .json(&json!({ "query": text }))
            .send()
            .await
            .map_err(map_http_error)
    }

    async fn query_rows<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        request: &QueryRequest,
    ) -> Result<Vec<T>, ApiError> {
        let response = self.send_query(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::FetchFailed {
                resource,
                status: status.as_u16(),
            });
        }

        let body: QueryResponse<T> = response.json().await.map_err(|e| ApiError::Decode {
            resource,
            message: e.to_string(),
        })?;
        Ok(body.data)
    }
}

impl std::fmt::Debug for PartnerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerClient")
            .field("base_url", &self.config.api.base_url)
            .field("context", &self.context)
            .field("cached_persons", &self.cached_person_count())
            .finish()
    }
}
