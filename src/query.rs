//! Query API requests
//!
//! A request names the versioned DTO schemas it reads, carries the query text and
//! optionally a page window. Query text is built from templates with bound, validated
//! values (see [`builder`]); caller-supplied strings never reach the text unchecked.

pub mod builder;

pub use builder::{Query, QueryValue};

use crate::error::ApiError;

/// DTO schemas understood by the query API, with the versions this client speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dto {
    UdfMeta,
    UdoMeta,
    BusinessPartner,
    Person,
    UnifiedPerson,
}

impl Dto {
    pub fn name(self) -> &'static str {
        match self {
            Dto::UdfMeta => "UdfMeta",
            Dto::UdoMeta => "UdoMeta",
            Dto::BusinessPartner => "BusinessPartner",
            Dto::Person => "Person",
            Dto::UnifiedPerson => "UnifiedPerson",
        }
    }

    pub fn version(self) -> u32 {
        match self {
            Dto::UdfMeta => 19,
            Dto::UdoMeta => 9,
            Dto::BusinessPartner => 23,
            Dto::Person => 24,
            Dto::UnifiedPerson => 12,
        }
    }

    /// `Name.version`, e.g. `UdfMeta.19`
    pub fn versioned(self) -> String {
        format!("{}.{}", self.name(), self.version())
    }
}

/// `dtos` query parameter value: versioned names joined by `;`
pub fn dto_list(dtos: &[Dto]) -> String {
    dtos.iter()
        .map(|dto| dto.versioned())
        .collect::<Vec<_>>()
        .join(";")
}

/// Page window for the query API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub size: u32,
    pub number: u32,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub dtos: Vec<Dto>,
    pub query: Query,
    pub page: Option<Page>,
}

impl QueryRequest {
    pub fn new(dtos: Vec<Dto>, query: Query) -> Self {
        Self {
            dtos,
            query,
            page: None,
        }
    }

    pub fn with_page(mut self, size: u32, number: u32) -> Self {
        self.page = Some(Page { size, number });
        self
    }

    /// Query-string parameters beyond the tenant ones
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("dtos", dto_list(&self.dtos))];
        if let Some(page) = self.page {
            params.push(("pageSize", page.size.to_string()));
            params.push(("page", page.number.to_string()));
        }
        params
    }

    pub fn render(&self) -> Result<String, ApiError> {
        if self.dtos.is_empty() {
            return Err(ApiError::InvalidQuery(
                "a query request needs at least one DTO".to_string(),
            ));
        }
        self.query.render()
    }
}
