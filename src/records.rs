//! Records returned by the query API.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query API response body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse<T> {
    pub data: Vec<T>,
}

/// Custom field metadata together with the object metadata that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UdfMeta {
    pub id: String,
    pub udo_meta_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Custom field metadata looked up by field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdfMetaSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessPartner {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub crowd_type: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnifiedPersonRow {
    pub unified_person_id: String,
}

/// Optional filters for the business partner query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessPartnerFilter {
    pub crowd_type: Option<String>,
    /// Only the partner linked to this person
    pub person_id: Option<String>,
}

impl BusinessPartnerFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn crowd_type(mut self, crowd_type: impl Into<String>) -> Self {
        self.crowd_type = Some(crowd_type.into());
        self
    }

    pub fn person(mut self, person_id: impl Into<String>) -> Self {
        self.person_id = Some(person_id.into());
        self
    }
}

/// Fold partners into `name -> id`. A repeated name keeps the id of its last occurrence.
pub fn business_partner_map(partners: &[BusinessPartner]) -> HashMap<String, String> {
    partners
        .iter()
        .map(|p| (p.name.clone(), p.id.clone()))
        .collect()
}

/// Format a 32-digit hex identifier as 8-4-4-4-12, keeping its letter case.
///
/// An identifier that is already in the dashed 8-4-4-4-12 form is accepted as is.
pub fn dashed_uuid(id: &str) -> Result<String, ApiError> {
    let invalid = || ApiError::InvalidUnifiedPersonId(id.to_string());

    let digits = match id.len() {
        32 => id.to_string(),
        36 => {
            let bytes = id.as_bytes();
            let dashes_in_place = DASH_OFFSETS.iter().all(|&i| bytes[i] == b'-');
            if !dashes_in_place {
                return Err(invalid());
            }
            id.replace('-', "")
        }
        _ => return Err(invalid()),
    };
    if digits.len() != 32 || hex::decode(&digits).is_err() {
        return Err(invalid());
    }

    Ok(format!(
        "{}-{}-{}-{}-{}",
        &digits[0..8],
        &digits[8..12],
        &digits[12..16],
        &digits[16..20],
        &digits[20..32]
    ))
}

/// Byte offsets of the dashes in the 36-character form
const DASH_OFFSETS: [usize; 4] = [8, 13, 18, 23];
