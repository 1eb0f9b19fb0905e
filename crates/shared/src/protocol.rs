use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{PreferredContact, Submission, SubmissionId},
    error::RecordError,
};

pub const SUBMISSIONS_PATH: &str = "/api/submissions/";
pub const PAGE_SIZES: [u32; 4] = [5, 10, 20, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub fn is_valid_page_size(limit: u32) -> bool {
    PAGE_SIZES.contains(&limit)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedSubmissions {
    pub total: u64,
    pub items: Vec<Submission>,
}

/// Create/update response decoded without trusting the server to have
/// filled in the server-assigned fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRecord {
    #[serde(default)]
    pub id: Option<SubmissionId>,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub age: i64,
    #[serde(default)]
    pub address: Option<String>,
    pub preferred_contact: PreferredContact,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubmissionRecord> for Submission {
    type Error = RecordError;

    fn try_from(value: SubmissionRecord) -> Result<Self, Self::Error> {
        let id = value.id.ok_or(RecordError::MissingId)?;
        let created_at = value
            .created_at
            .ok_or(RecordError::MissingField("created_at"))?;
        let updated_at = value
            .updated_at
            .ok_or(RecordError::MissingField("updated_at"))?;
        Ok(Self {
            id,
            full_name: value.full_name,
            email: value.email,
            phone_number: value.phone_number,
            age: value.age,
            address: value.address,
            preferred_contact: value.preferred_contact,
            created_at,
            updated_at,
        })
    }
}

/// Page/size/search triple the list view is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn params(&self) -> ListParams {
        let page = u64::from(self.page.max(1));
        ListParams {
            skip: (page - 1) * u64::from(self.limit),
            limit: self.limit,
            search: self.search.clone().filter(|term| !term.is_empty()),
        }
    }
}

/// Query string for `GET /api/submissions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub skip: u64,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
