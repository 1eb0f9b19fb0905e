use async_trait::async_trait;
use shared::{
    domain::{Submission, SubmissionId, SubmissionInput},
    protocol::{ListParams, PaginatedSubmissions},
};

pub mod config;
pub mod delete;
pub mod error;
pub mod form;
pub mod http;
pub mod list;
pub mod notify;
pub mod validation;
pub mod workbench;

pub use config::{load_settings, ClientSettings};
pub use delete::{DeleteError, DeleteFlow, DeleteSnapshot};
pub use error::ClientError;
pub use form::{FormController, FormMode, FormSnapshot, SubmitError};
pub use http::HttpSubmissionsClient;
pub use list::{FetchOutcome, ListController, ListError, ListSnapshot};
pub use notify::{Notification, NotificationKind, Notifier};
pub use validation::{validate, Field, FieldErrors, FormDraft, ValidSubmissionInput};
pub use workbench::{Workbench, WorkbenchSnapshot};

/// The remote submissions collection.
#[async_trait]
pub trait SubmissionsApi: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<PaginatedSubmissions, ClientError>;
    async fn get(&self, id: SubmissionId) -> Result<Submission, ClientError>;
    async fn create(&self, input: &SubmissionInput) -> Result<Submission, ClientError>;
    async fn update(
        &self,
        id: SubmissionId,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError>;
    async fn delete(&self, id: SubmissionId) -> Result<(), ClientError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
