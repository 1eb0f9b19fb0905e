use std::sync::Arc;

use serde::Serialize;
use shared::domain::{Submission, SubmissionId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    list::ListController,
    notify::Notifier,
    validation::{validate, Field, FieldErrors, FormDraft, ValidSubmissionInput},
    SubmissionsApi,
};

pub const CREATED_MESSAGE: &str = "Submission created successfully";
pub const UPDATED_MESSAGE: &str = "Submission updated successfully";
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Form Not Submitted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Idle,
    Editing(SubmissionId),
    /// `resume` is where the form returns if the request fails.
    Submitting { resume: Option<SubmissionId> },
}

impl FormMode {
    pub fn editing_id(self) -> Option<SubmissionId> {
        match self {
            Self::Editing(id) => Some(id),
            Self::Submitting { resume } => resume,
            Self::Idle => None,
        }
    }

    pub fn is_submitting(self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    fn settled(resume: Option<SubmissionId>) -> Self {
        resume.map_or(Self::Idle, Self::Editing)
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form has invalid fields: {0}")]
    Invalid(FieldErrors),
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ClientError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub draft: FormDraft,
    pub mode: FormMode,
    pub field_errors: FieldErrors,
    pub message: Option<String>,
    pub error: Option<String>,
}

struct FormState {
    draft: FormDraft,
    mode: FormMode,
    field_errors: FieldErrors,
    message: Option<String>,
    error: Option<String>,
}

impl FormState {
    fn empty() -> Self {
        Self {
            draft: FormDraft::default(),
            mode: FormMode::Idle,
            field_errors: FieldErrors::default(),
            message: None,
            error: None,
        }
    }
}

/// Edit buffer plus the create/update state machine around it.
pub struct FormController {
    api: Arc<dyn SubmissionsApi>,
    list: Arc<ListController>,
    notifier: Arc<Notifier>,
    state: Mutex<FormState>,
}

impl FormController {
    pub fn new(
        api: Arc<dyn SubmissionsApi>,
        list: Arc<ListController>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            api,
            list,
            notifier,
            state: Mutex::new(FormState::empty()),
        }
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        let guard = self.state.lock().await;
        FormSnapshot {
            draft: guard.draft.clone(),
            mode: guard.mode,
            field_errors: guard.field_errors.clone(),
            message: guard.message.clone(),
            error: guard.error.clone(),
        }
    }

    pub async fn mode(&self) -> FormMode {
        self.state.lock().await.mode
    }

    pub async fn set_field(&self, field: Field, value: impl Into<String>) {
        let mut guard = self.state.lock().await;
        guard.draft.set(field, value);
        guard.field_errors.remove(field);
    }

    /// Runs the schema against the buffer and records the field errors.
    pub async fn validate(&self) -> Result<ValidSubmissionInput, FieldErrors> {
        let mut guard = self.state.lock().await;
        let result = validate(&guard.draft);
        guard.field_errors = result.as_ref().err().cloned().unwrap_or_default();
        result
    }

    /// Seeds the buffer from `submission`, replacing every field.
    pub async fn begin_edit(&self, submission: &Submission) -> Result<(), SubmitError> {
        let mut guard = self.state.lock().await;
        if guard.mode.is_submitting() {
            return Err(SubmitError::AlreadySubmitting);
        }
        *guard = FormState {
            draft: FormDraft::from(submission),
            mode: FormMode::Editing(submission.id),
            ..FormState::empty()
        };
        debug!(id = submission.id.0, "editing submission");
        Ok(())
    }

    pub async fn cancel_edit(&self) -> Result<(), SubmitError> {
        let mut guard = self.state.lock().await;
        if guard.mode.is_submitting() {
            return Err(SubmitError::AlreadySubmitting);
        }
        *guard = FormState::empty();
        Ok(())
    }

    /// Validates the buffer and creates or updates depending on edit mode.
    pub async fn submit(&self) -> Result<Submission, SubmitError> {
        let (valid, resume) = {
            let mut guard = self.state.lock().await;
            if guard.mode.is_submitting() {
                return Err(SubmitError::AlreadySubmitting);
            }
            match validate(&guard.draft) {
                Err(errors) => {
                    guard.field_errors = errors.clone();
                    return Err(SubmitError::Invalid(errors));
                }
                Ok(valid) => {
                    let resume = guard.mode.editing_id();
                    guard.field_errors = FieldErrors::default();
                    guard.message = None;
                    guard.error = None;
                    guard.mode = FormMode::Submitting { resume };
                    (valid, resume)
                }
            }
        };

        let result = match resume {
            Some(id) => self.api.update(id, valid.as_input()).await,
            None => self.api.create(valid.as_input()).await,
        };

        match result {
            Ok(submission) => {
                let message = if resume.is_some() {
                    UPDATED_MESSAGE
                } else {
                    CREATED_MESSAGE
                };
                {
                    let mut guard = self.state.lock().await;
                    *guard = FormState {
                        message: Some(message.to_string()),
                        ..FormState::empty()
                    };
                }
                info!(id = submission.id.0, updated = resume.is_some(), "submission saved");
                self.notifier.success(message).await;
                self.refresh_list().await;
                Ok(submission)
            }
            Err(err) => {
                let message = err.user_message(SUBMIT_FALLBACK_MESSAGE);
                {
                    let mut guard = self.state.lock().await;
                    guard.mode = FormMode::settled(resume);
                    guard.error = Some(message.clone());
                }
                warn!(error = %err, "submission failed");
                self.notifier.error(message.clone()).await;
                // The request itself succeeded, so the server may hold a new row.
                if matches!(err, ClientError::MissingId) {
                    self.refresh_list().await;
                }
                Err(SubmitError::Rejected {
                    message,
                    source: err,
                })
            }
        }
    }

    async fn refresh_list(&self) {
        if let Err(err) = self.list.refresh().await {
            debug!(error = %err, "list refresh after form submit failed");
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
