use std::sync::Arc;

use serde::Serialize;
use shared::domain::SubmissionId;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{error::ClientError, list::ListController, notify::Notifier, SubmissionsApi};

pub const DELETED_MESSAGE: &str = "Submission deleted successfully";
pub const DELETE_FALLBACK_MESSAGE: &str = "Error deleting submission";

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("a delete is already in flight")]
    InFlight,
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ClientError,
    },
}

/// `message` and `error` describe the last confirmed delete and outlive its toast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSnapshot {
    pub pending: Option<SubmissionId>,
    pub in_flight: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Two-step delete: a request only arms the prompt, the confirm sends it.
pub struct DeleteFlow {
    api: Arc<dyn SubmissionsApi>,
    list: Arc<ListController>,
    notifier: Arc<Notifier>,
    state: Mutex<DeleteSnapshot>,
}

impl DeleteFlow {
    pub fn new(
        api: Arc<dyn SubmissionsApi>,
        list: Arc<ListController>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            api,
            list,
            notifier,
            state: Mutex::new(DeleteSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> DeleteSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn pending(&self) -> Option<SubmissionId> {
        self.state.lock().await.pending
    }

    pub async fn request_delete(&self, id: SubmissionId) -> Result<(), DeleteError> {
        let mut guard = self.state.lock().await;
        if guard.in_flight {
            return Err(DeleteError::InFlight);
        }
        guard.pending = Some(id);
        guard.message = None;
        guard.error = None;
        debug!(id = id.0, "delete requested; awaiting confirmation");
        Ok(())
    }

    /// Returns the cleared id, or `None` if nothing was pending.
    pub async fn cancel_delete(&self) -> Result<Option<SubmissionId>, DeleteError> {
        let mut guard = self.state.lock().await;
        if guard.in_flight {
            return Err(DeleteError::InFlight);
        }
        Ok(guard.pending.take())
    }

    /// Deletes the pending id. The pending id is cleared whether or not the
    /// server accepted the delete.
    pub async fn confirm_delete(&self) -> Result<Option<SubmissionId>, DeleteError> {
        let id = {
            let mut guard = self.state.lock().await;
            if guard.in_flight {
                return Err(DeleteError::InFlight);
            }
            let Some(id) = guard.pending else {
                return Ok(None);
            };
            guard.in_flight = true;
            id
        };

        let result = self.api.delete(id).await;
        let outcome = result.map_err(|err| (err.user_message(DELETE_FALLBACK_MESSAGE), err));

        {
            let mut guard = self.state.lock().await;
            guard.in_flight = false;
            guard.pending = None;
            match &outcome {
                Ok(()) => guard.message = Some(DELETED_MESSAGE.to_string()),
                Err((message, _)) => guard.error = Some(message.clone()),
            }
        }

        match outcome {
            Ok(()) => {
                info!(id = id.0, "submission deleted");
                self.notifier.success(DELETED_MESSAGE).await;
                if let Err(err) = self.list.refresh().await {
                    debug!(error = %err, "list refresh after delete failed");
                }
                Ok(Some(id))
            }
            Err((message, err)) => {
                warn!(id = id.0, error = %err, "delete failed");
                self.notifier.error(message.clone()).await;
                Err(DeleteError::Rejected {
                    message,
                    source: err,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/delete_tests.rs"]
mod tests;
