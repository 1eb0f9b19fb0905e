use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::{normalize_api_base, ClientSettings},
    delete::{DeleteFlow, DeleteSnapshot},
    form::{FormController, FormSnapshot},
    http::HttpSubmissionsClient,
    list::{ListController, ListSnapshot},
    notify::{Notification, Notifier},
    SubmissionsApi,
};

/// Everything the UI renders, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbenchSnapshot {
    pub form: FormSnapshot,
    pub list: ListSnapshot,
    pub delete: DeleteSnapshot,
    pub toast: Option<Notification>,
}

/// One form, one list and one delete prompt over a shared API handle.
pub struct Workbench {
    api: Arc<dyn SubmissionsApi>,
    notifier: Arc<Notifier>,
    list: Arc<ListController>,
    form: FormController,
    deletes: DeleteFlow,
}

impl Workbench {
    pub fn new(api: Arc<dyn SubmissionsApi>, settings: &ClientSettings) -> Self {
        let notifier = Arc::new(Notifier::new(settings.toast_duration()));
        let list = Arc::new(ListController::with_settings(
            Arc::clone(&api),
            Arc::clone(&notifier),
            settings.search_debounce(),
            settings.default_page_size,
        ));
        let form = FormController::new(Arc::clone(&api), Arc::clone(&list), Arc::clone(&notifier));
        let deletes = DeleteFlow::new(Arc::clone(&api), Arc::clone(&list), Arc::clone(&notifier));
        Self {
            api,
            notifier,
            list,
            form,
            deletes,
        }
    }

    /// Builds a workbench talking HTTP to `settings.api_base`.
    pub fn connect(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base = normalize_api_base(&settings.api_base)?;
        Ok(Self::new(Arc::new(HttpSubmissionsClient::new(base)), settings))
    }

    pub fn api(&self) -> &Arc<dyn SubmissionsApi> {
        &self.api
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn list(&self) -> &ListController {
        &self.list
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn deletes(&self) -> &DeleteFlow {
        &self.deletes
    }

    pub async fn snapshot(&self) -> WorkbenchSnapshot {
        WorkbenchSnapshot {
            form: self.form.snapshot().await,
            list: self.list.snapshot().await,
            delete: self.deletes.snapshot().await,
            toast: self.notifier.active().await,
        }
    }
}

#[cfg(test)]
#[path = "tests/workbench_tests.rs"]
mod tests;
