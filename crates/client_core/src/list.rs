use std::{sync::Arc, time::Duration};

use serde::Serialize;
use shared::{
    domain::Submission,
    protocol::{is_valid_page_size, ListQuery, PaginatedSubmissions, DEFAULT_PAGE_SIZE, PAGE_SIZES},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{error::ClientError, notify::Notifier, SubmissionsApi};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch submissions";
pub const FETCH_ERROR_TOAST: &str = "Failed to fetch submissions. Please try again later.";

pub fn has_previous(page: u32) -> bool {
    page > 1
}

pub fn has_next(page: u32, limit: u32, total: u64) -> bool {
    u64::from(page) * u64::from(limit) < total
}

pub fn page_count(limit: u32, total: u64) -> u64 {
    if limit == 0 {
        return 1;
    }
    total.div_ceil(u64::from(limit)).max(1)
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("page size {0} is not one of {sizes:?}", sizes = PAGE_SIZES)]
    InvalidPageSize(u32),
    #[error("pages start at 1")]
    InvalidPage,
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result of a fetch that completed without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { total: u64, count: usize },
    /// A newer fetch was issued while this one was in flight; its result was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub query: ListQuery,
    pub search_input: String,
    pub items: Vec<Submission>,
    pub total: u64,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub has_previous: bool,
    pub has_next: bool,
    pub page_count: u64,
}

struct FetchTicket {
    token: u64,
    query: ListQuery,
}

struct ListState {
    query: ListQuery,
    search_input: String,
    search_revision: u64,
    items: Vec<Submission>,
    total: u64,
    loaded: bool,
    error: Option<String>,
    latest_token: u64,
    pending_token: Option<u64>,
}

impl ListState {
    fn issue_ticket(&mut self) -> FetchTicket {
        self.latest_token += 1;
        self.pending_token = Some(self.latest_token);
        FetchTicket {
            token: self.latest_token,
            query: self.query.clone(),
        }
    }

    fn is_latest(&self, token: u64) -> bool {
        token == self.latest_token
    }
}

/// Paginated, searchable view over the remote collection.
///
/// Displayed items and total only change when a fetch completes. Fetches are
/// last-request-wins: each one carries a sequence token and a completion
/// is applied only if no newer fetch has been issued since.
pub struct ListController {
    api: Arc<dyn SubmissionsApi>,
    notifier: Arc<Notifier>,
    debounce: Duration,
    state: Mutex<ListState>,
}

impl ListController {
    pub fn new(api: Arc<dyn SubmissionsApi>, notifier: Arc<Notifier>) -> Self {
        Self::with_settings(api, notifier, DEFAULT_SEARCH_DEBOUNCE, DEFAULT_PAGE_SIZE)
    }

    pub fn with_settings(
        api: Arc<dyn SubmissionsApi>,
        notifier: Arc<Notifier>,
        debounce: Duration,
        page_size: u32,
    ) -> Self {
        let limit = if is_valid_page_size(page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self {
            api,
            notifier,
            debounce,
            state: Mutex::new(ListState {
                query: ListQuery {
                    page: 1,
                    limit,
                    search: None,
                },
                search_input: String::new(),
                search_revision: 0,
                items: Vec::new(),
                total: 0,
                loaded: false,
                error: None,
                latest_token: 0,
                pending_token: None,
            }),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub async fn query(&self) -> ListQuery {
        self.state.lock().await.query.clone()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let guard = self.state.lock().await;
        let query = guard.query.clone();
        ListSnapshot {
            has_previous: has_previous(query.page),
            has_next: has_next(query.page, query.limit, guard.total),
            page_count: page_count(query.limit, guard.total),
            query,
            search_input: guard.search_input.clone(),
            items: guard.items.clone(),
            total: guard.total,
            loaded: guard.loaded,
            loading: guard.pending_token.is_some(),
            error: guard.error.clone(),
        }
    }

    /// Refetches the current query as-is.
    pub async fn refresh(&self) -> Result<FetchOutcome, ListError> {
        let ticket = self.state.lock().await.issue_ticket();
        self.run_fetch(ticket).await
    }

    /// Fetches an explicit query, making it the current one.
    pub async fn fetch_page(&self, query: ListQuery) -> Result<FetchOutcome, ListError> {
        if !is_valid_page_size(query.limit) {
            return Err(ListError::InvalidPageSize(query.limit));
        }
        if query.page == 0 {
            return Err(ListError::InvalidPage);
        }
        let ticket = {
            let mut guard = self.state.lock().await;
            guard.query = query;
            guard.issue_ticket()
        };
        self.run_fetch(ticket).await
    }

    /// Debounced search. Returns `Ok(false)` when a later call superseded
    /// this one or the effective term did not change.
    pub async fn search(&self, term: impl Into<String>) -> Result<bool, ListError> {
        let term = term.into();
        let revision = {
            let mut guard = self.state.lock().await;
            guard.search_input = term.clone();
            guard.search_revision += 1;
            guard.search_revision
        };

        tokio::time::sleep(self.debounce).await;

        let ticket = {
            let mut guard = self.state.lock().await;
            if guard.search_revision != revision {
                debug!(term = %term, "search input superseded before debounce elapsed");
                return Ok(false);
            }
            let trimmed = term.trim();
            let next = (!trimmed.is_empty()).then(|| trimmed.to_string());
            if guard.query.search == next {
                return Ok(false);
            }
            guard.query.search = next;
            guard.query.page = 1;
            guard.issue_ticket()
        };

        let outcome = self.run_fetch(ticket).await?;
        Ok(matches!(outcome, FetchOutcome::Applied { .. }))
    }

    pub async fn next_page(&self) -> Result<bool, ListError> {
        let ticket = {
            let mut guard = self.state.lock().await;
            if !has_next(guard.query.page, guard.query.limit, guard.total) {
                return Ok(false);
            }
            guard.query.page += 1;
            guard.issue_ticket()
        };
        self.run_fetch(ticket).await?;
        Ok(true)
    }

    pub async fn previous_page(&self) -> Result<bool, ListError> {
        let ticket = {
            let mut guard = self.state.lock().await;
            if !has_previous(guard.query.page) {
                return Ok(false);
            }
            guard.query.page -= 1;
            guard.issue_ticket()
        };
        self.run_fetch(ticket).await?;
        Ok(true)
    }

    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, ListError> {
        if page == 0 {
            return Err(ListError::InvalidPage);
        }
        let ticket = {
            let mut guard = self.state.lock().await;
            guard.query.page = page;
            guard.issue_ticket()
        };
        self.run_fetch(ticket).await
    }

    /// Changes the page size and jumps back to page 1.
    pub async fn set_page_size(&self, limit: u32) -> Result<FetchOutcome, ListError> {
        if !is_valid_page_size(limit) {
            return Err(ListError::InvalidPageSize(limit));
        }
        let ticket = {
            let mut guard = self.state.lock().await;
            guard.query.limit = limit;
            guard.query.page = 1;
            guard.issue_ticket()
        };
        self.run_fetch(ticket).await
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Result<FetchOutcome, ListError> {
        let params = ticket.query.params();
        let result = self.api.list(&params).await;
        self.complete_fetch(ticket.token, result).await
    }

    async fn complete_fetch(
        &self,
        token: u64,
        result: Result<PaginatedSubmissions, ClientError>,
    ) -> Result<FetchOutcome, ListError> {
        let mut guard = self.state.lock().await;
        if !guard.is_latest(token) {
            debug!(
                token,
                latest = guard.latest_token,
                "discarding stale list response"
            );
            return Ok(FetchOutcome::Stale);
        }
        guard.pending_token = None;

        match result {
            Ok(page) => {
                let outcome = FetchOutcome::Applied {
                    total: page.total,
                    count: page.items.len(),
                };
                guard.items = page.items;
                guard.total = page.total;
                guard.loaded = true;
                guard.error = None;
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch submissions");
                guard.error = Some(FETCH_ERROR_MESSAGE.to_string());
                drop(guard);
                self.notifier.error(FETCH_ERROR_TOAST).await;
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
