use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Submission, SubmissionId, SubmissionInput},
    protocol::{ListParams, PaginatedSubmissions, SubmissionRecord, SUBMISSIONS_PATH},
};
use tracing::{debug, warn};

use crate::{error::ClientError, SubmissionsApi};

/// `reqwest`-backed access to `/api/submissions/`.
#[derive(Clone)]
pub struct HttpSubmissionsClient {
    http: Client,
    base_url: String,
}

impl HttpSubmissionsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{SUBMISSIONS_PATH}", self.base_url)
    }

    fn item_url(&self, id: SubmissionId) -> String {
        format!("{}{SUBMISSIONS_PATH}{}", self.base_url, id.0)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = ClientError::from_status(status.as_u16(), &body);
    warn!(status = status.as_u16(), error = %err, "submissions request failed");
    Err(err)
}

async fn decode_record(response: Response) -> Result<Submission, ClientError> {
    let record: SubmissionRecord = response.json().await?;
    Ok(Submission::try_from(record)?)
}

#[async_trait]
impl SubmissionsApi for HttpSubmissionsClient {
    async fn list(&self, params: &ListParams) -> Result<PaginatedSubmissions, ClientError> {
        debug!(skip = params.skip, limit = params.limit, search = ?params.search, "listing submissions");
        let response = self
            .http
            .get(self.collection_url())
            .query(params)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn get(&self, id: SubmissionId) -> Result<Submission, ClientError> {
        let response = self.http.get(self.item_url(id)).send().await?;
        decode_record(ensure_success(response).await?).await
    }

    async fn create(&self, input: &SubmissionInput) -> Result<Submission, ClientError> {
        let response = self
            .http
            .post(self.collection_url())
            .json(input)
            .send()
            .await?;
        decode_record(ensure_success(response).await?).await
    }

    async fn update(
        &self,
        id: SubmissionId,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError> {
        let response = self.http.put(self.item_url(id)).json(input).send().await?;
        decode_record(ensure_success(response).await?).await
    }

    async fn delete(&self, id: SubmissionId) -> Result<(), ClientError> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
