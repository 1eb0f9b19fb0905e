use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use shared::{
    domain::{PreferredContact, Submission, SubmissionId, SubmissionInput},
    protocol::{ListParams, PaginatedSubmissions},
};
use tokio::sync::{oneshot, Mutex};

use crate::{error::ClientError, SubmissionsApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Network,
    Status(u16, &'static str),
    MissingId,
}

impl Failure {
    fn into_error(self) -> ClientError {
        match self {
            Self::Network => ClientError::Network("connection refused".to_string()),
            Self::Status(status, body) => ClientError::from_status(status, body),
            Self::MissingId => ClientError::MissingId,
        }
    }
}

#[derive(Default)]
struct FakeState {
    rows: Vec<Submission>,
    next_id: i64,
    list_calls: Vec<ListParams>,
    create_calls: Vec<SubmissionInput>,
    update_calls: Vec<(SubmissionId, SubmissionInput)>,
    delete_calls: Vec<SubmissionId>,
    failures: HashMap<Op, VecDeque<Failure>>,
    list_gates: VecDeque<oneshot::Receiver<()>>,
}

/// In-memory collection with the backend's search/offset semantics.
#[derive(Default)]
pub(crate) struct FakeSubmissionsApi {
    inner: Mutex<FakeState>,
}

pub(crate) fn timestamp() -> chrono::DateTime<chrono::Utc> {
    "2024-01-01T00:00:00Z".parse().expect("timestamp")
}

pub(crate) fn sample_submission(id: i64, full_name: &str, email: &str) -> Submission {
    Submission {
        id: SubmissionId(id),
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone_number: "5551234567".to_string(),
        age: 30,
        address: Some("1 Main St".to_string()),
        preferred_contact: PreferredContact::Email,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

impl FakeSubmissionsApi {
    pub(crate) fn with_rows(rows: Vec<Submission>) -> Self {
        let next_id = rows.iter().map(|row| row.id.0).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(FakeState {
                rows,
                next_id,
                ..FakeState::default()
            }),
        }
    }

    /// `count` rows with ids `1..=count`, listed in id order.
    pub(crate) fn seeded(count: i64) -> Self {
        Self::with_rows(
            (1..=count)
                .map(|i| sample_submission(i, &format!("Person {i}"), &format!("person{i}@example.com")))
                .collect(),
        )
    }

    pub(crate) async fn fail_next(&self, op: Op, failure: Failure) {
        self.inner
            .lock()
            .await
            .failures
            .entry(op)
            .or_default()
            .push_back(failure);
    }

    /// The next list call computes its page immediately but does not return
    /// until the sender fires.
    pub(crate) async fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().await.list_gates.push_back(rx);
        tx
    }

    pub(crate) async fn list_calls(&self) -> Vec<ListParams> {
        self.inner.lock().await.list_calls.clone()
    }

    pub(crate) async fn create_calls(&self) -> Vec<SubmissionInput> {
        self.inner.lock().await.create_calls.clone()
    }

    pub(crate) async fn update_calls(&self) -> Vec<(SubmissionId, SubmissionInput)> {
        self.inner.lock().await.update_calls.clone()
    }

    pub(crate) async fn delete_calls(&self) -> Vec<SubmissionId> {
        self.inner.lock().await.delete_calls.clone()
    }
}

fn take_failure(state: &mut FakeState, op: Op) -> Option<ClientError> {
    state
        .failures
        .get_mut(&op)
        .and_then(VecDeque::pop_front)
        .map(Failure::into_error)
}

fn record_from_input(id: SubmissionId, input: &SubmissionInput) -> Submission {
    Submission {
        id,
        full_name: input.full_name.clone(),
        email: input.email.clone(),
        phone_number: input.phone_number.clone(),
        age: input.age,
        address: input.address.clone(),
        preferred_contact: input.preferred_contact,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[async_trait]
impl SubmissionsApi for FakeSubmissionsApi {
    async fn list(&self, params: &ListParams) -> Result<PaginatedSubmissions, ClientError> {
        let (result, gate) = {
            let mut guard = self.inner.lock().await;
            guard.list_calls.push(params.clone());
            let gate = guard.list_gates.pop_front();
            let result = match take_failure(&mut guard, Op::List) {
                Some(err) => Err(err),
                None => {
                    let needle = params.search.as_deref().map(str::to_lowercase);
                    let matching: Vec<Submission> = guard
                        .rows
                        .iter()
                        .filter(|row| match &needle {
                            Some(needle) => {
                                row.full_name.to_lowercase().contains(needle)
                                    || row.email.to_lowercase().contains(needle)
                            }
                            None => true,
                        })
                        .cloned()
                        .collect();
                    let total = matching.len() as u64;
                    let items = matching
                        .into_iter()
                        .skip(params.skip as usize)
                        .take(params.limit as usize)
                        .collect();
                    Ok(PaginatedSubmissions { total, items })
                }
            };
            (result, gate)
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }

    async fn get(&self, id: SubmissionId) -> Result<Submission, ClientError> {
        let guard = self.inner.lock().await;
        guard
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or_else(|| ClientError::from_status(404, r#"{"detail":"Submission not found"}"#))
    }

    async fn create(&self, input: &SubmissionInput) -> Result<Submission, ClientError> {
        let mut guard = self.inner.lock().await;
        guard.create_calls.push(input.clone());
        if let Some(err) = take_failure(&mut guard, Op::Create) {
            return Err(err);
        }
        let id = SubmissionId(guard.next_id);
        guard.next_id += 1;
        let record = record_from_input(id, input);
        guard.rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: SubmissionId,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError> {
        let mut guard = self.inner.lock().await;
        guard.update_calls.push((id, input.clone()));
        if let Some(err) = take_failure(&mut guard, Op::Update) {
            return Err(err);
        }
        let record = record_from_input(id, input);
        let slot = guard
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| ClientError::from_status(404, r#"{"detail":"Submission not found"}"#))?;
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: SubmissionId) -> Result<(), ClientError> {
        let mut guard = self.inner.lock().await;
        guard.delete_calls.push(id);
        if let Some(err) = take_failure(&mut guard, Op::Delete) {
            return Err(err);
        }
        let before = guard.rows.len();
        guard.rows.retain(|row| row.id != id);
        if guard.rows.len() == before {
            return Err(ClientError::from_status(
                404,
                r#"{"detail":"Submission not found"}"#,
            ));
        }
        Ok(())
    }
}
