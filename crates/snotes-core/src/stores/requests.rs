//! Incoming share requests for notes the current user owns.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{RequestStatus, ShareAction, ShareRequest};

#[derive(Debug, Clone, Default)]
pub struct RequestList {
    requests: Vec<ShareRequest>,
}

impl RequestList {
    #[must_use]
    pub const fn from_requests(requests: Vec<ShareRequest>) -> Self {
        Self { requests }
    }

    #[must_use]
    pub fn all(&self) -> &[ShareRequest] {
        &self.requests
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ShareRequest> {
        self.requests.iter().find(|request| request.id == id)
    }

    #[must_use]
    pub fn pending(&self) -> Vec<ShareRequest> {
        self.with_status(RequestStatus::Pending)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|request| request.is_pending())
            .count()
    }

    #[must_use]
    pub fn with_status(&self, status: RequestStatus) -> Vec<ShareRequest> {
        self.requests
            .iter()
            .filter(|request| request.status == status)
            .cloned()
            .collect()
    }

    /// Grouped by status, every status present even when empty
    #[must_use]
    pub fn by_status(&self) -> BTreeMap<RequestStatus, Vec<ShareRequest>> {
        RequestStatus::ALL
            .into_iter()
            .map(|status| (status, self.with_status(status)))
            .collect()
    }

    pub fn set_status(&mut self, id: &str, status: RequestStatus) -> Result<()> {
        let request = self
            .requests
            .iter_mut()
            .find(|request| request.id == id)
            .ok_or_else(|| Error::NotFound(format!("request {id}")))?;
        request.status = status;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<ShareRequest> {
        let index = self
            .requests
            .iter()
            .position(|request| request.id == id)
            .ok_or_else(|| Error::NotFound(format!("request {id}")))?;
        Ok(self.requests.remove(index))
    }
}

#[derive(Clone)]
pub struct RequestsStore {
    api: ApiClient,
    list: Arc<Mutex<RequestList>>,
}

impl RequestsStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            list: Arc::new(Mutex::new(RequestList::default())),
        }
    }

    /// Newest first.
    pub async fn fetch(&self) -> Result<Vec<ShareRequest>> {
        let mut requests = self.api.share_requests().await?;
        requests.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        *self.list.lock().await = RequestList::from_requests(requests.clone());
        Ok(requests)
    }

    pub async fn accept(&self, id: &str) -> Result<()> {
        self.respond(id, ShareAction::Accept).await
    }

    pub async fn reject(&self, id: &str) -> Result<()> {
        self.respond(id, ShareAction::Reject).await
    }

    /// The local status changes only after the backend accepts the answer.
    async fn respond(&self, id: &str, action: ShareAction) -> Result<()> {
        if self.list.lock().await.get(id).is_none() {
            return Err(Error::NotFound(format!("request {id}")));
        }
        self.api.respond_share_request(id, action).await?;
        let status = action.resulting_status();
        self.list.lock().await.set_status(id, status)?;
        tracing::info!("Request {} {}", id, status);
        Ok(())
    }

    /// Remove from the local view only.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.list.lock().await.remove(id)?;
        Ok(())
    }

    pub async fn snapshot(&self) -> RequestList {
        self.list.lock().await.clone()
    }

    pub async fn pending(&self) -> Vec<ShareRequest> {
        self.list.lock().await.pending()
    }

    pub async fn pending_count(&self) -> usize {
        self.list.lock().await.pending_count()
    }
}
