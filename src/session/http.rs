//! A [RemoteStore] backed by the HTTP collection endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    RecordId,
    api::{ApiResponse, DeleteBody},
    session::{Record, RemoteStore, SyncError},
};

/// Talks to the collection endpoints over HTTP, translating the response
/// envelope into [SyncError]s.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a store targeting `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, collection: &str) -> String {
        format!("{}/api/{collection}", self.base_url)
    }

    /// Unwrap a response envelope carrying a payload.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Server {
                status,
                message: Self::error_message(response).await,
            });
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|error| SyncError::Malformed(error.to_string()))?;

        if !envelope.success {
            return Err(SyncError::Server {
                status,
                message: envelope.error.unwrap_or_default(),
            });
        }

        envelope
            .data
            .ok_or_else(|| SyncError::Malformed("success envelope without data".to_string()))
    }

    /// Unwrap a response envelope with no payload.
    async fn decode_empty(response: Response) -> Result<(), SyncError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Server {
                status,
                message: Self::error_message(response).await,
            });
        }

        let envelope: ApiResponse<()> = response
            .json()
            .await
            .map_err(|error| SyncError::Malformed(error.to_string()))?;

        if !envelope.success {
            return Err(SyncError::Server {
                status,
                message: envelope.error.unwrap_or_default(),
            });
        }

        Ok(())
    }

    async fn error_message(response: Response) -> String {
        response
            .json::<ApiResponse<()>>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| "the server reported an error".to_string())
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list<R: Record>(&self) -> Result<Vec<R>, SyncError> {
        let response = self.client.get(self.url(R::COLLECTION)).send().await?;

        Self::decode(response).await
    }

    async fn create<R: Record>(&self, draft: &R::New) -> Result<R, SyncError> {
        let response = self
            .client
            .post(self.url(R::COLLECTION))
            .json(draft)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn replace<R: Record>(&self, record: &R) -> Result<R, SyncError> {
        let response = self
            .client
            .put(self.url(R::COLLECTION))
            .json(record)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn remove<R: Record>(&self, id: RecordId) -> Result<(), SyncError> {
        let response = self
            .client
            .delete(self.url(R::COLLECTION))
            .json(&DeleteBody { id })
            .send()
            .await?;

        Self::decode_empty(response).await
    }
}
