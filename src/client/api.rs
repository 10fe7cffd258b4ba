//! HTTP client for the ordering endpoints plus the SSE event subscription
//!
//! Thin typed wrappers over `reqwest`: each method posts one request DTO and
//! decodes one response DTO. Errors carry the backend's JSON error body when
//! one was sent. [`OrderingApi::subscribe`] spawns a background task that
//! keeps an SSE connection alive with exponential-backoff reconnects and
//! forwards decoded [`BoardEvent`]s over an unbounded channel.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::event::{BoardEvent, RankedId};
use crate::shared::item::{Board, Card, Column};
use crate::shared::protocol::{
    BoardSnapshot, CreateBoardRequest, CreateCardRequest, CreateColumnRequest, MoveCardRequest,
    MoveColumnRequest, ReorderRequest, ACTING_USER_HEADER,
};

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_millis(1000);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Errors from the ordering API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status and (when parseable) its
    /// JSON error body
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// A response body did not decode as the expected DTO
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Shape of the backend's JSON error body (`{"error": ..., "status": ...}`)
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Accumulates raw network chunks and yields complete SSE lines
///
/// Chunk boundaries are arbitrary: a line, and even a single multi-byte
/// UTF-8 character, can be split across chunks. Bytes are therefore
/// buffered as-is and decoded only once a full line is available; an
/// incomplete trailing line stays buffered for the next chunk.
struct EventLineBuffer {
    bytes: Vec<u8>,
}

impl EventLineBuffer {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append a chunk and drain every line it completes
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.bytes.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(newline) = self.bytes.iter().position(|&b| b == b'\n') {
            let rest = self.bytes.split_off(newline + 1);
            let mut line = std::mem::replace(&mut self.bytes, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match String::from_utf8(line) {
                Ok(text) => lines.push(text),
                Err(err) => {
                    tracing::warn!(error = %err.utf8_error(), "non-utf8 event line, skipping");
                }
            }
        }
        lines
    }
}

/// Client for one backend, acting as one user
#[derive(Debug, Clone)]
pub struct OrderingApi {
    base_url: String,
    http: Client,
    user_id: Uuid,
}

impl OrderingApi {
    pub fn new(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
            user_id,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .header(ACTING_USER_HEADER, self.user_id.to_string())
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let response = self
            .http
            .put(self.url(path))
            .header(ACTING_USER_HEADER, self.user_id.to_string())
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<R>().await?)
    }

    pub async fn create_board(&self, name: &str) -> Result<Board, ClientError> {
        self.post(
            "/api/boards",
            &CreateBoardRequest {
                name: name.to_string(),
            },
        )
        .await
    }

    pub async fn fetch_board(&self, board_id: Uuid) -> Result<BoardSnapshot, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/boards/{}", board_id)))
            .header(ACTING_USER_HEADER, self.user_id.to_string())
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn create_column(
        &self,
        board_id: Uuid,
        request: &CreateColumnRequest,
    ) -> Result<Column, ClientError> {
        self.post(&format!("/api/boards/{}/columns", board_id), request)
            .await
    }

    pub async fn create_card(
        &self,
        column_id: Uuid,
        request: &CreateCardRequest,
    ) -> Result<Card, ClientError> {
        self.post(&format!("/api/columns/{}/cards", column_id), request)
            .await
    }

    /// Returns the moved column with its server-assigned key
    pub async fn move_column(
        &self,
        column_id: Uuid,
        request: &MoveColumnRequest,
    ) -> Result<Column, ClientError> {
        self.post(&format!("/api/columns/{}/move", column_id), request)
            .await
    }

    /// Returns the moved card with its server-assigned key
    pub async fn move_card(
        &self,
        card_id: Uuid,
        request: &MoveCardRequest,
    ) -> Result<Card, ClientError> {
        self.post(&format!("/api/cards/{}/move", card_id), request)
            .await
    }

    /// Returns the canonical `(id, rank)` order the server persisted
    pub async fn reorder_columns(
        &self,
        board_id: Uuid,
        request: &ReorderRequest,
    ) -> Result<Vec<RankedId>, ClientError> {
        self.put(&format!("/api/boards/{}/column-order", board_id), request)
            .await
    }

    pub async fn reorder_cards(
        &self,
        column_id: Uuid,
        request: &ReorderRequest,
    ) -> Result<Vec<RankedId>, ClientError> {
        self.put(&format!("/api/columns/{}/card-order", column_id), request)
            .await
    }

    /// Subscribe to a board's event stream
    ///
    /// Spawns a task that holds the SSE connection, reconnecting with
    /// exponential backoff on transport errors. Decoded events are delivered
    /// over the returned channel; the task stops when the receiver is
    /// dropped. Gaps across reconnects are possible, so callers should
    /// re-fetch the board snapshot after a reconnect if strict completeness
    /// matters.
    pub fn subscribe(&self, board_id: Uuid) -> mpsc::UnboundedReceiver<BoardEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let http = self.http.clone();
        let url = self.url(&format!("/boards/{}/events", board_id));
        let user_id = self.user_id;

        tokio::spawn(async move {
            let mut reconnect_delay = INITIAL_RECONNECT_DELAY;
            loop {
                if sender.is_closed() {
                    return;
                }
                let response = match http
                    .get(&url)
                    .header(ACTING_USER_HEADER, user_id.to_string())
                    .header("Accept", "text/event-stream")
                    .send()
                    .await
                {
                    Ok(resp) if resp.status().is_success() => resp,
                    Ok(resp) => {
                        tracing::warn!(status = %resp.status(), "event subscription refused, retrying");
                        tokio::time::sleep(reconnect_delay).await;
                        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "event subscription failed, retrying");
                        tokio::time::sleep(reconnect_delay).await;
                        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
                        continue;
                    }
                };

                tracing::info!(%board_id, "event subscription established");
                reconnect_delay = INITIAL_RECONNECT_DELAY;

                let mut stream = response.bytes_stream();
                let mut lines = EventLineBuffer::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = match chunk {
                        Ok(c) => c,
                        Err(err) => {
                            tracing::warn!(error = %err, "event stream interrupted");
                            break;
                        }
                    };
                    for line in lines.push(&chunk) {
                        if line.is_empty() || line.starts_with(':') {
                            continue;
                        }
                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };
                        match serde_json::from_str::<BoardEvent>(data.trim_start()) {
                            Ok(event) => {
                                if sender.send(event).is_err() {
                                    return;
                                }
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, data, "undecodable event payload, skipping");
                            }
                        }
                    }
                }
            }
        });

        receiver
    }
}
