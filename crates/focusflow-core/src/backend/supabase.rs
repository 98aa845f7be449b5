//! Supabase integration -- focus sessions and tasks via the PostgREST API.
//!
//! Inserts ask for `return=representation`, so the created row comes back in
//! the same round trip and nothing is refetched afterwards.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::traits::{SessionLogger, TaskSource};
use super::types::{FocusSessionRecord, NewFocusSession, Task};
use crate::error::{BackendError, LoggingError};
use crate::storage::BackendConfig;

pub struct SupabaseClient {
    http: Client,
    base: Url,
    anon_key: String,
    access_token: Option<String>,
    user_id: Option<String>,
}

#[derive(Serialize)]
struct InsertSession<'a> {
    #[serde(flatten)]
    session: &'a NewFocusSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    ///
    /// # Errors
    /// Returns `BackendError::NotConfigured` if the URL does not parse.
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self, BackendError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| BackendError::NotConfigured(format!("invalid backend url '{base_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
            anon_key: anon_key.into(),
            access_token: None,
            user_id: None,
        })
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| BackendError::NotConfigured("backend.url is not set".into()))?;
        let anon_key = config
            .effective_anon_key()
            .ok_or_else(|| BackendError::NotConfigured("backend.anon_key is not set".into()))?;
        Ok(Self::new(url, anon_key)?
            .with_access_token(config.effective_access_token())
            .with_user_id(config.user_id.clone()))
    }

    fn endpoint(&self, table: &str) -> Result<Url, BackendError> {
        self.base
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| BackendError::NotConfigured(e.to_string()))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Insert one focus session row and return it as stored.
    pub async fn insert_focus_session(
        &self,
        session: &NewFocusSession,
    ) -> Result<FocusSessionRecord, BackendError> {
        let body = InsertSession {
            session,
            user_id: self.user_id.as_deref(),
        };
        let response = self
            .authorize(self.http.post(self.endpoint("focus_sessions")?))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let mut rows: Vec<FocusSessionRecord> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(BackendError::Decode("insert returned no rows".into()));
        }
        let record = rows.swap_remove(0);
        debug!(id = record.id, "focus session stored remotely");
        Ok(record)
    }

    /// Fetch incomplete tasks, oldest first.
    pub async fn fetch_pending_tasks(&self) -> Result<Vec<Task>, BackendError> {
        let response = self
            .authorize(self.http.get(self.endpoint("tasks")?))
            .query(&[
                ("select", "*"),
                ("is_completed", "eq.false"),
                ("order", "created_at.asc"),
            ])
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl SessionLogger for SupabaseClient {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn log_session(
        &self,
        session: NewFocusSession,
    ) -> Result<FocusSessionRecord, LoggingError> {
        Ok(self.insert_focus_session(&session).await?)
    }
}

#[async_trait]
impl TaskSource for SupabaseClient {
    async fn pending_tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.fetch_pending_tasks().await
    }
}
