use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use api_types::{entry::FinancialEntry, user::UserRecord};

use crate::sync::{SyncEvent, subscription, subscription::Subscription};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Authentication-class failure on the store itself (bad service key).
    #[error("invalid endpoint or service key")]
    InvalidKey,
    #[error("{0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// The remote data source, seen through the operations the client needs.
///
/// Exactly one live implementation exists process-wide at a time; swapping
/// credentials replaces it wholesale (see `sync::ConnectionManager`).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lightweight existence check against the entries collection, used to
    /// validate reachability and the service key before anything else.
    async fn probe(&self) -> Result<(), StoreError>;

    /// Looks up a user by username AND password, both filtered server-side.
    /// Returns `Some` only for exactly one matching row.
    async fn find_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// All entries of one user, filtered server-side so no other user's
    /// rows ever reach client memory.
    async fn entries_for(&self, user_id: Uuid) -> Result<Vec<FinancialEntry>, StoreError>;

    /// Deletes one entry. Deliberately does not return the new collection
    /// state; the change notification drives the refresh.
    async fn delete_entry(&self, entry_id: Uuid) -> Result<(), StoreError>;

    /// Starts the payload-agnostic change feed for the entries collection.
    /// Every signal is tagged with `generation` so results of a superseded
    /// connection are discarded on arrival.
    fn subscribe(&self, events: UnboundedSender<SyncEvent>, generation: u64) -> Subscription;
}

/// PostgREST-style implementation over reqwest (the remote store is a
/// Supabase project: `rest/v1/*` for queries, `realtime/v1` for the feed).
#[derive(Debug, Clone)]
pub struct RestStore {
    base_url: Url,
    realtime_url: Url,
    key: String,
    http: reqwest::Client,
}

impl RestStore {
    pub fn new(endpoint: &str, key: &str) -> Result<Self, StoreError> {
        let mut endpoint = endpoint.trim().to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let base_url = Url::parse(&endpoint)
            .map_err(|err| StoreError::Server(format!("invalid endpoint: {err}")))?;
        let realtime_url = subscription::realtime_url(&base_url, key)?;
        Ok(Self {
            base_url,
            realtime_url,
            key: key.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|err| StoreError::Server(format!("invalid endpoint: {err}")))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn error_from(res: Response) -> StoreError {
        let status = res.status();
        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.message)
            .unwrap_or_else(|_| "unknown error".to_string());

        // Supabase reports a bad anon key either as plain 401 or as a JWT
        // validation message with a 4xx status.
        if status == StatusCode::UNAUTHORIZED
            || message.contains("Invalid API key")
            || message.contains("invalid JWT")
        {
            StoreError::InvalidKey
        } else {
            StoreError::Server(message)
        }
    }
}

#[async_trait]
impl LedgerStore for RestStore {
    async fn probe(&self) -> Result<(), StoreError> {
        let url = self.endpoint("rest/v1/financial_entries")?;
        let res = self
            .get(url)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(res).await)
    }

    async fn find_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let url = self.endpoint("rest/v1/users")?;
        let username_filter = format!("eq.{username}");
        let password_filter = format!("eq.{password}");
        let res = self
            .get(url)
            .query(&[
                ("select", "id,username"),
                ("username", username_filter.as_str()),
                ("password", password_filter.as_str()),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }

        let mut rows = res.json::<Vec<UserRecord>>().await?;
        // Expect exactly one row; zero or multiple both count as a miss.
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }

    async fn entries_for(&self, user_id: Uuid) -> Result<Vec<FinancialEntry>, StoreError> {
        let url = self.endpoint("rest/v1/financial_entries")?;
        let user_filter = format!("eq.{user_id}");
        let res = self
            .get(url)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.asc"),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }
        Ok(res.json::<Vec<FinancialEntry>>().await?)
    }

    async fn delete_entry(&self, entry_id: Uuid) -> Result<(), StoreError> {
        let url = self.endpoint("rest/v1/financial_entries")?;
        let res = self
            .http
            .delete(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .query(&[("id", format!("eq.{entry_id}"))])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }
        Ok(())
    }

    fn subscribe(&self, events: UnboundedSender<SyncEvent>, generation: u64) -> Subscription {
        let url = self.realtime_url.clone();
        Subscription::new(tokio::spawn(subscription::run_change_feed(
            url, events, generation,
        )))
    }
}
