//! Bluesky XRPC Client
//!
//! Thin client over the three atproto calls the bot consumes:
//! - `com.atproto.server.createSession` (authenticate)
//! - `app.bsky.notification.listNotifications` (fetch mentions)
//! - `com.atproto.repo.createRecord` (post a reply)
//!
//! The `MentionFeed` trait is the seam the poll loop is written against;
//! tests drive the loop with a scripted feed instead of the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const LIST_NOTIFICATIONS: &str = "app.bsky.notification.listNotifications";
const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// Error kinds for feed operations. Each maps to one consumed call; all are
/// fatal to the current tick only, except at startup where auth failure is
/// fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("fetching notifications failed: {0}")]
    Fetch(String),

    #[error("posting reply failed: {0}")]
    Post(String),
}

/// An authenticated Bluesky session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub did: String,
    pub handle: String,
}

/// A mention notification, reduced to what the bot reads: the post's
/// identity (`uri`/`cid`, used as the reply target) and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub uri: String,
    pub cid: String,
    pub text: String,
}

/// The collaborator surface the poll loop consumes.
#[async_trait]
pub trait MentionFeed: Send + Sync {
    /// Establish (or refresh) a session.
    async fn authenticate(&self) -> Result<Session, FeedError>;

    /// List notifications with reason `mention` that are still in the feed.
    async fn list_mentions(&self) -> Result<Vec<Mention>, FeedError>;

    /// Post `text` as a reply rooted at the given post.
    async fn post_reply(&self, uri: &str, cid: &str, text: &str) -> Result<(), FeedError>;
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ListNotificationsResponse {
    notifications: Vec<Notification>,
}

#[derive(Deserialize)]
struct Notification {
    uri: String,
    cid: String,
    reason: String,
    #[serde(default)]
    record: Option<PostRecord>,
}

#[derive(Deserialize)]
struct PostRecord {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: ReplyRecord<'a>,
}

#[derive(Serialize)]
struct ReplyRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'a str,
    text: &'a str,
    reply: ReplyRef<'a>,
    #[serde(rename = "createdAt")]
    created_at: String,
}

#[derive(Serialize)]
struct ReplyRef<'a> {
    root: PostRef<'a>,
    parent: PostRef<'a>,
}

#[derive(Serialize)]
struct PostRef<'a> {
    uri: &'a str,
    cid: &'a str,
}

/// Pull the human-readable message out of an XRPC error body, which is JSON
/// shaped like `{"error": "...", "message": "..."}` on well-behaved PDSes.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// XRPC client for a single bot account.
pub struct BskyClient {
    client: Client,
    service: String,
    identifier: String,
    password: String,
    session: RwLock<Option<Session>>,
}

impl BskyClient {
    pub fn new(service: &str, identifier: &str, password: &str) -> Self {
        Self {
            client: Client::new(),
            service: service.trim_end_matches('/').to_string(),
            identifier: identifier.to_string(),
            password: password.to_string(),
            session: RwLock::new(None),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }

    /// Current session, or an error naming the call that needed it.
    async fn session(&self, kind: fn(String) -> FeedError) -> Result<Session, FeedError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| kind("no active session".to_string()))
    }
}

#[async_trait]
impl MentionFeed for BskyClient {
    async fn authenticate(&self) -> Result<Session, FeedError> {
        let response = self
            .client
            .post(self.endpoint(CREATE_SESSION))
            .json(&CreateSessionRequest {
                identifier: &self.identifier,
                password: &self.password,
            })
            .send()
            .await
            .map_err(|e| FeedError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Auth(format!("{status}: {}", error_message(&body))));
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| FeedError::Auth(e.to_string()))?;

        debug!("Authenticated as {} ({})", session.handle, session.did);
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn list_mentions(&self) -> Result<Vec<Mention>, FeedError> {
        let session = self.session(FeedError::Fetch).await?;

        let response = self
            .client
            .get(self.endpoint(LIST_NOTIFICATIONS))
            .bearer_auth(&session.access_jwt)
            .send()
            .await
            .map_err(|e| FeedError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Fetch(format!("{status}: {}", error_message(&body))));
        }

        let listed: ListNotificationsResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Fetch(e.to_string()))?;

        let mentions = listed
            .notifications
            .into_iter()
            .filter(|n| n.reason == "mention")
            .map(|n| Mention {
                text: n.record.map(|r| r.text).unwrap_or_default(),
                uri: n.uri,
                cid: n.cid,
            })
            .collect();

        Ok(mentions)
    }

    async fn post_reply(&self, uri: &str, cid: &str, text: &str) -> Result<(), FeedError> {
        let session = self.session(FeedError::Post).await?;

        // Replying directly to the mention: it is both root and parent.
        let request = CreateRecordRequest {
            repo: &session.did,
            collection: "app.bsky.feed.post",
            record: ReplyRecord {
                record_type: "app.bsky.feed.post",
                text,
                reply: ReplyRef {
                    root: PostRef { uri, cid },
                    parent: PostRef { uri, cid },
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        };

        let response = self
            .client
            .post(self.endpoint(CREATE_RECORD))
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await
            .map_err(|e| FeedError::Post(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Post(format!("{status}: {}", error_message(&body))));
        }

        Ok(())
    }
}
