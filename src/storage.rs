//! Session state storage
//!
//! A chat's conversation state is kept in a teloxide dialogue storage: Redis
//! in production, memory in development. Values are stored as bare state
//! labels such as `HANDLE_MENU`.

use crate::bot::state::{State, UnknownStateLabel};
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use teloxide::dispatching::dialogue::serializer::Serializer;
use teloxide::dispatching::dialogue::{InMemStorage, RedisStorage, Storage};
use teloxide::types::ChatId;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during session storage operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// Storage backend failed or returned undecodable data
    #[error("Session storage error: {0}")]
    Backend(String),
}

/// Interface for session stores
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current state of a chat; `None` for a chat never seen before
    async fn get_state(&self, chat_id: i64) -> Result<Option<State>, SessionError>;
    /// Overwrite the state of a chat
    async fn set_state(&self, chat_id: i64, state: State) -> Result<(), SessionError>;
}

/// Serializes a state as its bare label
#[derive(Debug, Clone, Copy, Default)]
pub struct StateLabelSerializer;

/// Label serialization failure
#[derive(Debug, Error)]
pub enum LabelError {
    /// Stored bytes are not UTF-8
    #[error("state label is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Stored label is not a known state
    #[error(transparent)]
    Unknown(#[from] UnknownStateLabel),
}

impl Serializer<State> for StateLabelSerializer {
    type Error = LabelError;

    fn serialize(&self, val: &State) -> Result<Vec<u8>, Self::Error> {
        Ok(val.label().as_bytes().to_vec())
    }

    fn deserialize(&self, data: &[u8]) -> Result<State, Self::Error> {
        Ok(std::str::from_utf8(data)?.parse()?)
    }
}

/// [`SessionStore`] over any teloxide dialogue storage
pub struct DialogueSessionStore<S> {
    storage: Arc<S>,
}

impl<S> DialogueSessionStore<S> {
    /// Wrap a dialogue storage
    #[must_use]
    pub const fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S> SessionStore for DialogueSessionStore<S>
where
    S: Storage<State> + Send + Sync + 'static,
    S::Error: Display + Send,
{
    async fn get_state(&self, chat_id: i64) -> Result<Option<State>, SessionError> {
        self.storage
            .clone()
            .get_dialogue(ChatId(chat_id))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))
    }

    async fn set_state(&self, chat_id: i64, state: State) -> Result<(), SessionError> {
        self.storage
            .clone()
            .update_dialogue(ChatId(chat_id), state)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))
    }
}

/// Open the session store: Redis when `redis_url` is set, memory otherwise.
///
/// # Errors
///
/// Returns an error if the Redis connection cannot be established.
pub async fn open_session_store(
    redis_url: Option<String>,
) -> Result<Arc<dyn SessionStore>, SessionError> {
    let Some(url) = redis_url else {
        warn!("REDIS_HOST is not set, keeping sessions in memory; they will not survive a restart");
        return Ok(Arc::new(DialogueSessionStore::new(
            InMemStorage::<State>::new(),
        )));
    };

    let storage = RedisStorage::open(url.as_str(), StateLabelSerializer)
        .await
        .map_err(|e| SessionError::Backend(e.to_string()))?;
    info!("Redis session storage connected.");
    Ok(Arc::new(DialogueSessionStore::new(storage)))
}
