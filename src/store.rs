//! Persistence boundary: messages offered for translation, known players and
//! their default language, and localized strings.
//!
//! `ChatStore` is the contract the interceptor and onboarding depend on.
//! `MemoryStore` keeps everything in process; it backs the bridge binary and
//! the tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::i18n::{self, LanguageRegistry};

/// Opaque identifier of a stored message, used in the translate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A language the translation backend supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
}

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown user {0}")]
    UnknownUser(Uuid),

    #[error("unsupported language code '{0}'")]
    UnsupportedLanguage(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a message and return its id.
    async fn add_message(&self, serialized: &str, plain_text: &str)
        -> Result<MessageId, StoreError>;

    /// First-contact check. Records the user, so only the first call for an
    /// identity returns `true`.
    async fn is_new_user(&self, user_id: Uuid, name: &str) -> Result<bool, StoreError>;

    /// `None` when the user has no default language.
    async fn user_default_language(&self, user_id: Uuid) -> Result<Option<String>, StoreError>;

    async fn set_user_default_language(&self, user_id: Uuid, code: &str)
        -> Result<(), StoreError>;

    /// Localized string for `key`, in the fallback language when `code` is
    /// unset or unknown.
    async fn translation(&self, key: &str, code: Option<&str>) -> String;

    /// Supported languages, in a stable order.
    async fn languages(&self) -> Vec<Language>;
}

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: MessageId,
    pub serialized: String,
    pub plain_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub name: String,
    pub default_language: Option<String>,
    pub first_seen_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    messages: HashMap<MessageId, StoredMessage>,
    users: HashMap<Uuid, UserRecord>,
}

/// In-process `ChatStore`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn message(&self, id: MessageId) -> Option<StoredMessage> {
        self.state().messages.get(&id).cloned()
    }

    pub fn message_count(&self) -> usize {
        self.state().messages.len()
    }

    pub fn user(&self, user_id: Uuid) -> Option<UserRecord> {
        self.state().users.get(&user_id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state().users.len()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn add_message(
        &self,
        serialized: &str,
        plain_text: &str,
    ) -> Result<MessageId, StoreError> {
        let id = MessageId::new();
        self.state().messages.insert(
            id,
            StoredMessage {
                id,
                serialized: serialized.to_string(),
                plain_text: plain_text.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn is_new_user(&self, user_id: Uuid, name: &str) -> Result<bool, StoreError> {
        let mut state = self.state();
        if let Some(user) = state.users.get_mut(&user_id) {
            user.name = name.to_string();
            return Ok(false);
        }

        state.users.insert(
            user_id,
            UserRecord {
                name: name.to_string(),
                default_language: None,
                first_seen_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn user_default_language(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        Ok(self
            .state()
            .users
            .get(&user_id)
            .and_then(|user| user.default_language.clone()))
    }

    async fn set_user_default_language(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<(), StoreError> {
        let language = LanguageRegistry::get()
            .get_by_code(code)
            .ok_or_else(|| StoreError::UnsupportedLanguage(code.to_string()))?;

        let mut state = self.state();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UnknownUser(user_id))?;
        user.default_language = Some(language.code.to_string());
        Ok(())
    }

    async fn translation(&self, key: &str, code: Option<&str>) -> String {
        i18n::lookup(key, code)
    }

    async fn languages(&self) -> Vec<Language> {
        LanguageRegistry::get()
            .list_all()
            .into_iter()
            .map(|lang| Language::new(lang.code))
            .collect()
    }
}
