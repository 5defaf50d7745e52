//! Per-session chat thread and the in-memory thread store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::chat::message::ChatMessage;

/// Threads idle longer than this are swept from the store.
pub const DEFAULT_THREAD_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// One browser session's conversation.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Thread {
    inner: Arc<ThreadInner>,
}

#[derive(Debug)]
struct ThreadInner {
    id: String,
    /// Server-side conversation, created on the first message.
    conversation_id: RwLock<Option<String>>,
    messages: RwLock<Vec<ChatMessage>>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Thread {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(ThreadInner {
                id,
                conversation_id: RwLock::new(None),
                messages: RwLock::new(Vec::new()),
                last_activity: RwLock::new(Utc::now()),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<String> {
        read(&self.inner.conversation_id).clone()
    }

    pub fn set_conversation_id(&self, id: impl Into<String>) {
        *write(&self.inner.conversation_id) = Some(id.into());
    }

    /// Append a message.
    pub fn push(&self, message: ChatMessage) {
        write(&self.inner.messages).push(message);
        self.touch();
    }

    /// Replace the whole history, e.g. when a stored conversation is opened.
    pub fn replace_messages(&self, messages: Vec<ChatMessage>) {
        *write(&self.inner.messages) = messages;
        self.touch();
    }

    /// Get all messages in the conversation.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        read(&self.inner.messages).clone()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        read(&self.inner.messages).len()
    }

    /// Disable the cards of the most recent message that has any.
    ///
    /// Returns the id of the message that changed, or `None` when that
    /// message was already disabled or no message has rich content. Never
    /// re-enables anything.
    pub fn disable_latest_actions(&self) -> Option<String> {
        let mut messages = write(&self.inner.messages);
        let latest = messages.iter_mut().rev().find(|m| m.has_rich_content())?;
        if latest.actions_disabled {
            return None;
        }
        latest.actions_disabled = true;
        Some(latest.id.clone())
    }

    fn touch(&self) {
        *write(&self.inner.last_activity) = Utc::now();
    }

    /// Check if the thread has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *read(&self.inner.last_activity);
        // Negative duration means clock skew; treat as fresh.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store for threads, keyed by session id.
#[derive(Debug, Clone, Default)]
pub struct ThreadStore {
    threads: Arc<RwLock<HashMap<String, Thread>>>,
}

impl ThreadStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a thread with a fresh id.
    #[must_use]
    pub fn create(&self) -> Thread {
        self.create_with_id(Uuid::new_v4().to_string())
    }

    /// Create a thread with a specific id, replacing any existing one.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Thread {
        let id = id.into();
        let thread = Thread::new(id.clone());
        write(&self.threads).insert(id, thread.clone());
        thread
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Thread> {
        read(&self.threads).get(id).cloned()
    }

    /// Get a thread by id, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Thread {
        if let Some(thread) = self.get(id) {
            return thread;
        }
        write(&self.threads)
            .entry(id.to_string())
            .or_insert_with(|| Thread::new(id.to_string()))
            .clone()
    }

    pub fn remove(&self, id: &str) -> Option<Thread> {
        write(&self.threads).remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.threads).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove threads idle longer than `timeout`. Returns how many went.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = write(&self.threads);
        let before = guard.len();
        guard.retain(|_, thread| !thread.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        read(&self.threads).keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::content::MessageContent;

    fn rich() -> ChatMessage {
        ChatMessage::assistant("Here's your balance.", vec![MessageContent::BalanceCard(None)])
    }

    #[test]
    fn disables_the_latest_rich_message_once() {
        let thread = Thread::new("s1".into());
        let first = rich();
        let second = rich();
        let second_id = second.id.clone();
        thread.push(first);
        thread.push(second);
        thread.push(ChatMessage::user("thanks"));

        assert_eq!(thread.disable_latest_actions(), Some(second_id));
        assert_eq!(thread.disable_latest_actions(), None);

        let messages = thread.messages();
        assert!(!messages[0].actions_disabled, "older cards are untouched");
        assert!(messages[1].actions_disabled);
    }

    #[test]
    fn nothing_to_disable_without_rich_content() {
        let thread = Thread::new("s1".into());
        thread.push(ChatMessage::user("hi"));
        assert_eq!(thread.disable_latest_actions(), None);
    }

    #[test]
    fn store_lifecycle() {
        let store = ThreadStore::new();
        let thread = store.create();
        assert!(store.get(thread.id()).is_some());

        let same = store.get_or_create(thread.id());
        same.push(ChatMessage::user("hello"));
        assert_eq!(thread.message_count(), 1, "clones share state");

        assert_eq!(store.list_ids(), vec![thread.id().to_string()]);
        assert!(store.remove(thread.id()).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn sweeps_idle_threads() {
        let store = ThreadStore::new();
        let _ = store.create();
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_secs(3600)), 0);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::ZERO), 1);
    }
}
