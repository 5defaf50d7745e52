//! Sending messages to the assistant and managing stored conversations.

use crate::api::FinanceClient;
use crate::api::types::{ChatTurn, Conversation, RetryCard};
use crate::chat::content::MessageContent;
use crate::chat::message::ChatMessage;
use crate::chat::thread::{Thread, ThreadStore};
use crate::error::FetchError;

/// Conversation titles are cut to this many characters.
const TITLE_CHARS: usize = 48;

#[derive(Debug, Clone)]
pub struct ChatService {
    client: FinanceClient,
}

impl ChatService {
    pub fn new(client: FinanceClient) -> Self {
        Self { client }
    }

    /// Send `text` and append the assistant's reply.
    ///
    /// Persistence is best-effort. A failed assistant call appends an error
    /// message with a retry card instead of returning an error. Returns the
    /// appended assistant message, or `None` for blank input.
    pub async fn send(&self, thread: &Thread, text: &str) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        thread.disable_latest_actions();
        let user = ChatMessage::user(text);
        thread.push(user.clone());

        let conversation_id = self.ensure_conversation(thread, text).await;
        if let Some(id) = &conversation_id {
            self.persist(id, &user).await;
        }

        let turn = ChatTurn {
            messages: thread.messages().iter().map(ChatMessage::to_turn).collect(),
        };
        let reply = match self.client.chat().turn(&turn).await {
            Ok(reply) => ChatMessage::assistant(reply.message, reply.rich_content),
            Err(e) => {
                tracing::warn!(
                    name: "chat.turn.failed",
                    session_id = %thread.id(),
                    error = %e,
                    "Assistant call failed"
                );
                return Some(push_failure(thread, &e));
            }
        };
        tracing::debug!(
            name: "chat.turn.completed",
            session_id = %thread.id(),
            cards = reply.rich_content.len(),
            "Assistant replied"
        );
        thread.push(reply.clone());
        if let Some(id) = &conversation_id {
            self.persist(id, &reply).await;
        }
        Some(reply)
    }

    async fn ensure_conversation(&self, thread: &Thread, first_text: &str) -> Option<String> {
        if let Some(id) = thread.conversation_id() {
            return Some(id);
        }
        match self.client.conversations().create(title_from(first_text)).await {
            Ok(conversation) => {
                thread.set_conversation_id(conversation.id.clone());
                Some(conversation.id)
            }
            Err(e) => {
                tracing::warn!(
                    name: "chat.persist.failed",
                    session_id = %thread.id(),
                    error = %e,
                    "Could not create conversation; continuing unsaved"
                );
                None
            }
        }
    }

    async fn persist(&self, conversation_id: &str, message: &ChatMessage) {
        if let Err(e) = self
            .client
            .conversations()
            .append_message(conversation_id, &message.to_stored())
            .await
        {
            tracing::warn!(
                name: "chat.persist.failed",
                conversation_id = %conversation_id,
                error = %e,
                "Could not save message"
            );
        }
    }

    /// Stored conversations, newest first.
    pub async fn conversations(&self) -> Result<Vec<Conversation>, FetchError> {
        let mut list = self.client.conversations().list().await?;
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    /// Open a stored conversation in a fresh thread.
    ///
    /// Only the newest message with cards keeps its actions.
    pub async fn select(
        &self,
        store: &ThreadStore,
        conversation_id: &str,
    ) -> Result<Thread, FetchError> {
        let stored = self.client.conversations().messages(conversation_id).await?;
        let mut messages: Vec<ChatMessage> = stored.into_iter().map(ChatMessage::from).collect();
        let newest_rich = messages.iter().rposition(ChatMessage::has_rich_content);
        for (i, message) in messages.iter_mut().enumerate() {
            message.actions_disabled = message.has_rich_content() && Some(i) != newest_rich;
        }

        let thread = store.create();
        thread.set_conversation_id(conversation_id);
        thread.replace_messages(messages);
        tracing::info!(
            name: "chat.conversation.opened",
            session_id = %thread.id(),
            conversation_id = %conversation_id,
            messages = thread.message_count(),
            "Opened stored conversation"
        );
        Ok(thread)
    }

    pub async fn delete(&self, conversation_id: &str) -> Result<(), FetchError> {
        self.client.conversations().delete(conversation_id).await
    }
}

fn push_failure(thread: &Thread, error: &FetchError) -> ChatMessage {
    let message = error.user_message();
    let reply = ChatMessage::assistant(
        message.clone(),
        vec![MessageContent::ErrorRetry(Some(RetryCard {
            message,
            action: None,
            data: None,
        }))],
    );
    thread.push(reply.clone());
    reply
}

fn title_from(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_CHARS).collect();
    if text.chars().count() > TITLE_CHARS {
        title.push('…');
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTransport, Method, Transport};
    use crate::chat::message::Role;
    use crate::query::QueryCache;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryTransport>, ChatService, ThreadStore) {
        let transport = Arc::new(MemoryTransport::new());
        let client = FinanceClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            QueryCache::disabled(),
        );
        (transport, ChatService::new(client), ThreadStore::new())
    }

    fn conversation() -> serde_json::Value {
        json!({ "conversation": {
            "id": "c1", "title": "How much",
            "createdAt": "2026-10-01T10:00:00Z", "updatedAt": "2026-10-01T10:00:00Z"
        }})
    }

    #[tokio::test]
    async fn send_appends_reply_and_persists() {
        let (transport, service, store) = setup();
        transport.respond(Method::Post, "/api/conversations", conversation());
        transport.respond(Method::Post, "/api/conversations/c1/messages", json!({}));
        transport.respond(
            Method::Post,
            "/api/chat",
            json!({ "message": "Here you go", "richContent": [{ "type": "balance-card" }] }),
        );
        let thread = store.create();

        let reply = service.send(&thread, "How much do I have?").await.unwrap();
        assert_eq!(reply.rich_content, vec![MessageContent::BalanceCard(None)]);
        assert_eq!(thread.conversation_id().as_deref(), Some("c1"));

        let messages = thread.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(transport.count(Method::Post, "/api/conversations/c1/messages"), 2);
        assert_eq!(transport.count(Method::Post, "/api/conversations"), 1);

        // Second message reuses the conversation.
        service.send(&thread, "Thanks").await;
        assert_eq!(transport.count(Method::Post, "/api/conversations"), 1);
    }

    #[tokio::test]
    async fn chat_failure_becomes_an_error_message() {
        let (_transport, service, store) = setup();
        let thread = store.create();

        let reply = service.send(&thread, "hello").await.unwrap();
        assert!(matches!(reply.rich_content[0], MessageContent::ErrorRetry(Some(_))));
        assert_eq!(thread.message_count(), 2);
        assert!(thread.conversation_id().is_none());
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (transport, service, store) = setup();
        assert!(service.send(&store.create(), "   ").await.is_none());
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn select_loads_history_into_a_new_thread() {
        let (transport, service, store) = setup();
        transport.respond(
            Method::Get,
            "/api/conversations/c1/messages",
            json!({ "messages": [
                { "id": "m1", "role": "assistant", "content": "a",
                  "richContent": [{ "type": "cash-flow" }], "createdAt": "2026-10-01T10:00:00Z" },
                { "id": "m2", "role": "user", "content": "b", "createdAt": "2026-10-01T10:01:00Z" },
                { "id": "m3", "role": "assistant", "content": "c",
                  "richContent": [{ "type": "balance-card" }], "createdAt": "2026-10-01T10:02:00Z" }
            ]}),
        );

        let thread = service.select(&store, "c1").await.unwrap();
        let messages = thread.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].actions_disabled);
        assert!(!messages[2].actions_disabled);
        assert_eq!(thread.conversation_id().as_deref(), Some("c1"));
    }

    #[test]
    fn long_titles_are_cut() {
        let title = title_from(&"a".repeat(100));
        assert_eq!(title.chars().count(), TITLE_CHARS + 1);
        assert_eq!(title_from("short"), "short");
    }
}
