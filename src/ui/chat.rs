//! Chat page: conversation sidebar, message list and composer.

use std::fmt::Write as _;

use futures::future::join_all;

use crate::api::FinanceClient;
use crate::api::types::{Conversation, Currency};
use crate::chat::{ChatMessage, Role, Thread};
use crate::error::FetchError;
use crate::ui::cards::{CardContext, Surface, render_content};
use crate::ui::components::{ButtonSize, ButtonVariant, button, empty_state, skeleton};
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Greeting shown in an empty thread.
const WELCOME: &str = "Hi! Ask me about your balance, budgets, savings goals or spending.";

async fn render_message(client: &FinanceClient, currency: &Currency, message: &ChatMessage) -> String {
    let ctx = CardContext {
        client,
        currency,
        surface: Surface::Chat {
            actions_disabled: message.actions_disabled,
        },
    };
    let cards = join_all(message.rich_content.iter().map(|c| render_content(&ctx, c))).await;
    let cards: String = cards.concat();

    let (row, bubble) = match message.role {
        Role::User => ("justify-end", "bg-primary text-onPrimary"),
        Role::Assistant => ("justify-start", "bg-surface"),
    };
    let text = if message.content.trim().is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="rounded-2xl px-4 py-2 whitespace-pre-wrap {bubble}">{}</div>"#,
            escape(&message.content)
        )
    };
    let cards = if cards.is_empty() {
        cards
    } else {
        format!(r#"<div class="space-y-3">{cards}</div>"#)
    };
    format!(
        r#"<div class="flex {row}" data-message-id="{}" data-role="{}"><div class="max-w-[85%] space-y-2">{text}{cards}<p class="text-[10px] text-textMuted">{}</p></div></div>"#,
        escape(&message.id),
        message.role.as_str(),
        message.timestamp.format("%H:%M")
    )
}

/// Inner HTML of `#message-list`.
///
/// Every card resolves its own data; a message's cards render concurrently.
pub async fn message_list(client: &FinanceClient, currency: &Currency, thread: &Thread) -> String {
    let messages = thread.messages();
    if messages.is_empty() {
        return format!(
            r#"<div class="flex flex-col items-center gap-3 py-16 text-center">{}<p class="text-textSecondary">{WELCOME}</p></div>"#,
            Icon::Sparkles.svg("h-8 w-8 text-primary")
        );
    }
    let mut out = String::new();
    for message in &messages {
        out.push_str(&render_message(client, currency, message).await);
    }
    out
}

/// Inner HTML of `#conversation-list`.
pub fn conversation_list(result: Result<&[Conversation], &FetchError>, active: Option<&str>) -> String {
    let conversations = match result {
        Ok(list) => list,
        Err(e) => {
            return format!(
                r#"<p class="px-3 py-2 text-xs text-textMuted">{}</p>"#,
                escape(&e.user_message())
            );
        }
    };
    if conversations.is_empty() {
        return empty_state("No conversations yet.");
    }
    let mut out = String::from(r#"<ul class="space-y-1">"#);
    for c in conversations {
        let state = if Some(c.id.as_str()) == active {
            "bg-surface text-textPrimary"
        } else {
            "text-textSecondary hover:bg-surface"
        };
        let path = format!(
            "/chat/{}",
            url::form_urlencoded::byte_serialize(c.id.as_bytes()).collect::<String>()
        );
        let delete = format!(
            r##"hx-delete="/ui/conversations/{}" hx-target="#conversation-list" hx-swap="innerHTML" hx-confirm="Delete this conversation?" aria-label="Delete conversation""##,
            escape(&url::form_urlencoded::byte_serialize(c.id.as_bytes()).collect::<String>())
        );
        let preview = c
            .preview
            .as_deref()
            .map(|p| format!(r#"<span class="block truncate text-xs text-textMuted">{}</span>"#, escape(p)))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<li class="group flex items-center gap-1 rounded-xl {state}"><a href="{}" class="min-w-0 flex-1 px-3 py-2"><span class="block truncate text-sm">{}</span>{preview}</a>{}</li>"#,
            escape(&path),
            escape(&c.title),
            button("×", ButtonVariant::Ghost, ButtonSize::Icon, &delete, false)
        );
    }
    out.push_str("</ul>");
    out
}

fn composer() -> String {
    format!(
        r##"<form class="flex gap-2 border-t border-panelBorder bg-panel/50 p-4" hx-post="/ui/chat/messages" hx-target="#message-list" hx-swap="innerHTML" hx-include="#session-id" hx-disabled-elt="find button" hx-on::after-request="if (event.detail.successful) this.reset()">
<textarea name="message" rows="1" required placeholder="Ask about your money..." class="min-h-[44px] max-h-[200px] flex-1 resize-none rounded-xl border border-panelBorder bg-background px-4 py-3 text-textPrimary placeholder:text-textMuted focus:outline-none focus:ring-2 focus:ring-primary" x-data x-on:keydown.enter.prevent="if (!$event.shiftKey && $el.value.trim()) {{ $el.form.requestSubmit() }}"></textarea>
<button type="submit" aria-label="Send" class="inline-flex h-11 w-11 shrink-0 items-center justify-center rounded-xl bg-primary text-onPrimary">{}</button>
</form>"##,
        Icon::Send.svg("h-5 w-5")
    )
}

/// The full chat view for `thread`.
pub async fn chat_page(
    client: &FinanceClient,
    currency: &Currency,
    thread: &Thread,
    title: &str,
) -> String {
    let active = thread.conversation_id();
    let sidebar_url = match &active {
        Some(id) => format!(
            "/ui/conversations?active={}",
            url::form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>()
        ),
        None => "/ui/conversations".to_string(),
    };
    format!(
        r##"<input type="hidden" id="session-id" name="session_id" value="{}">
<div class="grid h-full gap-4 md:grid-cols-[16rem_1fr]">
<aside class="hidden flex-col gap-3 md:flex">
<a href="/" class="inline-flex items-center gap-2 rounded-xl border border-panelBorder px-3 py-2 text-sm hover:bg-surface">{}New chat</a>
<nav id="conversation-list" class="overflow-y-auto" hx-get="{}" hx-trigger="load, chat-updated from:body" hx-swap="innerHTML">{}</nav>
</aside>
<section class="chat-shell flex h-[calc(100vh-8rem)] flex-col overflow-hidden rounded-2xl border border-panelBorder bg-panel">
<header class="flex items-center gap-2 border-b border-panelBorder px-4 py-3">{}<h1 class="truncate font-semibold">{}</h1></header>
<div id="message-list" class="flex-1 space-y-4 overflow-y-auto p-4" aria-live="polite">{}</div>
{}
</section>
</div>"##,
        escape(thread.id()),
        Icon::Plus.svg("h-4 w-4"),
        escape(&sidebar_url),
        skeleton(4),
        Icon::MessageSquare.svg("h-5 w-5 text-primary"),
        escape(title),
        message_list(client, currency, thread).await,
        composer()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{BalanceSummary, RetryCard};
    use crate::api::{MemoryTransport, Transport};
    use crate::chat::{MessageContent, ThreadStore};
    use crate::query::QueryCache;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn client() -> FinanceClient {
        FinanceClient::new(
            Arc::new(MemoryTransport::new()) as Arc<dyn Transport>,
            QueryCache::disabled(),
        )
    }

    #[tokio::test]
    async fn empty_thread_shows_welcome() {
        let store = ThreadStore::new();
        let thread = store.create();
        let html = message_list(&client(), &Currency::default(), &thread).await;
        assert!(html.contains(WELCOME));
    }

    #[tokio::test]
    async fn messages_render_text_and_cards() {
        let store = ThreadStore::new();
        let thread = store.create();
        thread.push(ChatMessage::user("What's my <balance>?"));
        thread.push(ChatMessage::assistant(
            "Here it is.",
            vec![MessageContent::BalanceCard(Some(BalanceSummary {
                total_balance: 42.0,
                ..BalanceSummary::default()
            }))],
        ));
        let html = message_list(&client(), &Currency::default(), &thread).await;
        assert!(html.contains("What&#39;s my &lt;balance&gt;?"));
        assert!(html.contains(r#"data-card="balance-card""#));
        assert!(html.contains("BHD 42.000"));
        assert!(html.contains(r#"data-role="assistant""#));
    }

    #[tokio::test]
    async fn older_cards_render_disabled() {
        let store = ThreadStore::new();
        let thread = store.create();
        let retry = || {
            MessageContent::ErrorRetry(Some(RetryCard {
                message: "Failed".into(),
                action: Some("show-balance".into()),
                data: None,
            }))
        };
        thread.push(ChatMessage::assistant("first", vec![retry()]));
        thread.disable_latest_actions();
        thread.push(ChatMessage::assistant("second", vec![retry()]));
        let html = message_list(&client(), &Currency::default(), &thread).await;
        assert_eq!(html.matches(r#"aria-disabled="true""#).count(), 1);
    }

    #[test]
    fn conversation_list_marks_active_and_links() {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        let list = vec![
            Conversation {
                id: "c1".into(),
                title: "Budgets".into(),
                preview: None,
                message_count: 2,
                created_at: at,
                updated_at: at,
            },
            Conversation {
                id: "c2".into(),
                title: "Goals".into(),
                preview: Some("Holiday fund".into()),
                message_count: 4,
                created_at: at,
                updated_at: at,
            },
        ];
        let html = conversation_list(Ok(list.as_slice()), Some("c2"));
        assert!(html.contains(r#"href="/chat/c1""#));
        assert!(html.contains(r#"hx-delete="/ui/conversations/c2""#));
        assert!(html.contains("Holiday fund"));
        assert_eq!(html.matches("bg-surface text-textPrimary").count(), 1);

        let html = conversation_list(Err(&FetchError::Timeout), None);
        assert!(html.contains("took too long"));
    }
}
