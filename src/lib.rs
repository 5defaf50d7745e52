//! Finance Assistant Web
//!
//! Server-rendered UI for a personal-finance assistant: a chat whose replies
//! carry interactive cards, and a dashboard for spending, family sharing and
//! the subscription. All business data lives behind the finance REST API.
//!
//! # Architecture
//!
//! - **Server**: Axum router serving full pages and HTMX fragments
//! - **API client**: typed finance REST client over a pluggable transport,
//!   with a shared request-deduplicating cache
//! - **Chat**: per-session threads, rich content, action dispatch
//! - **UI**: HTML renderers; every card falls back to defaults when its data
//!   cannot be fetched
//!
//! # Modules
//!
//! - [`api`]: REST client, transports and wire types
//! - [`chat`]: threads, messages, actions and the assistant service
//! - [`forms`]: drawer forms with validation
//! - [`ui`]: pages, cards and components
//! - [`server`]: router and startup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod finance;
pub mod forms;
pub mod query;
pub mod server;
pub mod telemetry;
pub mod ui;

use std::sync::Arc;

use crate::api::types::Currency;
use crate::api::{FinanceClient, Transport};
use crate::chat::{ActionDispatcher, ChatService, ThreadStore};
use crate::config::AppConfig;
use crate::query::QueryCache;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Finance API client; clones share one cache.
    pub client: FinanceClient,
    /// Chat threads keyed by session id.
    pub threads: ThreadStore,
    pub dispatcher: Arc<ActionDispatcher>,
    pub chat: Arc<ChatService>,
    /// Display currency for defaults.
    pub currency: Currency,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the services over `transport`.
    pub fn new(config: Arc<AppConfig>, transport: Arc<dyn Transport>) -> Self {
        let cache = QueryCache::new(config.cache.ttl(), config.cache.enabled);
        let currency = Currency::new(config.display.currency.clone());
        let client = FinanceClient::new(transport, cache).with_display_currency(currency.clone());
        Self {
            dispatcher: Arc::new(ActionDispatcher::new(client.clone())),
            chat: Arc::new(ChatService::new(client.clone())),
            client,
            threads: ThreadStore::new(),
            currency,
            config,
        }
    }
}
