//! Chat thread state, rich content and action dispatch.
//!
//! # Architecture
//!
//! - [`MessageContent`]: closed set of cards an assistant message can carry
//! - [`Thread`] / [`ThreadStore`]: per-session history kept in memory
//! - [`ActionDispatcher`]: runs card button actions
//! - [`ChatService`]: talks to the assistant and persists conversations
//!
//! # Example
//!
//! ```rust
//! use finance_assistant::chat::{ChatMessage, MessageContent, ThreadStore};
//!
//! let store = ThreadStore::new();
//! let thread = store.create();
//! thread.push(ChatMessage::assistant("Your balance:", vec![MessageContent::BalanceCard(None)]));
//!
//! assert!(thread.disable_latest_actions().is_some());
//! assert!(thread.disable_latest_actions().is_none());
//! ```

mod action;
mod content;
mod dispatcher;
mod message;
mod service;
mod thread;

pub use action::{ChatAction, UnknownAction};
pub use content::{CARD_TAGS, MessageContent, RawContent};
pub use dispatcher::{ActionDispatcher, ActionOutcome, no_data};
pub use message::{ChatMessage, Role};
pub use service::ChatService;
pub use thread::{DEFAULT_THREAD_TIMEOUT, Thread, ThreadStore};
