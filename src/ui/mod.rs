//! Server-rendered HTML.
//!
//! Everything here produces HTML strings that HTMX swaps into the page.
//!
//! # Structure
//!
//! - [`html`]: escaping, attribute helpers and the page shell
//! - [`components`]: badges, buttons, cards and other building blocks
//! - [`fetch`]: the fetch-or-fallback resolver every card uses
//! - [`cards`]: one renderer per rich content type
//! - [`chat`]: chat page, message list and conversation sidebar
//! - [`dashboard`]: spending, family and subscription pages
//! - [`sheets`]: drawer forms

pub mod cards;
pub mod chat;
pub mod components;
pub mod dashboard;
pub mod fetch;
pub mod html;
pub mod icons;
pub mod sheets;
