//! Fetch-or-fallback data resolution for cards.
//!
//! A card renders from inline data when the message carried it, otherwise it
//! asks the API. A failed fetch is logged and the card draws its defaults;
//! nothing here returns an error.

use std::future::Future;

use crate::error::FetchError;

/// Where a card's data came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// Inline in the message; no request was made.
    FromProps(T),
    Fetched(T),
    /// The fetch failed; render defaults.
    Fallback,
}

impl<T> Loaded<T> {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    /// The data, or `default` for a fallback, plus whether it fell back.
    pub fn or_default_with(self, default: impl FnOnce() -> T) -> (T, bool) {
        match self {
            Self::FromProps(v) | Self::Fetched(v) => (v, false),
            Self::Fallback => (default(), true),
        }
    }
}

/// Use `props` when present; otherwise run `fetch`.
pub async fn resolve<T, F, Fut>(card: &str, props: Option<T>, fetch: F) -> Loaded<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    if let Some(props) = props {
        return Loaded::FromProps(props);
    }
    match fetch().await {
        Ok(value) => Loaded::Fetched(value),
        Err(e) => {
            tracing::warn!(
                name: "card.fallback",
                card = %card,
                error = %e,
                "Card data unavailable; rendering defaults"
            );
            Loaded::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn props_skip_the_fetch() {
        let called = AtomicBool::new(false);
        let loaded = resolve("balance-card", Some(5), || async {
            called.store(true, Ordering::SeqCst);
            Ok(7)
        })
        .await;
        assert_eq!(loaded, Loaded::FromProps(5));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failures_fall_back() {
        let loaded: Loaded<i32> =
            resolve("balance-card", None, || async { Err(FetchError::Timeout) }).await;
        assert!(loaded.is_fallback());
        assert_eq!(loaded.or_default_with(|| 0), (0, true));
    }

    #[tokio::test]
    async fn fetched_values_are_used() {
        let loaded = resolve("cash-flow", None, || async { Ok("x") }).await;
        assert_eq!(loaded, Loaded::Fetched("x"));
    }
}
