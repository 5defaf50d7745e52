//! Cards about the assistant itself rather than the user's money.

use std::fmt::Write as _;

use serde_json::json;

use crate::api::types::{
    AiMode, AiModeSetting, BillingCycle, FeatureGuide, PlanTier, QuickAction, QuickActions,
    RetryCard, Subscription, SubscriptionStatus,
};
use crate::chat::{ChatAction, no_data};
use crate::ui::cards::{CardContext, money};
use crate::ui::components::{BadgeVariant, ButtonVariant, badge, card, empty_state};
use crate::ui::fetch::resolve;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Shortcuts offered when a reply names none.
const DEFAULT_QUICK_ACTIONS: [(&str, ChatAction); 4] = [
    ("Show my balance", ChatAction::ShowBalance),
    ("Where is my money going?", ChatAction::ShowSpending),
    ("My budgets", ChatAction::ShowBudgets),
    ("My savings goals", ChatAction::ShowGoals),
];

fn mode_description(mode: AiMode) -> &'static str {
    match mode {
        AiMode::Concise => "Short answers, just the numbers.",
        AiMode::Balanced => "A summary with the key details.",
        AiMode::Detailed => "Full breakdowns and suggestions.",
    }
}

/// Picker for how much the assistant says.
pub async fn ai_mode_card(ctx: &CardContext<'_>, props: Option<&AiModeSetting>) -> String {
    let loaded = resolve("ai-mode", props.copied(), || async move {
        ctx.client.user().ai_mode().await.map(|mode| AiModeSetting { mode })
    })
    .await;
    let (setting, fallback) = loaded.or_default_with(AiModeSetting::default);

    let mut body = r#"<ul class="space-y-2">"#.to_string();
    for mode in AiMode::ALL {
        let current = mode == setting.mode;
        let control = if current {
            badge("Current", BadgeVariant::Success)
        } else {
            ctx.action_button(
                "Use",
                ChatAction::SetAiMode,
                &json!({ "mode": mode.as_str() }),
                ButtonVariant::Secondary,
            )
        };
        let _ = write!(
            body,
            r#"<li class="flex items-center justify-between gap-3 rounded-lg border border-panelBorder p-3"><div><p class="font-medium">{}</p><p class="text-xs text-textMuted">{}</p></div>{control}</li>"#,
            mode.label(),
            mode_description(mode)
        );
    }
    body.push_str("</ul>");

    ctx.frame(
        "ai-mode",
        fallback.then_some(None),
        &card("Assistant style", Icon::Sparkles, "", &body, ""),
    )
}

/// What the assistant can do, with a button per feature.
pub async fn feature_guide_card(ctx: &CardContext<'_>, props: Option<&FeatureGuide>) -> String {
    let loaded = resolve("feature-guide", props.cloned(), || async move {
        ctx.client.user().feature_guide().await
    })
    .await;
    let (guide, fallback) = loaded.or_default_with(FeatureGuide::default);

    let body = if guide.features.is_empty() {
        empty_state("Ask about your balance, budgets, goals or spending.")
    } else {
        let mut body = r#"<ul class="space-y-3">"#.to_string();
        for feature in &guide.features {
            let control = feature
                .action
                .as_deref()
                .and_then(|a| a.parse::<ChatAction>().ok())
                .map(|action| ctx.action_button("Try it", action, &no_data(), ButtonVariant::Ghost))
                .unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="flex items-start justify-between gap-3"><div><p class="font-medium">{}</p><p class="text-sm text-textMuted">{}</p></div>{control}</li>"#,
                escape(&feature.title),
                escape(&feature.description)
            );
        }
        body.push_str("</ul>");
        body
    };

    let footer = if guide.dismissed {
        String::new()
    } else {
        ctx.action_button(
            "Got it",
            ChatAction::DismissFeatureGuide,
            &no_data(),
            ButtonVariant::Secondary,
        )
    };
    ctx.frame(
        "feature-guide",
        fallback.then_some(None),
        &card("What I can do", Icon::Sparkles, "", &body, &footer),
    )
}

fn status_badge(status: SubscriptionStatus) -> String {
    match status {
        SubscriptionStatus::Active => badge("Active", BadgeVariant::Success),
        SubscriptionStatus::Trialing => badge("Trial", BadgeVariant::Secondary),
        SubscriptionStatus::PastDue => badge("Payment due", BadgeVariant::Warning),
        SubscriptionStatus::Canceled => badge("Canceled", BadgeVariant::Error),
    }
}

/// Current plan with upgrade options.
pub async fn subscription_card(ctx: &CardContext<'_>, props: Option<&Subscription>) -> String {
    let loaded = resolve("subscription", props.cloned(), || async move {
        ctx.client.subscription().get().await
    })
    .await;
    let (sub, fallback) = loaded.or_default_with(|| Subscription {
        currency: ctx.currency.clone(),
        ..Subscription::default()
    });

    let cycle = match sub.billing_cycle {
        BillingCycle::Monthly => "month",
        BillingCycle::Yearly => "year",
    };
    let mut body = format!(
        r#"<p class="text-2xl font-bold">{}</p>"#,
        sub.plan.label()
    );
    if sub.price > 0.0 {
        let _ = write!(
            body,
            r#"<p class="text-sm text-textMuted">{} / {cycle}</p>"#,
            money(sub.price, &sub.currency)
        );
    }
    if let Some(renews) = sub.renews_at {
        let verb = if sub.status == SubscriptionStatus::Canceled {
            "Ends"
        } else {
            "Renews"
        };
        let _ = write!(
            body,
            r#"<p class="text-xs text-textMuted">{verb} {}</p>"#,
            renews.format("%-d %b %Y")
        );
    }

    let mut footer = String::new();
    for plan in PlanTier::ALL.into_iter().filter(|p| *p > sub.plan) {
        footer.push_str(&ctx.action_button(
            &format!("Upgrade to {}", plan.label()),
            ChatAction::UpgradePlan,
            &json!({ "plan": plan.as_str(), "billingCycle": sub.billing_cycle.as_str() }),
            ButtonVariant::Primary,
        ));
    }
    footer.push_str(&ctx.action_button(
        "Manage plan",
        ChatAction::OpenDashboard,
        &json!({ "path": "/dashboard/subscription" }),
        ButtonVariant::Secondary,
    ));

    ctx.frame(
        "subscription",
        fallback.then_some(None),
        &card("Your plan", Icon::Crown, &status_badge(sub.status), &body, &footer),
    )
}

/// Shortcut buttons. Unknown actions are skipped.
pub fn quick_actions_card(ctx: &CardContext<'_>, props: Option<&QuickActions>) -> String {
    let actions: Vec<(String, ChatAction)> = match props {
        Some(QuickActions { actions }) => actions
            .iter()
            .filter_map(|QuickAction { label, action }| {
                action.parse::<ChatAction>().ok().map(|a| (label.clone(), a))
            })
            .collect(),
        None => DEFAULT_QUICK_ACTIONS
            .iter()
            .map(|(label, action)| ((*label).to_string(), *action))
            .collect(),
    };

    let mut body = r#"<div class="flex flex-wrap gap-2">"#.to_string();
    for (label, action) in &actions {
        body.push_str(&ctx.action_button(label, *action, &no_data(), ButtonVariant::Outline));
    }
    body.push_str("</div>");
    ctx.frame("quick-actions", None, &body)
}

/// A failed request, with a "Try again" that re-runs the original action.
pub fn error_retry_card(ctx: &CardContext<'_>, props: Option<&RetryCard>) -> String {
    let message = props.map_or("Something went wrong.", |p| p.message.as_str());
    let retry = props.and_then(|p| {
        p.action
            .as_deref()
            .and_then(|a| a.parse::<ChatAction>().ok())
            .map(|action| (action, p.data.clone().unwrap_or_else(no_data)))
    });

    let footer = retry
        .map(|(action, data)| {
            ctx.action_button(
                "Try again",
                ChatAction::Retry,
                &json!({ "action": action.as_str(), "data": data }),
                ButtonVariant::Secondary,
            )
        })
        .unwrap_or_default();
    let body = format!(
        r#"<p class="flex items-start gap-2 text-sm">{}<span>{}</span></p>"#,
        Icon::AlertCircle.svg("mt-0.5 text-danger"),
        escape(message)
    );
    ctx.frame(
        "error-retry",
        None,
        &card("Something went wrong", Icon::AlertCircle, "", &body, &footer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Currency;
    use crate::api::{FinanceClient, MemoryTransport, Method, Transport};
    use crate::query::QueryCache;
    use crate::ui::cards::Surface;
    use std::sync::Arc;

    fn client() -> (Arc<MemoryTransport>, FinanceClient) {
        let transport = Arc::new(MemoryTransport::new());
        let client = FinanceClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            QueryCache::disabled(),
        );
        (transport, client)
    }

    #[test]
    fn quick_actions_skip_unknown_entries() {
        let (_t, client) = client();
        let currency = Currency::default();
        let ctx = CardContext {
            client: &client,
            currency: &currency,
            surface: Surface::Chat { actions_disabled: false },
        };
        let props = QuickActions {
            actions: vec![
                QuickAction {
                    label: "Balance".into(),
                    action: "show-balance".into(),
                },
                QuickAction {
                    label: "Teleport".into(),
                    action: "teleport".into(),
                },
            ],
        };
        let html = quick_actions_card(&ctx, Some(&props));
        assert!(html.contains("Balance"));
        assert!(!html.contains("Teleport"));

        let defaults = quick_actions_card(&ctx, None);
        assert!(defaults.contains("My budgets"));
    }

    #[test]
    fn retry_without_action_has_no_button() {
        let (_t, client) = client();
        let currency = Currency::default();
        let ctx = CardContext {
            client: &client,
            currency: &currency,
            surface: Surface::Chat { actions_disabled: false },
        };
        let props = RetryCard {
            message: "The assistant is unavailable.".into(),
            action: None,
            data: None,
        };
        let html = error_retry_card(&ctx, Some(&props));
        assert!(html.contains("The assistant is unavailable."));
        assert!(!html.contains("Try again"));

        let props = RetryCard {
            action: Some("show-goals".into()),
            ..props
        };
        let html = error_retry_card(&ctx, Some(&props));
        assert!(html.contains("Try again"));
        assert!(html.contains("show-goals"));
    }

    #[tokio::test]
    async fn subscription_offers_only_higher_plans() {
        let (transport, client) = client();
        transport.respond(
            Method::Get,
            "/api/subscription",
            serde_json::json!({ "subscription": { "plan": "plus", "price": 4.5, "currency": "BHD" } }),
        );
        let currency = Currency::default();
        let ctx = CardContext {
            client: &client,
            currency: &currency,
            surface: Surface::Dashboard,
        };
        let html = subscription_card(&ctx, None).await;
        assert!(html.contains("Upgrade to Premium"));
        assert!(!html.contains("Upgrade to Plus"));
        assert!(html.contains("BHD 4.500 / month"));
    }
}
