//! Dashboard pages.
//!
//! Panels are card renderers loaded lazily from `/ui/cards/{kind}` and
//! reloaded whenever a save fires `finance-updated`.

use std::fmt::Write as _;

use serde_json::json;

use crate::api::FinanceClient;
use crate::api::types::{BillingCycle, FamilyBudget, PlanTier, Subscription};
use crate::chat::ChatAction;
use crate::finance::format_compact;
use crate::forms::SheetKind;
use crate::ui::cards::{CardContext, Surface};
use crate::ui::components::{
    BadgeVariant, ButtonSize, ButtonVariant, badge, button, card, empty_state, progress_bar,
    skeleton, submit_button,
};
use crate::ui::html::{escape, hx_vals};
use crate::ui::icons::Icon;

/// Placeholder that swaps itself for `url` once loaded.
fn lazy(url: &str, lines: usize) -> String {
    format!(
        r#"<div hx-get="{}" hx-trigger="load, finance-updated from:body" hx-swap="innerHTML">{}</div>"#,
        escape(url),
        skeleton(lines)
    )
}

fn panel(tag: &str) -> String {
    lazy(&format!("/ui/cards/{tag}?surface=dashboard"), 4)
}

fn open_sheet_button(label: &str, kind: SheetKind, variant: ButtonVariant) -> String {
    button(
        label,
        variant,
        ButtonSize::Sm,
        &format!(r##"hx-get="/ui/sheets/{kind}" hx-target="#sheet-root" hx-swap="innerHTML""##),
        false,
    )
}

fn page_header(title: &str, subtitle: &str, actions: &str) -> String {
    format!(
        r#"<div class="mb-6 flex flex-wrap items-end justify-between gap-3"><div><h1 class="text-2xl font-bold">{}</h1><p class="text-sm text-textMuted">{}</p></div><div class="flex gap-2">{actions}</div></div>"#,
        escape(title),
        escape(subtitle)
    )
}

/// Spending overview.
#[must_use]
pub fn spending_page() -> String {
    let actions = format!(
        "{}{}{}",
        open_sheet_button("Add transaction", SheetKind::Transaction, ButtonVariant::Primary),
        open_sheet_button("New budget", SheetKind::Budget, ButtonVariant::Secondary),
        open_sheet_button("New goal", SheetKind::Goal, ButtonVariant::Secondary),
    );
    format!(
        r#"{}<div class="grid gap-4 md:grid-cols-2 xl:grid-cols-3">
<div class="md:col-span-2 xl:col-span-1">{}</div>
<div>{}</div>
<div>{}</div>
<div class="md:col-span-2">{}</div>
<div>{}</div>
<div class="md:col-span-2">{}</div>
<div>{}</div>
</div>"#,
        page_header("Spending", "Where your money is and where it goes.", &actions),
        panel("balance-card"),
        panel("cash-flow"),
        panel("spending-analysis"),
        panel("budget-overview"),
        panel("savings-goals"),
        panel("transaction-list"),
        panel("recurring-expenses"),
    )
}

/// Sharing request form. `notice` is shown above the fields after a submit.
#[must_use]
pub fn consent_request_form(email: &str, notice: Option<(&str, bool)>) -> String {
    let notice = notice
        .map(|(text, ok)| {
            let class = if ok { "text-success" } else { "text-danger" };
            format!(r#"<p role="status" class="text-sm {class}">{}</p>"#, escape(text))
        })
        .unwrap_or_default();
    let body = format!(
        r#"<form class="space-y-3" hx-post="/ui/family/consent" hx-target="closest [data-panel]" hx-swap="outerHTML">{notice}
<input name="email" type="email" required placeholder="name@example.com" value="{}" class="w-full rounded-xl border border-panelBorder bg-background px-3 py-2 text-sm">
<select name="relationship" class="w-full rounded-xl border border-panelBorder bg-background px-3 py-2 text-sm"><option value="">Relationship (optional)</option><option value="spouse">Spouse</option><option value="parent">Parent</option><option value="child">Child</option><option value="sibling">Sibling</option></select>
<div class="flex justify-end">{}</div>
</form>"#,
        escape(email),
        submit_button("Send request", ButtonVariant::Primary)
    );
    format!(
        r#"<div data-panel="consent-request">{}</div>"#,
        card("Invite a family member", Icon::Users, "", &body, "")
    )
}

/// Limits set on family members' spending.
pub async fn family_budgets_panel(client: &FinanceClient) -> String {
    let body = match client.family().budgets().await {
        Ok(budgets) if budgets.is_empty() => empty_state("No family budgets yet."),
        Ok(budgets) => family_budget_rows(&budgets),
        Err(e) => {
            tracing::warn!(name: "card.fallback", card = "family-budgets", error = %e, "Family budgets unavailable");
            empty_state(&e.user_message())
        }
    };
    let footer = open_sheet_button("Set a limit", SheetKind::FamilyBudget, ButtonVariant::Primary);
    card("Family budgets", Icon::PieChart, "", &body, &footer)
}

fn family_budget_rows(budgets: &[FamilyBudget]) -> String {
    let mut out = String::from(r#"<ul class="space-y-4">"#);
    for b in budgets {
        let progress = b.progress();
        let who = b.member_name.as_deref().unwrap_or("Member");
        let _ = write!(
            out,
            r#"<li class="space-y-1.5"><div class="flex justify-between text-sm"><span><span class="font-medium">{}</span> · {}</span><span class="text-textMuted">{} of {}</span></div>{}</li>"#,
            escape(who),
            escape(&b.category),
            escape(&format_compact(progress.current(), b.currency.as_str())),
            escape(&format_compact(progress.target(), b.currency.as_str())),
            progress_bar(progress.bar_width(), progress.status())
        );
    }
    out.push_str("</ul>");
    out
}

/// Family sharing.
#[must_use]
pub fn family_page() -> String {
    format!(
        r#"{}<div class="grid gap-4 md:grid-cols-2">
<div>{}</div>
<div>{}</div>
<div>{}</div>
<div>{}</div>
</div>"#,
        page_header("Family", "Share spending with the people you trust.", ""),
        panel("family-consent"),
        panel("family-spending"),
        lazy("/ui/family/budgets", 3),
        consent_request_form("", None),
    )
}

fn plan_blurb(plan: PlanTier) -> &'static str {
    match plan {
        PlanTier::Free => "Balance, budgets and goals.",
        PlanTier::Plus => "Adds spending insights and recurring expense tracking.",
        PlanTier::Premium => "Adds family sharing and detailed answers.",
    }
}

/// Plan comparison with switch and billing controls.
pub async fn plans_panel(client: &FinanceClient) -> String {
    let current = match client.subscription().get().await {
        Ok(sub) => sub,
        Err(e) => {
            tracing::warn!(name: "card.fallback", card = "plans", error = %e, "Plans unavailable");
            Subscription {
                currency: client.display_currency().clone(),
                ..Subscription::default()
            }
        }
    };
    plan_rows(client, &current)
}

fn plan_rows(client: &FinanceClient, current: &Subscription) -> String {
    let currency = current.currency.clone();
    let ctx = CardContext {
        client,
        currency: &currency,
        surface: Surface::Dashboard,
    };
    let mut body = String::from(r#"<ul class="space-y-3">"#);
    for plan in PlanTier::ALL {
        let control = if plan == current.plan {
            badge("Current", BadgeVariant::Success)
        } else if plan > current.plan {
            ctx.action_button(
                "Upgrade",
                ChatAction::UpgradePlan,
                &json!({ "plan": plan.as_str(), "billingCycle": current.billing_cycle.as_str() }),
                ButtonVariant::Primary,
            )
        } else {
            button(
                "Switch",
                ButtonVariant::Outline,
                ButtonSize::Sm,
                &format!(
                    r#"hx-post="/ui/subscription/plan" hx-vals="{}" hx-swap="none" hx-confirm="Switch to {}?""#,
                    hx_vals(&json!({ "plan": plan.as_str() })),
                    plan.label()
                ),
                false,
            )
        };
        let _ = write!(
            body,
            r#"<li class="flex items-center justify-between gap-3 rounded-lg border border-panelBorder p-3"><div><p class="font-medium">{}</p><p class="text-xs text-textMuted">{}</p></div>{control}</li>"#,
            plan.label(),
            plan_blurb(plan)
        );
    }
    body.push_str("</ul>");

    let mut footer = String::new();
    for (cycle, label) in [(BillingCycle::Monthly, "Monthly"), (BillingCycle::Yearly, "Yearly")] {
        let variant = if cycle == current.billing_cycle {
            ButtonVariant::Secondary
        } else {
            ButtonVariant::Ghost
        };
        footer.push_str(&button(
            label,
            variant,
            ButtonSize::Sm,
            &format!(
                r#"hx-post="/ui/subscription/billing" hx-vals="{}" hx-swap="none""#,
                hx_vals(&json!({ "billing_cycle": cycle.as_str() }))
            ),
            cycle == current.billing_cycle,
        ));
    }
    card("Plans", Icon::Crown, "", &body, &footer)
}

/// Subscription management.
#[must_use]
pub fn subscription_page() -> String {
    format!(
        r#"{}<div class="grid gap-4 md:grid-cols-2"><div>{}</div><div>{}</div></div>"#,
        page_header("Your plan", "Manage your subscription and billing.", ""),
        panel("subscription"),
        lazy("/ui/subscription/plans", 4),
    )
}
