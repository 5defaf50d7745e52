use std::fmt::Write as _;

use serde_json::json;

use crate::api::types::{ConsentStatus, FamilyConsent, FamilySpending};
use crate::chat::ChatAction;
use crate::finance::{Progress, ProgressStatus};
use crate::ui::cards::{CardContext, money};
use crate::ui::components::{BadgeVariant, ButtonVariant, badge, card, empty_state, progress_bar};
use crate::ui::fetch::resolve;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

fn consent_variant(status: ConsentStatus) -> BadgeVariant {
    match status {
        ConsentStatus::Approved => BadgeVariant::Success,
        ConsentStatus::Pending => BadgeVariant::Warning,
        ConsentStatus::Declined => BadgeVariant::Error,
        ConsentStatus::None => BadgeVariant::Outline,
    }
}

fn family_dashboard_button(ctx: &CardContext<'_>) -> String {
    ctx.action_button(
        "Family dashboard",
        ChatAction::OpenDashboard,
        &json!({ "path": "/dashboard/family" }),
        ButtonVariant::Secondary,
    )
}

/// Spending per family member who shares with this user.
pub async fn family_spending_card(ctx: &CardContext<'_>, props: Option<&FamilySpending>) -> String {
    let loaded = resolve("family-spending", props.cloned(), || async move {
        ctx.client.family().spending().await
    })
    .await;
    let (data, fallback) = loaded.or_default_with(|| FamilySpending::empty(ctx.currency.clone()));

    let mut body = format!(
        r#"<p class="text-2xl font-bold">{}</p><p class="text-sm text-textMuted">spent by the family</p>"#,
        money(data.total_spent, &data.currency)
    );
    if data.members.is_empty() {
        body.push_str(&empty_state("No family members are sharing yet."));
    } else {
        body.push_str(r#"<ul class="space-y-3">"#);
        for member in &data.members {
            let share = Progress::new(member.amount, data.total_spent);
            let top = member
                .top_category
                .as_deref()
                .map(|c| format!(r#"<span class="text-xs text-textMuted"> · mostly {}</span>"#, escape(c)))
                .unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="space-y-1"><div class="flex justify-between text-sm"><span>{}{top}</span><span class="font-medium">{}</span></div>{}</li>"#,
                escape(&member.name),
                money(member.amount, &data.currency),
                progress_bar(share.bar_width(), ProgressStatus::OnTrack)
            );
        }
        body.push_str("</ul>");
    }

    ctx.frame(
        "family-spending",
        fallback.then_some(None),
        &card("Family spending", Icon::Users, "", &body, &family_dashboard_button(ctx)),
    )
}

/// Sharing status, members and incoming requests.
pub async fn family_consent_card(ctx: &CardContext<'_>, props: Option<&FamilyConsent>) -> String {
    let loaded = resolve("family-consent", props.cloned(), || async move {
        ctx.client.family().consent().await
    })
    .await;
    let (consent, fallback) = loaded.or_default_with(FamilyConsent::default);

    let header_extra = badge(consent.status.label(), consent_variant(consent.status));
    let mut body = String::new();

    if consent.members.is_empty() {
        body.push_str(&empty_state(
            "Invite a family member to share spending with each other.",
        ));
    } else {
        body.push_str(r#"<ul class="divide-y divide-panelBorder text-sm">"#);
        for member in &consent.members {
            let relationship = member
                .relationship
                .as_deref()
                .map(|r| format!(r#"<span class="text-textMuted"> · {}</span>"#, escape(r)))
                .unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="flex items-center justify-between py-2"><span>{}{relationship}</span>{}</li>"#,
                escape(&member.name),
                badge(
                    member.consent_status.label(),
                    consent_variant(member.consent_status)
                )
            );
        }
        body.push_str("</ul>");
    }

    for request in &consent.pending_requests {
        let approve = json!({ "requestId": request.id, "approve": true });
        let decline = json!({ "requestId": request.id, "approve": false });
        let _ = write!(
            body,
            r#"<div class="flex items-center justify-between gap-2 rounded-lg border border-panelBorder p-3 text-sm"><span><span class="font-medium">{}</span> wants to share spending</span><div class="flex gap-1">{}{}</div></div>"#,
            escape(&request.from_name),
            ctx.action_button(
                "Approve",
                ChatAction::RequestFamilyConsent,
                &approve,
                ButtonVariant::Primary
            ),
            ctx.action_button(
                "Decline",
                ChatAction::RequestFamilyConsent,
                &decline,
                ButtonVariant::Ghost
            ),
        );
    }

    ctx.frame(
        "family-consent",
        fallback.then_some(None),
        &card(
            "Family sharing",
            Icon::Users,
            &header_extra,
            &body,
            &family_dashboard_button(ctx),
        ),
    )
}
