use std::fmt::Write as _;

use crate::api::types::{BalanceSummary, BankStatus};
use crate::chat::{ChatAction, no_data};
use crate::ui::cards::{CardContext, money};
use crate::ui::components::{BadgeVariant, ButtonVariant, badge, card};
use crate::ui::fetch::resolve;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Accounts listed under the total before "and N more".
const SHOWN_ACCOUNTS: usize = 3;

/// Total balance across linked accounts.
///
/// Falls back to `BHD 0.000` and "0 accounts".
pub async fn balance_card(ctx: &CardContext<'_>, props: Option<&BalanceSummary>) -> String {
    let loaded = resolve("balance-card", props.cloned(), || async move {
        ctx.client.summary().get().await
    })
    .await;
    let (summary, fallback) =
        loaded.or_default_with(|| BalanceSummary::empty(ctx.currency.clone()));

    let count = summary.accounts_count();
    let accounts_label = if count == 1 {
        "1 account".to_string()
    } else {
        format!("{count} accounts")
    };

    let mut body = format!(
        r#"<p class="text-3xl font-bold tracking-tight">{}</p><p class="text-sm text-textMuted">{accounts_label}</p>"#,
        money(summary.total_balance, &summary.currency)
    );

    if !summary.accounts.is_empty() {
        body.push_str(r#"<ul class="divide-y divide-panelBorder text-sm">"#);
        for account in summary.accounts.iter().take(SHOWN_ACCOUNTS) {
            let bank = account
                .bank_name
                .as_deref()
                .map(|b| format!(r#"<span class="text-textMuted"> · {}</span>"#, escape(b)))
                .unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="flex justify-between py-2"><span>{}{bank}</span><span class="font-medium">{}</span></li>"#,
                escape(&account.name),
                money(account.balance, &account.currency)
            );
        }
        body.push_str("</ul>");
        let hidden = summary.accounts.len().saturating_sub(SHOWN_ACCOUNTS);
        if hidden > 0 {
            let _ = write!(body, r#"<p class="text-xs text-textMuted">and {hidden} more</p>"#);
        }
    }

    if let Some(synced) = summary.last_synced_at {
        let _ = write!(
            body,
            r#"<p class="text-xs text-textMuted">Synced {}</p>"#,
            synced.format("%-d %b %Y, %H:%M UTC")
        );
    }

    let status = if summary.bank_connected {
        badge("Connected", BadgeVariant::Success)
    } else {
        badge("No bank linked", BadgeVariant::Outline)
    };

    let mut footer = String::new();
    if !summary.bank_connected {
        footer.push_str(&ctx.action_button(
            "Connect bank",
            ChatAction::ConnectBank,
            &no_data(),
            ButtonVariant::Primary,
        ));
    }
    footer.push_str(&ctx.action_button(
        "View spending",
        ChatAction::ShowSpending,
        &no_data(),
        ButtonVariant::Secondary,
    ));

    ctx.frame(
        "balance-card",
        fallback.then_some(None),
        &card("Total balance", Icon::Wallet, &status, &body, &footer),
    )
}

/// Open-banking connection prompt.
///
/// Without inline status it reads `bankConnected` from the summary; the
/// fallback assumes no bank is linked.
pub async fn bank_connect_card(ctx: &CardContext<'_>, props: Option<&BankStatus>) -> String {
    let loaded = resolve("bank-connect", props.cloned(), || async move {
        ctx.client.summary().get().await.map(|s| BankStatus {
            connected: s.bank_connected,
            bank_name: s.accounts.iter().find_map(|a| a.bank_name.clone()),
        })
    })
    .await;
    let (status, fallback) = loaded.or_default_with(BankStatus::default);

    let (body, footer) = if status.connected {
        let bank = status.bank_name.as_deref().unwrap_or("your bank");
        (
            format!(
                r#"<p class="text-sm">Connected to <span class="font-medium">{}</span>. Balances and transactions sync automatically.</p>"#,
                escape(bank)
            ),
            ctx.action_button(
                "Show balance",
                ChatAction::ShowBalance,
                &no_data(),
                ButtonVariant::Secondary,
            ),
        )
    } else {
        (
            r#"<p class="text-sm text-textSecondary">Link your bank to see balances, track spending and get insights. Your credentials are never shared with us.</p>"#.to_string(),
            ctx.action_button(
                "Connect bank",
                ChatAction::ConnectBank,
                &no_data(),
                ButtonVariant::Primary,
            ),
        )
    };

    ctx.frame(
        "bank-connect",
        fallback.then_some(None),
        &card("Bank connection", Icon::Landmark, "", &body, &footer),
    )
}
