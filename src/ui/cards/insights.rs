use std::fmt::Write as _;

use crate::api::types::{CashFlowData, RecurringList, SpendingInsights};
use crate::chat::{ChatAction, no_data};
use crate::finance::{Progress, ProgressStatus};
use crate::ui::cards::{CardContext, category_chip, money};
use crate::ui::components::{ButtonVariant, card, empty_state, progress_bar};
use crate::ui::fetch::resolve;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Income against expenses, with a per-period history when available.
pub async fn cash_flow_card(ctx: &CardContext<'_>, props: Option<&CashFlowData>) -> String {
    let loaded = resolve("cash-flow", props.cloned(), || async move {
        ctx.client.insights().cash_flow().await
    })
    .await;
    let (data, fallback) = loaded.or_default_with(|| CashFlowData::empty(ctx.currency.clone()));

    let net = data.net();
    let (net_class, net_icon) = if net < 0.0 {
        ("text-danger", Icon::TrendingDown)
    } else {
        ("text-success", Icon::TrendingUp)
    };
    let period = data
        .period
        .as_deref()
        .map(|p| format!(r#"<span class="text-xs text-textMuted">{}</span>"#, escape(p)))
        .unwrap_or_default();

    let mut body = format!(
        r#"<div class="grid grid-cols-3 gap-3 text-sm">
<div><p class="text-textMuted">Income</p><p class="font-semibold text-success">{}</p></div>
<div><p class="text-textMuted">Expenses</p><p class="font-semibold">{}</p></div>
<div><p class="text-textMuted">Net</p><p class="flex items-center gap-1 font-semibold {net_class}">{}{}</p></div>
</div>"#,
        money(data.income, &data.currency),
        money(data.expenses, &data.currency),
        net_icon.svg(""),
        money(net, &data.currency),
    );

    if !data.history.is_empty() {
        // Bars are scaled against the largest value in the history.
        let peak = data
            .history
            .iter()
            .flat_map(|p| [p.income, p.expenses])
            .fold(0.0_f64, f64::max);
        body.push_str(r#"<ul class="space-y-2 text-xs">"#);
        for point in &data.history {
            let income = Progress::new(point.income, peak);
            let expenses = Progress::new(point.expenses, peak);
            let _ = write!(
                body,
                r#"<li class="grid grid-cols-[4rem_1fr] items-center gap-2"><span class="text-textMuted">{}</span><div class="space-y-1">{}{}</div></li>"#,
                escape(&point.label),
                progress_bar(income.bar_width(), ProgressStatus::OnTrack),
                progress_bar(expenses.bar_width(), ProgressStatus::NearLimit),
            );
        }
        body.push_str("</ul>");
    }

    let footer = ctx.action_button(
        "Where did it go?",
        ChatAction::ShowSpending,
        &no_data(),
        ButtonVariant::Secondary,
    );
    ctx.frame(
        "cash-flow",
        fallback.then_some(None),
        &card("Cash flow", Icon::ArrowLeftRight, &period, &body, &footer),
    )
}

/// Spending broken down by category.
pub async fn spending_analysis_card(
    ctx: &CardContext<'_>,
    props: Option<&SpendingInsights>,
) -> String {
    let loaded = resolve("spending-analysis", props.cloned(), || async move {
        ctx.client.insights().spending().await
    })
    .await;
    let (data, fallback) =
        loaded.or_default_with(|| SpendingInsights::empty(ctx.currency.clone()));

    let mut body = format!(
        r#"<p class="text-2xl font-bold">{}</p><p class="text-sm text-textMuted">spent{}</p>"#,
        money(data.total_spent, &data.currency),
        data.period
            .as_deref()
            .map(|p| format!(" {}", escape(p)))
            .unwrap_or_default()
    );

    if data.categories.is_empty() {
        body.push_str(&empty_state("No spending recorded yet."));
    } else {
        let mut categories = data.categories.clone();
        categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        body.push_str(r#"<ul class="space-y-3">"#);
        for category in &categories {
            let share = Progress::new(category.share_of(data.total_spent), 100.0);
            let count = match category.transaction_count {
                0 => String::new(),
                1 => " · 1 transaction".into(),
                n => format!(" · {n} transactions"),
            };
            let _ = write!(
                body,
                r#"<li class="flex items-center gap-3">{}<div class="flex-1 space-y-1"><div class="flex justify-between text-sm"><span>{}<span class="text-xs text-textMuted">{count}</span></span><span class="font-medium">{}</span></div>{}</div><span class="w-10 text-right text-xs text-textMuted">{:.0}%</span></li>"#,
                category_chip(&category.category),
                escape(&category.category),
                money(category.amount, &data.currency),
                progress_bar(share.bar_width(), ProgressStatus::OnTrack),
                share.display_percent(),
            );
        }
        body.push_str("</ul>");
    }

    for highlight in &data.highlights {
        let _ = write!(
            body,
            r#"<p class="flex items-start gap-2 text-sm">{}<span>{}</span></p>"#,
            Icon::Sparkles.svg("mt-0.5 text-primary"),
            escape(highlight)
        );
    }

    let footer = format!(
        "{}{}",
        ctx.action_button(
            "Set a budget",
            ChatAction::CreateBudget,
            &no_data(),
            ButtonVariant::Primary
        ),
        ctx.action_button(
            "Transactions",
            ChatAction::ShowTransactions,
            &no_data(),
            ButtonVariant::Secondary
        ),
    );
    ctx.frame(
        "spending-analysis",
        fallback.then_some(None),
        &card("Spending", Icon::PieChart, "", &body, &footer),
    )
}

/// Subscriptions and bills that repeat.
pub async fn recurring_expenses_card(ctx: &CardContext<'_>, props: Option<&RecurringList>) -> String {
    let loaded = resolve("recurring-expenses", props.cloned(), || async move {
        ctx.client
            .insights()
            .recurring()
            .await
            .map(|recurring| RecurringList { recurring })
    })
    .await;
    let (list, fallback) = loaded.or_default_with(RecurringList::default);

    let currency = list
        .recurring
        .first()
        .map_or_else(|| ctx.currency.clone(), |r| r.currency.clone());
    let monthly: f64 = list.recurring.iter().map(|r| r.monthly_amount()).sum();

    let mut body = format!(
        r#"<p class="text-sm text-textMuted">About <span class="font-semibold text-textPrimary">{}</span> a month</p>"#,
        money(monthly, &currency)
    );
    if list.recurring.is_empty() {
        body.push_str(&empty_state("No recurring expenses detected."));
    } else {
        body.push_str(r#"<ul class="divide-y divide-panelBorder text-sm">"#);
        for item in &list.recurring {
            let next = item
                .next_date
                .map(|d| format!("next {}", d.format("%-d %b")))
                .unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="flex items-center gap-3 py-2">{}<div class="flex-1"><p>{}</p><p class="text-xs text-textMuted">{} {next}</p></div><span class="font-medium">{}</span></li>"#,
                category_chip(item.category.as_deref().unwrap_or(&item.name)),
                escape(&item.name),
                item.frequency.label(),
                money(item.amount, &item.currency)
            );
        }
        body.push_str("</ul>");
    }

    ctx.frame(
        "recurring-expenses",
        fallback.then_some(None),
        &card("Recurring expenses", Icon::Repeat, "", &body, ""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Currency;
    use crate::api::{FinanceClient, MemoryTransport, Method, Transport};
    use crate::query::QueryCache;
    use crate::ui::cards::Surface;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn fetched_cash_flow_shows_negative_net() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(
            Method::Get,
            "/api/finance/cash-flow",
            json!({ "income": 500, "expenses": 650, "currency": "BHD" }),
        );
        let client = FinanceClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            QueryCache::disabled(),
        );
        let currency = Currency::default();
        let ctx = CardContext {
            client: &client,
            currency: &currency,
            surface: Surface::Dashboard,
        };
        let html = cash_flow_card(&ctx, None).await;
        assert!(html.contains("-BHD 150.000"));
        assert!(html.contains("text-danger"));
        assert!(!html.contains("Couldn't refresh"));
    }
}
