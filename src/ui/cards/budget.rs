use std::fmt::Write as _;

use serde_json::json;

use crate::api::types::{Budget, BudgetList, Currency};
use crate::chat::{ChatAction, no_data};
use crate::finance::ProgressStatus;
use crate::ui::cards::{CardContext, category_chip, money};
use crate::ui::components::{BadgeVariant, ButtonVariant, badge, card, empty_state, progress_bar};
use crate::ui::fetch::{Loaded, resolve};
use crate::ui::html::escape;
use crate::ui::icons::Icon;

fn status_label(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::OnTrack => "On track",
        ProgressStatus::NearLimit => "Near limit",
        ProgressStatus::Over => "Over budget",
    }
}

/// Spent-of-limit line, bar and remaining/over text for one budget.
fn budget_progress(budget: &Budget) -> String {
    let progress = budget.progress();
    let tail = if progress.is_over() {
        format!(
            r#"<span class="text-danger font-medium">Over by {}</span>"#,
            money(progress.over_by(), &budget.currency)
        )
    } else {
        format!("{} left", money(progress.remaining(), &budget.currency))
    };
    format!(
        r#"<div class="space-y-1.5">
<div class="flex justify-between text-sm"><span>{} of {}</span><span class="text-textMuted">{:.0}%</span></div>
{}
<div class="flex justify-between text-xs text-textMuted"><span>{}</span><span>{tail}</span></div>
</div>"#,
        money(progress.current(), &budget.currency),
        money(progress.target(), &budget.currency),
        progress.percent(),
        progress_bar(progress.bar_width(), progress.status()),
        budget.period.label(),
    )
}

fn placeholder_budget(currency: &Currency) -> Budget {
    Budget {
        id: String::new(),
        category: "Budget".into(),
        amount: 0.0,
        spent: 0.0,
        currency: currency.clone(),
        period: Default::default(),
    }
}

/// A single budget with its progress.
///
/// Without inline data it shows the first budget on file; the fallback is a
/// zero budget with no actions.
pub async fn budget_card(ctx: &CardContext<'_>, props: Option<&Budget>) -> String {
    let loaded = resolve("budget-card", props.cloned().map(Some), || async move {
        ctx.client
            .budgets()
            .list()
            .await
            .map(|list| list.into_iter().next())
    })
    .await;
    let (budget, fallback) = loaded.or_default_with(|| Some(placeholder_budget(ctx.currency)));

    let Some(budget) = budget else {
        let footer = ctx.action_button(
            "Create budget",
            ChatAction::CreateBudget,
            &no_data(),
            ButtonVariant::Primary,
        );
        return ctx.frame(
            "budget-card",
            None,
            &card("Budget", Icon::PieChart, "", &empty_state("No budgets yet."), &footer),
        );
    };

    let status = budget.progress().status();
    let header_extra = badge(status_label(status), BadgeVariant::from(status));
    let body = format!(
        r#"<div class="flex items-center gap-3">{}<span class="font-medium">{}</span></div>{}"#,
        category_chip(&budget.category),
        escape(&budget.category),
        budget_progress(&budget)
    );

    let footer = if budget.id.is_empty() {
        String::new()
    } else {
        let data = json!({ "id": budget.id });
        format!(
            "{}{}",
            ctx.action_button("Edit", ChatAction::EditBudget, &data, ButtonVariant::Secondary),
            ctx.confirm_button(
                "Delete",
                ChatAction::DeleteBudget,
                &data,
                &format!("Delete the {} budget?", budget.category)
            )
        )
    };

    ctx.frame(
        "budget-card",
        fallback.then_some(None),
        &card(&budget.category, Icon::PieChart, &header_extra, &body, &footer),
    )
}

/// All budgets with a combined total.
pub async fn budget_overview_card(ctx: &CardContext<'_>, props: Option<&BudgetList>) -> String {
    let loaded = resolve("budget-overview", props.cloned(), || async move {
        ctx.client
            .budgets()
            .list()
            .await
            .map(|budgets| BudgetList { budgets })
    })
    .await;
    let fallback = loaded.is_fallback();
    let list = match loaded {
        Loaded::FromProps(list) | Loaded::Fetched(list) => list,
        Loaded::Fallback => BudgetList::default(),
    };

    let mut body = String::new();
    if list.budgets.is_empty() {
        body.push_str(&empty_state(
            "No budgets yet. Set one to start tracking a category.",
        ));
    } else {
        let currency = list
            .budgets
            .first()
            .map_or_else(|| ctx.currency.clone(), |b| b.currency.clone());
        let limit: f64 = list.budgets.iter().map(|b| b.amount).sum();
        let spent: f64 = list.budgets.iter().map(|b| b.spent).sum();
        let over = list
            .budgets
            .iter()
            .filter(|b| b.progress().is_over())
            .count();
        let _ = write!(
            body,
            r#"<div class="flex items-baseline justify-between"><p class="text-sm text-textMuted">Spent {} of {}</p>{}</div>"#,
            money(spent, &currency),
            money(limit, &currency),
            if over > 0 {
                badge(&format!("{over} over"), BadgeVariant::Error)
            } else {
                String::new()
            }
        );
        body.push_str(r#"<ul class="space-y-4">"#);
        for budget in &list.budgets {
            let _ = write!(
                body,
                r#"<li class="space-y-2"><div class="flex items-center justify-between gap-3"><div class="flex items-center gap-3">{}<span class="font-medium">{}</span></div>{}</div>{}</li>"#,
                category_chip(&budget.category),
                escape(&budget.category),
                ctx.action_button(
                    "Edit",
                    ChatAction::EditBudget,
                    &json!({ "id": budget.id }),
                    ButtonVariant::Ghost
                ),
                budget_progress(budget)
            );
        }
        body.push_str("</ul>");
    }

    let footer = ctx.action_button(
        "New budget",
        ChatAction::CreateBudget,
        &no_data(),
        ButtonVariant::Primary,
    );
    ctx.frame(
        "budget-overview",
        fallback.then_some(None),
        &card("Budgets", Icon::PieChart, "", &body, &footer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BudgetPeriod;
    use crate::api::{FinanceClient, MemoryTransport, Method, Transport};
    use crate::query::QueryCache;
    use crate::ui::cards::Surface;
    use std::sync::Arc;

    #[test]
    fn over_budget_shows_full_bar_and_true_overage() {
        let budget = Budget {
            id: "b1".into(),
            category: "Dining".into(),
            amount: 200.0,
            spent: 250.0,
            currency: Currency::default(),
            period: BudgetPeriod::Monthly,
        };
        let html = budget_progress(&budget);
        assert!(html.contains("width: 100%"));
        assert!(html.contains("Over by BHD 50.000"));
        assert!(html.contains("125%"));
    }

    #[test]
    fn under_budget_shows_remaining() {
        let budget = Budget {
            spent: 50.0,
            ..placeholder_budget(&Currency::default())
        };
        let budget = Budget {
            amount: 200.0,
            ..budget
        };
        let html = budget_progress(&budget);
        assert!(html.contains("BHD 150.000 left"));
        assert!(html.contains("width: 25%"));
    }

    #[tokio::test]
    async fn fetched_budget_without_currency_uses_display_currency() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(
            Method::Get,
            "/api/finance/budgets",
            json!({ "budgets": [{ "id": "b1", "category": "Dining", "amount": 200, "spent": 50 }] }),
        );
        let usd = Currency::new("usd");
        let client = FinanceClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            QueryCache::disabled(),
        )
        .with_display_currency(usd.clone());
        let ctx = CardContext {
            client: &client,
            currency: &usd,
            surface: Surface::Dashboard,
        };

        let html = budget_card(&ctx, None).await;
        assert!(html.contains("USD 50.00 of USD 200.00"), "{html}");
        assert!(!html.contains("BHD"));
    }
}
