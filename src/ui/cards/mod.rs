//! Rich content cards.
//!
//! One renderer per [`MessageContent`] variant. Every renderer takes its
//! inline data when present and otherwise resolves it through the shared
//! client; when that fails it draws documented defaults with a "Try again"
//! control. Renderers never fail.
//!
//! Cards appear in two places. In the chat their buttons dispatch actions
//! into the thread; on the dashboard the same buttons run the action and
//! refresh the panels.

mod assistant;
mod balance;
mod budget;
mod family;
mod goals;
mod insights;
mod transactions;

use serde_json::{Value, json};

use crate::api::FinanceClient;
use crate::api::types::Currency;
use crate::chat::{ChatAction, MessageContent};
use crate::finance::{CategoryStyle, format_money};
use crate::ui::components::{ButtonSize, ButtonVariant, button, stale_notice};
use crate::ui::html::{escape, hx_vals};

pub use assistant::{ai_mode_card, error_retry_card, feature_guide_card, quick_actions_card, subscription_card};
pub use balance::{balance_card, bank_connect_card};
pub use budget::{budget_card, budget_overview_card};
pub use family::{family_consent_card, family_spending_card};
pub use goals::{goal_history_card, savings_goal_card, savings_goals_card};
pub use insights::{cash_flow_card, recurring_expenses_card, spending_analysis_card};
pub use transactions::transaction_list_card;

/// Where a card is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Inside a chat message.
    Chat { actions_disabled: bool },
    /// A dashboard panel.
    Dashboard,
}

impl Surface {
    #[must_use]
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::Dashboard => "dashboard",
        }
    }
}

/// Everything a card needs to render.
#[derive(Debug, Clone, Copy)]
pub struct CardContext<'a> {
    pub client: &'a FinanceClient,
    /// Used for defaults when the server names no currency.
    pub currency: &'a Currency,
    pub surface: Surface,
}

impl CardContext<'_> {
    #[must_use]
    pub fn actions_disabled(&self) -> bool {
        matches!(self.surface, Surface::Chat { actions_disabled: true })
    }

    fn action_attrs(&self, action: ChatAction, data: &Value) -> String {
        match self.surface {
            Surface::Chat { .. } => format!(
                r##"hx-post="/ui/chat/actions" hx-vals="{}" hx-include="#session-id" hx-target="#message-list" hx-swap="innerHTML""##,
                hx_vals(&json!({ "action": action.as_str(), "data": data.to_string() }))
            ),
            Surface::Dashboard => format!(
                r#"hx-post="/ui/chat/actions" hx-vals="{}" hx-swap="none""#,
                hx_vals(&json!({
                    "action": action.as_str(),
                    "data": data.to_string(),
                    "surface": "dashboard",
                }))
            ),
        }
    }

    /// Button that dispatches `action` with `data`.
    #[must_use]
    pub fn action_button(
        &self,
        label: &str,
        action: ChatAction,
        data: &Value,
        variant: ButtonVariant,
    ) -> String {
        button(
            label,
            variant,
            ButtonSize::Sm,
            &self.action_attrs(action, data),
            self.actions_disabled(),
        )
    }

    /// Destructive action behind a browser confirmation.
    #[must_use]
    pub fn confirm_button(&self, label: &str, action: ChatAction, data: &Value, confirm: &str) -> String {
        let attrs = format!(
            r#"{} hx-confirm="{}""#,
            self.action_attrs(action, data),
            escape(confirm)
        );
        button(
            label,
            ButtonVariant::Ghost,
            ButtonSize::Sm,
            &attrs,
            self.actions_disabled(),
        )
    }

    /// Attributes that re-fetch this card in place.
    fn retry_attrs(&self, tag: &str, id: Option<&str>) -> String {
        let mut url = format!("/ui/cards/{tag}?surface={}", self.surface.as_query());
        if let Some(id) = id {
            url.push_str("&id=");
            url.extend(url::form_urlencoded::byte_serialize(id.as_bytes()));
        }
        format!(
            r#"hx-get="{}" hx-target="closest [data-card]" hx-swap="outerHTML""#,
            escape(&url)
        )
    }

    /// Wrap a rendered card; fallbacks get the "Try again" notice.
    fn frame(&self, tag: &str, fallback_for: Option<Option<&str>>, inner: &str) -> String {
        let notice = fallback_for
            .map(|id| stale_notice(&self.retry_attrs(tag, id)))
            .unwrap_or_default();
        format!(r#"<div data-card="{tag}" class="space-y-2">{inner}{notice}</div>"#)
    }
}

/// Render one entry of a message's rich content.
pub async fn render_content(ctx: &CardContext<'_>, content: &MessageContent) -> String {
    match content {
        MessageContent::BalanceCard(d) => balance_card(ctx, d.as_ref()).await,
        MessageContent::BudgetCard(d) => budget_card(ctx, d.as_ref()).await,
        MessageContent::BudgetOverview(d) => budget_overview_card(ctx, d.as_ref()).await,
        MessageContent::SavingsGoalCard(d) => savings_goal_card(ctx, d.as_ref()).await,
        MessageContent::SavingsGoals(d) => savings_goals_card(ctx, d.as_ref()).await,
        MessageContent::GoalHistory(d) => goal_history_card(ctx, d.as_ref()).await,
        MessageContent::CashFlow(d) => cash_flow_card(ctx, d.as_ref()).await,
        MessageContent::SpendingAnalysis(d) => spending_analysis_card(ctx, d.as_ref()).await,
        MessageContent::TransactionList(d) => transaction_list_card(ctx, d.as_ref()).await,
        MessageContent::RecurringExpenses(d) => recurring_expenses_card(ctx, d.as_ref()).await,
        MessageContent::BankConnect(d) => bank_connect_card(ctx, d.as_ref()).await,
        MessageContent::QuickActions(d) => quick_actions_card(ctx, d.as_ref()),
        MessageContent::AiMode(d) => ai_mode_card(ctx, d.as_ref()).await,
        MessageContent::FeatureGuide(d) => feature_guide_card(ctx, d.as_ref()).await,
        MessageContent::FamilySpending(d) => family_spending_card(ctx, d.as_ref()).await,
        MessageContent::FamilyConsent(d) => family_consent_card(ctx, d.as_ref()).await,
        MessageContent::Subscription(d) => subscription_card(ctx, d.as_ref()).await,
        MessageContent::ErrorRetry(d) => error_retry_card(ctx, d.as_ref()),
        MessageContent::Unsupported(_) => String::new(),
    }
}

fn money(amount: f64, currency: &Currency) -> String {
    escape(&format_money(amount, currency.as_str()))
}

/// Icon chip for a spending category.
fn category_chip(category: &str) -> String {
    let style = CategoryStyle::for_category(category);
    format!(
        r#"<span class="inline-flex h-8 w-8 shrink-0 items-center justify-center rounded-lg {}">{}</span>"#,
        style.accent,
        style.icon.svg("")
    )
}
