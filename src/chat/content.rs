//! Rich content attached to assistant messages.
//!
//! On the wire each entry is `{ "type": "<kebab-tag>", "data": { ... } }`.
//! Decoding is lenient at the envelope level and strict at the payload level:
//! an unknown tag becomes [`MessageContent::Unsupported`], and a payload that
//! does not match the card's schema becomes `None`, which makes the card
//! fetch its own data when rendered.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::types::{
    AiModeSetting, BalanceSummary, BankStatus, Budget, BudgetList, CashFlowData, FamilyConsent,
    FamilySpending, FeatureGuide, GoalHistoryCard, GoalList, QuickActions, RecurringList,
    RetryCard, SavingsGoal, SpendingInsights, Subscription, TransactionList,
};

/// One card in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawContent", into = "RawContent")]
pub enum MessageContent {
    BalanceCard(Option<BalanceSummary>),
    BudgetCard(Option<Budget>),
    BudgetOverview(Option<BudgetList>),
    SavingsGoalCard(Option<SavingsGoal>),
    SavingsGoals(Option<GoalList>),
    GoalHistory(Option<GoalHistoryCard>),
    CashFlow(Option<CashFlowData>),
    SpendingAnalysis(Option<SpendingInsights>),
    TransactionList(Option<TransactionList>),
    RecurringExpenses(Option<RecurringList>),
    BankConnect(Option<BankStatus>),
    QuickActions(Option<QuickActions>),
    AiMode(Option<AiModeSetting>),
    FeatureGuide(Option<FeatureGuide>),
    FamilySpending(Option<FamilySpending>),
    FamilyConsent(Option<FamilyConsent>),
    Subscription(Option<Subscription>),
    ErrorRetry(Option<RetryCard>),
    /// A tag this build does not know. Renders as nothing.
    Unsupported(String),
}

/// Every tag this build renders.
pub const CARD_TAGS: [&str; 18] = [
    "balance-card",
    "budget-card",
    "budget-overview",
    "savings-goal-card",
    "savings-goals",
    "goal-history",
    "cash-flow",
    "spending-analysis",
    "transaction-list",
    "recurring-expenses",
    "bank-connect",
    "quick-actions",
    "ai-mode",
    "feature-guide",
    "family-spending",
    "family-consent",
    "subscription",
    "error-retry",
];

impl MessageContent {
    /// A card with no inline data, or `None` for an unknown tag.
    #[must_use]
    pub fn empty(tag: &str) -> Option<Self> {
        match Self::from(RawContent {
            kind: tag.to_string(),
            data: None,
        }) {
            Self::Unsupported(_) => None,
            content => Some(content),
        }
    }

    /// Wire tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::BalanceCard(_) => "balance-card",
            Self::BudgetCard(_) => "budget-card",
            Self::BudgetOverview(_) => "budget-overview",
            Self::SavingsGoalCard(_) => "savings-goal-card",
            Self::SavingsGoals(_) => "savings-goals",
            Self::GoalHistory(_) => "goal-history",
            Self::CashFlow(_) => "cash-flow",
            Self::SpendingAnalysis(_) => "spending-analysis",
            Self::TransactionList(_) => "transaction-list",
            Self::RecurringExpenses(_) => "recurring-expenses",
            Self::BankConnect(_) => "bank-connect",
            Self::QuickActions(_) => "quick-actions",
            Self::AiMode(_) => "ai-mode",
            Self::FeatureGuide(_) => "feature-guide",
            Self::FamilySpending(_) => "family-spending",
            Self::FamilyConsent(_) => "family-consent",
            Self::Subscription(_) => "subscription",
            Self::ErrorRetry(_) => "error-retry",
            Self::Unsupported(tag) => tag,
        }
    }

    /// Whether the card carries inline data.
    #[must_use]
    pub fn has_data(&self) -> bool {
        match self {
            Self::BalanceCard(d) => d.is_some(),
            Self::BudgetCard(d) => d.is_some(),
            Self::BudgetOverview(d) => d.is_some(),
            Self::SavingsGoalCard(d) => d.is_some(),
            Self::SavingsGoals(d) => d.is_some(),
            Self::GoalHistory(d) => d.is_some(),
            Self::CashFlow(d) => d.is_some(),
            Self::SpendingAnalysis(d) => d.is_some(),
            Self::TransactionList(d) => d.is_some(),
            Self::RecurringExpenses(d) => d.is_some(),
            Self::BankConnect(d) => d.is_some(),
            Self::QuickActions(d) => d.is_some(),
            Self::AiMode(d) => d.is_some(),
            Self::FeatureGuide(d) => d.is_some(),
            Self::FamilySpending(d) => d.is_some(),
            Self::FamilyConsent(d) => d.is_some(),
            Self::Subscription(d) => d.is_some(),
            Self::ErrorRetry(d) => d.is_some(),
            Self::Unsupported(_) => false,
        }
    }
}

/// Wire envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn payload<T: DeserializeOwned>(tag: &str, data: Option<Value>) -> Option<T> {
    let data = data.filter(|d| !d.is_null())?;
    match serde_json::from_value(data) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::debug!(
                name: "chat.content.partial",
                tag = %tag,
                error = %e,
                "Card data does not match its schema; the card will fetch instead"
            );
            None
        }
    }
}

impl From<RawContent> for MessageContent {
    fn from(raw: RawContent) -> Self {
        let RawContent { kind, data } = raw;
        let tag = kind.as_str();
        match tag {
            "balance-card" => Self::BalanceCard(payload(tag, data)),
            "budget-card" => Self::BudgetCard(payload(tag, data)),
            "budget-overview" => Self::BudgetOverview(payload(tag, data)),
            "savings-goal-card" => Self::SavingsGoalCard(payload(tag, data)),
            "savings-goals" => Self::SavingsGoals(payload(tag, data)),
            "goal-history" => Self::GoalHistory(payload(tag, data)),
            "cash-flow" => Self::CashFlow(payload(tag, data)),
            "spending-analysis" => Self::SpendingAnalysis(payload(tag, data)),
            "transaction-list" => Self::TransactionList(payload(tag, data)),
            "recurring-expenses" => Self::RecurringExpenses(payload(tag, data)),
            "bank-connect" => Self::BankConnect(payload(tag, data)),
            "quick-actions" => Self::QuickActions(payload(tag, data)),
            "ai-mode" => Self::AiMode(payload(tag, data)),
            "feature-guide" => Self::FeatureGuide(payload(tag, data)),
            "family-spending" => Self::FamilySpending(payload(tag, data)),
            "family-consent" => Self::FamilyConsent(payload(tag, data)),
            "subscription" => Self::Subscription(payload(tag, data)),
            "error-retry" => Self::ErrorRetry(payload(tag, data)),
            _ => {
                tracing::warn!(
                    name: "chat.content.unsupported",
                    tag = %tag,
                    "Ignoring unknown rich content type"
                );
                Self::Unsupported(kind)
            }
        }
    }
}

fn to_value<T: Serialize>(data: Option<&T>) -> Option<Value> {
    data.and_then(|d| serde_json::to_value(d).ok())
}

impl From<MessageContent> for RawContent {
    fn from(content: MessageContent) -> Self {
        let kind = content.tag().to_string();
        let data = match &content {
            MessageContent::BalanceCard(d) => to_value(d.as_ref()),
            MessageContent::BudgetCard(d) => to_value(d.as_ref()),
            MessageContent::BudgetOverview(d) => to_value(d.as_ref()),
            MessageContent::SavingsGoalCard(d) => to_value(d.as_ref()),
            MessageContent::SavingsGoals(d) => to_value(d.as_ref()),
            MessageContent::GoalHistory(d) => to_value(d.as_ref()),
            MessageContent::CashFlow(d) => to_value(d.as_ref()),
            MessageContent::SpendingAnalysis(d) => to_value(d.as_ref()),
            MessageContent::TransactionList(d) => to_value(d.as_ref()),
            MessageContent::RecurringExpenses(d) => to_value(d.as_ref()),
            MessageContent::BankConnect(d) => to_value(d.as_ref()),
            MessageContent::QuickActions(d) => to_value(d.as_ref()),
            MessageContent::AiMode(d) => to_value(d.as_ref()),
            MessageContent::FeatureGuide(d) => to_value(d.as_ref()),
            MessageContent::FamilySpending(d) => to_value(d.as_ref()),
            MessageContent::FamilyConsent(d) => to_value(d.as_ref()),
            MessageContent::Subscription(d) => to_value(d.as_ref()),
            MessageContent::ErrorRetry(d) => to_value(d.as_ref()),
            MessageContent::Unsupported(_) => None,
        };
        Self { kind, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_card_with_complete_data() {
        let content: MessageContent = serde_json::from_value(json!({
            "type": "budget-card",
            "data": { "id": "b1", "category": "Dining", "amount": 200, "spent": 250 }
        }))
        .unwrap();
        let MessageContent::BudgetCard(Some(budget)) = content else {
            panic!("expected a budget card with data");
        };
        assert_eq!(budget.category, "Dining");
        assert!(budget.progress().is_over());
    }

    #[test]
    fn partial_data_means_fetch() {
        let content: MessageContent = serde_json::from_value(json!({
            "type": "balance-card",
            "data": { "currency": "BHD" }
        }))
        .unwrap();
        assert_eq!(content, MessageContent::BalanceCard(None));
    }

    #[test]
    fn unknown_tags_are_kept_but_unsupported() {
        let content: MessageContent =
            serde_json::from_value(json!({ "type": "crypto-ticker", "data": {} })).unwrap();
        assert_eq!(content, MessageContent::Unsupported("crypto-ticker".into()));
    }

    #[test]
    fn every_known_tag_has_an_empty_card() {
        for tag in CARD_TAGS {
            let card = MessageContent::empty(tag).unwrap();
            assert_eq!(card.tag(), tag);
            assert!(!card.has_data());
        }
        assert!(MessageContent::empty("nope").is_none());
    }

    #[test]
    fn serialises_back_to_the_wire_shape() {
        let value = serde_json::to_value(MessageContent::CashFlow(None)).unwrap();
        assert_eq!(value, json!({ "type": "cash-flow" }));
    }
}
