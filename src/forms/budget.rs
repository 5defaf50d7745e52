use async_trait::async_trait;
use serde::Deserialize;

use crate::api::FinanceClient;
use crate::api::types::{Budget, BudgetInput, BudgetPeriod};
use crate::error::{FetchError, ValidationError};
use crate::forms::{SheetForm, amount_text, positive_amount, required};

/// Create or edit a budget.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BudgetForm {
    /// Present when editing.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub period: String,
}

impl BudgetForm {
    #[must_use]
    pub fn from_existing(existing: Option<&Budget>) -> Self {
        existing.map_or_else(
            || Self {
                period: "monthly".into(),
                ..Self::default()
            },
            |b| Self {
                id: Some(b.id.clone()),
                category: b.category.clone(),
                amount: amount_text(b.amount),
                period: b.period.as_str().to_string(),
            },
        )
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

#[async_trait]
impl SheetForm for BudgetForm {
    type Input = BudgetInput;
    type Output = Budget;

    const NAME: &'static str = "budget";

    fn validate(&self) -> Result<BudgetInput, ValidationError> {
        let category = required("category", "Category", &self.category)?;
        let amount = positive_amount("amount", &self.amount)?;
        let period = self
            .period
            .parse::<BudgetPeriod>()
            .map_err(|()| ValidationError::new("period", "Choose weekly, monthly or yearly"))?;
        Ok(BudgetInput {
            category,
            amount,
            period,
        })
    }

    async fn save(&self, client: &FinanceClient, input: BudgetInput) -> Result<Budget, FetchError> {
        match self.id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => client.budgets().update(id, &input).await,
            None => client.budgets().create(&input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTransport, Method, Transport};
    use crate::forms::SubmitOutcome;
    use crate::query::QueryCache;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: &Arc<MemoryTransport>) -> FinanceClient {
        FinanceClient::new(Arc::clone(transport) as Arc<dyn Transport>, QueryCache::disabled())
    }

    fn form(amount: &str) -> BudgetForm {
        BudgetForm {
            id: None,
            category: "Dining".into(),
            amount: amount.into(),
            period: "monthly".into(),
        }
    }

    #[tokio::test]
    async fn invalid_amounts_never_reach_the_network() {
        let transport = Arc::new(MemoryTransport::new());
        let client = client(&transport);
        for bad in ["0", "-10", "abc", ""] {
            let outcome = form(bad).submit(&client).await;
            assert!(
                matches!(&outcome, SubmitOutcome::Invalid(e) if e.field == "amount"),
                "{bad:?} gave {outcome:?}"
            );
        }
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn blank_category_is_rejected() {
        let mut f = form("100");
        f.category = "   ".into();
        assert_eq!(f.validate().unwrap_err().field, "category");
    }

    #[tokio::test]
    async fn creates_with_post_and_edits_with_put() {
        let transport = Arc::new(MemoryTransport::new());
        let saved = json!({ "budget": { "id": "b1", "category": "Dining", "amount": 150 } });
        transport.respond(Method::Post, "/api/finance/budgets", saved.clone());
        transport.respond(Method::Put, "/api/finance/budgets/b1", saved);
        let client = client(&transport);

        assert!(matches!(form("150").submit(&client).await, SubmitOutcome::Saved(_)));

        let mut edit = form("150");
        edit.id = Some("b1".into());
        assert!(matches!(edit.submit(&client).await, SubmitOutcome::Saved(b) if b.id == "b1"));
        assert_eq!(transport.count(Method::Put, "/api/finance/budgets/b1"), 1);
    }

    #[tokio::test]
    async fn server_errors_are_shown_verbatim() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail(
            Method::Post,
            "/api/finance/budgets",
            FetchError::Api {
                status: 409,
                message: "Budget for Dining already exists".into(),
            },
        );
        let outcome = form("100").submit(&client(&transport)).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Budget for Dining already exists".into())
        );
    }

    #[test]
    fn seeds_from_existing_budget() {
        let budget = Budget {
            id: "b1".into(),
            category: "Groceries".into(),
            amount: 300.0,
            spent: 10.0,
            currency: Default::default(),
            period: BudgetPeriod::Weekly,
        };
        let f = BudgetForm::from_existing(Some(&budget));
        assert!(f.is_edit());
        assert_eq!(f.amount, "300");
        assert_eq!(f.period, "weekly");
        assert!(!BudgetForm::from_existing(None).is_edit());
    }
}
