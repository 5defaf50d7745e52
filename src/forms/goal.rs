use async_trait::async_trait;
use serde::Deserialize;

use crate::api::FinanceClient;
use crate::api::types::{GoalInput, SavingsGoal};
use crate::error::{FetchError, ValidationError};
use crate::forms::{
    SheetForm, amount_text, non_negative_amount, optional_date, positive_amount, required,
};

/// Create or edit a savings goal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GoalForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target_amount: String,
    #[serde(default)]
    pub current_amount: String,
    /// `YYYY-MM-DD` or blank.
    #[serde(default)]
    pub deadline: String,
}

impl GoalForm {
    #[must_use]
    pub fn from_existing(existing: Option<&SavingsGoal>) -> Self {
        existing.map_or_else(Self::default, |g| Self {
            id: Some(g.id.clone()),
            name: g.name.clone(),
            target_amount: amount_text(g.target_amount),
            current_amount: amount_text(g.current_amount),
            deadline: g
                .deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

#[async_trait]
impl SheetForm for GoalForm {
    type Input = GoalInput;
    type Output = SavingsGoal;

    const NAME: &'static str = "goal";

    fn validate(&self) -> Result<GoalInput, ValidationError> {
        Ok(GoalInput {
            name: required("name", "Goal name", &self.name)?,
            target_amount: positive_amount("target_amount", &self.target_amount)?,
            current_amount: non_negative_amount("current_amount", &self.current_amount)?,
            deadline: optional_date("deadline", &self.deadline)?,
        })
    }

    async fn save(
        &self,
        client: &FinanceClient,
        input: GoalInput,
    ) -> Result<SavingsGoal, FetchError> {
        match self.id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => client.goals().update(id, &input).await,
            None => client.goals().create(&input).await,
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

    fn form() -> GoalForm {
        GoalForm {
            id: None,
            name: "Emergency fund".into(),
            target_amount: "5000".into(),
            current_amount: String::new(),
            deadline: String::new(),
        }
    }

    #[test]
    fn valid_goal() {
        let input = form().validate().unwrap();
        assert_eq!(input.target_amount, 5000.0);
        assert_eq!(input.current_amount, 0.0);
        assert!(input.deadline.is_none());
    }

    #[test]
    fn rejects_bad_fields() {
        let mut f = form();
        f.target_amount = "0".into();
        assert_eq!(f.validate().unwrap_err().field, "target_amount");

        let mut f = form();
        f.current_amount = "-1".into();
        assert_eq!(f.validate().unwrap_err().field, "current_amount");

        let mut f = form();
        f.deadline = "next year".into();
        assert_eq!(f.validate().unwrap_err().field, "deadline");

        let mut f = form();
        f.name = String::new();
        assert_eq!(f.validate().unwrap_err().field, "name");
    }

    #[tokio::test]
    async fn invalid_targets_never_reach_the_network() {
        let transport = Arc::new(MemoryTransport::new());
        let client = client(&transport);
        for bad in ["0", "-250", "lots", ""] {
            let mut f = form();
            f.target_amount = bad.into();
            let outcome = f.submit(&client).await;
            assert!(
                matches!(&outcome, SubmitOutcome::Invalid(e) if e.field == "target_amount"),
                "{bad:?} gave {outcome:?}"
            );
        }
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn valid_goal_posts_once() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(
            Method::Post,
            "/api/finance/savings-goals",
            json!({ "goal": { "id": "g1", "name": "Emergency fund", "targetAmount": 5000 } }),
        );
        let outcome = form().submit(&client(&transport)).await;
        assert!(matches!(outcome, SubmitOutcome::Saved(g) if g.id == "g1"));
        assert_eq!(transport.count(Method::Post, "/api/finance/savings-goals"), 1);
    }
}
