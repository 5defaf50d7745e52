use async_trait::async_trait;
use serde::Deserialize;

use crate::api::FinanceClient;
use crate::api::types::{ContributionInput, SavingsGoal};
use crate::error::{FetchError, ValidationError};
use crate::forms::{SheetForm, optional_text, positive_amount, required};

/// Add money to a savings goal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContributionForm {
    #[serde(default)]
    pub goal_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub note: String,
}

impl ContributionForm {
    #[must_use]
    pub fn for_goal(goal: &SavingsGoal) -> Self {
        Self {
            goal_id: goal.id.clone(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SheetForm for ContributionForm {
    type Input = (String, ContributionInput);
    type Output = SavingsGoal;

    const NAME: &'static str = "contribution";

    fn validate(&self) -> Result<Self::Input, ValidationError> {
        let goal_id = required("goal_id", "Goal", &self.goal_id)?;
        let input = ContributionInput {
            amount: positive_amount("amount", &self.amount)?,
            note: optional_text(&self.note),
        };
        Ok((goal_id, input))
    }

    async fn save(
        &self,
        client: &FinanceClient,
        (goal_id, input): Self::Input,
    ) -> Result<SavingsGoal, FetchError> {
        client.goals().contribute(&goal_id, &input).await
    }
}
