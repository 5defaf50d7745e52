use async_trait::async_trait;
use serde::Deserialize;

use crate::api::FinanceClient;
use crate::api::types::{FamilyBudget, FamilyBudgetInput};
use crate::error::{FetchError, ValidationError};
use crate::forms::{SheetForm, positive_amount, required};

/// Set a spending limit for a family member.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FamilyBudgetForm {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: String,
}

#[async_trait]
impl SheetForm for FamilyBudgetForm {
    type Input = FamilyBudgetInput;
    type Output = FamilyBudget;

    const NAME: &'static str = "family-budget";

    fn validate(&self) -> Result<FamilyBudgetInput, ValidationError> {
        Ok(FamilyBudgetInput {
            member_id: required("member_id", "Family member", &self.member_id)?,
            category: required("category", "Category", &self.category)?,
            amount: positive_amount("amount", &self.amount)?,
        })
    }

    async fn save(
        &self,
        client: &FinanceClient,
        input: FamilyBudgetInput,
    ) -> Result<FamilyBudget, FetchError> {
        client.family().create_budget(&input).await
    }
}
