use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::api::FinanceClient;
use crate::api::types::{Transaction, TransactionInput, TransactionKind};
use crate::error::{FetchError, ValidationError};
use crate::forms::{SheetForm, date, positive_amount, required};

/// Record a transaction by hand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    /// `debit` or `credit`.
    #[serde(default)]
    pub kind: String,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            category: String::new(),
            date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            kind: "debit".into(),
        }
    }
}

#[async_trait]
impl SheetForm for TransactionForm {
    type Input = TransactionInput;
    type Output = Transaction;

    const NAME: &'static str = "transaction";

    fn validate(&self) -> Result<TransactionInput, ValidationError> {
        let kind = match self.kind.trim() {
            "" | "debit" => TransactionKind::Debit,
            "credit" => TransactionKind::Credit,
            _ => return Err(ValidationError::new("kind", "Choose expense or income")),
        };
        Ok(TransactionInput {
            description: required("description", "Description", &self.description)?,
            amount: positive_amount("amount", &self.amount)?,
            category: required("category", "Category", &self.category)?,
            date: date("date", &self.date)?,
            kind,
        })
    }

    async fn save(
        &self,
        client: &FinanceClient,
        input: TransactionInput,
    ) -> Result<Transaction, FetchError> {
        client.transactions().create_manual(&input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_todays_expense() {
        let f = TransactionForm::default();
        assert_eq!(f.kind, "debit");
        assert!(date("date", &f.date).is_ok());
    }

    #[test]
    fn validates_every_field() {
        let f = TransactionForm {
            description: "Coffee".into(),
            amount: "1.8".into(),
            category: "Dining".into(),
            date: "2026-10-01".into(),
            kind: "credit".into(),
        };
        assert_eq!(f.validate().unwrap().kind, TransactionKind::Credit);

        let mut bad = f.clone();
        bad.date = "yesterday".into();
        assert_eq!(bad.validate().unwrap_err().field, "date");

        let mut bad = f;
        bad.kind = "refund".into();
        assert_eq!(bad.validate().unwrap_err().field, "kind");
    }
}
