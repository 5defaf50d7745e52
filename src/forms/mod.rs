//! Drawer forms for creating and editing finance entities.
//!
//! Each form holds raw field text exactly as typed, validates it into a typed
//! API input, and submits it. Validation failures never reach the network;
//! server failures come back as the server's own message.
//!
//! # Architecture
//!
//! - [`Sheet`]: which drawer is open, with the entity it edits
//! - [`SheetForm`]: validate-then-save contract shared by every form
//! - [`SubmitOutcome`]: result of a submit, rendered back into the drawer

mod budget;
mod contribution;
mod family_budget;
mod goal;
mod transaction;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use budget::BudgetForm;
pub use contribution::ContributionForm;
pub use family_budget::FamilyBudgetForm;
pub use goal::GoalForm;
pub use transaction::TransactionForm;

use crate::api::FinanceClient;
use crate::api::types::{Budget, SavingsGoal};
use crate::error::{FetchError, ValidationError};

/// An open drawer.
#[derive(Debug, Clone, PartialEq)]
pub enum Sheet {
    Budget { existing: Option<Budget> },
    Goal { existing: Option<SavingsGoal> },
    Contribution { goal: SavingsGoal },
    Transaction,
    FamilyBudget,
}

/// Drawer kinds as they appear in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Budget,
    Goal,
    Contribution,
    Transaction,
    FamilyBudget,
}

impl SheetKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Goal => "goal",
            Self::Contribution => "contribution",
            Self::Transaction => "transaction",
            Self::FamilyBudget => "family-budget",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget" => Ok(Self::Budget),
            "goal" => Ok(Self::Goal),
            "contribution" => Ok(Self::Contribution),
            "transaction" => Ok(Self::Transaction),
            "family-budget" => Ok(Self::FamilyBudget),
            _ => Err(()),
        }
    }
}

impl Sheet {
    #[must_use]
    pub fn kind(&self) -> SheetKind {
        match self {
            Self::Budget { .. } => SheetKind::Budget,
            Self::Goal { .. } => SheetKind::Goal,
            Self::Contribution { .. } => SheetKind::Contribution,
            Self::Transaction => SheetKind::Transaction,
            Self::FamilyBudget => SheetKind::FamilyBudget,
        }
    }

    /// Open a drawer of `kind`, loading the entity named by `id` if any.
    pub async fn load(
        kind: SheetKind,
        id: Option<&str>,
        client: &FinanceClient,
    ) -> Result<Self, FetchError> {
        let id = id.filter(|s| !s.trim().is_empty());
        match kind {
            SheetKind::Budget => {
                let existing = match id {
                    Some(id) => Some(find_budget(client, id).await?),
                    None => None,
                };
                Ok(Self::Budget { existing })
            }
            SheetKind::Goal => {
                let existing = match id {
                    Some(id) => Some(find_goal(client, id).await?),
                    None => None,
                };
                Ok(Self::Goal { existing })
            }
            SheetKind::Contribution => {
                let id = id.ok_or_else(|| not_found("savings goal"))?;
                Ok(Self::Contribution {
                    goal: find_goal(client, id).await?,
                })
            }
            SheetKind::Transaction => Ok(Self::Transaction),
            SheetKind::FamilyBudget => Ok(Self::FamilyBudget),
        }
    }
}

fn not_found(what: &str) -> FetchError {
    FetchError::Api {
        status: 404,
        message: format!("That {what} no longer exists."),
    }
}

pub(crate) async fn find_budget(client: &FinanceClient, id: &str) -> Result<Budget, FetchError> {
    client
        .budgets()
        .list()
        .await?
        .into_iter()
        .find(|b| b.id == id)
        .ok_or_else(|| not_found("budget"))
}

pub(crate) async fn find_goal(client: &FinanceClient, id: &str) -> Result<SavingsGoal, FetchError> {
    client
        .goals()
        .list()
        .await?
        .into_iter()
        .find(|g| g.id == id)
        .ok_or_else(|| not_found("savings goal"))
}

/// Result of submitting a drawer form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Saved(T),
    /// Rejected before any request.
    Invalid(ValidationError),
    /// The server refused; the message is shown as-is.
    Failed(String),
}

/// Validate-then-save contract shared by the drawer forms.
#[async_trait]
pub trait SheetForm: Send + Sync {
    type Input: Send;
    type Output: Send;

    /// Form name for logs.
    const NAME: &'static str;

    /// Check the raw fields and build the API input.
    fn validate(&self) -> Result<Self::Input, ValidationError>;

    /// Send a validated input.
    async fn save(
        &self,
        client: &FinanceClient,
        input: Self::Input,
    ) -> Result<Self::Output, FetchError>;

    /// Validate, then save. No request is made when validation fails.
    async fn submit(&self, client: &FinanceClient) -> SubmitOutcome<Self::Output> {
        let input = match self.validate() {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(
                    name: "form.invalid",
                    form = Self::NAME,
                    field = e.field,
                    "Form rejected"
                );
                return SubmitOutcome::Invalid(e);
            }
        };
        match self.save(client, input).await {
            Ok(saved) => {
                tracing::info!(name: "form.saved", form = Self::NAME, "Form saved");
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                tracing::warn!(
                    name: "form.failed",
                    form = Self::NAME,
                    error = %e,
                    "Form save failed"
                );
                SubmitOutcome::Failed(e.user_message())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Non-blank, trimmed.
pub(crate) fn required(field: &'static str, label: &str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        Err(ValidationError::new(field, format!("{label} is required")))
    } else {
        Ok(value.to_string())
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::new(field, "Please enter a valid amount"))
}

/// A finite number greater than zero.
pub(crate) fn positive_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let amount = parse_number(field, raw)?;
    if amount > 0.0 {
        Ok(amount)
    } else {
        Err(ValidationError::new(field, "Amount must be greater than 0"))
    }
}

/// A finite number of zero or more. Blank means zero.
pub(crate) fn non_negative_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    let amount = parse_number(field, raw)?;
    if amount >= 0.0 {
        Ok(amount)
    } else {
        Err(ValidationError::new(field, "Amount cannot be negative"))
    }
}

/// `YYYY-MM-DD`.
pub(crate) fn date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new(field, "Use the format YYYY-MM-DD"))
}

/// Blank means none; otherwise `YYYY-MM-DD`.
pub(crate) fn optional_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        date(field, raw).map(Some)
    }
}

/// Trimmed, or `None` when blank.
pub(crate) fn optional_text(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Amount as it should appear back in an input.
pub(crate) fn amount_text(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive_numbers() {
        assert_eq!(positive_amount("amount", " 1,250.5 "), Ok(1250.5));
        assert_eq!(positive_amount("amount", "0").unwrap_err().field, "amount");
        assert!(positive_amount("amount", "-5").is_err());
        assert!(positive_amount("amount", "abc").is_err());
        assert!(positive_amount("amount", "NaN").is_err());
        assert!(positive_amount("amount", "inf").is_err());
        assert!(positive_amount("amount", "").is_err());
    }

    #[test]
    fn non_negative_allows_zero_and_blank() {
        assert_eq!(non_negative_amount("current", ""), Ok(0.0));
        assert_eq!(non_negative_amount("current", "0"), Ok(0.0));
        assert!(non_negative_amount("current", "-1").is_err());
    }

    #[test]
    fn dates_use_iso_format() {
        assert!(date("date", "2026-10-17").is_ok());
        assert!(date("date", "17/10/2026").is_err());
        assert_eq!(optional_date("deadline", " "), Ok(None));
    }

    #[test]
    fn sheet_kinds_parse() {
        assert_eq!("family-budget".parse::<SheetKind>(), Ok(SheetKind::FamilyBudget));
        assert!("loan".parse::<SheetKind>().is_err());
    }

    #[test]
    fn amount_text_drops_trailing_zeros() {
        assert_eq!(amount_text(200.0), "200");
        assert_eq!(amount_text(12.5), "12.5");
    }
}
