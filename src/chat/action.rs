//! Action identifiers carried by card buttons.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Every action a card button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatAction {
    ShowBalance,
    ShowBudgets,
    CreateBudget,
    SetBudget,
    EditBudget,
    DeleteBudget,
    ShowGoals,
    CreateGoal,
    EditGoal,
    ContributeGoal,
    DeleteGoal,
    GoalHistory,
    ShowCashFlow,
    ShowSpending,
    ShowTransactions,
    AddTransaction,
    ShowRecurring,
    ConnectBank,
    SetAiMode,
    ShowFeatureGuide,
    DismissFeatureGuide,
    ShowFamily,
    RequestFamilyConsent,
    ShowSubscription,
    UpgradePlan,
    OpenDashboard,
    /// Re-dispatch the action carried in the data.
    Retry,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl ChatAction {
    pub const ALL: [Self; 27] = [
        Self::ShowBalance,
        Self::ShowBudgets,
        Self::CreateBudget,
        Self::SetBudget,
        Self::EditBudget,
        Self::DeleteBudget,
        Self::ShowGoals,
        Self::CreateGoal,
        Self::EditGoal,
        Self::ContributeGoal,
        Self::DeleteGoal,
        Self::GoalHistory,
        Self::ShowCashFlow,
        Self::ShowSpending,
        Self::ShowTransactions,
        Self::AddTransaction,
        Self::ShowRecurring,
        Self::ConnectBank,
        Self::SetAiMode,
        Self::ShowFeatureGuide,
        Self::DismissFeatureGuide,
        Self::ShowFamily,
        Self::RequestFamilyConsent,
        Self::ShowSubscription,
        Self::UpgradePlan,
        Self::OpenDashboard,
        Self::Retry,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShowBalance => "show-balance",
            Self::ShowBudgets => "show-budgets",
            Self::CreateBudget => "create-budget",
            Self::SetBudget => "set-budget",
            Self::EditBudget => "edit-budget",
            Self::DeleteBudget => "delete-budget",
            Self::ShowGoals => "show-goals",
            Self::CreateGoal => "create-goal",
            Self::EditGoal => "edit-goal",
            Self::ContributeGoal => "contribute-goal",
            Self::DeleteGoal => "delete-goal",
            Self::GoalHistory => "goal-history",
            Self::ShowCashFlow => "show-cash-flow",
            Self::ShowSpending => "show-spending",
            Self::ShowTransactions => "show-transactions",
            Self::AddTransaction => "add-transaction",
            Self::ShowRecurring => "show-recurring",
            Self::ConnectBank => "connect-bank",
            Self::SetAiMode => "set-ai-mode",
            Self::ShowFeatureGuide => "show-feature-guide",
            Self::DismissFeatureGuide => "dismiss-feature-guide",
            Self::ShowFamily => "show-family",
            Self::RequestFamilyConsent => "request-family-consent",
            Self::ShowSubscription => "show-subscription",
            Self::UpgradePlan => "upgrade-plan",
            Self::OpenDashboard => "open-dashboard",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for ChatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifiers_round_trip_and_are_unique() {
        let names: HashSet<_> = ChatAction::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(names.len(), ChatAction::ALL.len());
        for action in ChatAction::ALL {
            assert_eq!(action.as_str().parse::<ChatAction>(), Ok(action));
        }
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert_eq!(
            "SET-BUDGET".parse::<ChatAction>(),
            Err(UnknownAction("SET-BUDGET".into()))
        );
        assert!("transfer-money".parse::<ChatAction>().is_err());
    }
}
