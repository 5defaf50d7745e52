//! Wire schemas for the finance REST API.
//!
//! Every payload is decoded into one of these types at the fetch boundary.
//! Fields the UI can live without carry `#[serde(default)]`; fields a card
//! cannot render without are required, so a payload missing them fails to
//! decode instead of silently rendering as zero.

use std::cell::RefCell;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{MessageContent, Role};
use crate::finance::money::DEFAULT_CURRENCY;
use crate::finance::progress::Progress;

// =============================================================================
// Shared
// =============================================================================

/// ISO 4217 currency code. Defaults to the display currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        if code.trim().is_empty() {
            Self::default()
        } else {
            Self(code.trim().to_uppercase())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

thread_local! {
    static DISPLAY_CURRENCY: RefCell<Option<Currency>> = const { RefCell::new(None) };
}

/// Run `f` with `currency` as what [`Currency::default`] returns on this
/// thread. Decoding is synchronous, so payloads decoded inside `f` that name
/// no currency pick up `currency`.
pub(crate) fn with_default_currency<R>(currency: &Currency, f: impl FnOnce() -> R) -> R {
    let previous = DISPLAY_CURRENCY.with(|c| c.replace(Some(currency.clone())));
    let out = f();
    DISPLAY_CURRENCY.with(|c| *c.borrow_mut() = previous);
    out
}

impl Default for Currency {
    /// The display currency in scope, else `BHD`.
    fn default() -> Self {
        DISPLAY_CURRENCY
            .with(|c| c.borrow().clone())
            .unwrap_or_else(|| Self(DEFAULT_CURRENCY.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{ "error": "..." }` body returned by failing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// =============================================================================
// Balance
// =============================================================================

/// Balance and bank-connection status (`GET /api/finance/summary`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub total_balance: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Reported count; falls back to `accounts.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_count: Option<u32>,
    #[serde(default)]
    pub bank_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl BalanceSummary {
    /// Empty summary in the given currency.
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn accounts_count(&self) -> u32 {
        self.account_count
            .unwrap_or_else(|| u32::try_from(self.accounts.len()).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub account_type: Option<String>,
}

/// Whether a bank is linked; the `bank-connect` card's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStatus {
    pub connected: bool,
    #[serde(default)]
    pub bank_name: Option<String>,
}

/// Open-banking authorization redirect (`POST /api/tarabut/connect`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankConnectSession {
    pub authorization_url: String,
}

// =============================================================================
// Budgets
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Weekly => "this week",
            Self::Monthly => "this month",
            Self::Yearly => "this year",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" | "" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(()),
        }
    }
}

/// A spending limit for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    /// The limit.
    pub amount: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub period: BudgetPeriod,
}

impl Budget {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.spent, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetList {
    pub budgets: Vec<Budget>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BudgetEnvelope {
    pub budget: Budget,
}

// =============================================================================
// Savings goals
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl SavingsGoal {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.current_amount, self.target_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalList {
    pub goals: Vec<SavingsGoal>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GoalEnvelope {
    pub goal: SavingsGoal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionInput {
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One ledger entry of a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionList {
    pub contributions: Vec<Contribution>,
}

/// Data of the `goal-history` card. The goal id is required to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalHistoryCard {
    pub goal_id: String,
    #[serde(default)]
    pub goal_name: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributions: Option<Vec<Contribution>>,
}

// =============================================================================
// Insights
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowData {
    pub income: f64,
    pub expenses: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<f64>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub history: Vec<CashFlowPoint>,
}

impl CashFlowData {
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            ..Self::default()
        }
    }

    /// Reported net, or income minus expenses.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.net.unwrap_or(self.income - self.expenses)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub label: String,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expenses: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingInsights {
    pub total_spent: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub categories: Vec<SpendingCategory>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl SpendingInsights {
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingCategory {
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub transaction_count: u32,
}

impl SpendingCategory {
    /// Reported share, or the share of `total` this category represents.
    #[must_use]
    pub fn share_of(&self, total: f64) -> f64 {
        self.percentage
            .unwrap_or_else(|| Progress::new(self.amount, total).percent())
    }
}

// =============================================================================
// Transactions
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Amount with the sign implied by its kind.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Debit => -self.amount.abs(),
            TransactionKind::Credit => self.amount.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransactionEnvelope {
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub next_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
}

impl RecurringExpense {
    /// Cost normalised to one month.
    #[must_use]
    pub fn monthly_amount(&self) -> f64 {
        match self.frequency {
            Frequency::Weekly => self.amount * 52.0 / 12.0,
            Frequency::Monthly => self.amount,
            Frequency::Yearly => self.amount / 12.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringList {
    pub recurring: Vec<RecurringExpense>,
}

// =============================================================================
// Family
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    #[default]
    None,
    Pending,
    Approved,
    Declined,
}

impl ConsentStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Not shared",
            Self::Pending => "Pending",
            Self::Approved => "Sharing",
            Self::Declined => "Declined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub consent_status: ConsentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyConsent {
    pub status: ConsentStatus,
    #[serde(default)]
    pub members: Vec<FamilyMember>,
    /// Incoming requests awaiting this user's answer.
    #[serde(default)]
    pub pending_requests: Vec<ConsentRequestInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequestInfo {
    pub id: String,
    pub from_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentAnswer {
    pub request_id: String,
    pub approve: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySpending {
    pub total_spent: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub members: Vec<MemberSpending>,
}

impl FamilySpending {
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSpending {
    pub member_id: String,
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub top_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyBudget {
    pub id: String,
    pub member_id: String,
    #[serde(default)]
    pub member_name: Option<String>,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub currency: Currency,
}

impl FamilyBudget {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.spent, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyBudgetInput {
    pub member_id: String,
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyBudgetList {
    pub budgets: Vec<FamilyBudget>,
}

// =============================================================================
// Conversations & chat
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConversationList {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConversationEnvelope {
    pub conversation: Conversation,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewConversation {
    pub title: String,
}

/// A message as persisted by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rich_content: Vec<MessageContent>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredMessageList {
    pub messages: Vec<StoredMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStoredMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rich_content: Vec<MessageContent>,
}

/// Request body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub messages: Vec<TurnMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnMessage {
    pub role: Role,
    pub content: String,
}

/// Reply of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnReply {
    pub message: String,
    #[serde(default)]
    pub rich_content: Vec<MessageContent>,
}

// =============================================================================
// User preferences
// =============================================================================

/// How verbose and proactive the assistant is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    Concise,
    #[default]
    Balanced,
    Detailed,
}

impl AiMode {
    pub const ALL: [Self; 3] = [Self::Concise, Self::Balanced, Self::Detailed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Balanced => "balanced",
            Self::Detailed => "detailed",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Concise => "Concise",
            Self::Balanced => "Balanced",
            Self::Detailed => "Detailed",
        }
    }
}

impl std::str::FromStr for AiMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiModeSetting {
    pub mode: AiMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureGuide {
    pub features: Vec<Feature>,
    #[serde(default)]
    pub dismissed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Chat action triggered by the feature's button.
    #[serde(default)]
    pub action: Option<String>,
}

/// Shortcut buttons shown under a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickActions {
    pub actions: Vec<QuickAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAction {
    pub label: String,
    pub action: String,
}

/// Data of the `error-retry` card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryCard {
    pub message: String,
    /// Action to re-dispatch on "Try again".
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// =============================================================================
// Subscription
// =============================================================================

/// Ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Plus,
    Premium,
}

impl PlanTier {
    pub const ALL: [Self; 3] = [Self::Free, Self::Plus, Self::Premium];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Plus => "plus",
            Self::Premium => "premium",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Plus => "Plus",
            Self::Premium => "Premium",
        }
    }
}

impl std::str::FromStr for PlanTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" => Ok(Self::Yearly),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Canceled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: PlanTier,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub renews_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubscriptionEnvelope {
    pub subscription: Subscription,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub plan: PlanTier,
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn balance_requires_total_and_defaults_the_rest() {
        let summary: BalanceSummary =
            serde_json::from_value(json!({ "totalBalance": 1250.5 })).unwrap();
        assert_eq!(summary.currency.as_str(), "BHD");
        assert_eq!(summary.accounts_count(), 0);
        assert!(!summary.bank_connected);

        assert!(serde_json::from_value::<BalanceSummary>(json!({ "currency": "BHD" })).is_err());
    }

    #[test]
    fn account_count_prefers_reported_value() {
        let summary: BalanceSummary = serde_json::from_value(json!({
            "totalBalance": 10,
            "accountCount": 4,
            "accounts": [{ "id": "a1", "name": "Current" }]
        }))
        .unwrap();
        assert_eq!(summary.accounts_count(), 4);
    }

    #[test]
    fn currency_is_normalised() {
        assert_eq!(Currency::new(" usd ").as_str(), "USD");
        assert_eq!(Currency::new("").as_str(), "BHD");
    }

    #[test]
    fn transaction_sign_follows_kind() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "t1",
            "description": "Salary",
            "amount": 900,
            "date": "2026-09-30",
            "type": "credit"
        }))
        .unwrap();
        assert!(tx.signed_amount() > 0.0);

        let tx: Transaction = serde_json::from_value(json!({
            "id": "t2",
            "description": "Coffee",
            "amount": 1.8,
            "date": "2026-10-01"
        }))
        .unwrap();
        assert!((tx.signed_amount() + 1.8).abs() < f64::EPSILON);
    }

    #[test]
    fn recurring_normalises_to_monthly() {
        let yearly = RecurringExpense {
            id: "r1".into(),
            name: "Insurance".into(),
            amount: 120.0,
            currency: Currency::default(),
            frequency: Frequency::Yearly,
            next_date: None,
            category: None,
        };
        assert!((yearly.monthly_amount() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cash_flow_net_falls_back_to_difference() {
        let data: CashFlowData =
            serde_json::from_value(json!({ "income": 1000, "expenses": 650 })).unwrap();
        assert!((data.net() - 350.0).abs() < 1e-9);
    }

    #[test]
    fn plan_and_mode_parse_case_insensitively() {
        assert_eq!("Premium".parse::<PlanTier>(), Ok(PlanTier::Premium));
        assert_eq!("DETAILED".parse::<AiMode>(), Ok(AiMode::Detailed));
        assert!("gold".parse::<PlanTier>().is_err());
        assert_eq!("annual".parse::<BillingCycle>(), Ok(BillingCycle::Yearly));
    }
}
