//! Typed client for the finance REST API.

use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::transport::{ApiRequest, Transport};
use crate::api::types::{with_default_currency, *};
use crate::error::FetchError;
use crate::query::QueryCache;

const FINANCE: &str = "/api/finance";
const BUDGETS: &str = "/api/finance/budgets";
const GOALS: &str = "/api/finance/savings-goals";
const TRANSACTIONS: &str = "/api/finance/transactions";
const FAMILY: &str = "/api/finance/family";
const CONVERSATIONS: &str = "/api/conversations";
const SUBSCRIPTION: &str = "/api/subscription";

/// Client for the finance API.
///
/// Reads go through the shared [`QueryCache`]; mutations go straight to the
/// transport and invalidate the paths whose data they change.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use finance_assistant::api::{FinanceClient, HttpTransport};
/// use finance_assistant::query::QueryCache;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://127.0.0.1:8080", Duration::from_secs(10), None)?;
/// let client = FinanceClient::new(Arc::new(transport), QueryCache::new(Duration::from_secs(30), true));
///
/// let summary = client.summary().get().await?;
/// let budgets = client.budgets().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FinanceClient {
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
    currency: Currency,
}

impl FinanceClient {
    pub fn new(transport: Arc<dyn Transport>, cache: QueryCache) -> Self {
        Self {
            transport,
            cache: Arc::new(cache),
            currency: Currency::default(),
        }
    }

    /// Currency given to decoded payloads that name none.
    #[must_use]
    pub fn with_display_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn display_currency(&self) -> &Currency {
        &self.currency
    }

    /// Get the shared cache.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the balance summary.
    pub fn summary(&self) -> SummaryApi<'_> {
        SummaryApi { client: self }
    }

    /// Access budgets.
    pub fn budgets(&self) -> BudgetsApi<'_> {
        BudgetsApi { client: self }
    }

    /// Access savings goals.
    pub fn goals(&self) -> GoalsApi<'_> {
        GoalsApi { client: self }
    }

    /// Access transactions.
    pub fn transactions(&self) -> TransactionsApi<'_> {
        TransactionsApi { client: self }
    }

    /// Access cash flow, spending and recurring insights.
    pub fn insights(&self) -> InsightsApi<'_> {
        InsightsApi { client: self }
    }

    /// Access family sharing.
    pub fn family(&self) -> FamilyApi<'_> {
        FamilyApi { client: self }
    }

    /// Access stored conversations.
    pub fn conversations(&self) -> ConversationsApi<'_> {
        ConversationsApi { client: self }
    }

    /// Access the assistant.
    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi { client: self }
    }

    /// Access user preferences.
    pub fn user(&self) -> UserApi<'_> {
        UserApi { client: self }
    }

    /// Access the subscription.
    pub fn subscription(&self) -> SubscriptionApi<'_> {
        SubscriptionApi { client: self }
    }

    /// Access open-banking connection.
    pub fn bank(&self) -> BankApi<'_> {
        BankApi { client: self }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let transport = Arc::clone(&self.transport);
        let request = ApiRequest::get(path);
        let value = self
            .cache
            .get_or_fetch(path, move || {
                async move { transport.send(request).await }.boxed()
            })
            .await?;
        self.decode(value)
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        invalidates: &[&str],
    ) -> Result<T, FetchError> {
        let value = self.send_uncached(request, invalidates).await?;
        self.decode(value)
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, FetchError> {
        with_default_currency(&self.currency, || -> Result<T, FetchError> {
            Ok(serde_json::from_value(value)?)
        })
    }

    async fn send_uncached(
        &self,
        request: ApiRequest,
        invalidates: &[&str],
    ) -> Result<Value, FetchError> {
        let value = self.transport.send(request).await?;
        for prefix in invalidates {
            self.cache.invalidate_prefix(prefix);
        }
        Ok(value)
    }
}

fn body<T: Serialize>(input: &T) -> Result<Value, FetchError> {
    serde_json::to_value(input).map_err(|e| FetchError::Decode(e.to_string()))
}

/// `base/id` with the id percent-encoded.
fn item(base: &str, id: &str) -> String {
    let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("{base}/{id}")
}

// =============================================================================
// Summary API
// =============================================================================

/// Balance summary client.
#[derive(Debug)]
pub struct SummaryApi<'a> {
    client: &'a FinanceClient,
}

impl SummaryApi<'_> {
    pub async fn get(&self) -> Result<BalanceSummary, FetchError> {
        self.client.get("/api/finance/summary").await
    }
}

// =============================================================================
// Budgets API
// =============================================================================

/// Budgets client.
#[derive(Debug)]
pub struct BudgetsApi<'a> {
    client: &'a FinanceClient,
}

impl BudgetsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Budget>, FetchError> {
        let list: BudgetList = self.client.get(BUDGETS).await?;
        Ok(list.budgets)
    }

    pub async fn create(&self, input: &BudgetInput) -> Result<Budget, FetchError> {
        let env: BudgetEnvelope = self
            .client
            .mutate(ApiRequest::post(BUDGETS, body(input)?), &[BUDGETS])
            .await?;
        Ok(env.budget)
    }

    pub async fn update(&self, id: &str, input: &BudgetInput) -> Result<Budget, FetchError> {
        let env: BudgetEnvelope = self
            .client
            .mutate(ApiRequest::put(item(BUDGETS, id), body(input)?), &[BUDGETS])
            .await?;
        Ok(env.budget)
    }

    pub async fn delete(&self, id: &str) -> Result<(), FetchError> {
        self.client
            .send_uncached(ApiRequest::delete(item(BUDGETS, id)), &[BUDGETS])
            .await
            .map(drop)
    }
}

// =============================================================================
// Savings goals API
// =============================================================================

/// Savings goals client.
#[derive(Debug)]
pub struct GoalsApi<'a> {
    client: &'a FinanceClient,
}

impl GoalsApi<'_> {
    pub async fn list(&self) -> Result<Vec<SavingsGoal>, FetchError> {
        let list: GoalList = self.client.get(GOALS).await?;
        Ok(list.goals)
    }

    pub async fn create(&self, input: &GoalInput) -> Result<SavingsGoal, FetchError> {
        let env: GoalEnvelope = self
            .client
            .mutate(ApiRequest::post(GOALS, body(input)?), &[GOALS])
            .await?;
        Ok(env.goal)
    }

    pub async fn update(&self, id: &str, input: &GoalInput) -> Result<SavingsGoal, FetchError> {
        let env: GoalEnvelope = self
            .client
            .mutate(ApiRequest::put(item(GOALS, id), body(input)?), &[GOALS])
            .await?;
        Ok(env.goal)
    }

    pub async fn delete(&self, id: &str) -> Result<(), FetchError> {
        self.client
            .send_uncached(ApiRequest::delete(item(GOALS, id)), &[GOALS])
            .await
            .map(drop)
    }

    /// Add money to a goal; returns the updated goal.
    pub async fn contribute(
        &self,
        id: &str,
        input: &ContributionInput,
    ) -> Result<SavingsGoal, FetchError> {
        let path = format!("{}/contribute", item(GOALS, id));
        let env: GoalEnvelope = self
            .client
            .mutate(ApiRequest::post(path, body(input)?), &[GOALS])
            .await?;
        Ok(env.goal)
    }

    pub async fn history(&self, id: &str) -> Result<Vec<Contribution>, FetchError> {
        let path = format!("{}/history", item(GOALS, id));
        let list: ContributionList = self.client.get(&path).await?;
        Ok(list.contributions)
    }
}

// =============================================================================
// Transactions API
// =============================================================================

/// Transactions client.
#[derive(Debug)]
pub struct TransactionsApi<'a> {
    client: &'a FinanceClient,
}

impl TransactionsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Transaction>, FetchError> {
        let list: TransactionList = self.client.get(TRANSACTIONS).await?;
        Ok(list.transactions)
    }

    /// Record a transaction by hand. Balances, budgets and insights all
    /// depend on transactions, so every finance read is invalidated.
    pub async fn create_manual(&self, input: &TransactionInput) -> Result<Transaction, FetchError> {
        let path = format!("{TRANSACTIONS}/manual");
        let env: TransactionEnvelope = self
            .client
            .mutate(ApiRequest::post(path, body(input)?), &[FINANCE])
            .await?;
        Ok(env.transaction)
    }
}

// =============================================================================
// Insights API
// =============================================================================

/// Cash flow, spending and recurring-expense client.
#[derive(Debug)]
pub struct InsightsApi<'a> {
    client: &'a FinanceClient,
}

impl InsightsApi<'_> {
    pub async fn cash_flow(&self) -> Result<CashFlowData, FetchError> {
        self.client.get("/api/finance/cash-flow").await
    }

    pub async fn spending(&self) -> Result<SpendingInsights, FetchError> {
        self.client.get("/api/finance/insights/spending").await
    }

    pub async fn recurring(&self) -> Result<Vec<RecurringExpense>, FetchError> {
        let list: RecurringList = self.client.get("/api/finance/recurring").await?;
        Ok(list.recurring)
    }
}

// =============================================================================
// Family API
// =============================================================================

#[derive(Debug, serde::Deserialize)]
struct FamilyBudgetEnvelope {
    budget: FamilyBudget,
}

/// Family sharing client.
#[derive(Debug)]
pub struct FamilyApi<'a> {
    client: &'a FinanceClient,
}

impl FamilyApi<'_> {
    pub async fn consent(&self) -> Result<FamilyConsent, FetchError> {
        self.client.get("/api/finance/family/consent").await
    }

    /// Ask another user to share spending.
    pub async fn request_consent(&self, input: &ConsentRequest) -> Result<FamilyConsent, FetchError> {
        self.client
            .mutate(
                ApiRequest::post("/api/finance/family/consent", body(input)?),
                &[FAMILY],
            )
            .await
    }

    /// Approve or decline an incoming request.
    pub async fn respond_consent(&self, input: &ConsentAnswer) -> Result<FamilyConsent, FetchError> {
        self.client
            .mutate(
                ApiRequest::post("/api/finance/family/consent/respond", body(input)?),
                &[FAMILY],
            )
            .await
    }

    pub async fn spending(&self) -> Result<FamilySpending, FetchError> {
        self.client.get("/api/finance/family/spending").await
    }

    pub async fn budgets(&self) -> Result<Vec<FamilyBudget>, FetchError> {
        let list: FamilyBudgetList = self.client.get("/api/finance/family/budgets").await?;
        Ok(list.budgets)
    }

    pub async fn create_budget(&self, input: &FamilyBudgetInput) -> Result<FamilyBudget, FetchError> {
        let env: FamilyBudgetEnvelope = self
            .client
            .mutate(
                ApiRequest::post("/api/finance/family/budgets", body(input)?),
                &[FAMILY],
            )
            .await?;
        Ok(env.budget)
    }
}

// =============================================================================
// Conversations API
// =============================================================================

/// Stored conversation client.
#[derive(Debug)]
pub struct ConversationsApi<'a> {
    client: &'a FinanceClient,
}

impl ConversationsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Conversation>, FetchError> {
        let list: ConversationList = self.client.get(CONVERSATIONS).await?;
        Ok(list.conversations)
    }

    pub async fn get(&self, id: &str) -> Result<Conversation, FetchError> {
        let env: ConversationEnvelope = self.client.get(&item(CONVERSATIONS, id)).await?;
        Ok(env.conversation)
    }

    pub async fn create(&self, title: impl Into<String>) -> Result<Conversation, FetchError> {
        let input = NewConversation {
            title: title.into(),
        };
        let env: ConversationEnvelope = self
            .client
            .mutate(ApiRequest::post(CONVERSATIONS, body(&input)?), &[CONVERSATIONS])
            .await?;
        Ok(env.conversation)
    }

    pub async fn delete(&self, id: &str) -> Result<(), FetchError> {
        self.client
            .send_uncached(ApiRequest::delete(item(CONVERSATIONS, id)), &[CONVERSATIONS])
            .await
            .map(drop)
    }

    pub async fn messages(&self, id: &str) -> Result<Vec<StoredMessage>, FetchError> {
        let path = format!("{}/messages", item(CONVERSATIONS, id));
        let list: StoredMessageList = self.client.get(&path).await?;
        Ok(list.messages)
    }

    pub async fn append_message(&self, id: &str, message: &NewStoredMessage) -> Result<(), FetchError> {
        let path = format!("{}/messages", item(CONVERSATIONS, id));
        self.client
            .send_uncached(ApiRequest::post(path, body(message)?), &[CONVERSATIONS])
            .await
            .map(drop)
    }
}

// =============================================================================
// Chat API
// =============================================================================

/// Assistant client.
#[derive(Debug)]
pub struct ChatApi<'a> {
    client: &'a FinanceClient,
}

impl ChatApi<'_> {
    /// Send the conversation so far and get the assistant's reply.
    pub async fn turn(&self, turn: &ChatTurn) -> Result<ChatTurnReply, FetchError> {
        self.client
            .mutate(ApiRequest::post("/api/chat", body(turn)?), &[])
            .await
    }
}

// =============================================================================
// User API
// =============================================================================

/// User preference client.
#[derive(Debug)]
pub struct UserApi<'a> {
    client: &'a FinanceClient,
}

impl UserApi<'_> {
    pub async fn ai_mode(&self) -> Result<AiMode, FetchError> {
        let setting: AiModeSetting = self.client.get("/api/user/ai-mode").await?;
        Ok(setting.mode)
    }

    pub async fn set_ai_mode(&self, mode: AiMode) -> Result<AiMode, FetchError> {
        let value = self
            .client
            .send_uncached(
                ApiRequest::post("/api/user/ai-mode", body(&AiModeSetting { mode })?),
                &["/api/user/ai-mode"],
            )
            .await?;
        // Some deployments answer 204; the requested mode is then in effect.
        if value.is_null() {
            return Ok(mode);
        }
        let setting: AiModeSetting = self.client.decode(value)?;
        Ok(setting.mode)
    }

    pub async fn feature_guide(&self) -> Result<FeatureGuide, FetchError> {
        self.client.get("/api/user/feature-guide").await
    }

    pub async fn dismiss_feature_guide(&self) -> Result<(), FetchError> {
        self.client
            .send_uncached(
                ApiRequest::post("/api/user/feature-guide", json!({ "dismissed": true })),
                &["/api/user/feature-guide"],
            )
            .await
            .map(drop)
    }
}

// =============================================================================
// Subscription API
// =============================================================================

/// Subscription client.
#[derive(Debug)]
pub struct SubscriptionApi<'a> {
    client: &'a FinanceClient,
}

impl SubscriptionApi<'_> {
    pub async fn get(&self) -> Result<Subscription, FetchError> {
        let env: SubscriptionEnvelope = self.client.get(SUBSCRIPTION).await?;
        Ok(env.subscription)
    }

    /// Start a hosted checkout for a paid plan.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession, FetchError> {
        self.client
            .mutate(
                ApiRequest::post(format!("{SUBSCRIPTION}/checkout"), body(request)?),
                &[SUBSCRIPTION],
            )
            .await
    }

    pub async fn change_plan(&self, plan: PlanTier) -> Result<Subscription, FetchError> {
        let env: SubscriptionEnvelope = self
            .client
            .mutate(
                ApiRequest::post(format!("{SUBSCRIPTION}/change-plan"), json!({ "plan": plan })),
                &[SUBSCRIPTION],
            )
            .await?;
        Ok(env.subscription)
    }

    pub async fn change_billing(&self, cycle: BillingCycle) -> Result<Subscription, FetchError> {
        let env: SubscriptionEnvelope = self
            .client
            .mutate(
                ApiRequest::post(
                    format!("{SUBSCRIPTION}/change-billing"),
                    json!({ "billingCycle": cycle }),
                ),
                &[SUBSCRIPTION],
            )
            .await?;
        Ok(env.subscription)
    }
}

// =============================================================================
// Bank API
// =============================================================================

/// Open-banking client.
#[derive(Debug)]
pub struct BankApi<'a> {
    client: &'a FinanceClient,
}

impl BankApi<'_> {
    /// Start a bank connection; the caller redirects to the returned URL.
    pub async fn connect(&self) -> Result<BankConnectSession, FetchError> {
        self.client
            .mutate(
                ApiRequest::post("/api/tarabut/connect", json!({})),
                &["/api/finance/summary"],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryTransport;
    use crate::api::transport::Method;
    use std::time::Duration;

    fn client(transport: &Arc<MemoryTransport>) -> FinanceClient {
        FinanceClient::new(
            Arc::clone(transport) as Arc<dyn Transport>,
            QueryCache::new(Duration::from_secs(60), true),
        )
    }

    #[tokio::test]
    async fn reads_are_cached() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Get, BUDGETS, json!({ "budgets": [] }));
        let client = client(&transport);

        client.budgets().list().await.unwrap();
        client.budgets().list().await.unwrap();
        assert_eq!(transport.count(Method::Get, BUDGETS), 1);
    }

    #[tokio::test]
    async fn mutations_invalidate_reads() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Get, BUDGETS, json!({ "budgets": [] }));
        transport.respond(
            Method::Post,
            BUDGETS,
            json!({ "budget": { "id": "b1", "category": "Dining", "amount": 200 } }),
        );
        let client = client(&transport);

        client.budgets().list().await.unwrap();
        let created = client
            .budgets()
            .create(&BudgetInput {
                category: "Dining".into(),
                amount: 200.0,
                period: BudgetPeriod::Monthly,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "b1");
        client.budgets().list().await.unwrap();
        assert_eq!(transport.count(Method::Get, BUDGETS), 2);
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_decode_error() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Get, "/api/finance/summary", json!({ "balance": 10 }));
        let err = client(&transport).summary().get().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn ids_are_encoded_into_paths() {
        let transport = Arc::new(MemoryTransport::new());
        let _ = client(&transport).goals().history("a/b").await;
        assert_eq!(
            transport.requests()[0].path,
            "/api/finance/savings-goals/a%2Fb/history"
        );
    }

    #[tokio::test]
    async fn empty_ai_mode_reply_keeps_requested_mode() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Post, "/api/user/ai-mode", Value::Null);
        let mode = client(&transport).user().set_ai_mode(AiMode::Detailed).await.unwrap();
        assert_eq!(mode, AiMode::Detailed);
    }

    #[tokio::test]
    async fn missing_currency_decodes_as_display_currency() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(
            Method::Get,
            BUDGETS,
            json!({ "budgets": [
                { "id": "b1", "category": "Dining", "amount": 200 },
                { "id": "b2", "category": "Rent", "amount": 900, "currency": "EUR" }
            ] }),
        );
        let client = client(&transport).with_display_currency(Currency::new("USD"));

        let budgets = client.budgets().list().await.unwrap();
        assert_eq!(budgets[0].currency.as_str(), "USD");
        assert_eq!(budgets[1].currency.as_str(), "EUR");
        // The override only lasts for the decode.
        assert_eq!(Currency::default().as_str(), "BHD");
    }
}
