//! Routes card button actions to cards, mutations, drawers or navigation.

use serde_json::{Value, json};

use crate::api::FinanceClient;
use crate::api::types::{
    AiMode, AiModeSetting, BillingCycle, BudgetInput, BudgetPeriod, CheckoutRequest,
    ConsentAnswer, ConsentRequest, ContributionInput, GoalHistoryCard, PlanTier, RetryCard,
};
use crate::chat::action::ChatAction;
use crate::chat::content::MessageContent;
use crate::chat::message::ChatMessage;
use crate::chat::thread::Thread;
use crate::error::FetchError;
use crate::finance::format_money;
use crate::forms::{Sheet, find_budget, find_goal};

/// What the UI should do after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// A new assistant message was appended to the thread.
    Append(ChatMessage),
    /// Open a drawer form.
    OpenSheet(Sheet),
    /// Leave the chat for another page or an external URL.
    Navigate(String),
}

/// Executes [`ChatAction`]s against a thread.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    client: FinanceClient,
}

impl ActionDispatcher {
    pub fn new(client: FinanceClient) -> Self {
        Self { client }
    }

    /// Run `action` with its button `data`.
    ///
    /// The latest message with cards has its actions disabled before
    /// anything else happens. Failures become an `error-retry` card that
    /// re-dispatches the same action; this never returns an error.
    pub async fn dispatch(&self, thread: &Thread, action: ChatAction, data: Value) -> ActionOutcome {
        let disabled = thread.disable_latest_actions();
        tracing::info!(
            name: "chat.action.dispatched",
            session_id = %thread.id(),
            action = %action,
            disabled_message = ?disabled,
            "Dispatching chat action"
        );

        let (action, data) = match unwrap_retry(action, data) {
            Ok(inner) => inner,
            Err(message) => {
                let reply = ChatMessage::assistant(message, Vec::new());
                thread.push(reply.clone());
                return ActionOutcome::Append(reply);
            }
        };

        let outcome = match self.run(action, &data).await {
            Ok(Step::Reply(text, cards)) => {
                ActionOutcome::Append(ChatMessage::assistant(text, cards))
            }
            Ok(Step::Sheet(sheet)) => return ActionOutcome::OpenSheet(sheet),
            Ok(Step::Navigate(to)) => return ActionOutcome::Navigate(to),
            Err(e) => {
                tracing::warn!(
                    name: "chat.action.failed",
                    session_id = %thread.id(),
                    action = %action,
                    error = %e,
                    "Chat action failed"
                );
                ActionOutcome::Append(retry_message(action, data, &e))
            }
        };
        if let ActionOutcome::Append(message) = &outcome {
            thread.push(message.clone());
        }
        outcome
    }

    async fn run(&self, action: ChatAction, data: &Value) -> Result<Step, FetchError> {
        let client = &self.client;
        let step = match action {
            ChatAction::ShowBalance => {
                Step::card("Here's your current balance.", MessageContent::BalanceCard(None))
            }
            ChatAction::ShowBudgets => {
                Step::card("Here are your budgets.", MessageContent::BudgetOverview(None))
            }
            ChatAction::CreateBudget => Step::Sheet(Sheet::Budget { existing: None }),
            ChatAction::SetBudget => {
                let Some(amount) = amount(data, "amount") else {
                    return Ok(Step::Sheet(Sheet::Budget { existing: None }));
                };
                let category =
                    text(data, "category").unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
                let period = text(data, "period")
                    .and_then(|p| p.parse::<BudgetPeriod>().ok())
                    .unwrap_or_default();
                let budget = client
                    .budgets()
                    .create(&BudgetInput {
                        category,
                        amount,
                        period,
                    })
                    .await?;
                Step::card(
                    format!(
                        "Done. Your {} budget is set to {} {}.",
                        budget.category,
                        format_money(budget.amount, budget.currency.as_str()),
                        budget.period.label()
                    ),
                    MessageContent::BudgetCard(Some(budget)),
                )
            }
            ChatAction::EditBudget => {
                let id = required_id(data)?;
                Step::Sheet(Sheet::Budget {
                    existing: Some(find_budget(client, &id).await?),
                })
            }
            ChatAction::DeleteBudget => {
                let id = required_id(data)?;
                client.budgets().delete(&id).await?;
                Step::card("Budget deleted.", MessageContent::BudgetOverview(None))
            }
            ChatAction::ShowGoals => {
                Step::card("Here are your savings goals.", MessageContent::SavingsGoals(None))
            }
            ChatAction::CreateGoal => Step::Sheet(Sheet::Goal { existing: None }),
            ChatAction::EditGoal => {
                let id = required_id(data)?;
                Step::Sheet(Sheet::Goal {
                    existing: Some(find_goal(client, &id).await?),
                })
            }
            ChatAction::ContributeGoal => {
                let id = required_id(data)?;
                let Some(amount) = amount(data, "amount") else {
                    return Ok(Step::Sheet(Sheet::Contribution {
                        goal: find_goal(client, &id).await?,
                    }));
                };
                let input = ContributionInput {
                    amount,
                    note: text(data, "note"),
                };
                let goal = client.goals().contribute(&id, &input).await?;
                Step::card(
                    format!(
                        "Added {} to {}.",
                        format_money(amount, goal.currency.as_str()),
                        goal.name
                    ),
                    MessageContent::SavingsGoalCard(Some(goal)),
                )
            }
            ChatAction::DeleteGoal => {
                let id = required_id(data)?;
                client.goals().delete(&id).await?;
                Step::card("Savings goal deleted.", MessageContent::SavingsGoals(None))
            }
            ChatAction::GoalHistory => match text(data, "id").or_else(|| text(data, "goalId")) {
                Some(goal_id) => Step::card(
                    "Here's the contribution history.",
                    MessageContent::GoalHistory(Some(GoalHistoryCard {
                        goal_id,
                        goal_name: text(data, "name"),
                        currency: client.display_currency().clone(),
                        contributions: None,
                    })),
                ),
                None => Step::card(
                    "Pick a goal to see its history.",
                    MessageContent::SavingsGoals(None),
                ),
            },
            ChatAction::ShowCashFlow => {
                Step::card("Here's your cash flow.", MessageContent::CashFlow(None))
            }
            ChatAction::ShowSpending => Step::card(
                "Here's where your money went.",
                MessageContent::SpendingAnalysis(None),
            ),
            ChatAction::ShowTransactions => Step::card(
                "Here are your recent transactions.",
                MessageContent::TransactionList(None),
            ),
            ChatAction::AddTransaction => Step::Sheet(Sheet::Transaction),
            ChatAction::ShowRecurring => Step::card(
                "These are your recurring expenses.",
                MessageContent::RecurringExpenses(None),
            ),
            ChatAction::ConnectBank => {
                let session = client.bank().connect().await?;
                Step::Navigate(session.authorization_url)
            }
            ChatAction::SetAiMode => {
                match text(data, "mode").and_then(|m| m.parse::<AiMode>().ok()) {
                    Some(mode) => {
                        let mode = client.user().set_ai_mode(mode).await?;
                        Step::card(
                            format!("Assistant mode set to {}.", mode.label()),
                            MessageContent::AiMode(Some(AiModeSetting { mode })),
                        )
                    }
                    None => Step::card(
                        "How much detail would you like in my answers?",
                        MessageContent::AiMode(None),
                    ),
                }
            }
            ChatAction::ShowFeatureGuide => Step::card(
                "Here's what I can help with.",
                MessageContent::FeatureGuide(None),
            ),
            ChatAction::DismissFeatureGuide => {
                client.user().dismiss_feature_guide().await?;
                Step::Reply(
                    "Got it. You can ask for the feature guide any time.".into(),
                    Vec::new(),
                )
            }
            ChatAction::ShowFamily => Step::Reply(
                "Here's your family overview.".into(),
                vec![
                    MessageContent::FamilySpending(None),
                    MessageContent::FamilyConsent(None),
                ],
            ),
            ChatAction::RequestFamilyConsent => {
                if let Some(request_id) = text(data, "requestId") {
                    let approve = data.get("approve").and_then(Value::as_bool).unwrap_or(false);
                    let consent = client
                        .family()
                        .respond_consent(&ConsentAnswer {
                            request_id,
                            approve,
                        })
                        .await?;
                    let text = if approve {
                        "Sharing approved."
                    } else {
                        "Request declined."
                    };
                    Step::card(text, MessageContent::FamilyConsent(Some(consent)))
                } else if let Some(email) = text(data, "email") {
                    let consent = client
                        .family()
                        .request_consent(&ConsentRequest {
                            email: email.clone(),
                            relationship: text(data, "relationship"),
                        })
                        .await?;
                    Step::card(
                        format!("I've asked {email} to share their spending."),
                        MessageContent::FamilyConsent(Some(consent)),
                    )
                } else {
                    Step::Navigate("/dashboard/family".into())
                }
            }
            ChatAction::ShowSubscription => {
                Step::card("Here's your plan.", MessageContent::Subscription(None))
            }
            ChatAction::UpgradePlan => {
                let plan = text(data, "plan").and_then(|p| p.parse::<PlanTier>().ok());
                match plan {
                    Some(plan) if plan != PlanTier::Free => {
                        let billing_cycle = text(data, "billingCycle")
                            .and_then(|c| c.parse::<BillingCycle>().ok())
                            .unwrap_or_default();
                        let session = client
                            .subscription()
                            .checkout(&CheckoutRequest {
                                plan,
                                billing_cycle,
                            })
                            .await?;
                        Step::Navigate(session.url)
                    }
                    _ => Step::Navigate("/dashboard/subscription".into()),
                }
            }
            ChatAction::OpenDashboard => {
                let to = text(data, "path")
                    .filter(|p| p.starts_with("/dashboard"))
                    .unwrap_or_else(|| "/dashboard".into());
                Step::Navigate(to)
            }
            // Unwrapped before `run`; only a malformed retry gets here.
            ChatAction::Retry => Step::Reply(NOTHING_TO_RETRY.into(), Vec::new()),
        };
        Ok(step)
    }
}

enum Step {
    Reply(String, Vec<MessageContent>),
    Sheet(Sheet),
    Navigate(String),
}

impl Step {
    fn card(text: impl Into<String>, card: MessageContent) -> Self {
        Self::Reply(text.into(), vec![card])
    }
}

/// `retry` carries `{action, data}` of the action to run again.
fn unwrap_retry(action: ChatAction, data: Value) -> Result<(ChatAction, Value), String> {
    if action != ChatAction::Retry {
        return Ok((action, data));
    }
    let inner = data
        .get("action")
        .and_then(Value::as_str)
        .and_then(|a| a.parse::<ChatAction>().ok())
        .filter(|a| *a != ChatAction::Retry);
    match inner {
        Some(inner) => Ok((inner, data.get("data").cloned().unwrap_or(Value::Null))),
        None => Err(NOTHING_TO_RETRY.into()),
    }
}

/// Category for a `set-budget` that names only an amount.
const DEFAULT_CATEGORY: &str = "General";
const NOTHING_TO_RETRY: &str = "There's nothing to retry. Try asking again.";

fn retry_message(action: ChatAction, data: Value, error: &FetchError) -> ChatMessage {
    let message = error.user_message();
    ChatMessage::assistant(
        message.clone(),
        vec![MessageContent::ErrorRetry(Some(RetryCard {
            message,
            action: Some(action.as_str().to_string()),
            data: (!data.is_null()).then_some(data),
        }))],
    )
}

fn text(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A finite, positive amount given as a number or numeric string.
fn amount(data: &Value, key: &str) -> Option<f64> {
    let value = data.get(key)?;
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n > 0.0).then_some(n)
}

fn required_id(data: &Value) -> Result<String, FetchError> {
    text(data, "id").ok_or_else(|| FetchError::Api {
        status: 400,
        message: "That item is missing an id.".into(),
    })
}

/// Button data for an action that needs no parameters.
#[must_use]
pub fn no_data() -> Value {
    json!({})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTransport, Method, Transport};
    use crate::chat::message::Role;
    use crate::query::QueryCache;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryTransport>, ActionDispatcher, Thread) {
        let transport = Arc::new(MemoryTransport::new());
        let client = FinanceClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            QueryCache::disabled(),
        );
        let thread = crate::chat::ThreadStore::new().create();
        (transport, ActionDispatcher::new(client), thread)
    }

    #[tokio::test]
    async fn set_budget_posts_once_and_appends_one_card() {
        let (transport, dispatcher, thread) = setup();
        transport.respond(
            Method::Post,
            "/api/finance/budgets",
            json!({ "budget": {
                "id": "b9", "category": "Dining", "amount": 180, "spent": 42.5, "currency": "BHD"
            }}),
        );
        thread.push(ChatMessage::assistant("Want a budget?", vec![MessageContent::BudgetOverview(None)]));

        let outcome = dispatcher
            .dispatch(
                &thread,
                ChatAction::SetBudget,
                json!({ "category": "Dining", "amount": 180 }),
            )
            .await;

        assert_eq!(transport.count(Method::Post, "/api/finance/budgets"), 1);
        assert_eq!(transport.total(), 1);

        let messages = thread.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].actions_disabled);
        let reply = &messages[1];
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.rich_content.len(), 1);
        let MessageContent::BudgetCard(Some(budget)) = &reply.rich_content[0] else {
            panic!("expected budget card, got {:?}", reply.rich_content);
        };
        assert_eq!(budget.id, "b9");
        assert!((budget.spent - 42.5).abs() < f64::EPSILON);
        assert_eq!(outcome, ActionOutcome::Append(reply.clone()));
    }

    #[tokio::test]
    async fn set_budget_with_only_an_amount_still_posts() {
        let (transport, dispatcher, thread) = setup();
        transport.respond(
            Method::Post,
            "/api/finance/budgets",
            json!({ "budget": { "id": "b3", "category": "General", "amount": 100 } }),
        );

        let outcome = dispatcher
            .dispatch(&thread, ChatAction::SetBudget, json!({ "amount": 100 }))
            .await;

        assert_eq!(transport.count(Method::Post, "/api/finance/budgets"), 1);
        let sent = &transport.requests()[0];
        assert_eq!(
            sent.body.as_ref().and_then(|b| b.get("category")),
            Some(&json!("General"))
        );
        let ActionOutcome::Append(reply) = &outcome else {
            panic!("expected an appended message, got {outcome:?}");
        };
        assert!(matches!(
            &reply.rich_content[..],
            [MessageContent::BudgetCard(Some(b))] if b.id == "b3"
        ));
        assert_eq!(thread.message_count(), 1);
    }

    #[tokio::test]
    async fn set_budget_without_amount_opens_the_sheet() {
        let (transport, dispatcher, thread) = setup();
        for data in [json!({ "category": "Dining" }), json!({ "category": "Dining", "amount": "-3" })] {
            let outcome = dispatcher.dispatch(&thread, ChatAction::SetBudget, data).await;
            assert_eq!(outcome, ActionOutcome::OpenSheet(Sheet::Budget { existing: None }));
        }
        assert_eq!(transport.total(), 0);
        assert_eq!(thread.message_count(), 0);
    }

    #[tokio::test]
    async fn failures_append_a_retry_card_carrying_the_action() {
        let (transport, dispatcher, thread) = setup();
        transport.fail(
            Method::Delete,
            "/api/finance/budgets/b1",
            FetchError::Api {
                status: 500,
                message: "Could not delete budget".into(),
            },
        );

        let data = json!({ "id": "b1" });
        dispatcher
            .dispatch(&thread, ChatAction::DeleteBudget, data.clone())
            .await;

        let messages = thread.messages();
        let MessageContent::ErrorRetry(Some(card)) = &messages[0].rich_content[0] else {
            panic!("expected retry card");
        };
        assert_eq!(card.message, "Could not delete budget");
        assert_eq!(card.action.as_deref(), Some("delete-budget"));
        assert_eq!(card.data.as_ref(), Some(&data));

        // "Try again" re-dispatches the same action.
        transport.respond(Method::Delete, "/api/finance/budgets/b1", Value::Null);
        dispatcher
            .dispatch(
                &thread,
                ChatAction::Retry,
                json!({ "action": "delete-budget", "data": data }),
            )
            .await;
        assert_eq!(transport.count(Method::Delete, "/api/finance/budgets/b1"), 2);
        let messages = thread.messages();
        assert!(messages[0].actions_disabled);
        assert_eq!(messages[1].rich_content[0], MessageContent::BudgetOverview(None));
    }

    #[tokio::test]
    async fn canned_cards_make_no_requests() {
        let (transport, dispatcher, thread) = setup();
        let outcome = dispatcher
            .dispatch(&thread, ChatAction::ShowBalance, no_data())
            .await;
        let ActionOutcome::Append(message) = outcome else {
            panic!("expected a message");
        };
        assert_eq!(message.rich_content, vec![MessageContent::BalanceCard(None)]);
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn each_dispatch_disables_only_the_newest_card_message() {
        let (_transport, dispatcher, thread) = setup();
        dispatcher.dispatch(&thread, ChatAction::ShowBalance, no_data()).await;
        dispatcher.dispatch(&thread, ChatAction::ShowGoals, no_data()).await;
        let messages = thread.messages();
        assert!(messages[0].actions_disabled);
        assert!(!messages[1].actions_disabled);

        // Opening a sheet still supersedes the latest card.
        dispatcher.dispatch(&thread, ChatAction::CreateGoal, no_data()).await;
        assert!(thread.messages()[1].actions_disabled);
    }

    #[tokio::test]
    async fn navigation_actions() {
        let (transport, dispatcher, thread) = setup();
        transport.respond(
            Method::Post,
            "/api/tarabut/connect",
            json!({ "authorizationUrl": "https://bank.example/authorize" }),
        );
        assert_eq!(
            dispatcher.dispatch(&thread, ChatAction::ConnectBank, no_data()).await,
            ActionOutcome::Navigate("https://bank.example/authorize".into())
        );
        assert_eq!(
            dispatcher
                .dispatch(&thread, ChatAction::OpenDashboard, json!({ "path": "https://evil" }))
                .await,
            ActionOutcome::Navigate("/dashboard".into())
        );
        assert_eq!(
            dispatcher.dispatch(&thread, ChatAction::UpgradePlan, no_data()).await,
            ActionOutcome::Navigate("/dashboard/subscription".into())
        );
    }

    #[tokio::test]
    async fn retry_without_a_target_explains_itself() {
        let (_transport, dispatcher, thread) = setup();
        let outcome = dispatcher
            .dispatch(&thread, ChatAction::Retry, json!({ "action": "retry" }))
            .await;
        assert!(matches!(outcome, ActionOutcome::Append(m) if m.rich_content.is_empty()));
    }
}
