use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::{HeaderName, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api::{FinanceClient, HttpTransport};
use crate::api::types::{BillingCycle, ConsentRequest, FamilyMember, GoalHistoryCard, PlanTier};
use crate::chat::{
    ActionOutcome, ChatAction, ChatMessage, DEFAULT_THREAD_TIMEOUT, MessageContent, ThreadStore, no_data,
};
use crate::config::AppConfig;
use crate::forms::{
    BudgetForm, ContributionForm, FamilyBudgetForm, GoalForm, Sheet, SheetForm, SheetKind,
    SubmitOutcome, TransactionForm,
};
use crate::ui::cards::{CardContext, Surface, render_content};
use crate::ui::chat::{chat_page, conversation_list, message_list};
use crate::ui::dashboard::{
    consent_request_form, family_budgets_panel, family_page, plans_panel, spending_page,
    subscription_page,
};
use crate::ui::html::{Nav, page_shell};
use crate::ui::sheets::{
    Feedback, budget_sheet, contribution_sheet, family_budget_sheet, goal_sheet, notice_sheet,
    open_sheet, transaction_sheet,
};

const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
const HX_RETARGET: HeaderName = HeaderName::from_static("hx-retarget");
const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");
const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

/// Fired after any successful write so dashboard panels reload.
const FINANCE_UPDATED: &str = "finance-updated";
/// Fired after a chat exchange so the conversation sidebar reloads.
const CHAT_UPDATED: &str = "chat-updated";

const THREAD_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "finance_api.config.loaded",
        base_url = %config.finance_api.base_url,
        timeout_secs = config.finance_api.timeout_secs,
        cache_enabled = config.cache.enabled,
        "Finance API configuration loaded"
    );

    let transport = HttpTransport::new(
        &config.finance_api.base_url,
        config.finance_api.timeout(),
        config.finance_api.bearer_token.as_deref(),
    )?;
    let state = AppState::new(Arc::clone(&config), Arc::new(transport));

    spawn_thread_sweep(state.threads.clone());

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Drop chat threads that have been idle too long.
fn spawn_thread_sweep(threads: ThreadStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(THREAD_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = threads.cleanup_expired_with_timeout(DEFAULT_THREAD_TIMEOUT);
            if removed > 0 {
                info!(name: "chat.threads.swept", removed, remaining = threads.len(), "Expired chat threads removed");
            }
        }
    });
}

/// All pages and fragments, with tracing, body limit and request timeout.
pub fn build_router(state: AppState) -> Router {
    // A disabled timeout is a very long one so the layer stack keeps one type.
    let timeout_duration = state.config.resilience.request_timeout();
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(index))
        .route("/chat/{conversation_id}", get(conversation_page))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/family", get(family))
        .route("/dashboard/subscription", get(subscription))
        .route("/ui/chat/messages", post(send_message))
        .route("/ui/chat/actions", post(run_action))
        .route("/ui/cards/{kind}", get(card_fragment))
        .route("/ui/conversations", get(conversations))
        .route("/ui/conversations/{id}", axum::routing::delete(delete_conversation))
        .route("/ui/sheets/{kind}", get(sheet_fragment).post(submit_sheet))
        .route("/ui/family/budgets", get(family_budgets))
        .route("/ui/family/consent", post(request_consent))
        .route("/ui/subscription/plans", get(plans))
        .route("/ui/subscription/plan", post(change_plan))
        .route("/ui/subscription/billing", post(change_billing))
        .route("/healthz", get(healthz))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - A new chat.
async fn index(State(state): State<AppState>) -> Html<String> {
    let thread = state.threads.create();
    let content = chat_page(&state.client, &state.currency, &thread, "New chat").await;
    Html(page_shell("Chat", Nav::Chat, &content))
}

/// GET /chat/:conversation_id - A stored conversation in a fresh thread.
async fn conversation_page(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Html<String> {
    let (thread, title) = match state.chat.select(&state.threads, &conversation_id).await {
        Ok(thread) => {
            let title = match state.client.conversations().get(&conversation_id).await {
                Ok(c) => c.title,
                Err(_) => "Conversation".to_string(),
            };
            (thread, title)
        }
        Err(e) => {
            tracing::warn!(
                name: "chat.conversation.failed",
                conversation_id = %conversation_id,
                error = %e,
                "Could not open conversation"
            );
            let thread = state.threads.create();
            thread.push(ChatMessage::assistant(e.user_message(), Vec::new()));
            (thread, "New chat".to_string())
        }
    };
    let content = chat_page(&state.client, &state.currency, &thread, &title).await;
    Html(page_shell(&title, Nav::Chat, &content))
}

async fn dashboard() -> Html<String> {
    Html(page_shell("Spending", Nav::Dashboard, &spending_page()))
}

async fn family() -> Html<String> {
    Html(page_shell("Family", Nav::Family, &family_page()))
}

async fn subscription() -> Html<String> {
    Html(page_shell("Your plan", Nav::Subscription, &subscription_page()))
}

async fn healthz() -> &'static str {
    "ok"
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat fragments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendMessage {
    session_id: String,
    #[serde(default)]
    message: String,
}

/// POST /ui/chat/messages - Send a message and re-render the thread.
async fn send_message(State(state): State<AppState>, Form(req): Form<SendMessage>) -> Response {
    let thread = state.threads.get_or_create(&req.session_id);
    let sent = state.chat.send(&thread, &req.message).await.is_some();
    let html = Html(message_list(&state.client, &state.currency, &thread).await);
    if sent {
        ([(HX_TRIGGER, CHAT_UPDATED)], html).into_response()
    } else {
        html.into_response()
    }
}

#[derive(Debug, Deserialize)]
struct RunAction {
    #[serde(default)]
    session_id: Option<String>,
    action: String,
    /// JSON-encoded button data.
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    surface: Option<String>,
}

/// POST /ui/chat/actions - Run a card button.
///
/// In the chat the reply is the re-rendered thread. Dashboard buttons run on
/// a throwaway thread and answer with headers only.
async fn run_action(State(state): State<AppState>, Form(req): Form<RunAction>) -> Response {
    let action: ChatAction = match req.action.parse() {
        Ok(action) => action,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let data = req
        .data
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| serde_json::from_str::<Value>(s).ok())
        .unwrap_or_else(no_data);

    let on_dashboard = req.surface.as_deref() == Some("dashboard");
    let thread = match (&req.session_id, on_dashboard) {
        (Some(id), false) if !id.is_empty() => state.threads.get_or_create(id),
        _ => ThreadStore::new().create(),
    };

    match state.dispatcher.dispatch(&thread, action, data).await {
        ActionOutcome::Append(message) if on_dashboard => {
            let failed = message
                .rich_content
                .iter()
                .any(|c| matches!(c, MessageContent::ErrorRetry(_)));
            if failed {
                sheet_response(notice_sheet("Could not finish", &message.content))
            } else {
                ([(HX_TRIGGER, FINANCE_UPDATED)], Html(String::new())).into_response()
            }
        }
        ActionOutcome::Append(_) => {
            let html = message_list(&state.client, &state.currency, &thread).await;
            ([(HX_TRIGGER, FINANCE_UPDATED)], Html(html)).into_response()
        }
        ActionOutcome::OpenSheet(sheet) => {
            let members = sheet_members(&state, &sheet).await;
            sheet_response(open_sheet(&sheet, &members))
        }
        ActionOutcome::Navigate(url) => {
            ([(HX_REDIRECT, url)], Html(String::new())).into_response()
        }
    }
}

/// Render `html` into the drawer root regardless of the trigger's target.
fn sheet_response(html: String) -> Response {
    (
        [(HX_RETARGET, "#sheet-root"), (HX_RESWAP, "innerHTML")],
        Html(html),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ConversationsQuery {
    #[serde(default)]
    active: Option<String>,
}

/// GET /ui/conversations - Sidebar list.
async fn conversations(
    State(state): State<AppState>,
    Query(query): Query<ConversationsQuery>,
) -> Html<String> {
    let result = state.chat.conversations().await;
    Html(conversation_list(
        result.as_deref(),
        query.active.as_deref(),
    ))
}

/// DELETE /ui/conversations/:id - Remove a conversation and re-render the list.
async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Html<String> {
    if let Err(e) = state.chat.delete(&id).await {
        tracing::warn!(
            name: "chat.conversation.delete_failed",
            conversation_id = %id,
            error = %e,
            "Could not delete conversation"
        );
    }
    let result = state.chat.conversations().await;
    Html(conversation_list(result.as_deref(), None))
}

// ─────────────────────────────────────────────────────────────────────────────
// Cards
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CardQuery {
    #[serde(default)]
    surface: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// GET /ui/cards/:kind - One card, fetched fresh.
async fn card_fragment(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<CardQuery>,
) -> Response {
    let content = match (kind.as_str(), query.id.filter(|id| !id.is_empty())) {
        ("goal-history", Some(goal_id)) => MessageContent::GoalHistory(Some(GoalHistoryCard {
            goal_id,
            goal_name: None,
            currency: state.currency.clone(),
            contributions: None,
        })),
        (tag, _) => match MessageContent::empty(tag) {
            Some(content) => content,
            None => return (StatusCode::NOT_FOUND, "Unknown card").into_response(),
        },
    };
    let surface = match query.surface.as_deref() {
        Some("dashboard") => Surface::Dashboard,
        _ => Surface::Chat {
            actions_disabled: false,
        },
    };
    let ctx = CardContext {
        client: &state.client,
        currency: &state.currency,
        surface,
    };
    Html(render_content(&ctx, &content).await).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Sheets
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SheetQuery {
    #[serde(default)]
    id: Option<String>,
}

/// Members a family budget can be assigned to; empty when unavailable.
async fn sheet_members(state: &AppState, sheet: &Sheet) -> Vec<FamilyMember> {
    if sheet.kind() != SheetKind::FamilyBudget {
        return Vec::new();
    }
    match state.client.family().consent().await {
        Ok(consent) => consent.members,
        Err(e) => {
            tracing::warn!(name: "sheet.members.failed", error = %e, "Family members unavailable");
            Vec::new()
        }
    }
}

/// GET /ui/sheets/:kind - Open a drawer, seeded from `?id=` when editing.
async fn sheet_fragment(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<SheetQuery>,
) -> Response {
    let Ok(kind) = kind.parse::<SheetKind>() else {
        return (StatusCode::NOT_FOUND, "Unknown form").into_response();
    };
    let html = match Sheet::load(kind, query.id.as_deref(), &state.client).await {
        Ok(sheet) => {
            let members = sheet_members(&state, &sheet).await;
            open_sheet(&sheet, &members)
        }
        Err(e) => notice_sheet("Unavailable", &e.user_message()),
    };
    Html(html).into_response()
}

/// Decode flat form fields into a drawer form.
fn decode_form<F: DeserializeOwned>(fields: HashMap<String, String>) -> Result<F, Response> {
    let object = fields
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect::<serde_json::Map<_, _>>();
    serde_json::from_value(Value::Object(object))
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, format!("Malformed form: {e}")).into_response())
}

/// POST /ui/sheets/:kind - Validate and save a drawer form.
///
/// Saved forms close the drawer and fire `finance-updated`; rejected ones
/// re-render with the error.
async fn submit_sheet(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, Response> {
    let Ok(kind) = kind.parse::<SheetKind>() else {
        return Err((StatusCode::NOT_FOUND, "Unknown form").into_response());
    };
    let client = &state.client;
    let response = match kind {
        SheetKind::Budget => {
            let form: BudgetForm = decode_form(fields)?;
            save_sheet(client, &form, budget_sheet).await
        }
        SheetKind::Goal => {
            let form: GoalForm = decode_form(fields)?;
            save_sheet(client, &form, goal_sheet).await
        }
        SheetKind::Contribution => {
            let form: ContributionForm = decode_form(fields)?;
            save_sheet(client, &form, |f, fb| contribution_sheet(f, None, fb)).await
        }
        SheetKind::Transaction => {
            let form: TransactionForm = decode_form(fields)?;
            save_sheet(client, &form, transaction_sheet).await
        }
        SheetKind::FamilyBudget => {
            let form: FamilyBudgetForm = decode_form(fields)?;
            let members = sheet_members(&state, &Sheet::FamilyBudget).await;
            save_sheet(client, &form, |f, fb| family_budget_sheet(f, &members, fb)).await
        }
    };
    Ok(response)
}

async fn save_sheet<F>(
    client: &FinanceClient,
    form: &F,
    render: impl Fn(&F, &Feedback<'_>) -> String,
) -> Response
where
    F: SheetForm,
{
    match form.submit(client).await {
        SubmitOutcome::Saved(_) => ([(HX_TRIGGER, FINANCE_UPDATED)], Html(String::new())).into_response(),
        SubmitOutcome::Invalid(e) => Html(render(form, &Feedback::Field(&e))).into_response(),
        SubmitOutcome::Failed(message) => Html(render(form, &Feedback::Server(&message))).into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Family and subscription
// ─────────────────────────────────────────────────────────────────────────────

async fn family_budgets(State(state): State<AppState>) -> Html<String> {
    Html(family_budgets_panel(&state.client).await)
}

#[derive(Debug, Deserialize)]
struct ConsentForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    relationship: String,
}

/// POST /ui/family/consent - Ask someone to share their spending.
async fn request_consent(State(state): State<AppState>, Form(form): Form<ConsentForm>) -> Response {
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Html(consent_request_form(email, Some(("Enter a valid email address.", false))))
            .into_response();
    }
    let relationship = Some(form.relationship.trim().to_string()).filter(|r| !r.is_empty());
    let request = ConsentRequest {
        email: email.to_string(),
        relationship,
    };
    match state.client.family().request_consent(&request).await {
        Ok(_) => (
            [(HX_TRIGGER, FINANCE_UPDATED)],
            Html(consent_request_form("", Some(("Request sent.", true)))),
        )
            .into_response(),
        Err(e) => Html(consent_request_form(email, Some((&e.user_message(), false)))).into_response(),
    }
}

async fn plans(State(state): State<AppState>) -> Html<String> {
    Html(plans_panel(&state.client).await)
}

#[derive(Debug, Deserialize)]
struct PlanForm {
    plan: PlanTier,
}

/// POST /ui/subscription/plan - Switch plans without checkout.
async fn change_plan(State(state): State<AppState>, Form(form): Form<PlanForm>) -> Response {
    match state.client.subscription().change_plan(form.plan).await {
        Ok(_) => ([(HX_TRIGGER, FINANCE_UPDATED)], Html(String::new())).into_response(),
        Err(e) => sheet_response(notice_sheet("Plan not changed", &e.user_message())),
    }
}

#[derive(Debug, Deserialize)]
struct BillingForm {
    billing_cycle: BillingCycle,
}

/// POST /ui/subscription/billing - Switch between monthly and yearly billing.
async fn change_billing(State(state): State<AppState>, Form(form): Form<BillingForm>) -> Response {
    match state.client.subscription().change_billing(form.billing_cycle).await {
        Ok(_) => ([(HX_TRIGGER, FINANCE_UPDATED)], Html(String::new())).into_response(),
        Err(e) => sheet_response(notice_sheet("Billing not changed", &e.user_message())),
    }
}
