use std::fmt::Write as _;

use serde_json::json;

use crate::api::types::{Currency, GoalHistoryCard, GoalList, SavingsGoal};
use crate::chat::{ChatAction, no_data};
use crate::ui::cards::{CardContext, money};
use crate::ui::components::{BadgeVariant, ButtonVariant, badge, card, empty_state, progress_bar};
use crate::ui::fetch::resolve;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

fn goal_progress(goal: &SavingsGoal) -> String {
    let progress = goal.progress();
    let deadline = goal
        .deadline
        .map(|d| format!("by {}", d.format("%-d %b %Y")))
        .unwrap_or_default();
    let tail = if progress.is_complete() {
        r#"<span class="text-success font-medium">Goal reached</span>"#.to_string()
    } else {
        format!("{} to go", money(progress.remaining(), &goal.currency))
    };
    format!(
        r#"<div class="space-y-1.5">
<div class="flex justify-between text-sm"><span>{} of {}</span><span class="text-textMuted">{:.0}%</span></div>
{}
<div class="flex justify-between text-xs text-textMuted"><span>{tail}</span><span>{deadline}</span></div>
</div>"#,
        money(progress.current(), &goal.currency),
        money(progress.target(), &goal.currency),
        progress.display_percent(),
        // Saving past the target is good news, not a warning.
        progress_bar(progress.bar_width(), crate::finance::ProgressStatus::OnTrack),
    )
}

fn goal_actions(ctx: &CardContext<'_>, goal: &SavingsGoal) -> String {
    let data = json!({ "id": goal.id, "name": goal.name });
    format!(
        "{}{}{}{}",
        ctx.action_button("Add money", ChatAction::ContributeGoal, &data, ButtonVariant::Primary),
        ctx.action_button("History", ChatAction::GoalHistory, &data, ButtonVariant::Secondary),
        ctx.action_button("Edit", ChatAction::EditGoal, &data, ButtonVariant::Ghost),
        ctx.confirm_button(
            "Delete",
            ChatAction::DeleteGoal,
            &data,
            &format!("Delete the goal \"{}\"?", goal.name)
        ),
    )
}

fn placeholder_goal(currency: &Currency) -> SavingsGoal {
    SavingsGoal {
        id: String::new(),
        name: "Savings goal".into(),
        target_amount: 0.0,
        current_amount: 0.0,
        currency: currency.clone(),
        deadline: None,
        icon: None,
    }
}

/// One savings goal.
pub async fn savings_goal_card(ctx: &CardContext<'_>, props: Option<&SavingsGoal>) -> String {
    let loaded = resolve("savings-goal-card", props.cloned().map(Some), || async move {
        ctx.client.goals().list().await.map(|goals| goals.into_iter().next())
    })
    .await;
    let (goal, fallback) = loaded.or_default_with(|| Some(placeholder_goal(ctx.currency)));

    let Some(goal) = goal else {
        let footer = ctx.action_button(
            "Create goal",
            ChatAction::CreateGoal,
            &no_data(),
            ButtonVariant::Primary,
        );
        return ctx.frame(
            "savings-goal-card",
            None,
            &card("Savings goal", Icon::Target, "", &empty_state("No savings goals yet."), &footer),
        );
    };

    let header_extra = if goal.progress().is_complete() {
        badge("Reached", BadgeVariant::Success)
    } else {
        String::new()
    };
    let footer = if goal.id.is_empty() {
        String::new()
    } else {
        goal_actions(ctx, &goal)
    };
    ctx.frame(
        "savings-goal-card",
        fallback.then_some(None),
        &card(&goal.name, Icon::Target, &header_extra, &goal_progress(&goal), &footer),
    )
}

/// Every savings goal.
pub async fn savings_goals_card(ctx: &CardContext<'_>, props: Option<&GoalList>) -> String {
    let loaded = resolve("savings-goals", props.cloned(), || async move {
        ctx.client.goals().list().await.map(|goals| GoalList { goals })
    })
    .await;
    let (list, fallback) = loaded.or_default_with(GoalList::default);

    let body = if list.goals.is_empty() {
        empty_state("No savings goals yet. What are you saving for?")
    } else {
        let saved: f64 = list.goals.iter().map(|g| g.current_amount).sum();
        let currency = list.goals[0].currency.clone();
        let mut body = format!(
            r#"<p class="text-sm text-textMuted">{} saved across {} goals</p><ul class="space-y-4">"#,
            money(saved, &currency),
            list.goals.len()
        );
        for goal in &list.goals {
            let data = json!({ "id": goal.id, "name": goal.name });
            let _ = write!(
                body,
                r#"<li class="space-y-2"><div class="flex items-center justify-between gap-2"><span class="font-medium">{}</span><div class="flex gap-1">{}{}</div></div>{}</li>"#,
                escape(&goal.name),
                ctx.action_button("Add", ChatAction::ContributeGoal, &data, ButtonVariant::Secondary),
                ctx.action_button("Edit", ChatAction::EditGoal, &data, ButtonVariant::Ghost),
                goal_progress(goal)
            );
        }
        body.push_str("</ul>");
        body
    };

    let footer = ctx.action_button(
        "New goal",
        ChatAction::CreateGoal,
        &no_data(),
        ButtonVariant::Primary,
    );
    ctx.frame(
        "savings-goals",
        fallback.then_some(None),
        &card("Savings goals", Icon::PiggyBank, "", &body, &footer),
    )
}

/// Contributions made to one goal.
///
/// Needs a goal id to fetch; without one it asks the user to pick a goal.
pub async fn goal_history_card(ctx: &CardContext<'_>, props: Option<&GoalHistoryCard>) -> String {
    let Some(props) = props else {
        let footer = ctx.action_button(
            "Show goals",
            ChatAction::ShowGoals,
            &no_data(),
            ButtonVariant::Secondary,
        );
        return ctx.frame(
            "goal-history",
            None,
            &card(
                "Contribution history",
                Icon::Receipt,
                "",
                &empty_state("Pick a goal to see its history."),
                &footer,
            ),
        );
    };

    let goal_id = props.goal_id.clone();
    let loaded = resolve("goal-history", props.contributions.clone(), || async move {
        ctx.client.goals().history(&goal_id).await
    })
    .await;
    let (contributions, fallback) = loaded.or_default_with(Vec::new);

    let body = if contributions.is_empty() {
        empty_state("No contributions yet.")
    } else {
        let total: f64 = contributions.iter().map(|c| c.amount).sum();
        let mut body = format!(
            r#"<p class="text-sm text-textMuted">{} contributed</p><ul class="divide-y divide-panelBorder text-sm">"#,
            money(total, &props.currency)
        );
        for c in &contributions {
            let note = c
                .note
                .as_deref()
                .map(|n| format!(r#"<span class="text-textMuted"> · {}</span>"#, escape(n)))
                .unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="flex justify-between py-2"><span>{}{note}</span><span class="font-medium text-success">+{}</span></li>"#,
                c.created_at.format("%-d %b %Y"),
                money(c.amount, &props.currency)
            );
        }
        body.push_str("</ul>");
        body
    };

    let title = props.goal_name.as_deref().map_or_else(
        || "Contribution history".to_string(),
        |name| format!("{name} history"),
    );
    let footer = ctx.action_button(
        "Add money",
        ChatAction::ContributeGoal,
        &json!({ "id": props.goal_id }),
        ButtonVariant::Primary,
    );
    ctx.frame(
        "goal-history",
        fallback.then_some(Some(props.goal_id.as_str())),
        &card(&title, Icon::Receipt, "", &body, &footer),
    )
}
