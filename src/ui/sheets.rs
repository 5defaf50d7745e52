//! Drawer forms.
//!
//! A drawer is rendered into `#sheet-root`. It posts back to
//! `/ui/sheets/{kind}` and is re-rendered in place with the typed values and
//! an inline error until the save succeeds, at which point the root is
//! emptied.

use std::fmt::Write as _;

use crate::api::types::FamilyMember;
use crate::error::ValidationError;
use crate::forms::{
    BudgetForm, ContributionForm, FamilyBudgetForm, GoalForm, Sheet, SheetKind, TransactionForm,
};
use crate::ui::components::{ButtonSize, ButtonVariant, button, submit_button};
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Message shown in a drawer after a failed submit.
#[derive(Debug, Clone, Copy, Default)]
pub enum Feedback<'a> {
    #[default]
    None,
    /// Rejected input, shown under the offending field.
    Field(&'a ValidationError),
    /// Server refusal, shown above the buttons.
    Server(&'a str),
}

impl Feedback<'_> {
    fn for_field(&self, field: &str) -> Option<&str> {
        match self {
            Self::Field(e) if e.field == field => Some(e.message.as_str()),
            _ => None,
        }
    }

    fn banner(&self) -> String {
        match self {
            Self::Server(message) => format!(
                r#"<p role="alert" class="flex items-start gap-2 rounded-lg bg-danger/10 p-3 text-sm text-danger">{}<span>{}</span></p>"#,
                Icon::AlertCircle.svg("mt-0.5"),
                escape(message)
            ),
            _ => String::new(),
        }
    }
}

const INPUT_CLASS: &str = "w-full rounded-xl border border-panelBorder bg-background px-3 py-2 text-sm text-textPrimary placeholder:text-textMuted focus:outline-none focus:ring-2 focus:ring-primary";

fn field(name: &str, label: &str, control: &str, feedback: &Feedback<'_>) -> String {
    let error = feedback
        .for_field(name)
        .map(|m| format!(r#"<p class="text-xs text-danger" data-error-for="{name}">{}</p>"#, escape(m)))
        .unwrap_or_default();
    format!(
        r#"<label class="block space-y-1"><span class="text-sm font-medium">{}</span>{control}{error}</label>"#,
        escape(label)
    )
}

fn input(name: &str, kind: &str, value: &str, extra: &str) -> String {
    format!(
        r#"<input name="{name}" type="{kind}" value="{}" class="{INPUT_CLASS}" {extra}>"#,
        escape(value)
    )
}

fn amount_input(name: &str, value: &str) -> String {
    input(name, "text", value, r#"inputmode="decimal" autocomplete="off""#)
}

fn select(name: &str, value: &str, options: &[(&str, &str)]) -> String {
    let mut out = format!(r#"<select name="{name}" class="{INPUT_CLASS}">"#);
    for (option, label) in options {
        let selected = if *option == value { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<option value="{}"{selected}>{}</option>"#,
            escape(option),
            escape(label)
        );
    }
    out.push_str("</select>");
    out
}

fn hidden(name: &str, value: &str) -> String {
    format!(r#"<input type="hidden" name="{name}" value="{}">"#, escape(value))
}

/// Drawer chrome around a form's fields. Without a `kind` the drawer is a
/// plain notice with a close button.
fn drawer(
    kind: Option<SheetKind>,
    title: &str,
    fields: &str,
    submit: &str,
    feedback: &Feedback<'_>,
) -> String {
    let close = r#"hx-on:click="document.getElementById('sheet-root').innerHTML = ''""#;
    let (open, body_close, buttons) = match kind {
        Some(kind) => (
            format!(
                r##"<form class="space-y-4" hx-post="/ui/sheets/{kind}" hx-target="#sheet-root" hx-swap="innerHTML">"##
            ),
            "</form>",
            format!(
                "{}{}",
                button("Cancel", ButtonVariant::Ghost, ButtonSize::Md, close, false),
                submit_button(submit, ButtonVariant::Primary)
            ),
        ),
        None => (
            r#"<div class="space-y-4">"#.to_string(),
            "</div>",
            button("Close", ButtonVariant::Secondary, ButtonSize::Md, close, false),
        ),
    };
    let tag = kind.map_or("notice", SheetKind::as_str);
    format!(
        r#"<div data-sheet="{tag}" class="fixed inset-0 z-50 flex justify-end">
<div class="absolute inset-0 bg-black/50" {close}></div>
<aside class="relative flex h-full w-full max-w-md flex-col gap-4 overflow-y-auto bg-panel p-6 shadow-xl" role="dialog" aria-modal="true" aria-label="{title}">
<div class="flex items-center justify-between"><h2 class="text-lg font-semibold">{title}</h2><button type="button" aria-label="Close" class="rounded-lg p-1 text-textMuted hover:text-textPrimary" {close}>{}</button></div>
{open}
{fields}
{}
<div class="flex justify-end gap-2">{buttons}</div>
{body_close}
</aside>
</div>"#,
        Icon::X.svg("h-5 w-5"),
        feedback.banner(),
        title = escape(title),
    )
}

const PERIODS: [(&str, &str); 3] = [("weekly", "Weekly"), ("monthly", "Monthly"), ("yearly", "Yearly")];

pub fn budget_sheet(form: &BudgetForm, feedback: &Feedback<'_>) -> String {
    let mut fields = hidden("id", form.id.as_deref().unwrap_or_default());
    fields.push_str(&field(
        "category",
        "Category",
        &input("category", "text", &form.category, r#"placeholder="Groceries" autofocus"#),
        feedback,
    ));
    fields.push_str(&field("amount", "Limit", &amount_input("amount", &form.amount), feedback));
    fields.push_str(&field("period", "Period", &select("period", &form.period, &PERIODS), feedback));
    let (title, submit) = if form.is_edit() {
        ("Edit budget", "Save")
    } else {
        ("New budget", "Create budget")
    };
    drawer(Some(SheetKind::Budget), title, &fields, submit, feedback)
}

pub fn goal_sheet(form: &GoalForm, feedback: &Feedback<'_>) -> String {
    let mut fields = hidden("id", form.id.as_deref().unwrap_or_default());
    fields.push_str(&field(
        "name",
        "Goal name",
        &input("name", "text", &form.name, r#"placeholder="Emergency fund" autofocus"#),
        feedback,
    ));
    fields.push_str(&field(
        "target_amount",
        "Target",
        &amount_input("target_amount", &form.target_amount),
        feedback,
    ));
    fields.push_str(&field(
        "current_amount",
        "Already saved",
        &amount_input("current_amount", &form.current_amount),
        feedback,
    ));
    fields.push_str(&field(
        "deadline",
        "Target date (optional)",
        &input("deadline", "date", &form.deadline, ""),
        feedback,
    ));
    let (title, submit) = if form.is_edit() {
        ("Edit goal", "Save")
    } else {
        ("New savings goal", "Create goal")
    };
    drawer(Some(SheetKind::Goal), title, &fields, submit, feedback)
}

pub fn contribution_sheet(
    form: &ContributionForm,
    goal_name: Option<&str>,
    feedback: &Feedback<'_>,
) -> String {
    let mut fields = hidden("goal_id", &form.goal_id);
    fields.push_str(&field(
        "amount",
        "Amount",
        &amount_input("amount", &form.amount),
        feedback,
    ));
    fields.push_str(&field(
        "note",
        "Note (optional)",
        &input("note", "text", &form.note, ""),
        feedback,
    ));
    let title = goal_name.map_or_else(|| "Add money".to_string(), |name| format!("Add money to {name}"));
    drawer(Some(SheetKind::Contribution), &title, &fields, "Add", feedback)
}

pub fn transaction_sheet(form: &TransactionForm, feedback: &Feedback<'_>) -> String {
    let mut fields = field(
        "description",
        "Description",
        &input("description", "text", &form.description, r#"placeholder="Coffee" autofocus"#),
        feedback,
    );
    fields.push_str(&field("amount", "Amount", &amount_input("amount", &form.amount), feedback));
    fields.push_str(&field(
        "category",
        "Category",
        &input("category", "text", &form.category, r#"placeholder="Dining""#),
        feedback,
    ));
    fields.push_str(&field("date", "Date", &input("date", "date", &form.date, ""), feedback));
    fields.push_str(&field(
        "kind",
        "Type",
        &select("kind", &form.kind, &[("debit", "Expense"), ("credit", "Income")]),
        feedback,
    ));
    drawer(Some(SheetKind::Transaction), "Add transaction", &fields, "Add", feedback)
}

/// `members` are the family members who share with this user.
pub fn family_budget_sheet(
    form: &FamilyBudgetForm,
    members: &[FamilyMember],
    feedback: &Feedback<'_>,
) -> String {
    let mut options: Vec<(&str, &str)> = vec![("", "Choose a member")];
    options.extend(members.iter().map(|m| (m.id.as_str(), m.name.as_str())));
    let mut fields = field(
        "member_id",
        "Family member",
        &select("member_id", &form.member_id, &options),
        feedback,
    );
    if members.is_empty() {
        fields.push_str(
            r#"<p class="text-xs text-textMuted">Nobody is sharing with you yet. Send a sharing request first.</p>"#,
        );
    }
    fields.push_str(&field(
        "category",
        "Category",
        &input("category", "text", &form.category, r#"placeholder="Entertainment""#),
        feedback,
    ));
    fields.push_str(&field("amount", "Limit", &amount_input("amount", &form.amount), feedback));
    drawer(Some(SheetKind::FamilyBudget), "Family budget", &fields, "Save", feedback)
}

/// Fresh drawer for `sheet`, seeded from the entity it edits.
pub fn open_sheet(sheet: &Sheet, members: &[FamilyMember]) -> String {
    let none = Feedback::None;
    match sheet {
        Sheet::Budget { existing } => budget_sheet(&BudgetForm::from_existing(existing.as_ref()), &none),
        Sheet::Goal { existing } => goal_sheet(&GoalForm::from_existing(existing.as_ref()), &none),
        Sheet::Contribution { goal } => {
            contribution_sheet(&ContributionForm::for_goal(goal), Some(&goal.name), &none)
        }
        Sheet::Transaction => transaction_sheet(&TransactionForm::default(), &none),
        Sheet::FamilyBudget => family_budget_sheet(&FamilyBudgetForm::default(), members, &none),
    }
}

/// Drawer carrying only a message, e.g. when the entity to edit could not
/// be loaded or a dashboard action failed.
pub fn notice_sheet(title: &str, message: &str) -> String {
    drawer(None, title, "", "", &Feedback::Server(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ConsentStatus, Currency, SavingsGoal};

    #[test]
    fn field_errors_render_under_their_field() {
        let form = BudgetForm {
            category: "Dining".into(),
            amount: "-5".into(),
            ..BudgetForm::default()
        };
        let error = ValidationError::new("amount", "Enter an amount greater than 0");
        let html = budget_sheet(&form, &Feedback::Field(&error));
        assert!(html.contains(r#"data-error-for="amount""#));
        assert!(html.contains("Enter an amount greater than 0"));
        assert!(html.contains(r#"value="-5""#));
        assert!(html.contains(r#"hx-post="/ui/sheets/budget""#));
    }

    #[test]
    fn server_errors_render_as_banner() {
        let html = transaction_sheet(
            &TransactionForm::default(),
            &Feedback::Server("Budget limit exceeded for <Dining>"),
        );
        assert!(html.contains(r#"role="alert""#));
        assert!(html.contains("Budget limit exceeded for &lt;Dining&gt;"));
    }

    #[test]
    fn editing_seeds_values() {
        let goal = SavingsGoal {
            id: "g1".into(),
            name: "Car".into(),
            target_amount: 5000.0,
            current_amount: 1250.5,
            currency: Currency::default(),
            deadline: None,
            icon: None,
        };
        let html = open_sheet(&Sheet::Goal { existing: Some(goal) }, &[]);
        assert!(html.contains("Edit goal"));
        assert!(html.contains(r#"name="id" value="g1""#));
        assert!(html.contains(r#"value="1250.5""#));
    }

    #[test]
    fn notices_have_no_form() {
        let html = notice_sheet("Unavailable", "Savings goal not found");
        assert!(html.contains(r#"data-sheet="notice""#));
        assert!(html.contains("Savings goal not found"));
        assert!(!html.contains("hx-post"));
    }

    #[test]
    fn family_budget_lists_members() {
        let members = vec![FamilyMember {
            id: "m1".into(),
            name: "Sara".into(),
            relationship: None,
            consent_status: ConsentStatus::Approved,
        }];
        let html = open_sheet(&Sheet::FamilyBudget, &members);
        assert!(html.contains(r#"<option value="m1">Sara</option>"#));
        assert!(!html.contains("Nobody is sharing"));
    }
}
