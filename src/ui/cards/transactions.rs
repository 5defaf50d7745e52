use std::fmt::Write as _;

use crate::api::types::{TransactionKind, TransactionList};
use crate::chat::{ChatAction, no_data};
use crate::ui::cards::{CardContext, category_chip, money};
use crate::ui::components::{ButtonVariant, card, empty_state};
use crate::ui::fetch::resolve;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Recent transactions, newest first.
pub async fn transaction_list_card(ctx: &CardContext<'_>, props: Option<&TransactionList>) -> String {
    let loaded = resolve("transaction-list", props.cloned(), || async move {
        ctx.client
            .transactions()
            .list()
            .await
            .map(|transactions| TransactionList { transactions })
    })
    .await;
    let (list, fallback) = loaded.or_default_with(TransactionList::default);

    let body = if list.transactions.is_empty() {
        empty_state("No transactions yet.")
    } else {
        let mut transactions = list.transactions.clone();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        let mut body = r#"<ul class="divide-y divide-panelBorder text-sm">"#.to_string();
        for tx in &transactions {
            let category = tx.category.as_deref().unwrap_or("Other");
            let merchant = tx
                .merchant
                .as_deref()
                .filter(|m| *m != tx.description)
                .map(|m| format!(" · {}", escape(m)))
                .unwrap_or_default();
            let amount_class = match tx.kind {
                TransactionKind::Credit => "text-success",
                TransactionKind::Debit => "",
            };
            let sign = if tx.signed_amount() > 0.0 { "+" } else { "" };
            let _ = write!(
                body,
                r#"<li class="flex items-center gap-3 py-2">{}<div class="min-w-0 flex-1"><p class="truncate">{}</p><p class="text-xs text-textMuted">{} · {}{merchant}</p></div><span class="font-medium {amount_class}">{sign}{}</span></li>"#,
                category_chip(category),
                escape(&tx.description),
                tx.date.format("%-d %b"),
                escape(category),
                money(tx.signed_amount(), &tx.currency)
            );
        }
        body.push_str("</ul>");
        body
    };

    let footer = ctx.action_button(
        "Add transaction",
        ChatAction::AddTransaction,
        &no_data(),
        ButtonVariant::Secondary,
    );
    ctx.frame(
        "transaction-list",
        fallback.then_some(None),
        &card("Transactions", Icon::Receipt, "", &body, &footer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Currency, Transaction};
    use crate::api::{FinanceClient, MemoryTransport, Transport};
    use crate::query::QueryCache;
    use crate::ui::cards::Surface;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn tx(id: &str, day: u32, amount: f64, kind: TransactionKind) -> Transaction {
        Transaction {
            id: id.into(),
            description: format!("tx {id}"),
            amount,
            currency: Currency::default(),
            category: None,
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            merchant: None,
            kind,
        }
    }

    #[tokio::test]
    async fn newest_first_with_signed_amounts() {
        let client = FinanceClient::new(
            Arc::new(MemoryTransport::new()) as Arc<dyn Transport>,
            QueryCache::disabled(),
        );
        let currency = Currency::default();
        let ctx = CardContext {
            client: &client,
            currency: &currency,
            surface: Surface::Dashboard,
        };
        let list = TransactionList {
            transactions: vec![
                tx("old", 1, 12.0, TransactionKind::Debit),
                tx("new", 9, 900.0, TransactionKind::Credit),
            ],
        };
        let html = transaction_list_card(&ctx, Some(&list)).await;
        let new_at = html.find("tx new").unwrap();
        let old_at = html.find("tx old").unwrap();
        assert!(new_at < old_at);
        assert!(html.contains("+BHD 900.000"));
        assert!(html.contains("-BHD 12.000"));
    }
}
