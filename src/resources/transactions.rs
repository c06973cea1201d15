//! Transaction endpoints, including the split-group create/update
//! shaping: one request carries shared settings plus an ordered array of
//! per-split field maps.

use serde::Deserialize;
use serde_json::{Map, Value};

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::Pagination;
use crate::resources::{operation, Error, Plan};
use crate::shape;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListTransactions,
    GetTransaction,
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    GetAttachments,
    GetPiggyBankEvents,
    ListTransactionLinks,
    GetTransactionJournal,
    DeleteTransactionSplit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTransactions {
    #[serde(default)]
    filters: Filters,
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Filters {
    #[serde(default)]
    r#type: Option<String>,
    #[serde(default)]
    custom_type: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionId {
    transaction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionScopedList {
    transaction_id: String,
    #[serde(default)]
    pagination_options: Pagination,
}

/// Shared settings plus the repeatable split group, exactly as the item
/// carries them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TransactionWrite {
    transaction_settings: Map<String, Value>,
    transactions_data: TransactionsData,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionsData {
    #[serde(default)]
    transaction: Vec<SplitEnvelope>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SplitEnvelope {
    transaction_fields: Map<String, Value>,
}

fn transaction_body(p: TransactionWrite) -> Value {
    let splits: Vec<Value> = p
        .transactions_data
        .transaction
        .into_iter()
        .map(|envelope| {
            let mut fields = envelope.transaction_fields;
            shape::split_tags_entry(&mut fields);
            Value::Object(fields)
        })
        .collect();

    let mut body = p.transaction_settings;
    body.insert("transactions".to_string(), Value::Array(splits));
    Value::Object(body)
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListTransactions => {
            let p: ListTransactions = item.params()?;

            let mut query = Query::new();
            let Filters {
                r#type,
                custom_type,
                start,
                end,
            } = p.filters;
            query.push_opt("type", r#type.filter(|t| !t.is_empty()).or(custom_type));
            query.push_opt("start", start);
            query.push_opt("end", end);
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/transactions").with_query(query)))
        }
        Op::GetTransaction => {
            let p: TransactionId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/transactions/{}",
                p.transaction_id
            ))))
        }
        Op::CreateTransaction => {
            let p: TransactionWrite = item.params()?;
            Ok(Plan::json(
                ApiRequest::post("/transactions").with_body(transaction_body(p)),
            ))
        }
        Op::UpdateTransaction => {
            let id: TransactionId = item.params()?;
            let p: TransactionWrite = item.params()?;
            Ok(Plan::json(
                ApiRequest::put(format!("/transactions/{}", id.transaction_id))
                    .with_body(transaction_body(p)),
            ))
        }
        Op::DeleteTransaction => {
            let p: TransactionId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/transactions/{}",
                p.transaction_id
            ))))
        }
        Op::GetAttachments => {
            let p: TransactionScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/transactions/{}/attachments", p.transaction_id))
                    .with_query(query),
            ))
        }
        Op::GetPiggyBankEvents => {
            let p: TransactionScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!(
                    "/transactions/{}/piggy-bank-events",
                    p.transaction_id
                ))
                .with_query(query),
            ))
        }
        Op::ListTransactionLinks => {
            // The item addresses the journal through the shared
            // transaction ID parameter.
            let p: TransactionScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!(
                    "/transaction-journals/{}/links",
                    p.transaction_id
                ))
                .with_query(query),
            ))
        }
        Op::GetTransactionJournal => {
            let p: TransactionId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/transaction-journals/{}",
                p.transaction_id
            ))))
        }
        Op::DeleteTransactionSplit => {
            let p: TransactionId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/transaction-journals/{}",
                p.transaction_id
            ))))
        }
    }
}
