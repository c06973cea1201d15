//! Recurring transactions: the WHEN lives in the repetition group, the
//! WHAT in the transaction group. Both flatten into arrays of pruned
//! objects on the way out.

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
    ListRecurrences,
    GetRecurrence,
    CreateRecurrence,
    UpdateRecurrence,
    DeleteRecurrence,
    TriggerRecurrence,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListRecurrences {
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecurrenceId {
    recurrence_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateRecurrence {
    r#type: String,
    title: String,
    first_date: String,
    #[serde(default, rename = "recurrenceSettings")]
    recurrence_settings: Map<String, Value>,
    #[serde(default)]
    repetitions: Repetitions,
    #[serde(default)]
    transactions: Transactions,
}

#[derive(Debug, Deserialize)]
struct UpdateRecurrence {
    #[serde(rename = "recurrenceId")]
    recurrence_id: String,
    #[serde(default, rename = "recurrenceSettings")]
    recurrence_settings: Map<String, Value>,
    #[serde(default)]
    repetitions: Repetitions,
    #[serde(default)]
    transactions: Transactions,
}

#[derive(Debug, Default, Deserialize)]
struct Repetitions {
    #[serde(default)]
    repetition: Vec<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct Transactions {
    #[serde(default)]
    transaction: Vec<RecurringSplit>,
}

/// One leg of the recurring transaction group. The identifying fields sit
/// at the top level of the group entry, everything optional nests under
/// the details collection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecurringSplit {
    id: Option<String>,
    description: Option<String>,
    amount: Option<String>,
    source_id: Option<String>,
    destination_id: Option<String>,
    #[serde(rename = "transactionDetails")]
    transaction_details: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerRecurrence {
    recurrence_id: String,
    date: String,
}

fn repetition_entries(groups: Vec<Map<String, Value>>) -> Vec<Value> {
    groups
        .into_iter()
        .map(|repetition| {
            let entry = repetition
                .into_iter()
                .filter(|(_, value)| shape::truthy(value))
                .collect();
            Value::Object(entry)
        })
        .collect()
}

fn transaction_entries(groups: Vec<RecurringSplit>) -> Vec<Value> {
    groups
        .into_iter()
        .map(|split| {
            let mut entry = Map::new();

            let fields = [
                ("id", split.id),
                ("description", split.description),
                ("amount", split.amount),
                ("source_id", split.source_id),
                ("destination_id", split.destination_id),
            ];
            for (key, value) in fields {
                if let Some(value) = value.filter(|v| !v.is_empty()) {
                    entry.insert(key.to_string(), Value::String(value));
                }
            }

            for (key, value) in split.transaction_details {
                if shape::truthy(&value) {
                    entry.insert(key, value);
                }
            }
            shape::split_tags_entry(&mut entry);

            Value::Object(entry)
        })
        .collect()
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListRecurrences => {
            let p: ListRecurrences = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/recurrences").with_query(query)))
        }
        Op::GetRecurrence => {
            let p: RecurrenceId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/recurrences/{}",
                p.recurrence_id
            ))))
        }
        Op::CreateRecurrence => {
            let p: CreateRecurrence = item.params()?;

            let mut body = Map::new();
            body.insert("type".to_string(), Value::String(p.r#type));
            body.insert("title".to_string(), Value::String(p.title));
            body.insert("first_date".to_string(), Value::String(p.first_date));
            body.extend(p.recurrence_settings);
            body.insert(
                "repetitions".to_string(),
                Value::Array(repetition_entries(p.repetitions.repetition)),
            );
            body.insert(
                "transactions".to_string(),
                Value::Array(transaction_entries(p.transactions.transaction)),
            );

            Ok(Plan::json(
                ApiRequest::post("/recurrences").with_body(Value::Object(body)),
            ))
        }
        Op::UpdateRecurrence => {
            let p: UpdateRecurrence = item.params()?;

            let mut body = Map::new();
            body.extend(p.recurrence_settings);
            if !p.repetitions.repetition.is_empty() {
                body.insert(
                    "repetitions".to_string(),
                    Value::Array(repetition_entries(p.repetitions.repetition)),
                );
            }
            if !p.transactions.transaction.is_empty() {
                body.insert(
                    "transactions".to_string(),
                    Value::Array(transaction_entries(p.transactions.transaction)),
                );
            }

            Ok(Plan::json(
                ApiRequest::put(format!("/recurrences/{}", p.recurrence_id))
                    .with_body(Value::Object(body)),
            ))
        }
        Op::DeleteRecurrence => {
            let p: RecurrenceId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/recurrences/{}",
                p.recurrence_id
            ))))
        }
        Op::TriggerRecurrence => {
            let p: TriggerRecurrence = item.params()?;

            let mut query = Query::new();
            query.push("date", p.date);

            Ok(Plan::json(
                ApiRequest::post(format!("/recurrences/{}/trigger", p.recurrence_id))
                    .with_query(query),
            ))
        }
    }
}
