//! Piggy bank CRUD. Create and update flatten the repeatable account
//! association group into an array of pruned objects.

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
    ListPiggyBanks,
    GetPiggyBank,
    CreatePiggyBank,
    UpdatePiggyBank,
    DeletePiggyBank,
    GetEvents,
    GetAttachments,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPiggyBanks {
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PiggyBankId {
    piggy_bank_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PiggyBankScopedList {
    piggy_bank_id: String,
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePiggyBank {
    name: String,
    target_amount: String,
    start_date: String,
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    additional_fields: ExtraFields,
    #[serde(default)]
    accounts_data: AccountsData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePiggyBank {
    piggy_bank_id: String,
    #[serde(default)]
    update_accounts_data: AccountsData,
    #[serde(default)]
    update_name: Option<String>,
    #[serde(default)]
    update_target_amount: Option<String>,
    #[serde(default)]
    update_start_date: Option<String>,
    #[serde(default)]
    update_currency_code: Option<String>,
    #[serde(default)]
    update_fields: ExtraFields,
}

#[derive(Debug, Default, Deserialize)]
struct AccountsData {
    #[serde(default)]
    account: Vec<Map<String, Value>>,
}

/// The "Additional Fields" collection. Currency can arrive as a code on
/// the main parameter or as an ID here; both are forwarded untouched even
/// though the API documents them as mutually exclusive.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ExtraFields {
    currency_id: Option<String>,
    target_date: Option<String>,
    order: Option<i64>,
    notes: Option<String>,
    object_group_id: Option<String>,
    object_group_title: Option<String>,
}

/// Flattens the repeatable account group, keeping only the keys with a
/// truthy value per entry.
fn account_entries(groups: Vec<Map<String, Value>>) -> Vec<Value> {
    groups
        .into_iter()
        .map(|account| {
            let mut entry = Map::new();
            for key in ["account_id", "name", "current_amount"] {
                if let Some(value) = account.get(key) {
                    if shape::truthy(value) {
                        entry.insert(key.to_string(), value.clone());
                    }
                }
            }
            Value::Object(entry)
        })
        .collect()
}

fn insert_opt(body: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        body.insert(key.to_string(), Value::String(value));
    }
}

fn insert_extras(body: &mut Map<String, Value>, extras: ExtraFields) {
    insert_opt(body, "transaction_currency_id", extras.currency_id);
    insert_opt(body, "target_date", extras.target_date);
    // Zero is a meaningful order, so presence decides here rather than
    // truthiness.
    if let Some(order) = extras.order {
        body.insert("order".to_string(), Value::from(order));
    }
    insert_opt(body, "notes", extras.notes);
    insert_opt(body, "object_group_id", extras.object_group_id);
    insert_opt(body, "object_group_title", extras.object_group_title);
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListPiggyBanks => {
            let p: ListPiggyBanks = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/piggy-banks").with_query(query)))
        }
        Op::GetPiggyBank => {
            let p: PiggyBankId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/piggy-banks/{}",
                p.piggy_bank_id
            ))))
        }
        Op::CreatePiggyBank => {
            let p: CreatePiggyBank = item.params()?;

            let mut body = Map::new();
            body.insert("name".to_string(), Value::String(p.name));
            body.insert(
                "accounts".to_string(),
                Value::Array(account_entries(p.accounts_data.account)),
            );
            body.insert("target_amount".to_string(), Value::String(p.target_amount));
            body.insert("start_date".to_string(), Value::String(p.start_date));
            insert_opt(&mut body, "transaction_currency_code", p.currency_code);
            insert_extras(&mut body, p.additional_fields);

            Ok(Plan::json(
                ApiRequest::post("/piggy-banks").with_body(Value::Object(body)),
            ))
        }
        Op::UpdatePiggyBank => {
            let p: UpdatePiggyBank = item.params()?;

            let mut body = Map::new();
            if !p.update_accounts_data.account.is_empty() {
                body.insert(
                    "accounts".to_string(),
                    Value::Array(account_entries(p.update_accounts_data.account)),
                );
            }
            insert_opt(&mut body, "name", p.update_name);
            insert_opt(&mut body, "target_amount", p.update_target_amount);
            insert_opt(&mut body, "start_date", p.update_start_date);
            insert_opt(&mut body, "transaction_currency_code", p.update_currency_code);
            insert_extras(&mut body, p.update_fields);

            Ok(Plan::json(
                ApiRequest::put(format!("/piggy-banks/{}", p.piggy_bank_id))
                    .with_body(Value::Object(body)),
            ))
        }
        Op::DeletePiggyBank => {
            let p: PiggyBankId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/piggy-banks/{}",
                p.piggy_bank_id
            ))))
        }
        Op::GetEvents => {
            let p: PiggyBankScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/piggy-banks/{}/events", p.piggy_bank_id))
                    .with_query(query),
            ))
        }
        Op::GetAttachments => {
            let p: PiggyBankScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/piggy-banks/{}/attachments", p.piggy_bank_id))
                    .with_query(query),
            ))
        }
    }
}
