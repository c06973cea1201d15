//! Account CRUD and account-scoped listings.

use serde::Deserialize;
use serde_json::{Map, Value};

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::{DateRange, Pagination};
use crate::resources::{operation, Error, Plan};
use crate::shape;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListAccounts,
    GetAccount,
    CreateAccount,
    UpdateAccount,
    DeleteAccount,
    GetTransactions,
    GetAttachments,
    GetPiggyBanks,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAccounts {
    #[serde(default)]
    account_type: Option<String>,
    #[serde(default)]
    account_balance_date: Option<String>,
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountId {
    account_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccount {
    name: String,
    r#type: String,
    #[serde(default)]
    account_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccount {
    account_id: String,
    #[serde(default)]
    account_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTransactions {
    account_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    transactions_type: Option<String>,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListAccounts => {
            let p: ListAccounts = item.params()?;

            let mut query = Query::new();
            query.push_opt("type", p.account_type);
            query.push_opt("date", p.account_balance_date);
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/accounts").with_query(query)))
        }
        Op::GetAccount => {
            let p: AccountId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/accounts/{}",
                p.account_id
            ))))
        }
        Op::CreateAccount => {
            let p: CreateAccount = item.params()?;

            let mut body = Map::new();
            body.insert("name".to_string(), Value::String(p.name));
            body.insert("type".to_string(), Value::String(p.r#type));
            body.extend(p.account_fields);

            Ok(Plan::json(
                ApiRequest::post("/accounts").with_body(Value::Object(body)),
            ))
        }
        Op::UpdateAccount => {
            let p: UpdateAccount = item.params()?;

            Ok(Plan::json(
                ApiRequest::put(format!("/accounts/{}", p.account_id))
                    .with_body(Value::Object(p.account_fields)),
            ))
        }
        Op::DeleteAccount => {
            let p: AccountId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/accounts/{}",
                p.account_id
            ))))
        }
        Op::GetTransactions => {
            let p: GetTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);
            query.push_opt("type", shape::transaction_type_filter(p.transactions_type));

            Ok(Plan::json(
                ApiRequest::get(format!("/accounts/{}/transactions", p.account_id))
                    .with_query(query),
            ))
        }
        Op::GetAttachments => {
            let p: AccountId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/accounts/{}/attachments",
                p.account_id
            ))))
        }
        Op::GetPiggyBanks => {
            let p: AccountId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/accounts/{}/piggy-banks",
                p.account_id
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use firefly_api::Method;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_merges_additional_fields_into_the_body() {
        let plan = plan(&item(json!({
            "resource": "accounts",
            "operation": "createAccount",
            "name": "Checking",
            "type": "asset",
            "accountFields": {"account_role": "defaultAsset", "currency_code": "USD"},
        })))
        .unwrap();

        assert_eq!(plan.request.method, Method::POST);
        assert_eq!(
            plan.request.body,
            Some(json!({
                "name": "Checking",
                "type": "asset",
                "account_role": "defaultAsset",
                "currency_code": "USD",
            }))
        );
    }

    #[test]
    fn update_sends_only_the_supplied_fields() {
        let plan = plan(&item(json!({
            "resource": "accounts",
            "operation": "updateAccount",
            "accountId": "42",
            "accountFields": {"name": "Renamed"},
        })))
        .unwrap();

        assert_eq!(plan.request.method, Method::PUT);
        assert_eq!(plan.request.endpoint, "/accounts/42");
        assert_eq!(plan.request.body, Some(json!({"name": "Renamed"})));
    }

    #[test]
    fn missing_account_id_is_a_parameter_error() {
        let err = plan(&item(json!({
            "resource": "accounts",
            "operation": "getAccount",
        })))
        .unwrap_err();

        assert!(matches!(err, Error::InvalidParameters(_)));
    }

    #[test]
    fn account_transactions_suppress_the_all_sentinel() {
        let plan = plan(&item(json!({
            "resource": "accounts",
            "operation": "getTransactions",
            "accountId": "7",
            "transactionsType": "all",
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/accounts/7/transactions");
        assert!(plan.request.query.is_empty());
    }
}
