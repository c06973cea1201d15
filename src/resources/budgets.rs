//! Budget CRUD, budget limits, and the budget-scoped transaction
//! listings.

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
    ListBudgets,
    GetBudget,
    CreateBudget,
    UpdateBudget,
    DeleteBudget,
    ListBudgetLimits,
    CreateBudgetLimit,
    GetBudgetLimit,
    UpdateBudgetLimit,
    DeleteBudgetLimit,
    GetTransactions,
    GetAttachments,
    GetLimitTransactions,
    ListAllBudgetLimits,
    GetTransactionsWithoutBudget,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBudgets {
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetId {
    budget_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetBudget {
    budget_id: String,
    #[serde(default)]
    date_range_filters: DateRange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBudget {
    name: String,
    #[serde(default)]
    budget_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBudget {
    budget_id: String,
    #[serde(default)]
    update_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBudgetLimit {
    budget_id: String,
    amount: String,
    start: String,
    end: String,
    #[serde(default)]
    budget_limit_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetLimitId {
    budget_id: String,
    budget_limit_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBudgetLimit {
    budget_id: String,
    budget_limit_id: String,
    #[serde(default)]
    update_limit_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetTransactions {
    budget_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    transaction_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimitTransactions {
    budget_id: String,
    budget_limit_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    transaction_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAllBudgetLimits {
    #[serde(default)]
    date_range_filters: DateRange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnbudgetedTransactions {
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    transaction_type: Option<String>,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListBudgets => {
            let p: ListBudgets = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/budgets").with_query(query)))
        }
        Op::GetBudget => {
            let p: GetBudget = item.params()?;

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/budgets/{}", p.budget_id)).with_query(query),
            ))
        }
        Op::CreateBudget => {
            let p: CreateBudget = item.params()?;

            let mut body = Map::new();
            body.insert("name".to_string(), Value::String(p.name));
            body.extend(p.budget_fields);

            Ok(Plan::json(
                ApiRequest::post("/budgets").with_body(Value::Object(body)),
            ))
        }
        Op::UpdateBudget => {
            let p: UpdateBudget = item.params()?;

            Ok(Plan::json(
                ApiRequest::put(format!("/budgets/{}", p.budget_id))
                    .with_body(Value::Object(p.update_fields)),
            ))
        }
        Op::DeleteBudget => {
            let p: BudgetId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/budgets/{}",
                p.budget_id
            ))))
        }
        Op::ListBudgetLimits => {
            let p: GetBudget = item.params()?;

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/budgets/{}/limits", p.budget_id)).with_query(query),
            ))
        }
        Op::CreateBudgetLimit => {
            let p: CreateBudgetLimit = item.params()?;

            let mut body = Map::new();
            body.insert("amount".to_string(), Value::String(p.amount));
            body.insert("start".to_string(), Value::String(p.start));
            body.insert("end".to_string(), Value::String(p.end));
            body.insert("budget_id".to_string(), Value::String(p.budget_id.clone()));
            body.extend(p.budget_limit_fields);

            Ok(Plan::json(
                ApiRequest::post(format!("/budgets/{}/limits", p.budget_id))
                    .with_body(Value::Object(body)),
            ))
        }
        Op::GetBudgetLimit => {
            let p: BudgetLimitId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/budgets/{}/limits/{}",
                p.budget_id, p.budget_limit_id
            ))))
        }
        Op::UpdateBudgetLimit => {
            let p: UpdateBudgetLimit = item.params()?;

            Ok(Plan::json(
                ApiRequest::put(format!(
                    "/budgets/{}/limits/{}",
                    p.budget_id, p.budget_limit_id
                ))
                .with_body(Value::Object(p.update_limit_fields)),
            ))
        }
        Op::DeleteBudgetLimit => {
            let p: BudgetLimitId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/budgets/{}/limits/{}",
                p.budget_id, p.budget_limit_id
            ))))
        }
        Op::GetTransactions => {
            let p: BudgetTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);
            query.push_opt("type", shape::transaction_type_filter(p.transaction_type));

            Ok(Plan::json(
                ApiRequest::get(format!("/budgets/{}/transactions", p.budget_id))
                    .with_query(query),
            ))
        }
        Op::GetAttachments => {
            let p: BudgetTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/budgets/{}/attachments", p.budget_id))
                    .with_query(query),
            ))
        }
        Op::GetLimitTransactions => {
            let p: LimitTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);
            query.push_opt("type", shape::transaction_type_filter(p.transaction_type));

            Ok(Plan::json(
                ApiRequest::get(format!(
                    "/budgets/{}/limits/{}/transactions",
                    p.budget_id, p.budget_limit_id
                ))
                .with_query(query),
            ))
        }
        Op::ListAllBudgetLimits => {
            let p: ListAllBudgetLimits = item.params()?;

            if !p.date_range_filters.is_complete() {
                return Err(Error::Precondition(
                    "start and end dates are required for the listAllBudgetLimits operation"
                        .to_string(),
                ));
            }

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get("/budget-limits").with_query(query),
            ))
        }
        Op::GetTransactionsWithoutBudget => {
            let p: UnbudgetedTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);
            query.push_opt("type", shape::transaction_type_filter(p.transaction_type));

            Ok(Plan::json(
                ApiRequest::get("/budgets/transactions-without-budget").with_query(query),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use firefly_api::QueryValue;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn list_all_limits_requires_a_complete_date_range() {
        let err = plan(&item(json!({
            "resource": "budgets",
            "operation": "listAllBudgetLimits",
        })))
        .unwrap_err();

        assert_eq!(
            err,
            Error::Precondition(
                "start and end dates are required for the listAllBudgetLimits operation"
                    .to_string()
            )
        );

        let err = plan(&item(json!({
            "resource": "budgets",
            "operation": "listAllBudgetLimits",
            "dateRangeFilters": {"start": "2025-01-01"},
        })))
        .unwrap_err();

        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn list_all_limits_sends_both_dates() {
        let plan = plan(&item(json!({
            "resource": "budgets",
            "operation": "listAllBudgetLimits",
            "dateRangeFilters": {"start": "2025-01-01", "end": "2025-01-31"},
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/budget-limits");

        let entries: Vec<_> = plan.request.query.entries().collect();
        assert_eq!(
            entries,
            vec![
                &("start".to_string(), QueryValue::One("2025-01-01".to_string())),
                &("end".to_string(), QueryValue::One("2025-01-31".to_string())),
            ]
        );
    }

    #[test]
    fn budget_transactions_omit_the_all_sentinel() {
        let plan = plan(&item(json!({
            "resource": "budgets",
            "operation": "getTransactions",
            "budgetId": "5",
            "transactionType": "all",
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/budgets/5/transactions");
        assert!(!plan.request.query.entries().any(|(key, _)| key == "type"));
    }

    #[test]
    fn budget_transactions_keep_a_concrete_type() {
        let plan = plan(&item(json!({
            "resource": "budgets",
            "operation": "getTransactions",
            "budgetId": "5",
            "transactionType": "withdrawal",
        })))
        .unwrap();

        let entries: Vec<_> = plan.request.query.entries().collect();
        assert_eq!(
            entries,
            vec![&(
                "type".to_string(),
                QueryValue::One("withdrawal".to_string())
            )]
        );
    }

    #[test]
    fn create_limit_carries_the_budget_id_in_the_body() {
        let plan = plan(&item(json!({
            "resource": "budgets",
            "operation": "createBudgetLimit",
            "budgetId": "5",
            "amount": "100",
            "start": "2025-01-01",
            "end": "2025-01-31",
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/budgets/5/limits");
        assert_eq!(
            plan.request.body,
            Some(json!({
                "amount": "100",
                "start": "2025-01-01",
                "end": "2025-01-31",
                "budget_id": "5",
            }))
        );
    }
}
