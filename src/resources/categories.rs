//! Category CRUD and category-scoped transactions.

use serde::Deserialize;
use serde_json::{Map, Value};

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::{DateRange, Pagination};
use crate::resources::{operation, Error, Plan};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListCategories,
    CreateCategory,
    GetCategory,
    UpdateCategory,
    DeleteCategory,
    GetTransactionsByCategory,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCategories {
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryId {
    category_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryBody {
    name: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCategory {
    category_id: String,
    name: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryTransactions {
    category_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
}

fn category_body(name: String, notes: Option<String>) -> Value {
    let mut body = Map::new();
    body.insert("name".to_string(), Value::String(name));
    body.insert(
        "notes".to_string(),
        Value::String(notes.unwrap_or_default()),
    );
    Value::Object(body)
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListCategories => {
            let p: ListCategories = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/categories").with_query(query)))
        }
        Op::CreateCategory => {
            let p: CategoryBody = item.params()?;
            Ok(Plan::json(
                ApiRequest::post("/categories").with_body(category_body(p.name, p.notes)),
            ))
        }
        Op::GetCategory => {
            let p: CategoryId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/categories/{}",
                p.category_id
            ))))
        }
        Op::UpdateCategory => {
            let p: UpdateCategory = item.params()?;
            Ok(Plan::json(
                ApiRequest::put(format!("/categories/{}", p.category_id))
                    .with_body(category_body(p.name, p.notes)),
            ))
        }
        Op::DeleteCategory => {
            let p: CategoryId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/categories/{}",
                p.category_id
            ))))
        }
        Op::GetTransactionsByCategory => {
            let p: CategoryTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/categories/{}/transactions", p.category_id))
                    .with_query(query),
            ))
        }
    }
}
