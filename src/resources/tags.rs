//! Tag CRUD and tag-scoped transactions. Tags are addressed by either
//! their name or their numeric ID; the API accepts both.

use serde::Deserialize;
use serde_json::{Map, Value};

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::{DateRange, Pagination};
use crate::resources::{operation, Error, Plan};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListTags,
    CreateTag,
    GetTag,
    UpdateTag,
    DeleteTag,
    GetTransactionsByTag,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTags {
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagNameId {
    tag_name_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTag {
    name: String,
    #[serde(default)]
    extra_options: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTag {
    tag_name_id: String,
    name: String,
    #[serde(default)]
    extra_options: Map<String, Value>,
}

fn tag_body(name: String, extra_options: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("tag".to_string(), Value::String(name));
    body.extend(extra_options);
    Value::Object(body)
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListTags => {
            let p: ListTags = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/tags").with_query(query)))
        }
        Op::CreateTag => {
            let p: CreateTag = item.params()?;
            Ok(Plan::json(
                ApiRequest::post("/tags").with_body(tag_body(p.name, p.extra_options)),
            ))
        }
        Op::GetTag => {
            let p: TagNameId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/tags/{}",
                p.tag_name_id
            ))))
        }
        Op::UpdateTag => {
            let p: UpdateTag = item.params()?;
            Ok(Plan::json(
                ApiRequest::put(format!("/tags/{}", p.tag_name_id))
                    .with_body(tag_body(p.name, p.extra_options)),
            ))
        }
        Op::DeleteTag => {
            let p: TagNameId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/tags/{}",
                p.tag_name_id
            ))))
        }
        Op::GetTransactionsByTag => {
            let p: TagTransactions = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/tags/{}/transactions", p.tag_name_id))
                    .with_query(query),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagTransactions {
    tag_name_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn tag_name_lands_under_the_tag_key() {
        let plan = plan(&item(json!({
            "resource": "tags",
            "operation": "createTag",
            "name": "holiday",
            "extraOptions": {"description": "Trips"},
        })))
        .unwrap();

        assert_eq!(
            plan.request.body,
            Some(json!({"tag": "holiday", "description": "Trips"}))
        );
    }

    #[test]
    fn tag_transactions_are_scoped_by_name_or_id() {
        let plan = plan(&item(json!({
            "resource": "tags",
            "operation": "getTransactionsByTag",
            "tagNameId": "holiday",
            "dateRangeFilters": {"start": "2025-06-01", "end": "2025-06-30"},
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/tags/holiday/transactions");
    }
}
