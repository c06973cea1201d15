//! Object groups bundle bills and piggy banks. Groups are created by the
//! server when an object names one, so only read, update, and delete are
//! exposed.

use serde::Deserialize;
use serde_json::{Map, Value};

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::Pagination;
use crate::resources::{operation, Error, Plan};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListObjectGroups,
    GetObjectGroup,
    UpdateObjectGroup,
    DeleteObjectGroup,
    GetBills,
    GetPiggyBanks,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectGroups {
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectGroupId {
    object_group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateObjectGroup {
    object_group_id: String,
    title: String,
    #[serde(default)]
    update_fields: UpdateFields,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateFields {
    #[serde(default)]
    order: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectGroupScopedList {
    object_group_id: String,
    #[serde(default)]
    pagination_options: Pagination,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListObjectGroups => {
            let p: ListObjectGroups = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get("/object-groups").with_query(query),
            ))
        }
        Op::GetObjectGroup => {
            let p: ObjectGroupId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/object-groups/{}",
                p.object_group_id
            ))))
        }
        Op::UpdateObjectGroup => {
            let p: UpdateObjectGroup = item.params()?;

            let mut body = Map::new();
            body.insert("title".to_string(), Value::String(p.title));
            if let Some(order) = p.update_fields.order {
                body.insert("order".to_string(), Value::from(order));
            }

            Ok(Plan::json(
                ApiRequest::put(format!("/object-groups/{}", p.object_group_id))
                    .with_body(Value::Object(body)),
            ))
        }
        Op::DeleteObjectGroup => {
            let p: ObjectGroupId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/object-groups/{}",
                p.object_group_id
            ))))
        }
        Op::GetBills => {
            let p: ObjectGroupScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/object-groups/{}/bills", p.object_group_id))
                    .with_query(query),
            ))
        }
        Op::GetPiggyBanks => {
            let p: ObjectGroupScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!(
                    "/object-groups/{}/piggy-banks",
                    p.object_group_id
                ))
                .with_query(query),
            ))
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
    fn update_includes_the_order_only_when_given() {
        let titled = plan(&item(json!({
            "resource": "objectGroups",
            "operation": "updateObjectGroup",
            "objectGroupId": "4",
            "title": "Household",
        })))
        .unwrap();

        assert_eq!(titled.request.method, Method::PUT);
        assert_eq!(titled.request.body, Some(json!({"title": "Household"})));

        let ordered = plan(&item(json!({
            "resource": "objectGroups",
            "operation": "updateObjectGroup",
            "objectGroupId": "4",
            "title": "Household",
            "updateFields": {"order": 2},
        })))
        .unwrap();

        assert_eq!(
            ordered.request.body,
            Some(json!({"title": "Household", "order": 2}))
        );
    }
}
