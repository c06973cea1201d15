//! Bill CRUD and bill-scoped listings.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::{DateRange, Pagination};
use crate::resources::{operation, Error, Plan};
use crate::shape;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListBills,
    GetBill,
    CreateBill,
    UpdateBill,
    DeleteBill,
    GetAttachments,
    GetRules,
    GetTransactions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBills {
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillId {
    bill_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateBill {
    name: String,
    /// Collected as numbers for input validation, serialized as decimal
    /// strings because that is what the API accepts.
    amount_min: Number,
    amount_max: Number,
    date: String,
    repeat_freq: String,
    #[serde(default, rename = "billFields")]
    bill_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBill {
    bill_id: String,
    #[serde(default)]
    update_fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillScopedList {
    bill_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListBills => {
            let p: ListBills = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/bills").with_query(query)))
        }
        Op::GetBill => {
            let p: BillId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!("/bills/{}", p.bill_id))))
        }
        Op::CreateBill => {
            let p: CreateBill = item.params()?;

            let mut body = Map::new();
            body.insert("name".to_string(), Value::String(p.name));
            body.insert(
                "amount_min".to_string(),
                Value::String(p.amount_min.to_string()),
            );
            body.insert(
                "amount_max".to_string(),
                Value::String(p.amount_max.to_string()),
            );
            body.insert("date".to_string(), Value::String(p.date));
            body.insert("repeat_freq".to_string(), Value::String(p.repeat_freq));
            body.extend(p.bill_fields);

            Ok(Plan::json(
                ApiRequest::post("/bills").with_body(Value::Object(body)),
            ))
        }
        Op::UpdateBill => {
            let p: UpdateBill = item.params()?;

            let mut fields = p.update_fields;
            shape::amount_to_string(&mut fields, "amount_min");
            shape::amount_to_string(&mut fields, "amount_max");

            Ok(Plan::json(
                ApiRequest::put(format!("/bills/{}", p.bill_id))
                    .with_body(Value::Object(fields)),
            ))
        }
        Op::DeleteBill => {
            let p: BillId = item.params()?;
            Ok(Plan::json(ApiRequest::delete(format!(
                "/bills/{}",
                p.bill_id
            ))))
        }
        Op::GetAttachments => {
            let p: BillScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/bills/{}/attachments", p.bill_id)).with_query(query),
            ))
        }
        Op::GetRules => {
            let p: BillScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/bills/{}/rules", p.bill_id)).with_query(query),
            ))
        }
        Op::GetTransactions => {
            let p: BillScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/bills/{}/transactions", p.bill_id)).with_query(query),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_serializes_amounts_as_strings() {
        let plan = plan(&item(json!({
            "resource": "bills",
            "operation": "createBill",
            "name": "Rent",
            "amount_min": 10,
            "amount_max": 20,
            "date": "2025-01-01",
            "repeat_freq": "monthly",
        })))
        .unwrap();

        let body = plan.request.body.unwrap();
        assert_eq!(body["amount_min"], json!("10"));
        assert_eq!(body["amount_max"], json!("20"));
        assert_eq!(body["repeat_freq"], json!("monthly"));
    }

    #[test]
    fn update_coerces_numeric_amounts_and_keeps_the_rest() {
        let plan = plan(&item(json!({
            "resource": "bills",
            "operation": "updateBill",
            "billId": "3",
            "updateFields": {"amount_min": 12.5, "name": "Internet"},
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/bills/3");
        assert_eq!(
            plan.request.body,
            Some(json!({"amount_min": "12.5", "name": "Internet"}))
        );
    }
}
