//! Available budgets are computed by the server and read-only.

use serde::Deserialize;

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::{DateRange, Pagination};
use crate::resources::{operation, Error, Plan};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    ListAvailableBudgets,
    GetAvailableBudget,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAvailableBudgets {
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailableBudgetId {
    available_budget_id: String,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListAvailableBudgets => {
            let p: ListAvailableBudgets = item.params()?;

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get("/available-budgets").with_query(query),
            ))
        }
        Op::GetAvailableBudget => {
            let p: AvailableBudgetId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/available-budgets/{}",
                p.available_budget_id
            ))))
        }
    }
}
