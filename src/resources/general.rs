//! Search, insights, and data-export endpoints.

use serde::Deserialize;

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::params::{DateRange, Pagination};
use crate::resources::{operation, Error, Plan};
use crate::shape;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    SearchAll,
    GetInsights,
    ExportData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchAll {
    search_for: String,
    query_string: String,
    #[serde(default)]
    r#type: Option<String>,
    #[serde(default)]
    search_field: Option<String>,
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetInsights {
    insight: String,
    #[serde(default)]
    group_by: Option<String>,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    accounts: Option<String>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    bills: Option<String>,
    #[serde(default)]
    budgets: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportData {
    export_type: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    /// Passed through to the API as a raw comma-separated string.
    #[serde(default)]
    accounts: Option<String>,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::SearchAll => {
            let p: SearchAll = item.params()?;

            let mut query = Query::new();
            query.push_opt("type", p.r#type);
            query.push_opt("field", p.search_field);
            query.push("query", p.query_string);
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/search/{}", p.search_for)).with_query(query),
            ))
        }
        Op::GetInsights => {
            let p: GetInsights = item.params()?;

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);
            for (key, values) in shape::parse_comma_separated_fields(&[
                ("accounts", &p.accounts),
                ("categories", &p.categories),
                ("tags", &p.tags),
                ("bills", &p.bills),
                ("budgets", &p.budgets),
            ]) {
                query.push_many(&key, values);
            }

            let endpoint = format!(
                "/insight/{}/{}",
                p.insight,
                p.group_by.unwrap_or_default()
            );

            Ok(Plan::json(ApiRequest::get(endpoint).with_query(query)))
        }
        Op::ExportData => {
            let p: ExportData = item.params()?;

            let mut query = Query::new();
            query.push_opt("type", p.format);
            query.push_opt("start", p.start);
            query.push_opt("end", p.end);
            query.push_opt("accounts", p.accounts);

            Ok(Plan::download(
                ApiRequest::get(format!("/data/export/{}", p.export_type)).with_query(query),
                "export.csv",
            ))
        }
    }
}
