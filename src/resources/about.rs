//! System and user information endpoints.

use serde::Deserialize;

use firefly_api::{ApiRequest, Query};

use crate::item::Item;
use crate::resources::{operation, Error, Plan};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    GetSystemInfo,
    GetUserInfo,
    RunCronJobs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunCronJobs {
    cli_token: String,
    #[serde(default)]
    additional_options: CronOptions,
}

#[derive(Debug, Default, Deserialize)]
struct CronOptions {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    force: Option<bool>,
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::GetSystemInfo => Ok(Plan::json(ApiRequest::get("/about"))),
        Op::GetUserInfo => Ok(Plan::json(ApiRequest::get("/about/user"))),
        Op::RunCronJobs => {
            let p: RunCronJobs = item.params()?;

            let mut query = Query::new();
            query.push_opt("date", p.additional_options.date);
            if p.additional_options.force == Some(true) {
                query.push("force", "true");
            }

            Ok(Plan::json(
                ApiRequest::get(format!("/cron/{}", p.cli_token)).with_query(query),
            ))
        }
    }
}
