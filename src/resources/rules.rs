//! Rule and rule-group endpoints. Test runs are GETs; triggers actually
//! apply the rules. A group trigger carries its filters in the body,
//! everything else keeps them in the query string.

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
    ListGroups,
    GetGroup,
    ListGroupRules,
    TestGroup,
    TriggerGroup,
    ListRules,
    GetRule,
    TestRule,
    TriggerRule,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAll {
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupId {
    rule_group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupScopedList {
    rule_group_id: String,
    #[serde(default)]
    pagination_options: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestGroup {
    rule_group_id: String,
    #[serde(default)]
    pagination_options: Pagination,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    test_limits: TestLimits,
    #[serde(default)]
    accounts: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TestLimits {
    #[serde(default)]
    search_limit: Option<u64>,
    #[serde(default)]
    triggered_limit: Option<u64>,
}

impl TestLimits {
    fn apply(&self, query: &mut Query) {
        if let Some(limit) = self.search_limit {
            query.push("search_limit", limit.to_string());
        }
        if let Some(limit) = self.triggered_limit {
            query.push("triggered_limit", limit.to_string());
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerGroup {
    rule_group_id: String,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    accounts: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleId {
    rule_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleRun {
    rule_id: String,
    #[serde(default)]
    date_range_filters: DateRange,
    #[serde(default)]
    accounts: Option<String>,
}

fn account_ids(accounts: Option<String>) -> Option<Vec<String>> {
    accounts
        .filter(|value| !value.is_empty())
        .map(|value| shape::comma_separated(&value))
}

pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    match operation::<Op>(item)? {
        Op::ListGroups => {
            let p: ListAll = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/rule-groups").with_query(query)))
        }
        Op::GetGroup => {
            let p: GroupId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!(
                "/rule-groups/{}",
                p.rule_group_id
            ))))
        }
        Op::ListGroupRules => {
            let p: GroupScopedList = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(
                ApiRequest::get(format!("/rule-groups/{}/rules", p.rule_group_id))
                    .with_query(query),
            ))
        }
        Op::TestGroup => {
            let p: TestGroup = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);
            p.date_range_filters.apply(&mut query);
            p.test_limits.apply(&mut query);
            if let Some(ids) = account_ids(p.accounts) {
                query.push_many("accounts", ids);
            }

            Ok(Plan::json(
                ApiRequest::get(format!("/rule-groups/{}/test", p.rule_group_id))
                    .with_query(query),
            ))
        }
        Op::TriggerGroup => {
            let p: TriggerGroup = item.params()?;

            let mut body = Map::new();
            p.date_range_filters.insert_into(&mut body);
            if let Some(ids) = account_ids(p.accounts) {
                body.insert(
                    "accounts".to_string(),
                    Value::Array(ids.into_iter().map(Value::String).collect()),
                );
            }

            Ok(Plan::json(
                ApiRequest::post(format!("/rule-groups/{}/trigger", p.rule_group_id))
                    .with_body(Value::Object(body)),
            ))
        }
        Op::ListRules => {
            let p: ListAll = item.params()?;

            let mut query = Query::new();
            p.pagination_options.apply(&mut query);

            Ok(Plan::json(ApiRequest::get("/rules").with_query(query)))
        }
        Op::GetRule => {
            let p: RuleId = item.params()?;
            Ok(Plan::json(ApiRequest::get(format!("/rules/{}", p.rule_id))))
        }
        Op::TestRule => {
            let p: RuleRun = item.params()?;

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);
            if let Some(ids) = account_ids(p.accounts) {
                query.push_many("accounts", ids);
            }

            Ok(Plan::json(
                ApiRequest::get(format!("/rules/{}/test", p.rule_id)).with_query(query),
            ))
        }
        Op::TriggerRule => {
            let p: RuleRun = item.params()?;

            let mut query = Query::new();
            p.date_range_filters.apply(&mut query);
            if let Some(ids) = account_ids(p.accounts) {
                query.push_many("accounts", ids);
            }

            Ok(Plan::json(
                ApiRequest::post(format!("/rules/{}/trigger", p.rule_id)).with_query(query),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use firefly_api::{Method, QueryValue};

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn group_trigger_moves_filters_into_the_body() {
        let plan = plan(&item(json!({
            "resource": "rulesAndGroups",
            "operation": "triggerGroup",
            "ruleGroupId": "2",
            "dateRangeFilters": {"start": "2025-01-01", "end": "2025-01-31"},
            "accounts": "1, 2",
        })))
        .unwrap();

        assert_eq!(plan.request.method, Method::POST);
        assert_eq!(plan.request.endpoint, "/rule-groups/2/trigger");
        assert!(plan.request.query.is_empty());
        assert_eq!(
            plan.request.body,
            Some(json!({
                "start": "2025-01-01",
                "end": "2025-01-31",
                "accounts": ["1", "2"],
            }))
        );
    }

    #[test]
    fn rule_trigger_keeps_filters_in_the_query() {
        let plan = plan(&item(json!({
            "resource": "rulesAndGroups",
            "operation": "triggerRule",
            "ruleId": "8",
            "accounts": "3",
        })))
        .unwrap();

        assert_eq!(plan.request.method, Method::POST);
        assert_eq!(plan.request.endpoint, "/rules/8/trigger");
        assert!(plan.request.body.is_none());

        let entries: Vec<_> = plan.request.query.entries().collect();
        assert_eq!(
            entries,
            vec![&(
                "accounts".to_string(),
                QueryValue::Many(vec!["3".to_string()])
            )]
        );
    }

    #[test]
    fn group_test_includes_limits_when_set() {
        let plan = plan(&item(json!({
            "resource": "rulesAndGroups",
            "operation": "testGroup",
            "ruleGroupId": "2",
            "testLimits": {"search_limit": 100, "triggered_limit": 10},
        })))
        .unwrap();

        assert_eq!(plan.request.endpoint, "/rule-groups/2/test");

        let entries: Vec<_> = plan.request.query.entries().collect();
        assert_eq!(
            entries,
            vec![
                &(
                    "search_limit".to_string(),
                    QueryValue::One("100".to_string())
                ),
                &(
                    "triggered_limit".to_string(),
                    QueryValue::One("10".to_string())
                ),
            ]
        );
    }
}
