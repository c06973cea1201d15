use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use firefly_api::{Firefly, HttpClient};

use crate::item::{Attachment, Item, OutputRecord};
use crate::resources::{self, ResponseKind};

lazy_static! {
    static ref FILENAME: Regex = Regex::new("filename=(.+)").unwrap();
}

/// Maps operation items onto API calls, strictly one at a time and in
/// input order.
pub(crate) struct Connector<'a, T> {
    client: &'a Firefly<T>,
}

impl<'a, T: HttpClient> Connector<'a, T> {
    pub(crate) fn new(client: &'a Firefly<T>) -> Self {
        Self { client }
    }

    /// Produces exactly one output record per item. The first failing
    /// item aborts the remainder of the batch.
    pub(crate) async fn run(&self, items: &[Item]) -> Result<Vec<OutputRecord>> {
        let mut records = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let record = self
                .process(item)
                .await
                .with_context(|| format!("item {} failed", index))?;
            records.push(record);
        }

        Ok(records)
    }

    async fn process(&self, item: &Item) -> Result<OutputRecord> {
        let plan = resources::plan(item)?;
        debug!("dispatching {} {}", plan.request.method, plan.request.endpoint);

        match plan.response {
            ResponseKind::Json => {
                let response = self.client.call(&plan.request).await?;
                Ok(OutputRecord::json(response))
            }
            ResponseKind::Download { fallback_name } => {
                let res = self.client.download(&plan.request).await?;
                let name = attachment_name(res.header("content-disposition"), fallback_name);
                info!("downloaded {} ({} bytes)", name, res.body.len());
                Ok(OutputRecord::attachment(Attachment::new(name, res)))
            }
        }
    }
}

/// Pulls the attachment name out of a Content-Disposition header, falling
/// back to a default when the header is missing or malformed.
fn attachment_name(header: Option<&str>, fallback: &str) -> String {
    header
        .and_then(|value| FILENAME.captures(value))
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use serde_json::json;

    use firefly_api::{async_trait, Builder, Error, HttpRequest, RawResponse};

    struct FakeClient {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<Vec<RawResponse>>,
    }

    impl FakeClient {
        fn with_responses(responses: Vec<RawResponse>) -> Self {
            Self {
                requests: Mutex::new(vec![]),
                responses: Mutex::new(responses),
            }
        }

        fn json(body: &str) -> RawResponse {
            RawResponse {
                status: 200,
                headers: vec![],
                body: body.as_bytes().to_vec(),
            }
        }
    }

    #[async_trait]
    impl HttpClient for &FakeClient {
        async fn execute(&self, req: HttpRequest) -> Result<RawResponse, Error> {
            self.requests.lock().unwrap().push(req);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(Error::Api {
                    status: 500,
                    message: "fake client ran out of responses".to_string(),
                });
            }
            Ok(responses.remove(0))
        }
    }

    fn firefly(fake: &FakeClient) -> Firefly<&FakeClient> {
        Builder::new()
            .with_base_url("https://firefly.example.com")
            .with_token("secret")
            .build_with_client(fake)
            .unwrap()
    }

    fn items(value: serde_json::Value) -> Vec<Item> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn attachment_name_from_header() {
        let tests = vec![
            (
                Some("attachment; filename=report.csv"),
                "report.csv".to_string(),
            ),
            (None, "export.csv".to_string()),
            (Some("attachment"), "export.csv".to_string()),
        ];

        for (header, expected) in tests {
            assert_eq!(attachment_name(header, "export.csv"), expected);
        }
    }

    #[tokio::test]
    async fn produces_one_record_per_item_in_order() {
        let fake = FakeClient::with_responses(vec![
            FakeClient::json(r#"{"data": {"id": "1"}}"#),
            FakeClient::json(r#"{"data": {"id": "2"}}"#),
        ]);
        let client = firefly(&fake);

        let records = Connector::new(&client)
            .run(&items(json!([
                {"resource": "accounts", "operation": "getAccount", "accountId": "1"},
                {"resource": "accounts", "operation": "getAccount", "accountId": "2"},
            ])))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].json["data"]["id"], "1");
        assert_eq!(records[1].json["data"]["id"], "2");

        let sent = fake.requests.lock().unwrap();
        assert!(sent[0].url.path().ends_with("/accounts/1"));
        assert!(sent[1].url.path().ends_with("/accounts/2"));
    }

    #[tokio::test]
    async fn a_failing_item_aborts_the_remainder() {
        let fake = FakeClient::with_responses(vec![FakeClient::json("{}")]);
        let client = firefly(&fake);

        let err = Connector::new(&client)
            .run(&items(json!([
                {"resource": "accounts", "operation": "getAccount", "accountId": "1"},
                {"resource": "budgets", "operation": "listAllBudgetLimits"},
                {"resource": "accounts", "operation": "getAccount", "accountId": "3"},
            ])))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("item 1 failed"));
        // The third item was never dispatched.
        assert_eq!(fake.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn precondition_failures_never_reach_the_network() {
        let fake = FakeClient::with_responses(vec![]);
        let client = firefly(&fake);

        Connector::new(&client)
            .run(&items(json!([
                {"resource": "budgets", "operation": "listAllBudgetLimits"},
            ])))
            .await
            .unwrap_err();

        assert!(fake.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_items_produce_binary_records() {
        let fake = FakeClient::with_responses(vec![RawResponse {
            status: 200,
            headers: vec![
                (
                    "content-disposition".to_string(),
                    "attachment; filename=report.csv".to_string(),
                ),
                ("content-type".to_string(), "text/csv".to_string()),
            ],
            body: b"date,amount\n".to_vec(),
        }]);
        let client = firefly(&fake);

        let records = Connector::new(&client)
            .run(&items(json!([
                {"resource": "general", "operation": "exportData", "exportType": "transactions"},
            ])))
            .await
            .unwrap();

        assert_eq!(records[0].json, json!({}));
        let binary = records[0].binary.as_ref().unwrap();
        assert_eq!(binary.data.file_name, "report.csv");
        assert_eq!(binary.data.mime_type.as_deref(), Some("text/csv"));
        assert_eq!(binary.data.data, b"date,amount\n");
    }

    #[tokio::test]
    async fn export_without_disposition_falls_back_to_the_default_name() {
        let fake = FakeClient::with_responses(vec![RawResponse {
            status: 200,
            headers: vec![],
            body: b"1,2".to_vec(),
        }]);
        let client = firefly(&fake);

        let records = Connector::new(&client)
            .run(&items(json!([
                {"resource": "general", "operation": "exportData", "exportType": "bills"},
            ])))
            .await
            .unwrap();

        assert_eq!(
            records[0].binary.as_ref().unwrap().data.file_name,
            "export.csv"
        );
    }

    #[tokio::test]
    async fn remote_errors_carry_status_and_message() {
        let fake = FakeClient::with_responses(vec![RawResponse {
            status: 404,
            headers: vec![],
            body: br#"{"message": "Resource not found"}"#.to_vec(),
        }]);
        let client = firefly(&fake);

        let err = Connector::new(&client)
            .run(&items(json!([
                {"resource": "bills", "operation": "getBill", "billId": "99"},
            ])))
            .await
            .unwrap_err();

        let cause = format!("{:#}", err);
        assert!(cause.contains("404"));
        assert!(cause.contains("Resource not found"));
    }
}
