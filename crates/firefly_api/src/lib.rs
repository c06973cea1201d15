use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub use async_trait::async_trait;
pub use reqwest::Method;

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Error)]
pub enum Error {
    #[error("firefly api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport failure")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body")]
    Json(#[from] serde_json::Error),
    #[error("invalid base url")]
    BaseUrl(#[from] url::ParseError),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.to_string() == other.to_string()
    }
}

/// A query value is either a single scalar or a repeated array entry.
/// Array entries are serialized with a `[]` suffix on the key, the form
/// the Firefly III filter endpoints expect.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

/// Outgoing query string under construction. Entries are only ever added
/// when a value is actually present; there is no way to insert a null or
/// an empty placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(Vec<(String, QueryValue)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.0.push((key.to_string(), QueryValue::One(value.into())));
    }

    /// Adds the entry only when a non-empty value is supplied.
    pub fn push_opt(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) if !v.is_empty() => self.push(key, v),
            _ => {}
        }
    }

    /// Adds a repeated `key[]` entry unless the list is empty.
    pub fn push_many(&mut self, key: &str, values: Vec<String>) {
        if !values.is_empty() {
            self.0.push((key.to_string(), QueryValue::Many(values)));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &(String, QueryValue)> {
        self.0.iter()
    }
}

/// A fully-shaped request against the Firefly III API: verb, endpoint path
/// with IDs already interpolated, query entries, and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Query,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Query::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A prepared request as handed to the transport: absolute URL, headers
/// already carrying credentials and the optional trace ID.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An undecoded response. Kept raw so export endpoints can hand the body
/// bytes through as an attachment.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn into_api_error(self) -> Error {
        let message = serde_json::from_slice::<ApiErrorBody>(&self.body)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&self.body).into_owned());

        Error::Api {
            status: self.status,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: HttpRequest) -> Result<RawResponse, Error>;
}

/// Default transport backed by reqwest.
pub struct Transport {
    inner: reqwest::Client,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for Transport {
    async fn execute(&self, req: HttpRequest) -> Result<RawResponse, Error> {
        let mut builder = self.inner.request(req.method, req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let res = builder.send().await?;
        let status = res.status().as_u16();
        let headers = res
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = res.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[derive(Debug, Default)]
pub struct Builder {
    base_url: String,
    token: String,
    trace_id: Option<String>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = token.to_string();
        self
    }

    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id.filter(|id| !id.is_empty());
        self
    }

    pub fn build(self) -> Result<Firefly<Transport>, Error> {
        self.build_with_client(Transport::new())
    }

    pub fn build_with_client<T: HttpClient>(self, http: T) -> Result<Firefly<T>, Error> {
        // Validate the base URL once, up front.
        Url::parse(&self.base_url)?;

        Ok(Firefly {
            http,
            base_url: self.base_url,
            token: self.token,
            trace_id: self.trace_id,
        })
    }
}

/// Authenticated Firefly III client, generic over the transport so tests
/// can swap in a recording fake.
pub struct Firefly<T> {
    http: T,
    base_url: String,
    token: String,
    trace_id: Option<String>,
}

impl<T: HttpClient> Firefly<T> {
    /// Executes the request and parses the response as JSON. Empty bodies
    /// (204 deletes) come back as an empty object.
    pub async fn call(&self, req: &ApiRequest) -> Result<Value, Error> {
        let res = self.http.execute(self.prepare(req)?).await?;
        if !success(res.status) {
            return Err(res.into_api_error());
        }

        if res.body.is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        Ok(serde_json::from_slice(&res.body)?)
    }

    /// Executes the request and returns the full response undecoded,
    /// headers included, for export endpoints.
    pub async fn download(&self, req: &ApiRequest) -> Result<RawResponse, Error> {
        let res = self.http.execute(self.prepare(req)?).await?;
        if !success(res.status) {
            return Err(res.into_api_error());
        }

        Ok(res)
    }

    fn prepare(&self, req: &ApiRequest) -> Result<HttpRequest, Error> {
        let mut url = Url::parse(&format!("{}{}{}", self.base_url, API_PREFIX, req.endpoint))?;

        if !req.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in req.query.entries() {
                match value {
                    QueryValue::One(v) => {
                        pairs.append_pair(key, v);
                    }
                    QueryValue::Many(vs) => {
                        let key = format!("{}[]", key);
                        for v in vs {
                            pairs.append_pair(&key, v);
                        }
                    }
                }
            }
        }

        let mut headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(trace_id) = &self.trace_id {
            headers.push(("X-Trace-ID".to_string(), trace_id.clone()));
        }

        let body = match &req.body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_vec(value)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: req.method.clone(),
            url,
            headers,
            body,
        })
    }
}

fn success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    struct FakeClient {
        requests: Mutex<Vec<HttpRequest>>,
        response: RawResponse,
    }

    impl FakeClient {
        fn returning(response: RawResponse) -> Self {
            Self {
                requests: Mutex::new(vec![]),
                response,
            }
        }

        fn ok(body: &str) -> Self {
            Self::returning(RawResponse {
                status: 200,
                headers: vec![],
                body: body.as_bytes().to_vec(),
            })
        }
    }

    #[async_trait]
    impl HttpClient for &FakeClient {
        async fn execute(&self, req: HttpRequest) -> Result<RawResponse, Error> {
            self.requests.lock().unwrap().push(req);
            Ok(self.response.clone())
        }
    }

    fn client(fake: &FakeClient) -> Firefly<&FakeClient> {
        Builder::new()
            .with_base_url("https://firefly.example.com/")
            .with_token("secret")
            .build_with_client(fake)
            .unwrap()
    }

    #[tokio::test]
    async fn prepends_api_prefix_and_serializes_query() {
        let fake = FakeClient::ok("{}");
        let mut query = Query::new();
        query.push("page", "2");
        query.push_many("accounts", vec!["1".to_string(), "2".to_string()]);
        let req = ApiRequest::get("/insight/expense/category").with_query(query);

        client(&fake).call(&req).await.unwrap();

        let sent = fake.requests.lock().unwrap();
        assert_eq!(
            sent[0].url.as_str(),
            "https://firefly.example.com/api/v1/insight/expense/category?page=2&accounts%5B%5D=1&accounts%5B%5D=2"
        );
    }

    #[tokio::test]
    async fn attaches_credentials_and_trace_header() {
        let fake = FakeClient::ok("{}");
        let firefly = Builder::new()
            .with_base_url("https://firefly.example.com")
            .with_token("secret")
            .with_trace_id(Some("trace-123".to_string()))
            .build_with_client(&fake)
            .unwrap();

        firefly.call(&ApiRequest::get("/about")).await.unwrap();

        let sent = fake.requests.lock().unwrap();
        let headers = &sent[0].headers;
        assert!(headers.contains(&("Authorization".to_string(), "Bearer secret".to_string())));
        assert!(headers.contains(&("X-Trace-ID".to_string(), "trace-123".to_string())));
    }

    #[tokio::test]
    async fn empty_trace_id_is_not_forwarded() {
        let fake = FakeClient::ok("{}");
        let firefly = Builder::new()
            .with_base_url("https://firefly.example.com")
            .with_token("secret")
            .with_trace_id(Some(String::new()))
            .build_with_client(&fake)
            .unwrap();

        firefly.call(&ApiRequest::get("/about")).await.unwrap();

        let sent = fake.requests.lock().unwrap();
        assert!(!sent[0].headers.iter().any(|(name, _)| name == "X-Trace-ID"));
    }

    #[tokio::test]
    async fn serializes_body_as_json() {
        let fake = FakeClient::ok("{}");
        let req = ApiRequest::post("/accounts")
            .with_body(serde_json::json!({"name": "Checking", "type": "asset"}));

        client(&fake).call(&req).await.unwrap();

        let sent = fake.requests.lock().unwrap();
        let body: Value = serde_json::from_slice(sent[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["name"], "Checking");
        assert!(sent[0]
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn non_success_status_becomes_api_error() {
        let fake = FakeClient::returning(RawResponse {
            status: 422,
            headers: vec![],
            body: br#"{"message": "No such account."}"#.to_vec(),
        });

        let err = client(&fake)
            .call(&ApiRequest::get("/accounts/404"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::Api {
                status: 422,
                message: "No such account.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_body_parses_as_empty_object() {
        let fake = FakeClient::returning(RawResponse {
            status: 204,
            headers: vec![],
            body: vec![],
        });

        let value = client(&fake)
            .call(&ApiRequest::delete("/accounts/1"))
            .await
            .unwrap();

        assert_eq!(value, Value::Object(Default::default()));
    }

    #[tokio::test]
    async fn download_returns_raw_response_with_headers() {
        let fake = FakeClient::returning(RawResponse {
            status: 200,
            headers: vec![(
                "content-disposition".to_string(),
                "attachment; filename=report.csv".to_string(),
            )],
            body: b"a,b,c".to_vec(),
        });

        let res = client(&fake)
            .download(&ApiRequest::get("/data/export/transactions"))
            .await
            .unwrap();

        assert_eq!(res.body, b"a,b,c");
        assert_eq!(
            res.header("Content-Disposition"),
            Some("attachment; filename=report.csv")
        );
    }
}
