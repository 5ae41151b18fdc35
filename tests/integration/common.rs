use ridgeline_analytics::{AnalyticsClient, Credentials, Identifiable};
use serde::Deserialize;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Element type used by the list endpoints of the mock server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Report {
    pub id: String,
    pub name: String,
}

impl Identifiable for Report {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Client for `server` holding an access token.
pub fn authorized_client(server: &MockServer) -> AnalyticsClient {
    AnalyticsClient::new(
        format!("{}/api", server.uri()),
        Credentials::new("consumer-key", "consumer-secret")
            .with_token("access-token", "access-secret"),
    )
    .expect("client should build")
}

/// A `reports` page body holding `count` reports starting at `offset`.
pub fn reports_page(offset: usize, size: usize, count: usize) -> Value {
    let reports: Vec<Value> = (offset..offset + count)
        .map(|i| json!({"id": format!("r{i}"), "name": format!("Report {i}")}))
        .collect();
    json!({"reports": reports, "offset": offset, "size": size})
}

/// Value of the `Authorization` header of a received request.
pub fn authorization_of(request: &wiremock::Request) -> String {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
