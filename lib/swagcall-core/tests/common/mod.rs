use std::sync::{Arc, Mutex, PoisonError};

use rstest::fixture;
use tracing::info;

use swagcall_core::{ApiClient, ApiSchema, RequestDescriptor, RequestError};

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

pub const SCHEMA: &str = r##"{
    "swagger": "2.0",
    "securityDefinitions": {
        "basicAuth": { "type": "basic" },
        "apiKeyHeader": { "type": "apiKey", "in": "header", "name": "api-key" },
        "apiKeyQuery": { "type": "apiKey", "in": "query", "name": "token" },
        "petstore_auth": { "type": "oauth2", "flow": "implicit", "authorizationUrl": "http://example.com/oauth", "scopes": {} }
    },
    "definitions": {
        "Pet": {
            "required": ["name"],
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }
    }
}"##;

#[fixture]
pub fn client() -> ApiClient {
    init_tracing();
    match ApiSchema::from_json(SCHEMA) {
        Ok(schema) => ApiClient::builder().with_schema(schema).build(),
        Err(error) => panic!("invalid test schema: {error}"),
    }
}

/// Everything a transport received.
pub type Sent = Arc<Mutex<Vec<(Option<RequestError>, RequestDescriptor)>>>;

/// A transport recording its inputs and answering with the call number.
pub fn recorder() -> (
    Sent,
    impl Fn(Option<RequestError>, RequestDescriptor) -> usize + Send + Sync + 'static,
) {
    let sent = Sent::default();
    let transport = {
        let sent = Arc::clone(&sent);
        move |error: Option<RequestError>, request: RequestDescriptor| {
            let mut sent = sent.lock().unwrap_or_else(PoisonError::into_inner);
            sent.push((error, request));
            sent.len()
        }
    };
    (sent, transport)
}

/// The last request received by a recording transport.
pub fn last_sent(sent: &Sent) -> (Option<RequestError>, RequestDescriptor) {
    let sent = sent.lock().unwrap_or_else(PoisonError::into_inner);
    match sent.last() {
        Some(last) => last.clone(),
        None => panic!("nothing was sent"),
    }
}
