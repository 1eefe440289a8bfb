//! Authenticated request sender shared by every client.

use std::time::{Duration, Instant};

use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::http::auth::Credentials;
use crate::http::operation::{Encoding, OperationDescriptor};
use crate::http::response::parse_body;
use crate::observability::metrics;
use crate::resilience::with_timeout;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request payload, placed according to the descriptor's encoding.
#[derive(Debug, Default)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
    Form(Form),
}

/// One remote call.
#[derive(Debug)]
pub struct ApiCall<'a> {
    /// Operation name used in logs and metrics.
    pub name: &'a str,
    pub descriptor: OperationDescriptor,
    pub url: Url,
    pub credentials: &'a Credentials,
    pub payload: Payload,
}

/// Sends [`ApiCall`]s over a shared `reqwest` client.
///
/// JSON calls are bounded by the request timeout end to end. Streaming calls
/// are bounded until the response head arrives; the body is not.
#[derive(Debug, Clone)]
pub struct RequestSender {
    client: Client,
    request_timeout: Duration,
}

impl RequestSender {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
        })
    }

    /// Send a call and decode the JSON envelope.
    pub async fn send(&self, call: ApiCall<'_>) -> Result<Value> {
        let name = call.name.to_string();
        let (status, bytes) = with_timeout(&name, self.request_timeout, async {
            let response = self.dispatch(call).await?;
            let status = response.status();
            Ok::<_, Error>((status, response.bytes().await?))
        })
        .await??;
        let body = parse_body(status, &bytes);

        if let Err(e) = &body {
            tracing::debug!(operation = %name, error = %e, "API call rejected");
        }
        body
    }

    /// Send a call and hand back the raw response for streaming.
    ///
    /// The status is not checked; callers decide what a non-2xx means.
    pub async fn send_streaming(&self, call: ApiCall<'_>) -> Result<Response> {
        let name = call.name;
        with_timeout(name, self.request_timeout, self.dispatch(call)).await?
    }

    async fn dispatch(&self, call: ApiCall<'_>) -> Result<Response> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "api_call",
            operation = call.name,
            method = %call.descriptor.method,
            request_id = %request_id,
        );

        async move {
            let builder = self
                .client
                .request(call.descriptor.method.clone(), call.url.clone())
                .header(X_REQUEST_ID, request_id.to_string());
            let builder = call.credentials.apply(builder);

            let builder = match (call.descriptor.encoding, call.payload) {
                (_, Payload::Empty) => builder,
                (Encoding::Query, Payload::Json(value)) => builder.query(&query_pairs(&value)?),
                (Encoding::Json, Payload::Json(value)) => builder.json(&value),
                (Encoding::Multipart, Payload::Form(form)) => builder.multipart(form),
                (encoding, _) => {
                    return Err(Error::invalid(format!(
                        "payload does not match {:?} encoding for {}",
                        encoding, call.name
                    )))
                }
            };

            tracing::debug!(url = %call.url, auth = call.credentials.scheme(), "Sending request");
            let start = Instant::now();

            match builder.send().await {
                Ok(response) => {
                    metrics::record_request(call.name, response.status().as_u16(), start);
                    tracing::debug!(
                        status = response.status().as_u16(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Response received"
                    );
                    Ok(response)
                }
                Err(e) => {
                    metrics::record_transport_error(call.name);
                    tracing::warn!(error = %e, "Request failed");
                    Err(Error::Http(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Flatten a JSON object into query parameters. `null` fields are dropped.
fn query_pairs(value: &Value) -> Result<Vec<(String, String)>> {
    let object = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(object) => object,
        other => {
            return Err(Error::invalid(format!(
                "query parameters must be an object, got {}",
                other
            )))
        }
    };

    Ok(object
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), rendered)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs() {
        let mut pairs = query_pairs(&json!({
            "location": "us-west-2",
            "showDeleted": false,
            "blockNumber": 12,
            "nodeType": null,
        }))
        .unwrap();
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("blockNumber".to_string(), "12".to_string()),
                ("location".to_string(), "us-west-2".to_string()),
                ("showDeleted".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_rejects_arrays() {
        assert!(query_pairs(&json!(["a"])).is_err());
        assert!(query_pairs(&Value::Null).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_rejected_locally() {
        let sender = RequestSender::new(&HttpConfig::default()).unwrap();
        let credentials = Credentials::None;
        let err = sender
            .send(ApiCall {
                name: "test",
                descriptor: OperationDescriptor::UPLOAD,
                url: Url::parse("http://127.0.0.1:9/never").unwrap(),
                credentials: &credentials,
                payload: Payload::Json(json!({})),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_unanswered_call_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = HttpConfig {
            request_timeout_secs: 1,
            ..HttpConfig::default()
        };
        let sender = RequestSender::new(&config).unwrap();
        let credentials = Credentials::None;
        let err = sender
            .send(ApiCall {
                name: "eth_getTransactionReceipt",
                descriptor: OperationDescriptor::POST,
                url: Url::parse(&format!("http://{}/api/node/n1/jsonrpc", addr)).unwrap(),
                credentials: &credentials,
                payload: Payload::Json(json!({ "id": 1 })),
            })
            .await
            .unwrap_err();

        match err {
            Error::Timeout(timeout) => {
                assert_eq!(timeout.operation, "eth_getTransactionReceipt");
                assert_eq!(timeout.after, Duration::from_secs(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
