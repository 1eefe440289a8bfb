//! Plumbing shared by the platform-scoped clients.

use futures_util::StreamExt;
use reqwest::Response;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::http::response::parse_body;
use crate::http::{ApiCall, OperationDescriptor, Payload, PlatformContext, RequestSender};

/// Bearer-authenticated access to the platform host.
#[derive(Debug, Clone)]
pub(crate) struct PlatformApi {
    context: PlatformContext,
    sender: RequestSender,
}

impl PlatformApi {
    pub(crate) fn new(host: &str, api_key: &str, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            context: PlatformContext::new(host, api_key)?,
            sender: RequestSender::new(http)?,
        })
    }

    pub(crate) async fn call(
        &self,
        name: &str,
        descriptor: OperationDescriptor,
        path: &str,
        payload: Payload,
    ) -> Result<Value> {
        self.sender
            .send(ApiCall {
                name,
                descriptor,
                url: self.context.url(path)?,
                credentials: self.context.credentials(),
                payload,
            })
            .await
    }

    pub(crate) async fn stream(&self, name: &str, path: &str, query: Value) -> Result<Response> {
        self.sender
            .send_streaming(ApiCall {
                name,
                descriptor: OperationDescriptor::GET,
                url: self.context.url(path)?,
                credentials: self.context.credentials(),
                payload: Payload::Json(query),
            })
            .await
    }
}

/// Fail with `InvalidArgument` when a required string is empty.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{} is required", field)));
    }
    Ok(())
}

/// Serialize a request body.
pub(crate) fn to_json<T: Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Copy a successful response body into `writer`, returning bytes written.
///
/// A non-2xx response is decoded as an API error and nothing is written.
pub(crate) async fn copy_body<W>(response: Response, writer: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let status = response.status();
    if !status.is_success() {
        let bytes = response.bytes().await?;
        return parse_body(status, &bytes).map(|_| 0);
    }

    let mut written = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;

    Ok(written)
}
