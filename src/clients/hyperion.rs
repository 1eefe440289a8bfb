//! Hyperion file storage client.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tokio::io::AsyncWrite;

use crate::clients::common::{copy_body, require, PlatformApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::response::take_string;
use crate::http::{OperationDescriptor, Payload};

/// File to store on a Hyperion node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub contents: Vec<u8>,
    /// Sent as the multipart file name; generated when absent.
    pub file_name: Option<String>,
    pub location_code: String,
}

impl FileUpload {
    /// Read a local file, keeping its name.
    pub async fn from_path(path: impl AsRef<Path>, location_code: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            contents: tokio::fs::read(path).await?,
            file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            location_code: location_code.into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Hyperion {
    api: PlatformApi,
}

impl Hyperion {
    pub fn new(api_key: &str, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            api: PlatformApi::new(&config.platform.host, api_key, &config.http)?,
        })
    }

    /// Upload a file and return its content hash.
    pub async fn upload_file(&self, upload: FileUpload) -> Result<String> {
        require("locationCode", &upload.location_code)?;

        let file_name = upload.file_name.unwrap_or_else(generated_file_name);
        let form = Form::new()
            .text("location", upload.location_code)
            .part("file", Part::bytes(upload.contents).file_name(file_name));

        let body = self
            .api
            .call(
                "hyperion.upload",
                OperationDescriptor::UPLOAD,
                "/api/hyperion/upload",
                Payload::Form(form),
            )
            .await?;
        take_string(body, "message")
    }

    /// Stream a stored file into `writer`.
    ///
    /// Returns the HTTP status. Nothing is written unless the status is 2xx.
    pub async fn get_file<W>(&self, location_code: &str, file_hash: &str, writer: &mut W) -> Result<u16>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        require("locationCode", location_code)?;
        require("fileHash", file_hash)?;

        let response = self
            .api
            .stream(
                "hyperion.download",
                "/api/hyperion/download",
                json!({ "location": location_code, "hash": file_hash }),
            )
            .await?;
        let status = response.status().as_u16();

        if response.status().is_success() {
            let bytes = copy_body(response, writer).await?;
            tracing::debug!(file_hash, bytes, "Downloaded file");
        } else {
            tracing::warn!(file_hash, status, "File download refused");
        }

        Ok(status)
    }

    pub async fn delete_file(&self, location_code: &str, file_hash: &str) -> Result<Value> {
        require("locationCode", location_code)?;
        require("fileHash", file_hash)?;

        self.api
            .call(
                "hyperion.delete",
                OperationDescriptor::DELETE,
                "/api/hyperion/delete",
                Payload::Json(json!({ "location": location_code, "hash": file_hash })),
            )
            .await
    }
}

fn generated_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("file-{}-a", millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn offline_client() -> Hyperion {
        let mut config = ClientConfig::default();
        config.platform.host = "http://127.0.0.1:9".to_string();
        Hyperion::new("key", &config).unwrap()
    }

    #[tokio::test]
    async fn test_missing_location_is_rejected_locally() {
        let err = offline_client()
            .upload_file(FileUpload {
                contents: b"hello".to_vec(),
                file_name: None,
                location_code: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let mut sink = Vec::new();
        let err = offline_client()
            .get_file("us-west-2", "", &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_generated_file_name() {
        let name = generated_file_name();
        assert!(name.starts_with("file-"));
        assert!(name.ends_with("-a"));
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"ledger").await.unwrap();

        let upload = FileUpload::from_path(&path, "us-west-2").await.unwrap();
        assert_eq!(upload.contents, b"ledger");
        assert_eq!(upload.file_name.as_deref(), Some("notes.txt"));
    }
}
