//! Chaincode lifecycle: upload, install, instantiate, invoke, query, upgrade.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::clients::common::require;
use crate::clients::privatehive::PrivatehiveNode;
use crate::error::{Error, Result};
use crate::http::{OperationDescriptor, Payload};

const DEFAULT_INVOKE_FUNCTION: &str = "init";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaincodeLanguage {
    Golang,
    Node,
}

impl ChaincodeLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Golang => "golang",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for ChaincodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChaincodeLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "golang" => Ok(Self::Golang),
            "node" => Ok(Self::Node),
            _ => Err(Error::invalid("chaincode type should be golang or node")),
        }
    }
}

/// Instantiate an installed chaincode on a channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instantiate {
    pub name: String,
    pub channel_name: String,
    /// Defaults to the chaincode's `init` on the node side.
    pub function_name: Option<String>,
    pub args: Vec<String>,
    /// By default any member of the channel may endorse.
    pub endorsement_policy: Option<Value>,
}

/// Invoke or query a chaincode function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChaincodeCall {
    pub chaincode_name: String,
    pub channel_name: String,
    /// Invoke defaults to `init`; query requires it.
    pub fcn: Option<String>,
    pub args: Vec<String>,
}

/// Replace a chaincode with a new version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upgrade {
    pub file_path: PathBuf,
    pub name: String,
    pub chaincode_version: String,
    pub args: Vec<String>,
    pub channel_name: String,
}

pub struct Chaincodes<'a> {
    node: &'a PrivatehiveNode,
}

impl<'a> Chaincodes<'a> {
    pub(crate) fn new(node: &'a PrivatehiveNode) -> Self {
        Self { node }
    }

    /// Upload a zipped chaincode. Does not install or instantiate it.
    pub async fn add(&self, file_path: &Path, name: &str, language: ChaincodeLanguage) -> Result<Value> {
        require("name", name)?;
        if file_path.as_os_str().is_empty() {
            return Err(Error::invalid("filePath is required"));
        }

        let form = Form::new()
            .part("chaincode_zip", zip_part(file_path).await?)
            .text("chaincodeName", name.to_string())
            .text("chaincodeLanguage", language.as_str());

        self.node
            .request(
                "privatehive.chaincode.add",
                OperationDescriptor::UPLOAD,
                "/chaincodes/add",
                Payload::Form(form),
            )
            .await
    }

    pub async fn install(&self, name: &str) -> Result<Value> {
        require("name", name)?;

        self.node
            .request_message(
                "privatehive.chaincode.install",
                OperationDescriptor::POST,
                "/chaincodes/install",
                Payload::Json(json!({ "chaincodeName": name })),
            )
            .await
    }

    pub async fn instantiate(&self, params: &Instantiate) -> Result<Value> {
        require("channelName", &params.channel_name)?;
        require("name", &params.name)?;

        // The node expects the misspelled `endorsmentPolicy` key.
        self.node
            .request_message(
                "privatehive.chaincode.instantiate",
                OperationDescriptor::POST,
                "/chaincodes/instantiate",
                Payload::Json(json!({
                    "chaincodeName": params.name,
                    "channelName": params.channel_name,
                    "functionName": params.function_name,
                    "args": params.args,
                    "endorsmentPolicy": params.endorsement_policy,
                })),
            )
            .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.node
            .request_message(
                "privatehive.chaincode.list",
                OperationDescriptor::GET,
                "/chaincodes/list",
                Payload::Empty,
            )
            .await
    }

    pub async fn invoke(&self, call: &ChaincodeCall) -> Result<Value> {
        require("chaincodeName", &call.chaincode_name)?;
        require("channelName", &call.channel_name)?;
        let fcn = call
            .fcn
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_INVOKE_FUNCTION);

        self.node
            .request_message(
                "privatehive.chaincode.invoke",
                OperationDescriptor::POST,
                "/chaincodes/invoke",
                Payload::Json(call_body(call, fcn)),
            )
            .await
    }

    pub async fn query(&self, call: &ChaincodeCall) -> Result<Value> {
        require("chaincodeName", &call.chaincode_name)?;
        require("channelName", &call.channel_name)?;
        let fcn = call.fcn.as_deref().unwrap_or_default();
        require("fcn", fcn)?;

        self.node
            .request_message(
                "privatehive.chaincode.query",
                OperationDescriptor::POST,
                "/chaincodes/query",
                Payload::Json(call_body(call, fcn)),
            )
            .await
    }

    pub async fn upgrade(&self, params: &Upgrade) -> Result<Value> {
        require("name", &params.name)?;
        if params.file_path.as_os_str().is_empty() {
            return Err(Error::invalid("filePath is required"));
        }
        require("chaincodeVersion", &params.chaincode_version)?;
        require("channelName", &params.channel_name)?;

        let form = Form::new()
            .part("chaincode_zip", zip_part(&params.file_path).await?)
            .text("chaincodeName", params.name.clone())
            .text("chaincodeVersion", params.chaincode_version.clone())
            .text("args", json!(params.args).to_string())
            .text("channelName", params.channel_name.clone());

        self.node
            .request(
                "privatehive.chaincode.upgrade",
                OperationDescriptor::UPLOAD,
                "/chaincodes/upgrade",
                Payload::Form(form),
            )
            .await
    }
}

fn call_body(call: &ChaincodeCall, fcn: &str) -> Value {
    json!({
        "chaincodeName": call.chaincode_name,
        "channelName": call.channel_name,
        "args": call.args,
        "fcn": fcn,
    })
}

async fn zip_part(path: &Path) -> Result<Part> {
    let contents = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chaincode.zip".to_string());
    Ok(Part::bytes(contents).file_name(file_name))
}
