//! Request credentials and addressing contexts.
//!
//! # Design Decisions
//! - Node-scoped calls use HTTP Basic (instance id + password)
//! - Platform-scoped calls use a Bearer API key
//! - Contexts are immutable; a different identity means a new value
//! - Secrets are redacted from `Debug` output

use std::fmt;

use reqwest::RequestBuilder;
use url::Url;

use crate::error::{Error, Result};

/// Authentication attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    Basic { username: String, password: String },
    Bearer(String),
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub(crate) fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Self::Bearer(token) => builder.bearer_auth(token),
        }
    }

    pub(crate) fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::Bearer(_) => "bearer",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

/// Join an absolute path (optionally with a query) onto a base URL.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::invalid(format!("cannot build URL from '{}' and '{}': {}", base, path, e)))
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::invalid(format!("invalid base URL '{}': {}", raw, e)))
}

/// Addressing and credentials for a ledger node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContext {
    base_url: Url,
    instance_id: String,
    credentials: Credentials,
}

impl NodeContext {
    /// Context for `{scheme}://{location_domain}/api/node/{instance_id}`.
    ///
    /// `scheme` is only applied when `location_domain` carries none. An
    /// absent password authenticates with an empty one.
    pub fn new(
        scheme: &str,
        location_domain: &str,
        instance_id: &str,
        password: Option<&str>,
    ) -> Result<Self> {
        if location_domain.is_empty() {
            return Err(Error::invalid("locationDomain is required"));
        }
        let domain = location_domain.trim_end_matches('/');
        let base_url = if domain.contains("://") {
            parse_base_url(domain)?
        } else {
            parse_base_url(&format!("{}://{}", scheme, domain))?
        };
        Self::with_base_url(base_url, instance_id, password)
    }

    /// Context against an explicit base URL (proxies, local nodes, tests).
    pub fn with_base_url(base_url: Url, instance_id: &str, password: Option<&str>) -> Result<Self> {
        if instance_id.is_empty() {
            return Err(Error::invalid("instanceId is required"));
        }
        Ok(Self {
            base_url,
            instance_id: instance_id.to_string(),
            credentials: Credentials::basic(instance_id, password.unwrap_or_default()),
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// URL of a node API such as `assets/createAssetType`.
    pub fn api_url(&self, api_name: &str) -> Result<Url> {
        endpoint(
            &self.base_url,
            &format!("/api/node/{}/{}", self.instance_id, api_name),
        )
    }

    /// URL of the node's JSON-RPC endpoint.
    pub fn jsonrpc_url(&self) -> Result<Url> {
        self.api_url("jsonrpc")
    }
}

/// Addressing and credentials for platform-scoped APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformContext {
    host: Url,
    credentials: Credentials,
}

impl PlatformContext {
    pub fn new(host: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            host: parse_base_url(host)?,
            credentials: Credentials::bearer(api_key),
        })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        endpoint(&self.host, path)
    }
}
