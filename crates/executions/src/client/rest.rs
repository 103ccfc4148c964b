//! REST control plane client.
//!
//! This module provides the [`RestClient`] implementation of [`ControlPlane`]
//! against the manager's v3.1 REST API, using a blocking HTTP agent.

use crate::client::ControlPlane;
use crate::error::{Error, Result};
use crate::types::{Execution, ExecutionRequest, NodeInstance};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// API version prefix appended to the manager URL.
const API_PREFIX: &str = "api/v3.1";

/// Credentials for the manager API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Manager user name
    pub username: String,
    /// Manager password
    pub password: String,
}

impl Credentials {
    /// Value for the HTTP `Authorization` header.
    fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

/// Blocking REST client for the manager API.
///
/// # Example
///
/// ```no_run
/// use executions::client::ControlPlane;
/// use executions::client::rest::RestClient;
///
/// let client = RestClient::new("https://manager.example.com")
///     .with_credentials("admin", "secret")
///     .with_tenant("default_tenant");
/// let execution = client.get_execution("0b7e4e1a").unwrap();
/// println!("status: {:?}", execution.status);
/// ```
pub struct RestClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Manager base URL, without trailing slash.
    base_url: String,
    credentials: Option<Credentials>,
    tenant: Option<String>,
}

impl RestClient {
    /// Create a client for the manager at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url,
            credentials: None,
            tenant: None,
        }
    }

    /// Authenticate with basic credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Scope requests to a tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Get the manager base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the API URL for a resource path.
    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, path)
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        log::trace!("GET {}", url);

        let mut request = self.agent.get(&url).header("Accept", "application/json");
        if let Some(auth) = &self.credentials {
            request = request.header("Authorization", &auth.authorization());
        }
        if let Some(tenant) = &self.tenant {
            request = request.header("Tenant", tenant);
        }

        request
            .call()?
            .body_mut()
            .read_json()
            .map_err(|e| Error::Protocol(format!("cannot decode {}: {}", path, e)))
    }
}

impl ControlPlane for RestClient {
    fn start_execution(&self, request: &ExecutionRequest) -> Result<Execution> {
        let url = self.url("executions");
        log::trace!("POST {}", url);

        let mut post = self.agent.post(&url).header("Accept", "application/json");
        if let Some(auth) = &self.credentials {
            post = post.header("Authorization", &auth.authorization());
        }
        if let Some(tenant) = &self.tenant {
            post = post.header("Tenant", tenant);
        }

        post.send_json(request)?
            .body_mut()
            .read_json()
            .map_err(|e| Error::Protocol(format!("cannot decode execution: {}", e)))
    }

    fn get_execution(&self, execution_id: &str) -> Result<Execution> {
        self.get(&format!("executions/{}", execution_id))
    }

    fn get_node_instance(&self, node_instance_id: &str) -> Result<NodeInstance> {
        self.get(&format!("node-instances/{}", node_instance_id))
    }
}
