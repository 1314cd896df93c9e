//! HashiCorp Vault KV lookups over HTTP.

use super::session::SecretStoreSession;
use crate::config::VAULT_HOST_VAR;
use crate::error::{ReplaceError, ReplaceResult};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Timeout applied to every secret request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Raw HTTP response from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP transport trait for testing
pub trait VaultTransport: Send + Sync {
    /// Issue an authenticated GET; only connection-level problems are errors
    fn get(&self, url: &Url, token: &str) -> ReplaceResult<VaultResponse>;
}

/// Real transport using reqwest.
///
/// A fresh client is built for each request; nothing is pooled between lookups.
pub struct ReqwestTransport;

impl VaultTransport for ReqwestTransport {
    fn get(&self, url: &Url, token: &str) -> ReplaceResult<VaultResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let response = client
            .get(url.clone())
            .header(TOKEN_HEADER, token)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(VaultResponse { status, body })
    }
}

/// Reads single fields out of KV v2 secrets
pub struct VaultClient<'a> {
    session: &'a SecretStoreSession,
    transport: &'a dyn VaultTransport,
}

impl<'a> VaultClient<'a> {
    pub fn new(session: &'a SecretStoreSession, transport: &'a dyn VaultTransport) -> Self {
        Self { session, transport }
    }

    /// `{host}/v1/{path}`
    pub fn secret_url(&self, path: &str) -> ReplaceResult<Url> {
        let mut url = Url::parse(&self.session.host).map_err(|e| {
            ReplaceError::Transport(format!("invalid {} '{}': {}", VAULT_HOST_VAR, self.session.host, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ReplaceError::Transport(format!(
                    "{} '{}' is not a base URL",
                    VAULT_HOST_VAR, self.session.host
                ))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        Ok(url)
    }

    /// Value of `key` inside the secret at `path`.
    ///
    /// Returns [`ReplaceError::NotFound`] when the secret, its nested data map
    /// or the key is absent; every other failure is a transport error.
    pub fn read_field(&self, path: &str, key: &str) -> ReplaceResult<String> {
        let url = self.secret_url(path)?;
        tracing::debug!(path = %path, key = %key, "reading secret");

        let response = self.transport.get(&url, &self.session.token)?;

        match response.status {
            404 => {
                return Err(ReplaceError::NotFound(format!(
                    "Secret \"{}\" not found",
                    path
                )));
            }
            200..=299 => {}
            status => {
                return Err(ReplaceError::Transport(format!(
                    "reading \"{}\" returned HTTP {}{}",
                    path,
                    status,
                    error_detail(&response.body)
                )));
            }
        }

        if response.body.trim().is_empty() {
            return Err(ReplaceError::NotFound(format!(
                "Secret \"{}\" not found",
                path
            )));
        }

        let json: Value = serde_json::from_str(&response.body)?;

        let data = json
            .get("data")
            .and_then(|d| d.get("data"))
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ReplaceError::NotFound(format!("Data not found in secret \"{}\"", path))
            })?;

        match data.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(ReplaceError::NotFound(format!(
                "Key \"{}\" not found",
                key
            ))),
            Some(other) => Ok(other.to_string()),
        }
    }
}

/// `: msg1; msg2` from a Vault `{"errors": [...]}` body, or nothing
fn error_detail(body: &str) -> String {
    let messages: Vec<String> = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("errors").and_then(Value::as_array).cloned())
        .map(|errors| {
            errors
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

/// Mock transport for testing (serves canned responses keyed by URL path)
#[cfg(test)]
pub struct MockVaultTransport {
    responses: std::sync::Mutex<std::collections::HashMap<String, VaultResponse>>,
    requests: std::sync::Mutex<Vec<(String, String)>>,
    unreachable: bool,
}

#[cfg(test)]
impl MockVaultTransport {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::HashMap::new()),
            requests: std::sync::Mutex::new(Vec::new()),
            unreachable: false,
        }
    }

    /// Every request fails as if the host could not be reached
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new()
        }
    }

    /// Serve a KV v2 secret at `path`
    pub fn with_secret(self, path: &str, fields: &[(&str, &str)]) -> Self {
        let data: serde_json::Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        let body = serde_json::json!({ "data": { "data": data, "metadata": { "version": 1 } } });

        self.with_response(path, 200, &body.to_string())
    }

    /// Serve an arbitrary response at `path`
    pub fn with_response(self, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            format!("/v1/{}", path.trim_matches('/')),
            VaultResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Requests seen so far as (url, token)
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl VaultTransport for MockVaultTransport {
    fn get(&self, url: &Url, token: &str) -> ReplaceResult<VaultResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), token.to_string()));

        if self.unreachable {
            return Err(ReplaceError::Transport(format!(
                "error sending request for url ({})",
                url
            )));
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(url.path())
            .cloned()
            .unwrap_or(VaultResponse {
                status: 404,
                body: r#"{"errors":[]}"#.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SecretStoreSession {
        SecretStoreSession {
            host: "https://vault.example.com:8200".to_string(),
            token: "s.token".to_string(),
        }
    }

    #[test]
    fn test_secret_url() {
        let session = session();
        let transport = MockVaultTransport::new();
        let client = VaultClient::new(&session, &transport);

        let url = client.secret_url("kv/data/app").unwrap();
        assert_eq!(url.as_str(), "https://vault.example.com:8200/v1/kv/data/app");

        let url = client.secret_url("/kv/data/app/").unwrap();
        assert_eq!(url.as_str(), "https://vault.example.com:8200/v1/kv/data/app");
    }

    #[test]
    fn test_secret_url_with_trailing_slash_host() {
        let session = SecretStoreSession {
            host: "http://127.0.0.1:8200/".to_string(),
            token: "t".to_string(),
        };
        let transport = MockVaultTransport::new();
        let client = VaultClient::new(&session, &transport);

        let url = client.secret_url("kv/app").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8200/v1/kv/app");
    }

    #[test]
    fn test_invalid_host_is_fatal() {
        let session = SecretStoreSession {
            host: "not a url".to_string(),
            token: "t".to_string(),
        };
        let transport = MockVaultTransport::new();
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/app", "pw").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_read_field() {
        let session = session();
        let transport = MockVaultTransport::new().with_secret("kv/app", &[("pw", "hunter2")]);
        let client = VaultClient::new(&session, &transport);

        assert_eq!(client.read_field("kv/app", "pw").unwrap(), "hunter2");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, "s.token");
    }

    #[test]
    fn test_missing_secret_is_not_found() {
        let session = session();
        let transport = MockVaultTransport::new();
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/missing", "pw").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let session = session();
        let transport = MockVaultTransport::new().with_secret("kv/app", &[("user", "admin")]);
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/app", "pw").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Key \"pw\" not found");
    }

    #[test]
    fn test_secret_without_nested_data_is_not_found() {
        let session = session();
        let transport =
            MockVaultTransport::new().with_response("kv/v1style", 200, r#"{"data":{"pw":"x"}}"#);
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/v1style", "pw").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_non_string_values() {
        let session = session();
        let transport = MockVaultTransport::new().with_response(
            "kv/app",
            200,
            r#"{"data":{"data":{"port":5432,"enabled":true,"gone":null}}}"#,
        );
        let client = VaultClient::new(&session, &transport);

        assert_eq!(client.read_field("kv/app", "port").unwrap(), "5432");
        assert_eq!(client.read_field("kv/app", "enabled").unwrap(), "true");
        assert!(client.read_field("kv/app", "gone").unwrap_err().is_not_found());
    }

    #[test]
    fn test_permission_denied_is_fatal() {
        let session = session();
        let transport = MockVaultTransport::new().with_response(
            "kv/app",
            403,
            r#"{"errors":["permission denied"]}"#,
        );
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/app", "pw").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Secret store request failed: reading \"kv/app\" returned HTTP 403: permission denied"
        );
    }

    #[test]
    fn test_malformed_body_is_fatal() {
        let session = session();
        let transport = MockVaultTransport::new().with_response("kv/app", 200, "<html>");
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/app", "pw").unwrap_err();
        assert!(matches!(err, ReplaceError::Transport(_)));
    }

    #[test]
    fn test_unreachable_store_is_fatal() {
        let session = session();
        let transport = MockVaultTransport::unreachable();
        let client = VaultClient::new(&session, &transport);

        let err = client.read_field("kv/app", "pw").unwrap_err();
        assert!(err.is_fatal());
    }
}
