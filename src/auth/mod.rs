//! Authentication headers and ACL login.
//!
//! Every request carries the API key and the static auth token; query and mutate also
//! carry the ACL access token obtained through [`LoginRequest`].

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;
use crate::models::{OperationKind, RawResponse};

/// Header carrying the cloud API key.
pub const API_KEY_HEADER: &str = "X-Auth-Token";

/// Header carrying the static auth token.
pub const AUTH_TOKEN_HEADER: &str = "X-Dgraph-AuthToken";

/// Header carrying the ACL access JWT.
pub const ACCESS_TOKEN_HEADER: &str = "X-Dgraph-AccessToken";

pub const DQL_CONTENT_TYPE: &str = "application/dql";

/// Attach the credential headers appropriate for `operation`.
///
/// Empty credentials are not sent.
pub fn apply_headers(
    request: RequestBuilder,
    config: &ConnectionConfig,
    operation: OperationKind,
) -> RequestBuilder {
    let mut headers = vec![
        (API_KEY_HEADER, config.api_key.as_str()),
        (AUTH_TOKEN_HEADER, config.auth_token.as_str()),
    ];
    if operation.sends_access_token() {
        headers.push((ACCESS_TOKEN_HEADER, config.acl_token.as_str()));
    }

    headers
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(request, |request, (name, value)| request.header(name, value))
}

const LOGIN_MUTATION: &str = "mutation login($userId: String, $password: String, $namespace: Int) {
  login(userId: $userId, password: $password, namespace: $namespace) {
    response {
      accessJWT
      refreshJWT
    }
  }
}";

/// ACL credentials for the admin login mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
    pub namespace: u64,
}

impl LoginRequest {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>, namespace: u64) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            namespace,
        }
    }

    /// GraphQL request body posted to `/admin`.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "query": LOGIN_MUTATION,
            "variables": {
                "userId": self.user_id,
                "password": self.password,
                "namespace": self.namespace,
            }
        })
    }
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTokens {
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl LoginTokens {
    /// Read the tokens out of a login response.
    ///
    /// Returns the server's error messages when the mutation failed or the tokens
    /// are missing.
    pub fn from_response(raw: &RawResponse) -> Result<Self, String> {
        if let Some(errors) = raw.errors() {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect();
            return Err(format!("login rejected: {}", messages.join("; ")));
        }

        let response = raw
            .data()
            .and_then(|data| data.pointer("/login/response"))
            .ok_or_else(|| "login response has no tokens".to_string())?;

        let token = |name: &str| {
            response
                .get(name)
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .ok_or_else(|| format!("login response is missing {}", name))
        };

        Ok(Self {
            access_jwt: token("accessJWT")?,
            refresh_jwt: token("refreshJWT")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_names(operation: OperationKind, config: &ConnectionConfig) -> Vec<String> {
        let request = apply_headers(
            reqwest::Client::new().post("http://localhost/query"),
            config,
            operation,
        )
        .build()
        .unwrap();
        let mut names: Vec<String> = request
            .headers()
            .keys()
            .map(|k| k.as_str().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_access_token_only_on_query_and_mutate() {
        let config = ConnectionConfig::default()
            .with_api_key("key")
            .with_auth_token("auth")
            .with_acl_token("jwt");

        let expected = vec!["x-auth-token", "x-dgraph-accesstoken", "x-dgraph-authtoken"];
        assert_eq!(header_names(OperationKind::Query, &config), expected);
        assert_eq!(header_names(OperationKind::Mutate, &config), expected);
        assert_eq!(
            header_names(OperationKind::Alter, &config),
            vec!["x-auth-token", "x-dgraph-authtoken"]
        );
    }

    #[test]
    fn test_empty_credentials_not_sent() {
        let config = ConnectionConfig::default().with_acl_token("jwt");
        assert_eq!(
            header_names(OperationKind::Query, &config),
            vec!["x-dgraph-accesstoken"]
        );
    }

    #[test]
    fn test_login_body_variables() {
        let body = LoginRequest::new("groot", "password", 0).body();
        assert_eq!(body["variables"]["userId"], "groot");
        assert_eq!(body["variables"]["namespace"], 0);
        assert!(body["query"].as_str().unwrap().contains("accessJWT"));
    }

    #[test]
    fn test_tokens_from_response() {
        let raw = RawResponse::new(json!({
            "data": { "login": { "response": { "accessJWT": "a.b.c", "refreshJWT": "d.e.f" } } }
        }));
        let tokens = LoginTokens::from_response(&raw).unwrap();
        assert_eq!(tokens.access_jwt, "a.b.c");
        assert_eq!(tokens.refresh_jwt, "d.e.f");
    }

    #[test]
    fn test_tokens_from_error_response() {
        let raw = RawResponse::new(json!({
            "errors": [{ "message": "invalid username or password" }],
            "data": { "login": null }
        }));
        let err = LoginTokens::from_response(&raw).unwrap_err();
        assert!(err.contains("invalid username or password"));

        let raw = RawResponse::new(json!({
            "data": { "login": { "response": { "accessJWT": "" } } }
        }));
        assert!(LoginTokens::from_response(&raw).is_err());
    }
}
