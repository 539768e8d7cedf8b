//! API key to bearer token exchange.

use crate::config::AuditConfig;
use crate::error::TokenError;
use crate::utils::{http_client, truncate_body};
use reqwest::blocking::Client;
use serde::Deserialize;

const API_KEY_GRANT: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchanges a long-lived API key for a short-lived bearer token.
pub struct IamTokenProvider {
    client: Client,
    url: String,
    api_key: String,
}

impl IamTokenProvider {
    pub fn new(config: &AuditConfig) -> Result<Self, TokenError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(TokenError::MissingApiKey)?;
        Ok(Self {
            client: http_client(config.http_timeout_secs, &[config.iam_url.as_str()])
                .map_err(|e| TokenError::Request(e.to_string()))?,
            url: config.iam_url.clone(),
            api_key,
        })
    }

    pub fn fetch_token(&self) -> Result<String, TokenError> {
        tracing::debug!("Requesting access token from {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", API_KEY_GRANT), ("apikey", self.api_key.as_str())])
            .send()
            .map_err(|e| TokenError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TokenError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        let parsed: TokenResponse =
            response.json().map_err(|e| TokenError::Request(e.to_string()))?;
        parsed.access_token.filter(|t| !t.is_empty()).ok_or(TokenError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config_for(server: &Server, api_key: Option<&str>) -> AuditConfig {
        AuditConfig {
            iam_url: format!("{}/identity/token", server.url()),
            api_key: api_key.map(str::to_string),
            http_timeout_secs: 5,
            ..AuditConfig::default()
        }
    }

    #[test]
    fn test_exchanges_api_key_for_token() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/identity/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), API_KEY_GRANT.into()),
                Matcher::UrlEncoded("apikey".into(), "secret-key".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"tok-123","expires_in":3600}"#)
            .create();

        let provider = IamTokenProvider::new(&config_for(&server, Some("secret-key"))).unwrap();
        assert_eq!(provider.fetch_token().unwrap(), "tok-123");
        mock.assert();
    }

    #[test]
    fn test_http_error_is_reported() {
        let mut server = Server::new();
        let _mock =
            server.mock("POST", "/identity/token").with_status(400).with_body("bad key").create();

        let provider = IamTokenProvider::new(&config_for(&server, Some("k"))).unwrap();
        let err = provider.fetch_token().unwrap_err();
        assert!(matches!(err, TokenError::Status { status: 400, ref body } if body == "bad key"));
    }

    #[test]
    fn test_missing_token_field() {
        let mut server = Server::new();
        let _mock = server.mock("POST", "/identity/token").with_status(200).with_body("{}").create();

        let provider = IamTokenProvider::new(&config_for(&server, Some("k"))).unwrap();
        assert!(matches!(provider.fetch_token(), Err(TokenError::MissingToken)));
    }

    #[test]
    fn test_missing_api_key() {
        let server = Server::new();
        assert!(matches!(
            IamTokenProvider::new(&config_for(&server, None)),
            Err(TokenError::MissingApiKey)
        ));
    }
}
