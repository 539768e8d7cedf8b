//! Text generation over the watsonx.ai REST endpoint.

use super::TextGenerator;
use crate::config::{AuditConfig, GenerationParams};
use crate::error::{AuditError, LlmCallError};
use crate::utils::{http_client, truncate_body};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    input: &'a str,
    parameters: &'a GenerationParams,
    model_id: &'a str,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
}

pub struct WatsonxClient {
    client: Client,
    url: String,
    token: String,
    model_id: String,
    project_id: String,
    parameters: GenerationParams,
}

impl WatsonxClient {
    /// `token` is a bearer token from [`super::IamTokenProvider`].
    pub fn new(config: &AuditConfig, token: String) -> Result<Self, AuditError> {
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AuditError::Config("project_id is required".to_string()))?;

        Ok(Self {
            client: http_client(config.llm_timeout_secs, &[config.generation_url.as_str()])
                .map_err(|e| AuditError::Config(format!("failed to build HTTP client: {e}")))?,
            url: config.generation_url.clone(),
            token,
            model_id: config.model_id.clone(),
            project_id,
            parameters: config.generation.clone(),
        })
    }
}

impl TextGenerator for WatsonxClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmCallError> {
        let request = GenerationRequest {
            input: prompt,
            parameters: &self.parameters,
            model_id: &self.model_id,
            project_id: &self.project_id,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .map_err(|e| LlmCallError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmCallError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: GenerationResponse =
            response.json().map_err(|e| LlmCallError::Decode(e.to_string()))?;

        parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .ok_or(LlmCallError::EmptyResponse)
    }
}
