use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::clients::gemini::{GeminiClient, GenerateContentRequest, Part, UpstreamError};

pub const SYSTEM_INSTRUCTION: &str = "You are an AI expert in high-school and university level chemistry.
Solve the question the user gives you and explain the solution clearly, in the language of the question.
Reply in JSON format: {\"konu\": \"topic of the question\", \"istenilen\": \"what is asked\", \"verilenler\": \"the given data\", \"cozum\": \"step-by-step solution\", \"sonuc\": \"final result\", \"konuOzet\": \"short summary of the topic\"}.";

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("At least one part is required")]
    EmptyParts,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Wraps a question in the fixed instruction and hands it to upstream.
pub struct SolveService {
    client: GeminiClient,
    search_grounding: bool,
}

impl SolveService {
    #[must_use]
    pub const fn new(client: GeminiClient, search_grounding: bool) -> Self {
        Self {
            client,
            search_grounding,
        }
    }

    #[must_use]
    pub fn build_request(&self, parts: Vec<Part>) -> GenerateContentRequest {
        GenerateContentRequest::json_answer(parts, SYSTEM_INSTRUCTION, self.search_grounding)
    }

    pub async fn solve(&self, username: &str, parts: Vec<Part>) -> Result<Value, SolveError> {
        if parts.is_empty() {
            return Err(SolveError::EmptyParts);
        }

        let images = parts
            .iter()
            .filter(|p| matches!(p, Part::InlineData { .. }))
            .count();
        info!(username, parts = parts.len(), images, "Forwarding question upstream");

        let request = self.build_request(parts);
        let result = self.client.generate_content(&request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(UpstreamError::Status { .. }) => "upstream_error",
            Err(UpstreamError::Transport(_)) => "transport_error",
        };
        metrics::counter!("solve_requests_total", "outcome" => outcome).increment(1);

        Ok(result?)
    }
}
