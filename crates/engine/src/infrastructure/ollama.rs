//! Ollama generation client (OpenAI-compatible API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::infrastructure::ports::{
    GenerationError, GenerationPort, InteractionProposalRequest, ZoneProposalRequest,
};

/// Client for Ollama's OpenAI-compatible API
#[derive(Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default model for Ollama.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

const ZONE_SYSTEM_PROMPT: &str = "You are a map designer. Reply with JSON only.";
const INTERACTION_SYSTEM_PROMPT: &str =
    "You design interactive objects for tabletop scenes. Reply with JSON only.";

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str) -> Self {
        // Use 120 second timeout for LLM requests (they can be slow)
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Send one JSON-mode chat completion and return the parsed JSON body.
    async fn complete_json(&self, system: &str, user: String) -> Result<Value, GenerationError> {
        let api_request = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: Some(system.to_string()),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: Some(user),
                },
            ],
            temperature: Some(0.7),
            response_format: Some(ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&api_request)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;
            return Err(GenerationError::RequestFailed(error_text));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        extract_json(&content)
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL)
    }
}

#[async_trait]
impl GenerationPort for OllamaGenerator {
    async fn propose_zones(
        &self,
        request: ZoneProposalRequest,
    ) -> Result<Vec<Value>, GenerationError> {
        let body = self
            .complete_json(ZONE_SYSTEM_PROMPT, build_zone_prompt(&request))
            .await?;
        take_array(body, "zones")
    }

    async fn propose_interactions(
        &self,
        request: InteractionProposalRequest,
    ) -> Result<Vec<Value>, GenerationError> {
        let body = self
            .complete_json(INTERACTION_SYSTEM_PROMPT, build_interaction_prompt(&request))
            .await?;
        take_array(body, "interactions")
    }
}

fn build_zone_prompt(request: &ZoneProposalRequest) -> String {
    let center = &request.center;
    let mut prompt = format!(
        "Generate explorable map zones for the world described below. \
         Return strict JSON shaped as \
         {{\"zones\":[{{\"name\":\"\",\"zone_type\":\"city|village|forest|mountain|river|desert|coast|cave|ruins|unknown\",\
         \"size\":\"small|medium|large\",\"radius_m\":120,\"x\":0,\"y\":0,\"description\":\"\",\"tags\":[\"\"],\
         \"sub_zones\":[{{\"name\":\"\",\"offset_x\":0,\"offset_y\":0,\"offset_z\":0,\"description\":\"\"}}]}}]}}. \
         Zone count: {count}. Player position: ({x}, {y}, {z}); x and y are meters. \
         Keep zones within 300 m of the player and put at least one within 80 m. \
         Use meaningful names, never serial names like \"Zone 1\". \
         Sub-zone counts: small 3-5, medium 5-10, large 8-15. \
         Radius: small 60-180, medium 120-300, large 240-500. \
         Zones must not overlap: center distance must exceed the sum of radii. \
         Sub-zone offsets are meters relative to the zone center.",
        count = request.count,
        x = center.x,
        y = center.y,
        z = center.z,
    );
    if !request.recent_events.is_empty() {
        prompt.push_str(" Recent events: ");
        prompt.push_str(&request.recent_events.join(" | "));
        prompt.push('.');
    }
    prompt.push_str(" World setting: ");
    prompt.push_str(&request.world_prompt);
    prompt
}

fn build_interaction_prompt(request: &InteractionProposalRequest) -> String {
    let mut prompt = format!(
        "Propose 1-3 new interactive objects for the sub-zone below, driven by the player's intent. \
         Return strict JSON shaped as \
         {{\"interactions\":[{{\"name\":\"\",\"type\":\"item|scene|npc\",\"status\":\"ready|disabled|hidden\"}}]}}. \
         Sub-zone: {name}. Description: {description}. Player intent: {intent}. \
         Names must be concrete and actionable.",
        name = request.sub_zone_name,
        description = request.sub_zone_description,
        intent = request.intent,
    );
    if !request.existing_names.is_empty() {
        prompt.push_str(" Do not repeat: ");
        prompt.push_str(&request.existing_names.join(", "));
        prompt.push('.');
    }
    prompt
}

/// Parse model output as JSON, tolerating a surrounding Markdown code fence.
pub(crate) fn extract_json(content: &str) -> Result<Value, GenerationError> {
    let mut raw = content.trim();
    if let Some(fenced) = raw.strip_prefix("```") {
        raw = fenced.trim_end_matches('`').trim();
        raw = raw.strip_prefix("json").unwrap_or(raw).trim();
    }
    if raw.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "empty model response".to_string(),
        ));
    }
    serde_json::from_str(raw).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
}

fn take_array(body: Value, key: &str) -> Result<Vec<Value>, GenerationError> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(GenerationError::InvalidResponse(format!(
                "response has no \"{key}\" array"
            ))),
        },
        _ => Err(GenerationError::InvalidResponse(
            "response is not a JSON object".to_string(),
        )),
    }
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    message: OpenAIMessage,
}
