use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CallError, REQUEST_TIMEOUT};

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize, Default)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize, Default)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize, Default)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

pub async fn call_gemini(
    base_url: &str,
    api_key: &str,
    prompt: &str,
    max_output_tokens: u32,
) -> Result<String, CallError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let gemini_request = GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart { text: prompt.to_string() }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.8,
            max_output_tokens,
        },
    };

    let url = format!(
        "{}/v1beta/models/gemini-2.5-flash:generateContent",
        base_url.trim_end_matches('/')
    );
    let response = client
        .post(url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&gemini_request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        // The error body carries {"error": {"message": ...}} when Gemini
        // produced it; fall back to the raw text otherwise.
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| format!("Gemini API error ({}): {}", status, error_text));
        return Err(CallError::upstream(status.as_u16(), message));
    }

    let gemini_response: GeminiResponse = response
        .json()
        .await
        .map_err(|error| CallError::transport(format!("Failed to parse Gemini response: {}", error)))?;

    Ok(gemini_response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.clone())
        .unwrap_or_default())
}
