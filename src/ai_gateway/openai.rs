use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CallError, REQUEST_TIMEOUT};

#[derive(Debug, Serialize)]
struct GPTRequest {
    model: String,
    messages: Vec<GPTMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GPTMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct GPTResponse {
    choices: Vec<GPTChoice>,
}

#[derive(Debug, Deserialize)]
struct GPTChoice {
    message: GPTMessageResponse,
}

#[derive(Debug, Deserialize)]
struct GPTMessageResponse {
    #[serde(default)]
    content: String,
}

pub async fn call_openai(
    base_url: &str,
    api_key: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, CallError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let gpt_request = GPTRequest {
        model: "gpt-4o".to_string(),
        messages: vec![GPTMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        max_tokens,
        temperature: 0.8,
    };

    let response = client
        .post(format!("{}/v1/chat/completions", base_url.trim_end_matches('/')))
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&gpt_request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CallError::upstream(
            status.as_u16(),
            format!("OpenAI API error ({}): {}", status, error_text),
        ));
    }

    let gpt_response: GPTResponse = response
        .json()
        .await
        .map_err(|error| CallError::transport(format!("Failed to parse OpenAI response: {}", error)))?;

    // A success with no text payload is an empty string, not a hard failure.
    Ok(gpt_response
        .choices
        .first()
        .map(|choice| choice.message.content.clone())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "생성된 텍스트" } }]
            })))
            .mount(&server)
            .await;

        let text = call_openai(&server.uri(), "sk-test", "프롬프트", 4000).await.unwrap();
        assert_eq!(text, "생성된 텍스트");
    }

    #[tokio::test]
    async fn empty_choices_yield_empty_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let text = call_openai(&server.uri(), "sk-test", "프롬프트", 4000).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let error = call_openai(&server.uri(), "sk-test", "프롬프트", 4000)
            .await
            .unwrap_err();
        assert_eq!(error.status, Some(429));
        assert!(error.message.contains("quota exceeded"));
    }
}
