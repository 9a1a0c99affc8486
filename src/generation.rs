use async_trait::async_trait;
use axum::extract::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai_gateway::{self, TokenBudget};
use crate::entities::error::BwError;
use crate::entities::settings::Provider;
use crate::json_extract::extract_json;
use crate::prompts::{self, ContentPromptInput, SubtitlePromptInput, TitlePromptInput};
use crate::wizard::assembly::ThreadContent;
use crate::wizard::generator::ContentGenerator;

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
    #[serde(flatten)]
    pub action: GenerateAction,
}

#[derive(Deserialize)]
#[serde(tag = "action")]
pub enum GenerateAction {
    #[serde(rename = "personas")]
    Personas { keyword: String },
    #[serde(rename = "titles")]
    Titles(TitlePromptInput),
    #[serde(rename = "subtitles")]
    Subtitles(SubtitlePromptInput),
    #[serde(rename = "content")]
    Content(ContentPromptInput),
    #[serde(rename = "thread")]
    Thread { blog_content: String },
}

pub async fn post_generate_route(Json(payload): Json<Value>) -> Result<Json<Value>, BwError> {
    let request: GenerateRequest = serde_json::from_value(payload)?;
    if request.api_key.is_empty() {
        return Err(BwError::input("API 키가 필요합니다."));
    }

    let provider = request.provider;
    let api_key = request.api_key;
    match request.action {
        GenerateAction::Personas { keyword } => {
            let personas = generate_personas(provider, &api_key, &keyword).await?;
            Ok(Json(json!({ "personas": personas })))
        }
        GenerateAction::Titles(input) => {
            let titles = generate_titles(provider, &api_key, &input).await?;
            Ok(Json(json!({ "titles": titles })))
        }
        GenerateAction::Subtitles(input) => {
            let subtitles = generate_subtitles(provider, &api_key, &input).await?;
            Ok(Json(json!({ "subtitles": subtitles })))
        }
        GenerateAction::Content(input) => {
            let content = generate_content(provider, &api_key, &input).await?;
            Ok(Json(json!({ "content": content })))
        }
        GenerateAction::Thread { blog_content } => {
            let thread = generate_thread(provider, &api_key, &blog_content).await?;
            Ok(Json(serde_json::to_value(&thread)?))
        }
    }
}

#[derive(Deserialize)]
pub struct SuggestKeywordsRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
}

pub async fn post_suggest_keywords_route(
    Json(payload): Json<SuggestKeywordsRequest>,
) -> Result<Json<Value>, BwError> {
    if payload.keyword.trim().is_empty() || payload.api_key.is_empty() {
        return Err(BwError::input("키워드와 API 키가 필요합니다."));
    }
    let keywords = suggest_keywords(payload.provider, &payload.api_key, &payload.keyword).await?;
    Ok(Json(json!({ "keywords": keywords })))
}

pub async fn generate_personas(
    provider: Provider,
    api_key: &str,
    keyword: &str,
) -> Result<Vec<String>, BwError> {
    let prompt = prompts::persona_prompt(keyword);
    let raw = ai_gateway::generate(provider, api_key, &prompt, TokenBudget::Short).await?;
    let value = extract_json(&raw).map_err(|_| BwError::extraction("페르소나 생성 실패"))?;
    Ok(normalize_personas(&value))
}

pub async fn generate_titles(
    provider: Provider,
    api_key: &str,
    input: &TitlePromptInput,
) -> Result<Vec<String>, BwError> {
    let prompt = prompts::title_prompt(input);
    let raw = ai_gateway::generate(provider, api_key, &prompt, TokenBudget::Short).await?;
    let value = extract_json(&raw).map_err(|_| BwError::extraction("제목 생성 실패"))?;
    Ok(string_list(&value, "titles"))
}

pub async fn generate_subtitles(
    provider: Provider,
    api_key: &str,
    input: &SubtitlePromptInput,
) -> Result<Vec<String>, BwError> {
    let prompt = prompts::subtitle_prompt(input);
    let raw = ai_gateway::generate(provider, api_key, &prompt, TokenBudget::Short).await?;
    let value = extract_json(&raw).map_err(|_| BwError::extraction("소제목 생성 실패"))?;
    Ok(string_list(&value, "subtitles"))
}

/// Long-form article body. Free-form markdown, used verbatim, no JSON
/// extraction.
pub async fn generate_content(
    provider: Provider,
    api_key: &str,
    input: &ContentPromptInput,
) -> Result<String, BwError> {
    let prompt = prompts::content_prompt(input);
    ai_gateway::generate(provider, api_key, &prompt, TokenBudget::LongForm).await
}

pub async fn generate_thread(
    provider: Provider,
    api_key: &str,
    blog_content: &str,
) -> Result<ThreadContent, BwError> {
    let prompt = prompts::thread_prompt(blog_content);
    let raw = ai_gateway::generate(provider, api_key, &prompt, TokenBudget::Short).await?;
    let value = extract_json(&raw).map_err(|_| BwError::extraction("스레드 변환 실패"))?;
    ThreadContent::from_value(&value)
}

pub async fn suggest_keywords(
    provider: Provider,
    api_key: &str,
    keyword: &str,
) -> Result<Vec<String>, BwError> {
    let prompt = prompts::sub_keyword_prompt(keyword);
    let raw = ai_gateway::generate(provider, api_key, &prompt, TokenBudget::Short).await?;
    let value = extract_json(&raw).map_err(|_| BwError::extraction("응답을 파싱할 수 없습니다."))?;
    Ok(string_list(&value, "keywords"))
}

// Models sometimes return persona objects instead of plain strings; flatten
// them into the "name - situation (emotion)" display form.
fn normalize_personas(value: &Value) -> Vec<String> {
    value
        .get("personas")
        .and_then(Value::as_array)
        .map(|personas| {
            personas
                .iter()
                .map(|persona| match persona {
                    Value::String(text) => text.clone(),
                    other => {
                        let name = other.get("name").and_then(Value::as_str).unwrap_or_default();
                        let situation =
                            other.get("situation").and_then(Value::as_str).unwrap_or_default();
                        let emotion =
                            other.get("emotion").and_then(Value::as_str).unwrap_or_default();
                        format!("{} - {} ({})", name, situation, emotion)
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Gateway-backed generator handed to the wizard; one instance per wizard
/// session, carrying the session's provider selection and credential.
pub struct RelayGenerator {
    pub provider: Provider,
    pub api_key: String,
}

#[async_trait]
impl ContentGenerator for RelayGenerator {
    async fn personas(&self, keyword: &str) -> Result<Vec<String>, BwError> {
        generate_personas(self.provider, &self.api_key, keyword).await
    }

    async fn titles(&self, input: &TitlePromptInput) -> Result<Vec<String>, BwError> {
        generate_titles(self.provider, &self.api_key, input).await
    }

    async fn subtitles(&self, input: &SubtitlePromptInput) -> Result<Vec<String>, BwError> {
        generate_subtitles(self.provider, &self.api_key, input).await
    }

    async fn content(&self, input: &ContentPromptInput) -> Result<String, BwError> {
        generate_content(self.provider, &self.api_key, input).await
    }

    async fn thread(&self, blog_content: &str) -> Result<ThreadContent, BwError> {
        generate_thread(self.provider, &self.api_key, blog_content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::error::ErrorType;

    #[test]
    fn normalize_personas_keeps_plain_strings() {
        let value = serde_json::json!({ "personas": ["아이 키우는 엄마", "예민한 피부의 직장인"] });
        assert_eq!(
            normalize_personas(&value),
            vec!["아이 키우는 엄마".to_string(), "예민한 피부의 직장인".to_string()]
        );
    }

    #[test]
    fn normalize_personas_flattens_object_form() {
        let value = serde_json::json!({
            "personas": [{ "name": "민감성 피부 직장인", "situation": "환절기 트러블", "emotion": "불안" }]
        });
        assert_eq!(
            normalize_personas(&value),
            vec!["민감성 피부 직장인 - 환절기 트러블 (불안)".to_string()]
        );
    }

    #[test]
    fn normalize_personas_missing_field_is_empty() {
        let value = serde_json::json!({ "titles": [] });
        assert!(normalize_personas(&value).is_empty());
    }

    #[test]
    fn generate_request_parses_tagged_action() {
        let payload = serde_json::json!({
            "action": "titles",
            "provider": "gemini",
            "api_key": "gm-key",
            "keyword": "겨울 보습크림",
            "sub_keywords": ["수분크림 추천"],
            "persona": "아이 키우는 엄마",
            "content_ratio": "experience",
            "product_connection": "diary"
        });
        let request: GenerateRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.provider, Provider::Gemini);
        match request.action {
            GenerateAction::Titles(input) => {
                assert_eq!(input.keyword, "겨울 보습크림");
                assert_eq!(input.persona, "아이 키우는 엄마");
            }
            _ => panic!("expected titles action"),
        }
    }

    #[test]
    fn generate_request_rejects_unknown_action() {
        let payload = serde_json::json!({ "action": "poetry", "api_key": "sk" });
        assert!(serde_json::from_value::<GenerateRequest>(payload).is_err());
    }

    #[tokio::test]
    async fn generate_route_requires_api_key() {
        let payload = serde_json::json!({ "action": "personas", "keyword": "겨울 보습크림" });
        let error = post_generate_route(Json(payload)).await.unwrap_err();
        assert_eq!(error.status_code, 400);
        assert_eq!(error.error_type, ErrorType::InputError);
        assert_eq!(error.message, "API 키가 필요합니다.");
    }

    #[tokio::test]
    async fn suggest_keywords_route_requires_keyword_and_key() {
        let payload = SuggestKeywordsRequest {
            keyword: "  ".to_string(),
            provider: Provider::OpenAi,
            api_key: "sk".to_string(),
        };
        let error = post_suggest_keywords_route(Json(payload)).await.unwrap_err();
        assert_eq!(error.status_code, 400);
        assert_eq!(error.message, "키워드와 API 키가 필요합니다.");
    }
}
