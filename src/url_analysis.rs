use axum::extract::Json;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai_gateway::{self, TokenBudget, REQUEST_TIMEOUT};
use crate::entities::error::{BwError, ErrorType};
use crate::entities::settings::Provider;
use crate::json_extract::extract_json;
use crate::prompts;

mod page_text;

const PAGE_CONTENT_LIMIT: usize = 5000;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
pub struct AnalyzeUrlRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UrlAnalysis {
    pub summary: String,
    pub selling_points: Vec<String>,
}

pub async fn post_analyze_url_route(
    Json(payload): Json<AnalyzeUrlRequest>,
) -> Result<Json<UrlAnalysis>, BwError> {
    if payload.url.trim().is_empty() || payload.api_key.is_empty() {
        return Err(BwError::input("URL과 API 키가 필요합니다."));
    }
    let analysis = analyze_url(&payload.url, payload.provider, &payload.api_key).await?;
    Ok(Json(analysis))
}

pub async fn analyze_url(
    url: &str,
    provider: Provider,
    api_key: &str,
) -> Result<UrlAnalysis, BwError> {
    let html = fetch_page_html(url).await?;
    let page_content = page_text::extract_page_text(&html, PAGE_CONTENT_LIMIT);
    if page_content.is_empty() {
        return Err(BwError::input("페이지 내용을 추출할 수 없습니다."));
    }

    let prompt = prompts::url_analysis_prompt(&page_content);
    let raw = ai_gateway::generate(provider, api_key, &prompt, TokenBudget::Short).await?;
    let value =
        extract_json(&raw).map_err(|_| BwError::extraction("분석 결과를 파싱할 수 없습니다."))?;

    Ok(UrlAnalysis {
        summary: value
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        selling_points: value
            .get("sellingPoints")
            .and_then(Value::as_array)
            .map(|points| {
                points
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

pub async fn fetch_page_html(url: &str) -> Result<String, BwError> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(fetch_error)?;

    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, BROWSER_USER_AGENT.parse().unwrap());
    headers.insert(
        header::ACCEPT,
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
            .parse()
            .unwrap(),
    );

    let response = client
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(fetch_error)?;
    response.text().await.map_err(fetch_error)
}

fn fetch_error(error: reqwest::Error) -> BwError {
    tracing::warn!(error = %error, "page fetch failed");
    BwError::new(400, ErrorType::FetchError, "URL 페이지를 가져올 수 없습니다.".to_string())
}
