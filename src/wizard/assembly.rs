use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::entities::error::BwError;
use crate::prompts::ContentPromptInput;
use crate::wizard::generator::ContentGenerator;

/// Completed long-form article. Session-scoped; each wizard run replaces the
/// previous one.
#[derive(Serialize, Clone, Debug)]
pub struct GeneratedContent {
    pub title: String,
    pub body: String,
}

/// Short-form social adaptation of one article.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ThreadContent {
    pub main: String,
    pub comments: Vec<String>,
}

impl ThreadContent {
    pub fn from_value(value: &Value) -> Result<ThreadContent, BwError> {
        let main = value
            .get("main")
            .and_then(Value::as_str)
            .filter(|main| !main.is_empty())
            .ok_or_else(|| BwError::extraction("스레드 변환 실패"))?;
        let comments = value
            .get("comments")
            .and_then(Value::as_array)
            .ok_or_else(|| BwError::extraction("스레드 변환 실패"))?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        Ok(ThreadContent { main: main.to_string(), comments })
    }
}

/// Final wizard transition: one long-form generation using every
/// accumulated selection. The body is the raw markdown verbatim; a gateway
/// failure fails the whole operation, partial text is never salvaged.
pub async fn assemble_article<G: ContentGenerator + ?Sized>(
    generator: &G,
    input: &ContentPromptInput,
) -> Result<GeneratedContent, BwError> {
    let body = generator.content(input).await?;
    Ok(GeneratedContent { title: input.title.clone(), body })
}

pub async fn convert_to_thread<G: ContentGenerator + ?Sized>(
    generator: &G,
    content: &GeneratedContent,
) -> Result<ThreadContent, BwError> {
    let blog_content = format!("{}\n\n{}", content.title, content.body);
    generator.thread(&blog_content).await
}
