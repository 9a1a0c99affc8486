use async_trait::async_trait;

use crate::entities::error::BwError;
use crate::prompts::{ContentPromptInput, SubtitlePromptInput, TitlePromptInput};
use crate::wizard::assembly::ThreadContent;

/// Everything the wizard asks of the generation relay. The production
/// implementation goes through the provider gateway; tests substitute a
/// scripted one.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn personas(&self, keyword: &str) -> Result<Vec<String>, BwError>;
    async fn titles(&self, input: &TitlePromptInput) -> Result<Vec<String>, BwError>;
    async fn subtitles(&self, input: &SubtitlePromptInput) -> Result<Vec<String>, BwError>;
    async fn content(&self, input: &ContentPromptInput) -> Result<String, BwError>;
    async fn thread(&self, blog_content: &str) -> Result<ThreadContent, BwError>;
}
