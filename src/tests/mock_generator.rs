use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::entities::error::{BwError, ErrorType};
use crate::prompts::{ContentPromptInput, SubtitlePromptInput, TitlePromptInput};
use crate::wizard::assembly::ThreadContent;
use crate::wizard::generator::ContentGenerator;

/// Scripted generator for wizard tests: fixed candidate sets, call
/// counters, and a switchable title failure.
#[derive(Default)]
pub struct MockGenerator {
    persona_calls: AtomicUsize,
    title_calls: AtomicUsize,
    subtitle_calls: AtomicUsize,
    content_calls: AtomicUsize,
    thread_calls: AtomicUsize,
    titles_should_fail: AtomicBool,
}

impl MockGenerator {
    pub fn persona_calls(&self) -> usize {
        self.persona_calls.load(Ordering::SeqCst)
    }

    pub fn title_calls(&self) -> usize {
        self.title_calls.load(Ordering::SeqCst)
    }

    pub fn subtitle_calls(&self) -> usize {
        self.subtitle_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    pub fn thread_calls(&self) -> usize {
        self.thread_calls.load(Ordering::SeqCst)
    }

    pub fn fail_titles(&self, fail: bool) {
        self.titles_should_fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn personas(&self, _keyword: &str) -> Result<Vec<String>, BwError> {
        self.persona_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()])
    }

    async fn titles(&self, _input: &TitlePromptInput) -> Result<Vec<String>, BwError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        if self.titles_should_fail.load(Ordering::SeqCst) {
            return Err(BwError::new(
                500,
                ErrorType::UpstreamError,
                "제목 생성 실패".to_string(),
            ));
        }
        Ok(vec!["제목1".to_string(), "제목2".to_string(), "제목3".to_string()])
    }

    async fn subtitles(&self, _input: &SubtitlePromptInput) -> Result<Vec<String>, BwError> {
        self.subtitle_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            "건조해지는 이유".to_string(),
            "보습크림 바르는 방법".to_string(),
            "사용할 때 주의사항".to_string(),
            "추천하는 제품".to_string(),
        ])
    }

    async fn content(&self, input: &ContentPromptInput) -> Result<String, BwError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("겨울마다 고민이던 {} 이야기를 풀어봅니다.\n\n[사진: 제품 사용 모습]", input.keyword))
    }

    async fn thread(&self, _blog_content: &str) -> Result<ThreadContent, BwError> {
        self.thread_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ThreadContent {
            main: "겨울 보습, 이거 하나로 끝냈다".to_string(),
            comments: vec![
                "아침 저녁으로 한 번씩만 발라도 충분해".to_string(),
                "성분표 확인하는 법은 본문에 정리했어".to_string(),
                "세일 정보는 프로필 링크 참고".to_string(),
            ],
        })
    }
}
