use serde::Serialize;
use tracing::warn;

use crate::entities::error::BwError;
use crate::entities::settings::AiSettings;
use crate::prompts::{
    ContentPromptInput, ContentRatio, ProductConnection, SubtitlePromptInput, TitlePromptInput,
};

/// The five wizard steps, in strict forward order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WizardStep {
    Persona,
    ContentRatio,
    ProductConnection,
    Title,
    Subtitles,
}

impl WizardStep {
    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Persona => Some(WizardStep::ContentRatio),
            WizardStep::ContentRatio => Some(WizardStep::ProductConnection),
            WizardStep::ProductConnection => Some(WizardStep::Title),
            WizardStep::Title => Some(WizardStep::Subtitles),
            WizardStep::Subtitles => None,
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Persona => None,
            WizardStep::ContentRatio => Some(WizardStep::Persona),
            WizardStep::ProductConnection => Some(WizardStep::ContentRatio),
            WizardStep::Title => Some(WizardStep::ProductConnection),
            WizardStep::Subtitles => Some(WizardStep::Title),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GenerationIntent {
    Personas,
    Titles,
    Subtitles,
}

/// Handle for one issued generation request. Results are applied back
/// through the token; anything stale is discarded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingGeneration {
    pub token: u64,
    pub step: WizardStep,
    pub intent: GenerationIntent,
}

pub enum GenerationOutcome {
    Personas(Vec<String>),
    Titles(Vec<String>),
    Subtitles(Vec<String>),
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct WizardSelections {
    pub persona: Option<String>,
    pub content_ratio: ContentRatio,
    pub product_connection: ProductConnection,
    pub title: Option<String>,
    pub subtitles: Vec<String>,
}

#[derive(Debug)]
pub enum AdvanceOutcome {
    Moved(WizardStep),
    Completed(WizardSelections),
}

/// Wizard session state machine. One per drafting run: accumulates the five
/// selections, issues at most one generation request at a time, and is torn
/// down (terminal) once the final step completes.
#[derive(Debug)]
pub struct WizardSession {
    keyword: String,
    sub_keywords: Vec<String>,
    product_info: String,
    selling_points: Vec<String>,
    step: WizardStep,
    finished: bool,
    selections: WizardSelections,
    persona_candidates: Vec<String>,
    title_candidates: Vec<String>,
    pending: Option<PendingGeneration>,
    next_token: u64,
}

impl WizardSession {
    pub fn start(
        keyword: &str,
        sub_keywords: Vec<String>,
        product_info: String,
        selling_points: Vec<String>,
        settings: &AiSettings,
    ) -> Result<WizardSession, BwError> {
        if settings.active_key().is_empty() {
            return Err(BwError::input("API 키를 먼저 설정해주세요."));
        }
        if keyword.trim().is_empty() {
            return Err(BwError::input("키워드를 입력해주세요."));
        }
        Ok(WizardSession {
            keyword: keyword.trim().to_string(),
            sub_keywords,
            product_info,
            selling_points,
            step: WizardStep::Persona,
            finished: false,
            selections: WizardSelections::default(),
            persona_candidates: Vec::new(),
            title_candidates: Vec::new(),
            pending: None,
            next_token: 0,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn selections(&self) -> &WizardSelections {
        &self.selections
    }

    pub fn persona_candidates(&self) -> &[String] {
        &self.persona_candidates
    }

    pub fn title_candidates(&self) -> &[String] {
        &self.title_candidates
    }

    /// Entry action of the current step. Returns the request to issue when
    /// the step owns a generation and its data is absent; `None` while a
    /// request is already in flight, so re-entering a loading step never
    /// issues a duplicate.
    pub fn entry_request(&mut self) -> Option<PendingGeneration> {
        if self.finished || self.pending.is_some() {
            return None;
        }
        let intent = match self.step {
            WizardStep::Persona if self.persona_candidates.is_empty() => {
                GenerationIntent::Personas
            }
            WizardStep::Title if self.title_candidates.is_empty() => GenerationIntent::Titles,
            WizardStep::Subtitles if self.selections.subtitles.is_empty() => {
                GenerationIntent::Subtitles
            }
            _ => return None,
        };
        self.next_token += 1;
        let pending = PendingGeneration { token: self.next_token, step: self.step, intent };
        self.pending = Some(pending);
        Some(pending)
    }

    /// Applies a generation result. Returns false when the result is stale:
    /// the wizard moved off the issuing step, regenerated, or never issued
    /// this token. Stale results are discarded without touching state.
    pub fn apply(&mut self, token: u64, outcome: GenerationOutcome) -> bool {
        let Some(pending) = self.pending else {
            warn!(token, "discarding generation result with no pending request");
            return false;
        };
        if pending.token != token {
            warn!(token, "discarding generation result with superseded token");
            return false;
        }
        self.pending = None;
        if pending.step != self.step {
            warn!(token, "discarding generation result issued on another step");
            return false;
        }
        match outcome {
            GenerationOutcome::Personas(personas) => self.persona_candidates = personas,
            GenerationOutcome::Titles(titles) => self.title_candidates = titles,
            GenerationOutcome::Subtitles(subtitles) => self.selections.subtitles = subtitles,
        }
        true
    }

    /// Clears the loading flag after a failed generation, leaving prior
    /// state untouched so the user can retry manually.
    pub fn fail(&mut self, token: u64) {
        if self.pending.map_or(false, |pending| pending.token == token) {
            self.pending = None;
        }
    }

    pub fn select_persona(&mut self, persona: &str) {
        self.set_persona(Some(persona.to_string()));
    }

    pub fn set_custom_persona(&mut self, persona: &str) {
        let trimmed = persona.trim();
        self.set_persona(if trimmed.is_empty() { None } else { Some(trimmed.to_string()) });
    }

    fn set_persona(&mut self, persona: Option<String>) {
        if self.selections.persona == persona {
            return;
        }
        self.selections.persona = persona;
        self.invalidate_downstream(WizardStep::Persona);
    }

    pub fn select_content_ratio(&mut self, ratio: ContentRatio) {
        if self.selections.content_ratio == ratio {
            return;
        }
        self.selections.content_ratio = ratio;
        self.invalidate_downstream(WizardStep::ContentRatio);
    }

    pub fn select_product_connection(&mut self, connection: ProductConnection) {
        if self.selections.product_connection == connection {
            return;
        }
        self.selections.product_connection = connection;
        self.invalidate_downstream(WizardStep::ProductConnection);
    }

    pub fn select_title(&mut self, title: &str) {
        if self.selections.title.as_deref() == Some(title) {
            return;
        }
        self.selections.title = Some(title.to_string());
        self.invalidate_downstream(WizardStep::Title);
    }

    // A changed upstream selection invalidates everything generated after
    // it; titles depend on steps 1-3 and subtitles on steps 1-4.
    fn invalidate_downstream(&mut self, changed: WizardStep) {
        match changed {
            WizardStep::Persona | WizardStep::ContentRatio | WizardStep::ProductConnection => {
                self.title_candidates.clear();
                self.selections.title = None;
                self.selections.subtitles.clear();
            }
            WizardStep::Title => {
                self.selections.subtitles.clear();
            }
            WizardStep::Subtitles => {}
        }
    }

    /// Advance guard: a pure function of the current step's populated
    /// fields, plus the loading flag (a suspended step blocks advancement).
    pub fn can_advance(&self) -> bool {
        if self.finished || self.pending.is_some() {
            return false;
        }
        match self.step {
            WizardStep::Persona => {
                self.selections.persona.as_deref().map_or(false, |persona| !persona.is_empty())
            }
            WizardStep::ContentRatio | WizardStep::ProductConnection => true,
            WizardStep::Title => self.selections.title.is_some(),
            WizardStep::Subtitles => !self.selections.subtitles.is_empty(),
        }
    }

    pub fn advance(&mut self) -> Result<AdvanceOutcome, BwError> {
        if !self.can_advance() {
            return Err(BwError::input("현재 단계를 먼저 완료해주세요."));
        }
        match self.step.next() {
            Some(next_step) => {
                self.step = next_step;
                Ok(AdvanceOutcome::Moved(next_step))
            }
            None => {
                self.finished = true;
                Ok(AdvanceOutcome::Completed(self.selections.clone()))
            }
        }
    }

    /// Backward navigation keeps every forward step's data; re-advancing
    /// does not force regeneration.
    pub fn back(&mut self) -> bool {
        if self.finished {
            return false;
        }
        match self.step.previous() {
            Some(previous_step) => {
                self.step = previous_step;
                true
            }
            None => false,
        }
    }

    /// Discards the current step's candidates and own selection, nothing
    /// else. Any in-flight request for this step becomes stale.
    pub fn regenerate(&mut self) {
        if self.finished {
            return;
        }
        self.pending = None;
        match self.step {
            WizardStep::Persona => {
                self.persona_candidates.clear();
                self.selections.persona = None;
            }
            WizardStep::Title => {
                self.title_candidates.clear();
                self.selections.title = None;
            }
            WizardStep::Subtitles => {
                self.selections.subtitles.clear();
            }
            WizardStep::ContentRatio | WizardStep::ProductConnection => {}
        }
    }

    /// Full reset back to step 1; the only way to reuse a finished wizard.
    pub fn restart(&mut self) {
        self.step = WizardStep::Persona;
        self.finished = false;
        self.selections = WizardSelections::default();
        self.persona_candidates.clear();
        self.title_candidates.clear();
        self.pending = None;
    }

    pub fn title_input(&self) -> TitlePromptInput {
        TitlePromptInput {
            keyword: self.keyword.clone(),
            sub_keywords: self.sub_keywords.clone(),
            product_info: self.product_info.clone(),
            persona: self.selections.persona.clone().unwrap_or_default(),
            content_ratio: self.selections.content_ratio,
            product_connection: self.selections.product_connection,
        }
    }

    pub fn subtitle_input(&self) -> SubtitlePromptInput {
        SubtitlePromptInput {
            keyword: self.keyword.clone(),
            sub_keywords: self.sub_keywords.clone(),
            persona: self.selections.persona.clone().unwrap_or_default(),
            content_ratio: self.selections.content_ratio,
            product_connection: self.selections.product_connection,
            title: self.selections.title.clone().unwrap_or_default(),
        }
    }

    pub fn content_input(&self) -> Result<ContentPromptInput, BwError> {
        let title = self
            .selections
            .title
            .clone()
            .ok_or_else(|| BwError::input("제목을 먼저 선택해주세요."))?;
        Ok(ContentPromptInput {
            title,
            keyword: self.keyword.clone(),
            sub_keywords: self.sub_keywords.clone(),
            persona: self.selections.persona.clone().unwrap_or_default(),
            content_ratio: self.selections.content_ratio,
            product_connection: self.selections.product_connection,
            product_info: self.product_info.clone(),
            selling_points: self.selling_points.clone(),
            subtitles: self.selections.subtitles.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::error::ErrorType;
    use crate::entities::settings::Provider;

    fn settings_with_key() -> AiSettings {
        AiSettings {
            provider: Provider::OpenAi,
            openai_key: "sk-test".to_string(),
            gemini_key: String::new(),
        }
    }

    fn started_session() -> WizardSession {
        WizardSession::start(
            "겨울 보습크림",
            vec!["수분크림 추천".to_string()],
            "상품명: 보습크림".to_string(),
            vec!["세라마이드 함유".to_string()],
            &settings_with_key(),
        )
        .unwrap()
    }

    fn four_personas() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()]
    }

    // Drives a fresh session to the Title step with persona "A" selected.
    fn session_at_title_step() -> WizardSession {
        let mut session = started_session();
        let pending = session.entry_request().unwrap();
        session.apply(pending.token, GenerationOutcome::Personas(four_personas()));
        session.select_persona("A");
        session.advance().unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        session
    }

    #[test]
    fn start_without_credential_is_an_input_error() {
        let settings = AiSettings::default();
        let error = WizardSession::start("겨울 보습크림", vec![], String::new(), vec![], &settings)
            .unwrap_err();
        assert_eq!(error.error_type, ErrorType::InputError);
        assert_eq!(error.message, "API 키를 먼저 설정해주세요.");
    }

    #[test]
    fn start_without_keyword_is_an_input_error() {
        let error =
            WizardSession::start("   ", vec![], String::new(), vec![], &settings_with_key())
                .unwrap_err();
        assert_eq!(error.message, "키워드를 입력해주세요.");
    }

    #[test]
    fn persona_step_requests_generation_once() {
        let mut session = started_session();
        let pending = session.entry_request().unwrap();
        assert_eq!(pending.intent, GenerationIntent::Personas);
        assert!(session.is_loading());

        // Re-entering the loading step must not issue a duplicate.
        assert!(session.entry_request().is_none());
    }

    #[test]
    fn selecting_a_generated_persona_allows_advancing() {
        let mut session = started_session();
        let pending = session.entry_request().unwrap();
        assert!(session.apply(pending.token, GenerationOutcome::Personas(four_personas())));
        assert_eq!(session.persona_candidates().len(), 4);

        assert!(!session.can_advance());
        session.select_persona("A");
        assert!(session.can_advance());

        match session.advance().unwrap() {
            AdvanceOutcome::Moved(step) => assert_eq!(step, WizardStep::ContentRatio),
            AdvanceOutcome::Completed(_) => panic!("wizard should not complete yet"),
        }
        assert_eq!(session.selections().persona.as_deref(), Some("A"));
    }

    #[test]
    fn empty_custom_persona_does_not_satisfy_the_guard() {
        let mut session = started_session();
        let pending = session.entry_request().unwrap();
        session.apply(pending.token, GenerationOutcome::Personas(four_personas()));

        session.set_custom_persona("   ");
        assert!(!session.can_advance());
        session.set_custom_persona("첫 출산을 앞둔 예비맘");
        assert!(session.can_advance());
    }

    #[test]
    fn advance_is_rejected_while_guard_is_unsatisfied() {
        let mut session = started_session();
        let pending = session.entry_request().unwrap();
        session.apply(pending.token, GenerationOutcome::Personas(four_personas()));

        let error = session.advance().unwrap_err();
        assert_eq!(error.error_type, ErrorType::InputError);
        assert_eq!(session.step(), WizardStep::Persona);
    }

    #[test]
    fn failed_generation_clears_loading_and_keeps_state() {
        let mut session = session_at_title_step();
        let pending = session.entry_request().unwrap();
        assert_eq!(pending.intent, GenerationIntent::Titles);

        session.fail(pending.token);
        assert!(!session.is_loading());
        assert!(session.title_candidates().is_empty());
        assert!(!session.can_advance());
        assert_eq!(session.selections().persona.as_deref(), Some("A"));

        // The wizard stays usable: a manual retry issues a fresh request.
        assert!(session.entry_request().is_some());
    }

    #[test]
    fn stale_result_after_navigating_back_is_discarded() {
        let mut session = session_at_title_step();
        let pending = session.entry_request().unwrap();

        assert!(session.back());
        assert_eq!(session.step(), WizardStep::ProductConnection);

        let applied = session.apply(
            pending.token,
            GenerationOutcome::Titles(vec!["제목1".to_string()]),
        );
        assert!(!applied);
        assert!(session.title_candidates().is_empty());
        assert!(!session.is_loading());
    }

    #[test]
    fn regenerate_clears_only_the_owning_step() {
        let mut session = session_at_title_step();
        let pending = session.entry_request().unwrap();
        session.apply(
            pending.token,
            GenerationOutcome::Titles(vec!["제목1".to_string(), "제목2".to_string()]),
        );
        session.select_title("제목1");

        session.regenerate();
        assert!(session.title_candidates().is_empty());
        assert!(session.selections().title.is_none());
        assert_eq!(session.selections().persona.as_deref(), Some("A"));
        assert_eq!(session.persona_candidates().len(), 4);
    }

    #[test]
    fn regenerate_supersedes_an_in_flight_request() {
        let mut session = session_at_title_step();
        let stale = session.entry_request().unwrap();

        session.regenerate();
        let fresh = session.entry_request().unwrap();
        assert_ne!(stale.token, fresh.token);

        assert!(!session.apply(stale.token, GenerationOutcome::Titles(vec!["옛 제목".to_string()])));
        assert!(session.apply(fresh.token, GenerationOutcome::Titles(vec!["새 제목".to_string()])));
        assert_eq!(session.title_candidates(), ["새 제목".to_string()]);
    }

    #[test]
    fn changing_an_upstream_selection_invalidates_downstream_steps() {
        let mut session = session_at_title_step();
        let pending = session.entry_request().unwrap();
        session.apply(
            pending.token,
            GenerationOutcome::Titles(vec!["제목1".to_string()]),
        );
        session.select_title("제목1");
        session.advance().unwrap();
        let pending = session.entry_request().unwrap();
        session.apply(
            pending.token,
            GenerationOutcome::Subtitles(vec!["소제목1".to_string(); 4]),
        );

        session.back();
        session.back();
        session.back();
        session.back();
        assert_eq!(session.step(), WizardStep::Persona);
        session.select_persona("B");

        assert!(session.title_candidates().is_empty());
        assert!(session.selections().title.is_none());
        assert!(session.selections().subtitles.is_empty());
    }

    #[test]
    fn re_advancing_without_changes_keeps_forward_data() {
        let mut session = session_at_title_step();
        let pending = session.entry_request().unwrap();
        session.apply(
            pending.token,
            GenerationOutcome::Titles(vec!["제목1".to_string()]),
        );
        session.select_title("제목1");

        session.back();
        session.back();
        assert_eq!(session.step(), WizardStep::ContentRatio);
        session.select_persona("A"); // unchanged value
        session.advance().unwrap();
        session.advance().unwrap();

        assert_eq!(session.step(), WizardStep::Title);
        assert_eq!(session.title_candidates(), ["제목1".to_string()]);
        assert_eq!(session.selections().title.as_deref(), Some("제목1"));
        // Data already present: no regeneration is forced.
        assert!(session.entry_request().is_none());
    }

    #[test]
    fn completing_the_final_step_emits_all_selections() {
        let mut session = session_at_title_step();
        let pending = session.entry_request().unwrap();
        session.apply(
            pending.token,
            GenerationOutcome::Titles(vec!["제목1".to_string()]),
        );
        session.select_title("제목1");
        session.advance().unwrap();

        let pending = session.entry_request().unwrap();
        assert_eq!(pending.intent, GenerationIntent::Subtitles);
        let subtitles = vec![
            "건조해지는 이유".to_string(),
            "보습크림 바르는 방법".to_string(),
            "주의사항".to_string(),
            "추천 제품".to_string(),
        ];
        session.apply(pending.token, GenerationOutcome::Subtitles(subtitles.clone()));

        match session.advance().unwrap() {
            AdvanceOutcome::Completed(selections) => {
                assert_eq!(selections.persona.as_deref(), Some("A"));
                assert_eq!(selections.title.as_deref(), Some("제목1"));
                assert_eq!(selections.subtitles, subtitles);
            }
            AdvanceOutcome::Moved(_) => panic!("final advance should complete the wizard"),
        }
        assert!(session.is_finished());
        assert!(session.advance().is_err());
        assert!(!session.back());
    }

    #[test]
    fn restart_clears_every_step() {
        let mut session = session_at_title_step();
        session.restart();
        assert_eq!(session.step(), WizardStep::Persona);
        assert!(session.persona_candidates().is_empty());
        assert!(session.selections().persona.is_none());
        assert!(!session.is_finished());
    }

    #[test]
    fn back_is_rejected_on_the_first_step() {
        let mut session = started_session();
        assert!(!session.back());
        assert_eq!(session.step(), WizardStep::Persona);
    }

    #[test]
    fn prompt_inputs_normalize_missing_fields_to_empty_strings() {
        let session = started_session();
        let input = session.title_input();
        assert_eq!(input.persona, "");
        assert_eq!(input.keyword, "겨울 보습크림");

        let input = session.subtitle_input();
        assert_eq!(input.title, "");

        assert!(session.content_input().is_err());
    }
}
