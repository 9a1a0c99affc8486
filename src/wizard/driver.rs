use tracing::info;

use crate::entities::error::BwError;
use crate::wizard::generator::ContentGenerator;
use crate::wizard::state::{
    AdvanceOutcome, GenerationIntent, GenerationOutcome, WizardSelections, WizardSession,
};

/// Wires the session state machine to a generator. Each user-visible
/// operation resolves fully before returning: the step's generation is
/// issued, awaited, and applied (or discarded as stale) in place.
pub struct WizardDriver<G: ContentGenerator> {
    session: WizardSession,
    generator: G,
}

impl<G: ContentGenerator> WizardDriver<G> {
    pub fn new(session: WizardSession, generator: G) -> WizardDriver<G> {
        WizardDriver { session, generator }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut WizardSession {
        &mut self.session
    }

    /// Runs the current step's entry action, if it has one pending.
    pub async fn run_entry_action(&mut self) -> Result<(), BwError> {
        let Some(pending) = self.session.entry_request() else {
            return Ok(());
        };
        let result = match pending.intent {
            GenerationIntent::Personas => {
                let keyword = self.session.keyword().to_string();
                self.generator.personas(&keyword).await.map(GenerationOutcome::Personas)
            }
            GenerationIntent::Titles => {
                let input = self.session.title_input();
                self.generator.titles(&input).await.map(GenerationOutcome::Titles)
            }
            GenerationIntent::Subtitles => {
                let input = self.session.subtitle_input();
                self.generator.subtitles(&input).await.map(GenerationOutcome::Subtitles)
            }
        };
        match result {
            Ok(outcome) => {
                if !self.session.apply(pending.token, outcome) {
                    info!(token = pending.token, "stale generation result discarded");
                }
                Ok(())
            }
            Err(error) => {
                self.session.fail(pending.token);
                Err(error)
            }
        }
    }

    /// First entry into the wizard: triggers the persona generation.
    pub async fn begin(&mut self) -> Result<(), BwError> {
        self.run_entry_action().await
    }

    /// Advances one step and runs the new step's entry action. Returns the
    /// full selections once the final step completes.
    pub async fn advance(&mut self) -> Result<Option<WizardSelections>, BwError> {
        match self.session.advance()? {
            AdvanceOutcome::Completed(selections) => Ok(Some(selections)),
            AdvanceOutcome::Moved(_) => {
                self.run_entry_action().await?;
                Ok(None)
            }
        }
    }

    pub fn back(&mut self) -> bool {
        self.session.back()
    }

    pub async fn regenerate(&mut self) -> Result<(), BwError> {
        self.session.regenerate();
        self.run_entry_action().await
    }
}
