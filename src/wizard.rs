pub mod assembly;
pub mod driver;
pub mod generator;
pub mod state;

pub use assembly::{assemble_article, convert_to_thread, GeneratedContent, ThreadContent};
pub use driver::WizardDriver;
pub use generator::ContentGenerator;
pub use state::{AdvanceOutcome, GenerationOutcome, WizardSelections, WizardSession, WizardStep};
