use axum::extract::Json;
use serde::{Serialize, Deserialize};

use crate::entities::error::BwError;
use crate::storage::{Store, AI_SETTINGS_SLOT};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Provider {
    #[default]
    #[serde(rename = "chatgpt")]
    OpenAi,
    #[serde(rename = "gemini")]
    Gemini,
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct AiSettings {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub openai_key: String,
    #[serde(default)]
    pub gemini_key: String,
}

impl AiSettings {
    /// Credential for the currently selected provider.
    pub fn active_key(&self) -> &str {
        match self.provider {
            Provider::OpenAi => &self.openai_key,
            Provider::Gemini => &self.gemini_key,
        }
    }

    pub fn load(store: &Store) -> AiSettings {
        store.read_slot(AI_SETTINGS_SLOT).unwrap_or_default()
    }

    pub fn save(&self, store: &Store) -> Result<(), BwError> {
        store.write_slot(AI_SETTINGS_SLOT, self)
    }
}

pub async fn get_settings_route() -> Result<Json<AiSettings>, BwError> {
    let store = Store::from_env();
    Ok(Json(AiSettings::load(&store)))
}

pub async fn put_settings_route(
    Json(settings): Json<AiSettings>,
) -> Result<Json<AiSettings>, BwError> {
    let store = Store::from_env();
    settings.save(&store)?;
    Ok(Json(settings))
}
