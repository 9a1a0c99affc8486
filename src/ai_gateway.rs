use std::time::Duration;

use tracing::warn;

use crate::entities::error::{BwError, ErrorType};
use crate::entities::settings::Provider;
use crate::environment;

pub mod gemini;
pub mod openai;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

const GEMINI_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Generation length cap, resolved per provider at the call site.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenBudget {
    Short,
    LongForm,
}

impl TokenBudget {
    fn openai_max_tokens(self) -> u32 {
        match self {
            TokenBudget::Short => 4000,
            TokenBudget::LongForm => 8000,
        }
    }
}

/// Provider call failure, before it is flattened into a BwError. Transport
/// failures and upstream 5xx are retried once; everything else propagates.
#[derive(Debug)]
pub struct CallError {
    pub status: Option<u16>,
    pub message: String,
}

impl CallError {
    pub fn upstream(status: u16, message: String) -> CallError {
        CallError { status: Some(status), message }
    }

    pub fn transport(message: String) -> CallError {
        CallError { status: None, message }
    }

    fn retryable(&self) -> bool {
        self.status.map_or(true, |status| status >= 500)
    }
}

impl From<reqwest::Error> for CallError {
    fn from(error: reqwest::Error) -> CallError {
        CallError {
            status: error.status().map(|status| status.as_u16()),
            message: format!("request failed: {}", error),
        }
    }
}

pub async fn generate(
    provider: Provider,
    api_key: &str,
    prompt: &str,
    budget: TokenBudget,
) -> Result<String, BwError> {
    let base_url = match provider {
        Provider::OpenAi => environment::get_openai_api_base_url(),
        Provider::Gemini => environment::get_gemini_api_base_url(),
    };
    generate_with_base(provider, &base_url, api_key, prompt, budget).await
}

pub async fn generate_with_base(
    provider: Provider,
    base_url: &str,
    api_key: &str,
    prompt: &str,
    budget: TokenBudget,
) -> Result<String, BwError> {
    match call(provider, base_url, api_key, prompt, budget).await {
        Ok(text) => Ok(text),
        Err(error) if error.retryable() => {
            warn!(status = ?error.status, message = %error.message, "generation call failed, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
            call(provider, base_url, api_key, prompt, budget)
                .await
                .map_err(upstream_error)
        }
        Err(error) => Err(upstream_error(error)),
    }
}

async fn call(
    provider: Provider,
    base_url: &str,
    api_key: &str,
    prompt: &str,
    budget: TokenBudget,
) -> Result<String, CallError> {
    match provider {
        Provider::OpenAi => {
            openai::call_openai(base_url, api_key, prompt, budget.openai_max_tokens()).await
        }
        Provider::Gemini => {
            gemini::call_gemini(base_url, api_key, prompt, GEMINI_MAX_OUTPUT_TOKENS).await
        }
    }
}

fn upstream_error(error: CallError) -> BwError {
    BwError::new(500, ErrorType::UpstreamError, error.message)
}
