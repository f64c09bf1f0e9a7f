//! Classification orchestrator.
//!
//! Flow:
//! 1. Trim input → empty short-circuits with an input error (no LLM call)
//! 2. Credential check → missing provider is a configuration fault
//! 3. Prompt + LLM call (low temperature, bounded by a timeout, no retry)
//! 4. Lenient completion parsing → always a valid result

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{ClassifyError, ConfigError, LlmError};
use crate::llm::{self, ChatMessage, CompletionRequest, LlmProvider};

use super::parser;
use super::prompt::{self, PROMPT_VERSION};
use super::types::Classification;

/// Message returned to callers that supplied no usable text.
pub const EMPTY_INPUT_MESSAGE: &str = "Nenhum texto foi fornecido.";

/// Temperature for classification (near-deterministic).
const CLASSIFY_TEMPERATURE: f32 = 0.1;

/// Max tokens for the classification call. The expected answer is one line.
const CLASSIFY_MAX_TOKENS: u32 = 256;

/// Classifies inbound emails with an LLM.
pub struct Classifier {
    llm: Option<Arc<dyn LlmProvider>>,
    /// Reported when `llm` is `None`.
    credential_var: &'static str,
    timeout: Duration,
}

impl Classifier {
    /// Create a classifier backed by `llm`.
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            llm: Some(llm),
            credential_var: "",
            timeout,
        }
    }

    /// A classifier whose credential was never configured. Every call to
    /// [`Classifier::classify`] with non-empty text fails with
    /// [`ClassifyError::Config`].
    pub fn unconfigured(credential_var: &'static str, timeout: Duration) -> Self {
        Self {
            llm: None,
            credential_var,
            timeout,
        }
    }

    /// Build the classifier described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        match config.llm_config() {
            Some(llm_config) => {
                let provider = llm::create_provider(&llm_config)?;
                Ok(Self::new(provider, config.llm_timeout))
            }
            None => Ok(Self::unconfigured(
                config.backend.api_key_var(),
                config.llm_timeout,
            )),
        }
    }

    /// Whether an LLM credential is available.
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Classify one email body.
    pub async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClassifyError::Input(EMPTY_INPUT_MESSAGE.to_string()));
        }

        let llm = self.llm.as_ref().ok_or_else(|| {
            ClassifyError::Config(ConfigError::MissingEnvVar(self.credential_var.to_string()))
        })?;

        let prompt = prompt::build(text);
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompt.system),
            ChatMessage::user(prompt.user),
        ])
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_max_tokens(CLASSIFY_MAX_TOKENS);

        debug!(
            model = llm.model_name(),
            prompt_version = PROMPT_VERSION,
            chars = text.chars().count(),
            "Requesting classification"
        );

        let response = tokio::time::timeout(self.timeout, llm.complete(request))
            .await
            .map_err(|_| LlmError::Timeout {
                provider: llm.model_name().to_string(),
                timeout: self.timeout,
            })??;

        let result = parser::parse(&response.content);
        info!(
            model = llm.model_name(),
            category = %result.category,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Email classified"
        );

        Ok(Classification::from_llm(result))
    }
}
