//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::completion::message::{AssistantContent, Message};
use tracing::debug;

use crate::error::LlmError;

use super::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

/// A request split into the pieces rig's builder wants.
#[derive(Debug)]
struct RigParts {
    preamble: Option<String>,
    prompt: String,
}

/// System messages become the preamble, user messages the prompt.
fn split_messages(messages: Vec<ChatMessage>) -> Result<RigParts, String> {
    let mut system = Vec::new();
    let mut user = Vec::new();
    for message in messages {
        match message.role {
            Role::System => system.push(message.content),
            Role::User => user.push(message.content),
        }
    }

    if user.is_empty() {
        return Err("request has no user message".into());
    }

    Ok(RigParts {
        preamble: (!system.is_empty()).then(|| system.join("\n\n")),
        prompt: user.join("\n\n"),
    })
}

/// Concatenate the text parts of a completion. No text at all is an empty
/// string, not an error.
fn assistant_text<'a>(parts: impl IntoIterator<Item = &'a AssistantContent>) -> String {
    parts
        .into_iter()
        .filter_map(|part| match part {
            AssistantContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let parts = split_messages(request.messages).map_err(|reason| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason,
        })?;

        let mut builder = self.model.completion_request(Message::user(parts.prompt));
        if let Some(preamble) = parts.preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content = assistant_text(response.choice.iter());
        debug!(
            model = %self.model_name,
            chars = content.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Completion received"
        );

        Ok(CompletionResponse {
            content,
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_moves_system_into_preamble() {
        let parts = split_messages(vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("classify this"),
        ])
        .unwrap();

        assert_eq!(parts.preamble.as_deref(), Some("be terse"));
        assert_eq!(parts.prompt, "classify this");
    }

    #[test]
    fn split_without_system_has_no_preamble() {
        let parts = split_messages(vec![ChatMessage::user("only the email")]).unwrap();
        assert!(parts.preamble.is_none());
        assert_eq!(parts.prompt, "only the email");
    }

    #[test]
    fn split_rejects_missing_user_turn() {
        assert!(split_messages(vec![ChatMessage::system("only rules")]).is_err());
        assert!(split_messages(vec![]).is_err());
    }

    #[test]
    fn no_text_parts_is_empty_content() {
        let parts: Vec<AssistantContent> = Vec::new();
        assert_eq!(assistant_text(parts.iter()), "");
    }
}
