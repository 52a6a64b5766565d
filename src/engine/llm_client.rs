use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CompletionConfig;
use crate::engine::conversation::Conversation;
use crate::model::message::Message;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion response had no message content")]
    EmptyResponse,
}

/// Fixed per-call parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: 0.5,
            max_tokens: 1000,
        }
    }
}

impl From<&CompletionConfig> for CompletionParams {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: Option<String>,
}

/// Anything that can turn a message history into the next assistant reply.
pub trait CompletionBackend {
    fn create(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, CompletionError>;

    /// Short human-readable status of the endpoint.
    fn test_connection(&self) -> Result<String, CompletionError>;
}

/// OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

impl CompletionBackend for OpenAiClient {
    fn create(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, CompletionError> {
        let req = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: false,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()?
            .error_for_status()?
            .json::<ChatCompletionResponse>()?;

        first_content(resp)
    }

    fn test_connection(&self) -> Result<String, CompletionError> {
        let resp: serde_json::Value = self
            .client
            .get(format!("{}/models", self.api_base))
            .bearer_auth(&self.api_key)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(format!(
            "Conectado ({} modelos disponibles)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

fn first_content(resp: ChatCompletionResponse) -> Result<String, CompletionError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(CompletionError::EmptyResponse)
}

/// Runs one turn: records the user message, sends the whole history and
/// records the reply.
///
/// On error the user message stays in the history with no reply after it,
/// so the next call sends it again.
pub fn complete<B: CompletionBackend + ?Sized>(
    conversation: &mut Conversation,
    backend: &B,
    user_text: &str,
    params: &CompletionParams,
) -> Result<String, CompletionError> {
    conversation.append_user(user_text);
    debug!(history_len = conversation.len(), model = %params.model, "sending completion");

    let reply = backend.create(conversation.messages(), params)?;

    conversation.append_assistant(reply.clone());
    info!(history_len = conversation.len(), "assistant replied");

    Ok(reply)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::message::Role;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every history it was sent.
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<Option<String>>>,
        pub seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: &[Option<&str>]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.map(String::from)).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionBackend for ScriptedBackend {
        fn create(
            &self,
            messages: &[Message],
            _params: &CompletionParams,
        ) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .flatten()
                .ok_or(CompletionError::EmptyResponse)
        }

        fn test_connection(&self) -> Result<String, CompletionError> {
            Ok("scripted".into())
        }
    }

    fn conversation() -> Conversation {
        Conversation::from_initial("system".into(), "hola".into())
    }

    #[test]
    fn complete_appends_user_and_reply() {
        let backend = ScriptedBackend::new(&[Some("¿Algo más?")]);
        let mut convo = conversation();

        let reply = complete(&mut convo, &backend, "Un lomo saltado", &CompletionParams::default()).unwrap();

        assert_eq!(reply, "¿Algo más?");
        assert_eq!(convo.len(), 4);
        assert_eq!(convo.messages()[2], Message::user("Un lomo saltado"));
        assert_eq!(convo.messages()[3], Message::assistant("¿Algo más?"));

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 3);
        assert_eq!(seen[0][0].role, Role::System);
    }

    #[test]
    fn quantity_is_forwarded_untouched() {
        let backend = ScriptedBackend::new(&[Some("Lamento informarte...")]);
        let mut convo = conversation();

        complete(&mut convo, &backend, "Quiero 150 arroces", &CompletionParams::default()).unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0][2], Message::user("Quiero 150 arroces"));
    }

    #[test]
    fn failure_leaves_dangling_user_turn() {
        let backend = ScriptedBackend::new(&[None, Some("Listo")]);
        let mut convo = conversation();

        let err = complete(&mut convo, &backend, "hola", &CompletionParams::default()).unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
        assert_eq!(convo.len(), 3);
        assert_eq!(convo.messages()[2].role, Role::User);

        complete(&mut convo, &backend, "hola?", &CompletionParams::default()).unwrap();
        let seen = backend.seen.lock().unwrap();
        let roles: Vec<_> = seen[1].iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::Assistant, Role::User, Role::User]);
    }

    #[test]
    fn request_body_matches_wire_format() {
        let messages = [Message::system("s"), Message::user("u")];
        let req = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            temperature: 0.5,
            max_tokens: 1000,
            stream: false,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["stream"], false);
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
    }

    #[test]
    fn response_takes_first_choice() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hola"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(resp).unwrap(), "Hola");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_content(empty), Err(CompletionError::EmptyResponse)));
    }

    #[test]
    fn params_follow_config() {
        let config = CompletionConfig {
            api_base: "http://localhost:1234/v1".into(),
            model: "local-model".into(),
            temperature: 0.7,
            max_tokens: 256,
        };
        let params = CompletionParams::from(&config);
        assert_eq!(params.model, "local-model");
        assert_eq!(params.max_tokens, 256);
    }
}
