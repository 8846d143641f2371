//! Study assistant: a conversational proxy to the inference service.

pub mod handlers;
pub mod prompts;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::quiz::validation::FieldErrors;
use prompts::{ASSISTANT_SYSTEM, ATTACHMENT_HEADER, HISTORY_HEADER, USER_PREFIX};

/// Attachment text is cut to this many characters before it reaches the prompt.
const MAX_ATTACHMENT_CHARS: usize = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

pub fn build_chat_prompt(request: &ChatRequest) -> String {
    let mut prompt = String::new();

    if !request.history.is_empty() {
        prompt.push_str(HISTORY_HEADER);
        prompt.push('\n');
        for message in &request.history {
            prompt.push_str(&format!("{}: {}\n", message.role, message.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("{USER_PREFIX}: {}", request.message.trim()));

    if let Some(attachment) = &request.attachment {
        let content: String = attachment.content.chars().take(MAX_ATTACHMENT_CHARS).collect();
        prompt.push_str(&format!(
            "\n\n{ATTACHMENT_HEADER} ({}):\n{content}",
            attachment.name
        ));
    }

    prompt
}

pub async fn reply(
    generator: &dyn TextGenerator,
    request: &ChatRequest,
) -> Result<ChatReply, AppError> {
    if request.message.trim().is_empty() {
        let mut errors = FieldErrors::new();
        errors.insert("message".to_string(), "Escribe un mensaje".to_string());
        return Err(AppError::Validation(errors));
    }

    let response = generator
        .generate(&build_chat_prompt(request), ASSISTANT_SYSTEM)
        .await?;

    Ok(ChatReply {
        response,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::llm_client::LlmError;

    #[derive(Default)]
    struct EchoGenerator {
        seen: Mutex<Option<(String, String)>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
            *self.seen.lock() = Some((prompt.to_string(), system.to_string()));
            Ok("¡Claro! Empecemos por las derivadas.".to_string())
        }
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            history: vec![
                ChatMessage {
                    role: "user".to_string(),
                    content: "Hola".to_string(),
                },
                ChatMessage {
                    role: "assistant".to_string(),
                    content: "¡Hola! ¿En qué te ayudo?".to_string(),
                },
            ],
            attachment: None,
        }
    }

    #[test]
    fn test_prompt_includes_history_in_order() {
        let prompt = build_chat_prompt(&request("Explícame cálculo"));
        let hola = prompt.find("user: Hola").unwrap();
        let answer = prompt.find("assistant: ¡Hola!").unwrap();
        assert!(hola < answer);
        assert!(prompt.ends_with("Usuario: Explícame cálculo"));
    }

    #[test]
    fn test_prompt_without_history_or_attachment() {
        let mut req = request("¿Qué estudio hoy?");
        req.history.clear();
        assert_eq!(build_chat_prompt(&req), "Usuario: ¿Qué estudio hoy?");
    }

    #[test]
    fn test_attachment_is_appended() {
        let mut req = request("Revisa mis apuntes");
        req.attachment = Some(Attachment {
            name: "apuntes.md".to_string(),
            content: "# Derivadas".to_string(),
        });
        let prompt = build_chat_prompt(&req);
        assert!(prompt.ends_with("Archivo adjunto (apuntes.md):\n# Derivadas"));
    }

    #[tokio::test]
    async fn test_reply_uses_assistant_persona() {
        let generator = EchoGenerator::default();
        let reply = reply(&generator, &request("Ayuda con derivadas")).await.unwrap();
        assert!(reply.response.contains("derivadas"));
        let (_, system) = generator.seen.lock().clone().unwrap();
        assert!(system.contains("Ascend AI"));
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let generator = EchoGenerator::default();
        let err = reply(&generator, &request("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(generator.seen.lock().is_none());
    }
}
