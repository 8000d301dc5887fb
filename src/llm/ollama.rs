use crate::llm::client::{GenerateOptions, LLMClient};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

/// Local Ollama client. Ollama has no web-search tool, so the flag is ignored.
pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        let (scheme, rest) = base_url
            .split_once("://")
            .unwrap_or(("http", base_url.as_str()));
        let rest = rest.trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().unwrap_or(11434)),
            None => (rest, 11434),
        };

        let client = Ollama::new(format!("{}://{}", scheme, host), port);

        Self { client, model }
    }

    async fn chat(&self, messages: Vec<ChatMessage>, options: GenerateOptions) -> Result<String> {
        if options.web_search {
            tracing::debug!(
                "Ollama model {} has no web search; answering from model knowledge",
                self.model
            );
        }

        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())], options)
            .await
    }

    async fn generate_with_system(
        &self,
        system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String> {
        let messages = vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ];
        self.chat(messages, options).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
