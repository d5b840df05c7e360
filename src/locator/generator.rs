//! Turns an HTML snippet and an element description into a Selenium locator.

use super::parse::{looks_like_locator, unwrap_locator};
use super::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::api::OllamaClient;
use crate::error::Result;
use crate::models::ChatMessage;
use tracing::{info, warn};

/// Number of description characters echoed into the logs.
const LOGGED_PROMPT_CHARS: usize = 50;

/// Asks an Ollama model for locators.
#[derive(Debug, Clone)]
pub struct LocatorGenerator {
    client: OllamaClient,
    default_model: String,
}

impl LocatorGenerator {
    pub fn new(client: OllamaClient, default_model: impl Into<String>) -> Self {
        Self {
            client,
            default_model: default_model.into(),
        }
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the model's trimmed reply, or `None` if the reply was empty.
    ///
    /// `model` falls back to the generator's default. A reply that does not
    /// look like `strategy=value` is logged as a warning but still returned.
    ///
    /// # Errors
    ///
    /// Propagates any error from the runtime.
    pub async fn generate(
        &self,
        html: &str,
        description: &str,
        model: Option<&str>,
    ) -> Result<Option<String>> {
        let model = model.unwrap_or(&self.default_model);
        let preview: String = description.chars().take(LOGGED_PROMPT_CHARS).collect();
        info!(
            "Sending request to Ollama model: {} for prompt: {}...",
            model, preview
        );

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(html, description)),
        ];
        let response = self.client.chat(model, &messages).await?;

        let reply = response.message.content.trim().to_string();
        info!("Ollama raw response: {}", reply);

        if !looks_like_locator(&reply) {
            warn!("The model's response doesn't look like a standard locator format.");
        }

        Ok(Some(reply).filter(|r| !r.is_empty()))
    }

    /// Like [`generate`](Self::generate), with Markdown wrapping removed from the reply.
    pub async fn generate_clean(
        &self,
        html: &str,
        description: &str,
        model: Option<&str>,
    ) -> Result<Option<String>> {
        let reply = self.generate(html, description, model).await?;
        Ok(reply.map(|raw| unwrap_locator(&raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn chat_body(content: &str) -> String {
        json!({
            "model": "llama3.2:latest",
            "message": {"role": "assistant", "content": content},
            "done": true
        })
        .to_string()
    }

    fn generator_for(server: &Server) -> LocatorGenerator {
        let client = OllamaClient::new(&server.url(), Some(Duration::from_secs(5))).unwrap();
        LocatorGenerator::new(client, "llama3.2:latest")
    }

    #[tokio::test]
    async fn sends_system_and_user_messages_to_default_model() {
        let mut server = Server::new_async().await;
        let generator = generator_for(&server);

        let m = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({"model": "llama3.2:latest", "stream": false})),
                Matcher::Regex(r#""role":"system""#.to_string()),
                Matcher::Regex(r"Here is the HTML data".to_string()),
                Matcher::Regex(r"the submit button".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("\n  xpath=//button[@id='submit']  \n"))
            .create_async()
            .await;

        let reply = generator
            .generate("<button id='submit'>Send</button>", "the submit button", None)
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(reply.as_deref(), Some("xpath=//button[@id='submit']"));
    }

    #[tokio::test]
    async fn explicit_model_overrides_default() {
        let mut server = Server::new_async().await;
        let generator = generator_for(&server);

        let m = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({"model": "qwen3:0.6b"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("id=main-logo"))
            .create_async()
            .await;

        let reply = generator
            .generate("<img id='main-logo'>", "the logo", Some("qwen3:0.6b"))
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(reply.as_deref(), Some("id=main-logo"));
    }

    #[tokio::test]
    async fn blank_reply_yields_none() {
        let mut server = Server::new_async().await;
        let generator = generator_for(&server);

        let _m = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("   \n"))
            .create_async()
            .await;

        let reply = generator.generate("<div/>", "anything", None).await.unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn non_locator_reply_is_still_returned() {
        let mut server = Server::new_async().await;
        let generator = generator_for(&server);

        let _m = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("I could not find that element."))
            .create_async()
            .await;

        let reply = generator.generate("<div/>", "a unicorn", None).await.unwrap();
        assert_eq!(reply.as_deref(), Some("I could not find that element."));
    }

    #[tokio::test]
    async fn generate_clean_strips_markdown_fences() {
        let mut server = Server::new_async().await;
        let generator = generator_for(&server);

        let _m = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("```css\ninput[name='username']\n```"))
            .create_async()
            .await;

        let reply = generator
            .generate_clean("<input name='username'>", "username field", None)
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("input[name='username']"));
    }

    #[tokio::test]
    async fn runtime_errors_propagate() {
        let mut server = Server::new_async().await;
        let generator = generator_for(&server);

        let _m = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"out of memory"}"#)
            .create_async()
            .await;

        let err = generator.generate("<div/>", "x", None).await.unwrap_err();
        assert!(matches!(err, AppError::Ollama { status: 500, .. }));
    }
}
