//! OpenAI-compatible chat completions connector
//!
//! Talks to any endpoint implementing the `/chat/completions` surface
//! (OpenAI, OpenRouter, llama.cpp server, vLLM, ...). Implements all three
//! capability tiers: plain text, single inline image (as a base64 data
//! URL), and general attachment lists (images as data URLs, text
//! attachments inlined into the message parts).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use conclave_application::{
    AttachmentConnector, Connector, ConnectorError, ImageConnector,
};
use conclave_domain::{Attachment, AttachmentKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Connector adapter for OpenAI-compatible APIs
pub struct OpenAiCompatConnector {
    provider: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatConnector {
    pub fn new(provider: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn request_completion(
        &self,
        model: &str,
        system: &str,
        content: MessageContent,
    ) -> Result<String, ConnectorError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        debug!(provider = %self.provider, model, "Sending chat completion request");
        let response = builder
            .send()
            .await
            .map_err(|e| ConnectorError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::RequestFailed(format!(
                "{status}: {body}"
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ConnectorError::RequestFailed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ConnectorError::RequestFailed("response carried no message content".to_string())
            })
    }
}

#[async_trait]
impl Connector for OpenAiCompatConnector {
    fn provider_id(&self) -> &str {
        &self.provider
    }

    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, ConnectorError> {
        self.request_completion(model, system, MessageContent::Text(prompt.to_string()))
            .await
    }

    fn image_support(&self) -> Option<&dyn ImageConnector> {
        Some(self)
    }

    fn attachment_support(&self) -> Option<&dyn AttachmentConnector> {
        Some(self)
    }
}

#[async_trait]
impl ImageConnector for OpenAiCompatConnector {
    async fn generate_with_image(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        image: &[u8],
        media_type: &str,
    ) -> Result<String, ConnectorError> {
        let parts = vec![
            ContentPart::text(prompt),
            ContentPart::image(image, media_type),
        ];
        self.request_completion(model, system, MessageContent::Parts(parts))
            .await
    }
}

#[async_trait]
impl AttachmentConnector for OpenAiCompatConnector {
    async fn generate_with_attachments(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        attachments: &[Attachment],
    ) -> Result<String, ConnectorError> {
        let mut parts = vec![ContentPart::text(prompt)];
        for attachment in attachments {
            parts.push(ContentPart::from_attachment(attachment)?);
        }
        self.request_completion(model, system, MessageContent::Parts(parts))
            .await
    }
}

// ==================== Wire types ====================

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    fn image(payload: &[u8], media_type: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: data_url(payload, media_type),
            },
        }
    }

    fn from_attachment(attachment: &Attachment) -> Result<Self, ConnectorError> {
        match attachment.kind {
            AttachmentKind::Image => {
                Ok(Self::image(&attachment.payload, &attachment.media_type))
            }
            AttachmentKind::Text => {
                let content = attachment.as_text().ok_or_else(|| {
                    ConnectorError::RequestFailed(
                        "text attachment is not valid UTF-8".to_string(),
                    )
                })?;
                Ok(Self::text(format!(
                    "Attachment ({}):\n{}",
                    attachment.media_type, content
                )))
            }
        }
    }
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn data_url(payload: &[u8], media_type: &str) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(payload))
}
